//! Display helpers shared by the chart renderer and log output.

use chrono::{DateTime, Utc};

use crate::types::{DailyData, TOKEN_SYMBOL};

/// Addresses up to this length are shown as-is.
const MAX_UNSHORTENED_LEN: usize = 12;
/// Characters kept at each end of a shortened address.
const SHORT_EDGE_LEN: usize = 6;

/// Shorten an address to `first6...last6` when it is longer than 12
/// characters.
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= MAX_UNSHORTENED_LEN {
        return address.to_string();
    }
    let head: String = chars[..SHORT_EDGE_LEN].iter().collect();
    let tail: String = chars[chars.len() - SHORT_EDGE_LEN..].iter().collect();
    format!("{head}...{tail}")
}

/// Format a TAO amount with four decimals and the token symbol.
pub fn format_tao(value: f64) -> String {
    format!("{value:.4} {TOKEN_SYMBOL}")
}

/// Chart title for a coldkey.
pub fn chart_title(coldkey: &str) -> String {
    format!("Balance history for {}", shorten_address(coldkey))
}

/// One-line summary of the most recent day, shown under the chart.
pub fn latest_summary(latest: &DailyData, rendered_at: DateTime<Utc>) -> String {
    format!(
        "{}: free {} | staked {} | total {}    rendered {}",
        latest.date.format("%d %b %Y"),
        format_tao(latest.balance),
        format_tao(latest.stake),
        format_tao(latest.total()),
        rendered_at.format("%Y-%m-%d %H:%M UTC"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_shorten_address_long() {
        assert_eq!(shorten_address("abcdefghij1234567890"), "abcdef...567890");
    }

    #[test]
    fn test_shorten_address_ss58() {
        assert_eq!(
            shorten_address("5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"),
            "5Grwva...GKutQY"
        );
    }

    #[test]
    fn test_shorten_address_boundary() {
        assert_eq!(shorten_address("abcdefghijkl"), "abcdefghijkl");
        assert_eq!(shorten_address("abcdefghijklm"), "abcdef...hijklm");
    }

    #[test]
    fn test_shorten_address_short_and_empty() {
        assert_eq!(shorten_address("abc"), "abc");
        assert_eq!(shorten_address(""), "");
    }

    #[test]
    fn test_format_tao() {
        assert_eq!(format_tao(1.5), "1.5000 TAO");
        assert_eq!(format_tao(0.0), "0.0000 TAO");
    }

    #[test]
    fn test_chart_title() {
        assert_eq!(
            chart_title("abcdefghij1234567890"),
            "Balance history for abcdef...567890"
        );
    }

    #[test]
    fn test_latest_summary() {
        let latest = DailyData {
            date: Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap(),
            balance: 1.0,
            stake: 2.5,
        };
        let rendered = Utc.with_ymd_and_hms(2025, 3, 10, 14, 5, 0).unwrap();
        assert_eq!(
            latest_summary(&latest, rendered),
            "10 Mar 2025: free 1.0000 TAO | staked 2.5000 TAO | total 3.5000 TAO    rendered 2025-03-10 14:05 UTC"
        );
    }
}
