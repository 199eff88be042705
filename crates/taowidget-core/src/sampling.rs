//! Block height and timestamp arithmetic for history sampling.
//!
//! Subtensor produces a block every 12 seconds, so one day is 7200 blocks.
//! History is sampled once per day going back from the current block, and
//! each sample is dated by its whole-day distance from the current block
//! rather than by the block's on-chain timestamp.

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};

use crate::types::BlockNumber;

/// Blocks produced per day (12 second block time).
pub const BLOCKS_PER_DAY: BlockNumber = 7200;

/// Lookback window used when a request does not specify one.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;

/// Block heights to sample for a lookback of `days`, most recent first.
///
/// Yields `current_block`, `current_block - BLOCKS_PER_DAY`, ... stopping
/// before `current_block - days * BLOCKS_PER_DAY`. Heights below genesis are
/// never produced, so a young chain yields fewer than `days` heights.
pub fn sample_heights(current_block: BlockNumber, days: u32) -> Vec<BlockNumber> {
    (0..days)
        .map_while(|day| {
            day.checked_mul(BLOCKS_PER_DAY)
                .and_then(|offset| current_block.checked_sub(offset))
        })
        .collect()
}

/// Whole days between `block` and `current_block`.
pub fn days_before(current_block: BlockNumber, block: BlockNumber) -> u32 {
    current_block.saturating_sub(block) / BLOCKS_PER_DAY
}

/// Approximate time of `block`: `now` minus its whole-day distance from the
/// current block.
pub fn sample_timestamp(
    now: DateTime<Utc>,
    current_block: BlockNumber,
    block: BlockNumber,
) -> DateTime<Utc> {
    now - TimeDelta::days(i64::from(days_before(current_block, block)))
}

/// Truncate a timestamp to 00:00:00 UTC of the same day.
pub fn truncate_to_day(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
}
