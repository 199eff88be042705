//! Stake held by a coldkey at a given block.
//!
//! Stake is not a plain storage item; it is read through the
//! `StakeInfoRuntimeApi`, which returns one entry per (hotkey, subnet) pair
//! the coldkey has staked to. Only root-network (netuid 0) entries count
//! towards the reported stake: subnet stake is denominated in the subnet's
//! own alpha token, not in TAO.

use crate::client::{BlockHash, ChainConnection};
use crate::error::ChainError;
use subxt::dynamic::{At, Value};
use subxt::ext::scale_value::ValueDef;
use subxt::utils::AccountId32;
use taowidget_core::Balance;

use super::{amount_field, extract_account_id};

pub(crate) const STAKE_INFO_API: &str = "StakeInfoRuntimeApi";
pub(crate) const STAKE_INFO_FOR_COLDKEY: &str = "get_stake_info_for_coldkey";

/// Netuid of the root network.
pub const ROOT_NETUID: u16 = 0;

/// One stake position of a coldkey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeEntry {
    pub hotkey: Option<AccountId32>,
    pub netuid: u16,
    /// Amount in the chain's smallest unit.
    pub stake: Balance,
}

impl StakeEntry {
    pub fn is_root(&self) -> bool {
        self.netuid == ROOT_NETUID
    }
}

/// All stake positions of `coldkey` as of block `at`.
pub async fn stake_entries_at<C: ChainConnection + ?Sized>(
    conn: &C,
    coldkey: &AccountId32,
    at: BlockHash,
) -> Result<Vec<StakeEntry>, ChainError> {
    let value = conn
        .runtime_call(
            STAKE_INFO_API,
            STAKE_INFO_FOR_COLDKEY,
            vec![Value::from_bytes(coldkey.clone())],
            at,
        )
        .await?;

    decode_stake_info(&value)
}

/// Root-network stake (in rao) of `coldkey` as of block `at`.
pub async fn root_stake_at<C: ChainConnection + ?Sized>(
    conn: &C,
    coldkey: &AccountId32,
    at: BlockHash,
) -> Result<Balance, ChainError> {
    let entries = stake_entries_at(conn, coldkey, at).await?;
    tracing::debug!("{} stake entries for {}", entries.len(), coldkey);
    Ok(root_stake(&entries))
}

/// Sum of root-network stake.
pub fn root_stake(entries: &[StakeEntry]) -> Balance {
    entries
        .iter()
        .filter(|entry| entry.is_root())
        .map(|entry| entry.stake)
        .sum()
}

/// Decode the `Vec<StakeInfo>` returned by the runtime API.
// StakeInfo = { hotkey, coldkey, netuid, stake, locked, emission, tao_emission, drain, is_registered }
pub fn decode_stake_info(value: &Value<u32>) -> Result<Vec<StakeEntry>, ChainError> {
    let ValueDef::Composite(entries) = &value.value else {
        return Err(ChainError::InvalidData("Stake info is not a sequence".into()));
    };

    entries
        .values()
        .map(|entry| {
            let netuid = amount_field(entry, "netuid")
                .and_then(|n| u16::try_from(n).ok())
                .ok_or_else(|| ChainError::InvalidData("Invalid stake netuid".into()))?;
            let stake = amount_field(entry, "stake")
                .ok_or_else(|| ChainError::InvalidData("Invalid stake amount".into()))?;
            let hotkey = entry.at("hotkey").and_then(extract_account_id);

            Ok(StakeEntry {
                hotkey,
                netuid,
                stake,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Connector;
    use crate::mock::{MockChain, list, number, record, stake_info};

    #[test]
    fn test_decode_stake_info() {
        let value = list(vec![
            stake_info([1u8; 32], 0, 1_000),
            stake_info([2u8; 32], 12, 5_000),
        ]);

        let entries = decode_stake_info(&value).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].netuid, 0);
        assert_eq!(entries[0].stake, 1_000);
        assert_eq!(entries[0].hotkey, Some(AccountId32::from([1u8; 32])));
        assert_eq!(entries[1].netuid, 12);
        assert!(!entries[1].is_root());
    }

    #[test]
    fn test_decode_stake_info_plain_netuid() {
        // Older runtimes encode netuid as a bare Compact<u16>
        let value = list(vec![record(vec![
            ("netuid", number(0)),
            ("stake", number(77)),
        ])]);

        let entries = decode_stake_info(&value).unwrap();
        assert_eq!(entries[0].stake, 77);
        assert_eq!(entries[0].hotkey, None);
    }

    #[test]
    fn test_decode_stake_info_empty() {
        assert!(decode_stake_info(&list(vec![])).unwrap().is_empty());
    }

    #[test]
    fn test_decode_stake_info_rejects_garbage() {
        assert!(decode_stake_info(&number(3)).is_err());
        let missing_stake = list(vec![record(vec![("netuid", number(0))])]);
        assert!(decode_stake_info(&missing_stake).is_err());
        let huge_netuid = list(vec![record(vec![
            ("netuid", number(70_000)),
            ("stake", number(1)),
        ])]);
        assert!(decode_stake_info(&huge_netuid).is_err());
    }

    #[test]
    fn test_root_stake_ignores_subnets() {
        let entries = vec![
            StakeEntry {
                hotkey: None,
                netuid: 0,
                stake: 100,
            },
            StakeEntry {
                hotkey: None,
                netuid: 3,
                stake: 1_000,
            },
            StakeEntry {
                hotkey: None,
                netuid: 0,
                stake: 50,
            },
        ];
        assert_eq!(root_stake(&entries), 150);
        assert_eq!(root_stake(&[]), 0);
    }

    #[tokio::test]
    async fn test_root_stake_at() {
        let chain = MockChain::new(10)
            .with_stake(10, 0, 4_000_000_000)
            .with_stake(10, 0, 1_000_000_000)
            .with_stake(10, 5, 9_000_000_000);
        let conn = chain.connect().await.unwrap();
        let hash = conn.block_hash(10).await.unwrap();

        let stake = root_stake_at(&conn, &AccountId32::from([1u8; 32]), hash)
            .await
            .unwrap();
        assert_eq!(stake, 5_000_000_000);
        assert_eq!(chain.stake_calls(), vec![10]);
    }
}
