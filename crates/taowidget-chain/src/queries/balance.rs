//! Free balance of an account at a given block.

use crate::client::{BlockHash, ChainConnection};
use crate::error::ChainError;
use subxt::dynamic::{At, Value};
use subxt::utils::AccountId32;
use taowidget_core::Balance;

use super::amount_field;

pub(crate) const SYSTEM_PALLET: &str = "System";
pub(crate) const ACCOUNT_ENTRY: &str = "Account";

/// Free balance (in rao) of `account` as of block `at`.
///
/// Accounts that do not exist at that block hold nothing.
pub async fn free_balance_at<C: ChainConnection + ?Sized>(
    conn: &C,
    account: &AccountId32,
    at: BlockHash,
) -> Result<Balance, ChainError> {
    let result = conn
        .query_storage(
            SYSTEM_PALLET,
            ACCOUNT_ENTRY,
            vec![Value::from_bytes(account.clone())],
            at,
        )
        .await?;

    let Some(value) = result else {
        return Ok(0);
    };

    decode_free_balance(&value)
}

/// Pull `data.free` out of a decoded `AccountInfo`.
// AccountInfo = { nonce, consumers, providers, sufficients, data: AccountData }
// AccountData = { free, reserved, frozen, flags }
pub fn decode_free_balance(value: &Value<u32>) -> Result<Balance, ChainError> {
    let data = value
        .at("data")
        .ok_or_else(|| ChainError::InvalidData("AccountInfo without data".into()))?;

    amount_field(data, "free")
        .ok_or_else(|| ChainError::InvalidData("AccountData without free balance".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Connector;
    use crate::mock::{MockChain, account_info, number, record};

    #[test]
    fn test_decode_free_balance() {
        assert_eq!(decode_free_balance(&account_info(12_345)).unwrap(), 12_345);
    }

    #[test]
    fn test_decode_free_balance_missing_data() {
        let value = record(vec![("nonce", number(1))]);
        assert!(matches!(
            decode_free_balance(&value),
            Err(ChainError::InvalidData(_))
        ));
    }

    #[test]
    fn test_decode_free_balance_missing_free() {
        let value = record(vec![("data", record(vec![("reserved", number(1))]))]);
        assert!(decode_free_balance(&value).is_err());
    }

    #[tokio::test]
    async fn test_free_balance_at_existing_account() {
        let chain = MockChain::new(100).with_balance(100, 2_500_000_000);
        let conn = chain.connect().await.unwrap();
        let hash = conn.block_hash(100).await.unwrap();

        let free = free_balance_at(&conn, &AccountId32::from([1u8; 32]), hash)
            .await
            .unwrap();
        assert_eq!(free, 2_500_000_000);
    }

    #[tokio::test]
    async fn test_free_balance_at_unknown_account_is_zero() {
        let chain = MockChain::new(100);
        let conn = chain.connect().await.unwrap();
        let hash = conn.block_hash(50).await.unwrap();

        let free = free_balance_at(&conn, &AccountId32::from([1u8; 32]), hash)
            .await
            .unwrap();
        assert_eq!(free, 0);
    }
}
