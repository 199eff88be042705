//! SS58 address parsing for coldkeys.

use std::str::FromStr;

use subxt::utils::AccountId32;

use crate::error::ChainError;

/// Parse an SS58 coldkey address.
///
/// Any network prefix is accepted; the account is identified by its public
/// key alone. `AccountId32`'s `Display` re-encodes with the generic prefix
/// (42) that Subtensor uses.
pub fn parse_coldkey(address: &str) -> Result<AccountId32, ChainError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(ChainError::InvalidAddress {
            address: address.to_string(),
            reason: "empty address".to_string(),
        });
    }

    AccountId32::from_str(trimmed).map_err(|e| ChainError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}
