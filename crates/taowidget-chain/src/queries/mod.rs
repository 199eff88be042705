//! Chain query implementations.
//!
//! Queries are free functions generic over [`ChainConnection`] so they run
//! unchanged against a live node or the in-memory mock.
//!
//! [`ChainConnection`]: crate::client::ChainConnection

pub mod balance;
pub mod stake;

use subxt::dynamic::{At, Value};
use subxt::ext::scale_value::ValueDef;
use subxt::utils::AccountId32;

/// Read a number out of a decoded value, looking through single-field
/// wrappers such as `Compact<T>` or newtypes like `NetUid(u16)`.
pub(crate) fn as_amount(value: &Value<u32>) -> Option<u128> {
    if let Some(n) = value.as_u128() {
        return Some(n);
    }
    match &value.value {
        ValueDef::Composite(composite) => {
            let mut fields = composite.values();
            match (fields.next(), fields.next()) {
                (Some(only), None) => as_amount(only),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Numeric field `name` of a struct value.
pub(crate) fn amount_field(value: &Value<u32>, name: &str) -> Option<u128> {
    value.at(name).and_then(as_amount)
}

/// Extract an AccountId from a dynamic Value.
pub(crate) fn extract_account_id(value: &Value<u32>) -> Option<AccountId32> {
    let ValueDef::Composite(composite) = &value.value else {
        return None;
    };
    if composite.len() == 1 {
        return composite.values().next().and_then(extract_account_id);
    }

    let bytes: Vec<u8> = composite
        .values()
        .map(|byte| as_amount(byte).and_then(|b| u8::try_from(b).ok()))
        .collect::<Option<_>>()?;
    let arr: [u8; 32] = bytes.try_into().ok()?;
    Some(AccountId32::from(arr))
}
