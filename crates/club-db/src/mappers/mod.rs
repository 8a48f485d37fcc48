//! Entity <-> record mappers

mod invitation;
mod membership;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use club_core::DomainError;

/// Serialize a record into an item payload
pub fn to_payload<T: Serialize>(record: &T) -> Result<Value, DomainError> {
    serde_json::to_value(record).map_err(|e| DomainError::Storage(format!("encode record: {e}")))
}

/// Deserialize an item payload into a record
pub fn from_payload<T: DeserializeOwned>(data: Value) -> Result<T, DomainError> {
    serde_json::from_value(data).map_err(|e| DomainError::Storage(format!("decode record: {e}")))
}
