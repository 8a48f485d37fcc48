//! Opaque pagination cursors
//!
//! A cursor is the URL-safe base64 encoding of the last returned item's key.
//! Decoding checks that the cursor was issued for the partition being listed.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use club_core::DomainError;
use serde::Deserialize;

use crate::store::ItemKey;

#[derive(Debug, Deserialize)]
struct CursorPayload {
    pk: String,
    sk: String,
}

/// Encode the position after `key`
pub fn encode_cursor(key: &ItemKey) -> String {
    let payload = serde_json::json!({ "pk": key.pk, "sk": key.sk });
    URL_SAFE_NO_PAD.encode(payload.to_string())
}

/// Decode a cursor into the sort key to resume after
pub fn decode_cursor(cursor: &str, expected_pk: &str) -> Result<String, DomainError> {
    let invalid = || DomainError::validation("invalid pagination cursor");

    let bytes = URL_SAFE_NO_PAD.decode(cursor.trim()).map_err(|_| invalid())?;
    let payload: CursorPayload = serde_json::from_slice(&bytes).map_err(|_| invalid())?;
    if payload.pk != expected_pk {
        return Err(DomainError::validation(
            "pagination cursor does not belong to this listing",
        ));
    }
    Ok(payload.sk)
}
