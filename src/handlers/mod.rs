// One handler module per API area. Handlers translate HTTP into service
// calls: parse path ids, validate bodies, map outcomes onto the envelope.

pub mod auth;
pub mod contacts;
pub mod emails;
pub mod events;
pub mod lead_groups;
pub mod stats;
pub mod uploads;

use crate::error::ApiError;

/// Path ids are parsed by hand so a malformed id produces the enveloped 400
/// before any service code runs.
pub(crate) fn parse_id(raw: &str, entity: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid {entity} id")))
}
