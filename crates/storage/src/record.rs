use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::StorageError;

/// A row in the `profiles` table.
///
/// `user_type` is kept as the raw stored string; interpreting it is the
/// classifier's job, including values it does not recognize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub user_id: String,
    pub user_type: String,
    /// ISO 8601 / RFC 3339 timestamp string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// ISO 8601 / RFC 3339 timestamp string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ProfileRecord {
    /// Reject timestamps that are present but not RFC 3339.
    pub fn check_timestamps(&self) -> Result<(), StorageError> {
        for (field, value) in [("created_at", &self.created_at), ("updated_at", &self.updated_at)] {
            if let Some(v) = value {
                OffsetDateTime::parse(v, &Rfc3339).map_err(|e| StorageError::InvalidTimestamp {
                    field,
                    value: v.clone(),
                    message: e.to_string(),
                })?;
            }
        }
        Ok(())
    }
}

/// Current UTC time as an RFC 3339 string, for stamping new rows.
pub(crate) fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// A row in the `businesses` table. Only `owner_id` matters for access
/// resolution; the rest is carried for listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_slug: Option<String>,
}
