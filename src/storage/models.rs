use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Redirect status codes accepted on creation.
pub const ALLOWED_REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

pub fn is_allowed_status(status: u16) -> bool {
    ALLOWED_REDIRECT_STATUSES.contains(&status)
}

/// Identity created on first successful OAuth login. Never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Provider-side profile id (GitHub numeric id).
    pub provider_id: u64,
    pub login: String,
    /// Raw provider profile blob, kept as received.
    pub profile: serde_json::Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// The stored shortcode mapping. Immutable once created; there is no
/// update or delete path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortcodeRecord {
    pub code: String,
    pub redirect: String,
    pub status: u16,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Requester metadata captured for audit records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    pub protocol: String,
    pub ip: Option<String>,
    pub method: String,
    pub path: String,
    pub base_url: String,
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub body: serde_json::Value,
}

/// Write-once audit entry for a minted code. Keyed by the code itself,
/// so there is at most one per code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreationRecord {
    pub code: String,
    pub context: RequestContext,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// One resolved redirect event. Keyed by its own freshly generated id so
/// every invocation of the same code gets its own record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub id: String,
    pub code: String,
    pub context: RequestContext,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// The one shape external consumers see, on both the creation and the
/// resolution path, regardless of internal storage representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormattedRecord {
    pub shortcode: String,
    pub redirect: String,
    pub status: u16,
}

pub fn format_record(record: &ShortcodeRecord) -> FormattedRecord {
    FormattedRecord {
        shortcode: record.code.clone(),
        redirect: record.redirect.clone(),
        status: record.status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_statuses() {
        for status in ALLOWED_REDIRECT_STATUSES {
            assert!(is_allowed_status(status));
        }
        assert!(!is_allowed_status(200));
        assert!(!is_allowed_status(404));
        assert!(!is_allowed_status(418));
    }

    #[test]
    fn test_format_record() {
        let record = ShortcodeRecord {
            code: "abc123".to_string(),
            redirect: "https://example.com".to_string(),
            status: 302,
            created_at: chrono::Utc::now(),
        };

        let formatted = format_record(&record);
        assert_eq!(formatted.shortcode, "abc123");
        assert_eq!(formatted.redirect, "https://example.com");
        assert_eq!(formatted.status, 302);
    }

    #[test]
    fn test_record_serialization_round_trip() {
        let record = ShortcodeRecord {
            code: "roundtrip".to_string(),
            redirect: "https://example.com/a?b=c".to_string(),
            status: 301,
            created_at: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: ShortcodeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, record.code);
        assert_eq!(back.redirect, record.redirect);
        assert_eq!(back.status, record.status);
    }
}
