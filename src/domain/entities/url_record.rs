//! URL record entity.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Lowest value the sequence counter can hold.
pub const FIRST_IDENTIFIER: u64 = 1;

/// A shortened URL.
///
/// `shortcut_code` is globally unique and `full_url` maps to at most one live
/// record. `partition_key` is the host-derived base code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub shortcut_code: String,
    pub partition_key: String,
    pub full_url: String,
    pub redirect_count: i64,
    pub created_at: DateTime<Utc>,
}

impl UrlRecord {
    pub fn new(
        shortcut_code: String,
        partition_key: String,
        full_url: String,
        redirect_count: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            shortcut_code,
            partition_key,
            full_url,
            redirect_count,
            created_at,
        }
    }

    /// Moment after which the record is due for expiry.
    pub fn expires_at(&self, retention: Duration) -> DateTime<Utc> {
        let retention = chrono::Duration::from_std(retention).unwrap_or(chrono::Duration::MAX);
        self.created_at
            .checked_add_signed(retention)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Input data for creating a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlRecord {
    pub shortcut_code: String,
    pub partition_key: String,
    pub full_url: String,
}

impl NewUrlRecord {
    /// Materializes the record as it looks right after creation.
    pub fn into_record(self, created_at: DateTime<Utc>) -> UrlRecord {
        UrlRecord::new(
            self.shortcut_code,
            self.partition_key,
            self.full_url,
            0,
            created_at,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_starts_without_redirects() {
        let now = Utc::now();
        let record = NewUrlRecord {
            shortcut_code: "exAAAAAB".to_string(),
            partition_key: "exa".to_string(),
            full_url: "http://example.com/page".to_string(),
        }
        .into_record(now);

        assert_eq!(record.redirect_count, 0);
        assert_eq!(record.created_at, now);
        assert_eq!(record.partition_key, "exa");
    }

    #[test]
    fn test_expires_at_adds_retention() {
        let now = Utc::now();
        let record = UrlRecord::new(
            "code".to_string(),
            "cod".to_string(),
            "https://example.com".to_string(),
            3,
            now,
        );

        let due = record.expires_at(Duration::from_secs(31 * 24 * 60 * 60));
        assert_eq!(due - now, chrono::Duration::days(31));
    }

    #[test]
    fn test_expires_at_saturates() {
        let record = UrlRecord::new(
            "code".to_string(),
            "cod".to_string(),
            "https://example.com".to_string(),
            0,
            Utc::now(),
        );

        assert_eq!(record.expires_at(Duration::MAX), DateTime::<Utc>::MAX_UTC);
    }
}
