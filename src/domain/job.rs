//! Background job messages.

/// Work item consumed by the background worker.
///
/// Both kinds are idempotent against a missing record, so at-least-once
/// delivery is safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Increment the redirect counter of a record.
    CountRedirect { code: String },
    /// Remove a record whose retention period has elapsed.
    ExpireOld { code: String },
}

impl Job {
    pub fn count_redirect(code: impl Into<String>) -> Self {
        Self::CountRedirect { code: code.into() }
    }

    pub fn expire_old(code: impl Into<String>) -> Self {
        Self::ExpireOld { code: code.into() }
    }

    /// Shortcut code the job applies to.
    pub fn code(&self) -> &str {
        match self {
            Self::CountRedirect { code } | Self::ExpireOld { code } => code,
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CountRedirect { .. } => "count_redirect",
            Self::ExpireOld { .. } => "expire_old",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_accessors() {
        let count = Job::count_redirect("abcDEF");
        assert_eq!(count.code(), "abcDEF");
        assert_eq!(count.kind(), "count_redirect");

        let expire = Job::expire_old("xyz".to_string());
        assert_eq!(expire.code(), "xyz");
        assert_eq!(expire.kind(), "expire_old");
    }
}
