//! URL shortening, resolution, and background job handling.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use serde_json::json;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::application::services::url_shortener::UrlShortener;
use crate::domain::entities::UrlRecord;
use crate::domain::job::Job;
use crate::domain::job_queue::JobQueue;
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::utils::host_prefix::base_code_for_url;
use crate::utils::letter_generator::CodeGenError;

/// Accepted shape of a shortcut code in redirect paths.
static SHORTCUT_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{1,64}$").expect("valid shortcut code regex"));

/// Tunables for link creation.
#[derive(Debug, Clone, Copy)]
pub struct LinkSettings {
    /// Length of the seed-driven suffix.
    pub code_length: u8,
    /// Delay after creation before a record is expired.
    pub retention: Duration,
}

/// Result of a shortening request.
#[derive(Debug, Clone)]
pub struct ShortenOutcome {
    pub record: UrlRecord,
    pub short_url: String,
    /// `false` when an existing record for the same URL was returned.
    pub created: bool,
}

/// Aggregate numbers for the admin tool.
#[derive(Debug, Clone, Copy)]
pub struct LinkStats {
    pub records: i64,
    pub redirects: i64,
    pub current_identifier: u64,
}

/// Service orchestrating the repository, the job queue, and code generation.
pub struct LinkService {
    repository: Arc<dyn UrlRepository>,
    jobs: Arc<dyn JobQueue>,
    shortener: Arc<UrlShortener>,
    settings: LinkSettings,
}

impl LinkService {
    /// Maximum number of identifiers drawn for a single shortening request.
    pub const MAX_ATTEMPTS: usize = 10;

    pub fn new(
        repository: Arc<dyn UrlRepository>,
        jobs: Arc<dyn JobQueue>,
        shortener: Arc<UrlShortener>,
        settings: LinkSettings,
    ) -> Self {
        Self {
            repository,
            jobs,
            shortener,
            settings,
        }
    }

    pub fn settings(&self) -> LinkSettings {
        self.settings
    }

    /// Shortens a URL, reusing the existing record when the URL is already known.
    ///
    /// # Code Generation
    ///
    /// The seed is the current value of the sequence counter, taken and
    /// advanced in the same atomic step that stores the record, so a failed
    /// attempt leaves the counter where it was. If the code still collides (the
    /// counter is decremented on expiry, so seeds can be handed out again), the
    /// URL is looked up once more in case a concurrent request stored it, and
    /// otherwise the next seed is tried, up to [`Self::MAX_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is not an absolute http(s) URL.
    /// Returns [`AppError::Internal`] on storage failures, when the code space
    /// for the configured length is exhausted, or after too many collisions.
    pub async fn shorten(&self, raw_url: &str) -> Result<ShortenOutcome, AppError> {
        let url = parse_target_url(raw_url)?;
        let full_url = url.to_string();
        let partition_key = base_code_for_url(&url);

        if let Some(existing) = self
            .repository
            .find_by_full_url(&partition_key, &full_url)
            .await?
        {
            return Ok(self.reused(existing));
        }

        let code_length = self.settings.code_length;
        let code_for_seed = |seed: u64| {
            self.shortener
                .get_shortcut_code(code_length, &partition_key, seed)
                .map_err(|e| {
                    if matches!(e, CodeGenError::RangeExceeded { .. }) {
                        error!(
                            seed,
                            code_length,
                            "Shortcut code space exhausted, increase SHORTCUT_LENGTH: {}",
                            e
                        );
                    }
                    AppError::from(e)
                })
        };

        for attempt in 1..=Self::MAX_ATTEMPTS {
            match self
                .repository
                .create_with_next_identifier(&partition_key, &full_url, &code_for_seed)
                .await
            {
                Ok(record) => {
                    self.schedule_expiry(&record.shortcut_code).await;

                    metrics::counter!("shortener_urls_created_total").increment(1);
                    info!(code = %record.shortcut_code, "Shortened {}", record.full_url);

                    let short_url = self
                        .shortener
                        .get_shortened_url_from_shortcut(&record.shortcut_code);
                    return Ok(ShortenOutcome {
                        record,
                        short_url,
                        created: true,
                    });
                }
                Err(AppError::Conflict { details, .. }) => {
                    if let Some(existing) = self
                        .repository
                        .find_by_full_url(&partition_key, &full_url)
                        .await?
                    {
                        return Ok(self.reused(existing));
                    }

                    warn!(attempt, %details, "Shortcut code collision, drawing next identifier");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to generate unique shortcut code",
            json!({ "reason": "Too many collisions", "attempts": Self::MAX_ATTEMPTS }),
        ))
    }

    /// Looks up the record served under a shortcut code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown or malformed codes.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn resolve(&self, code: &str) -> Result<UrlRecord, AppError> {
        let not_found = || AppError::not_found("Short link not found", json!({ "code": code }));

        if !SHORTCUT_CODE_REGEX.is_match(code) {
            return Err(not_found());
        }

        self.repository
            .find_by_code(code)
            .await?
            .ok_or_else(not_found)
    }

    /// Queues a redirect to be counted. Failures are logged, never returned.
    pub async fn track_redirect(&self, code: &str) {
        metrics::counter!("shortener_redirects_total").increment(1);

        if let Err(e) = self.jobs.enqueue_redirect(code).await {
            warn!(code, "Dropping redirect count: {}", e);
        }
    }

    /// Increments the redirect count of a record.
    ///
    /// A missing record (expired between redirect and counting) is not an error.
    pub async fn count_redirect(&self, code: &str) -> Result<(), AppError> {
        if self.repository.increment_redirect_count(code).await? {
            metrics::counter!("shortener_redirects_counted_total").increment(1);
            debug!(code, "Redirect counted");
        } else {
            info!(code, "Redirect not counted, record no longer exists");
        }

        Ok(())
    }

    /// Removes an expired record and releases its identifier.
    ///
    /// Returns `Ok(false)` when the record was already gone.
    pub async fn expire_old(&self, code: &str) -> Result<bool, AppError> {
        let removed = self.repository.remove_and_release(code).await?;

        if removed {
            metrics::counter!("shortener_urls_expired_total").increment(1);
            info!(code, "Expired shortened URL");
        } else {
            info!(code, "Nothing to expire, record no longer exists");
        }

        Ok(removed)
    }

    /// Hands a job back to the queue for a later delivery. Failures are logged.
    pub async fn requeue(&self, job: &Job, delay: Duration) {
        match self.jobs.requeue(job, delay).await {
            Ok(()) => metrics::counter!("shortener_jobs_requeued_total", "kind" => job.kind()).increment(1),
            Err(e) => {
                metrics::counter!("shortener_jobs_failed_total", "kind" => job.kind()).increment(1);
                error!(kind = job.kind(), code = job.code(), "Dropping job, requeue failed: {}", e);
            }
        }
    }

    /// Looks up a record without the format check applied to redirect paths.
    pub async fn find(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        self.repository.find_by_code(code).await
    }

    pub async fn stats(&self) -> Result<LinkStats, AppError> {
        Ok(LinkStats {
            records: self.repository.count().await?,
            redirects: self.repository.total_redirects().await?,
            current_identifier: self.repository.current_identifier().await?,
        })
    }

    pub async fn storage_healthy(&self) -> bool {
        self.repository.health_check().await
    }

    pub async fn queue_healthy(&self) -> bool {
        self.jobs.health_check().await
    }

    pub fn queue_backend(&self) -> &'static str {
        self.jobs.backend_name()
    }

    pub fn short_url(&self, code: &str) -> String {
        self.shortener.get_shortened_url_from_shortcut(code)
    }

    fn reused(&self, record: UrlRecord) -> ShortenOutcome {
        metrics::counter!("shortener_urls_reused_total").increment(1);
        debug!(code = %record.shortcut_code, "URL already shortened");

        let short_url = self
            .shortener
            .get_shortened_url_from_shortcut(&record.shortcut_code);
        ShortenOutcome {
            record,
            short_url,
            created: false,
        }
    }

    async fn schedule_expiry(&self, code: &str) {
        if let Err(e) = self
            .jobs
            .schedule_expiry(code, self.settings.retention)
            .await
        {
            error!(code, "Failed to schedule expiry: {}", e);
        }
    }
}

/// Parses and checks a URL submitted for shortening.
fn parse_target_url(raw_url: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw_url.trim()).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(AppError::bad_request(
            "Only http and https URLs can be shortened",
            json!({ "scheme": url.scheme() }),
        ));
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(AppError::bad_request(
            "URL must contain a host",
            json!({ "url": raw_url }),
        ));
    }

    Ok(url)
}
