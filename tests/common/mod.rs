#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use seq_shortener::application::services::{LinkService, LinkSettings, UrlShortener};
use seq_shortener::domain::entities::{NewUrlRecord, UrlRecord};
use seq_shortener::domain::job::Job;
use seq_shortener::domain::repositories::UrlRepository;
use seq_shortener::infrastructure::persistence::InMemoryUrlRepository;
use seq_shortener::infrastructure::queue::InMemoryJobQueue;
use seq_shortener::state::AppState;
use seq_shortener::utils::host_prefix::partition_key_for_code;
use seq_shortener::utils::letter_generator::ConsistentLetterGenerator;
use seq_shortener::utils::text_entropier::UpperLowerCaseEntropier;

pub const BASE_URL: &str = "http://localhost:3000";
pub const RETENTION: Duration = Duration::from_secs(60);

/// In-memory application wiring with handles on the pieces tests inspect.
pub struct TestApp {
    pub state: AppState,
    pub service: Arc<LinkService>,
    pub repo: Arc<InMemoryUrlRepository>,
    pub jobs: mpsc::Receiver<Job>,
}

pub fn create_test_app(permanent_redirect: bool) -> TestApp {
    let repo = Arc::new(InMemoryUrlRepository::new());
    let (tx, rx) = mpsc::channel(100);

    let shortener = UrlShortener::new(
        Box::new(ConsistentLetterGenerator::default()),
        Box::new(UpperLowerCaseEntropier::seeded(42)),
        BASE_URL,
    );

    let service = Arc::new(LinkService::new(
        repo.clone(),
        Arc::new(InMemoryJobQueue::new(tx)),
        Arc::new(shortener),
        LinkSettings {
            code_length: 6,
            retention: RETENTION,
        },
    ));

    TestApp {
        state: AppState::new(service.clone(), permanent_redirect),
        service,
        repo,
        jobs: rx,
    }
}

pub async fn create_test_record(repo: &InMemoryUrlRepository, code: &str, url: &str) -> UrlRecord {
    repo.create(NewUrlRecord {
        shortcut_code: code.to_string(),
        partition_key: partition_key_for_code(code),
        full_url: url.to_string(),
    })
    .await
    .unwrap()
}

/// Extracts the shortcut code from a short URL.
pub fn code_of(short_url: &str) -> &str {
    short_url
        .strip_prefix(&format!("{}/go/", BASE_URL))
        .unwrap_or_else(|| panic!("unexpected short URL {}", short_url))
}
