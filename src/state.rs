//! Shared state injected into every handler.

use std::sync::Arc;

use crate::application::services::LinkService;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    /// Answer redirects with 301 instead of 302.
    pub permanent_redirect: bool,
}

impl AppState {
    pub fn new(link_service: Arc<LinkService>, permanent_redirect: bool) -> Self {
        Self {
            link_service,
            permanent_redirect,
        }
    }
}
