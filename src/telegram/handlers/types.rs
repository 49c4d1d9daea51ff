//! Handler types and dependencies

use std::sync::Arc;

use crate::download::MediaDownloader;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub downloader: Arc<MediaDownloader>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(downloader: Arc<MediaDownloader>) -> Self {
        Self { downloader }
    }
}
