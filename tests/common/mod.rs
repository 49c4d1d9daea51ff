//! Shared fakes for integration tests
//!
//! `MockSource` stands in for a download strategy and `RecordingReplier`
//! captures every outbound chat operation.

#![allow(dead_code)] // each test binary uses a different subset

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use teloxide::types::MessageId;

use clipferry::core::error::{AppError, AppResult};
use clipferry::download::{DownloadError, DownloadRequest, DownloadSource, FetchedMedia};
use clipferry::telegram::ChatReplier;

/// What a `MockSource` does when asked to fetch.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Write `bytes` into `file_name` and report `title`
    Produce {
        file_name: String,
        bytes: Vec<u8>,
        title: String,
    },
    /// Create a sparse file of `len` bytes
    ProduceSized { file_name: String, len: u64, title: String },
    /// Fail with an extraction error carrying this message
    Fail(String),
}

impl MockBehavior {
    pub fn video(title: &str) -> Self {
        Self::Produce {
            file_name: format!("{}.mp4", title),
            bytes: b"fake video bytes".to_vec(),
            title: title.to_string(),
        }
    }

    pub fn audio(title: &str) -> Self {
        Self::Produce {
            file_name: format!("{}.mp3", title),
            bytes: b"fake audio bytes".to_vec(),
            title: title.to_string(),
        }
    }
}

/// Scriptable `DownloadSource` that counts its calls.
pub struct MockSource {
    name: String,
    /// When set, only URLs containing this text are claimed
    claims: Option<String>,
    behavior: MockBehavior,
    calls: AtomicUsize,
    last_scratch: Mutex<Option<PathBuf>>,
}

impl MockSource {
    pub fn new(name: &str, behavior: MockBehavior) -> Self {
        Self {
            name: name.to_string(),
            claims: None,
            behavior,
            calls: AtomicUsize::new(0),
            last_scratch: Mutex::new(None),
        }
    }

    pub fn claiming(mut self, needle: &str) -> Self {
        self.claims = Some(needle.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_scratch(&self) -> Option<PathBuf> {
        self.last_scratch.lock().unwrap().clone()
    }
}

#[async_trait]
impl DownloadSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_url(&self, url: &str) -> bool {
        match &self.claims {
            Some(needle) => url.to_lowercase().contains(needle),
            None => true,
        }
    }

    async fn fetch(&self, _request: &DownloadRequest, scratch_dir: &Path) -> Result<FetchedMedia, DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_scratch.lock().unwrap() = Some(scratch_dir.to_path_buf());

        match &self.behavior {
            MockBehavior::Produce { file_name, bytes, title } => {
                let path = scratch_dir.join(file_name);
                std::fs::write(&path, bytes)?;
                Ok(FetchedMedia {
                    path,
                    title: title.clone(),
                })
            }
            MockBehavior::ProduceSized { file_name, len, title } => {
                let path = scratch_dir.join(file_name);
                let file = std::fs::File::create(&path)?;
                file.set_len(*len)?;
                Ok(FetchedMedia {
                    path,
                    title: title.clone(),
                })
            }
            MockBehavior::Fail(message) => Err(DownloadError::Extraction(message.clone())),
        }
    }
}

/// One outbound chat operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SendText { id: i32, text: String },
    EditText { id: i32, text: String },
    Delete { id: i32 },
    SendVideo { file_name: String, caption: String },
    SendAudio { file_name: String, title: String },
}

/// `ChatReplier` that records calls instead of talking to Telegram.
pub struct RecordingReplier {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI32,
    /// Make uploads fail with this message
    upload_error: Option<String>,
}

impl RecordingReplier {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(100),
            upload_error: None,
        }
    }

    pub fn failing_uploads(message: &str) -> Self {
        Self {
            upload_error: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn has_upload(&self) -> bool {
        self.calls()
            .iter()
            .any(|c| matches!(c, Call::SendVideo { .. } | Call::SendAudio { .. }))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn upload_result(&self) -> AppResult<()> {
        match &self.upload_error {
            Some(message) => Err(AppError::Io(std::io::Error::other(message.clone()))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ChatReplier for RecordingReplier {
    async fn send_text(&self, text: &str) -> AppResult<MessageId> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.record(Call::SendText {
            id,
            text: text.to_string(),
        });
        Ok(MessageId(id))
    }

    async fn edit_text(&self, message_id: MessageId, text: &str) -> AppResult<()> {
        self.record(Call::EditText {
            id: message_id.0,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete(&self, message_id: MessageId) -> AppResult<()> {
        self.record(Call::Delete { id: message_id.0 });
        Ok(())
    }

    async fn send_video(&self, path: &Path, file_name: &str, caption: &str) -> AppResult<()> {
        assert!(path.exists(), "uploaded file must exist at upload time");
        self.upload_result()?;
        self.record(Call::SendVideo {
            file_name: file_name.to_string(),
            caption: caption.to_string(),
        });
        Ok(())
    }

    async fn send_audio(&self, path: &Path, file_name: &str, title: &str) -> AppResult<()> {
        assert!(path.exists(), "uploaded file must exist at upload time");
        self.upload_result()?;
        self.record(Call::SendAudio {
            file_name: file_name.to_string(),
            title: title.to_string(),
        });
        Ok(())
    }
}

/// Lists the entries of `dir` (scratch directories left behind, for example).
pub fn entries(dir: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|rd| rd.filter_map(|e| e.ok()).map(|e| e.path()).collect())
        .unwrap_or_default();
    entries.sort();
    entries
}
