//! Session state and the reducer that advances it.
//!
//! All state changes go through [`SessionState::apply`], one [`SessionEvent`] at a time.

use crate::types::{SearchResult, VideoFile};

pub const UPLOADING_MESSAGE: &str = "Uploading & Processing Video (This uses CPU/GPU)...";
pub const READY_MESSAGE: &str = "Ready! Ask me anything about the video.";
pub const UPLOAD_ERROR_MESSAGE: &str = "Error processing video.";

/// Last lifecycle message shown for the upload flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Idle,
    Uploading,
    Ready,
    UploadError,
}

impl SessionStatus {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            SessionStatus::Idle => None,
            SessionStatus::Uploading => Some(UPLOADING_MESSAGE),
            SessionStatus::Ready => Some(READY_MESSAGE),
            SessionStatus::UploadError => Some(UPLOAD_ERROR_MESSAGE),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    FileSelected(VideoFile),
    QueryChanged(String),
    UploadStarted,
    UploadSucceeded,
    UploadFailed,
    SearchStarted,
    SearchSucceeded(Vec<SearchResult>),
    SearchFailed,
    Cancelled,
}

impl SessionEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::FileSelected(_) => "file.selected",
            SessionEvent::QueryChanged(_) => "query.changed",
            SessionEvent::UploadStarted => "upload.started",
            SessionEvent::UploadSucceeded => "upload.succeeded",
            SessionEvent::UploadFailed => "upload.failed",
            SessionEvent::SearchStarted => "search.started",
            SessionEvent::SearchSucceeded(_) => "search.succeeded",
            SessionEvent::SearchFailed => "search.failed",
            SessionEvent::Cancelled => "requests.cancelled",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub file: Option<VideoFile>,
    pub busy: bool,
    pub status: SessionStatus,
    pub query: String,
    pub results: Vec<SearchResult>,
    /// Set by the first successful search; empty `results` alone cannot tell.
    pub searched: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(self, event: SessionEvent) -> Self {
        match event {
            SessionEvent::FileSelected(file) => Self {
                file: Some(file),
                ..self
            },
            SessionEvent::QueryChanged(query) => Self { query, ..self },
            SessionEvent::UploadStarted => Self {
                busy: true,
                status: SessionStatus::Uploading,
                ..self
            },
            SessionEvent::UploadSucceeded => Self {
                busy: false,
                status: SessionStatus::Ready,
                ..self
            },
            SessionEvent::UploadFailed => Self {
                busy: false,
                status: SessionStatus::UploadError,
                ..self
            },
            SessionEvent::SearchStarted => Self { busy: true, ..self },
            SessionEvent::SearchSucceeded(results) => Self {
                busy: false,
                results,
                searched: true,
                ..self
            },
            SessionEvent::SearchFailed => Self {
                busy: false,
                ..self
            },
            SessionEvent::Cancelled => {
                let status = match self.status {
                    SessionStatus::Uploading => SessionStatus::Idle,
                    other => other,
                };
                Self {
                    busy: false,
                    status,
                    ..self
                }
            }
        }
    }

    pub fn status_message(&self) -> Option<&'static str> {
        self.status.message()
    }

    /// Mirrors the disabled state of the upload button.
    pub fn can_upload(&self) -> bool {
        !self.busy && self.file.is_some()
    }

    pub fn show_no_results(&self) -> bool {
        self.results.is_empty() && !self.query.is_empty() && !self.busy
    }
}
