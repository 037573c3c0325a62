//! Vidintel Core Library
//!
//! Client-side session handling for a video-intelligence backend: upload a video,
//! ask natural-language questions, and render the timestamped matches.

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod session;
pub mod types;

// Re-export commonly used items at crate root
pub use backend::{HttpBackend, VideoBackend};
pub use config::{BackendConfig, ConfigOverrides, DEFAULT_API_URL};
pub use controller::{RequestId, RequestKind, SessionController};
pub use error::{Result, VidintelError};
pub use format::{
    NO_RESULTS_MESSAGE, description_or_fallback, format_score, format_time_label,
    format_timestamp,
};
pub use session::{SessionEvent, SessionState, SessionStatus};
pub use types::{SearchResult, UploadReceipt, VideoFile};
