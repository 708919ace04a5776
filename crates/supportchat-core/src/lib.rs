pub mod attachment;
pub mod client;
pub mod config;
pub mod controller;
pub mod format;
pub mod state;
pub mod widget;

// Re-export main types for convenience
pub use attachment::{format_file_size, StagedAttachment};
pub use client::{AgentConfig, ChatBackend, ChatRequest, ChatResponse, ClientError, SupportClient};
pub use config::{Config, ConfigError};
pub use controller::{ChatController, ChatOutcome, Settlement};
pub use format::{format_message, FormatOptions, NumberedListStyle};
pub use state::{ChatMessage, ChatRole, ConversationLog, RequestState};
pub use widget::{CharCount, CountLevel, InputHistory, Theme};
