pub mod assistant;
pub mod config;
pub mod error;
pub mod export;
pub mod profile;
pub mod state;
pub mod templates;

// Re-export main types for convenience
pub use assistant::AssistantClient;
pub use config::{KeySource, Settings};
pub use error::{AssistantError, ExportError};
pub use export::{download_all, download_one, Clipboard, DirectorySink, FileSink, PreviewState, SystemClipboard};
pub use profile::{AppConfig, ConfigCommand, Feature, Features, GpuProfile, LlmProvider};
pub use state::{AssistantPanel, ChatMessage, ChatRole};
pub use templates::{context_string, render, GeneratedScript, ScriptLanguage};
