//! Typed errors for the core library.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("API key not found in environment variables or config file")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API error {status}: {body}")]
    Api { status: u16, body: String },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write {filename}: {source}")]
    Write {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
}
