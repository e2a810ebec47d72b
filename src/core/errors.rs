use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Required configuration value {0} is not set")]
    MissingConfig(&'static str),
    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },
    #[error("Google API request failed with status {status}: {body}")]
    GoogleApi { status: u16, body: String },
    #[error("Spreadsheet has no worksheet tabs")]
    SheetNotFound,
    #[error("LLM API request failed with status {status}: {body}")]
    LlmApi { status: u16, body: String },
    #[error("Login required to view {url}")]
    NotAuthenticated { url: String },
    #[error("Element {selector} did not appear on {url}")]
    ElementNotFound { selector: String, url: String },
    #[error("Navigation to {url} did not finish in time")]
    NavigationTimeout { url: String },
    #[error("Row index {index} out of range (row count {len})")]
    RowIndexOutOfRange { index: usize, len: usize },
}
