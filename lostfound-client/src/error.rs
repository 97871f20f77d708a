use thiserror::Error;

#[derive(Debug, Error)]
pub enum LostFoundError {
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    #[cfg(feature = "http")]
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Not found")]
    NotFound,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Image is {size} bytes, the limit is {limit} bytes")]
    ImageTooLarge { size: u64, limit: u64 },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Session storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl LostFoundError {
    /// Builds an error from a non-success backend reply.
    ///
    /// PostgREST, GoTrue and the storage API disagree on where they put the
    /// human readable text, so every known key is tried before falling back
    /// to the raw body.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => return LostFoundError::Unauthorized,
            404 => return LostFoundError::NotFound,
            _ => {}
        }

        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                ["message", "msg", "error_description", "error"]
                    .iter()
                    .find_map(|key| json.get(*key).and_then(|v| v.as_str()).map(str::to_owned))
            })
            .unwrap_or_else(|| body.trim().to_string());

        LostFoundError::Http { status, message }
    }

    /// Text suitable for the description line of a notice.
    pub fn user_message(&self) -> String {
        match self {
            LostFoundError::Http { message, .. } if !message.is_empty() => message.clone(),
            other => other.to_string(),
        }
    }
}
