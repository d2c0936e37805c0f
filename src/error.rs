use thiserror::Error;

/// The request never produced a usable response body.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(reqwest::Error),
    #[error("No Gemini API key configured (set GEMINI_API_KEY or gemini_api_key)")]
    MissingApiKey,
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

// The request URL carries `?key=`, keep it out of messages and logs.
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Http(err.without_url())
    }
}

/// The response arrived but did not carry recommendation text.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("No recommendations received")]
    NoRecommendations,
    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("catalog has no genres")]
    Empty,
    #[error("catalog contains an empty genre name")]
    EmptyGenre,
    #[error("duplicate genre `{0}` in catalog")]
    DuplicateGenre(String),
    #[error("genre `{0}` has no moods")]
    NoMoods(String),
    #[error("genre `{0}` contains an empty mood")]
    EmptyMood(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_message_is_verbatim() {
        let err = FetchError::from(TransportError::Status {
            status: 403,
            message: "API key not valid".into(),
        });
        assert_eq!(err.to_string(), "HTTP 403: API key not valid");
    }

    #[test]
    fn missing_payload_has_fixed_message() {
        let err = FetchError::from(PayloadError::NoRecommendations);
        assert_eq!(err.to_string(), "No recommendations received");
    }
}
