use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain a usable catalog from a source.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unexpected catalog shape: {0}")]
    Shape(String),

    #[error("Item id '{id}' appears in both '{first}' and '{second}'")]
    DuplicateItemId {
        id: String,
        first: String,
        second: String,
    },
}

/// Failure talking to the order endpoints.
#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Order request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Order API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Order API rejected the request: {0}")]
    Rejected(String),

    #[error("Order payload could not be decoded: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No item with id '{0}' on the menu")]
    UnknownItem(String),

    #[error("MENU_API_BASE is not set")]
    NotConfigured,
}

/// A browser capability an item asked for but the session cannot offer.
///
/// Always recoverable: callers show a notification and carry on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeatureUnavailable {
    #[error("3D preview is not available for this dish")]
    ArViewer,

    #[error("No video is available for this dish")]
    VideoPlayer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = LoadError::Status {
            url: "http://api/menu/1".to_string(),
            status: 503,
            body: "down".to_string(),
        };
        assert_eq!(err.to_string(), "http://api/menu/1 returned HTTP 503: down");
    }

    #[test]
    fn test_duplicate_id_message_names_both_categories() {
        let err = LoadError::DuplicateItemId {
            id: "paneer".to_string(),
            first: "starters".to_string(),
            second: "mains".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("starters"));
        assert!(msg.contains("mains"));
    }

    #[test]
    fn test_feature_unavailable_is_displayable() {
        assert!(FeatureUnavailable::ArViewer.to_string().contains("3D"));
    }
}
