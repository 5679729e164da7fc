use serde::Deserialize;
use thiserror::Error;

/// Failures surfaced to the user by API calls and session storage. The `Display` text is what the
/// views show.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("No response from server. Please try again.")]
    Network(String),
    #[error("Authentication required. Please login.")]
    NotAuthenticated,
    /// The server refused the credentials. Carries the server's reason when it gave one.
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("Unexpected response from server: {0}")]
    Decode(String),
    #[error("Could not access browser storage: {0}")]
    Storage(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl ClientError {
    /// Maps a non-success HTTP status and its body to an error, preferring the server's own
    /// `{"error": "..."}` text when present.
    pub fn from_status(status: u16, body: &str) -> ClientError {
        let server_message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error.or(b.message))
            .filter(|m| !m.trim().is_empty());
        match status {
            401 => ClientError::Unauthorized(server_message.unwrap_or_else(|| {
                "Authentication expired. Please login again.".to_string()
            })),
            404 => ClientError::NotFound(server_message.unwrap_or_else(|| "Not found".to_string())),
            400 => ClientError::BadRequest(
                server_message.unwrap_or_else(|| "Invalid request".to_string()),
            ),
            _ => ClientError::Server {
                status,
                message: server_message.unwrap_or_else(|| format!("Server error: {}", status)),
            },
        }
    }

    /// True when the session token must be discarded and the user sent back to the login page.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthorized(_) | ClientError::NotAuthenticated
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

impl From<gloo_net::Error> for ClientError {
    fn from(e: gloo_net::Error) -> Self {
        match e {
            gloo_net::Error::SerdeError(e) => ClientError::Decode(e.to_string()),
            other => ClientError::Network(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_uses_server_message() {
        let err = ClientError::from_status(404, r#"{"error": "Olympiad not found"}"#);
        assert_eq!(err, ClientError::NotFound("Olympiad not found".to_string()));
        assert_eq!(err.to_string(), "Olympiad not found");
        assert!(err.is_not_found());

        let err = ClientError::from_status(400, r#"{"error": "Code is required"}"#);
        assert_eq!(err.to_string(), "Code is required");
    }

    #[test]
    fn test_from_status_fallbacks() {
        assert_eq!(
            ClientError::from_status(404, "").to_string(),
            "Not found".to_string()
        );
        assert_eq!(
            ClientError::from_status(400, "<html>").to_string(),
            "Invalid request".to_string()
        );
        assert_eq!(
            ClientError::from_status(500, r#"{"error": ""}"#),
            ClientError::Server {
                status: 500,
                message: "Server error: 500".to_string()
            }
        );
        assert_eq!(
            ClientError::from_status(503, r#"{"message": "Judge offline"}"#).to_string(),
            "Judge offline"
        );
    }

    #[test]
    fn test_unauthorized_requires_login() {
        let err = ClientError::from_status(401, r#"{"error": "Token expired"}"#);
        assert_eq!(err, ClientError::Unauthorized("Token expired".to_string()));
        assert!(err.requires_login());
        assert_eq!(
            ClientError::from_status(401, "").to_string(),
            "Authentication expired. Please login again."
        );
        assert!(ClientError::NotAuthenticated.requires_login());
        assert!(!ClientError::Network("timeout".to_string()).requires_login());
    }
}
