//! Error types for the telemetry client

use thiserror::Error;

/// Admin or write API call that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Ping,
    SetupStatus,
    Setup,
    Signin,
    Signout,
    ListAuthorizations,
    DeleteAuthorization,
    CreateAuthorization,
    OrgLookup,
    Write,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Ping => "ping",
            Operation::SetupStatus => "setup status",
            Operation::Setup => "setup",
            Operation::Signin => "signin",
            Operation::Signout => "signout",
            Operation::ListAuthorizations => "list authorizations",
            Operation::DeleteAuthorization => "delete authorization",
            Operation::CreateAuthorization => "create authorization",
            Operation::OrgLookup => "org lookup",
            Operation::Write => "write",
        };
        write!(f, "{}", name)
    }
}

/// Telemetry client errors
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{operation} failed: {status} - {message}")]
    Api {
        operation: Operation,
        status: u16,
        message: String,
    },

    #[error("no organization named {0} found")]
    OrgNotFound(String),

    #[error("unexpected response body: {0}")]
    Json(#[from] serde_json::Error),
}

impl TelemetryError {
    /// True for 401/403 responses, i.e. bad or missing credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            TelemetryError::Api {
                status: 401 | 403,
                ..
            }
        )
    }

    /// True for 404 responses.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TelemetryError::Api { status: 404, .. })
    }
}

/// Result type for telemetry client operations
pub type Result<T> = std::result::Result<T, TelemetryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = TelemetryError::Api {
            operation: Operation::OrgLookup,
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "org lookup failed: 500 - boom");
    }

    #[test]
    fn test_org_not_found_display() {
        let err = TelemetryError::OrgNotFound("development".to_string());
        assert_eq!(err.to_string(), "no organization named development found");
    }

    #[test]
    fn test_auth_error_classification() {
        let unauthorized = TelemetryError::Api {
            operation: Operation::Signin,
            status: 401,
            message: "unauthorized".to_string(),
        };
        assert!(unauthorized.is_auth_error());
        assert!(!unauthorized.is_not_found());

        let forbidden = TelemetryError::Api {
            operation: Operation::CreateAuthorization,
            status: 403,
            message: "forbidden".to_string(),
        };
        assert!(forbidden.is_auth_error());

        let missing = TelemetryError::Api {
            operation: Operation::DeleteAuthorization,
            status: 404,
            message: "not found".to_string(),
        };
        assert!(missing.is_not_found());
        assert!(!missing.is_auth_error());
    }
}
