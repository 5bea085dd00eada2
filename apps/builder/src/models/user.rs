use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

const USER_ID_HEADER: &str = "x-user-id";
const USER_NAME_HEADER: &str = "x-user-name";

/// Identity resolved by the upstream auth layer. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: String,
}

/// Ambient session state handed to generation and delivery at call time.
/// Populated per request and never mutated by the wizard.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub current_user: Option<CurrentUser>,
    /// Opaque cookie string forwarded to the generation service.
    pub credential: Option<String>,
}

impl SessionContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let current_user = read(USER_ID_HEADER).map(|id| CurrentUser {
            display_name: read(USER_NAME_HEADER).unwrap_or_else(|| id.clone()),
            id,
        });

        SessionContext {
            current_user,
            credential: read(header::COOKIE.as_str()),
        }
    }
}
