use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// A signed-in session as issued by the auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default = "bearer")]
    pub token_type: String,
    pub user: AuthUser,
}

fn bearer() -> String {
    "bearer".to_string()
}

impl Session {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// What the navigation bar shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavState {
    SignedOut,
    SignedIn { email: String },
}

impl NavState {
    pub fn from_session(session: Option<&Session>) -> Self {
        match session {
            Some(s) => NavState::SignedIn {
                email: s.user.email.clone().unwrap_or_default(),
            },
            None => NavState::SignedOut,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, NavState::SignedIn { .. })
    }

    /// Labels of the actions offered, left to right.
    pub fn actions(&self) -> &'static [&'static str] {
        match self {
            NavState::SignedIn { .. } => &["Post Item", "Sign Out"],
            NavState::SignedOut => &["Sign In"],
        }
    }
}
