//! Bootstrap administrator configuration.

use std::fmt;

use serde::Deserialize;

/// Credentials of the administrator account ensured at startup.
#[derive(Clone, Default, Deserialize)]
pub struct AdminConfig {
    /// Identity of the admin account.
    #[serde(default)]
    pub identity: String,
    /// Initial secret. Only used when the account does not exist yet.
    #[serde(default)]
    pub secret: String,
    /// Email of the admin account.
    #[serde(default)]
    pub email: Option<String>,
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("identity", &self.identity)
            .field("secret", &"[REDACTED]")
            .field("email", &self.email)
            .finish()
    }
}
