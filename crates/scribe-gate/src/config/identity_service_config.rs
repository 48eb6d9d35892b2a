use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity service connection settings.
///
/// Both values may be left out of the file and supplied through the
/// environment instead.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct IdentityServiceConfig {
    /// Project URL, e.g. `https://xyzcompany.supabase.co`.
    #[serde(default)]
    pub url: Option<String>,
    /// Public (anonymous) API key.
    #[serde(default)]
    pub public_key: Option<String>,
}

impl fmt::Debug for IdentityServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityServiceConfig")
            .field("url", &self.url)
            .field("public_key", &self.public_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
