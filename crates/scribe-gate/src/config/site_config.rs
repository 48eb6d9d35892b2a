use crate::config::{default_redirect_on_auth_failure, default_site_url};

use serde::{Deserialize, Serialize};

/// The web site whose pages the session commands navigate to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL that `/` and `/login.html` are resolved against.
    #[serde(default = "default_site_url")]
    pub url: String,

    /// Open the login page when a request has no valid session.
    #[serde(default = "default_redirect_on_auth_failure")]
    pub redirect_on_auth_failure: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: default_site_url(),
            redirect_on_auth_failure: default_redirect_on_auth_failure(),
        }
    }
}
