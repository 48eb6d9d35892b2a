//! Opens site pages in the user's browser.

use crate::{AppError, AppResult};

use std::panic::Location;

use error_location::ErrorLocation;
use scribe_gate_core::{Navigation, Navigator};
use tracing::{info, warn};
use url::Url;

/// [`Navigator`] that resolves pages against the site URL and opens them in
/// the default browser without waiting for it.
#[derive(Debug, Clone)]
pub struct BrowserNavigator {
    site_url: Url,
}

impl BrowserNavigator {
    /// Navigator for the site at `site_url`.
    #[track_caller]
    pub fn new(site_url: &str) -> AppResult<Self> {
        let site_url = Url::parse(site_url).map_err(|e| AppError::ConfigError {
            reason: format!("Invalid site URL {:?}: {}", site_url, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(Self { site_url })
    }

    /// Absolute URL of `target`.
    ///
    /// Paths are absolute, so a site URL with a path component is replaced
    /// down to its origin.
    pub fn resolve(&self, target: Navigation) -> Result<Url, url::ParseError> {
        self.site_url.join(target.path())
    }
}

impl Navigator for BrowserNavigator {
    fn navigate(&self, target: Navigation) {
        let url = match self.resolve(target) {
            Ok(url) => url,
            Err(e) => {
                warn!(path = target.path(), error = %e, "Cannot resolve navigation target");
                return;
            }
        };

        match open::that_detached(url.as_str()) {
            Ok(()) => info!(url = %url, "Opened in browser"),
            Err(e) => warn!(url = %url, error = %e, "Failed to open browser"),
        }
    }
}
