mod identity_service_config;
#[allow(clippy::module_inception)]
mod config;
mod site_config;
mod voice_config;

pub(crate) use {
    config::Config, identity_service_config::IdentityServiceConfig, site_config::SiteConfig,
    voice_config::VoiceConfig,
};

pub(crate) const DEFAULT_SITE_URL: &str = "http://localhost:5000";
pub(crate) const DEFAULT_REDIRECT_ON_AUTH_FAILURE: bool = true;
pub(crate) const DEFAULT_MODEL_FILE: &str = "ggml-base.en.bin";
pub(crate) const DEFAULT_USE_GPU: bool = true;
pub(crate) const DEFAULT_MIRROR_TO_CLIPBOARD: bool = true;

/// Environment variable overriding `identity.url`.
pub(crate) const ENV_IDENTITY_URL: &str = "SUPABASE_URL";
/// Environment variable overriding `identity.public_key`.
pub(crate) const ENV_IDENTITY_KEY: &str = "SUPABASE_KEY";

pub(crate) fn default_site_url() -> String {
    DEFAULT_SITE_URL.to_string()
}

pub(crate) fn default_redirect_on_auth_failure() -> bool {
    DEFAULT_REDIRECT_ON_AUTH_FAILURE
}

pub(crate) fn default_language() -> String {
    scribe_gate_core::DEFAULT_LANGUAGE.to_string()
}

pub(crate) fn default_use_gpu() -> bool {
    DEFAULT_USE_GPU
}

pub(crate) fn default_mirror_to_clipboard() -> bool {
    DEFAULT_MIRROR_TO_CLIPBOARD
}
