use crate::config::{
    DEFAULT_MODEL_FILE, default_language, default_mirror_to_clipboard, default_use_gpu,
};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Voice capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Recognition language as a BCP 47 tag.
    #[serde(default = "default_language")]
    pub language: String,

    /// Path to the Whisper model file (e.g., ggml-base.en.bin).
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Use GPU for inference if a GPU backend was compiled in (Metal/Vulkan).
    #[serde(default = "default_use_gpu")]
    pub use_gpu: bool,

    /// Copy the prompt to the clipboard whenever a transcript is appended.
    #[serde(default = "default_mirror_to_clipboard")]
    pub mirror_to_clipboard: bool,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models").join(DEFAULT_MODEL_FILE)
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            model_path: default_model_path(),
            use_gpu: default_use_gpu(),
            mirror_to_clipboard: default_mirror_to_clipboard(),
        }
    }
}
