use photo_normalize::NormalizerOptions;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Inference service used when no endpoint is configured
pub const DEFAULT_ENDPOINT: &str =
    "https://y5g57wmwjnuvginytmt3e6hbgy0mjout.lambda-url.us-east-1.on.aws/";

/// Longest accepted per-character reveal delay
pub const MAX_REVEAL_DELAY_MS: u64 = 1000;

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// URL the normalized image is POSTed to
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Widest allowed payload in pixels
    pub max_width: u32,

    /// JPEG quality on the 0-1 scale
    pub jpeg_quality: f32,

    /// Files larger than this are rejected before decoding
    pub max_input_bytes: usize,

    /// Delay between revealed advice characters, in milliseconds
    pub reveal_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
            max_width: photo_normalize::MAX_WIDTH,
            jpeg_quality: photo_normalize::DEFAULT_QUALITY,
            max_input_bytes: photo_normalize::DEFAULT_MAX_INPUT_BYTES,
            reveal_delay_ms: 20,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No config file given, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str::<Self>(&content) {
                Ok(config) => {
                    let config = config.validate();
                    tracing::info!(
                        path = %path.display(),
                        endpoint = %config.endpoint,
                        timeout_secs = config.timeout_secs,
                        max_width = config.max_width,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), %e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), %e, "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Clamp out-of-range values back into usable ones.
    pub fn validate(mut self) -> Self {
        let defaults = Self::default();

        if self.endpoint.trim().is_empty() {
            tracing::warn!("Empty endpoint in config, using default");
            self.endpoint = defaults.endpoint;
        }
        if self.timeout_secs == 0 {
            tracing::warn!("timeout_secs must be positive, using default");
            self.timeout_secs = defaults.timeout_secs;
        }
        if self.max_width == 0 {
            tracing::warn!("max_width must be positive, clamping to 1");
            self.max_width = 1;
        }
        if !self.jpeg_quality.is_finite() || self.jpeg_quality <= 0.0 || self.jpeg_quality > 1.0
        {
            tracing::warn!(
                jpeg_quality = self.jpeg_quality,
                "jpeg_quality must be in (0, 1], using default"
            );
            self.jpeg_quality = defaults.jpeg_quality;
        }
        if self.max_input_bytes == 0 {
            self.max_input_bytes = defaults.max_input_bytes;
        }
        if self.reveal_delay_ms > MAX_REVEAL_DELAY_MS {
            tracing::warn!(
                reveal_delay_ms = self.reveal_delay_ms,
                max = MAX_REVEAL_DELAY_MS,
                "reveal_delay_ms too large, clamping"
            );
            self.reveal_delay_ms = MAX_REVEAL_DELAY_MS;
        }

        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn normalizer_options(&self) -> NormalizerOptions {
        NormalizerOptions {
            max_width: self.max_width,
            quality: self.jpeg_quality,
            max_input_bytes: self.max_input_bytes,
        }
    }
}
