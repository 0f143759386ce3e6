//! Configuration types for the conversion engine and the bot binary.
//!
//! All conversion behaviour is controlled through [`ConvertConfig`], built via
//! its [`ConvertConfigBuilder`]. Keeping every knob in one struct means the
//! serving loop owns a single immutable value it can hand to each request
//! task — there is no process-wide mutable configuration state anywhere.

use crate::error::ConvertError;
use std::path::PathBuf;

/// Placeholder token value shipped in example `.env` files; treated the same
/// as an unset token.
const TOKEN_PLACEHOLDER: &str = "YOUR_TELEGRAM_BOT_TOKEN_HERE";

/// Configuration for a document-to-PDF conversion.
///
/// Built via [`ConvertConfig::builder()`] or [`ConvertConfig::default()`].
///
/// # Example
/// ```rust
/// use office2pdf::ConvertConfig;
///
/// let config = ConvertConfig::builder()
///     .converter_bin("soffice")
///     .timeout_secs(90)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Converter executable name or path. Default: `soffice`.
    ///
    /// Resolved through `PATH` when not absolute, so a container image only
    /// needs LibreOffice on its path. Point this at `libreoffice` or a wrapper
    /// script if your distribution names the binary differently.
    pub converter_bin: PathBuf,

    /// Hard wall-clock timeout for one converter invocation, in seconds.
    /// Default: 90.
    ///
    /// soffice is a single-instance, stateful background process that can
    /// wedge independently of any request. The engine must never block a
    /// request task indefinitely, so the timeout is enforced here and the
    /// child is killed when it fires — never delegated to the adapter layer.
    pub timeout_secs: u64,

    /// Parent directory for per-request scratch directories.
    /// `None` (default) means the system temp dir.
    pub scratch_root: Option<PathBuf>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            converter_bin: PathBuf::from("soffice"),
            timeout_secs: 90,
            scratch_root: None,
        }
    }
}

impl ConvertConfig {
    /// Create a new builder for `ConvertConfig`.
    pub fn builder() -> ConvertConfigBuilder {
        ConvertConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConvertConfig`].
#[derive(Debug)]
pub struct ConvertConfigBuilder {
    config: ConvertConfig,
}

impl ConvertConfigBuilder {
    pub fn converter_bin(mut self, bin: impl Into<PathBuf>) -> Self {
        self.config.converter_bin = bin.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.scratch_root = Some(root.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConvertConfig, ConvertError> {
        let c = &self.config;
        if c.timeout_secs == 0 {
            return Err(ConvertError::InvalidConfig(
                "timeout_secs must be ≥ 1".into(),
            ));
        }
        if c.converter_bin.as_os_str().is_empty() {
            return Err(ConvertError::InvalidConfig(
                "converter_bin must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Configuration for the Telegram bot binary.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram Bot API token. Required; the process must not start serving
    /// without it.
    pub token: String,
    /// Conversion engine settings shared by every request task.
    pub convert: ConvertConfig,
}

impl BotConfig {
    /// Build a `BotConfig` from an already-resolved token.
    ///
    /// An empty token or the example placeholder is a fatal startup condition,
    /// reported before the serving loop is entered.
    pub fn new(token: impl Into<String>, convert: ConvertConfig) -> Result<Self, ConvertError> {
        let token = token.into();
        if token.is_empty() || token == TOKEN_PLACEHOLDER {
            return Err(ConvertError::InvalidConfig(
                "BOT_TOKEN is not set. Put a real bot token in the environment or .env file."
                    .into(),
            ));
        }
        Ok(Self { token, convert })
    }

    /// Read the token from the `BOT_TOKEN` environment variable.
    pub fn from_env(convert: ConvertConfig) -> Result<Self, ConvertError> {
        let token = std::env::var("BOT_TOKEN").unwrap_or_default();
        Self::new(token, convert)
    }
}
