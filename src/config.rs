use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "fingerspell.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub suggestions: SuggestionConfig,
}

// ============================================================================
// Speech Config
// ============================================================================

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeechEngineKind {
    /// External program (`say`, `espeak`, ...) given the text as last argument
    #[default]
    Command,
    /// Log only
    Silent,
}

#[derive(Debug, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub engine: SpeechEngineKind,
    /// Overrides the platform default (`say` on macOS, `espeak` elsewhere)
    #[serde(default)]
    pub program: Option<String>,
    /// Extra arguments placed before the text, only used with `program`
    #[serde(default)]
    pub args: Vec<String>,
    /// Words per minute for the platform default
    #[serde(default = "default_rate")]
    pub rate: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            engine: SpeechEngineKind::default(),
            program: None,
            args: Vec::new(),
            rate: default_rate(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_rate() -> u32 {
    175
}

// ============================================================================
// Suggestion Config
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SuggestionConfig {
    /// Word list, one word per line. Built-in list when unset.
    #[serde(default)]
    pub dictionary: Option<String>,
    #[serde(default = "default_max_suggestions")]
    pub max: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            dictionary: None,
            max: default_max_suggestions(),
        }
    }
}

fn default_max_suggestions() -> usize {
    4
}

impl Config {
    /// Load from `path`, or `fingerspell.toml` if present. A missing or
    /// broken file means defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Config::default();
        }
        match fs::read_to_string(path) {
            Ok(s) => Self::parse(&s).unwrap_or_else(|e| {
                tracing::warn!("ignoring {}: {}", path.display(), e);
                Config::default()
            }),
            Err(e) => {
                tracing::warn!("could not read {}: {}", path.display(), e);
                Config::default()
            }
        }
    }

    pub fn parse(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
