// src/config.rs
use anyhow::{Context, Result};
use dirs::{config_dir, home_dir};
use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};
use swipetype::{
    layout::Rect,
    stream::timing::DEFAULT_DOUBLE_TAP_WINDOW,
    suggest::{Tone, DEFAULT_QUIET_PERIOD, DEFAULT_REQUEST_TIMEOUT},
    KeyCap, KeyOutput, ScoringWeights,
};

const APP_NAME: &str = "swipetype";
const DEFAULT_SURFACE: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 4096.0,
    height: 1600.0,
};

#[derive(Debug)]
pub struct AppConfig {
    pub dictionary_path: Option<PathBuf>,
    /// Keyboard area in touch device units.
    pub surface: Rect,
    pub shift_double_tap: Duration,
    pub scoring: ScoringWeights,
    pub suggestions: SuggestionConfig,
}

#[derive(Debug)]
pub struct SuggestionConfig {
    pub endpoint: Option<String>,
    pub tone: Tone,
    pub writing_style_path: Option<PathBuf>,
    pub debounce: Duration,
    pub timeout: Duration,
    /// Tapping this key while suggestions are shown accepts the first one.
    pub accept_key: Option<KeyOutput>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    Validation(String),
    #[error("Missing required directory path")]
    MissingDirectory,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let mut config = Self::defaults()?;

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let content = std::fs::read_to_string(&config_path)
                    .with_context(|| format!("Failed to read {}", config_path.display()))?;
                Self::parse_ini(&content, &mut config)?;
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn parse_ini(content: &str, config: &mut Self) -> Result<()> {
        for line in content.lines() {
            let line = line.trim().split(';').next().unwrap_or("").trim(); // Handle comments
            if line.is_empty() || line.starts_with('[') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().to_lowercase();
                let value = value.trim();

                match key.as_str() {
                    "dictionary_path" => {
                        config.dictionary_path = Some(
                            Self::expand_path(value).context("Failed to expand dictionary path")?,
                        );
                    }
                    "surface_x" => config.surface.x = parse_number(&key, value)?,
                    "surface_y" => config.surface.y = parse_number(&key, value)?,
                    "surface_width" => config.surface.width = parse_number(&key, value)?,
                    "surface_height" => config.surface.height = parse_number(&key, value)?,
                    "shift_double_tap" => config.shift_double_tap = parse_millis(&key, value)?,
                    "coverage_weight" => config.scoring.coverage = parse_number(&key, value)?,
                    "end_match_bonus" => config.scoring.end_match_bonus = parse_number(&key, value)?,
                    "end_mismatch_penalty" => {
                        config.scoring.end_mismatch_penalty = parse_number(&key, value)?
                    }
                    "extra_letter_weight" => config.scoring.extra_letter = parse_number(&key, value)?,
                    "length_diff_weight" => config.scoring.length_diff = parse_number(&key, value)?,
                    "tie_break" => {
                        config.scoring.tie_break = value.parse().map_err(ConfigError::Validation)?;
                    }
                    "suggestion_endpoint" => {
                        config.suggestions.endpoint = Some(value.to_string()).filter(|v| !v.is_empty());
                    }
                    "suggestion_tone" => {
                        config.suggestions.tone = value.parse().map_err(ConfigError::Validation)?;
                    }
                    "writing_style_path" => {
                        config.suggestions.writing_style_path = Some(
                            Self::expand_path(value).context("Failed to expand writing style path")?,
                        );
                    }
                    "suggestion_debounce" => config.suggestions.debounce = parse_millis(&key, value)?,
                    "suggestion_timeout" => config.suggestions.timeout = parse_millis(&key, value)?,
                    "suggestion_accept_key" => {
                        config.suggestions.accept_key = parse_accept_key(value)?;
                    }
                    _ => continue,
                }
            }
        }

        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        config_dir().map(|path| path.join(APP_NAME).join("config.ini"))
    }

    fn defaults() -> Result<Self> {
        let default_dictionary = Self::default_dictionary_path()?;
        Ok(Self {
            dictionary_path: Some(default_dictionary).filter(|path| path.exists()),
            surface: DEFAULT_SURFACE,
            shift_double_tap: DEFAULT_DOUBLE_TAP_WINDOW,
            scoring: ScoringWeights::default(),
            suggestions: SuggestionConfig {
                endpoint: None,
                tone: Tone::default(),
                writing_style_path: None,
                debounce: DEFAULT_QUIET_PERIOD,
                timeout: DEFAULT_REQUEST_TIMEOUT,
                accept_key: None,
            },
        })
    }

    fn default_dictionary_path() -> Result<PathBuf> {
        effective_user_dir()
            .map(|path| path.join(".config").join(APP_NAME).join("words.txt"))
    }

    fn expand_path(path: &str) -> Result<PathBuf> {
        let path = Path::new(path);

        if let Ok(rest) = path.strip_prefix("~") {
            let home = effective_user_dir()?;
            return Ok(home.join(rest));
        }

        Ok(path.to_path_buf())
    }

    fn validate(&self) -> Result<()> {
        for path in [&self.dictionary_path, &self.suggestions.writing_style_path]
            .into_iter()
            .flatten()
        {
            if !path.exists() {
                return Err(ConfigError::Validation(format!(
                    "Path {} does not exist or can't be accessed",
                    path.display()
                ))
                .into());
            }
        }

        if !(self.surface.width > 0.0 && self.surface.height > 0.0) {
            return Err(ConfigError::Validation(format!(
                "Surface must have a positive size (got {}x{})",
                self.surface.width, self.surface.height
            ))
            .into());
        }

        if self.shift_double_tap > Duration::from_secs(1) {
            return Err(ConfigError::Validation(format!(
                "Shift double tap window cannot exceed 1000ms (got {}ms)",
                self.shift_double_tap.as_millis()
            ))
            .into());
        }

        if self.suggestions.debounce > Duration::from_secs(10) {
            return Err(ConfigError::Validation(format!(
                "Suggestion debounce cannot exceed 10000ms (got {}ms)",
                self.suggestions.debounce.as_millis()
            ))
            .into());
        }

        let weights = &self.scoring;
        let all_finite = [
            weights.coverage,
            weights.end_match_bonus,
            weights.end_mismatch_penalty,
            weights.extra_letter,
            weights.length_diff,
        ]
        .iter()
        .all(|w| w.is_finite());
        if !all_finite {
            return Err(ConfigError::Validation("Scoring weights must be finite".to_string()).into());
        }

        Ok(())
    }
}

fn parse_number(key: &str, value: &str) -> Result<f32> {
    value
        .parse()
        .with_context(|| format!("Failed to parse {}", key))
}

fn parse_millis(key: &str, value: &str) -> Result<Duration> {
    Ok(Duration::from_millis(
        value
            .parse()
            .with_context(|| format!("Failed to parse {}", key))?,
    ))
}

fn parse_accept_key(value: &str) -> Result<Option<KeyOutput>, ConfigError> {
    if value.is_empty() || value == "none" {
        return Ok(None);
    }
    KeyCap::from_label(value)
        .and_then(KeyOutput::from_cap)
        .map(Some)
        .ok_or_else(|| ConfigError::Validation(format!("suggestion_accept_key: '{}' produces no key output", value)))
}

fn effective_user_dir() -> Result<PathBuf> {
    match env::var_os("SUDO_USER") {
        Some(user) => Ok(PathBuf::from("/home").join(user)),
        None => home_dir().ok_or(ConfigError::MissingDirectory.into()),
    }
}
