//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// How strictly free-form answers are interpreted.
///
/// Both variants are attested behaviors of the assessment; neither is
/// silently preferred, so the choice is a configuration knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsingProfile {
    /// Yes/no must be the entire trimmed input; numbers must lie in [0,100].
    Strict,
    /// Yes/no by containment; numbers parsed loosely and clamped.
    #[default]
    Lenient,
}

/// Which rule set the risk scoring engine applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringProfile {
    /// Onboarding-progress, time-decay, contact, and academic rules.
    /// Tiers at 80/60.
    #[default]
    Progress,
    /// Academic and study-habit rules only. Tiers at 70/40.
    Academic,
}

/// Assessment behavior knobs.
#[derive(Debug, Clone, Default)]
pub struct AssessmentConfig {
    pub parsing: ParsingProfile,
    pub scoring: ScoringProfile,
    /// Ask the five study-habit questions before the subject questions.
    pub include_baseline: bool,
}

/// Narrative text-service connection settings.
#[derive(Debug, Clone)]
pub struct NarrativeConfig {
    pub base_url: String,
    pub model: String,
    /// Optional bearer token for hosted deployments.
    pub api_key: Option<SecretString>,
    /// Calls past this deadline fall back deterministically.
    pub timeout: Duration,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2:1b".to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub assessment: AssessmentConfig,
    pub narrative: NarrativeConfig,
    /// Sessions idle past this are pruned by the sweep task.
    pub session_idle_timeout: Duration,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assessment: AssessmentConfig::default(),
            narrative: NarrativeConfig::default(),
            session_idle_timeout: Duration::from_secs(3600),
            port: 9001,
        }
    }
}

impl AppConfig {
    /// Build configuration from `RETENTION_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("RETENTION_NARRATIVE_URL") {
            config.narrative.base_url = url;
        }
        if let Ok(model) = std::env::var("RETENTION_NARRATIVE_MODEL") {
            config.narrative.model = model;
        }
        if let Ok(key) = std::env::var("RETENTION_NARRATIVE_API_KEY") {
            config.narrative.api_key = Some(SecretString::from(key));
        }
        if let Ok(secs) = std::env::var("RETENTION_NARRATIVE_TIMEOUT_SECS") {
            config.narrative.timeout = Duration::from_secs(parse_u64(
                "RETENTION_NARRATIVE_TIMEOUT_SECS",
                &secs,
            )?);
        }
        if let Ok(secs) = std::env::var("RETENTION_SESSION_IDLE_SECS") {
            config.session_idle_timeout =
                Duration::from_secs(parse_u64("RETENTION_SESSION_IDLE_SECS", &secs)?);
        }
        if let Ok(port) = std::env::var("RETENTION_PORT") {
            config.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "RETENTION_PORT".to_string(),
                message: format!("not a valid port: {port}"),
            })?;
        }
        if let Ok(profile) = std::env::var("RETENTION_PARSING") {
            config.assessment.parsing = match profile.as_str() {
                "strict" => ParsingProfile::Strict,
                "lenient" => ParsingProfile::Lenient,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "RETENTION_PARSING".to_string(),
                        message: format!("expected strict|lenient, got {other}"),
                    });
                }
            };
        }
        if let Ok(profile) = std::env::var("RETENTION_SCORING") {
            config.assessment.scoring = match profile.as_str() {
                "progress" => ScoringProfile::Progress,
                "academic" => ScoringProfile::Academic,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "RETENTION_SCORING".to_string(),
                        message: format!("expected progress|academic, got {other}"),
                    });
                }
            };
        }
        if let Ok(flag) = std::env::var("RETENTION_BASELINE_QUESTIONS") {
            config.assessment.include_baseline = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("not a valid number of seconds: {value}"),
    })
}
