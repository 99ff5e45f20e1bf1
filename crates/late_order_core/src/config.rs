use thiserror::Error;

pub const LATE_ORDER_THRESHOLD_ENV: &str = "LATE_ORDER_THRESHOLD";
pub const DDB_TABLE_NAME_ENV: &str = "DDB_TABLE_NAME";
pub const SNS_TOPIC_ARN_ENV: &str = "SNS_TOPIC_ARN";

const MILLIS_PER_MINUTE: f64 = 60_000.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{key} must be configured")]
    Missing { key: &'static str },

    #[error("LATE_ORDER_THRESHOLD must be a number of minutes, got '{value}'")]
    InvalidThreshold { value: String },

    #[error("LATE_ORDER_THRESHOLD cannot be negative, got {minutes}")]
    NegativeThreshold { minutes: f64 },
}

/// How long an order may stay open before it counts as late.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LateThreshold {
    millis: i64,
}

impl LateThreshold {
    pub fn from_minutes(minutes: f64) -> Result<Self, ConfigError> {
        if !minutes.is_finite() {
            return Err(ConfigError::InvalidThreshold {
                value: minutes.to_string(),
            });
        }
        if minutes < 0.0 {
            return Err(ConfigError::NegativeThreshold { minutes });
        }

        // `as` saturates at i64::MAX for absurdly large thresholds.
        Ok(Self {
            millis: (minutes * MILLIS_PER_MINUTE).round() as i64,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        let minutes = trimmed
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidThreshold {
                value: raw.to_string(),
            })?;
        Self::from_minutes(minutes)
    }

    pub fn millis(self) -> i64 {
        self.millis
    }
}

/// Only the threshold is required up front. A missing table name or topic
/// ARN surfaces later as a failed query or a failed publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub threshold: LateThreshold,
    pub table_name: Option<String>,
    pub topic_arn: Option<String>,
}

impl MonitorConfig {
    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_threshold =
            optional(&lookup, LATE_ORDER_THRESHOLD_ENV).ok_or(ConfigError::Missing {
                key: LATE_ORDER_THRESHOLD_ENV,
            })?;
        let threshold = LateThreshold::parse(&raw_threshold)?;

        Ok(Self {
            threshold,
            table_name: optional(&lookup, DDB_TABLE_NAME_ENV),
            topic_arn: optional(&lookup, SNS_TOPIC_ARN_ENV),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Resolves a setting the adapters need, reporting it by key when absent.
pub fn require_setting<'a>(
    value: Option<&'a str>,
    key: &'static str,
) -> Result<&'a str, String> {
    value.ok_or_else(|| ConfigError::Missing { key }.to_string())
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
