//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

#[cfg(test)]
#[path = "validator_tests.rs"]
mod validator_tests;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_health(config, &mut result);
        Self::validate_monitor(config, &mut result);
        Self::validate_summary(config, &mut result);
        Self::validate_telegram(config, &mut result);

        Ok(result)
    }

    fn validate_health(config: &Config, result: &mut ValidationResult) {
        if config.health.url.is_empty() {
            result.add_error(ValidationError::new(
                "health.url",
                "URL cannot be empty",
            ));
        }

        if config.health.timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "health.timeout_secs",
                "timeout must be greater than 0",
            ));
        }
    }

    fn validate_monitor(config: &Config, result: &mut ValidationResult) {
        if config.monitor.poll_interval_secs == 0 {
            result.add_error(ValidationError::new(
                "monitor.poll_interval_secs",
                "poll interval must be greater than 0",
            ));
        }

        if config.monitor.status_update_interval_secs == 0 {
            result.add_error(ValidationError::new(
                "monitor.status_update_interval_secs",
                "status update interval must be greater than 0",
            ));
        }

        for (path, value) in [
            ("monitor.cpu_threshold", config.monitor.cpu_threshold),
            ("monitor.memory_threshold", config.monitor.memory_threshold),
            ("monitor.disk_threshold", config.monitor.disk_threshold),
        ] {
            if value <= 0.0 || value > 100.0 {
                result.add_error(ValidationError::new(
                    path,
                    "threshold must be in (0, 100]",
                ));
            }
        }

        if config.monitor.cpu_samples == 0 {
            result.add_error(ValidationError::new(
                "monitor.cpu_samples",
                "at least one CPU reading per check is required",
            ));
        }

        if config.monitor.alert_repeat_secs < config.monitor.poll_interval_secs {
            result.add_warning(ValidationWarning::new(
                "monitor.alert_repeat_secs",
                "repeat interval is shorter than the poll interval, identical alerts may fire on every iteration",
            ));
        }
    }

    fn validate_summary(config: &Config, result: &mut ValidationResult) {
        if config.summary.hour >= 24 {
            result.add_error(ValidationError::new(
                "summary.hour",
                "hour must be in 0..=23",
            ));
        }

        if config.summary.minute >= 60 {
            result.add_error(ValidationError::new(
                "summary.minute",
                "minute must be in 0..=59",
            ));
        }
    }

    fn validate_telegram(config: &Config, result: &mut ValidationResult) {
        if !config.telegram.is_configured() {
            result.add_warning(ValidationWarning::new(
                "telegram",
                "bot_token or chat_id missing, notifications will only be logged",
            ));
        }
    }
}
