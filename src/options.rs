use crate::{Result, ScraperError};

/// Configures timeout, retry and debug behavior.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
    /// Linear back-off factor in seconds: the delay after failed attempt `n`
    /// is `delay_multiplier * n` seconds.
    pub delay_multiplier: f64,
    /// Emit progress and timing messages to the debug sink.
    pub debug: bool,
    /// Show the API key in debug URIs instead of a placeholder.
    pub show_api_key: bool,
    /// Maximum number of characters of response body kept in HTTP errors.
    pub max_error_length: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            max_attempts: 3,
            delay_multiplier: 1.0,
            debug: false,
            show_api_key: false,
            max_error_length: 250,
        }
    }
}

impl ClientOptions {
    /// Checks the invariants the retry engine relies on.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(ScraperError::Configuration(
                "max_attempts must be at least 1".to_owned(),
            ));
        }
        if !self.delay_multiplier.is_finite() || self.delay_multiplier < 0.0 {
            return Err(ScraperError::Configuration(format!(
                "delay_multiplier must be a finite non-negative number, got {}",
                self.delay_multiplier
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ClientOptions;
    use crate::ScraperError;

    #[test]
    fn defaults_are_valid() {
        assert!(ClientOptions::default().validate().is_ok());
    }

    #[test]
    fn zero_attempts_rejected() {
        let opts = ClientOptions {
            max_attempts: 0,
            ..ClientOptions::default()
        };
        assert!(matches!(
            opts.validate(),
            Err(ScraperError::Configuration(_))
        ));
    }

    #[test]
    fn negative_or_nan_multiplier_rejected() {
        for multiplier in [-1.0, f64::NAN, f64::INFINITY] {
            let opts = ClientOptions {
                delay_multiplier: multiplier,
                ..ClientOptions::default()
            };
            assert!(opts.validate().is_err(), "{multiplier} must be rejected");
        }
    }
}
