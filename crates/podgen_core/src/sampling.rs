//! Sampling parameters and their resolution against defaults.

use derive_getters::Getters;
use podgen_error::{EngineError, EngineErrorKind};
use serde::{Deserialize, Serialize};

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Default nucleus sampling threshold.
pub const DEFAULT_TOP_P: f32 = 0.9;
/// Default generation length cap.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
/// Default number of completions.
pub const DEFAULT_N: u32 = 1;
/// Default presence penalty.
pub const DEFAULT_PRESENCE_PENALTY: f32 = 0.0;
/// Default frequency penalty.
pub const DEFAULT_FREQUENCY_PENALTY: f32 = 0.0;

/// Stop condition: a single sequence or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopSequences {
    /// One stop sequence
    One(String),
    /// Several stop sequences
    Many(Vec<String>),
}

impl StopSequences {
    /// Flattens into a list.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            StopSequences::One(s) => vec![s.clone()],
            StopSequences::Many(v) => v.clone(),
        }
    }
}

/// Sampling knobs as supplied in a job. Every field is optional; a `null`
/// counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[builder(setter(into, strip_option), default)]
pub struct SamplingParams {
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Nucleus sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    /// Maximum tokens to generate per completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    /// Number of completions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    n: Option<u32>,
    /// Stop sequences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stop: Option<StopSequences>,
    /// Presence penalty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
    /// Frequency penalty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
}

impl SamplingParams {
    /// Fills unspecified fields with their defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use podgen_core::SamplingParamsBuilder;
    ///
    /// let params = SamplingParamsBuilder::default().n(3u32).build().unwrap();
    /// let config = params.resolve();
    /// assert_eq!(*config.n(), 3);
    /// assert_eq!(*config.max_tokens(), 2048);
    /// assert_eq!(*config.temperature(), 0.7);
    /// ```
    pub fn resolve(&self) -> SamplingConfig {
        SamplingConfig {
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            top_p: self.top_p.unwrap_or(DEFAULT_TOP_P),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            n: self.n.unwrap_or(DEFAULT_N),
            stop: self.stop.as_ref().map(StopSequences::to_vec),
            presence_penalty: self.presence_penalty.unwrap_or(DEFAULT_PRESENCE_PENALTY),
            frequency_penalty: self.frequency_penalty.unwrap_or(DEFAULT_FREQUENCY_PENALTY),
        }
    }
}

/// Fully resolved sampling configuration sent to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct SamplingConfig {
    /// Sampling temperature
    temperature: f32,
    /// Nucleus sampling threshold
    top_p: f32,
    /// Maximum tokens to generate per completion
    max_tokens: u32,
    /// Number of completions
    n: u32,
    /// Stop sequences
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    /// Presence penalty
    presence_penalty: f32,
    /// Frequency penalty
    frequency_penalty: f32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingParams::default().resolve()
    }
}

impl SamplingConfig {
    /// Checks the ranges the engine enforces on its sampling parameters.
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |msg: String| Err(EngineError::new(EngineErrorKind::InvalidSampling(msg)));

        if self.n < 1 {
            return invalid(format!("n must be at least 1, got {}", self.n));
        }
        if self.max_tokens < 1 {
            return invalid(format!(
                "max_tokens must be at least 1, got {}",
                self.max_tokens
            ));
        }
        if !(self.temperature >= 0.0) {
            return invalid(format!(
                "temperature must be non-negative, got {}",
                self.temperature
            ));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return invalid(format!("top_p must be in (0, 1], got {}", self.top_p));
        }
        if !(-2.0..=2.0).contains(&self.presence_penalty) {
            return invalid(format!(
                "presence_penalty must be in [-2, 2], got {}",
                self.presence_penalty
            ));
        }
        if !(-2.0..=2.0).contains(&self.frequency_penalty) {
            return invalid(format!(
                "frequency_penalty must be in [-2, 2], got {}",
                self.frequency_penalty
            ));
        }
        Ok(())
    }
}
