//! Engine configuration read from the environment.

use derive_getters::Getters;
use podgen_error::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default model identifier.
pub const DEFAULT_MODEL_NAME: &str = "Qwen/Qwen3-Coder-Next";
const DEFAULT_MAX_MODEL_LEN: u32 = 32768;
const DEFAULT_GPU_MEMORY_UTILIZATION: f32 = 0.90;
const DEFAULT_TENSOR_PARALLEL_SIZE: u32 = 1;
const DEFAULT_MAX_NUM_SEQS: u32 = 256;
const DEFAULT_TOKENIZER_MODE: &str = "auto";
const DEFAULT_ENGINE_COMMAND: &str = "vllm";
const DEFAULT_ENGINE_PORT: u16 = 8000;
const DEFAULT_STARTUP_TIMEOUT_SECS: u64 = 1800;

/// Configuration for the inference engine and its tokenizer.
///
/// Built once at startup and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct EngineConfig {
    /// Model identifier (hub id or local directory)
    #[builder(default = "DEFAULT_MODEL_NAME.to_string()")]
    model_name: String,
    /// Maximum context length
    #[builder(default = "DEFAULT_MAX_MODEL_LEN")]
    max_model_len: u32,
    /// Fraction of GPU memory the engine may use
    #[builder(default = "DEFAULT_GPU_MEMORY_UTILIZATION")]
    gpu_memory_utilization: f32,
    /// Tensor parallelism degree
    #[builder(default = "DEFAULT_TENSOR_PARALLEL_SIZE")]
    tensor_parallel_size: u32,
    /// Allow model repositories to run custom code
    #[builder(default = "true")]
    trust_remote_code: bool,
    /// Quantization mode, if any
    #[builder(default)]
    quantization: Option<String>,
    /// Maximum concurrent sequences
    #[builder(default = "DEFAULT_MAX_NUM_SEQS")]
    max_num_seqs: u32,
    /// Tokenizer mode passed to the engine
    #[builder(default = "DEFAULT_TOKENIZER_MODE.to_string()")]
    tokenizer_mode: String,
    /// Attach to an already running engine instead of launching one
    #[builder(default)]
    base_url: Option<String>,
    /// Executable used to launch the engine
    #[builder(default = "DEFAULT_ENGINE_COMMAND.to_string()")]
    engine_command: String,
    /// Port for a launched engine
    #[builder(default = "DEFAULT_ENGINE_PORT")]
    engine_port: u16,
    /// How long to wait for the engine to become healthy
    #[builder(default = "Duration::from_secs(DEFAULT_STARTUP_TIMEOUT_SECS)")]
    startup_timeout: Duration,
    /// Local directory holding tokenizer files
    #[builder(default)]
    tokenizer_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            max_model_len: DEFAULT_MAX_MODEL_LEN,
            gpu_memory_utilization: DEFAULT_GPU_MEMORY_UTILIZATION,
            tensor_parallel_size: DEFAULT_TENSOR_PARALLEL_SIZE,
            trust_remote_code: true,
            quantization: None,
            max_num_seqs: DEFAULT_MAX_NUM_SEQS,
            tokenizer_mode: DEFAULT_TOKENIZER_MODE.to_string(),
            base_url: None,
            engine_command: DEFAULT_ENGINE_COMMAND.to_string(),
            engine_port: DEFAULT_ENGINE_PORT,
            startup_timeout: Duration::from_secs(DEFAULT_STARTUP_TIMEOUT_SECS),
            tokenizer_path: None,
        }
    }
}

impl EngineConfig {
    /// Returns a builder with every field at its default.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Create config from environment variables
    ///
    /// Reads:
    /// - `MODEL_NAME` (default: "Qwen/Qwen3-Coder-Next")
    /// - `MAX_MODEL_LEN` (default: 32768)
    /// - `GPU_MEMORY_UTILIZATION` (default: 0.90)
    /// - `TENSOR_PARALLEL_SIZE` (default: 1)
    /// - `TRUST_REMOTE_CODE` (default: "true"; only "true" in any case enables it)
    /// - `QUANTIZATION` (optional)
    /// - `MAX_NUM_SEQS` (default: 256)
    /// - `TOKENIZER_MODE` (default: "auto")
    /// - `ENGINE_BASE_URL` (optional)
    /// - `ENGINE_COMMAND` (default: "vllm")
    /// - `ENGINE_PORT` (default: 8000)
    /// - `ENGINE_STARTUP_TIMEOUT_SECS` (default: 1800)
    /// - `TOKENIZER_PATH` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    ///
    /// # Examples
    ///
    /// ```
    /// use podgen_engine::EngineConfig;
    ///
    /// let config = EngineConfig::from_lookup(|key| match key {
    ///     "MODEL_NAME" => Some("facebook/opt-125m".to_string()),
    ///     "TRUST_REMOTE_CODE" => Some("False".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.model_name(), "facebook/opt-125m");
    /// assert!(!*config.trust_remote_code());
    /// assert_eq!(*config.max_model_len(), 32768);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let startup_secs: u64 = parse_var(
            &lookup,
            "ENGINE_STARTUP_TIMEOUT_SECS",
            DEFAULT_STARTUP_TIMEOUT_SECS,
        )?;

        Ok(Self {
            model_name: lookup("MODEL_NAME").unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
            max_model_len: parse_var(&lookup, "MAX_MODEL_LEN", DEFAULT_MAX_MODEL_LEN)?,
            gpu_memory_utilization: parse_var(
                &lookup,
                "GPU_MEMORY_UTILIZATION",
                DEFAULT_GPU_MEMORY_UTILIZATION,
            )?,
            tensor_parallel_size: parse_var(&lookup, "TENSOR_PARALLEL_SIZE", DEFAULT_TENSOR_PARALLEL_SIZE)?,
            trust_remote_code: lookup("TRUST_REMOTE_CODE")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(true),
            quantization: non_empty("QUANTIZATION"),
            max_num_seqs: parse_var(&lookup, "MAX_NUM_SEQS", DEFAULT_MAX_NUM_SEQS)?,
            tokenizer_mode: lookup("TOKENIZER_MODE").unwrap_or_else(|| DEFAULT_TOKENIZER_MODE.to_string()),
            base_url: non_empty("ENGINE_BASE_URL").map(|url| url.trim_end_matches('/').to_string()),
            engine_command: non_empty("ENGINE_COMMAND").unwrap_or_else(|| DEFAULT_ENGINE_COMMAND.to_string()),
            engine_port: parse_var(&lookup, "ENGINE_PORT", DEFAULT_ENGINE_PORT)?,
            startup_timeout: Duration::from_secs(startup_secs),
            tokenizer_path: non_empty("TOKENIZER_PATH").map(PathBuf::from),
        })
    }

    /// Arguments for launching the engine's OpenAI-compatible server.
    ///
    /// # Examples
    ///
    /// ```
    /// use podgen_engine::EngineConfig;
    ///
    /// let args = EngineConfig::default().launch_args();
    /// assert_eq!(args[0], "serve");
    /// assert_eq!(args[1], "Qwen/Qwen3-Coder-Next");
    /// assert!(args.contains(&"--trust-remote-code".to_string()));
    /// assert!(!args.contains(&"--quantization".to_string()));
    /// ```
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = vec![
            "serve".to_string(),
            self.model_name.clone(),
            "--host".to_string(),
            "127.0.0.1".to_string(),
            "--port".to_string(),
            self.engine_port.to_string(),
            "--max-model-len".to_string(),
            self.max_model_len.to_string(),
            "--gpu-memory-utilization".to_string(),
            self.gpu_memory_utilization.to_string(),
            "--tensor-parallel-size".to_string(),
            self.tensor_parallel_size.to_string(),
            "--max-num-seqs".to_string(),
            self.max_num_seqs.to_string(),
            "--tokenizer-mode".to_string(),
            self.tokenizer_mode.clone(),
        ];
        if self.trust_remote_code {
            args.push("--trust-remote-code".to_string());
        }
        if let Some(quantization) = &self.quantization {
            args.push("--quantization".to_string());
            args.push(quantization.clone());
        }
        args
    }

    /// Base URL of a launched engine on the loopback interface.
    pub fn local_base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.engine_port)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            ConfigError::invalid_var(name, &raw, std::any::type_name::<T>())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = EngineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.model_name(), DEFAULT_MODEL_NAME);
        assert_eq!(*config.max_model_len(), 32768);
        assert_eq!(*config.gpu_memory_utilization(), 0.90);
        assert_eq!(*config.tensor_parallel_size(), 1);
        assert!(*config.trust_remote_code());
        assert_eq!(config.quantization(), &None);
        assert_eq!(*config.max_num_seqs(), 256);
        assert_eq!(config.tokenizer_mode(), "auto");
        assert_eq!(config.base_url(), &None);
        assert_eq!(*config.startup_timeout(), Duration::from_secs(1800));
    }

    #[test]
    fn test_builder_defaults_match_environment_defaults() {
        let built = EngineConfig::builder().build().unwrap();
        assert_eq!(built, EngineConfig::default());
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("MAX_MODEL_LEN", "8192"),
            ("GPU_MEMORY_UTILIZATION", "0.5"),
            ("TENSOR_PARALLEL_SIZE", "4"),
            ("QUANTIZATION", "awq"),
            ("TRUST_REMOTE_CODE", "yes"),
            ("ENGINE_BASE_URL", "http://engine:8000/"),
        ]))
        .unwrap();

        assert_eq!(*config.max_model_len(), 8192);
        assert_eq!(*config.gpu_memory_utilization(), 0.5);
        assert_eq!(*config.tensor_parallel_size(), 4);
        assert_eq!(config.quantization().as_deref(), Some("awq"));
        assert!(!*config.trust_remote_code());
        assert_eq!(config.base_url().as_deref(), Some("http://engine:8000"));

        let args = config.launch_args();
        let quant = args.iter().position(|a| a == "--quantization").unwrap();
        assert_eq!(args[quant + 1], "awq");
        assert!(!args.contains(&"--trust-remote-code".to_string()));
    }

    #[test]
    fn test_empty_quantization_means_none() {
        let config = EngineConfig::from_lookup(lookup_from(&[("QUANTIZATION", "")])).unwrap();
        assert_eq!(config.quantization(), &None);
    }

    #[test]
    fn test_unparseable_value_is_an_error() {
        let err = EngineConfig::from_lookup(lookup_from(&[("MAX_MODEL_LEN", "lots")]))
            .unwrap_err();
        assert!(err.message.contains("MAX_MODEL_LEN"));
        assert!(err.message.contains("lots"));
    }
}
