//! Model tokenizer loading.

use crate::{ChatTemplate, EngineConfig, PromptTokenizer};
use hf_hub::api::tokio::Api;
use podgen_error::{TokenizerError, TokenizerErrorKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer as HfTokenizer;
use tracing::{debug, info, instrument, warn};

const TOKENIZER_FILE: &str = "tokenizer.json";
const TOKENIZER_CONFIG_FILE: &str = "tokenizer_config.json";

/// Tokenizer for the served model plus its optional chat template.
pub struct ModelTokenizer {
    inner: HfTokenizer,
    chat_template: Option<ChatTemplate>,
}

impl std::fmt::Debug for ModelTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelTokenizer")
            .field("vocab_size", &self.inner.get_vocab_size(true))
            .field("chat_template", &self.chat_template.is_some())
            .finish()
    }
}

impl ModelTokenizer {
    /// Loads the tokenizer named by the configuration.
    ///
    /// Looks in `TOKENIZER_PATH` first, then in `MODEL_NAME` when it is a
    /// local directory, and otherwise downloads from the model hub.
    #[instrument(skip(config), fields(model = %config.model_name(), mode = %config.tokenizer_mode()))]
    pub async fn load(config: &EngineConfig) -> Result<Self, TokenizerError> {
        let model_dir = Path::new(config.model_name());

        let (tokenizer_file, config_file) = if let Some(dir) = config.tokenizer_path() {
            info!(path = %dir.display(), "Loading tokenizer from TOKENIZER_PATH");
            local_files(dir)
        } else if model_dir.is_dir() {
            info!(path = %model_dir.display(), "Loading tokenizer from model directory");
            local_files(model_dir)
        } else {
            info!("Fetching tokenizer files from the model hub");
            hub_files(config.model_name()).await?
        };

        Self::from_files(&tokenizer_file, config_file.as_deref())
    }

    /// Loads `tokenizer.json` and, if given, `tokenizer_config.json`.
    pub fn from_files(
        tokenizer_file: &Path,
        config_file: Option<&Path>,
    ) -> Result<Self, TokenizerError> {
        let inner = HfTokenizer::from_file(tokenizer_file).map_err(|e| {
            TokenizerError::new(TokenizerErrorKind::Load(format!(
                "{}: {}",
                tokenizer_file.display(),
                e
            )))
        })?;
        debug!(path = %tokenizer_file.display(), vocab = inner.get_vocab_size(true), "Loaded tokenizer");

        let chat_template = match config_file {
            Some(path) => read_chat_template(path)?,
            None => None,
        };
        if chat_template.is_none() {
            warn!("Tokenizer has no chat template; messages use the plain-text format");
        }

        Ok(Self {
            inner,
            chat_template,
        })
    }
}

impl PromptTokenizer for ModelTokenizer {
    fn chat_template(&self) -> Option<&ChatTemplate> {
        self.chat_template.as_ref()
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| TokenizerError::new(TokenizerErrorKind::Encode(e.to_string())))?;
        Ok(encoding.get_ids().to_vec())
    }
}

fn local_files(dir: &Path) -> (PathBuf, Option<PathBuf>) {
    let config_file = dir.join(TOKENIZER_CONFIG_FILE);
    (
        dir.join(TOKENIZER_FILE),
        config_file.exists().then_some(config_file),
    )
}

async fn hub_files(model: &str) -> Result<(PathBuf, Option<PathBuf>), TokenizerError> {
    let api = Api::new()
        .map_err(|e| TokenizerError::new(TokenizerErrorKind::Download(e.to_string())))?;
    let repo = api.model(model.to_string());

    let tokenizer_file = repo.get(TOKENIZER_FILE).await.map_err(|e| {
        TokenizerError::new(TokenizerErrorKind::Download(format!(
            "{} from {}: {}",
            TOKENIZER_FILE, model, e
        )))
    })?;

    let config_file = match repo.get(TOKENIZER_CONFIG_FILE).await {
        Ok(path) => Some(path),
        Err(e) => {
            debug!(error = %e, "No tokenizer_config.json in repository");
            None
        }
    };

    Ok((tokenizer_file, config_file))
}

/// Subset of `tokenizer_config.json` needed for chat templating.
#[derive(Debug, Deserialize)]
struct TokenizerConfigFile {
    #[serde(default)]
    chat_template: Option<ChatTemplateSource>,
    #[serde(default)]
    bos_token: Option<SpecialToken>,
    #[serde(default)]
    eos_token: Option<SpecialToken>,
}

/// A template given inline, or as a list of named templates.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChatTemplateSource {
    Single(String),
    Named(Vec<NamedTemplate>),
}

#[derive(Debug, Deserialize)]
struct NamedTemplate {
    name: String,
    template: String,
}

impl ChatTemplateSource {
    fn into_default(self) -> Option<String> {
        match self {
            ChatTemplateSource::Single(template) => Some(template),
            ChatTemplateSource::Named(templates) => templates
                .into_iter()
                .find(|t| t.name == "default")
                .map(|t| t.template),
        }
    }
}

/// Special tokens appear either as plain strings or as added-token objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SpecialToken {
    Plain(String),
    Added { content: String },
}

impl SpecialToken {
    fn into_content(self) -> String {
        match self {
            SpecialToken::Plain(content) | SpecialToken::Added { content } => content,
        }
    }
}

fn read_chat_template(path: &Path) -> Result<Option<ChatTemplate>, TokenizerError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        TokenizerError::new(TokenizerErrorKind::Load(format!("{}: {}", path.display(), e)))
    })?;
    let file: TokenizerConfigFile = serde_json::from_str(&raw).map_err(|e| {
        TokenizerError::new(TokenizerErrorKind::Load(format!("{}: {}", path.display(), e)))
    })?;

    let Some(source) = file.chat_template.and_then(ChatTemplateSource::into_default) else {
        return Ok(None);
    };
    ChatTemplate::new(
        source,
        file.bos_token.map(SpecialToken::into_content),
        file.eos_token.map(SpecialToken::into_content),
    )
    .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join(TOKENIZER_CONFIG_FILE);
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_reads_inline_template_and_token_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{
                "chat_template": "{{ bos_token }}{{ messages[0].content }}",
                "bos_token": {"content": "<s>", "lstrip": false},
                "eos_token": "</s>"
            }"#,
        );

        let template = read_chat_template(&path).unwrap().unwrap();
        let rendered = template
            .render(&[podgen_core::ChatMessage::user("hello")])
            .unwrap();
        assert_eq!(rendered, "<s>hello");
    }

    #[test]
    fn test_picks_default_from_named_templates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{"chat_template": [
                {"name": "tool_use", "template": "tools"},
                {"name": "default", "template": "plain"}
            ]}"#,
        );

        let template = read_chat_template(&path).unwrap().unwrap();
        assert_eq!(template.render(&[]).unwrap(), "plain");
    }

    #[test]
    fn test_missing_template_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"model_max_length": 1024}"#);
        assert!(read_chat_template(&path).unwrap().is_none());
    }

    #[test]
    fn test_local_files_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let (tokenizer, config) = local_files(dir.path());
        assert_eq!(tokenizer, dir.path().join(TOKENIZER_FILE));
        assert!(config.is_none());
    }

    #[test]
    fn test_missing_tokenizer_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelTokenizer::from_files(&dir.path().join(TOKENIZER_FILE), None).unwrap_err();
        assert!(matches!(err.kind, TokenizerErrorKind::Load(_)));
    }
}
