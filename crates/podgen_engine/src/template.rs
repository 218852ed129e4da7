//! Chat template rendering.

use minijinja::{Environment, ErrorKind, context};
use podgen_core::ChatMessage;
use podgen_error::{TokenizerError, TokenizerErrorKind};

const TEMPLATE_NAME: &str = "chat";

/// A compiled Jinja chat template as shipped in `tokenizer_config.json`.
///
/// # Examples
///
/// ```
/// use podgen_core::ChatMessage;
/// use podgen_engine::ChatTemplate;
///
/// let template = ChatTemplate::new(
///     "{% for m in messages %}<|{{ m.role }}|>{{ m.content }}\n{% endfor %}\
///      {% if add_generation_prompt %}<|assistant|>{% endif %}",
///     None,
///     None,
/// )
/// .unwrap();
/// let prompt = template.render(&[ChatMessage::user("hi")]).unwrap();
/// assert_eq!(prompt, "<|user|>hi\n<|assistant|>");
/// ```
#[derive(Debug)]
pub struct ChatTemplate {
    env: Environment<'static>,
    bos_token: String,
    eos_token: String,
}

impl ChatTemplate {
    /// Compile a template source.
    pub fn new(
        source: impl Into<String>,
        bos_token: Option<String>,
        eos_token: Option<String>,
    ) -> Result<Self, TokenizerError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_unknown_method_callback(minijinja_contrib::pycompat::unknown_method_callback);
        env.add_function("raise_exception", raise_exception);
        env.add_template_owned(TEMPLATE_NAME, source.into())
            .map_err(|e| TokenizerError::new(TokenizerErrorKind::Template(e.to_string())))?;

        Ok(Self {
            env,
            bos_token: bos_token.unwrap_or_default(),
            eos_token: eos_token.unwrap_or_default(),
        })
    }

    /// Render messages with the generation prompt appended.
    pub fn render(&self, messages: &[ChatMessage]) -> Result<String, TokenizerError> {
        let template = self
            .env
            .get_template(TEMPLATE_NAME)
            .map_err(|e| TokenizerError::new(TokenizerErrorKind::Template(e.to_string())))?;

        template
            .render(context! {
                messages => messages,
                add_generation_prompt => true,
                bos_token => &self.bos_token,
                eos_token => &self.eos_token,
            })
            .map_err(|e| TokenizerError::new(TokenizerErrorKind::Template(e.to_string())))
    }
}

fn raise_exception(message: String) -> Result<String, minijinja::Error> {
    Err(minijinja::Error::new(ErrorKind::InvalidOperation, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHATML: &str = concat!(
        r"{% for message in messages %}",
        r"{{ '<|im_start|>' + message['role'] + '\n' + message['content'] + '<|im_end|>' + '\n' }}",
        r"{% endfor %}",
        r"{% if add_generation_prompt %}{{ '<|im_start|>assistant\n' }}{% endif %}",
    );

    #[test]
    fn test_chatml_rendering_keeps_message_order() {
        let template = ChatTemplate::new(CHATML, None, None).unwrap();
        let prompt = template
            .render(&[
                ChatMessage::system("Be terse."),
                ChatMessage::user("Hello"),
                ChatMessage::assistant("Hi."),
                ChatMessage::user("Bye"),
            ])
            .unwrap();

        assert_eq!(
            prompt,
            "<|im_start|>system\nBe terse.<|im_end|>\n\
             <|im_start|>user\nHello<|im_end|>\n\
             <|im_start|>assistant\nHi.<|im_end|>\n\
             <|im_start|>user\nBye<|im_end|>\n\
             <|im_start|>assistant\n"
        );
    }

    #[test]
    fn test_special_tokens_are_available() {
        let template = ChatTemplate::new(
            "{{ bos_token }}{{ messages[0].content }}{{ eos_token }}",
            Some("<s>".to_string()),
            Some("</s>".to_string()),
        )
        .unwrap();
        assert_eq!(template.render(&[ChatMessage::user("x")]).unwrap(), "<s>x</s>");
    }

    #[test]
    fn test_python_string_methods_are_supported() {
        let template =
            ChatTemplate::new("{{ messages[0].content.strip() }}", None, None).unwrap();
        assert_eq!(template.render(&[ChatMessage::user("  padded  ")]).unwrap(), "padded");
    }

    #[test]
    fn test_raise_exception_surfaces_as_template_error() {
        let template = ChatTemplate::new(
            "{% if messages[0].role != 'user' %}{{ raise_exception('first message must be user') }}{% endif %}",
            None,
            None,
        )
        .unwrap();
        let err = template.render(&[ChatMessage::system("nope")]).unwrap_err();
        assert!(matches!(err.kind, TokenizerErrorKind::Template(ref msg) if msg.contains("first message must be user")));
    }

    #[test]
    fn test_loop_controls_are_supported() {
        let template = ChatTemplate::new(
            "{% for m in messages %}{% if m.role == 'system' %}{% continue %}{% endif %}\
             {{ m.content }}{% if loop.index >= 2 %}{% break %}{% endif %}{% endfor %}",
            None,
            None,
        )
        .unwrap();
        let prompt = template
            .render(&[
                ChatMessage::system("skip"),
                ChatMessage::user("a"),
                ChatMessage::user("b"),
            ])
            .unwrap();
        assert_eq!(prompt, "a");
    }

    #[test]
    fn test_tojson_filter_is_supported() {
        let template = ChatTemplate::new("{{ messages[0] | tojson }}", None, None).unwrap();
        let rendered = template.render(&[ChatMessage::user("hi")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value, serde_json::json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn test_invalid_template_source_is_rejected() {
        assert!(ChatTemplate::new("{% for %}", None, None).is_err());
    }
}
