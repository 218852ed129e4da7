//! Prompt resolution from job input.

use crate::PromptTokenizer;
use podgen_core::{ChatMessage, JobInput, Role};
use podgen_error::TokenizerError;

/// Cue appended after the last message in the plain-text format.
pub const ASSISTANT_CUE: &str = "Assistant: ";

/// Plain-text rendering for tokenizers without a chat template.
///
/// Messages appear in input order as `System: `, `User: ` or `Assistant: `
/// lines separated by blank lines; other roles are skipped.
///
/// # Examples
///
/// ```
/// use podgen_core::ChatMessage;
/// use podgen_engine::format_messages;
///
/// let prompt = format_messages(&[
///     ChatMessage::system("Be brief."),
///     ChatMessage::user("Hi"),
/// ]);
/// assert_eq!(prompt, "System: Be brief.\n\nUser: Hi\n\nAssistant: ");
/// ```
pub fn format_messages(messages: &[ChatMessage]) -> String {
    let mut formatted = String::new();
    for message in messages {
        let label = match message.known_role() {
            Some(Role::System) => "System",
            Some(Role::User) => "User",
            Some(Role::Assistant) => "Assistant",
            None => continue,
        };
        formatted.push_str(label);
        formatted.push_str(": ");
        formatted.push_str(message.content());
        formatted.push_str("\n\n");
    }
    formatted.push_str(ASSISTANT_CUE);
    formatted
}

/// Turns a job input into the text handed to the engine.
///
/// Non-empty `messages` take precedence and go through the chat template
/// when the tokenizer has one; otherwise `prompt` is used verbatim.
/// Returns `None` when neither source yields any text.
pub fn resolve_prompt(
    input: &JobInput,
    tokenizer: &dyn PromptTokenizer,
) -> Result<Option<String>, TokenizerError> {
    let prompt = match input.messages() {
        Some(messages) if !messages.is_empty() => match tokenizer.chat_template() {
            Some(template) => Some(template.render(messages)?),
            None => Some(format_messages(messages)),
        },
        _ => input.prompt().clone(),
    };
    Ok(prompt.filter(|p| !p.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChatTemplate;
    use podgen_core::JobInputBuilder;

    struct FakeTokenizer {
        template: Option<ChatTemplate>,
    }

    impl PromptTokenizer for FakeTokenizer {
        fn chat_template(&self) -> Option<&ChatTemplate> {
            self.template.as_ref()
        }

        fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
            Ok(text.split_whitespace().map(|_| 0).collect())
        }
    }

    fn plain() -> FakeTokenizer {
        FakeTokenizer { template: None }
    }

    #[test]
    fn test_empty_messages_still_end_with_cue() {
        assert_eq!(format_messages(&[]), "Assistant: ");
    }

    #[test]
    fn test_unknown_roles_are_skipped() {
        let prompt = format_messages(&[
            ChatMessage::new("tool", "{\"ok\": true}"),
            ChatMessage::user("Next?"),
            ChatMessage::assistant("Done."),
        ]);
        assert_eq!(prompt, "User: Next?\n\nAssistant: Done.\n\nAssistant: ");
    }

    #[test]
    fn test_prompt_is_used_verbatim() {
        let input = JobInputBuilder::default()
            .prompt("  keep   spacing\n")
            .build()
            .unwrap();
        let prompt = resolve_prompt(&input, &plain()).unwrap();
        assert_eq!(prompt.as_deref(), Some("  keep   spacing\n"));
    }

    #[test]
    fn test_messages_take_precedence_over_prompt() {
        let input = JobInputBuilder::default()
            .prompt("ignored")
            .messages(vec![ChatMessage::user("Hi")])
            .build()
            .unwrap();
        let prompt = resolve_prompt(&input, &plain()).unwrap();
        assert_eq!(prompt.as_deref(), Some("User: Hi\n\nAssistant: "));
    }

    #[test]
    fn test_empty_messages_fall_back_to_prompt() {
        let input = JobInputBuilder::default()
            .prompt("from prompt")
            .messages(Vec::<ChatMessage>::new())
            .build()
            .unwrap();
        let prompt = resolve_prompt(&input, &plain()).unwrap();
        assert_eq!(prompt.as_deref(), Some("from prompt"));
    }

    #[test]
    fn test_chat_template_is_preferred_when_available() {
        let tokenizer = FakeTokenizer {
            template: Some(
                ChatTemplate::new("{% for m in messages %}[{{ m.content }}]{% endfor %}", None, None)
                    .unwrap(),
            ),
        };
        let input = JobInputBuilder::default()
            .messages(vec![ChatMessage::user("a"), ChatMessage::user("b")])
            .build()
            .unwrap();
        let prompt = resolve_prompt(&input, &tokenizer).unwrap();
        assert_eq!(prompt.as_deref(), Some("[a][b]"));
    }

    #[test]
    fn test_nothing_to_generate_from() {
        let empty_prompt = JobInputBuilder::default().prompt("").build().unwrap();
        assert_eq!(resolve_prompt(&empty_prompt, &plain()).unwrap(), None);
        assert_eq!(resolve_prompt(&JobInput::default(), &plain()).unwrap(), None);
    }
}
