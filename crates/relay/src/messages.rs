use serde::Serialize;
use serde_json::{Map, Value};

/// Instruction sent ahead of the text when the caller does not provide a prompt.
pub const DEFAULT_INSTRUCTION: &str = "Please summarize this text:";

/// Upper bound on the length of the completion.
pub const MAX_TOKENS: u32 = 1000;

/// Body accepted from the caller.
///
/// Every field is kept untyped: a value of the wrong type counts as absent and never fails the parse.
#[derive(Debug, Default)]
pub(crate) struct InboundPayload {
    pub(crate) text: Option<Value>,
    pub(crate) prompt: Option<Value>,
    pub(crate) model: Option<Value>,
    pub(crate) api_url: Option<Value>,
}

impl InboundPayload {
    /// Reads the payload from the members of a JSON object. Unknown members are ignored.
    pub(crate) fn from_fields(mut fields: Map<String, Value>) -> Self {
        Self {
            text: fields.remove("text"),
            prompt: fields.remove("prompt"),
            model: fields.remove("model"),
            api_url: fields.remove("apiUrl"),
        }
    }

    /// The text to relay, if it is a string with at least one non-whitespace character.
    ///
    /// The returned text is untrimmed.
    pub(crate) fn validated_text(&self) -> Option<&str> {
        match &self.text {
            Some(Value::String(text)) if !text.trim().is_empty() => Some(text.as_str()),
            _ => None,
        }
    }

    pub(crate) fn prompt(&self) -> Option<&str> {
        non_empty(&self.prompt)
    }

    pub(crate) fn model(&self) -> Option<&str> {
        non_empty(&self.model)
    }

    pub(crate) fn api_url(&self) -> Option<&str> {
        non_empty(&self.api_url)
    }
}

fn non_empty(value: &Option<Value>) -> Option<&str> {
    value.as_ref().and_then(Value::as_str).filter(|value| !value.is_empty())
}

/// Chat completion request sent to the completion service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// The model that should answer.
    pub model: String,
    /// Conversation sent to the model. Always a single user message.
    pub messages: Vec<ChatMessage>,
    /// Upper bound on the length of the completion.
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Builds the request for `text`, taking the prompt and model from the payload when present.
    pub(crate) fn build(payload: &InboundPayload, text: &str, default_model: &str) -> Self {
        let instruction = payload.prompt().unwrap_or(DEFAULT_INSTRUCTION);
        let model = payload.model().unwrap_or(default_model);

        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: Role::User,
                content: vec![ContentPart::text(instruction), ContentPart::text(text)],
            }],
            max_tokens: MAX_TOKENS,
        }
    }
}

/// A single message of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    /// Who wrote the message.
    pub role: Role,
    /// Ordered content segments.
    pub content: Vec<ContentPart>,
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user.
    User,
}

/// A segment of message content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text itself.
        text: String,
    },
}

impl ContentPart {
    fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Envelope around a successful completion service answer.
#[derive(Debug, Serialize)]
pub(crate) struct RelayResponse {
    pub(crate) result: Value,
}
