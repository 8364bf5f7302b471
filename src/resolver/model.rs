//! Model-backed command resolution.
//!
//! Sends the content library and the presenter command to a chat model and
//! parses the structured reply out of the model's free text.

use super::{describe_library, ResolveStrategy, Resolution};
use crate::config::{Prompts, Settings};
use crate::error::{PodiumError, Result};
use crate::openai::create_client;
use crate::store::ContentItem;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Model-backed resolution strategy.
pub struct ModelStrategy {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    prompts: Prompts,
}

/// The reply shape the prompt instructs the model to produce.
#[derive(Debug, Deserialize)]
struct ModelReply {
    #[serde(default, rename = "selectedContentId")]
    selected_content_id: Option<String>,
    response: String,
    suggestion: String,
}

impl ModelStrategy {
    /// Create a strategy from resolver settings.
    pub fn new(settings: &Settings) -> Self {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )
        .unwrap_or_default();

        Self {
            client: create_client(),
            model: settings.resolver.model.clone(),
            temperature: settings.resolver.temperature,
            max_output_tokens: settings.resolver.max_output_tokens,
            prompts,
        }
    }

    /// Parse the model's free-text reply into a [`Resolution`].
    ///
    /// The first balanced `{...}` span is extracted and parsed; anything
    /// around it is tolerated, but a missing or unparsable object fails the
    /// request.
    fn parse_reply(text: &str) -> Result<Resolution> {
        let json_str = extract_json_object(text).ok_or_else(|| {
            PodiumError::Model(format!(
                "No JSON object in model reply: {}",
                preview(text, 500)
            ))
        })?;

        let reply: ModelReply = serde_json::from_str(json_str).map_err(|e| {
            PodiumError::Model(format!("Failed to parse model reply: {}. Reply was: {}", e, json_str))
        })?;

        // A malformed id degrades to no selection, the same as a lookup miss
        let selected_content_id = reply
            .selected_content_id
            .as_deref()
            .and_then(|id| Uuid::parse_str(id).ok());

        Ok(Resolution {
            selected_content_id,
            response: reply.response,
            suggestion: reply.suggestion,
        })
    }
}

#[async_trait]
impl ResolveStrategy for ModelStrategy {
    async fn resolve(&self, command: &str, library: &[ContentItem]) -> Result<Resolution> {
        let mut vars = HashMap::new();
        vars.insert("library".to_string(), describe_library(library));
        vars.insert("command".to_string(), command.to_string());

        let system_message = self
            .prompts
            .render_with_custom(&self.prompts.resolver.system, &vars);
        let user_message = self
            .prompts
            .render_with_custom(&self.prompts.resolver.user, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_message)
                .build()
                .map_err(|e| PodiumError::Model(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_message)
                .build()
                .map_err(|e| PodiumError::Model(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_output_tokens)
            .build()
            .map_err(|e| PodiumError::Model(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PodiumError::OpenAI(format!("Resolution call failed: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| PodiumError::Model("Empty response from model".to_string()))?;

        debug!("Model reply: {}", preview(content, 500));

        Self::parse_reply(content)
    }
}

/// Truncate to at most `max` bytes on a character boundary.
fn preview(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Locate the first balanced `{...}` span in free text.
///
/// Tracks string literals and escapes so braces inside quoted values do not
/// affect the depth count. Returns `None` when no complete object exists.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_object() {
        let text = r#"{"selectedContentId": null, "response": "r", "suggestion": "s"}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn test_extract_object_surrounded_by_prose() {
        let text = r#"Here is my pick:

```json
{"selectedContentId": "abc", "response": "found it", "suggestion": "enjoy"}
```

Let me know if you need another."#;

        let extracted = extract_json_object(text).unwrap();
        assert!(extracted.starts_with('{'));
        assert!(extracted.ends_with('}'));
        assert!(extracted.contains("found it"));
    }

    #[test]
    fn test_extract_handles_braces_in_strings() {
        let text = r#"note {"response": "use {braces} wisely", "suggestion": "}", "selectedContentId": null} tail"#;
        let extracted = extract_json_object(text).unwrap();
        let value: serde_json::Value = serde_json::from_str(extracted).unwrap();
        assert_eq!(value["response"], "use {braces} wisely");
    }

    #[test]
    fn test_extract_none_without_object() {
        assert!(extract_json_object("no structure here").is_none());
        assert!(extract_json_object("{\"unterminated\": ").is_none());
    }

    #[test]
    fn test_parse_reply_with_valid_id() {
        let id = Uuid::new_v4();
        let text = format!(
            r#"{{"selectedContentId": "{}", "response": "here you go", "suggestion": "tip"}}"#,
            id
        );

        let resolution = ModelStrategy::parse_reply(&text).unwrap();
        assert_eq!(resolution.selected_content_id, Some(id));
        assert_eq!(resolution.response, "here you go");
        assert_eq!(resolution.suggestion, "tip");
    }

    #[test]
    fn test_parse_reply_null_id() {
        let text = r#"{"selectedContentId": null, "response": "nothing fits", "suggestion": "try other words"}"#;

        let resolution = ModelStrategy::parse_reply(text).unwrap();
        assert!(resolution.selected_content_id.is_none());
    }

    #[test]
    fn test_parse_reply_malformed_id_degrades_to_none() {
        let text = r#"{"selectedContentId": "not-a-uuid", "response": "r", "suggestion": "s"}"#;

        let resolution = ModelStrategy::parse_reply(text).unwrap();
        assert!(resolution.selected_content_id.is_none());
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let thai = "ไม่พบเนื้อหาที่ตรงกับคำสั่ง".repeat(20);
        let cut = preview(&thai, 500);
        assert!(cut.len() <= 500);
        assert!(thai.starts_with(cut));
    }

    #[test]
    fn test_parse_reply_without_json_is_fatal() {
        let err = ModelStrategy::parse_reply("I could not decide.").unwrap_err();
        assert!(matches!(err, PodiumError::Model(_)));
    }

    #[test]
    fn test_parse_reply_with_wrong_shape_is_fatal() {
        let err = ModelStrategy::parse_reply(r#"{"answer": 42}"#).unwrap_err();
        assert!(matches!(err, PodiumError::Model(_)));
    }
}
