//! Video-script drafting from a chat history plus the user's latest phrase.

use serde_json::{json, Value};

use crate::client::OpenRouterClient;
use crate::error::AssistantError;

pub const SCRIPT_SYSTEM_PROMPT: &str = "\
Você é um roteirista especializado em vídeos curtos para redes sociais.
Responda sempre com um roteiro no formato:
Título: ...
Introdução: ...
Desenvolvimento: ...
Conclusão: ...
Use linguagem direta e adequada ao público do criador.";

/// Builds the `messages` array: system prompt, prior turns, then `phrase`
/// as the new user turn.
///
/// History entries without a string `role` and `content` are skipped and
/// extra fields are dropped.
#[must_use]
pub fn script_messages(history: &[Value], phrase: &str) -> Vec<Value> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(json!({"role": "system", "content": SCRIPT_SYSTEM_PROMPT}));
    messages.extend(history.iter().filter_map(|turn| {
        let role = turn.get("role").and_then(Value::as_str)?;
        let content = turn.get("content").and_then(Value::as_str)?;
        Some(json!({"role": role, "content": content}))
    }));
    messages.push(json!({"role": "user", "content": phrase}));
    messages
}

/// Text of the first choice; the raw response JSON when no text is present.
#[must_use]
pub fn extract_script_content(response: &Value) -> String {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .or_else(|| response.pointer("/choices/0/text").and_then(Value::as_str))
        .filter(|text| !text.is_empty())
        .map_or_else(|| response.to_string(), str::to_string)
}

impl OpenRouterClient {
    /// # Errors
    ///
    /// Returns any error from [`OpenRouterClient::chat_completion`].
    pub async fn generate_script(
        &self,
        history: &[Value],
        phrase: &str,
    ) -> Result<String, AssistantError> {
        let payload = json!({ "messages": script_messages(history, phrase) });
        let response = self.chat_completion(payload).await?;
        Ok(extract_script_content(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_wrap_history_with_system_and_phrase() {
        let history = vec![
            json!({"role": "user", "content": "ideia de vídeo", "id": 3}),
            json!({"role": "assistant"}),
            json!({"role": "assistant", "content": "Título: ..."}),
        ];
        let messages = script_messages(&history, "mais curto");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(
            messages[1],
            json!({"role": "user", "content": "ideia de vídeo"})
        );
        assert_eq!(messages[2]["content"], "Título: ...");
        assert_eq!(messages[3], json!({"role": "user", "content": "mais curto"}));
    }

    #[test]
    fn content_prefers_message_then_text() {
        let chat = json!({"choices": [{"message": {"content": "Título: A"}}]});
        assert_eq!(extract_script_content(&chat), "Título: A");

        let legacy = json!({"choices": [{"text": "Título: B"}]});
        assert_eq!(extract_script_content(&legacy), "Título: B");
    }

    #[test]
    fn content_falls_back_to_raw_json() {
        let odd = json!({"choices": []});
        assert_eq!(extract_script_content(&odd), r#"{"choices":[]}"#);
    }
}
