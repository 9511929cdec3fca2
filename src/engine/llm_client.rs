use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::engine::error::ClientError;
use crate::logutil::preview;
use crate::ui::settings::LlmSettings;

/// One ongoing conversation with the remote model.
///
/// Every call continues the same session; implementors keep whatever history
/// the backend needs.
pub trait ConversationClient: Send + 'static {
    fn send_message(&mut self, message: &str) -> Result<String, ClientError>;
}

#[derive(Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    #[serde(default)]
    pub content: Option<String>,
}

/// OpenAI-compatible chat completions session (LM Studio, llama.cpp server,
/// hosted endpoints).
pub struct ChatSession {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(settings: &LlmSettings, system_instruction: &str) -> Result<Self, ClientError> {
        // Round-trips run to completion; a reveal can take minutes on local models.
        let client = Client::builder().timeout(None::<Duration>).build()?;

        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            temperature: settings.temperature,
            api_key,
            history: vec![ChatMessage {
                role: "system".into(),
                content: system_instruction.to_string(),
            }],
        })
    }

    fn post(&self) -> Result<String, ClientError> {
        let req = ChatCompletionRequest {
            model: &self.model,
            messages: &self.history,
            temperature: self.temperature,
        };

        let mut builder = self.client.post(&self.endpoint).json(&req);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder.send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        let resp = resp.json::<ChatCompletionResponse>()?;
        let choice = resp.choices.into_iter().next().ok_or(ClientError::NoChoices)?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

impl ConversationClient for ChatSession {
    fn send_message(&mut self, message: &str) -> Result<String, ClientError> {
        self.history.push(ChatMessage {
            role: "user".into(),
            content: message.to_string(),
        });

        match self.post() {
            Ok(text) => {
                debug!("model replied ({} turns): {}", self.history.len(), preview(&text));
                self.history.push(ChatMessage {
                    role: "assistant".into(),
                    content: text.clone(),
                });
                Ok(text)
            }
            Err(e) => {
                // A failed turn never happened as far as the model is concerned.
                self.history.pop();
                warn!("chat round-trip to {} failed: {}", self.endpoint, e);
                Err(e)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_content_decodes_as_empty() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.choices[0].message.content, None);
    }

    #[test]
    fn failed_call_leaves_history_untouched() {
        // Nothing listens on port 9 (discard) locally, so the connect fails fast.
        let settings = LlmSettings {
            base_url: "http://127.0.0.1:9/v1".into(),
            ..LlmSettings::default()
        };
        let mut session = ChatSession::new(&settings, "be noir").unwrap();

        let err = session.send_message("Who killed the singer?");
        assert!(matches!(err, Err(ClientError::Transport(_))));
        assert_eq!(session.history.len(), 1);
        assert_eq!(session.history[0].role, "system");
    }

    #[test]
    fn session_is_seeded_with_system_instruction() {
        let settings = LlmSettings {
            base_url: "http://localhost:1234/v1/".into(),
            ..LlmSettings::default()
        };
        let session = ChatSession::new(&settings, "be noir").unwrap();

        assert_eq!(session.endpoint, "http://localhost:1234/v1/chat/completions");
        assert_eq!(session.history.len(), 1);
        assert_eq!(session.history[0].role, "system");
        assert_eq!(session.history[0].content, "be noir");
    }
}
