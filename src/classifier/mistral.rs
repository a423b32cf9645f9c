use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::classifier::prompt::system_messages;
use crate::classifier::{ChatMessage, ClassificationInput, IntentClassifier, Verdict};
use crate::{DialogueError, Result};

/// Endpoint and credentials for the classifier agent
#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    /// Base URL without trailing slash, e.g. `https://api.mistral.ai`.
    pub base_url: String,
    pub api_key: String,
    pub agent_id: String,
    pub timeout: Duration,
}

/// Request structure for the agents completion API
#[derive(Serialize)]
struct AgentCompletionRequest<'a> {
    agent_id: &'a str,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

/// Response structure from the agents completion API
#[derive(Deserialize)]
struct AgentCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Mistral agent-backed intent classifier
///
/// One request per turn. No retry: any failure ends the turn.
pub struct MistralClassifier {
    client: Client,
    settings: ClassifierSettings,
}

impl MistralClassifier {
    pub fn new(settings: ClassifierSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| DialogueError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/agents/completions", self.settings.base_url)
    }
}

#[async_trait]
impl IntentClassifier for MistralClassifier {
    async fn classify(&self, input: ClassificationInput) -> Result<Verdict> {
        let user_content = serde_json::to_string(&input.request).map_err(|e| {
            DialogueError::ClassificationFormat(format!("Failed to encode request: {}", e))
        })?;

        let mut messages = system_messages(&input.persona, &input.chat_summary);
        messages.push(ChatMessage::user(user_content));

        let request = AgentCompletionRequest {
            agent_id: &self.settings.agent_id,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            messages,
        };

        log::debug!(
            "Classifier request:\n{}",
            request
                .messages
                .iter()
                .enumerate()
                .map(|(i, m)| format!("  msg[{i}] {m}"))
                .collect::<Vec<_>>()
                .join("\n")
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.settings.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| DialogueError::Transport(format!("Network error: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DialogueError::Transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(DialogueError::Transport(format!(
                "Classifier API error {}: {}",
                status, body
            )));
        }

        log::debug!("Classifier raw response: {}", body);

        let completion: AgentCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            DialogueError::ClassificationFormat(format!("Unexpected completion envelope: {}", e))
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                DialogueError::ClassificationFormat("Completion has no choices".to_string())
            })?;

        Verdict::parse(&content)
    }
}
