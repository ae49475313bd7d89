use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::AssistantError;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const ASSISTANT_MODEL: &str = "gemini-2.5-flash";

/// Reply used when the model answers with no text
pub const EMPTY_REPLY: &str = "I couldn't generate a response. Please check your API key.";
/// Reply used for any failure: missing key, transport or API error
pub const ERROR_REPLY: &str = "Error contacting the AI assistant. Please ensure your API key is valid.";

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

/// Build the fixed system instruction around the configuration summary
pub fn system_instruction(context: &str) -> String {
    format!(
        "You are an expert DevOps and AI engineer specializing in LangChain and Windows deployments.\n\
         The user is trying to install a python-based LangChain environment on a Windows 11 machine with an RTX 4060 Ti.\n\
         The user is looking at a deployment script generator.\n\
         \n\
         Current Generation Context:\n\
         {}\n\
         \n\
         Answer questions about the scripts, hardware limitations, or configuration details concisely and technically.\n",
        context
    )
}

/// Stateless Gemini client. Every call is a single request with no
/// conversation history; the transcript lives only on our side.
#[derive(Clone)]
pub struct AssistantClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl AssistantClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn generate(&self, question: &str, context: &str) -> Result<String, AssistantError> {
        let api_key = self.api_key.as_ref().ok_or(AssistantError::MissingApiKey)?;

        let request = GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: Some(system_instruction(context)),
                }],
            },
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(question.to_string()),
                }],
            }],
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, ASSISTANT_MODEL);
        debug!(%url, "sending assistant request");

        let response = self.client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Api { status, body });
        }

        let gemini_response: GeminiResponse = response.json().await?;
        let text = gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        Ok(text)
    }

    /// Ask a question. Never fails: errors collapse into fixed replies.
    pub async fn ask(&self, question: &str, context: &str) -> String {
        reply_or_fallback(self.generate(question, context).await)
    }
}

/// Only an empty string counts as "no response"; whitespace is passed through.
fn reply_or_fallback(result: Result<String, AssistantError>) -> String {
    match result {
        Ok(text) if text.is_empty() => {
            warn!("assistant returned an empty reply");
            EMPTY_REPLY.to_string()
        }
        Ok(text) => text,
        Err(e) => {
            error!("Gemini API error: {}", e);
            ERROR_REPLY.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_maps_to_fixed_reply() {
        let client = AssistantClient::new(None);
        let reply = client.ask("What does setup.bat do?", "User Config:").await;
        assert_eq!(reply, ERROR_REPLY);
        assert!(reply.contains("API key"));
    }

    #[test]
    fn only_an_empty_reply_gets_the_fallback() {
        assert_eq!(reply_or_fallback(Ok(String::new())), EMPTY_REPLY);
        assert_eq!(reply_or_fallback(Ok(" \n".to_string())), " \n");
        assert_eq!(reply_or_fallback(Ok("Run setup.bat".to_string())), "Run setup.bat");
        assert_eq!(reply_or_fallback(Err(AssistantError::MissingApiKey)), ERROR_REPLY);
    }

    #[tokio::test]
    async fn blank_key_counts_as_missing() {
        let client = AssistantClient::new(Some("   ".to_string()));
        assert!(!client.has_api_key());
        let err = client.generate("hi", "").await.unwrap_err();
        assert!(matches!(err, AssistantError::MissingApiKey));
    }

    #[tokio::test]
    async fn unreachable_endpoint_maps_to_fixed_reply() {
        let client = AssistantClient::new(Some("test-key".to_string()))
            .with_base_url("http://127.0.0.1:9/");
        let reply = client.ask("hello", "ctx").await;
        assert_eq!(reply, ERROR_REPLY);
    }

    #[test]
    fn system_instruction_embeds_context() {
        let instruction = system_instruction("GPU: Integrated Graphics / CPU");
        assert!(instruction.contains("Current Generation Context:\nGPU: Integrated Graphics / CPU\n"));
        assert!(instruction.starts_with("You are an expert DevOps"));
    }

    #[test]
    fn request_serializes_in_gemini_shape() {
        let request = GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: Some("sys".to_string()) }],
            },
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: Some("q".to_string()) }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "q");
    }

    #[test]
    fn response_tolerates_missing_parts() {
        let parsed: GeminiResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(parsed.candidates[0].content.is_none());

        let parsed: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }
}
