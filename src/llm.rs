use serde::Serialize;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::LlmSettings;
use crate::error::{Result, AppError};
use crate::prompt::Prompts;

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

/// Issues a single chat-completion request and returns the reply text.
///
/// There is no retry: rate limits, auth failures and network errors all
/// come back as `AppError::Llm`.
pub async fn call_completion(
    client: &Client,
    settings: &LlmSettings,
    prompts: &Prompts,
) -> Result<String> {
    let body = ChatRequest {
        model: &settings.model,
        messages: vec![
            Message {
                role: "system",
                content: &prompts.system,
            },
            Message {
                role: "user",
                content: &prompts.user,
            },
        ],
    };

    debug!(model = %settings.model, "sending completion request");
    let res = client
        .post(settings.completions_url())
        .bearer_auth(&settings.api_key)
        .json(&body)
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        let detail = res.text().await.unwrap_or_default();
        warn!(%status, "completion API rejected the request");
        return Err(AppError::Llm(format!("completion API returned {}: {}", status, detail.trim())));
    }

    let json: serde_json::Value = res.json().await?;
    let reply = json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| AppError::Llm("Invalid response format from LLM".to_string()))?
        .trim()
        .to_string();

    Ok(reply)
}
