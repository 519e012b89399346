//! Single-backend HTTP calls. One call per [`crate::config::BackendConfig`],
//! no retry here — retry/fallback composition happens in `client.rs`.

use serde::Serialize;

use crate::config::{BackendConfig, BackendKind};
use crate::error::EmbedError;
use crate::response::parse_embeddings;

#[derive(Serialize)]
struct InputBody<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Serialize)]
struct PromptBody<'a> {
    model: &'a str,
    prompt: &'a [String],
}

async fn check_and_parse(resp: reqwest::Response) -> Result<Vec<Vec<f32>>, EmbedError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(EmbedError::Api { status: status.as_u16(), message: body });
    }
    parse_embeddings(&body)
}

/// Call the local backend, trying the `{model, input}` body shape first and
/// falling back to `{model, prompt}` if the server rejects the first shape
/// with a client error (4xx, excluding 429 which is a retryable rate limit).
pub async fn call_local(http: &reqwest::Client, backend: &BackendConfig, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
    let input_body = InputBody { model: &backend.model, input: texts };
    let resp = http.post(&backend.url).timeout(backend.timeout()).json(&input_body).send().await?;

    if resp.status().is_client_error() && resp.status().as_u16() != 429 {
        let prompt_body = PromptBody { model: &backend.model, prompt: texts };
        let resp = http.post(&backend.url).timeout(backend.timeout()).json(&prompt_body).send().await?;
        return check_and_parse(resp).await;
    }

    check_and_parse(resp).await
}

/// Call a remote OpenAI-compatible `/embeddings` endpoint.
pub async fn call_openai_compatible(http: &reqwest::Client, backend: &BackendConfig, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
    let body = InputBody { model: &backend.model, input: texts };
    let mut request = http.post(&backend.url).timeout(backend.timeout()).json(&body);
    if !backend.api_key.is_empty() {
        request = request.bearer_auth(&backend.api_key);
    }
    let resp = request.send().await?;
    check_and_parse(resp).await
}

/// Dispatch on [`BackendKind`].
pub async fn call_backend(http: &reqwest::Client, backend: &BackendConfig, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
    match backend.kind {
        BackendKind::Local => call_local(http, backend, texts).await,
        BackendKind::OpenaiCompatible => call_openai_compatible(http, backend, texts).await,
    }
}
