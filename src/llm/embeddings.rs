use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

/// Maximum characters to send per text to the embedding API.
/// text-embedding-ada-002 has an 8 191-token context. Course material
/// tokenises at roughly 1 token per 3-4 chars, so 3 000 chars stays well
/// under the limit even for dense technical content.
const MAX_EMBED_CHARS: usize = 3_000;

/// Truncate `text` to at most `MAX_EMBED_CHARS`, splitting on a UTF-8 char boundary.
fn truncate_for_embedding(text: &str) -> &str {
    if text.len() <= MAX_EMBED_CHARS {
        return text;
    }
    // Find the last char boundary at or before the limit
    let mut end = MAX_EMBED_CHARS;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

/// Generate an embedding for a single query text via the OpenAI-compatible
/// embeddings endpoint.
pub async fn embed_single(
    client: &reqwest::Client,
    config: &LlmConfig,
    text: &str,
) -> Result<Vec<f32>> {
    let url = format!("{}/v1/embeddings", config.base_url);

    let req = EmbedRequest {
        model: config.embedding_model.clone(),
        input: vec![truncate_for_embedding(text).to_string()],
    };

    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {}", config.api_key))
        .json(&req)
        .send()
        .await
        .context("Failed to call embeddings API")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Embeddings API returned {status}: {body}");
    }

    let body: EmbedResponse = resp
        .json()
        .await
        .context("Failed to parse embeddings response")?;

    body.data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .context("No embedding returned")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_noop_for_short_text() {
        assert_eq!(truncate_for_embedding("hello"), "hello");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // Fill right up to the limit then place a multi-byte char across it
        let mut text = "a".repeat(MAX_EMBED_CHARS - 1);
        text.push('é');
        let out = truncate_for_embedding(&text);
        assert!(out.len() <= MAX_EMBED_CHARS);
        assert!(out.chars().all(|c| c == 'a'));
    }
}
