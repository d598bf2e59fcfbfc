use serde::{Deserialize, Serialize};

use crate::config::{LlmConfig, SearchConfig};
use crate::error::ApiError;
use crate::llm::embeddings::embed_single;
use crate::models::{SearchOutcome, SearchResult, SemanticAnswer};

const SEARCH_API_VERSION: &str = "2023-11-01";

/// How many documents the whole-corpus fetch pulls at most.
const ALL_DOCUMENTS_CAP: usize = 100;

/// Client for the managed hybrid-search backend. Each query runs three legs
/// in one request: BM25 over the query text, k-nearest-neighbor over the
/// query embedding, and the backend's semantic reranker on top.
pub struct HybridSearchClient {
    http: reqwest::Client,
    search: SearchConfig,
    llm: LlmConfig,
}

// ─── Wire shapes ─────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    count: bool,
    search: &'a str,
    query_type: &'a str,
    semantic_configuration: &'a str,
    top: usize,
    vector_queries: Vec<VectorQuery<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VectorQuery<'a> {
    kind: &'a str,
    vector: Vec<f32>,
    k: usize,
    fields: &'a str,
    exhaustive: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(rename = "@odata.count")]
    count: Option<i64>,
    #[serde(rename = "@search.answers", default)]
    answers: Option<Vec<RawAnswer>>,
    #[serde(default)]
    value: Vec<RawDocument>,
}

#[derive(Deserialize)]
struct RawAnswer {
    score: Option<f64>,
    text: Option<String>,
    highlights: Option<String>,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "@search.score")]
    search_score: Option<f64>,
    #[serde(rename = "@search.rerankerScore")]
    reranker_score: Option<f64>,
    #[serde(rename = "@search.captions", default)]
    captions: Option<Vec<RawCaption>>,
    metadata_storage_name: Option<String>,
    content: Option<String>,
    chunk_id: Option<String>,
    metadata_storage_path: Option<String>,
    metadata_content_type: Option<String>,
}

#[derive(Deserialize)]
struct RawCaption {
    text: Option<String>,
    highlights: Option<String>,
}

#[derive(Deserialize)]
struct AllDocumentsResponse {
    #[serde(default)]
    value: Vec<ContentOnly>,
}

#[derive(Deserialize)]
struct ContentOnly {
    content: Option<String>,
}

impl HybridSearchClient {
    pub fn new(http: reqwest::Client, search: SearchConfig, llm: LlmConfig) -> Self {
        Self { http, search, llm }
    }

    fn docs_url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={SEARCH_API_VERSION}",
            self.search.endpoint, self.search.index_name
        )
    }

    /// Hybrid search: embed the query, then run one combined BM25 + vector +
    /// semantic query against the index. Results come back in the backend's
    /// ranking order, which we preserve.
    pub async fn search(&self, query: &str, top: Option<usize>) -> Result<SearchOutcome, ApiError> {
        // ── Step 1: embed the query for the vector leg ──
        let vector = embed_single(&self.http, &self.llm, query)
            .await
            .map_err(|e| ApiError::Upstream(format!("query embedding failed: {e:#}")))?;

        // ── Step 2: one hybrid request, three ranking legs ──
        let req = SearchRequest {
            count: true,
            search: query,
            query_type: "semantic",
            semantic_configuration: &self.search.semantic_config,
            top: top.unwrap_or(self.search.default_top),
            vector_queries: vec![VectorQuery {
                kind: "vector",
                vector,
                k: self.search.k_nearest,
                fields: &self.search.vector_field,
                exhaustive: true,
            }],
        };

        let resp = self
            .http
            .post(self.docs_url())
            .header("api-key", &self.search.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("search backend unreachable: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!(
                "search backend returned {status}: {body}"
            )));
        }

        let raw: SearchResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Upstream(format!("malformed search response: {e}")))?;

        // ── Step 3: normalize into the outcome shape ──
        Ok(format_results(raw))
    }

    /// Fetch the content of every indexed document, newline-joined, for
    /// whole-corpus generation. Capped at 100 documents.
    pub async fn get_all_documents(&self) -> Result<String, ApiError> {
        let body = serde_json::json!({
            "search": "*",
            "top": ALL_DOCUMENTS_CAP,
        });

        let resp = self
            .http
            .post(self.docs_url())
            .header("api-key", &self.search.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("search backend unreachable: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!(
                "search backend returned {status}: {text}"
            )));
        }

        let raw: AllDocumentsResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Upstream(format!("malformed search response: {e}")))?;

        Ok(raw
            .value
            .into_iter()
            .filter_map(|d| d.content)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Pure normalization of a raw backend response. Absent fields stay `None`,
/// only the first caption of a document is kept, and ranking order is
/// untouched.
fn format_results(raw: SearchResponse) -> SearchOutcome {
    let answers = raw
        .answers
        .unwrap_or_default()
        .into_iter()
        .map(|a| SemanticAnswer {
            score: a.score,
            text: a.text,
            highlights: a.highlights,
        })
        .collect();

    let results = raw
        .value
        .into_iter()
        .map(|doc| {
            let (caption, caption_highlights) = doc
                .captions
                .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
                .map(|c| (c.text, c.highlights))
                .unwrap_or((None, None));

            SearchResult {
                search_score: doc.search_score,
                reranker_score: doc.reranker_score,
                title: doc.metadata_storage_name,
                content: doc.content,
                chunk_id: doc.chunk_id,
                storage_path: doc.metadata_storage_path,
                content_type: doc.metadata_content_type,
                caption,
                caption_highlights,
            }
        })
        .collect();

    SearchOutcome {
        total_count: raw.count,
        answers,
        results,
    }
}
