use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// Postgres connection URL
    pub database_url: String,
    /// Maximum connections in the pool
    pub max_db_connections: u32,
    /// Token signing configuration
    pub auth: AuthConfig,
    /// Blob store signed-URL configuration
    pub blob: BlobConfig,
    /// Managed hybrid-search backend configuration
    pub search: SearchConfig,
    /// Generative/embedding backend configuration
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing access tokens
    pub secret: String,
    /// Token lifetime in minutes (expiry is evaluated at validation time)
    pub token_ttl_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobConfig {
    /// Storage account name (also the URL host prefix)
    pub account_name: String,
    /// Base64-encoded account key used to sign URLs
    pub account_key: String,
    /// Container holding every user folder
    pub container: String,
    /// Signed-URL lifetime in minutes
    pub url_ttl_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the managed search service
    pub endpoint: String,
    /// API key sent with every search request
    pub api_key: String,
    /// Index to query
    pub index_name: String,
    /// Semantic ranking configuration name on the index
    pub semantic_config: String,
    /// Index field holding the document embedding
    pub vector_field: String,
    /// Results to request when the caller does not specify top_k
    pub default_top: usize,
    /// Nearest-neighbor count for the vector leg of the hybrid query
    pub k_nearest: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL for the OpenAI-compatible API
    pub base_url: String,
    /// API key (bearer)
    pub api_key: String,
    /// Model name for chat completions
    pub chat_model: String,
    /// Model name for embeddings
    pub embedding_model: String,
    /// Sampling temperature for generation
    pub temperature: f32,
    /// Completion token budget
    pub max_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            database_url: "postgres://localhost/clara".to_string(),
            max_db_connections: 5,
            auth: AuthConfig::default(),
            blob: BlobConfig::default(),
            search: SearchConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_ttl_minutes: 30,
        }
    }
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            account_name: String::new(),
            account_key: String::new(),
            container: "myclr".to_string(),
            url_ttl_minutes: 30,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            index_name: "azureblob-index".to_string(),
            semantic_config: "azureblob-index-semantic-configuration".to_string(),
            vector_field: "text_vector".to_string(),
            default_top: 7,
            k_nearest: 5,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            chat_model: "grok-3".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("CLARA_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }
        if let Ok(val) = std::env::var("CLARA_MAX_DB_CONNECTIONS") {
            if let Ok(v) = val.parse() {
                config.max_db_connections = v;
            }
        }
        if let Ok(secret) = std::env::var("JWT_SECRET_KEY") {
            config.auth.secret = secret;
        }
        if let Ok(val) = std::env::var("JWT_TTL_MINUTES") {
            if let Ok(v) = val.parse() {
                config.auth.token_ttl_minutes = v;
            }
        }
        if let Ok(name) = std::env::var("STORAGE_ACCOUNT_NAME") {
            config.blob.account_name = name;
        }
        if let Ok(key) = std::env::var("STORAGE_ACCOUNT_KEY") {
            config.blob.account_key = key;
        }
        if let Ok(container) = std::env::var("STORAGE_CONTAINER") {
            config.blob.container = container;
        }
        if let Ok(endpoint) = std::env::var("SEARCH_ENDPOINT") {
            config.search.endpoint = endpoint;
        }
        if let Ok(key) = std::env::var("SEARCH_API_KEY") {
            config.search.api_key = key;
        }
        if let Ok(index) = std::env::var("SEARCH_INDEX_NAME") {
            config.search.index_name = index;
        }
        if let Ok(name) = std::env::var("SEARCH_SEMANTIC_CONFIG") {
            config.search.semantic_config = name;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.llm.api_key = key;
        }
        if let Ok(model) = std::env::var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Ok(model) = std::env::var("LLM_EMBEDDING_MODEL") {
            config.llm.embedding_model = model;
        }
        if let Ok(val) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(v) = val.parse() {
                config.llm.max_tokens = v;
            }
        }

        config
    }
}
