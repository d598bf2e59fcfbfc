//! # clara-backend
//!
//! Backend for an educational assistant: a thin HTTP layer over a relational
//! record store, a blob store accessed through signed URLs, a managed hybrid
//! search index, and a generative model.
//!
//! ## Architecture
//!
//! Two surfaces share one process:
//!
//! ```text
//!   ┌────────────────────────────┐   ┌────────────────────────────┐
//!   │   Storage & account API     │   │        RAG pipeline         │
//!   │                             │   │                             │
//!   │  /auth/*    credentials     │   │  query                      │
//!   │  /db/*      modules,        │   │    │                        │
//!   │             classes,        │   │    ▼                        │
//!   │             enrollments     │   │  hybrid search              │
//!   │  /storage/* signed URLs,    │   │  (BM25 + vector + semantic) │
//!   │             file trees      │   │    │  top 7 chunks          │
//!   │                             │   │    ▼                        │
//!   │  bytes never transit here:  │   │  4-message prompt           │
//!   │  clients talk to the blob   │   │    │                        │
//!   │  store directly             │   │    ▼                        │
//!   │                             │   │  answer / exercises /       │
//!   │                             │   │  revision sheets            │
//!   └────────────────────────────┘   └────────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, store, search, and model settings
//! - [`models`] - Shared data types: `FileRecord`, `Exercise`, request/response types
//! - [`error`] - The error taxonomy every handler maps into
//! - [`db`] - Typed accessors over the Postgres record store
//! - [`auth`] - Password hashing, token issue/validation, and the request extractor
//! - [`storage`] - Signed blob URLs and the RAW-rooted file-tree builder
//! - [`search`] - Hybrid retrieval against the managed search backend
//! - [`llm`] - Generative client, prompt composition, and output repair
//! - [`api`] - Axum HTTP handlers for auth, records, storage, and generation
//! - [`state`] - Shared application state holding the pool and clients

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod models;
pub mod search;
pub mod state;
pub mod storage;
