//! # api-modules
//!
//! Partition a large OpenAPI specification into token-budgeted topic modules
//! for AI prompt context, and detect when a task description implies an API
//! endpoint that does not exist yet.
//!
//! Injecting a whole OpenAPI document into a prompt is expensive; most tasks
//! only touch one topic. api-modules splits the spec into a compact index
//! plus per-module documents sized for prompt injection, then at runtime
//! fetches only the module a task needs, matches the task description against
//! its endpoints, and reports gaps as ready-to-file issue drafts.
//!
//! ## Architecture
//!
//! ```text
//! build time (one-shot):
//! ┌─────────┐   ┌───────────┐   ┌─────────────┐   ┌──────────────────┐
//! │ Source   │──▶│ Extractor │──▶│ Partitioner │──▶│ api-index.json    │
//! │ remote/  │   │ paths →   │   │ tags →      │   │ metadata.json     │
//! │ local    │   │ endpoints │   │ modules     │   │ modules/<id>.json │
//! └─────────┘   └───────────┘   └─────────────┘   └──────────────────┘
//!
//! runtime (interactive):
//! ┌──────────────────┐   ┌─────────────┐   ┌──────────┐   ┌──────────┐
//! │ modules/<id>.json │──▶│ ModuleClient│──▶│ Analyzer │   │ Prompt   │
//! │ (served over HTTP)│   │ TTL cache + │   │ gaps     │   │ Assembler│
//! └──────────────────┘   │ supersession│   └──────────┘   └──────────┘
//!                        └─────────────┘
//! ```
//!
//! The two halves share only the data model and the token estimation
//! heuristic, never live state.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Shared data model |
//! | [`modules`] | Static module/tag partition |
//! | [`tokens`] | chars/4 token estimation |
//! | [`source`] | Two-tier spec resolution (remote, local fallback) |
//! | [`extract`] | OpenAPI → flat endpoint records |
//! | [`partition`] | Index, module documents, Markdown rendering |
//! | [`generate`] | The `apimod generate` pipeline |
//! | [`client`] | Cached module fetching with supersession |
//! | [`analyze`] | Description analysis and gap detection |
//! | [`prompt`] | Prompt assembly |

pub mod analyze;
pub mod client;
pub mod config;
pub mod extract;
pub mod generate;
pub mod models;
pub mod modules;
pub mod partition;
pub mod prompt;
pub mod source;
pub mod tokens;
