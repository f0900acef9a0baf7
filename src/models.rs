//! Core data models shared by the build pipeline and the runtime client.
//!
//! These types describe the endpoints extracted from an OpenAPI specification
//! and the artifacts the partitioner produces: the compact cross-module index,
//! the per-module documents, and the metadata listing. Serialized field names
//! are camelCase to match the published JSON artifacts.

use serde::{Deserialize, Serialize};

/// HTTP methods considered by the extractor. All other verbs under a path
/// (`options`, `head`, `trace`) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Parse a lowercase OpenAPI verb key. Returns `None` for verbs the
    /// extractor does not consider.
    pub fn from_verb(verb: &str) -> Option<Self> {
        match verb {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "patch" => Some(HttpMethod::Patch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter lives in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "cookie" => Some(ParameterLocation::Cookie),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        }
    }
}

/// A flattened operation parameter. Schema detail beyond the scalar type is
/// dropped during extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
}

/// Summarized request body: only whether it is required and the name of the
/// JSON schema it references, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_ref: Option<String>,
}

/// One (method, path) operation extracted from the specification.
///
/// Identity is the (method, path) pair; `operation_id` is a secondary label
/// and is synthesized as `"<verb>_<path>"` when the spec omits it. Immutable
/// once extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub operation_id: String,
    pub method: HttpMethod,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
}

/// The persisted/served unit for one module: all endpoints whose tags
/// intersect the module's tag set, plus a self-referential token estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDocument {
    pub module: String,
    pub label: String,
    pub version: String,
    pub generated_at: String,
    pub endpoints: Vec<Endpoint>,
    pub token_count: u64,
}

/// Compact endpoint encoding used in the index. Single-letter keys keep the
/// index small enough to inject into a prompt whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactEndpoint {
    pub m: HttpMethod,
    pub p: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub t: Vec<String>,
    pub o: String,
}

/// Per-module summary row in the index. Lets a caller pick a module by topic
/// and size without fetching any module document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStat {
    pub id: String,
    pub label: String,
    pub endpoint_count: usize,
    pub tags: Vec<String>,
}

/// Cross-module index: module stats plus every endpoint in compact encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiIndex {
    pub version: String,
    pub source: String,
    pub generated_at: String,
    pub total_endpoints: usize,
    pub modules: Vec<ModuleStat>,
    pub endpoints: Vec<CompactEndpoint>,
}

/// Entry in `metadata.json` pointing at one module document file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataModule {
    pub id: String,
    pub file: String,
    pub endpoint_count: usize,
    pub token_count: u64,
}

/// The `metadata.json` artifact: one row per module document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub version: String,
    pub source: String,
    pub generated_at: String,
    pub modules: Vec<MetadataModule>,
}

/// A gap detected by the analyzer: an action/entity combination with no
/// matching endpoint, plus a ready-to-file issue draft. Transient; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingEndpointInfo {
    pub description: String,
    pub suggested_method: HttpMethod,
    pub suggested_path: String,
    pub reason: String,
    pub jira_description: String,
}

/// Result of analyzing a task description against a module's endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub is_complete: bool,
    pub matched_endpoints: Vec<Endpoint>,
    pub missing_endpoints: Vec<MissingEndpointInfo>,
}

impl AnalysisResult {
    /// The vacuous verdict: nothing recognizable, nothing missing. Also the
    /// conservative default when analysis cannot run at all.
    pub fn vacuous() -> Self {
        AnalysisResult {
            is_complete: true,
            matched_endpoints: Vec::new(),
            missing_endpoints: Vec::new(),
        }
    }
}
