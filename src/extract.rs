//! Endpoint extraction from a raw OpenAPI document.
//!
//! Normalizes the `paths` object into a flat, ordered list of [`Endpoint`]
//! records. Extraction is total and order-preserving: every (path, verb)
//! combination in the allowed verb set yields exactly one record, in
//! specification traversal order. Schema detail is deliberately dropped to
//! bound downstream token cost.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::models::{Endpoint, HttpMethod, Parameter, ParameterLocation, RequestBody};

/// Long operation descriptions are truncated to this many characters; the
/// summary usually carries the useful part.
const MAX_DESCRIPTION_CHARS: usize = 200;

/// Title and version of the specification, for reporting and versioning the
/// generated artifacts.
#[derive(Debug, Clone)]
pub struct SpecInfo {
    pub openapi: String,
    pub title: String,
    pub version: String,
}

/// Read `openapi` and `info.{title,version}` from the raw document.
pub fn spec_info(spec: &Value) -> SpecInfo {
    let str_or_unknown = |v: Option<&Value>| {
        v.and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string()
    };
    SpecInfo {
        openapi: str_or_unknown(spec.get("openapi")),
        title: str_or_unknown(spec.get("info").and_then(|i| i.get("title"))),
        version: str_or_unknown(spec.get("info").and_then(|i| i.get("version"))),
    }
}

/// Flatten the specification's `paths` object into endpoint records.
///
/// A document without a `paths` object is malformed; no partial output is
/// produced.
pub fn extract_endpoints(spec: &Value) -> Result<Vec<Endpoint>> {
    let paths = spec
        .get("paths")
        .and_then(Value::as_object)
        .context("Malformed specification: missing `paths` object")?;

    let mut endpoints = Vec::new();

    for (path, path_item) in paths {
        let Some(operations) = path_item.as_object() else {
            continue;
        };
        for (verb, operation) in operations {
            let Some(method) = HttpMethod::from_verb(&verb.to_lowercase()) else {
                continue;
            };
            endpoints.push(extract_operation(method, verb, path, operation));
        }
    }

    Ok(endpoints)
}

fn extract_operation(method: HttpMethod, verb: &str, path: &str, operation: &Value) -> Endpoint {
    let operation_id = operation
        .get("operationId")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}_{}", verb, path));

    let summary = operation
        .get("summary")
        .and_then(Value::as_str)
        .map(str::to_string);

    // Keep the description only when it adds something beyond the summary,
    // truncated to bound token cost.
    let description = operation
        .get("description")
        .and_then(Value::as_str)
        .filter(|d| summary.as_deref() != Some(*d))
        .map(|d| d.chars().take(MAX_DESCRIPTION_CHARS).collect());

    let tags = operation
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let parameters = operation
        .get("parameters")
        .and_then(Value::as_array)
        .map(|params| params.iter().filter_map(extract_parameter).collect())
        .filter(|params: &Vec<Parameter>| !params.is_empty());

    let request_body = operation.get("requestBody").map(extract_request_body);

    Endpoint {
        operation_id,
        method,
        path: path.to_string(),
        summary,
        description,
        tags,
        parameters,
        request_body,
    }
}

fn extract_parameter(param: &Value) -> Option<Parameter> {
    let name = param.get("name").and_then(Value::as_str)?.to_string();
    let location = ParameterLocation::parse(param.get("in").and_then(Value::as_str)?)?;
    Some(Parameter {
        name,
        location,
        required: param.get("required").and_then(Value::as_bool),
        schema_type: param
            .get("schema")
            .and_then(|s| s.get("type"))
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

fn extract_request_body(body: &Value) -> RequestBody {
    let schema_ref = body
        .get("content")
        .and_then(|c| c.get("application/json"))
        .and_then(|j| j.get("schema"))
        .and_then(|s| s.get("$ref"))
        .and_then(Value::as_str)
        .map(schema_name);

    RequestBody {
        required: body.get("required").and_then(Value::as_bool),
        schema_ref,
    }
}

/// Last path segment of a schema reference:
/// `#/components/schemas/CreateUserRequest` → `CreateUserRequest`.
fn schema_name(reference: &str) -> String {
    reference
        .rsplit('/')
        .next()
        .unwrap_or(reference)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_spec() -> Value {
        json!({
            "openapi": "3.0.0",
            "info": { "title": "CRM API", "version": "2.4.0" },
            "paths": {
                "/users": {
                    "get": {
                        "operationId": "listUsers",
                        "summary": "List users",
                        "tags": ["Users"],
                        "parameters": [
                            {
                                "name": "page",
                                "in": "query",
                                "required": false,
                                "schema": { "type": "integer", "format": "int32" }
                            }
                        ]
                    },
                    "post": {
                        "summary": "Create a user",
                        "description": "Create a user",
                        "tags": ["Users"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreateUserRequest" }
                                }
                            }
                        }
                    },
                    "options": { "summary": "CORS preflight" }
                },
                "/leads/{id}": {
                    "get": {
                        "operationId": "getLead",
                        "summary": "Get a lead",
                        "description": "Fetch a single lead by its identifier, including pipeline state.",
                        "tags": ["Leads"],
                        "parameters": [
                            {
                                "name": "id",
                                "in": "path",
                                "required": true,
                                "schema": { "type": "string" }
                            }
                        ]
                    }
                }
            }
        })
    }

    #[test]
    fn extraction_is_total_over_allowed_verbs() {
        let endpoints = extract_endpoints(&sample_spec()).unwrap();
        // options is ignored; get+post on /users, get on /leads/{id}
        assert_eq!(endpoints.len(), 3);
        for e in &endpoints {
            assert!(!e.operation_id.is_empty());
        }
    }

    #[test]
    fn traversal_order_is_preserved() {
        let endpoints = extract_endpoints(&sample_spec()).unwrap();
        let pairs: Vec<(&str, &str)> = endpoints
            .iter()
            .map(|e| (e.method.as_str(), e.path.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("GET", "/users"),
                ("POST", "/users"),
                ("GET", "/leads/{id}"),
            ]
        );
    }

    #[test]
    fn operation_id_is_synthesized_when_absent() {
        let endpoints = extract_endpoints(&sample_spec()).unwrap();
        let create = endpoints
            .iter()
            .find(|e| e.method == HttpMethod::Post)
            .unwrap();
        assert_eq!(create.operation_id, "post_/users");
    }

    #[test]
    fn description_equal_to_summary_is_dropped() {
        let endpoints = extract_endpoints(&sample_spec()).unwrap();
        let create = endpoints
            .iter()
            .find(|e| e.method == HttpMethod::Post)
            .unwrap();
        assert!(create.description.is_none());

        let lead = endpoints.iter().find(|e| e.path == "/leads/{id}").unwrap();
        assert!(lead.description.is_some());
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let spec = json!({
            "paths": {
                "/reports": {
                    "get": {
                        "summary": "Reports",
                        "description": "x".repeat(500)
                    }
                }
            }
        });
        let endpoints = extract_endpoints(&spec).unwrap();
        assert_eq!(
            endpoints[0].description.as_ref().unwrap().chars().count(),
            200
        );
    }

    #[test]
    fn parameters_are_flattened() {
        let endpoints = extract_endpoints(&sample_spec()).unwrap();
        let list = endpoints.iter().find(|e| e.operation_id == "listUsers").unwrap();
        let params = list.parameters.as_ref().unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "page");
        assert_eq!(params[0].location, ParameterLocation::Query);
        assert_eq!(params[0].schema_type.as_deref(), Some("integer"));
    }

    #[test]
    fn request_body_keeps_only_schema_name() {
        let endpoints = extract_endpoints(&sample_spec()).unwrap();
        let create = endpoints
            .iter()
            .find(|e| e.method == HttpMethod::Post)
            .unwrap();
        let body = create.request_body.as_ref().unwrap();
        assert_eq!(body.required, Some(true));
        assert_eq!(body.schema_ref.as_deref(), Some("CreateUserRequest"));
    }

    #[test]
    fn missing_paths_is_malformed() {
        let err = extract_endpoints(&json!({ "openapi": "3.0.0" })).unwrap_err();
        assert!(format!("{:#}", err).contains("paths"));
    }

    #[test]
    fn spec_info_defaults_missing_fields() {
        let info = spec_info(&json!({ "paths": {} }));
        assert_eq!(info.version, "unknown");
        assert_eq!(info.title, "unknown");
    }
}
