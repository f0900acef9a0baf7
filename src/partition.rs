//! Module partitioning and artifact generation.
//!
//! Groups extracted endpoints into the static modules by tag membership and
//! produces the compact cross-module index, one document per module, and a
//! human-readable Markdown rendering. Membership is non-exclusive: an
//! endpoint appears in every module whose tags intersect its own; endpoints
//! matching no module are omitted from every document but listed in the
//! Markdown index so nothing silently disappears.
//!
//! The partitioner is pure except for the generation timestamp it embeds:
//! re-running it with the same endpoints and version produces byte-identical
//! output apart from `generatedAt`.

use crate::models::{ApiIndex, CompactEndpoint, Endpoint, ModuleDocument, ModuleStat};
use crate::modules::{ModuleDef, MODULE_DEFINITIONS};
use crate::source::SpecSource;
use crate::tokens::estimate_json_tokens;

/// Does this endpoint belong to the module? True iff the tag sets intersect.
fn endpoint_in_module(def: &ModuleDef, endpoint: &Endpoint) -> bool {
    endpoint.tags.iter().any(|t| def.tags.contains(&t.as_str()))
}

/// All endpoints belonging to a module, in extraction order.
pub fn module_endpoints<'a>(def: &ModuleDef, endpoints: &'a [Endpoint]) -> Vec<&'a Endpoint> {
    endpoints
        .iter()
        .filter(|e| endpoint_in_module(def, e))
        .collect()
}

/// Endpoints that match no defined module's tags. Never written to a module
/// document, but enumerable for auditing.
pub fn unassigned_endpoints(endpoints: &[Endpoint]) -> Vec<&Endpoint> {
    endpoints
        .iter()
        .filter(|e| {
            e.tags.is_empty() || !MODULE_DEFINITIONS.iter().any(|m| endpoint_in_module(m, e))
        })
        .collect()
}

/// Build the compact cross-module index.
pub fn build_index(
    endpoints: &[Endpoint],
    version: &str,
    source: SpecSource,
    generated_at: &str,
) -> ApiIndex {
    let compact = endpoints
        .iter()
        .map(|e| CompactEndpoint {
            m: e.method,
            p: e.path.clone(),
            s: e.summary.clone(),
            t: e.tags.clone(),
            o: e.operation_id.clone(),
        })
        .collect();

    let modules = MODULE_DEFINITIONS
        .iter()
        .map(|def| ModuleStat {
            id: def.id.to_string(),
            label: def.label.to_string(),
            endpoint_count: module_endpoints(def, endpoints).len(),
            tags: def.tags.iter().map(|t| t.to_string()).collect(),
        })
        .collect();

    ApiIndex {
        version: version.to_string(),
        source: source.as_str().to_string(),
        generated_at: generated_at.to_string(),
        total_endpoints: endpoints.len(),
        modules,
        endpoints: compact,
    }
}

/// Build one module's document. `token_count` is computed last, from the
/// document with `token_count` temporarily 0, so the estimate covers the
/// document's own encoding.
pub fn build_module_document(
    def: &ModuleDef,
    endpoints: &[Endpoint],
    version: &str,
    generated_at: &str,
) -> ModuleDocument {
    let mut document = ModuleDocument {
        module: def.id.to_string(),
        label: def.label.to_string(),
        version: version.to_string(),
        generated_at: generated_at.to_string(),
        endpoints: module_endpoints(def, endpoints)
            .into_iter()
            .cloned()
            .collect(),
        token_count: 0,
    };
    document.token_count = estimate_json_tokens(&document);
    document
}

/// Render the Markdown index: per-module endpoint tables plus a section for
/// endpoints that matched no module.
pub fn render_markdown_index(
    endpoints: &[Endpoint],
    version: &str,
    source: SpecSource,
    generated_at: &str,
) -> String {
    let mut md = format!("# API Index - v{}\n\n", version);
    md.push_str(&format!("Source: {}\n", source));
    md.push_str(&format!("Generated: {}\n\n", generated_at));
    md.push_str(&format!("Total endpoints: {}\n\n", endpoints.len()));

    for def in MODULE_DEFINITIONS {
        let members = module_endpoints(def, endpoints);
        if members.is_empty() {
            continue;
        }

        md.push_str(&format!("## {}\n\n", def.label));
        md.push_str("| Method | Path | Summary |\n");
        md.push_str("|--------|------|--------|\n");
        for e in members {
            md.push_str(&format!(
                "| {} | `{}` | {} |\n",
                e.method,
                e.path,
                escape_cell(e.summary.as_deref())
            ));
        }
        md.push('\n');
    }

    let unassigned = unassigned_endpoints(endpoints);
    if !unassigned.is_empty() {
        md.push_str("## Unassigned\n\n");
        md.push_str("| Method | Path | Tags | Summary |\n");
        md.push_str("|--------|------|------|--------|\n");
        for e in unassigned {
            let tags = if e.tags.is_empty() {
                "-".to_string()
            } else {
                e.tags.join(", ")
            };
            md.push_str(&format!(
                "| {} | `{}` | {} | {} |\n",
                e.method,
                e.path,
                tags,
                escape_cell(e.summary.as_deref())
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(text: Option<&str>) -> String {
    match text {
        Some(t) => t.replace('|', "\\|"),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HttpMethod;
    use crate::modules::module_by_id;

    fn endpoint(method: HttpMethod, path: &str, tags: &[&str]) -> Endpoint {
        Endpoint {
            operation_id: format!("{}_{}", method.as_str().to_lowercase(), path),
            method,
            path: path.to_string(),
            summary: Some(format!("{} {}", method, path)),
            description: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            parameters: None,
            request_body: None,
        }
    }

    fn sample_endpoints() -> Vec<Endpoint> {
        vec![
            endpoint(HttpMethod::Get, "/audits", &["Auditor"]),
            endpoint(HttpMethod::Post, "/campaigns", &["Campaigns"]),
            // Tagged into two modules at once
            endpoint(HttpMethod::Get, "/products", &["Products", "HubSpot"]),
            // Matches no module
            endpoint(HttpMethod::Get, "/internal/debug", &["Debug"]),
        ]
    }

    #[test]
    fn membership_is_non_exclusive() {
        let endpoints = sample_endpoints();
        let infra = module_endpoints(module_by_id("infrastructure").unwrap(), &endpoints);
        let integrations = module_endpoints(module_by_id("integrations").unwrap(), &endpoints);
        assert!(infra.iter().any(|e| e.path == "/products"));
        assert!(integrations.iter().any(|e| e.path == "/products"));
    }

    #[test]
    fn unmatched_endpoints_are_in_no_document_but_enumerable() {
        let endpoints = sample_endpoints();
        for def in MODULE_DEFINITIONS {
            let doc = build_module_document(def, &endpoints, "1.0.0", "ts");
            assert!(!doc.endpoints.iter().any(|e| e.path == "/internal/debug"));
        }
        let unassigned = unassigned_endpoints(&endpoints);
        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].path, "/internal/debug");
    }

    #[test]
    fn index_counts_match_module_documents() {
        let endpoints = sample_endpoints();
        let index = build_index(&endpoints, "1.0.0", SpecSource::Local, "ts");
        assert_eq!(index.total_endpoints, 4);
        for stat in &index.modules {
            let def = module_by_id(&stat.id).unwrap();
            let doc = build_module_document(def, &endpoints, "1.0.0", "ts");
            assert_eq!(stat.endpoint_count, doc.endpoints.len());
        }
    }

    #[test]
    fn token_count_is_computed_from_the_document_itself() {
        let endpoints = sample_endpoints();
        let def = module_by_id("auditing").unwrap();
        let doc = build_module_document(def, &endpoints, "1.0.0", "ts");

        let mut zeroed = doc.clone();
        zeroed.token_count = 0;
        assert_eq!(doc.token_count, estimate_json_tokens(&zeroed));
        assert!(doc.token_count > 0);
    }

    #[test]
    fn partitioning_is_idempotent_given_the_same_timestamp() {
        let endpoints = sample_endpoints();
        let a = build_index(&endpoints, "1.0.0", SpecSource::Remote, "ts");
        let b = build_index(&endpoints, "1.0.0", SpecSource::Remote, "ts");
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );

        for def in MODULE_DEFINITIONS {
            let first = build_module_document(def, &endpoints, "1.0.0", "ts");
            let second = build_module_document(def, &endpoints, "1.0.0", "ts");
            assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }
    }

    #[test]
    fn markdown_lists_modules_and_unassigned() {
        let endpoints = sample_endpoints();
        let md = render_markdown_index(&endpoints, "1.0.0", SpecSource::Local, "ts");
        assert!(md.contains("## Auditing"));
        assert!(md.contains("| GET | `/audits` |"));
        assert!(md.contains("## Unassigned"));
        assert!(md.contains("`/internal/debug`"));
        // Empty modules are skipped entirely
        assert!(!md.contains("## Queues"));
    }
}
