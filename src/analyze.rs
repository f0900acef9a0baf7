//! Description analysis: detect endpoints a task needs but the API lacks.
//!
//! A keyword heuristic, not language understanding. Tokens from the task
//! description are looked up in two static bilingual (Spanish/English)
//! dictionaries: action verbs map to candidate HTTP methods, entity nouns map
//! to candidate path fragments. Every action/entity pair is checked against
//! the module's endpoints; pairs with no match become structured gap reports
//! with a ready-to-file issue draft.
//!
//! False negatives and false positives are accepted trade-offs: a match here
//! is a recall aid, not a guarantee of API sufficiency.

use anyhow::{bail, Result};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::client::{HttpFetcher, ModuleClient, ModuleFetch};
use crate::config::{Config, RuntimeConfig};
use crate::models::{AnalysisResult, Endpoint, HttpMethod, MissingEndpointInfo};
use crate::modules::{module_by_id, MODULE_DEFINITIONS};

/// Descriptions shorter than this are not worth analyzing.
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// Candidate HTTP methods for an action verb, or `None` if the token is not
/// a known action. Update-class verbs map to both PUT and PATCH.
fn action_methods(word: &str) -> Option<&'static [HttpMethod]> {
    use HttpMethod::*;
    const CREATE: &[HttpMethod] = &[Post];
    const READ: &[HttpMethod] = &[Get];
    const UPDATE: &[HttpMethod] = &[Put, Patch];
    const REMOVE: &[HttpMethod] = &[Delete];

    match word {
        "crear" | "agregar" | "añadir" | "nuevo" | "nueva" | "registrar" | "generar"
        | "create" | "add" | "new" | "register" | "generate" => Some(CREATE),
        "obtener" | "listar" | "ver" | "mostrar" | "buscar" | "consultar" | "get" | "list"
        | "view" | "show" | "search" | "fetch" | "find" => Some(READ),
        "actualizar" | "modificar" | "editar" | "cambiar" | "update" | "modify" | "edit"
        | "change" => Some(UPDATE),
        "eliminar" | "borrar" | "quitar" | "remover" | "delete" | "remove" => Some(REMOVE),
        _ => None,
    }
}

/// Candidate path fragments for an entity noun, or `None` if the token is not
/// a known entity. Singular and plural forms are mapped independently.
fn entity_paths(word: &str) -> Option<&'static [&'static str]> {
    match word {
        "usuario" | "user" => Some(&["users", "user"]),
        "usuarios" | "users" => Some(&["users"]),
        "lead" => Some(&["leads", "lead"]),
        "leads" => Some(&["leads"]),
        "cliente" => Some(&["clients", "customers", "client"]),
        "clientes" => Some(&["clients", "customers"]),
        "client" => Some(&["clients", "client"]),
        "clients" => Some(&["clients"]),
        "customer" => Some(&["customers", "customer"]),
        "customers" => Some(&["customers"]),
        "cola" | "queue" => Some(&["queues", "queue"]),
        "colas" | "queues" => Some(&["queues"]),
        "agente" | "agent" => Some(&["agents", "agent"]),
        "agentes" | "agents" => Some(&["agents"]),
        "auditoría" | "auditoria" => Some(&["audits", "auditor"]),
        "audit" => Some(&["audits", "audit"]),
        "audits" => Some(&["audits"]),
        "reporte" | "report" => Some(&["reports", "report"]),
        "reportes" | "reports" => Some(&["reports"]),
        "campaña" | "campana" => Some(&["campaigns", "campaign", "campana"]),
        "campaign" => Some(&["campaigns", "campaign"]),
        "campaigns" => Some(&["campaigns"]),
        "producto" | "product" => Some(&["products", "product"]),
        "productos" | "products" => Some(&["products"]),
        "asistente" | "assistant" => Some(&["assistants", "assistant"]),
        "asistentes" | "assistants" => Some(&["assistants"]),
        "transcripción" | "transcripcion" | "transcription" => {
            Some(&["transcriptions", "transcription"])
        }
        "transcriptions" => Some(&["transcriptions"]),
        "configuración" | "configuracion" => Some(&["settings", "config", "options"]),
        "settings" => Some(&["settings"]),
        "config" => Some(&["config"]),
        "options" => Some(&["options"]),
        _ => None,
    }
}

/// Lowercase a token and strip everything outside the Latin alphabet plus
/// accented vowels and ñ.
fn clean_token(word: &str) -> String {
    word.to_lowercase()
        .chars()
        .filter(|c| matches!(c, 'a'..='z' | 'á' | 'é' | 'í' | 'ó' | 'ú' | 'ñ'))
        .collect()
}

struct ActionHit {
    word: String,
    methods: &'static [HttpMethod],
}

struct EntityHit {
    word: String,
    paths: &'static [&'static str],
}

fn extract_actions(description: &str) -> Vec<ActionHit> {
    description
        .split_whitespace()
        .filter_map(|word| {
            let cleaned = clean_token(word);
            action_methods(&cleaned).map(|methods| ActionHit {
                word: cleaned,
                methods,
            })
        })
        .collect()
}

fn extract_entities(description: &str) -> Vec<EntityHit> {
    description
        .split_whitespace()
        .filter_map(|word| {
            let cleaned = clean_token(word);
            entity_paths(&cleaned).map(|paths| EntityHit {
                word: cleaned,
                paths,
            })
        })
        .collect()
}

/// Does the endpoint satisfy one of the candidate methods and contain one of
/// the candidate path fragments (case-insensitively)?
fn endpoint_matches(
    endpoint: &Endpoint,
    methods: &[HttpMethod],
    fragments: &[&str],
) -> bool {
    if !methods.contains(&endpoint.method) {
        return false;
    }
    let path = endpoint.path.to_lowercase();
    fragments.iter().any(|fragment| path.contains(fragment))
}

/// Render the issue draft for a gap.
fn issue_draft(action: &str, entity: &str, method: HttpMethod, suggested_path: &str) -> String {
    format!(
        "## Required Endpoint\n\
         \n\
         **Method:** {method}\n\
         **Suggested path:** {suggested_path}\n\
         \n\
         ## Description\n\
         \n\
         An endpoint is needed to {action} {entity}.\n\
         \n\
         ## Context\n\
         \n\
         The described feature requires an API endpoint that does not\n\
         currently exist. Detected automatically while analyzing a task\n\
         description against the module's available endpoints.\n\
         \n\
         ## Suggested Specification\n\
         \n\
         - Request body: to be defined\n\
         - Response: to be defined\n\
         - Authentication: bearer token (standard)\n\
         \n\
         ---\n\
         *Generated automatically by apimod*"
    )
}

/// Analyze a task description against a module's endpoints.
///
/// If no action or no entity is recognized, the result is vacuously complete:
/// the analyzer only commits to a judgement when it sees at least one of
/// each. Duplicate action/entity pairs are collapsed by their first
/// candidates before matching.
pub fn analyze(description: &str, available_endpoints: &[Endpoint]) -> AnalysisResult {
    let actions = extract_actions(description);
    let entities = extract_entities(description);

    if actions.is_empty() || entities.is_empty() {
        return AnalysisResult::vacuous();
    }

    let mut matched_endpoints: Vec<Endpoint> = Vec::new();
    let mut matched_identities: HashSet<(HttpMethod, String)> = HashSet::new();
    let mut missing_endpoints: Vec<MissingEndpointInfo> = Vec::new();
    let mut checked_pairs: HashSet<(HttpMethod, &str)> = HashSet::new();

    for action in &actions {
        for entity in &entities {
            if !checked_pairs.insert((action.methods[0], entity.paths[0])) {
                continue;
            }

            let found = available_endpoints
                .iter()
                .find(|e| endpoint_matches(e, action.methods, entity.paths));

            match found {
                Some(endpoint) => {
                    if matched_identities.insert((endpoint.method, endpoint.path.clone())) {
                        matched_endpoints.push(endpoint.clone());
                    }
                }
                None => {
                    let suggested_method = action.methods[0];
                    let suggested_path = format!("/{}", entity.paths[0]);
                    missing_endpoints.push(MissingEndpointInfo {
                        description: format!(
                            "Endpoint to {} {}",
                            action.word, entity.word
                        ),
                        suggested_method,
                        suggested_path: suggested_path.clone(),
                        reason: format!(
                            "No {} endpoint found for {}",
                            suggested_method, entity.word
                        ),
                        jira_description: issue_draft(
                            &action.word,
                            &entity.word,
                            suggested_method,
                            &suggested_path,
                        ),
                    });
                }
            }
        }
    }

    AnalysisResult {
        is_complete: missing_endpoints.is_empty(),
        matched_endpoints,
        missing_endpoints,
    }
}

/// Outcome of a debounced analysis request.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Result(AnalysisResult),
    /// A newer description arrived during the delay; this request's result
    /// must not be applied.
    Superseded,
}

/// Debounces analysis of a changing description.
///
/// Each call takes a fresh version; after the delay elapses, the analysis
/// runs only if no newer call has been issued in the meantime. Descriptions
/// below [`MIN_DESCRIPTION_LEN`] short-circuit to the vacuous verdict without
/// consuming the delay, as does a disabled analyzer — but every call, short
/// or not, still supersedes any analysis pending in its delay.
pub struct DebouncedAnalyzer {
    delay: Duration,
    enabled: bool,
    version: AtomicU64,
}

impl DebouncedAnalyzer {
    pub fn new(delay: Duration, enabled: bool) -> Self {
        DebouncedAnalyzer {
            delay,
            enabled,
            version: AtomicU64::new(0),
        }
    }

    /// Build an analyzer from the runtime configuration.
    pub fn from_runtime(runtime: &RuntimeConfig) -> Self {
        DebouncedAnalyzer::new(
            Duration::from_millis(runtime.debounce_ms),
            runtime.analysis_enabled,
        )
    }

    pub async fn analyze_debounced(
        &self,
        description: &str,
        available_endpoints: &[Endpoint],
    ) -> AnalysisOutcome {
        // Every incoming description invalidates a pending delay, even when
        // this request itself short-circuits below.
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;

        if !self.enabled {
            return AnalysisOutcome::Result(AnalysisResult::vacuous());
        }
        if description.trim().chars().count() < MIN_DESCRIPTION_LEN {
            return AnalysisOutcome::Result(AnalysisResult::vacuous());
        }

        tokio::time::sleep(self.delay).await;
        if self.version.load(Ordering::SeqCst) != version {
            return AnalysisOutcome::Superseded;
        }

        AnalysisOutcome::Result(analyze(description, available_endpoints))
    }
}

/// The `apimod analyze` command: fetch the module's document and report
/// matches and gaps for the given description.
///
/// A module fetch failure degrades to the vacuous verdict rather than
/// blocking the workflow; the error is reported on stderr.
pub async fn run_analyze(
    config: &Config,
    module_id: &str,
    description: &str,
    base_url: Option<String>,
) -> Result<()> {
    if module_by_id(module_id).is_none() {
        let known: Vec<&str> = MODULE_DEFINITIONS.iter().map(|m| m.id).collect();
        bail!(
            "Unknown module: {}. Known modules: {}",
            module_id,
            known.join(", ")
        );
    }

    if !config.runtime.analysis_enabled {
        println!("analysis is disabled (runtime.analysis_enabled = false)");
        return Ok(());
    }

    let base_url = base_url.unwrap_or_else(|| config.runtime.base_url.clone());
    let client = ModuleClient::new(
        Arc::new(HttpFetcher::new(&base_url)),
        Duration::from_millis(config.runtime.cache_stale_ms),
    );

    let document = match client.get(module_id, false).await {
        Ok(ModuleFetch::Document(document)) => document,
        Ok(ModuleFetch::Superseded) => return Ok(()),
        Err(err) => {
            eprintln!("{}", err);
            println!("analysis unavailable; treating description as complete");
            return Ok(());
        }
    };

    let analyzer = DebouncedAnalyzer::from_runtime(&config.runtime);
    let result = match analyzer
        .analyze_debounced(description, &document.endpoints)
        .await
    {
        AnalysisOutcome::Result(result) => result,
        AnalysisOutcome::Superseded => return Ok(()),
    };

    println!(
        "module {} ({} endpoints), complete: {}",
        module_id,
        document.endpoints.len(),
        result.is_complete
    );

    for endpoint in &result.matched_endpoints {
        println!(
            "  matched  {} {}  ({})",
            endpoint.method, endpoint.path, endpoint.operation_id
        );
    }

    for missing in &result.missing_endpoints {
        println!(
            "  missing  {} {}  - {}",
            missing.suggested_method, missing.suggested_path, missing.reason
        );
        println!();
        println!("{}", missing.jira_description);
        println!();
    }

    Ok(())
}
