//! Prompt assembly.
//!
//! Renders the project boilerplate, a module's endpoint summaries, and the
//! task description into one text block ready to hand to a coding assistant.
//! When no module context is available (none selected, fetch failed, zero
//! endpoints), a simple template without the endpoint section is used
//! instead. Rendering is pure and deterministic: no timestamps.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::client::{HttpFetcher, ModuleClient, ModuleFetch};
use crate::config::{Config, PromptConfig};
use crate::models::Endpoint;
use crate::modules::module_by_id;
use crate::tokens::estimate_text_tokens;

/// One endpoint's summary block: method, path, operationId, summary,
/// parameter descriptors, and a presence-only request body indicator.
fn format_endpoint(endpoint: &Endpoint) -> String {
    let mut lines = vec![format!("**{} {}**", endpoint.method, endpoint.path)];

    lines.push(format!("- operationId: `{}`", endpoint.operation_id));

    if let Some(summary) = &endpoint.summary {
        lines.push(format!("- {}", summary));
    }

    if let Some(parameters) = &endpoint.parameters {
        if !parameters.is_empty() {
            let descriptors: Vec<String> = parameters
                .iter()
                .map(|p| {
                    let required = if p.required == Some(true) {
                        " (required)"
                    } else {
                        ""
                    };
                    format!("`{}` ({}){}", p.name, p.location.as_str(), required)
                })
                .collect();
            lines.push(format!("- Params: {}", descriptors.join(", ")));
        }
    }

    if endpoint.request_body.is_some() {
        lines.push("- Has request body: yes".to_string());
    }

    lines.join("\n")
}

fn project_context(prompt: &PromptConfig) -> String {
    format!(
        "## Project Context\n\
         \n\
         This project is **{}**, a {} application.\n\
         \n\
         For detailed development instructions, see `{}` at the project root.",
        prompt.project_name, prompt.framework, prompt.docs_reference
    )
}

fn notes_section(prompt: &PromptConfig) -> String {
    let mut section = String::from("## Notes\n");
    for note in &prompt.notes {
        section.push_str(&format!("\n- {}", note));
    }
    section
}

/// Render the enriched template: boilerplate, endpoint summaries, the
/// verbatim description, and the fixed operational notes.
pub fn build_prompt(
    module_label: &str,
    endpoints: &[Endpoint],
    description: &str,
    prompt: &PromptConfig,
) -> String {
    let endpoint_blocks: Vec<String> = endpoints.iter().map(format_endpoint).collect();

    format!(
        "{}\n\
         \n\
         ## Available API - Module: {}\n\
         \n\
         The following endpoints are available to implement this feature:\n\
         \n\
         ### Endpoints\n\
         \n\
         {}\n\
         \n\
         ---\n\
         \n\
         ## Requested Task\n\
         \n\
         {}\n\
         \n\
         ---\n\
         \n\
         {}",
        project_context(prompt),
        module_label,
        endpoint_blocks.join("\n\n"),
        description,
        notes_section(prompt)
    )
    .trim()
    .to_string()
}

/// Render the simple fallback template: boilerplate and description only.
pub fn build_simple_prompt(description: &str, prompt: &PromptConfig) -> String {
    format!(
        "{}\n\
         \n\
         ---\n\
         \n\
         ## Requested Task\n\
         \n\
         {}\n\
         \n\
         ---\n\
         \n\
         {}",
        project_context(prompt),
        description,
        notes_section(prompt)
    )
    .trim()
    .to_string()
}

/// The `apimod prompt` command: assemble a prompt for the description, with
/// the selected module's endpoints when they can be fetched.
///
/// The prompt goes to stdout; the token estimate goes to stderr so stdout
/// stays pipeable.
pub async fn run_prompt(
    config: &Config,
    module_id: Option<&str>,
    description: &str,
    base_url: Option<String>,
) -> Result<()> {
    let rendered = match module_id {
        None => build_simple_prompt(description, &config.prompt),
        Some(module_id) => {
            let Some(def) = module_by_id(module_id) else {
                anyhow::bail!("Unknown module: {}", module_id);
            };

            let base_url = base_url.unwrap_or_else(|| config.runtime.base_url.clone());
            let client = ModuleClient::new(
                Arc::new(HttpFetcher::new(&base_url)),
                Duration::from_millis(config.runtime.cache_stale_ms),
            );

            match client.get(module_id, false).await {
                Ok(ModuleFetch::Document(document)) if !document.endpoints.is_empty() => {
                    build_prompt(def.label, &document.endpoints, description, &config.prompt)
                }
                Ok(_) => build_simple_prompt(description, &config.prompt),
                Err(err) => {
                    eprintln!("{}; falling back to the simple template", err);
                    build_simple_prompt(description, &config.prompt)
                }
            }
        }
    };

    println!("{}", rendered);
    eprintln!("~{} tokens", estimate_text_tokens(&rendered));

    Ok(())
}
