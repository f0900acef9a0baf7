//! The `apimod generate` pipeline.
//!
//! One sequential pass: resolve the specification (remote with local
//! fallback), extract endpoints, partition them, and write the artifacts —
//! `api-index.json`, `metadata.json`, `API-INDEX.md`, and one JSON document
//! per module under `modules/`. Any fatal failure aborts before partial
//! output is written; the process exits non-zero with the cause.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::extract::{extract_endpoints, spec_info};
use crate::models::{Metadata, MetadataModule};
use crate::modules::MODULE_DEFINITIONS;
use crate::partition::{build_index, build_module_document, render_markdown_index};
use crate::source::fetch_spec;
use crate::tokens::estimate_json_tokens;

/// CLI overrides for the generate command. `None` falls back to config.
#[derive(Debug, Default)]
pub struct GenerateOptions {
    pub remote_url: Option<String>,
    pub local_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub force_local: bool,
    pub force_remote: bool,
}

pub async fn run_generate(config: &Config, opts: GenerateOptions) -> Result<()> {
    let remote_url = opts
        .remote_url
        .unwrap_or_else(|| config.source.remote_url.clone());
    let local_path = opts
        .local_path
        .unwrap_or_else(|| config.source.local_path.clone());
    let output_dir = opts.output_dir.unwrap_or_else(|| config.output.dir.clone());

    let (spec, source) = fetch_spec(
        &remote_url,
        &local_path,
        opts.force_local,
        opts.force_remote,
    )
    .await?;

    let info = spec_info(&spec);
    println!(
        "OpenAPI {} - {} v{}",
        info.openapi, info.title, info.version
    );

    let endpoints = extract_endpoints(&spec)?;
    println!("endpoints found: {}", endpoints.len());

    let modules_dir = output_dir.join("modules");
    std::fs::create_dir_all(&modules_dir)
        .with_context(|| format!("Failed to create output directory: {}", modules_dir.display()))?;

    // One timestamp for the whole run, so artifacts agree with each other.
    let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    let index = build_index(&endpoints, &info.version, source, &generated_at);
    let index_tokens = estimate_json_tokens(&index);
    write_json(&output_dir.join("api-index.json"), &index)?;
    println!("index written: api-index.json (~{} tokens)", index_tokens);

    let mut metadata_modules = Vec::new();
    let mut total_module_tokens: u64 = 0;
    for def in MODULE_DEFINITIONS {
        let document = build_module_document(def, &endpoints, &info.version, &generated_at);
        write_json(&modules_dir.join(format!("{}.json", def.id)), &document)?;
        println!(
            "  {}: {} endpoints (~{} tokens)",
            def.label,
            document.endpoints.len(),
            document.token_count
        );
        total_module_tokens += document.token_count;
        metadata_modules.push(MetadataModule {
            id: def.id.to_string(),
            file: format!("modules/{}.json", def.id),
            endpoint_count: document.endpoints.len(),
            token_count: document.token_count,
        });
    }

    let metadata = Metadata {
        version: info.version.clone(),
        source: source.as_str().to_string(),
        generated_at: generated_at.clone(),
        modules: metadata_modules,
    };
    write_json(&output_dir.join("metadata.json"), &metadata)?;

    let markdown = render_markdown_index(&endpoints, &info.version, source, &generated_at);
    std::fs::write(output_dir.join("API-INDEX.md"), markdown)
        .context("Failed to write API-INDEX.md")?;

    let spec_tokens = estimate_json_tokens(&spec);
    println!("summary:");
    println!("  source: {}", source);
    println!("  index: ~{} tokens", index_tokens);
    println!("  modules (total): ~{} tokens", total_module_tokens);
    println!("  full spec: ~{} tokens", spec_tokens);
    if spec_tokens > 0 {
        let savings = (1.0 - index_tokens as f64 / spec_tokens as f64) * 100.0;
        println!("  savings with index: {}%", savings.round());
    }
    println!("artifacts written to {}", output_dir.display());

    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to encode {}", path.display()))?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
