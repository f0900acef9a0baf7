//! Two-tier specification source resolution.
//!
//! The raw OpenAPI document is fetched from a primary remote location, falling
//! back to a secondary local file when the remote is unavailable. Two policy
//! flags pin the lookup to one tier: `--force-local` skips the remote entirely
//! and `--force-remote` turns a remote failure into a fatal error. This is a
//! best-effort two-tier lookup, not a retry loop: a single fetch attempt
//! (following redirects, with a fixed timeout) per tier.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// Which tier satisfied the request. Recorded in the index and metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecSource {
    Remote,
    Local,
}

impl SpecSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecSource::Remote => "remote",
            SpecSource::Local => "local",
        }
    }
}

impl std::fmt::Display for SpecSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECTS: usize = 5;

/// Fetch the specification JSON from the remote location. Non-2xx status and
/// timeout are failures; redirects are followed up to [`MAX_REDIRECTS`].
async fn fetch_remote(url: &str) -> Result<Value> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Request to {} failed", url))?;

    let status = response.status();
    if !status.is_success() {
        bail!("HTTP {} from {}", status.as_u16(), url);
    }

    response
        .json::<Value>()
        .await
        .context("Remote specification is not valid JSON")
}

/// Read the specification JSON from the local fallback file.
fn read_local(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Spec file not found: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Local specification is not valid JSON: {}", path.display()))
}

/// Obtain the raw specification, trying remote first unless pinned.
///
/// Progress is reported on stderr so stdout stays parseable.
pub async fn fetch_spec(
    remote_url: &str,
    local_path: &Path,
    force_local: bool,
    force_remote: bool,
) -> Result<(Value, SpecSource)> {
    if force_local {
        eprintln!("using local spec: {} (--force-local)", local_path.display());
        let spec = read_local(local_path)?;
        return Ok((spec, SpecSource::Local));
    }

    eprintln!("fetching spec from {}", remote_url);
    let remote_err = match fetch_remote(remote_url).await {
        Ok(spec) => {
            eprintln!("spec fetched from remote");
            return Ok((spec, SpecSource::Remote));
        }
        Err(err) => {
            eprintln!("remote unavailable: {:#}", err);
            err
        }
    };

    if force_remote {
        bail!(
            "Remote source unavailable and --force-remote is set: {:#}",
            remote_err
        );
    }

    eprintln!("falling back to local spec: {}", local_path.display());
    match read_local(local_path) {
        Ok(spec) => Ok((spec, SpecSource::Local)),
        Err(local_err) => bail!(
            "Could not obtain the specification from remote ({:#}) or local ({:#})",
            remote_err,
            local_err
        ),
    }
}
