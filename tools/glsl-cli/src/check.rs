//! Check command - generate every shader the program can produce
//!
//! For each main unit in the manifest, generates its shader at every version
//! with a version line that lies inside the program's declared ranges, and
//! reports each failure.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use nether_glsl::{ApiKind, GenerateError, Registry, ShaderKind, VersionNumber, pragma};

/// Arguments for the check command
#[derive(Args)]
pub struct CheckArgs {
    /// Path to the program manifest
    pub manifest: PathBuf,
}

/// One failed generation
#[derive(Debug)]
pub struct Failure {
    pub kind: ShaderKind,
    pub api: ApiKind,
    pub version: VersionNumber,
    pub error: GenerateError,
}

/// Versions inside the program's range for `api` that have a version line
fn target_versions(registry: &Registry, api: ApiKind) -> Vec<VersionNumber> {
    pragma::supported_versions(api)
        .filter(|v| match api {
            ApiKind::Es => registry.es_range().is_some_and(|r| r.includes(*v)),
            ApiKind::Full => registry.full_range().is_some_and(|r| r.includes(*v)),
        })
        .collect()
}

/// Generate every (kind, api, version) combination, returning the number of
/// successful generations and the failures
pub fn check_registry(registry: &mut Registry) -> (usize, Vec<Failure>) {
    let mut passed = 0;
    let mut failures = Vec::new();

    for kind in [ShaderKind::Vertex, ShaderKind::Fragment] {
        if registry.main_unit(kind).is_none() {
            continue;
        }
        for api in [ApiKind::Es, ApiKind::Full] {
            for version in target_versions(registry, api) {
                match registry.generate(version, api, kind) {
                    Ok(shader) => {
                        tracing::debug!(%kind, %api, %version, lines = shader.lines().len(), "ok");
                        passed += 1;
                    }
                    Err(error) => failures.push(Failure {
                        kind,
                        api,
                        version,
                        error,
                    }),
                }
            }
        }
    }

    (passed, failures)
}

/// Execute the check command
pub fn execute(args: CheckArgs) -> Result<()> {
    let mut registry = nether_glsl::load_registry(&args.manifest)
        .with_context(|| format!("Failed to load program: {}", args.manifest.display()))?;

    println!("Checking {} ({} units)...", registry.name(), registry.len());

    let (passed, failures) = check_registry(&mut registry);

    for failure in &failures {
        println!(
            "  FAIL {} {} {}: {}",
            failure.kind, failure.api, failure.version, failure.error
        );
    }

    if passed == 0 && failures.is_empty() {
        anyhow::bail!("Program '{}' has no main units to check", registry.name());
    }
    if !failures.is_empty() {
        anyhow::bail!("{} of {} shaders failed", failures.len(), passed + failures.len());
    }

    println!("  {} shaders generated", passed);
    Ok(())
}
