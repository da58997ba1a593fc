//! Generate command - compose one shader from a manifest
//!
//! Loads the program manifest, generates the requested shader and prints it
//! to stdout or writes it to `--output`.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use nether_glsl::VersionNumber;

use crate::{ApiArg, KindArg};

/// Arguments for the generate command
#[derive(Args)]
pub struct GenerateArgs {
    /// Path to the program manifest
    pub manifest: PathBuf,

    /// Shader to generate
    #[arg(short, long, value_enum)]
    pub kind: KindArg,

    /// Shading language profile
    #[arg(short, long, value_enum)]
    pub api: ApiArg,

    /// Shading language version (e.g. 3.30 or 1.0.0)
    #[arg(long = "version")]
    pub glsl_version: VersionNumber,

    /// Wrap each unit in begin/end markers (overrides the manifest)
    #[arg(long)]
    pub debug: bool,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the generate command
pub fn execute(args: GenerateArgs) -> Result<()> {
    let mut registry = nether_glsl::load_registry(&args.manifest)
        .with_context(|| format!("Failed to load program: {}", args.manifest.display()))?;

    if args.debug {
        registry.set_debugging(true);
    }

    let shader = registry
        .generate(args.glsl_version, args.api.into(), args.kind.into())
        .with_context(|| {
            format!(
                "Failed to generate {} shader of '{}' for {} {}",
                nether_glsl::ShaderKind::from(args.kind),
                registry.name(),
                nether_glsl::ApiKind::from(args.api),
                args.glsl_version
            )
        })?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, shader.to_string())
                .with_context(|| format!("Failed to write shader: {}", path.display()))?;
            tracing::info!(
                path = %path.display(),
                lines = shader.lines().len(),
                "shader written"
            );
        }
        None => print!("{shader}"),
    }

    Ok(())
}
