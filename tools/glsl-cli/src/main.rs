//! Nether GLSL CLI - Compose and check GLSL programs
//!
//! # Commands
//!
//! - `nether-glsl generate` - Generate one shader from a program manifest
//! - `nether-glsl check` - Generate every shader for every supported version
//!
//! # Usage
//!
//! ```bash
//! # Print the fragment shader for desktop GLSL 3.30
//! nether-glsl generate program.toml --kind fragment --api full --version 3.30
//!
//! # Write the vertex shader for GLSL ES 1.0 with unit markers
//! nether-glsl generate program.toml --kind vertex --api es --version 1.0 --debug -o lit.vert
//!
//! # Verify the program across its whole declared range
//! nether-glsl check program.toml
//! ```
//!
//! Logging is controlled through `RUST_LOG` (default `info`).

mod check;
mod generate;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use nether_glsl::{ApiKind, ShaderKind};

/// Nether GLSL CLI - Compose and check GLSL programs
#[derive(Parser)]
#[command(name = "nether-glsl")]
#[command(about = "Compose GLSL shaders from program manifests")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one shader and print or write it
    Generate(generate::GenerateArgs),

    /// Generate every shader across the program's version ranges
    Check(check::CheckArgs),
}

/// Shader kind argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Vertex,
    Fragment,
}

impl From<KindArg> for ShaderKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Vertex => ShaderKind::Vertex,
            KindArg::Fragment => ShaderKind::Fragment,
        }
    }
}

/// API argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ApiArg {
    Es,
    Full,
}

impl From<ApiArg> for ApiKind {
    fn from(api: ApiArg) -> Self {
        match api {
            ApiArg::Es => ApiKind::Es,
            ApiArg::Full => ApiKind::Full,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => generate::execute(args),
        Commands::Check(args) => check::execute(args),
    }
}
