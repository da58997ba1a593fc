//! Nether GLSL - Shader composition from reusable units
//!
//! This crate assembles complete GLSL vertex and fragment shaders from small,
//! independently written units of source text. Units name the units they
//! import and the language versions they support; the registry checks them on
//! admission and the generator resolves imports into a dependency-ordered
//! shader for one requested version.
//!
//! # Architecture
//!
//! - [`VersionNumber`] / [`VersionRange`] - Versions and API-tagged ranges
//! - [`Source`] - Provider of a unit's text (in-memory, file, locator)
//! - [`Unit`] - Named source with imports, ranges and vertex declarations
//! - [`Registry`] - One program's units, with admission rules
//! - [`GeneratedSource`] - Output of [`Registry::generate`]
//! - [`ProgramManifest`] - TOML description of a whole program
//!
//! # Example
//!
//! ```
//! use nether_glsl::{ApiKind, FullRange, Registry, StringSource, Unit, VersionNumber};
//!
//! let range = FullRange::new(VersionNumber::new(3, 30, 0), VersionNumber::new(4, 40, 0))?;
//! let mut registry = Registry::new_for_full("example", range)?;
//!
//! registry.add(Unit::generic("util", StringSource::new("float sq(float x) { return x * x; }"), &[], None, Some(range))?)?;
//! registry.add(Unit::fragment_main("main", StringSource::new("void main() {}"), &["util"], None, Some(range))?)?;
//!
//! let shader = registry.generate_fragment_shader(VersionNumber::new(3, 30, 0), ApiKind::Full)?;
//! assert_eq!(shader.lines()[0], "#version 330");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod generator;
pub mod manifest;
pub mod pragma;
pub mod registry;
pub mod source;
pub mod unit;
pub mod version;

// Re-export core types
pub use generator::GeneratedSource;
pub use registry::Registry;
pub use source::{FileLocator, FileSource, GeneratorContext, Locator, LocatorSource, Source, StringSource};
pub use unit::{Declaration, GlslType, ShaderKind, Unit, UnitKind, VertexInterface, VertexUnit};
pub use version::{ApiKind, ApiKindTag, Es, EsRange, Full, FullRange, VersionNumber, VersionRange};

// Re-export errors
pub use error::{
    GenerateError, ManifestError, ParseVersionError, PragmaError, RangeError, RegistryError, SourceError, UnitError,
};

// Re-export manifest loading
pub use manifest::{ProgramManifest, load_registry};
