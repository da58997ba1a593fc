//! Error types for unit composition
//!
//! Each stage has its own error type so callers can tell admission failures
//! (raised by [`Registry::add`](crate::Registry::add)) apart from composition
//! failures (raised by [`Registry::generate`](crate::Registry::generate)).

use std::io;
use std::path::PathBuf;

use crate::unit::UnitKind;
use crate::version::{ApiKind, VersionNumber};

/// Version range construction failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// Lower bound is greater than the upper bound
    #[error("invalid version range: lower bound {lower} exceeds upper bound {upper}")]
    Inverted {
        lower: VersionNumber,
        upper: VersionNumber,
    },
}

/// Version string parsing failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version number '{0}' (expected major.minor[.micro])")]
pub struct ParseVersionError(pub String);

/// Version line lookup failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PragmaError {
    /// No version line exists for this version and API
    #[error("{api} {version} has no version declaration")]
    UnsupportedVersion { version: VersionNumber, api: ApiKind },
}

/// Failure fetching or inspecting unit source text
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Source file does not exist
    #[error("source file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// Any other IO failure while reading source text
    #[error("failed to read source '{locator}'")]
    Io {
        locator: String,
        #[source]
        source: io::Error,
    },

    /// Locator could not be interpreted by its resolver
    #[error("cannot resolve locator '{locator}': {reason}")]
    Locator { locator: String, reason: String },
}

/// Invalid unit construction or declaration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    /// Unit names must be non-empty
    #[error("unit name must not be empty")]
    EmptyName,

    /// A unit must support at least one API
    #[error("unit '{unit}' declares neither an ES nor a full version range")]
    NoVersionRange { unit: String },

    /// Import names must be non-empty
    #[error("unit '{unit}' has an empty import name")]
    EmptyImport { unit: String },

    /// Declaration names must be non-empty
    #[error("unit '{unit}' has a declaration with an empty name")]
    EmptyDeclarationName { unit: String },

    /// A declaration of the same name already exists on the unit
    #[error("unit '{unit}' already declares '{name}'")]
    DuplicateDeclaration { unit: String, name: String },

    /// Type tag is not a recognized shading language type
    #[error("unrecognized type tag '{0}'")]
    UnknownType(String),
}

/// Registry construction or admission failure
///
/// A failed [`Registry::add`](crate::Registry::add) leaves the registry unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A required argument was empty
    #[error("precondition violated: {0}")]
    Precondition(&'static str),

    /// A unit with this name is already registered
    #[error("unit '{0}' is already registered")]
    DuplicateUnit(String),

    /// A main unit of this kind is already registered
    #[error("cannot add '{unit}': {kind} main unit '{existing}' is already registered")]
    DuplicateMain {
        unit: String,
        kind: UnitKind,
        existing: String,
    },

    /// Unit's range does not cover the program's declared range
    #[error(
        "unit '{unit}' lacks the required version support: program '{program}' requires {api} {required}, unit provides {}",
        .provided.as_deref().unwrap_or("nothing")
    )]
    Admission {
        program: String,
        unit: String,
        api: ApiKind,
        required: String,
        provided: Option<String>,
    },
}

impl RegistryError {
    /// True for duplicate-name and duplicate-main failures
    pub fn is_uniqueness(&self) -> bool {
        matches!(
            self,
            RegistryError::DuplicateUnit(_) | RegistryError::DuplicateMain { .. }
        )
    }
}

/// Composition failure raised while generating a shader
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// No main unit exists for the requested shader kind
    #[error("no unit provides a main function for the {0} shader")]
    EmptyProgram(crate::unit::ShaderKind),

    /// An import names a unit that is not registered
    #[error("unit '{unit}' imports nonexistent unit '{import}'")]
    MissingDependency { unit: String, import: String },

    /// An import refers back to a unit that is still being resolved
    #[error("cyclic import of '{import}' detected for unit '{unit}'")]
    CyclicDependency { unit: String, import: String },

    /// An import resolves to a main unit
    #[error("unit '{unit}' imports non-generic unit '{import}' ({kind})")]
    NonGenericImport {
        unit: String,
        import: String,
        kind: UnitKind,
    },

    /// A participating unit does not support the requested version
    #[error("unit '{unit}' does not support {api} {version} (provides {})", .provided.as_deref().unwrap_or("nothing"))]
    UnsupportedVersion {
        unit: String,
        version: VersionNumber,
        api: ApiKind,
        provided: Option<String>,
    },

    /// The requested version has no version declaration
    #[error(transparent)]
    Pragma(#[from] PragmaError),

    /// Fetching a unit's source text failed
    #[error("failed to fetch source of unit '{unit}'")]
    Source {
        unit: String,
        #[source]
        source: SourceError,
    },
}

impl GenerateError {
    /// True for both unit-level and version-line version failures
    pub fn is_unsupported_version(&self) -> bool {
        matches!(
            self,
            GenerateError::UnsupportedVersion { .. } | GenerateError::Pragma(_)
        )
    }

    /// True for graph-structure failures (empty program, missing, cyclic or non-generic imports)
    pub fn is_composition(&self) -> bool {
        matches!(
            self,
            GenerateError::EmptyProgram(_)
                | GenerateError::MissingDependency { .. }
                | GenerateError::CyclicDependency { .. }
                | GenerateError::NonGenericImport { .. }
        )
    }
}

/// Program manifest loading failure
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Manifest file could not be read
    #[error("failed to read manifest: {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Manifest is not valid TOML or has the wrong shape
    #[error("failed to parse program manifest: {0}")]
    Parse(#[from] toml::de::Error),

    /// Program declares neither an ES nor a full range
    #[error("program '{0}' must declare at least one of `es` or `full`")]
    NoProgramRange(String),

    /// Unit entry must name exactly one of `path`, `uri` or `text`
    #[error("unit '{0}' must specify exactly one of `path`, `uri` or `text`")]
    AmbiguousSource(String),

    /// Declarations are only allowed on vertex units
    #[error("unit '{0}' declares inputs/outputs/uniforms but is not a vertex unit")]
    DeclarationsOnNonVertex(String),

    #[error(transparent)]
    Version(#[from] ParseVersionError),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
