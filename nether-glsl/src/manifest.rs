//! Program manifest parsing
//!
//! A manifest is a TOML file describing one program: its name, the version
//! ranges it targets and every unit it is built from. Loading a manifest
//! yields a populated [`Registry`].
//!
//! ```toml
//! [program]
//! name = "lit"
//! full = ["1.10", "4.40"]
//!
//! [[units]]
//! name = "main"
//! kind = "fragment"
//! path = "main.frag"
//! imports = ["lighting"]
//! full = ["1.10", "4.40"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ManifestError;
use crate::registry::Registry;
use crate::source::{FileLocator, FileSource, LocatorSource, Source, StringSource};
use crate::unit::{GlslType, Unit};
use crate::version::{ApiKindTag, EsRange, FullRange, VersionNumber, VersionRange};

/// Program manifest structure
#[derive(Debug, Deserialize)]
pub struct ProgramManifest {
    pub program: ProgramSection,
    #[serde(default)]
    pub units: Vec<UnitEntry>,
}

/// Program metadata section
#[derive(Debug, Deserialize)]
pub struct ProgramSection {
    pub name: String,

    /// Emit begin/end markers around each unit.
    /// Default: false
    #[serde(default)]
    pub debugging: bool,

    /// GLSL ES range as `[lower, upper]`
    #[serde(default)]
    pub es: Option<[String; 2]>,

    /// Desktop GLSL range as `[lower, upper]`
    #[serde(default)]
    pub full: Option<[String; 2]>,
}

/// Role of a unit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Generic,
    Vertex,
    Fragment,
}

/// Single unit entry
#[derive(Debug, Deserialize)]
pub struct UnitEntry {
    pub name: String,
    pub kind: EntryKind,

    /// File path, relative to the manifest directory
    #[serde(default)]
    pub path: Option<String>,

    /// Locator resolved through [`FileLocator`]
    #[serde(default)]
    pub uri: Option<String>,

    /// Inline source text
    #[serde(default)]
    pub text: Option<String>,

    /// For `uri` entries: always report the source as changed
    #[serde(default)]
    pub always_changed: bool,

    #[serde(default)]
    pub imports: Vec<String>,

    #[serde(default)]
    pub es: Option<[String; 2]>,

    #[serde(default)]
    pub full: Option<[String; 2]>,

    // Vertex units only
    #[serde(default)]
    pub inputs: Vec<DeclarationEntry>,
    #[serde(default)]
    pub outputs: Vec<DeclarationEntry>,
    #[serde(default)]
    pub uniforms: Vec<DeclarationEntry>,
}

/// Typed vertex interface variable
#[derive(Debug, Deserialize)]
pub struct DeclarationEntry {
    #[serde(rename = "type")]
    pub ty: String,
    pub name: String,
}

fn parse_range<K: ApiKindTag>(bounds: &Option<[String; 2]>) -> Result<Option<VersionRange<K>>, ManifestError> {
    let Some([lower, upper]) = bounds else {
        return Ok(None);
    };
    let lower: VersionNumber = lower.parse()?;
    let upper: VersionNumber = upper.parse()?;
    Ok(Some(VersionRange::new(lower, upper)?))
}

impl UnitEntry {
    fn source(&self, base_dir: &Path) -> Result<Box<dyn Source>, ManifestError> {
        match (&self.path, &self.uri, &self.text) {
            (Some(path), None, None) => Ok(Box::new(FileSource::new(base_dir.join(path)))),
            (None, Some(uri), None) => Ok(Box::new(
                LocatorSource::new(uri.as_str(), FileLocator::with_base(base_dir))
                    .with_always_changed(self.always_changed),
            )),
            (None, None, Some(text)) => Ok(Box::new(StringSource::new(text.as_str()))),
            _ => Err(ManifestError::AmbiguousSource(self.name.clone())),
        }
    }

    fn has_declarations(&self) -> bool {
        !(self.inputs.is_empty() && self.outputs.is_empty() && self.uniforms.is_empty())
    }

    /// Build the unit this entry describes
    pub fn to_unit(&self, base_dir: &Path) -> Result<Unit, ManifestError> {
        let source = self.source(base_dir)?;
        let imports: Vec<&str> = self.imports.iter().map(String::as_str).collect();
        let es: Option<EsRange> = parse_range(&self.es)?;
        let full: Option<FullRange> = parse_range(&self.full)?;

        if self.kind != EntryKind::Vertex && self.has_declarations() {
            return Err(ManifestError::DeclarationsOnNonVertex(self.name.clone()));
        }

        let unit = match self.kind {
            EntryKind::Generic => Unit::generic(&self.name, source, &imports, es, full)?,
            EntryKind::Fragment => Unit::fragment_main(&self.name, source, &imports, es, full)?,
            EntryKind::Vertex => {
                let mut unit = Unit::vertex_main(&self.name, source, &imports, es, full)?;
                for d in &self.inputs {
                    unit.declare_input(d.ty.parse::<GlslType>()?, &d.name)?;
                }
                for d in &self.outputs {
                    unit.declare_output(d.ty.parse::<GlslType>()?, &d.name)?;
                }
                for d in &self.uniforms {
                    unit.declare_uniform(d.ty.parse::<GlslType>()?, &d.name)?;
                }
                unit.into_unit()
            }
        };
        Ok(unit)
    }
}

impl ProgramManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(content)?)
    }

    /// Build a registry holding every unit, resolving relative paths against `base_dir`
    pub fn into_registry(self, base_dir: &Path) -> Result<Registry, ManifestError> {
        let es: Option<EsRange> = parse_range(&self.program.es)?;
        let full: Option<FullRange> = parse_range(&self.program.full)?;

        let mut registry = match (full, es) {
            (Some(full), Some(es)) => Registry::new_for_full_and_es(&self.program.name, full, es)?,
            (Some(full), None) => Registry::new_for_full(&self.program.name, full)?,
            (None, Some(es)) => Registry::new_for_es(&self.program.name, es)?,
            (None, None) => return Err(ManifestError::NoProgramRange(self.program.name)),
        };
        registry.set_debugging(self.program.debugging);

        for entry in &self.units {
            registry.add(entry.to_unit(base_dir)?)?;
        }

        tracing::debug!(
            program = %registry.name(),
            units = registry.len(),
            base = %base_dir.display(),
            "manifest loaded"
        );
        Ok(registry)
    }
}

/// Load a manifest file and build its registry
///
/// Relative unit paths resolve against the manifest's directory.
pub fn load_registry(path: &Path) -> Result<Registry, ManifestError> {
    let base_dir: PathBuf = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    ProgramManifest::load(path)?.into_registry(&base_dir)
}
