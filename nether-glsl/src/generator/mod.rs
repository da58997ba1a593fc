//! Shader generation
//!
//! Generating a shader runs in two phases. Resolution walks the import graph
//! from the requested main unit and checks every reachable unit against the
//! requested version. Emission writes the version line, the vertex
//! declarations, then each unit's text in dependency order.
//!
//! Nothing is emitted unless every check passes.

mod resolve;

use core::fmt;

use crate::error::GenerateError;
use crate::pragma;
use crate::registry::Registry;
use crate::source::GeneratorContext;
use crate::unit::{Declaration, ShaderKind, Unit};
use crate::version::{ApiKind, VersionNumber};

/// A complete, generated shader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    version: VersionNumber,
    api: ApiKind,
    shader_kind: ShaderKind,
    lines: Vec<String>,
}

impl GeneratedSource {
    pub fn version(&self) -> VersionNumber {
        self.version
    }

    pub fn api(&self) -> ApiKind {
        self.api
    }

    pub fn shader_kind(&self) -> ShaderKind {
        self.shader_kind
    }

    /// Source lines, version line first
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Lines joined with `\n`
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for GeneratedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Whether `version` predates `in`/`out` storage qualifiers on vertex interfaces
fn uses_legacy_qualifiers(version: VersionNumber, api: ApiKind) -> bool {
    match api {
        ApiKind::Es => version < VersionNumber::new(3, 0, 0),
        ApiKind::Full => version < VersionNumber::new(1, 30, 0),
    }
}

fn declare(out: &mut Vec<String>, qualifier: &str, declarations: &[Declaration]) {
    out.extend(
        declarations
            .iter()
            .map(|d| format!("{qualifier} {} {};", d.ty(), d.name())),
    );
}

fn check_version(unit: &Unit, version: VersionNumber, api: ApiKind) -> Result<(), GenerateError> {
    let (supported, provided) = match api {
        ApiKind::Es => (
            unit.es_range().is_some_and(|r| r.includes(version)),
            unit.es_range().map(ToString::to_string),
        ),
        ApiKind::Full => (
            unit.full_range().is_some_and(|r| r.includes(version)),
            unit.full_range().map(ToString::to_string),
        ),
    };

    if supported {
        return Ok(());
    }
    Err(GenerateError::UnsupportedVersion {
        unit: unit.name().to_string(),
        version,
        api,
        provided,
    })
}

impl Registry {
    /// Generate a shader of the given kind for one version of one API
    ///
    /// # Errors
    ///
    /// - `EmptyProgram` if no main unit of `kind` is registered
    /// - `MissingDependency`, `CyclicDependency` or `NonGenericImport` if
    ///   the import graph reachable from the main unit is malformed
    /// - `UnsupportedVersion` if a reachable unit has no `api` range
    ///   including `version`
    /// - `Pragma` if `version` has no version line on `api`
    /// - `Source` if fetching a unit's text fails
    pub fn generate(
        &mut self,
        version: VersionNumber,
        api: ApiKind,
        kind: ShaderKind,
    ) -> Result<GeneratedSource, GenerateError> {
        let main = self.main_unit(kind).ok_or(GenerateError::EmptyProgram(kind))?;

        let order: Vec<String> = {
            let order = resolve::resolve(self.units(), main)?;
            // Only the requested version is checked here; the program's own
            // range was enforced against every unit on admission
            for unit in &order {
                check_version(unit, version, api)?;
            }
            order.iter().map(|unit| unit.name().to_string()).collect()
        };

        tracing::debug!(
            program = %self.name(),
            shader = %kind,
            %api,
            %version,
            order = ?order,
            "resolved units"
        );

        let mut lines = vec![pragma::to_pragma(version, api)?.to_string()];

        if let Some(interface) = main.vertex_interface().filter(|_| kind == ShaderKind::Vertex) {
            let (input, output) = if uses_legacy_qualifiers(version, api) {
                ("attribute", "varying")
            } else {
                ("in", "out")
            };
            declare(&mut lines, input, interface.inputs());
            declare(&mut lines, output, interface.outputs());
            declare(&mut lines, "uniform", interface.uniforms());
        }

        let ctx = GeneratorContext {
            version,
            api,
            debugging: self.debugging(),
        };

        let units = self.units_mut();
        for name in &order {
            // Nothing is added or removed between resolution and emission
            let unit = units
                .get_mut(name.as_str())
                .expect("resolved unit missing from registry - this indicates a bug in resolve");

            if ctx.debugging {
                lines.push(format!("// begin unit {name}"));
            }
            unit.source_mut()
                .fetch(&ctx, &mut lines)
                .map_err(|source| GenerateError::Source {
                    unit: name.clone(),
                    source,
                })?;
            if ctx.debugging {
                lines.push(format!("// end unit {name}"));
            }
        }

        self.mark_generated();
        tracing::debug!(
            program = %self.name(),
            shader = %kind,
            units = order.len(),
            lines = lines.len(),
            "shader generated"
        );

        Ok(GeneratedSource {
            version,
            api,
            shader_kind: kind,
            lines,
        })
    }

    /// Generate the vertex shader
    pub fn generate_vertex_shader(
        &mut self,
        version: VersionNumber,
        api: ApiKind,
    ) -> Result<GeneratedSource, GenerateError> {
        self.generate(version, api, ShaderKind::Vertex)
    }

    /// Generate the fragment shader
    pub fn generate_fragment_shader(
        &mut self,
        version: VersionNumber,
        api: ApiKind,
    ) -> Result<GeneratedSource, GenerateError> {
        self.generate(version, api, ShaderKind::Fragment)
    }
}
