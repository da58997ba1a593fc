//! Units: named fragments of shader source
//!
//! A unit owns its [`Source`], the ordered names of the units it imports and
//! the version ranges it supports. Vertex main units additionally carry the
//! inputs, outputs and uniforms for which the generator emits declarations.
//!
//! Units do not check that their imports exist; that happens when a shader
//! is generated.

use core::fmt;
use core::str::FromStr;

use crate::error::UnitError;
use crate::source::Source;
use crate::version::{EsRange, FullRange};

/// Role of a unit within a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// Importable library unit
    Generic,
    /// Entry point of the vertex shader
    VertexMain,
    /// Entry point of the fragment shader
    FragmentMain,
}

impl UnitKind {
    pub fn name(self) -> &'static str {
        match self {
            UnitKind::Generic => "generic",
            UnitKind::VertexMain => "vertex-shader",
            UnitKind::FragmentMain => "fragment-shader",
        }
    }

    /// Shader kind this unit anchors, if it is a main unit
    pub fn shader_kind(self) -> Option<ShaderKind> {
        match self {
            UnitKind::Generic => None,
            UnitKind::VertexMain => Some(ShaderKind::Vertex),
            UnitKind::FragmentMain => Some(ShaderKind::Fragment),
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of shader being generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    /// Kind of unit that anchors this shader
    pub fn main_unit_kind(self) -> UnitKind {
        match self {
            ShaderKind::Vertex => UnitKind::VertexMain,
            ShaderKind::Fragment => UnitKind::FragmentMain,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShaderKind::Vertex => "vertex",
            ShaderKind::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shading language types usable in declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlslType {
    Bool,
    BVec2,
    BVec3,
    BVec4,
    Int,
    IVec2,
    IVec3,
    IVec4,
    UInt,
    UVec2,
    UVec3,
    UVec4,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
    Mat2x3,
    Mat2x4,
    Mat3x2,
    Mat3x4,
    Mat4x2,
    Mat4x3,
    Sampler2D,
    Sampler3D,
    SamplerCube,
}

impl GlslType {
    pub const ALL: [GlslType; 28] = [
        GlslType::Bool,
        GlslType::BVec2,
        GlslType::BVec3,
        GlslType::BVec4,
        GlslType::Int,
        GlslType::IVec2,
        GlslType::IVec3,
        GlslType::IVec4,
        GlslType::UInt,
        GlslType::UVec2,
        GlslType::UVec3,
        GlslType::UVec4,
        GlslType::Float,
        GlslType::Vec2,
        GlslType::Vec3,
        GlslType::Vec4,
        GlslType::Mat2,
        GlslType::Mat3,
        GlslType::Mat4,
        GlslType::Mat2x3,
        GlslType::Mat2x4,
        GlslType::Mat3x2,
        GlslType::Mat3x4,
        GlslType::Mat4x2,
        GlslType::Mat4x3,
        GlslType::Sampler2D,
        GlslType::Sampler3D,
        GlslType::SamplerCube,
    ];

    /// Spelling in shader source
    pub fn glsl_name(self) -> &'static str {
        match self {
            GlslType::Bool => "bool",
            GlslType::BVec2 => "bvec2",
            GlslType::BVec3 => "bvec3",
            GlslType::BVec4 => "bvec4",
            GlslType::Int => "int",
            GlslType::IVec2 => "ivec2",
            GlslType::IVec3 => "ivec3",
            GlslType::IVec4 => "ivec4",
            GlslType::UInt => "uint",
            GlslType::UVec2 => "uvec2",
            GlslType::UVec3 => "uvec3",
            GlslType::UVec4 => "uvec4",
            GlslType::Float => "float",
            GlslType::Vec2 => "vec2",
            GlslType::Vec3 => "vec3",
            GlslType::Vec4 => "vec4",
            GlslType::Mat2 => "mat2",
            GlslType::Mat3 => "mat3",
            GlslType::Mat4 => "mat4",
            GlslType::Mat2x3 => "mat2x3",
            GlslType::Mat2x4 => "mat2x4",
            GlslType::Mat3x2 => "mat3x2",
            GlslType::Mat3x4 => "mat3x4",
            GlslType::Mat4x2 => "mat4x2",
            GlslType::Mat4x3 => "mat4x3",
            GlslType::Sampler2D => "sampler2D",
            GlslType::Sampler3D => "sampler3D",
            GlslType::SamplerCube => "samplerCube",
        }
    }
}

impl fmt::Display for GlslType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glsl_name())
    }
}

impl FromStr for GlslType {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GlslType::ALL
            .into_iter()
            .find(|t| t.glsl_name() == s)
            .ok_or_else(|| UnitError::UnknownType(s.to_string()))
    }
}

/// A typed, named shader interface variable
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Declaration {
    ty: GlslType,
    name: String,
}

impl Declaration {
    pub fn ty(&self) -> GlslType {
        self.ty
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Declared interface of a vertex main unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexInterface {
    inputs: Vec<Declaration>,
    outputs: Vec<Declaration>,
    uniforms: Vec<Declaration>,
}

impl VertexInterface {
    pub fn inputs(&self) -> &[Declaration] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Declaration] {
        &self.outputs
    }

    pub fn uniforms(&self) -> &[Declaration] {
        &self.uniforms
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty() && self.uniforms.is_empty()
    }

    fn declares(&self, name: &str) -> bool {
        self.inputs
            .iter()
            .chain(&self.outputs)
            .chain(&self.uniforms)
            .any(|d| d.name == name)
    }
}

/// A named fragment of shader source
#[derive(Debug)]
pub struct Unit {
    name: String,
    kind: UnitKind,
    source: Box<dyn Source>,
    imports: Vec<String>,
    es: Option<EsRange>,
    full: Option<FullRange>,
    interface: Option<VertexInterface>,
}

impl Unit {
    fn make(
        kind: UnitKind,
        name: &str,
        source: Box<dyn Source>,
        imports: &[&str],
        es: Option<EsRange>,
        full: Option<FullRange>,
    ) -> Result<Self, UnitError> {
        if name.is_empty() {
            return Err(UnitError::EmptyName);
        }
        if es.is_none() && full.is_none() {
            return Err(UnitError::NoVersionRange {
                unit: name.to_string(),
            });
        }

        let mut distinct: Vec<String> = Vec::with_capacity(imports.len());
        for import in imports {
            if import.is_empty() {
                return Err(UnitError::EmptyImport {
                    unit: name.to_string(),
                });
            }
            if distinct.iter().any(|i| i == import) {
                tracing::trace!(unit = name, import, "dropping duplicate import");
                continue;
            }
            distinct.push(import.to_string());
        }

        Ok(Self {
            name: name.to_string(),
            kind,
            source,
            imports: distinct,
            es,
            full,
            interface: (kind == UnitKind::VertexMain).then(VertexInterface::default),
        })
    }

    /// Create an importable library unit
    pub fn generic(
        name: &str,
        source: impl Source + 'static,
        imports: &[&str],
        es: Option<EsRange>,
        full: Option<FullRange>,
    ) -> Result<Self, UnitError> {
        Self::make(UnitKind::Generic, name, Box::new(source), imports, es, full)
    }

    /// Create a fragment shader main unit
    pub fn fragment_main(
        name: &str,
        source: impl Source + 'static,
        imports: &[&str],
        es: Option<EsRange>,
        full: Option<FullRange>,
    ) -> Result<Self, UnitError> {
        Self::make(UnitKind::FragmentMain, name, Box::new(source), imports, es, full)
    }

    /// Create a vertex shader main unit
    ///
    /// Declarations are added through the returned [`VertexUnit`], which
    /// converts into a `Unit` when handed to a registry.
    pub fn vertex_main(
        name: &str,
        source: impl Source + 'static,
        imports: &[&str],
        es: Option<EsRange>,
        full: Option<FullRange>,
    ) -> Result<VertexUnit, UnitError> {
        Self::make(UnitKind::VertexMain, name, Box::new(source), imports, es, full).map(VertexUnit)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Imported unit names, in declaration order, without duplicates
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn es_range(&self) -> Option<&EsRange> {
        self.es.as_ref()
    }

    pub fn full_range(&self) -> Option<&FullRange> {
        self.full.as_ref()
    }

    /// Declared interface, present only on vertex main units
    pub fn vertex_interface(&self) -> Option<&VertexInterface> {
        self.interface.as_ref()
    }

    pub(crate) fn source(&self) -> &dyn Source {
        self.source.as_ref()
    }

    pub(crate) fn source_mut(&mut self) -> &mut dyn Source {
        self.source.as_mut()
    }
}

/// A vertex main unit under construction
#[derive(Debug)]
pub struct VertexUnit(Unit);

impl VertexUnit {
    fn declare(
        &mut self,
        ty: GlslType,
        name: &str,
        pick: fn(&mut VertexInterface) -> &mut Vec<Declaration>,
    ) -> Result<(), UnitError> {
        let unit = &mut self.0;
        if name.is_empty() {
            return Err(UnitError::EmptyDeclarationName {
                unit: unit.name.clone(),
            });
        }

        let interface = unit.interface.get_or_insert_with(VertexInterface::default);
        if interface.declares(name) {
            return Err(UnitError::DuplicateDeclaration {
                unit: unit.name.clone(),
                name: name.to_string(),
            });
        }

        pick(interface).push(Declaration {
            ty,
            name: name.to_string(),
        });
        Ok(())
    }

    /// Declare a vertex attribute input
    pub fn declare_input(&mut self, ty: GlslType, name: &str) -> Result<(), UnitError> {
        self.declare(ty, name, |i| &mut i.inputs)
    }

    /// Declare a varying output
    pub fn declare_output(&mut self, ty: GlslType, name: &str) -> Result<(), UnitError> {
        self.declare(ty, name, |i| &mut i.outputs)
    }

    /// Declare a uniform
    pub fn declare_uniform(&mut self, ty: GlslType, name: &str) -> Result<(), UnitError> {
        self.declare(ty, name, |i| &mut i.uniforms)
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn interface(&self) -> &VertexInterface {
        // Always populated for vertex main units
        self.0.interface.as_ref().unwrap_or(&EMPTY_INTERFACE)
    }

    pub fn into_unit(self) -> Unit {
        self.0
    }
}

static EMPTY_INTERFACE: VertexInterface = VertexInterface {
    inputs: Vec::new(),
    outputs: Vec::new(),
    uniforms: Vec::new(),
};

impl From<VertexUnit> for Unit {
    fn from(unit: VertexUnit) -> Self {
        unit.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StringSource;
    use crate::version::VersionNumber;

    fn es() -> Option<EsRange> {
        Some(EsRange::new(VersionNumber::new(1, 0, 0), VersionNumber::new(3, 0, 0)).unwrap())
    }

    #[test]
    fn test_generic_unit() {
        let unit = Unit::generic("lighting", StringSource::new("x"), &["a", "b"], es(), None).unwrap();
        assert_eq!(unit.name(), "lighting");
        assert_eq!(unit.kind(), UnitKind::Generic);
        assert_eq!(unit.imports(), ["a", "b"]);
        assert!(unit.es_range().is_some());
        assert!(unit.full_range().is_none());
        assert!(unit.vertex_interface().is_none());
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = Unit::generic("", StringSource::new("x"), &[], es(), None).unwrap_err();
        assert_eq!(err, UnitError::EmptyName);
        let err = Unit::fragment_main("", StringSource::new("x"), &[], es(), None).unwrap_err();
        assert_eq!(err, UnitError::EmptyName);
    }

    #[test]
    fn test_unit_requires_a_range() {
        let err = Unit::generic("bare", StringSource::new("x"), &[], None, None).unwrap_err();
        assert_eq!(err, UnitError::NoVersionRange { unit: "bare".into() });
        assert!(Unit::vertex_main("bare", StringSource::new("x"), &[], None, None).is_err());
        assert!(Unit::fragment_main("bare", StringSource::new("x"), &[], None, None).is_err());

        // Either range alone is enough
        let full = FullRange::new(VersionNumber::new(3, 30, 0), VersionNumber::new(3, 30, 0)).unwrap();
        assert!(Unit::generic("full", StringSource::new("x"), &[], None, Some(full)).is_ok());
        assert!(Unit::generic("es", StringSource::new("x"), &[], es(), None).is_ok());
    }

    #[test]
    fn test_empty_import_rejected() {
        let err = Unit::generic("u", StringSource::new("x"), &["a", ""], es(), None).unwrap_err();
        assert_eq!(err, UnitError::EmptyImport { unit: "u".into() });
    }

    #[test]
    fn test_duplicate_imports_collapsed() {
        let unit = Unit::generic("u", StringSource::new("x"), &["a", "b", "a", "c", "b"], es(), None).unwrap();
        assert_eq!(unit.imports(), ["a", "b", "c"]);
    }

    #[test]
    fn test_vertex_declarations() {
        let mut unit = Unit::vertex_main("main", StringSource::new("void main() {}"), &[], es(), None).unwrap();
        unit.declare_input(GlslType::Vec4, "position").unwrap();
        unit.declare_output(GlslType::Vec2, "uv").unwrap();
        unit.declare_uniform(GlslType::Mat4, "mvp").unwrap();

        let interface = unit.interface();
        assert_eq!(interface.inputs().len(), 1);
        assert_eq!(interface.outputs()[0].name(), "uv");
        assert_eq!(interface.uniforms()[0].ty(), GlslType::Mat4);

        let unit: Unit = unit.into();
        assert_eq!(unit.kind(), UnitKind::VertexMain);
        assert!(!unit.vertex_interface().unwrap().is_empty());
    }

    #[test]
    fn test_declaration_name_rules() {
        let mut unit = Unit::vertex_main("main", StringSource::new(""), &[], es(), None).unwrap();
        assert_eq!(
            unit.declare_input(GlslType::Vec4, "").unwrap_err(),
            UnitError::EmptyDeclarationName { unit: "main".into() }
        );

        unit.declare_input(GlslType::Vec4, "color").unwrap();
        // Same name in any of the three lists collides
        assert_eq!(
            unit.declare_uniform(GlslType::Vec4, "color").unwrap_err(),
            UnitError::DuplicateDeclaration {
                unit: "main".into(),
                name: "color".into()
            }
        );
        assert!(unit.declare_output(GlslType::Vec3, "color").is_err());
        assert_eq!(unit.interface().inputs().len(), 1);
    }

    #[test]
    fn test_type_tags() {
        for ty in GlslType::ALL {
            assert_eq!(ty.glsl_name().parse::<GlslType>().unwrap(), ty);
        }
        assert_eq!(
            "vec5".parse::<GlslType>().unwrap_err(),
            UnitError::UnknownType("vec5".into())
        );
        assert!("".parse::<GlslType>().is_err());
        assert!("Vec4".parse::<GlslType>().is_err());
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(ShaderKind::Vertex.main_unit_kind(), UnitKind::VertexMain);
        assert_eq!(ShaderKind::Fragment.main_unit_kind(), UnitKind::FragmentMain);
        assert_eq!(UnitKind::Generic.shader_kind(), None);
        assert_eq!(UnitKind::FragmentMain.shader_kind(), Some(ShaderKind::Fragment));
    }
}
