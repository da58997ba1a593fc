//! Program registry
//!
//! A [`Registry`] owns every unit of one program, keyed by name, together with
//! the version ranges the program as a whole targets. Admission rules are
//! enforced at [`Registry::add`]; import resolution is deferred until a
//! shader is generated (see [`crate::generator`]).


use std::time::SystemTime;

use hashbrown::HashMap;

use crate::error::{RegistryError, SourceError};
use crate::unit::{ShaderKind, Unit};
use crate::version::{ApiKindTag, EsRange, FullRange, VersionRange};

/// Named set of units making up one program
#[derive(Debug)]
pub struct Registry {
    name: String,
    es: Option<EsRange>,
    full: Option<FullRange>,
    units: HashMap<String, Unit>,
    vertex_main: Option<String>,
    fragment_main: Option<String>,
    debugging: bool,
    /// Unit set changed since the last successful generation
    mutated: bool,
    generated_last: Option<SystemTime>,
}

impl Registry {
    fn with_ranges(name: &str, es: Option<EsRange>, full: Option<FullRange>) -> Result<Self, RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::Precondition("program name must not be empty"));
        }
        Ok(Self {
            name: name.to_string(),
            es,
            full,
            units: HashMap::new(),
            vertex_main: None,
            fragment_main: None,
            debugging: false,
            mutated: true,
            generated_last: None,
        })
    }

    /// Create a registry for a program targeting GLSL ES only
    pub fn new_for_es(name: &str, es: EsRange) -> Result<Self, RegistryError> {
        Self::with_ranges(name, Some(es), None)
    }

    /// Create a registry for a program targeting desktop GLSL only
    pub fn new_for_full(name: &str, full: FullRange) -> Result<Self, RegistryError> {
        Self::with_ranges(name, None, Some(full))
    }

    /// Create a registry for a program targeting both profiles
    pub fn new_for_full_and_es(name: &str, full: FullRange, es: EsRange) -> Result<Self, RegistryError> {
        Self::with_ranges(name, Some(es), Some(full))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn es_range(&self) -> Option<&EsRange> {
        self.es.as_ref()
    }

    pub fn full_range(&self) -> Option<&FullRange> {
        self.full.as_ref()
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Admit a unit into the program
    ///
    /// # Errors
    ///
    /// - `DuplicateUnit` if a unit of the same name is registered
    /// - `DuplicateMain` if the unit is a main unit and one of its kind exists
    /// - `Admission` if, for a profile the program targets, the unit has no
    ///   range or its range does not include both program bounds
    ///
    /// On error nothing is stored and the unit is dropped.
    pub fn add(&mut self, unit: impl Into<Unit>) -> Result<(), RegistryError> {
        let unit = unit.into();

        if self.units.contains_key(unit.name()) {
            return Err(RegistryError::DuplicateUnit(unit.name().to_string()));
        }

        if let Some(existing) = unit.kind().shader_kind().and_then(|s| self.main_slot(s)) {
            return Err(RegistryError::DuplicateMain {
                unit: unit.name().to_string(),
                kind: unit.kind(),
                existing: existing.clone(),
            });
        }

        if let Some(program) = &self.es {
            self.check_admission(&unit, program, unit.es_range())?;
        }
        if let Some(program) = &self.full {
            self.check_admission(&unit, program, unit.full_range())?;
        }

        tracing::debug!(
            program = %self.name,
            unit = unit.name(),
            kind = %unit.kind(),
            imports = unit.imports().len(),
            "unit added"
        );

        match unit.kind().shader_kind() {
            Some(ShaderKind::Vertex) => self.vertex_main = Some(unit.name().to_string()),
            Some(ShaderKind::Fragment) => self.fragment_main = Some(unit.name().to_string()),
            None => {}
        }
        self.units.insert(unit.name().to_string(), unit);
        self.mutated = true;
        Ok(())
    }

    fn check_admission<K: ApiKindTag>(
        &self,
        unit: &Unit,
        program: &VersionRange<K>,
        provided: Option<&VersionRange<K>>,
    ) -> Result<(), RegistryError> {
        match provided {
            Some(range) if range.covers(program) => Ok(()),
            _ => Err(RegistryError::Admission {
                program: self.name.clone(),
                unit: unit.name().to_string(),
                api: K::KIND,
                required: program.to_string(),
                provided: provided.map(ToString::to_string),
            }),
        }
    }

    /// Remove a unit by name, handing it back to the caller
    ///
    /// Removing an absent name is a no-op.
    pub fn remove(&mut self, name: &str) -> Option<Unit> {
        let unit = self.units.remove(name)?;

        if let Some(shader) = unit.kind().shader_kind() {
            *self.main_slot_mut(shader) = None;
        }
        self.mutated = true;

        tracing::debug!(program = %self.name, unit = name, "unit removed");
        Some(unit)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Unit> {
        self.units.get(name)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Registered unit names, sorted
    pub fn unit_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.units.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Main unit for the given shader kind, if registered
    pub fn main_unit(&self, kind: ShaderKind) -> Option<&Unit> {
        self.main_slot(kind).and_then(|name| self.units.get(name))
    }

    fn main_slot(&self, kind: ShaderKind) -> Option<&String> {
        match kind {
            ShaderKind::Vertex => self.vertex_main.as_ref(),
            ShaderKind::Fragment => self.fragment_main.as_ref(),
        }
    }

    fn main_slot_mut(&mut self, kind: ShaderKind) -> &mut Option<String> {
        match kind {
            ShaderKind::Vertex => &mut self.vertex_main,
            ShaderKind::Fragment => &mut self.fragment_main,
        }
    }

    pub(crate) fn units(&self) -> &HashMap<String, Unit> {
        &self.units
    }

    pub(crate) fn units_mut(&mut self) -> &mut HashMap<String, Unit> {
        &mut self.units
    }

    // =========================================================================
    // Generation state
    // =========================================================================

    /// Wrap each unit's text in begin/end markers when generating
    pub fn set_debugging(&mut self, debugging: bool) {
        self.debugging = debugging;
    }

    pub fn debugging(&self) -> bool {
        self.debugging
    }

    /// Time of the last successful generation
    pub fn generated_last(&self) -> Option<SystemTime> {
        self.generated_last
    }

    /// Whether a previously generated shader may be stale
    ///
    /// True if units were added or removed since the last successful
    /// generation, or if any registered unit's source reports a change.
    pub fn units_updated(&self) -> Result<bool, SourceError> {
        if self.mutated {
            return Ok(true);
        }
        for unit in self.units.values() {
            if unit.source().changed()? {
                tracing::trace!(program = %self.name, unit = unit.name(), "source changed");
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub(crate) fn mark_generated(&mut self) {
        self.mutated = false;
        self.generated_last = Some(SystemTime::now());
    }
}
