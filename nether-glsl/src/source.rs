//! Unit source providers
//!
//! A [`Source`] supplies the opaque text of one unit. The generator asks it
//! for lines once per generation; [`Source::changed`] lets a caller decide
//! whether a previously generated shader may be stale.
//!
//! Three providers are included:
//!
//! - [`StringSource`] - fixed in-memory text
//! - [`FileSource`] - a file on disk, re-read on every fetch
//! - [`LocatorSource`] - text addressed by a locator string and resolved
//!   through a [`Locator`] (e.g. [`FileLocator`] for `file://` locators)

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::SourceError;
use crate::version::{ApiKind, VersionNumber};

/// What a source is being fetched for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorContext {
    pub version: VersionNumber,
    pub api: ApiKind,
    pub debugging: bool,
}

impl GeneratorContext {
    pub fn new(version: VersionNumber, api: ApiKind) -> Self {
        Self {
            version,
            api,
            debugging: false,
        }
    }
}

/// Provider of a unit's source text
pub trait Source: fmt::Debug {
    /// Append the unit's text to `out`, one entry per line
    fn fetch(&mut self, ctx: &GeneratorContext, out: &mut Vec<String>) -> Result<(), SourceError>;

    /// Whether the text may differ from what the last fetch returned
    fn changed(&self) -> Result<bool, SourceError>;
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn fetch(&mut self, ctx: &GeneratorContext, out: &mut Vec<String>) -> Result<(), SourceError> {
        (**self).fetch(ctx, out)
    }

    fn changed(&self) -> Result<bool, SourceError> {
        (**self).changed()
    }
}

fn push_lines(text: &str, out: &mut Vec<String>) {
    out.extend(text.lines().map(str::to_string));
}

fn read_file(path: &Path) -> Result<String, SourceError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SourceError::NotFound {
            path: path.to_path_buf(),
        },
        _ => SourceError::Io {
            locator: path.display().to_string(),
            source: e,
        },
    })
}

/// Modification time, or `None` if the file is gone or the platform has no mtime
fn file_modified(path: &Path) -> Result<Option<SystemTime>, SourceError> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.modified().ok()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SourceError::Io {
            locator: path.display().to_string(),
            source: e,
        }),
    }
}

/// Compare an observed modification time against the current one
fn stale(observed: Option<SystemTime>, current: Option<SystemTime>) -> bool {
    match (observed, current) {
        (Some(seen), Some(now)) => seen != now,
        _ => true,
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Fixed in-memory text
#[derive(Debug, Clone)]
pub struct StringSource {
    text: String,
    fetched: bool,
}

impl StringSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fetched: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Source for StringSource {
    fn fetch(&mut self, _ctx: &GeneratorContext, out: &mut Vec<String>) -> Result<(), SourceError> {
        push_lines(&self.text, out);
        self.fetched = true;
        Ok(())
    }

    fn changed(&self) -> Result<bool, SourceError> {
        Ok(!self.fetched)
    }
}

// =============================================================================
// File-backed
// =============================================================================

/// A file on disk, re-read on every fetch
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    observed: Option<SystemTime>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            observed: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for FileSource {
    fn fetch(&mut self, _ctx: &GeneratorContext, out: &mut Vec<String>) -> Result<(), SourceError> {
        // mtime is sampled before the read, never after
        let modified = file_modified(&self.path)?;
        let text = read_file(&self.path)?;
        push_lines(&text, out);
        self.observed = modified;
        Ok(())
    }

    fn changed(&self) -> Result<bool, SourceError> {
        Ok(stale(self.observed, file_modified(&self.path)?))
    }
}

// =============================================================================
// Locator-backed
// =============================================================================

/// Resolves locator strings (URIs, asset keys, ...) into text
pub trait Locator: fmt::Debug {
    /// Read the full text behind `locator`
    fn read(&self, locator: &str) -> Result<String, SourceError>;

    /// Last modification time, if the backing store tracks one
    fn modified(&self, locator: &str) -> Result<Option<SystemTime>, SourceError>;
}

/// Resolves `file://` locators and plain paths against the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FileLocator {
    base: Option<PathBuf>,
}

impl FileLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative locators against `base`
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    fn resolve(&self, locator: &str) -> Result<PathBuf, SourceError> {
        let raw = match locator.split_once("://") {
            Some(("file", rest)) => rest,
            Some((scheme, _)) => {
                return Err(SourceError::Locator {
                    locator: locator.to_string(),
                    reason: format!("unsupported scheme '{scheme}'"),
                });
            }
            None => locator,
        };

        if raw.is_empty() {
            return Err(SourceError::Locator {
                locator: locator.to_string(),
                reason: "empty path".to_string(),
            });
        }

        let path = Path::new(raw);
        Ok(match &self.base {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        })
    }
}

impl Locator for FileLocator {
    fn read(&self, locator: &str) -> Result<String, SourceError> {
        read_file(&self.resolve(locator)?)
    }

    fn modified(&self, locator: &str) -> Result<Option<SystemTime>, SourceError> {
        file_modified(&self.resolve(locator)?)
    }
}

/// Text addressed by a locator string
#[derive(Debug)]
pub struct LocatorSource {
    locator: String,
    resolver: Box<dyn Locator>,
    observed: Option<SystemTime>,
    always_changed: bool,
}

impl LocatorSource {
    pub fn new(locator: impl Into<String>, resolver: impl Locator + 'static) -> Self {
        Self {
            locator: locator.into(),
            resolver: Box::new(resolver),
            observed: None,
            always_changed: false,
        }
    }

    /// Force [`Source::changed`] to always report true
    pub fn with_always_changed(mut self, always: bool) -> Self {
        self.always_changed = always;
        self
    }

    pub fn set_always_changed(&mut self, always: bool) {
        self.always_changed = always;
    }

    pub fn always_changed(&self) -> bool {
        self.always_changed
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }
}

impl Source for LocatorSource {
    fn fetch(&mut self, _ctx: &GeneratorContext, out: &mut Vec<String>) -> Result<(), SourceError> {
        let modified = self.resolver.modified(&self.locator)?;
        let text = self.resolver.read(&self.locator)?;
        push_lines(&text, out);
        self.observed = modified;
        Ok(())
    }

    fn changed(&self) -> Result<bool, SourceError> {
        if self.always_changed {
            return Ok(true);
        }
        Ok(stale(self.observed, self.resolver.modified(&self.locator)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> GeneratorContext {
        GeneratorContext::new(VersionNumber::new(3, 30, 0), ApiKind::Full)
    }

    #[test]
    fn test_string_source_lines() {
        let mut source = StringSource::new("float f();\nvoid main() {}\n");
        let mut out = Vec::new();
        source.fetch(&ctx(), &mut out).unwrap();
        assert_eq!(out, vec!["float f();", "void main() {}"]);
    }

    #[test]
    fn test_string_source_changed_until_fetched() {
        let mut source = StringSource::new("x");
        assert!(source.changed().unwrap());
        source.fetch(&ctx(), &mut Vec::new()).unwrap();
        assert!(!source.changed().unwrap());
        source.fetch(&ctx(), &mut Vec::new()).unwrap();
        assert!(!source.changed().unwrap());
    }

    #[test]
    fn test_empty_string_source_adds_nothing() {
        let mut out = vec!["#version 100".to_string()];
        StringSource::new("").fetch(&ctx(), &mut out).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_crlf_lines() {
        let mut out = Vec::new();
        StringSource::new("a\r\nb").fetch(&ctx(), &mut out).unwrap();
        assert_eq!(out, vec!["a", "b"]);
    }

    #[test]
    fn test_file_source_missing() {
        let mut source = FileSource::new("/nonexistent/nether-glsl/unit.glsl");
        let err = source.fetch(&ctx(), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, SourceError::NotFound { .. }));
        // Never observed, so it may have changed
        assert!(source.changed().unwrap());
    }

    #[test]
    fn test_file_locator_schemes() {
        let locator = FileLocator::with_base("/shaders");
        assert_eq!(
            locator.resolve("file:///abs/a.glsl").unwrap(),
            PathBuf::from("/abs/a.glsl")
        );
        assert_eq!(
            locator.resolve("lib/b.glsl").unwrap(),
            PathBuf::from("/shaders/lib/b.glsl")
        );
        assert!(matches!(
            locator.resolve("http://example.com/c.glsl"),
            Err(SourceError::Locator { .. })
        ));
        assert!(matches!(
            locator.resolve("file://"),
            Err(SourceError::Locator { .. })
        ));
    }

    #[test]
    fn test_locator_source_always_changed() {
        #[derive(Debug)]
        struct Fixed;
        impl Locator for Fixed {
            fn read(&self, _locator: &str) -> Result<String, SourceError> {
                Ok("vec4 c;".to_string())
            }
            fn modified(&self, _locator: &str) -> Result<Option<SystemTime>, SourceError> {
                Ok(Some(SystemTime::UNIX_EPOCH))
            }
        }

        let mut source = LocatorSource::new("mem:c", Fixed);
        assert!(source.changed().unwrap());

        let mut out = Vec::new();
        source.fetch(&ctx(), &mut out).unwrap();
        assert_eq!(out, vec!["vec4 c;"]);
        assert!(!source.changed().unwrap());

        source.set_always_changed(true);
        assert!(source.changed().unwrap());
        assert!(source.always_changed());
    }
}
