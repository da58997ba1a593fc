//! Version declaration lines
//!
//! Maps a (version, API) pair onto the `#version` line that must open every
//! generated shader. Only the major and minor components take part in the
//! lookup; the micro component is ignored.

use crate::error::PragmaError;
use crate::version::{ApiKind, VersionNumber};

/// (major, minor) -> version line, GLSL ES
const ES_PRAGMAS: &[((u32, u32), &str)] = &[
    ((1, 0), "#version 100"),
    ((3, 0), "#version 300"),
];

/// (major, minor) -> version line, desktop GLSL
const FULL_PRAGMAS: &[((u32, u32), &str)] = &[
    ((1, 10), "#version 110"),
    ((1, 20), "#version 120"),
    ((1, 30), "#version 130"),
    ((1, 40), "#version 140"),
    ((1, 50), "#version 150"),
    ((3, 30), "#version 330"),
    ((4, 0), "#version 400"),
    ((4, 10), "#version 410"),
    ((4, 20), "#version 420"),
    ((4, 30), "#version 430"),
    ((4, 40), "#version 440"),
];

fn table(api: ApiKind) -> &'static [((u32, u32), &'static str)] {
    match api {
        ApiKind::Es => ES_PRAGMAS,
        ApiKind::Full => FULL_PRAGMAS,
    }
}

/// Look up the version line for `version` on `api`
///
/// # Errors
///
/// Returns `PragmaError::UnsupportedVersion` if the pair is not in the table.
pub fn to_pragma(version: VersionNumber, api: ApiKind) -> Result<&'static str, PragmaError> {
    let key = (version.major(), version.minor());
    table(api)
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, line)| *line)
        .ok_or(PragmaError::UnsupportedVersion { version, api })
}

/// True if [`to_pragma`] would succeed
pub fn is_supported(version: VersionNumber, api: ApiKind) -> bool {
    to_pragma(version, api).is_ok()
}

/// Every version with a version line on `api`, ascending, micro = 0
pub fn supported_versions(api: ApiKind) -> impl Iterator<Item = VersionNumber> {
    table(api)
        .iter()
        .map(|((major, minor), _)| VersionNumber::new(*major, *minor, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_es_pragmas() {
        assert_eq!(
            to_pragma(VersionNumber::new(1, 0, 0), ApiKind::Es).unwrap(),
            "#version 100"
        );
        assert_eq!(
            to_pragma(VersionNumber::new(3, 0, 0), ApiKind::Es).unwrap(),
            "#version 300"
        );
    }

    #[test]
    fn test_full_pragmas() {
        assert_eq!(
            to_pragma(VersionNumber::new(3, 30, 0), ApiKind::Full).unwrap(),
            "#version 330"
        );
        assert_eq!(
            to_pragma(VersionNumber::new(1, 10, 0), ApiKind::Full).unwrap(),
            "#version 110"
        );
        assert_eq!(
            to_pragma(VersionNumber::new(4, 40, 0), ApiKind::Full).unwrap(),
            "#version 440"
        );
    }

    #[test]
    fn test_micro_is_ignored() {
        assert_eq!(
            to_pragma(VersionNumber::new(3, 30, 7), ApiKind::Full).unwrap(),
            "#version 330"
        );
    }

    #[test]
    fn test_unsupported_pairs() {
        let v = VersionNumber::new(2, 0, 0);
        assert_eq!(
            to_pragma(v, ApiKind::Es).unwrap_err(),
            PragmaError::UnsupportedVersion {
                version: v,
                api: ApiKind::Es
            }
        );

        let v = VersionNumber::new(1, 0, 0);
        assert_eq!(
            to_pragma(v, ApiKind::Full).unwrap_err(),
            PragmaError::UnsupportedVersion {
                version: v,
                api: ApiKind::Full
            }
        );

        // 3.30 is a desktop version only
        assert!(!is_supported(VersionNumber::new(3, 30, 0), ApiKind::Es));
    }

    #[test]
    fn test_supported_versions_ascending() {
        let es: Vec<_> = supported_versions(ApiKind::Es).collect();
        assert_eq!(es, vec![VersionNumber::new(1, 0, 0), VersionNumber::new(3, 0, 0)]);

        let full: Vec<_> = supported_versions(ApiKind::Full).collect();
        assert_eq!(full.len(), 11);
        assert!(full.windows(2).all(|w| w[0] < w[1]));
        assert!(full.iter().all(|v| is_supported(*v, ApiKind::Full)));
    }
}
