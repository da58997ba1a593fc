//! Import graph resolution
//!
//! Depth-first traversal from a main unit. A unit is appended to the output
//! only after all of its imports, so the result is dependency-first and every
//! reachable unit appears exactly once.
//!
//! The walk keeps its own stack of frames, so chain depth is bounded by heap
//! rather than by the thread stack.

use hashbrown::{HashMap, HashSet};

use crate::error::GenerateError;
use crate::unit::{Unit, UnitKind};

/// A unit whose imports are being walked, and the index of the next import
struct Frame<'a> {
    unit: &'a Unit,
    next: usize,
}

/// Resolve every unit reachable from `main`, dependency-first
///
/// The main unit is always last. Each import is checked in order: it must be
/// registered, must not be pending (cycle), and must be generic. Imports
/// already finished are skipped.
pub(crate) fn resolve<'a>(
    units: &'a HashMap<String, Unit>,
    main: &'a Unit,
) -> Result<Vec<&'a Unit>, GenerateError> {
    let mut stack = vec![Frame { unit: main, next: 0 }];
    let mut pending: HashSet<&'a str> = HashSet::from_iter([main.name()]);
    let mut finished: Vec<&'a Unit> = Vec::new();
    let mut finished_set: HashSet<&'a str> = HashSet::new();

    while let Some(frame) = stack.last_mut() {
        let unit = frame.unit;
        let Some(import) = unit.imports().get(frame.next) else {
            stack.pop();
            pending.remove(unit.name());
            finished_set.insert(unit.name());
            finished.push(unit);
            continue;
        };
        frame.next += 1;

        let Some(target) = units.get(import) else {
            return Err(GenerateError::MissingDependency {
                unit: unit.name().to_string(),
                import: import.clone(),
            });
        };

        if pending.contains(target.name()) {
            return Err(GenerateError::CyclicDependency {
                unit: unit.name().to_string(),
                import: import.clone(),
            });
        }

        if target.kind() != UnitKind::Generic {
            return Err(GenerateError::NonGenericImport {
                unit: unit.name().to_string(),
                import: import.clone(),
                kind: target.kind(),
            });
        }

        if finished_set.contains(target.name()) {
            continue;
        }

        pending.insert(target.name());
        stack.push(Frame { unit: target, next: 0 });
    }

    Ok(finished)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StringSource;
    use crate::version::{EsRange, VersionNumber};

    fn es() -> Option<EsRange> {
        Some(EsRange::new(VersionNumber::new(1, 0, 0), VersionNumber::new(3, 0, 0)).unwrap())
    }

    fn generic(name: &str, imports: &[&str]) -> Unit {
        Unit::generic(name, StringSource::new(""), imports, es(), None).unwrap()
    }

    fn fragment(name: &str, imports: &[&str]) -> Unit {
        Unit::fragment_main(name, StringSource::new(""), imports, es(), None).unwrap()
    }

    fn map(units: Vec<Unit>) -> HashMap<String, Unit> {
        units.into_iter().map(|u| (u.name().to_string(), u)).collect()
    }

    fn order(units: &HashMap<String, Unit>, main: &str) -> Result<Vec<String>, GenerateError> {
        let main = &units[main];
        resolve(units, main).map(|order| order.into_iter().map(|u| u.name().to_string()).collect())
    }

    #[test]
    fn test_lone_main() {
        let units = map(vec![fragment("main", &[])]);
        assert_eq!(order(&units, "main").unwrap(), ["main"]);
    }

    #[test]
    fn test_chain_is_dependency_first() {
        let units = map(vec![
            fragment("main", &["a"]),
            generic("a", &["b"]),
            generic("b", &["c"]),
            generic("c", &[]),
        ]);
        assert_eq!(order(&units, "main").unwrap(), ["c", "b", "a", "main"]);
    }

    #[test]
    fn test_import_order_preserved() {
        let units = map(vec![
            fragment("main", &["z", "a", "m"]),
            generic("a", &[]),
            generic("m", &[]),
            generic("z", &[]),
        ]);
        assert_eq!(order(&units, "main").unwrap(), ["z", "a", "m", "main"]);
    }

    #[test]
    fn test_diamond_visits_shared_once() {
        let units = map(vec![
            fragment("main", &["left", "right"]),
            generic("left", &["base"]),
            generic("right", &["base"]),
            generic("base", &[]),
        ]);
        assert_eq!(order(&units, "main").unwrap(), ["base", "left", "right", "main"]);
    }

    #[test]
    fn test_unreachable_units_ignored() {
        let units = map(vec![fragment("main", &[]), generic("orphan", &["missing"])]);
        assert_eq!(order(&units, "main").unwrap(), ["main"]);
    }

    #[test]
    fn test_missing_dependency() {
        let units = map(vec![fragment("main", &["a"]), generic("a", &["gone"])]);
        match order(&units, "main").unwrap_err() {
            GenerateError::MissingDependency { unit, import } => {
                assert_eq!(unit, "a");
                assert_eq!(import, "gone");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_cycle_through_main() {
        let units = map(vec![fragment("unit0", &["unit1"]), generic("unit1", &["unit0"])]);
        match order(&units, "unit0").unwrap_err() {
            GenerateError::CyclicDependency { unit, import } => {
                assert_eq!(unit, "unit1");
                assert_eq!(import, "unit0");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_cycle_among_generics() {
        let units = map(vec![
            fragment("main", &["a"]),
            generic("a", &["b"]),
            generic("b", &["c"]),
            generic("c", &["a"]),
        ]);
        assert!(matches!(
            order(&units, "main"),
            Err(GenerateError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn test_self_import_is_cyclic() {
        let units = map(vec![fragment("main", &["a"]), generic("a", &["a"])]);
        assert!(matches!(
            order(&units, "main"),
            Err(GenerateError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn test_non_generic_import() {
        let mut units = map(vec![fragment("main", &["a"]), generic("a", &["vmain"])]);
        let vmain = Unit::vertex_main("vmain", StringSource::new(""), &[], es(), None).unwrap();
        units.insert("vmain".to_string(), vmain.into());

        match order(&units, "main").unwrap_err() {
            GenerateError::NonGenericImport { unit, import, kind } => {
                assert_eq!(unit, "a");
                assert_eq!(import, "vmain");
                assert_eq!(kind, UnitKind::VertexMain);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_deep_chain_resolves() {
        const DEPTH: usize = 50_000;

        let names: Vec<String> = (0..DEPTH).map(|i| format!("u{i}")).collect();
        let mut chain = vec![fragment("main", &["u0"])];
        for (i, name) in names.iter().enumerate() {
            let imports: Vec<&str> = names.get(i + 1).map(String::as_str).into_iter().collect();
            chain.push(generic(name, &imports));
        }
        let units = map(chain);

        let order = order(&units, "main").unwrap();
        assert_eq!(order.len(), DEPTH + 1);
        assert_eq!(order[0], format!("u{}", DEPTH - 1));
        assert_eq!(order[DEPTH - 1], "u0");
        assert_eq!(order[DEPTH], "main");
    }

    #[test]
    fn test_deep_chain_cycle_detected() {
        const DEPTH: usize = 50_000;

        let names: Vec<String> = (0..DEPTH).map(|i| format!("u{i}")).collect();
        let mut chain = vec![fragment("main", &["u0"])];
        for (i, name) in names.iter().enumerate() {
            // The last link closes the loop back to the head of the chain
            let next = names.get(i + 1).map_or("u0", String::as_str);
            chain.push(generic(name, &[next]));
        }
        let units = map(chain);

        match order(&units, "main").unwrap_err() {
            GenerateError::CyclicDependency { unit, import } => {
                assert_eq!(unit, format!("u{}", DEPTH - 1));
                assert_eq!(import, "u0");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
