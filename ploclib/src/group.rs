//! Report-group registry.
//!
//! Resolves the active set of report groups from the built-in defaults,
//! user-supplied `(name, pattern)` pairs, and the `--only`/`--not` filters.

use std::io::{self, Write};

use crate::error::PlocError;
use crate::stats::Group;
use crate::Result;

/// Built-in report groups. Paths in a compilation database are relative to
/// the build directory, hence the `../../` prefixes.
pub const DEFAULT_GROUPS: &[(&str, &str)] = &[
    ("total", ".*"),
    ("src", r"\.\./\.\./src"),
    ("test", r"\.\./\.\./test"),
    ("third_party", r"\.\./\.\./third_party"),
    ("gen", "gen"),
];

/// The resolved name -> pattern table, in configuration merge order.
#[derive(Debug, Clone)]
pub struct GroupRegistry {
    entries: Vec<(String, String)>,
}

impl GroupRegistry {
    /// Merge defaults with user-supplied groups and apply the filters.
    ///
    /// User pairs override a default of the same name in place; new names
    /// are appended. `only` restricts the set to exactly the named groups
    /// and fails on a name that is not defined. `not` removes names after
    /// the `only` filter.
    pub fn resolve(user: &[(String, String)], only: &[String], not: &[String]) -> Result<Self> {
        let mut entries: Vec<(String, String)> = DEFAULT_GROUPS
            .iter()
            .map(|(name, pattern)| (name.to_string(), pattern.to_string()))
            .collect();

        for (name, pattern) in user {
            match entries.iter_mut().find(|(n, _)| n == name) {
                Some(entry) => entry.1 = pattern.clone(),
                None => entries.push((name.clone(), pattern.clone())),
            }
        }

        for name in only {
            if !entries.iter().any(|(n, _)| n == name) {
                return Err(PlocError::UnknownGroup(name.clone()));
            }
        }
        if !only.is_empty() {
            entries.retain(|(n, _)| only.contains(n));
        }
        entries.retain(|(n, _)| !not.contains(n));

        Ok(Self { entries })
    }

    /// The resolved `(name, pattern)` entries.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Compile the entries into accumulator groups.
    pub fn build(&self) -> Result<Vec<Group>> {
        self.entries
            .iter()
            .map(|(name, pattern)| Group::new(name, pattern))
            .collect()
    }

    /// Print the name -> pattern table, name column padded to the widest name.
    pub fn write_table(&self, out: &mut dyn Write) -> io::Result<()> {
        let width = self
            .entries
            .iter()
            .map(|(name, _)| name.len())
            .chain(std::iter::once("Category".len()))
            .max()
            .unwrap_or(0);
        writeln!(out, "  {:<width$}  Regular expression", "Category")?;
        for (name, pattern) in &self.entries {
            writeln!(out, "  {name:<width$}: {pattern}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(registry: &GroupRegistry) -> Vec<&str> {
        registry.entries().iter().map(|(n, _)| n.as_str()).collect()
    }

    #[test]
    fn test_defaults() {
        let registry = GroupRegistry::resolve(&[], &[], &[]).unwrap();
        assert_eq!(
            names(&registry),
            vec!["total", "src", "test", "third_party", "gen"]
        );
    }

    #[test]
    fn test_user_group_appended() {
        let user = vec![("compiler".to_string(), r"\.\./\.\./src/compiler".to_string())];
        let registry = GroupRegistry::resolve(&user, &[], &[]).unwrap();
        assert_eq!(names(&registry).last(), Some(&"compiler"));
    }

    #[test]
    fn test_user_group_overrides_default_in_place() {
        let user = vec![("src".to_string(), "custom".to_string())];
        let registry = GroupRegistry::resolve(&user, &[], &[]).unwrap();
        assert_eq!(names(&registry)[1], "src");
        assert_eq!(registry.entries()[1].1, "custom");
    }

    #[test]
    fn test_only_filter() {
        let registry =
            GroupRegistry::resolve(&[], &["src".to_string(), "gen".to_string()], &[]).unwrap();
        assert_eq!(names(&registry), vec!["src", "gen"]);
    }

    #[test]
    fn test_only_unknown_name_fails() {
        let err = GroupRegistry::resolve(&[], &["nope".to_string()], &[]).unwrap_err();
        assert!(matches!(err, PlocError::UnknownGroup(name) if name == "nope"));
    }

    #[test]
    fn test_not_filter_applies_after_only() {
        let registry = GroupRegistry::resolve(
            &[],
            &["src".to_string(), "test".to_string()],
            &["test".to_string()],
        )
        .unwrap();
        assert_eq!(names(&registry), vec!["src"]);
    }

    #[test]
    fn test_invalid_pattern_fails_on_build() {
        let user = vec![("broken".to_string(), "(".to_string())];
        let registry = GroupRegistry::resolve(&user, &[], &[]).unwrap();
        assert!(matches!(
            registry.build().unwrap_err(),
            PlocError::InvalidPattern { .. }
        ));
    }

    #[test]
    fn test_table_rendering() {
        let registry = GroupRegistry::resolve(&[], &["total".to_string()], &[]).unwrap();
        let mut buf = Vec::new();
        registry.write_table(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Category"));
        assert!(text.contains("total"));
        assert!(text.contains(".*"));
    }
}
