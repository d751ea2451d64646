//! Core data structures for expansion measurements.
//!
//! A [`Unit`] is the raw/expanded line-count pair for one compiled source
//! file. A [`Group`] buckets units by a path pattern and accumulates their
//! counts. A [`ResultSet`] owns all units and all groups and routes each
//! recorded unit into every matching group.

use std::fmt;
use std::ops::AddAssign;

use regex::Regex;
use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

use crate::error::PlocError;
use crate::Result;

/// Render a count with thousands separators (`1234567` -> `"1,234,567"`).
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Raw and expanded line counts for a file or a group of files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    /// Lines of code before preprocessing, with comment-only and blank
    /// lines stripped.
    pub loc: u64,
    /// Non-blank lines after preprocessor expansion.
    pub expanded: u64,
}

impl Counts {
    /// Create a new counts pair.
    pub fn new(loc: u64, expanded: u64) -> Self {
        Self { loc, expanded }
    }

    /// Expansion ratio. The +1 in the denominator keeps empty inputs finite.
    pub fn ratio(&self) -> f64 {
        self.expanded as f64 / (self.loc + 1) as f64
    }
}

impl AddAssign for Counts {
    fn add_assign(&mut self, other: Self) {
        self.loc += other.loc;
        self.expanded += other.expanded;
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>9} to {:>12} ({:>5.0}x)",
            thousands(self.loc),
            thousands(self.expanded),
            self.ratio()
        )
    }
}

/// Measurement for a single compiled source file.
///
/// Created once per successfully processed file and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Path to the source file as referenced by the compilation database.
    pub file: String,
    /// Raw and expanded line counts.
    pub counts: Counts,
}

impl Unit {
    /// Create a new unit.
    pub fn new(file: impl Into<String>, loc: u64, expanded: u64) -> Self {
        Self {
            file: file.into(),
            counts: Counts::new(loc, expanded),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.counts, self.file)
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Unit", 3)?;
        state.serialize_field("file", &self.file)?;
        state.serialize_field("loc", &self.counts.loc)?;
        state.serialize_field("expanded", &self.counts.expanded)?;
        state.end()
    }
}

/// A named path-pattern classifier accumulating counts across matching files.
///
/// Groups are independent and may overlap: a file can belong to several
/// groups at once, and the `total` group matches everything.
#[derive(Debug, Clone)]
pub struct Group {
    /// Group name, used as the report label and JSON key.
    pub name: String,
    /// Accumulated counts over all matching units.
    pub counts: Counts,
    /// Number of matching units.
    pub files: u64,
    pattern: Regex,
}

impl Group {
    /// Create a group from a name and a pattern string.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|source| PlocError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            name: name.into(),
            counts: Counts::default(),
            files: 0,
            pattern,
        })
    }

    /// The pattern string this group was built from.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Whether the pattern matches at the start of the given path.
    pub fn matches(&self, path: &str) -> bool {
        self.pattern.find(path).map_or(false, |m| m.start() == 0)
    }

    /// Add a unit's counts to this group if its path matches.
    pub fn account(&mut self, unit: &Unit) {
        if self.matches(&unit.file) {
            self.counts += unit.counts;
            self.files += 1;
        }
    }

    /// Render the group's report line, with the name padded to `name_width`.
    pub fn render(&self, name_width: usize) -> String {
        format!(
            "{:<width$} ({:>5} files): {}",
            self.name,
            self.files,
            self.counts,
            width = name_width
        )
    }
}

impl Serialize for Group {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Group", 3)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("loc", &self.counts.loc)?;
        state.serialize_field("expanded", &self.counts.expanded)?;
        state.end()
    }
}

/// All groups and all units of one measurement run.
///
/// Groups keep their configuration merge order; units are appended in the
/// order their counting processes are collected.
#[derive(Debug, Clone)]
pub struct ResultSet {
    groups: Vec<Group>,
    units: Vec<Unit>,
}

impl ResultSet {
    /// Create a result set over the given groups.
    pub fn new(groups: Vec<Group>) -> Self {
        Self {
            groups,
            units: Vec::new(),
        }
    }

    /// Active groups, in configuration merge order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Recorded units, in collection order.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Whether at least one group's pattern matches the given path.
    pub fn track(&self, path: &str) -> bool {
        self.groups.iter().any(|g| g.matches(path))
    }

    /// Record one file's measurement and route it into every matching group.
    pub fn record(&mut self, file: &str, loc: u64, expanded: u64) {
        let unit = Unit::new(file, loc, expanded);
        for group in &mut self.groups {
            group.account(&unit);
        }
        self.units.push(unit);
    }

    /// Width of the widest group name.
    pub fn max_name_width(&self) -> usize {
        self.groups.iter().map(|g| g.name.len()).max().unwrap_or(0)
    }

    /// The `count` largest files after expansion, descending.
    pub fn largest(&self, count: usize) -> Vec<&Unit> {
        self.sorted(count, |a, b| b.counts.expanded.cmp(&a.counts.expanded))
    }

    /// The `count` files with the worst expansion ratio, descending.
    pub fn worst(&self, count: usize) -> Vec<&Unit> {
        self.sorted(count, |a, b| b.counts.ratio().total_cmp(&a.counts.ratio()))
    }

    /// The `count` smallest input files, ascending.
    pub fn smallest(&self, count: usize) -> Vec<&Unit> {
        self.sorted(count, |a, b| a.counts.loc.cmp(&b.counts.loc))
    }

    /// The first `count` units in alphabetical path order.
    pub fn listing(&self, count: usize) -> Vec<&Unit> {
        self.sorted(count, |a, b| a.file.cmp(&b.file))
    }

    fn sorted(
        &self,
        count: usize,
        cmp: impl Fn(&Unit, &Unit) -> std::cmp::Ordering,
    ) -> Vec<&Unit> {
        let mut units: Vec<&Unit> = self.units.iter().collect();
        units.sort_by(|a, b| cmp(*a, *b));
        units.truncate(count);
        units
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct GroupMap<'a>(&'a [Group]);

        impl Serialize for GroupMap<'_> {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for group in self.0 {
                    map.serialize_entry(&group.name, group)?;
                }
                map.end()
            }
        }

        let mut state = serializer.serialize_struct("ResultSet", 2)?;
        state.serialize_field("groups", &GroupMap(&self.groups))?;
        state.serialize_field("units", &self.units)?;
        state.end()
    }
}
