//! # ploclib
//!
//! Measures source-code size before and after preprocessor macro expansion
//! for a native build, driven by a `compile_commands.json` compilation
//! database.
//!
//! ## Overview
//!
//! For every compilation-database entry whose path matches an active report
//! group, the library re-runs the build's own clang invocation with `-E -P`
//! and counts the non-blank lines of the expanded output, alongside the
//! comment- and blank-stripped lines of the raw input. Results are bucketed
//! into named path-regex groups (`total`, `src`, `test`, ...) and can be
//! listed per file by expanded size, expansion ratio, or raw size.
//!
//! The point of the exercise is build hygiene: headers whose macro
//! expansion disproportionately inflates compile-time work show up at the
//! top of the `--worst` listing.
//!
//! ## Example
//!
//! ```rust
//! use ploclib::{GroupRegistry, ResultSet};
//!
//! let registry = GroupRegistry::resolve(&[], &[], &[]).unwrap();
//! let mut results = ResultSet::new(registry.build().unwrap());
//!
//! assert!(results.track("../../src/heap.cc"));
//! results.record("../../src/heap.cc", 120, 4800);
//!
//! let total = results.groups().iter().find(|g| g.name == "total").unwrap();
//! assert_eq!(total.files, 1);
//! assert_eq!(total.counts.expanded, 4800);
//! ```

pub mod command;
pub mod compdb;
pub mod error;
pub mod group;
pub mod measure;
pub mod options;
pub mod report;
pub mod stats;

pub use command::{CommandSplitter, SplitCommand};
pub use compdb::{generate_compile_commands, load_compile_commands, CompileCommand};
pub use error::PlocError;
pub use group::{GroupRegistry, DEFAULT_GROUPS};
pub use measure::{measure_files, MeasureSummary};
pub use options::MeasureOptions;
pub use report::{write_group_report, StatusLine};
pub use stats::{thousands, Counts, Group, ResultSet, Unit};

/// Result type for ploclib operations
pub type Result<T> = std::result::Result<T, PlocError>;
