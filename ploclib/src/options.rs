//! Measurement options.
//!
//! All configuration is collected into a single [`MeasureOptions`] value,
//! built once at startup and passed by reference into the orchestrator and
//! the group registry.

use std::path::PathBuf;

/// Options controlling a measurement run.
#[derive(Debug, Clone)]
pub struct MeasureOptions {
    /// Emit a machine-readable JSON result on stdout; human-readable
    /// progress and summaries move to stderr.
    pub json: bool,
    /// Print the generated counting pipeline for each file before running it.
    pub echo_cmd: bool,
    /// Path to the compilation database.
    pub compile_commands: PathBuf,
    /// Build directory to generate a compilation database in first.
    pub build_dir: Option<PathBuf>,
    /// User-supplied report groups as (name, pattern) pairs.
    pub groups: Vec<(String, String)>,
    /// Restrict reporting to these group names.
    pub only: Vec<String>,
    /// Exclude these group names from reporting.
    pub not: Vec<String>,
    /// Report the N largest files after expansion.
    pub largest: Option<usize>,
    /// Report the N files with the worst expansion ratio.
    pub worst: Option<usize>,
    /// Report the N smallest input files.
    pub smallest: Option<usize>,
    /// List the first N tracked files alphabetically.
    pub files: Option<usize>,
    /// Cap on concurrently running counting processes.
    /// `None` launches every process immediately.
    pub jobs: Option<usize>,
}

impl Default for MeasureOptions {
    fn default() -> Self {
        Self {
            json: false,
            echo_cmd: false,
            compile_commands: PathBuf::from("compile_commands.json"),
            build_dir: None,
            groups: Vec::new(),
            only: Vec::new(),
            not: Vec::new(),
            largest: None,
            worst: None,
            smallest: None,
            files: None,
            jobs: None,
        }
    }
}

impl MeasureOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compilation database path.
    pub fn compile_commands(mut self, path: impl Into<PathBuf>) -> Self {
        self.compile_commands = path.into();
        self
    }

    /// Generate the compilation database in the given build directory first.
    pub fn build_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.build_dir = Some(path.into());
        self
    }

    /// Add a report group.
    pub fn group(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.groups.push((name.into(), pattern.into()));
        self
    }

    /// Restrict reporting to the given group name.
    pub fn only(mut self, name: impl Into<String>) -> Self {
        self.only.push(name.into());
        self
    }

    /// Exclude the given group name from reporting.
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.not.push(name.into());
        self
    }

    /// Builder: enable JSON output.
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Builder: echo each counting pipeline before running it.
    pub fn with_echo_cmd(mut self, echo: bool) -> Self {
        self.echo_cmd = echo;
        self
    }

    /// Builder: cap the number of concurrent counting processes.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = MeasureOptions::new();
        assert!(!opts.json);
        assert!(!opts.echo_cmd);
        assert_eq!(opts.compile_commands, PathBuf::from("compile_commands.json"));
        assert!(opts.build_dir.is_none());
        assert!(opts.jobs.is_none());
    }

    #[test]
    fn test_builder() {
        let opts = MeasureOptions::new()
            .compile_commands("out/Default/compile_commands.json")
            .group("compiler", r"\.\./\.\./src/compiler")
            .only("compiler")
            .with_json(true)
            .with_jobs(8);
        assert!(opts.json);
        assert_eq!(opts.jobs, Some(8));
        assert_eq!(opts.groups.len(), 1);
        assert_eq!(opts.only, vec!["compiler".to_string()]);
    }
}
