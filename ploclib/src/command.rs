//! Compile-command splitting.
//!
//! Extracts the clang invocation prefix and the input file from one
//! compilation-database entry's command string.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::compdb::CompileCommand;
use crate::error::PlocError;
use crate::Result;

/// A compile command split into the parts needed for counting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitCommand {
    /// Compiler executable and flags, up to (but not including) `-c`.
    pub clang_cmd: String,
    /// Input file as written in the command.
    pub infile: String,
    /// Input file resolved against the entry's working directory.
    pub input_path: PathBuf,
}

/// Splits compile commands of the shape
/// `[launcher] <...clang...> -c <input> -o <output>`.
#[derive(Debug)]
pub struct CommandSplitter {
    pattern: Regex,
}

impl CommandSplitter {
    /// Build the splitter.
    pub fn new() -> Result<Self> {
        let pattern = r"(\S*\s+)?(?P<clangcmd>\S*clang.*) -c (?P<infile>.*) -o (?P<outfile>.*)";
        let pattern = Regex::new(pattern).map_err(|source| PlocError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern })
    }

    /// Split one entry's command string.
    ///
    /// Fails when the command holds no recognizable clang invocation or no
    /// `-c <input> -o <output>` pair; that failure is fatal for the run.
    pub fn split(&self, entry: &CompileCommand) -> Result<SplitCommand> {
        let caps = self
            .pattern
            .captures(&entry.command)
            .ok_or_else(|| PlocError::CommandShape {
                file: entry.file.clone(),
                command: entry.command.clone(),
            })?;
        let infile = caps["infile"].to_string();
        let input_path = Path::new(&entry.directory).join(&infile);
        Ok(SplitCommand {
            clang_cmd: caps["clangcmd"].to_string(),
            infile,
            input_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(command: &str) -> CompileCommand {
        CompileCommand {
            directory: "/build/out".to_string(),
            command: command.to_string(),
            file: "../../src/a.cc".to_string(),
        }
    }

    #[test]
    fn test_split_plain_invocation() {
        let splitter = CommandSplitter::new().unwrap();
        let split = splitter
            .split(&entry(
                "../../third_party/llvm/clang++ -DDEBUG -I../.. -c ../../src/a.cc -o obj/a.o",
            ))
            .unwrap();
        assert_eq!(
            split.clang_cmd,
            "../../third_party/llvm/clang++ -DDEBUG -I../.."
        );
        assert_eq!(split.infile, "../../src/a.cc");
        assert_eq!(split.input_path, PathBuf::from("/build/out/../../src/a.cc"));
    }

    #[test]
    fn test_split_with_launcher_prefix() {
        let splitter = CommandSplitter::new().unwrap();
        let split = splitter
            .split(&entry("ccache clang -O2 -c a.c -o a.o"))
            .unwrap();
        assert_eq!(split.clang_cmd, "clang -O2");
        assert_eq!(split.infile, "a.c");
    }

    #[test]
    fn test_split_binds_to_last_compile_flag() {
        // An earlier ` -c ` pair belongs to the compiler prefix; greedy
        // matching binds the split to the last occurrence.
        let splitter = CommandSplitter::new().unwrap();
        let split = splitter
            .split(&entry("clang++ -A -c early.cc -o early.o -c a.cc -o obj/a.o"))
            .unwrap();
        assert_eq!(split.clang_cmd, "clang++ -A -c early.cc -o early.o");
        assert_eq!(split.infile, "a.cc");
    }

    #[test]
    fn test_split_rejects_non_clang_command() {
        let splitter = CommandSplitter::new().unwrap();
        let err = splitter
            .split(&entry("gcc -c a.c -o a.o"))
            .unwrap_err();
        assert!(matches!(err, PlocError::CommandShape { .. }));
    }

    #[test]
    fn test_split_rejects_missing_compile_flags() {
        let splitter = CommandSplitter::new().unwrap();
        let err = splitter.split(&entry("clang++ --version")).unwrap_err();
        assert!(matches!(err, PlocError::CommandShape { .. }));
    }
}
