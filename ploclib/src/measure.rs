//! Measurement orchestration.
//!
//! Walks the compilation database, launches one counting pipeline per
//! tracked file, and collects the two-integer results into a [`ResultSet`].
//!
//! Every pipeline is started immediately by default, so parallelism equals
//! the number of tracked files. An optional cap bounds in-flight processes
//! by collecting the oldest one before spawning more, which keeps the
//! collection order identical to the launch order. There are no retries and
//! no timeouts: a hanging pipeline hangs the run.

use std::collections::VecDeque;
use std::io::Write;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use crate::command::{CommandSplitter, SplitCommand};
use crate::compdb::CompileCommand;
use crate::error::PlocError;
use crate::options::MeasureOptions;
use crate::report::StatusLine;
use crate::stats::{thousands, ResultSet};
use crate::Result;

/// Outcome of a measurement run.
#[derive(Debug, Clone, Copy)]
pub struct MeasureSummary {
    /// Number of files whose counts were collected.
    pub processed: usize,
    /// Wall-clock time for the whole run.
    pub elapsed: Duration,
}

struct Pending {
    child: Child,
    infile: String,
}

/// The combined counting pipeline for one file.
///
/// The first stage preprocesses with macro expansion (`-E -P`) and counts
/// non-blank lines; the second strips comment-only and blank lines from the
/// raw input and counts what remains. Stdout is exactly two whitespace-
/// separated integers: expanded count, then raw count.
fn count_pipeline(split: &SplitCommand) -> String {
    let infile = split.input_path.display();
    format!(
        "{} -E -P {} -o /dev/stdout | sed '/^\\s*$/d' | wc -l ; \
         cat {} | sed '\\;^\\s*//;d' | sed '\\;^/\\*;d' | sed '/^\\*/d' | sed '/^\\s*$/d' | wc -l",
        split.clang_cmd, infile, infile
    )
}

fn collect_unit(pending: Pending, results: &mut ResultSet) -> Result<()> {
    let output = pending.child.wait_with_output()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut fields = stdout.split_whitespace();
    let expanded = fields.next().and_then(|f| f.parse::<u64>().ok());
    let loc = fields.next().and_then(|f| f.parse::<u64>().ok());
    match (expanded, loc, fields.next()) {
        (Some(expanded), Some(loc), None) => {
            results.record(&pending.infile, loc, expanded);
            Ok(())
        }
        _ => Err(PlocError::CountOutput {
            file: pending.infile,
            output: stdout.trim().to_string(),
        }),
    }
}

/// Measure every tracked entry of the compilation database.
///
/// Entries whose path matches no active group are skipped; so are entries
/// whose resolved input file does not exist on disk. A command string that
/// does not look like a clang invocation, or pipeline output that is not
/// exactly two integers, aborts the run.
pub fn measure_files(
    entries: &[CompileCommand],
    results: &mut ResultSet,
    options: &MeasureOptions,
    out: &mut dyn Write,
) -> Result<MeasureSummary> {
    let splitter = CommandSplitter::new()?;
    let mut status = StatusLine::new();
    let mut pending: VecDeque<Pending> = VecDeque::new();
    let mut launched = 0usize;
    let mut collected = 0usize;
    let start = Instant::now();

    for (i, entry) in entries.iter().enumerate() {
        if !results.track(&entry.file) {
            continue;
        }
        status.update(
            out,
            &format!("[{}/{}] Counting LoCs of {}", i, entries.len(), entry.file),
        )?;
        let split = splitter.split(entry)?;
        if !split.input_path.is_file() {
            continue;
        }
        let pipeline = count_pipeline(&split);
        if options.echo_cmd {
            status.finish(out, &pipeline)?;
        }
        if let Some(cap) = options.jobs {
            while pending.len() >= cap.max(1) {
                if let Some(oldest) = pending.pop_front() {
                    status.update(
                        out,
                        &format!("[{}/{}] Summing up {}", collected, launched, oldest.infile),
                    )?;
                    collect_unit(oldest, results)?;
                    collected += 1;
                }
            }
        }
        let child = Command::new("sh")
            .arg("-c")
            .arg(&pipeline)
            .current_dir(&entry.directory)
            .stdout(Stdio::piped())
            .spawn()?;
        pending.push_back(Pending {
            child,
            infile: split.infile,
        });
        launched += 1;
    }

    while let Some(oldest) = pending.pop_front() {
        status.update(
            out,
            &format!("[{}/{}] Summing up {}", collected, launched, oldest.infile),
        )?;
        collect_unit(oldest, results)?;
        collected += 1;
    }

    let elapsed = start.elapsed();
    status.finish(
        out,
        &format!(
            "Processed {} files in {:.2} sec.",
            thousands(collected as u64),
            elapsed.as_secs_f64()
        ),
    )?;

    Ok(MeasureSummary {
        processed: collected,
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupRegistry;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    // Stand-in preprocessor: emits `<input>.exp` when present, otherwise
    // echoes the input unchanged.
    const FAKE_CLANG: &str = "#!/bin/sh\nif [ -f \"$3.exp\" ]; then cat \"$3.exp\"; else cat \"$3\"; fi\n";

    fn write_lines(path: &Path, prefix: &str, n: usize) {
        let body: String = (0..n).map(|i| format!("int {prefix}{i};\n")).collect();
        fs::write(path, body).unwrap();
    }

    fn fixture() -> (tempfile::TempDir, Vec<CompileCommand>) {
        let dir = tempfile::tempdir().unwrap();
        let build = dir.path().join("out/Default");
        let src = dir.path().join("src");
        let test = dir.path().join("test");
        fs::create_dir_all(&build).unwrap();
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&test).unwrap();

        let clang = build.join("clang");
        fs::write(&clang, FAKE_CLANG).unwrap();
        fs::set_permissions(&clang, fs::Permissions::from_mode(0o755)).unwrap();

        write_lines(&src.join("a.cc"), "a", 10);
        write_lines(&src.join("a.cc.exp"), "x", 50);
        write_lines(&src.join("b.cc"), "b", 20);
        write_lines(&src.join("b.cc.exp"), "y", 40);
        write_lines(&src.join("c.cc"), "c", 5);
        write_lines(&test.join("d.cc"), "d", 8);

        let entry = |file: &str| CompileCommand {
            directory: build.to_string_lossy().to_string(),
            command: format!("./clang -c {file} -o obj/x.o"),
            file: file.to_string(),
        };
        let entries = vec![
            entry("../../src/a.cc"),
            entry("../../src/b.cc"),
            entry("../../src/c.cc"),
            entry("../../test/d.cc"),
        ];
        (dir, entries)
    }

    fn result_set() -> ResultSet {
        let registry = GroupRegistry::resolve(&[], &[], &[]).unwrap();
        ResultSet::new(registry.build().unwrap())
    }

    #[test]
    fn test_measure_aggregates_groups() {
        let (_dir, entries) = fixture();
        let mut results = result_set();
        let mut out = Vec::new();
        let summary =
            measure_files(&entries, &mut results, &MeasureOptions::new(), &mut out).unwrap();

        assert_eq!(summary.processed, 4);
        assert_eq!(results.units().len(), 4);

        let src = results.groups().iter().find(|g| g.name == "src").unwrap();
        assert_eq!(src.files, 3);
        assert_eq!(src.counts.loc, 35);
        assert_eq!(src.counts.expanded, 95);

        let worst = results.worst(1);
        assert_eq!(worst[0].file, "../../src/a.cc");
        assert_eq!(worst[0].counts.loc, 10);
        assert_eq!(worst[0].counts.expanded, 50);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Counting LoCs of ../../src/a.cc"));
        assert!(text.contains("Processed 4 files in"));
    }

    #[test]
    fn test_missing_input_file_is_skipped_silently() {
        let (dir, mut entries) = fixture();
        entries.push(CompileCommand {
            directory: dir
                .path()
                .join("out/Default")
                .to_string_lossy()
                .to_string(),
            command: "./clang -c ../../src/missing.cc -o obj/m.o".to_string(),
            file: "../../src/missing.cc".to_string(),
        });

        let mut results = result_set();
        let mut out = Vec::new();
        let summary =
            measure_files(&entries, &mut results, &MeasureOptions::new(), &mut out).unwrap();

        assert_eq!(summary.processed, 4);
        assert!(results
            .units()
            .iter()
            .all(|u| u.file != "../../src/missing.cc"));
    }

    #[test]
    fn test_untracked_entries_are_not_launched() {
        let (_dir, entries) = fixture();
        let registry = GroupRegistry::resolve(&[], &["src".to_string()], &[]).unwrap();
        let mut results = ResultSet::new(registry.build().unwrap());
        let mut out = Vec::new();
        measure_files(&entries, &mut results, &MeasureOptions::new(), &mut out).unwrap();

        assert_eq!(results.units().len(), 3);
        assert!(results.units().iter().all(|u| u.file.starts_with("../../src/")));
    }

    #[test]
    fn test_job_cap_matches_unbounded_results() {
        let (_dir, entries) = fixture();
        let mut results = result_set();
        let mut out = Vec::new();
        let opts = MeasureOptions::new().with_jobs(1);
        measure_files(&entries, &mut results, &opts, &mut out).unwrap();

        assert_eq!(results.units().len(), 4);
        let total = results.groups().iter().find(|g| g.name == "total").unwrap();
        assert_eq!(total.counts.loc, 43);
        assert_eq!(total.counts.expanded, 103);
    }

    #[test]
    fn test_malformed_command_is_fatal() {
        let (dir, mut entries) = fixture();
        entries[0] = CompileCommand {
            directory: dir
                .path()
                .join("out/Default")
                .to_string_lossy()
                .to_string(),
            command: "gcc -c ../../src/a.cc -o obj/a.o".to_string(),
            file: "../../src/a.cc".to_string(),
        };
        let mut results = result_set();
        let mut out = Vec::new();
        let err =
            measure_files(&entries, &mut results, &MeasureOptions::new(), &mut out).unwrap_err();
        assert!(matches!(err, PlocError::CommandShape { .. }));
    }

    fn fake_process(stdout: &str) -> Pending {
        let child = Command::new("sh")
            .arg("-c")
            .arg(format!("printf '{stdout}'"))
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();
        Pending {
            child,
            infile: "../../src/a.cc".to_string(),
        }
    }

    #[test]
    fn test_malformed_count_output_is_fatal() {
        let mut results = result_set();
        for garbage in ["", "banana", "12 banana", "1 2 3"] {
            let err = collect_unit(fake_process(garbage), &mut results).unwrap_err();
            assert!(matches!(err, PlocError::CountOutput { .. }), "{garbage:?}");
        }
        assert!(results.units().is_empty());
    }

    #[test]
    fn test_count_output_order_is_expanded_then_raw() {
        let mut results = result_set();
        collect_unit(fake_process("50\\n10\\n"), &mut results).unwrap();
        assert_eq!(results.units()[0].counts.expanded, 50);
        assert_eq!(results.units()[0].counts.loc, 10);
    }
}
