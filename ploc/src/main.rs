//! # ploc
//!
//! Count lines of code before and after preprocessor macro expansion.
//!
//! ## Usage
//!
//! ```bash
//! # Count with default settings for a build in out/Default
//! ploc --build-dir out/Default
//!
//! # Count according to an existing compile_commands.json
//! ploc --compile-commands compile_commands.json
//!
//! # Count only a custom group of files
//! ploc --build-dir out/Default \
//!      --group src-compiler '\.\./\.\./src/compiler' \
//!      --only src-compiler
//!
//! # Report the 10 files with the worst expansion
//! ploc --build-dir out/Default --worst 10
//!
//! # Report the 10 largest files after preprocessing
//! ploc --build-dir out/Default --largest 10
//!
//! # Machine-readable output (progress moves to stderr)
//! ploc --compile-commands compile_commands.json --json
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};
use ploclib::{
    generate_compile_commands, load_compile_commands, measure_files, write_group_report,
    GroupRegistry, MeasureOptions, ResultSet,
};

mod report;

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("ploc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Count lines of code before and after preprocessor expansion")
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Output JSON instead of the short summary"),
        )
        .arg(
            Arg::new("build-dir")
                .long("build-dir")
                .value_name("PATH")
                .help("Use the specified build dir and generate necessary files"),
        )
        .arg(
            Arg::new("echocmd")
                .long("echocmd")
                .action(ArgAction::SetTrue)
                .help("Output the command used to compute LoC"),
        )
        .arg(
            Arg::new("compile-commands")
                .long("compile-commands")
                .value_name("PATH")
                .default_value("compile_commands.json")
                .help("Use the specified compile_commands.json file"),
        )
        .arg(
            Arg::new("only")
                .long("only")
                .value_name("NAME")
                .action(ArgAction::Append)
                .help("Restrict counting to a report group (can be passed multiple times)"),
        )
        .arg(
            Arg::new("not")
                .long("not")
                .value_name("NAME")
                .action(ArgAction::Append)
                .help("Exclude a specific group (can be passed multiple times)"),
        )
        .arg(
            Arg::new("list-groups")
                .long("list-groups")
                .action(ArgAction::SetTrue)
                .help("List groups and associated regular expressions"),
        )
        .arg(
            Arg::new("group")
                .long("group")
                .num_args(2)
                .value_names(["NAME", "REGEX"])
                .action(ArgAction::Append)
                .help("Add a report group (can be passed multiple times)"),
        )
        .arg(
            Arg::new("largest")
                .long("largest")
                .value_name("N")
                .num_args(0..=1)
                .default_missing_value("3")
                .value_parser(clap::value_parser!(usize))
                .help("Output the n largest files after preprocessing"),
        )
        .arg(
            Arg::new("worst")
                .long("worst")
                .value_name("N")
                .num_args(0..=1)
                .default_missing_value("3")
                .value_parser(clap::value_parser!(usize))
                .help("Output the n files with worst expansion by preprocessing"),
        )
        .arg(
            Arg::new("smallest")
                .long("smallest")
                .value_name("N")
                .num_args(0..=1)
                .default_missing_value("3")
                .value_parser(clap::value_parser!(usize))
                .help("Output the n smallest input files"),
        )
        .arg(
            Arg::new("files")
                .long("files")
                .value_name("N")
                .num_args(0..=1)
                .default_missing_value("3")
                .value_parser(clap::value_parser!(usize))
                .help("Output results for each file separately"),
        )
        .arg(
            Arg::new("jobs")
                .long("jobs")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help("Limit concurrently running counting processes (default: unbounded)"),
        )
}

/// Collect the repeatable `--group NAME REGEX` pairs
fn extract_groups(matches: &ArgMatches) -> Vec<(String, String)> {
    matches
        .get_occurrences::<String>("group")
        .map(|occurrences| {
            occurrences
                .filter_map(|mut pair| {
                    let name = pair.next()?.clone();
                    let pattern = pair.next()?.clone();
                    Some((name, pattern))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn extract_names(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|v| v.cloned().collect())
        .unwrap_or_default()
}

/// Build the measurement options from parsed flags
fn extract_options(matches: &ArgMatches) -> MeasureOptions {
    let mut options = MeasureOptions::new();
    options.json = matches.get_flag("json");
    options.echo_cmd = matches.get_flag("echocmd");
    if let Some(path) = matches.get_one::<String>("compile-commands") {
        options.compile_commands = PathBuf::from(path);
    }
    options.build_dir = matches.get_one::<String>("build-dir").map(PathBuf::from);
    options.groups = extract_groups(matches);
    options.only = extract_names(matches, "only");
    options.not = extract_names(matches, "not");
    options.largest = matches.get_one::<usize>("largest").copied();
    options.worst = matches.get_one::<usize>("worst").copied();
    options.smallest = matches.get_one::<usize>("smallest").copied();
    options.files = matches.get_one::<usize>("files").copied();
    options.jobs = matches.get_one::<usize>("jobs").copied();
    options
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let options = extract_options(matches);
    let registry = GroupRegistry::resolve(&options.groups, &options.only, &options.not)?;

    if matches.get_flag("list-groups") {
        registry.write_table(&mut io::stdout().lock())?;
        return Ok(());
    }

    // In JSON mode stdout carries only the JSON document; everything
    // human-readable goes to stderr.
    let mut out: Box<dyn Write> = if options.json {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };

    let db_path = match &options.build_dir {
        Some(dir) => generate_compile_commands(dir, &mut *out)?,
        None => options.compile_commands.clone(),
    };
    let entries = load_compile_commands(&db_path)?;

    let mut results = ResultSet::new(registry.build()?);
    measure_files(&entries, &mut results, &options, &mut *out)?;

    if options.json {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", serde_json::to_string(&results)?)?;
    }
    write_group_report(&results, &mut *out)?;
    report::write_sections(&results, &options, &mut *out)?;

    Ok(())
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
