//! Weave CLI
//!
//! Inspect fingerprints, snapshot diffs and invalidation from the command line.

use std::path::{Path, PathBuf};

use weave_incremental::DiffOptions;
use weavec::commands::{
    diff_directories, explain_invalidation, fingerprint_files, replay_snapshots,
};
use weavec::CommandError;

fn main() {
    weavec::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let result = match args[1].as_str() {
        "fingerprint" => {
            if args.len() < 3 {
                usage_error("weave fingerprint <file>...");
            }
            let paths: Vec<PathBuf> = args[2..].iter().map(PathBuf::from).collect();
            fingerprint_files(&paths)
        }
        "diff" => {
            let mut options = DiffOptions::default();
            let mut dirs = Vec::new();
            for arg in &args[2..] {
                if arg == "--all" || arg == "-a" {
                    options = options.with_include_unchanged(true);
                } else {
                    dirs.push(arg.as_str());
                }
            }
            let [old, new] = dirs[..] else {
                usage_error("weave diff <old-dir> <new-dir> [--all]");
            };
            diff_directories(Path::new(old), Path::new(new), options)
        }
        "explain" => {
            let (dirs, deps) = split_deps(&args[2..]);
            let (&[old, new], Some(deps)) = (dirs.as_slice(), deps) else {
                usage_error("weave explain <old-dir> <new-dir> --deps <file>");
            };
            explain_invalidation(Path::new(old), Path::new(new), Path::new(deps))
        }
        "replay" => {
            let (dirs, deps) = split_deps(&args[2..]);
            if dirs.is_empty() {
                usage_error("weave replay <dir>... [--deps <file>]");
            }
            let snapshots: Vec<PathBuf> = dirs.into_iter().map(PathBuf::from).collect();
            replay_snapshots(&snapshots, deps.map(Path::new))
        }
        "help" | "--help" | "-h" => {
            print_usage();
            return;
        }
        "version" | "--version" | "-V" => {
            println!("weave {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    report(result);
}

fn report(result: Result<String, CommandError>) {
    match result {
        Ok(text) => print!("{text}"),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

/// Separate `--deps <file>` (or `--deps=<file>`) from positional arguments.
fn split_deps(args: &[String]) -> (Vec<&str>, Option<&str>) {
    let mut positional = Vec::new();
    let mut deps = None;
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if arg == "--deps" && i + 1 < args.len() {
            deps = Some(args[i + 1].as_str());
            i += 2;
            continue;
        }
        if let Some(path) = arg.strip_prefix("--deps=") {
            deps = Some(path);
        } else {
            positional.push(arg);
        }
        i += 1;
    }
    (positional, deps)
}

fn usage_error(usage: &str) -> ! {
    eprintln!("Usage: {usage}");
    std::process::exit(1);
}

fn print_usage() {
    println!("Weave - incremental change tracking for aspect analysis");
    println!();
    println!("Usage: weave <command> [options]");
    println!();
    println!("Commands:");
    println!("  fingerprint <file>...                      Show declaration, body and text hashes");
    println!("  diff <old-dir> <new-dir> [--all]           Diff two snapshots of a project");
    println!("  explain <old-dir> <new-dir> --deps <f>     List files a change invalidates");
    println!("  replay <dir>... [--deps <f>]               Run snapshots through a session");
    println!("  help                                       Show this help message");
    println!("  version                                    Show version information");
    println!();
    println!("Dependency files list one edge per line: `dependent -> master`,");
    println!("where master is a file path or `type:Name`.");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=weave_incremental=debug) for a trace tree.");
}
