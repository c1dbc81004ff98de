//! Lexigrade: essay grading CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use lexigrade::analyzer::GradingEngine;
use lexigrade::config::{
    build_engine, build_ignore_set, default_config_json, is_ignored, load_config, CONFIG_FILENAME,
};
use lexigrade::reporter::{ConsoleReporter, JsonReporter};
use lexigrade::GradeResult;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

/// Lexigrade: linguistic feature scoring for annotated essays
#[derive(Parser, Debug)]
#[command(name = "lexigrade")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
#[command(subcommand_negates_reqs = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Essay JSON file or directory of essays (omit when using a subcommand)
    #[arg(required = true)]
    path: Option<PathBuf>,

    /// Grade every essay against this topic instead of its own
    #[arg(long)]
    topic: Option<String>,

    /// Output format as JSON
    #[arg(long, short)]
    json: bool,

    /// Quiet mode (one line per essay)
    #[arg(long, short)]
    quiet: bool,

    /// Verbose output (all findings, debug logging)
    #[arg(long, short)]
    verbose: bool,

    /// Path to config file (default: search .lexigraderc.json in current dir and parents)
    #[arg(long)]
    config: Option<PathBuf>,

    /// WordNet dictionary directory (overrides config)
    #[arg(long)]
    wordnet: Option<PathBuf>,

    /// Grade essays in parallel (default for directories with many essays)
    #[arg(long)]
    parallel: bool,

    /// Number of parallel threads (default: number of CPU cores)
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create .lexigraderc.json with sensible defaults
    Init {
        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .try_init();
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Some(Commands::Init { dir }) = args.command {
        return run_init(dir.as_deref());
    }

    let Some(path) = args.path.clone() else {
        anyhow::bail!("an essay path is required");
    };

    // Resolve work directory for config search
    let work_dir = if path.is_file() {
        path.parent().unwrap_or(Path::new("."))
    } else {
        path.as_path()
    };

    // Load config (CLI flags override config file)
    let config = load_config(work_dir, args.config.as_deref())?.merge_with_cli(args.wordnet.as_deref());

    let ignore_set = if config.ignore.is_empty() {
        None
    } else {
        Some(build_ignore_set(&config.ignore)?)
    };

    let essays = collect_essay_files(&path, ignore_set.as_ref())?;
    if essays.is_empty() {
        eprintln!("{}: No essay files found", "Warning".yellow());
        return Ok(ExitCode::from(2));
    }

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let (mut engine, gender_cache) = build_engine(&config)?;
    if let Some(topic) = &args.topic {
        engine = engine.with_topic(topic.as_str());
    }

    let use_parallel = args.parallel || args.jobs.is_some() || essays.len() > 10;
    let (results, had_errors) = grade_files(&engine, &essays, use_parallel, args.quiet);

    if let Some(cache) = gender_cache {
        if let Err(e) = cache.save() {
            if !args.quiet {
                eprintln!("{}: Failed to save gender cache: {:#}", "Warning".yellow(), e);
            }
        }
    }

    if results.is_empty() {
        eprintln!("{}: All essays failed to grade", "Error".red());
        return Ok(ExitCode::from(2));
    }

    let stats = GradingEngine::aggregate_stats(&results);

    if args.json {
        let reporter = JsonReporter::new().pretty();
        if results.len() == 1 {
            println!("{}", reporter.report(&results[0]));
        } else {
            println!("{}", reporter.report_with_summary(&results, &stats));
        }
    } else {
        let mut reporter = ConsoleReporter::new();
        if args.verbose {
            reporter = reporter.verbose();
        }
        if args.quiet {
            for result in &results {
                reporter.report_quiet(result);
            }
        } else if results.len() == 1 {
            reporter.report(&results[0]);
        } else {
            reporter.report_many(&results, &stats);
        }
    }

    if had_errors {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn run_init(dir: Option<&Path>) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let dir = dir.unwrap_or(&cwd);
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "{}: {} already exists; use --dir to write elsewhere or remove it first",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let json = default_config_json()?;
    std::fs::write(&config_path, format!("{}\n", json))
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!(
        "{}: Created {}",
        "Done".green().bold(),
        config_path.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn collect_essay_files(path: &Path, ignore_set: Option<&globset::GlobSet>) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        if let Some(set) = ignore_set {
            if is_ignored(path, set) {
                return Ok(vec![]);
            }
        }
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.is_dir() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let file_path = entry.path();
        if !entry.file_type().is_file() || !is_essay_file(file_path) {
            continue;
        }
        if let Some(set) = ignore_set {
            if is_ignored(file_path, set) {
                continue;
            }
        }
        files.push(file_path.to_path_buf());
    }

    // Sort for consistent output
    files.sort();
    Ok(files)
}

fn is_essay_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    // config files live alongside essays
    name.ends_with(".json") && !name.starts_with(".lexigraderc")
}

fn grade_files(
    engine: &GradingEngine,
    files: &[PathBuf],
    parallel: bool,
    quiet: bool,
) -> (Vec<GradeResult>, bool) {
    let outcomes = if parallel {
        engine.grade_parallel(files)
    } else {
        let paths: Vec<&Path> = files.iter().map(PathBuf::as_path).collect();
        engine.grade_many(&paths)
    };

    let mut had_errors = false;
    let mut results = Vec::with_capacity(outcomes.len());
    for (file, outcome) in files.iter().zip(outcomes) {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                had_errors = true;
                if !quiet {
                    eprintln!(
                        "{}: Failed to grade {}: {:#}",
                        "Error".red(),
                        file.display(),
                        e
                    );
                }
            }
        }
    }
    (results, had_errors)
}
