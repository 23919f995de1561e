//! CLI for refmark - compile a manuscript with numbered citations, figures and tables.

use std::env;
use std::fmt;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn, Level};

use refmark::build::{build, compile_source, BuildError, BuildOptions};
use refmark::config::{discover_config, ConfigError, DEFAULT_CONFIG_FILE};
use refmark::error::{CompileError, Warning};
use refmark::output::{report_json, write_atomic};
use refmark::style::builtin_style_names;
use refmark::watch::{watch, WatchError, DEBOUNCE};
use refmark::Resolved;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Compile a markdown manuscript with first-use numbered citations, figures and tables
#[derive(Parser)]
#[command(name = "refmark")]
#[command(version)]
#[command(after_help = "\
Examples:
  refmark build
  refmark build paper.md --bib refs.md -o site
  refmark build --watch
  cat paper.md | refmark build - --bib refs.md
  refmark styles")]
struct Cli {
    /// Show each tag assignment
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve tags and write index.md, index.html and style.css
    #[command(after_help = "\
Token syntax: `ref:a,b`, `fig:tag`, `tab:tag`, and listings `references`, `figures`, `tables`")]
    Build(BuildArgs),

    /// List available builtin styles
    Styles,
}

#[derive(Args)]
struct BuildArgs {
    /// Manuscript file (use '-' for stdin) [default: src/index.md]
    manuscript: Option<PathBuf>,

    /// Bibliography file [default: src/references.md]
    #[arg(short, long)]
    bib: Option<PathBuf>,

    /// Output directory [default: out]
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Project file [default: refmark.toml if present]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Style: builtin name or path to a style TOML file [default: html]
    #[arg(short, long)]
    style: Option<String>,

    /// Stylesheet to copy instead of the bundled one
    #[arg(long)]
    stylesheet: Option<PathBuf>,

    /// Rebuild whenever an input file changes
    #[arg(short, long, conflicts_with = "stdout")]
    watch: bool,

    /// Print the resolved markdown instead of writing files
    #[arg(long)]
    stdout: bool,

    /// Write a JSON report of tag assignments and warnings
    #[arg(long)]
    report: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// AppError: semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10: manuscript not found / unreadable
    InputFile(String),
    /// Exit 11: bibliography not found / unreadable
    BibFile(String),
    /// Exit 12: style not found / invalid
    Style(String),
    /// Exit 13: tag not found among references, figures or tables
    UnknownTag(String),
    /// Exit 14: token syntax error
    MalformedToken(String),
    /// Exit 15: cannot write output
    OutputFile(String),
    /// Exit 16: project file invalid
    Config(String),
    /// Exit 17: file watcher failure
    Watch(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::InputFile(_) => 10,
            AppError::BibFile(_) => 11,
            AppError::Style(_) => 12,
            AppError::UnknownTag(_) => 13,
            AppError::MalformedToken(_) => 14,
            AppError::OutputFile(_) => 15,
            AppError::Config(_) => 16,
            AppError::Watch(_) => 17,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InputFile(msg) => {
                write!(f, "{}\n  hint: verify the manuscript path is correct", msg)
            }
            AppError::BibFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: the bibliography is a numbered list, one entry per line: 1. `tag:name` Source text",
                    msg
                )
            }
            AppError::Style(msg) => {
                let names = builtin_style_names().join(", ");
                write!(
                    f,
                    "{}\n  available builtin styles: {}\n  hint: provide a path to a style .toml file, or use a builtin style name",
                    msg, names
                )
            }
            AppError::UnknownTag(msg) => {
                write!(
                    f,
                    "{}\n  hint: citations live in the bibliography; figures and tables are declared in refmark.toml",
                    msg
                )
            }
            AppError::MalformedToken(msg) => {
                write!(f, "{}\n  hint: tags are comma-separated, e.g. `ref:a,b`", msg)
            }
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output directory is writable",
                    msg
                )
            }
            AppError::Config(msg) => {
                write!(
                    f,
                    "{}\n  hint: see the [figures.<tag>] and [tables.<tag>] sections of refmark.toml",
                    msg
                )
            }
            AppError::Watch(msg) => write!(f, "{}", msg),
        }
    }
}

impl From<BuildError> for AppError {
    fn from(e: BuildError) -> Self {
        match e {
            BuildError::Manuscript { .. } => AppError::InputFile(e.to_string()),
            BuildError::Bibliography { .. } => AppError::BibFile(e.to_string()),
            BuildError::Style { .. } | BuildError::UnknownStyle(_) => {
                AppError::Style(e.to_string())
            }
            BuildError::Compile(CompileError::UnknownTag { .. }) => {
                AppError::UnknownTag(e.to_string())
            }
            BuildError::Compile(CompileError::MalformedToken { .. }) => {
                AppError::MalformedToken(e.to_string())
            }
            BuildError::Stylesheet { .. } | BuildError::Output(_) => {
                AppError::OutputFile(e.to_string())
            }
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<WatchError> for AppError {
    fn from(e: WatchError) -> Self {
        AppError::Watch(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Commands::Build(args) => build_command(args),
        Commands::Styles => {
            styles_command();
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Merges the project file with command-line overrides.
fn build_options(args: &BuildArgs) -> Result<BuildOptions, AppError> {
    let cwd = env::current_dir()
        .map_err(|e| AppError::Config(format!("cannot determine working directory: {}", e)))?;
    let config = discover_config(args.config.as_deref(), &cwd)?;
    let mut options = BuildOptions::from_config(&config);

    if let Some(manuscript) = &args.manuscript {
        options.manuscript = manuscript.clone();
    }
    if let Some(bib) = &args.bib {
        options.bibliography = bib.clone();
    }
    if let Some(out) = &args.out {
        options.out_dir = out.clone();
    }
    if let Some(style) = &args.style {
        options.style = style.clone();
    }
    if let Some(stylesheet) = &args.stylesheet {
        options.stylesheet = Some(stylesheet.clone());
    }
    Ok(options)
}

/// Resolve a manuscript and write (or print) the result.
fn build_command(args: BuildArgs) -> Result<(), AppError> {
    let options = build_options(&args)?;

    let from_stdin = options.manuscript == Path::new("-");
    if args.watch && from_stdin {
        return Err(AppError::Watch(
            "cannot watch stdin; pass a manuscript path to use --watch".to_string(),
        ));
    }
    if args.stdout || from_stdin {
        return print_command(&options, args.report.as_deref());
    }

    match build_once(&options, args.report.as_deref()) {
        Ok(()) => {}
        Err(e) if args.watch => error!("{}", e),
        Err(e) => return Err(e),
    }

    if args.watch {
        let mut paths = options.watched_paths();
        let config_path = args
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if config_path.is_file() {
            paths.push(config_path);
        }
        watch(&paths, DEBOUNCE, || {
            // Re-read the project file so new figures and tables are picked up
            let rebuilt = build_options(&args)
                .and_then(|options| build_once(&options, args.report.as_deref()));
            if let Err(e) = rebuilt {
                error!("{}", e);
            }
        })?;
    }

    Ok(())
}

fn build_once(options: &BuildOptions, report: Option<&Path>) -> Result<(), AppError> {
    let result = build(options)?;
    if let Some(path) = report {
        write_report(path, &result.resolved, &result.warnings)?;
    }
    info!(
        "resolved {} citation(s), {} figure(s), {} table(s), wrote {}",
        result.resolved.assignments.citations.len(),
        result.resolved.assignments.figures.len(),
        result.resolved.assignments.tables.len(),
        result.outputs.html.display()
    );
    Ok(())
}

/// Print resolved markdown to stdout; no files besides the report are written.
fn print_command(options: &BuildOptions, report: Option<&Path>) -> Result<(), AppError> {
    let manuscript = if options.manuscript == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| AppError::InputFile(format!("failed to read from stdin: {}", e)))?;
        buf
    } else {
        std::fs::read_to_string(&options.manuscript).map_err(|e| {
            AppError::InputFile(format!("'{}': {}", options.manuscript.display(), e))
        })?
    };

    let (resolved, warnings) = compile_source(&manuscript, options)?;
    for warning in &warnings {
        warn!("{}", warning);
    }
    if let Some(path) = report {
        write_report(path, &resolved, &warnings)?;
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write!(handle, "{}", resolved.text)
        .map_err(|e| AppError::OutputFile(format!("stdout: {}", e)))?;
    Ok(())
}

fn write_report(path: &Path, resolved: &Resolved, warnings: &[Warning]) -> Result<(), AppError> {
    let json = report_json(&resolved.assignments, warnings)
        .map_err(|e| AppError::OutputFile(e.to_string()))?;
    write_atomic(path, &json).map_err(|e| AppError::OutputFile(e.to_string()))
}

/// List available builtin styles.
fn styles_command() {
    for name in builtin_style_names() {
        println!("{}", name);
    }
}
