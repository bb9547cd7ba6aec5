use clap::{ArgAction, Parser};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wordscout::{
    config::available_threads, ErrorKind, SearchConfig, SearchError, Searcher, Settings,
    WriterSink,
};

type Result<T> = std::result::Result<T, SearchError>;

/// Recursively search files for whole-word matches.
///
/// Prints one `path:line:text` line per matching line; line numbers start at 0.
#[derive(Parser)]
#[command(name = "wordscout", author, version, about, long_about = None)]
struct Cli {
    /// Words to search for
    #[arg(required = true, value_name = "TERM")]
    terms: Vec<String>,

    /// Directory to start from (default: current directory)
    #[arg(short = 'd', long = "dir", value_name = "DIRECTORY")]
    dir: Option<PathBuf>,

    /// Match case exactly (default: ignore ASCII case)
    #[arg(short, long)]
    exact: bool,

    /// Maximum number of files scanned at once (default: number of CPUs)
    #[arg(short = 't', long, value_name = "THREADS")]
    threads: Option<usize>,

    /// File extensions to include (e.g. rs,md,txt)
    #[arg(long = "ext", value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Files to leave out (glob, relative to the search directory)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Do not follow symbolic links
    #[arg(long)]
    no_follow: bool,

    /// Color file paths and line numbers
    #[arg(long)]
    color: bool,

    /// Print a summary to stderr when done
    #[arg(short, long)]
    stats: bool,

    /// Settings file (YAML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Values given on the command line, as settings to merge over the file
    fn settings(&self) -> Settings {
        Settings {
            exact: self.exact.then_some(true),
            threads: self.threads,
            file_extensions: self.extensions.clone(),
            ignore_patterns: self.ignore.clone(),
            follow_links: self.no_follow.then_some(false),
            log_level: self.log_level().map(String::from),
        }
    }

    fn log_level(&self) -> Option<&'static str> {
        if self.quiet {
            return Some("error");
        }
        match self.verbose {
            0 => None,
            1 => Some("info"),
            2 => Some("debug"),
            _ => Some("trace"),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            match e.kind() {
                ErrorKind::Configuration => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli)?;
    setup_logging(&config.log_level);
    info!("Searching in {}", config.root_path.display());

    let searcher = Searcher::new(config)?;
    let sink = WriterSink::stdout().with_color(cli.color);
    let summary = searcher.run(&sink)?;
    sink.flush()?;

    if cli.stats {
        eprintln!("{}", summary);
    }
    Ok(())
}

/// Merges settings files with the flags into a validated search config
fn build_config(cli: &Cli) -> Result<SearchConfig> {
    let settings = Settings::load_from(cli.config.as_deref())?.merge_with_cli(cli.settings());

    let root = match &cli.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    settings.into_search_config(root, cli.terms.clone(), available_threads())
}

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
