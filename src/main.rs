//! footcite - footnote and citation relinking for rendered notes

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use footcite::{Activation, Config, Document, Pipeline};

#[derive(Parser)]
#[command(name = "footcite")]
#[command(version, about = "Split and relink footnotes and citations in rendered HTML", long_about = None)]
#[command(after_help = "EXAMPLES:
    footcite note.html out.html           Process a note
    footcite - < note.html > out.html     Read stdin, write stdout
    footcite --no-resources note.html     Only relink references")]
struct Cli {
    /// Input HTML file, or - for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (stdout when omitted)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Sort references by their text
    #[arg(long)]
    sort_citations: bool,

    /// Do not build the Additional Resources panel
    #[arg(long)]
    no_resources: bool,

    /// Look up bookmarks for the note's tags
    #[arg(long)]
    fetch_bookmarks: bool,

    /// Leave documents without an activation marker untouched
    #[arg(long)]
    require_marker: bool,

    /// Longest wait for popover rendering, in milliseconds
    #[arg(long, value_name = "MS")]
    popover_fallback_ms: Option<u64>,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log every stage
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn load_config(&self) -> footcite::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if self.sort_citations {
            config.notes.sort_citations = true;
        }
        if self.no_resources {
            config.resources.enabled = false;
        }
        if self.fetch_bookmarks {
            config.resources.fetch_bookmarks = true;
        }
        if let Some(ms) = self.popover_fallback_ms {
            config.notes.popover_fallback_ms = ms;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(cli: &Cli) {
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("error")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new("footcite=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "footcite=warn".into())
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_input(input: &str) -> io::Result<Vec<u8>> {
    if input == "-" {
        let mut bytes = Vec::new();
        io::stdin().read_to_end(&mut bytes)?;
        Ok(bytes)
    } else {
        std::fs::read(input)
    }
}

fn write_output(output: Option<&PathBuf>, bytes: &[u8]) -> io::Result<()> {
    match output {
        Some(path) => std::fs::write(path, bytes),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()
        }
    }
}

async fn process(cli: &Cli) -> footcite::Result<()> {
    let config = cli.load_config()?;
    let bytes = read_input(&cli.input)?;
    let mut doc = Document::from_bytes(&bytes);

    let activation = match doc.activation() {
        Some(activation) => activation,
        None if cli.require_marker => {
            info!("no activation marker, passing document through");
            write_output(cli.output.as_ref(), &bytes)?;
            return Ok(());
        }
        None => Activation::HostEvent,
    };

    let report = Pipeline::new(config).run(&mut doc, activation).await;
    write_output(cli.output.as_ref(), doc.to_html().as_bytes())?;

    if !cli.quiet {
        eprintln!(
            "{}: {} notes, {} references, {} tags",
            cli.input,
            report.appendix.notes,
            report.appendix.references,
            report.tags.len()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match process(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
