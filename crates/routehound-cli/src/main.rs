use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use routehound_core::{crawl, CrawlOptions};
use std::path::PathBuf;
use tracing::info;

mod render;

/// Command-line entry (clap based).
#[derive(Parser, Debug)]
#[command(name = "routehound", version, about = "Static endpoint discovery for Java/Spring source trees")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan inputs and emit the endpoint catalog
    Scan {
        /// Input directories, archives (.zip/.war/.jar), or files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (omit to print a table to the console)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format for `--output`
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Emit one unmerged record per raw finding (audit mode)
        #[arg(long)]
        raw: bool,

        /// Context path prefix; recovered from application properties
        /// when omitted
        #[arg(long)]
        context_path: Option<String>,

        /// Worker threads ("auto" = CPU core count)
        #[arg(long, default_value = "auto")]
        threads: String,

        /// Skip files larger than this many bytes
        #[arg(long)]
        max_file_size: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
    Markdown,
    Postman,
    Text,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            inputs,
            output,
            format,
            raw,
            context_path,
            threads,
            max_file_size,
        } => {
            info!(?inputs, "starting crawl");

            let opts = CrawlOptions {
                context_path,
                raw,
                max_file_size,
                threads: parse_threads(&threads),
            };
            let report = crawl(&inputs, &opts).context("crawl failed")?;

            match output {
                Some(path) => {
                    let rendered = render::render(&report.records, format)?;
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("write {}", path.display()))?;
                    info!(output = %path.display(), "catalog written");
                }
                None => render::print_table(&report.records),
            }

            info!(
                units_scanned = report.stats.units_scanned,
                units_skipped = report.stats.units_skipped,
                detector_failures = report.stats.detector_failures,
                records = report.stats.records_emitted,
                "crawl finished"
            );
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // RUST_LOG controls verbosity, e.g. RUST_LOG=debug.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// "auto" means one worker per CPU core.
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") {
        return None;
    }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}
