mod parser;
mod record;
mod report;
mod settings;
mod sources;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use parser::classify::Classifier;
use settings::Settings;

#[derive(Parser)]
#[command(name = "diario_consolidator", about = "Split, classify and deduplicate judicial gazette publications")]
struct Cli {
    /// Settings file (default: ./diario.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Classification window in characters (overrides settings)
    #[arg(short, long, global = true)]
    window: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment, classify and group gazette text files
    Process {
        /// Files or directories of .txt gazettes
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Max publications per report part (text only)
        #[arg(long)]
        per_part: Option<usize>,
    },
    /// Classify the text of a single publication block
    Classify {
        file: PathBuf,
        /// List every rule hit inside the window
        #[arg(long)]
        explain: bool,
    },
    /// Print the active rule table in priority order
    Rules,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

const CHUNK: usize = 64;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(window) = cli.window {
        settings.classifier.window_chars = window;
    }
    let classifier = settings.classifier()?;
    info!(
        window_chars = classifier.window_chars(),
        rules = classifier.table().rules().len(),
        "classifier ready"
    );

    let result = match cli.command {
        Commands::Process { paths, format, output, per_part } => {
            run_process(&classifier, &paths, format, output, per_part)
        }
        Commands::Classify { file, explain } => {
            let text = std::fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
            println!("{}", classifier.classify(&text));
            if explain {
                let rules = classifier.table().rules();
                for m in classifier.matches(&text) {
                    println!(
                        "  {:<20} {:<24} @{:<6} {}{}",
                        format!("{:?}", m.tier),
                        m.label,
                        m.start,
                        rules[m.rule_index].pattern(),
                        if m.anchored { "  [conteudo]" } else { "" },
                    );
                }
            }
            Ok(())
        }
        Commands::Rules => {
            println!("window: {} chars", classifier.window_chars());
            for (i, r) in classifier.table().rules().iter().enumerate() {
                let guard = r.guard().map(|g| format!("  (not after \"{g}\")")).unwrap_or_default();
                println!(
                    "{:>2}. {:<20} {:<24} {}{}",
                    i + 1,
                    format!("{:?}", r.tier()),
                    r.label(),
                    r.pattern(),
                    guard
                );
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("done in {}", format_duration(elapsed));
    }

    result
}

fn run_process(
    classifier: &Classifier,
    paths: &[PathBuf],
    format: Format,
    output: Option<PathBuf>,
    per_part: Option<usize>,
) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    let sources = sources::load(paths)?;
    if sources.is_empty() {
        println!("No sources found.");
        return Ok(());
    }
    info!(sources = sources.len(), "segmenting");

    let pb = ProgressBar::new(sources.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut publications = Vec::new();
    for chunk in sources.chunks(CHUNK) {
        publications.extend(parser::process_sources(chunk, classifier));
        pb.inc(chunk.len() as u64);
    }
    pb.finish_and_clear();

    let consolidated = parser::consolidate(&publications);

    let documents = match format {
        Format::Json => vec![report::render_json(&consolidated)?],
        Format::Text => report::render_text(&consolidated, &chrono::Local::now(), per_part),
    };

    match output {
        None => {
            for doc in &documents {
                println!("{doc}");
            }
        }
        Some(path) if documents.len() == 1 => {
            std::fs::write(&path, &documents[0]).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        Some(path) => {
            for (i, doc) in documents.iter().enumerate() {
                let part = report::part_path(&path, i + 1);
                std::fs::write(&part, doc).with_context(|| format!("writing {}", part.display()))?;
                info!(path = %part.display(), "report part written");
            }
        }
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
