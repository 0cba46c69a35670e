use bench_report::config::Settings;
use bench_report::{ReportGenerator, TextCatalog, logging};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "bench-report")]
#[command(about = "Generate an HTML report from PHP benchmark results")]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Directory containing one subdirectory per benchmark run
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Directory the report is written into
    #[arg(long)]
    reports_dir: Option<PathBuf>,

    /// Report from this results file instead of the latest run
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Write the report to this file (default: a timestamped file in the
    /// reports directory)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => match Settings::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("error: {}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        },
        None => Settings::default(),
    };

    if let Some(dir) = cli.results_dir {
        settings.paths.results_dir = dir;
    }
    if let Some(dir) = cli.reports_dir {
        settings.paths.reports_dir = dir;
    }

    logging::init(&settings.logging);

    let catalog = match TextCatalog::load() {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    let mut generator = ReportGenerator::new(settings, catalog);
    if let Some(input) = cli.input {
        generator = generator.with_input(input);
    }
    if let Some(output) = cli.output {
        generator = generator.with_output(output);
    }

    match generator.generate() {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
