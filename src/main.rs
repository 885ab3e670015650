use anyhow::Result;
use clap::Parser;
use proximus::console;
use proximus::probe::{load_endpoints, EngineConfig, ProbeEngine, ProgressSink, SourceOutcome};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A concurrent proxy checker with per-proxy latency measurement
#[derive(Parser)]
#[command(name = "proximus")]
#[command(about = "A concurrent proxy checker with per-proxy latency measurement")]
struct Cli {
    /// File containing proxies, one host:port per line
    #[arg(short, long, default_value = "proxies.txt")]
    file: PathBuf,

    /// Timeout for each probe in milliseconds
    #[arg(long, default_value = "5000")]
    timeout: u64,

    /// URL fetched through each proxy to verify it
    #[arg(long, default_value = "http://ip-api.com/json/")]
    probe_url: String,
}

/// Mirrors probe completions into the terminal title
struct TitleProgress;

impl ProgressSink for TitleProgress {
    fn probe_completed(&self, done: usize, total: usize) {
        let percent = if total == 0 { 100 } else { done * 100 / total };
        console::set_title(&format!("Proximus - {}% ({}/{})", percent, done, total));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    console::set_title("Proximus");
    console::print_banner(env!("CARGO_PKG_VERSION"));
    console::info(&format!("Checking {}...", cli.file.display()));

    let endpoints = match load_endpoints(&cli.file)? {
        SourceOutcome::Found(endpoints) if !endpoints.is_empty() => endpoints,
        SourceOutcome::CreatedTemplate => {
            console::warn(&format!(
                "The file {} was not found, created an empty one.",
                cli.file.display()
            ));
            abort_on_empty_list(&cli.file);
        }
        SourceOutcome::Found(_) => abort_on_empty_list(&cli.file),
    };

    console::check(&format!("{} proxies found.", endpoints.len()));

    console::set_title("Proximus - Connecting...");
    console::info("Connecting to proxies in progress...");
    console::comment("Results may be slow depending on your and proxies network.");
    console::comment(&"=".repeat(67));

    let config = EngineConfig::new()
        .with_timeout(Duration::from_millis(cli.timeout))
        .with_probe_url(cli.probe_url);
    let engine = ProbeEngine::with_config(config);

    let summary = engine.probe_all(&endpoints, &TitleProgress).await;

    console::set_title("Proximus - Done!");
    console::print_summary(&summary);

    Ok(())
}

fn abort_on_empty_list(file: &Path) -> ! {
    console::cross(&format!(
        "There's no proxies listed in {}. Add at least one.",
        file.display()
    ));
    std::process::exit(1);
}
