//! certreg-search: look up certificates from the command line.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use certreg_backend::client::view::{render_details, render_state};
use certreg_backend::client::{DownloadOutcome, RegistryClient, SearchSession};

#[derive(Parser)]
#[command(name = "certreg-search")]
#[command(about = "Search the certificate registry")]
#[command(version)]
struct Cli {
    /// Registry server base URL
    #[arg(long, env = "CERTREG_SERVER", default_value = "http://127.0.0.1:8180")]
    server: String,

    /// Look up by internal id instead of searching
    #[arg(long, conflicts_with = "number")]
    id: bool,

    /// Look up by exact certificate number instead of searching
    #[arg(long)]
    number: bool,

    /// Open the N-th result (1-based) in detail view
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    preview: Option<u64>,

    /// Download design assets of the results into this directory
    #[arg(long)]
    download: Option<PathBuf>,

    /// Search text, id or certificate number
    #[arg(trailing_var_arg = true)]
    query: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "certreg_backend=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let client = RegistryClient::new(&cli.server)?;
    let mut session = SearchSession::new();

    let input = cli.query.join(" ");
    let term = match session.begin(&input) {
        Ok(term) => term,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let response = if cli.id {
        client.by_id(&term).await
    } else if cli.number {
        client.by_certificate_number(&term).await
    } else {
        client.search(&term).await
    };
    let state = session.finish(response);
    println!("{}", render_state(state));

    if let Some(n) = cli.preview {
        let index = usize::try_from(n - 1).unwrap_or(usize::MAX);
        match session.open_preview(index) {
            Some(certificate) => println!("\n{}", render_details(certificate)),
            None => eprintln!("No result number {}", n),
        }
        session.close_preview();
    }

    if let Some(dir) = cli.download {
        tokio::fs::create_dir_all(&dir).await?;
        let records = session.state().map(|s| s.records().to_vec()).unwrap_or_default();
        for certificate in &records {
            match client.download_design(certificate, &dir).await {
                DownloadOutcome::Saved(path) => println!("Saved {}", path.display()),
                DownloadOutcome::Fallback { url, reason } if url.is_empty() => {
                    println!("{}: {}", certificate.certificate_number, reason)
                }
                DownloadOutcome::Fallback { url, reason } => {
                    println!("{}: download failed ({}), open {} instead", certificate.certificate_number, reason, url)
                }
            }
        }
    }

    Ok(())
}
