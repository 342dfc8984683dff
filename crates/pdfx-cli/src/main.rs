use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pdfx_client::config_file::{self, ConfigFile};
use pdfx_client::{ClientConfig, ConvertOptions, ExtractionClient, Format, Payload};
use tokio::io::{AsyncWrite, AsyncWriteExt};

mod output;

use output::ColorMode;

/// Extract text or JSON from PDFs using a remote extraction service
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Base URL of the extraction service (env: PDFX_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Request timeout in seconds (env: PDFX_TIMEOUT)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the contents of a PDF
    Extract {
        /// Path to the PDF, or `-` to read it from stdin
        file: PathBuf,

        /// First page to convert (1-based)
        #[arg(long)]
        first_page: Option<NonZeroU32>,

        /// Last page to convert (inclusive)
        #[arg(long)]
        last_page: Option<NonZeroU32>,

        /// Password for encrypted PDFs (env: PDFX_PASSWORD)
        #[arg(long)]
        password: Option<String>,

        /// Keep whitespace exactly as the service extracts it
        #[arg(long)]
        no_normalize_whitespace: bool,

        /// Output format: text or json
        #[arg(long)]
        format: Option<Format>,

        /// Pretty-print JSON output (implies --format json)
        #[arg(long)]
        pretty: bool,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check whether the extraction service is up
    Health {
        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let file_config = config_file::load_config();

    // Resolve configuration: CLI flags > env vars > config file > defaults
    let env_url = std::env::var("PDFX_URL").ok();
    let env_timeout = std::env::var("PDFX_TIMEOUT")
        .ok()
        .and_then(|v| v.parse().ok());
    let client_config = resolve_client_config(
        cli.url.clone().or(env_url),
        cli.timeout.or(env_timeout),
        &file_config,
    );
    let client =
        ExtractionClient::from_config(&client_config).context("failed to build HTTP client")?;

    match cli.command {
        Command::Extract {
            file,
            first_page,
            last_page,
            password,
            no_normalize_whitespace,
            format,
            pretty,
            output,
        } => {
            let password = password.or_else(|| std::env::var("PDFX_PASSWORD").ok());
            let options = build_options(
                &file_config,
                first_page,
                last_page,
                password,
                no_normalize_whitespace,
                if pretty { Some(Format::Json) } else { format },
            );
            extract(&client, file, &options, pretty, output).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Health { no_color } => {
            let healthy = client.check_service_health().await;
            let color = ColorMode(!no_color);
            output::print_health(&mut std::io::stdout(), client.base_url(), healthy, color)?;
            Ok(if healthy {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn resolve_client_config(
    url: Option<String>,
    timeout_secs: Option<u64>,
    file_config: &ConfigFile,
) -> ClientConfig {
    let mut config = ClientConfig::from_file(file_config);
    if let Some(url) = url {
        config.base_url = url;
    }
    if let Some(secs) = timeout_secs {
        config.timeout = Some(Duration::from_secs(secs));
    }
    config
}

fn build_options(
    file_config: &ConfigFile,
    first_page: Option<NonZeroU32>,
    last_page: Option<NonZeroU32>,
    password: Option<String>,
    no_normalize_whitespace: bool,
    format: Option<Format>,
) -> ConvertOptions {
    let mut options = file_config.default_options();
    if let Some(page) = first_page {
        options = options.with_first_page(page);
    }
    if let Some(page) = last_page {
        options = options.with_last_page(page);
    }
    if let Some(password) = password {
        options = options.with_password(password);
    }
    if no_normalize_whitespace {
        options = options.with_normalize_whitespace(false);
    }
    if let Some(format) = format {
        options = options.with_format(format);
    }
    options
}

/// `-` streams the PDF from stdin; anything else is a local path.
fn payload_for(file: &Path) -> Payload {
    if file.as_os_str() == "-" {
        Payload::reader(tokio::io::stdin())
    } else {
        Payload::path(file)
    }
}

async fn extract(
    client: &ExtractionClient,
    file: PathBuf,
    options: &ConvertOptions,
    pretty: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let result = client
        .extract(payload_for(&file), options)
        .await
        .with_context(|| format!("extraction of {} failed", file.display()))?;

    let mut writer: Box<dyn AsyncWrite + Unpin + Send> = if let Some(ref path) = output {
        Box::new(
            tokio::fs::File::create(path)
                .await
                .with_context(|| format!("cannot create {}", path.display()))?,
        )
    } else {
        Box::new(tokio::io::stdout())
    };

    if pretty {
        let doc = result.json().await?;
        let mut rendered = serde_json::to_string_pretty(&doc)?;
        rendered.push('\n');
        writer.write_all(rendered.as_bytes()).await?;
    } else {
        let mut reader = result.into_reader();
        let written = tokio::io::copy(&mut reader, &mut writer).await?;
        tracing::debug!(bytes = written, "extraction output written");
    }
    writer.flush().await?;
    Ok(())
}
