use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use commentguard_core::{AnalysisRequest, AppConfig, ErrorResponse, Pipeline};

#[derive(Parser)]
#[command(name = "commentguard", about = "Fetch comments or posts and classify them")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze the comments of a YouTube video.
    Youtube {
        /// Watch, short or embed URL.
        url: String,
        /// Maximum number of comments to fetch.
        #[arg(long)]
        max_results: Option<usize>,
    },
    /// Analyze recent posts for a hashtag.
    Twitter {
        /// Hashtag, with or without the leading `#`.
        hashtag: String,
        /// Number of posts to request (platform cap: 100).
        #[arg(long)]
        max_results: Option<u32>,
    },
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("commentguard=info".parse()?)
        .add_directive("youtube_client=info".parse()?)
        .add_directive("twitter_client=info".parse()?);
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json)?;

    let mut config = AppConfig::from_env()?;
    let request = match cli.command {
        Command::Youtube { url, max_results } => {
            if let Some(n) = max_results {
                config.youtube_max_results = n;
            }
            AnalysisRequest::Video { url }
        }
        Command::Twitter {
            hashtag,
            max_results,
        } => {
            if let Some(n) = max_results {
                config.twitter_max_results = n;
            }
            AnalysisRequest::Hashtag { hashtag }
        }
    };

    let pipeline = Pipeline::from_config(&config);
    info!(platform = %request.platform(), source = request.source(), "Running analysis");

    match pipeline.analyze(&request).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(err) => {
            let response = ErrorResponse::from(&err);
            println!("{}", serde_json::to_string_pretty(&response)?);
            std::process::exit(exit_code(response.status));
        }
    }
}

/// Client errors exit 2, everything else 1.
fn exit_code(status: u16) -> i32 {
    if (400..500).contains(&status) {
        2
    } else {
        1
    }
}
