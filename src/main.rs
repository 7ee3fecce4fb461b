// SPDX-License-Identifier: MIT

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stageflow_rs::stageflow::client::{AnalysisClient, RunsClient};
use stageflow_rs::stageflow::config::{ClientConfig, ServerConfig};
use stageflow_rs::stageflow::pipeline::{
    analyze_text, run_basic, BasicMethod, SequenceLoader, StageCatalog,
};
use stageflow_rs::stageflow::server;

const SAMPLE_TEXT: &str = "I really love this product. It's great and works well. \
However, the delivery was terrible and I hate the packaging.";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the text analysis pipeline locally
    Analyze {
        /// Text to analyze
        #[arg(short, long, default_value = SAMPLE_TEXT)]
        text: String,

        /// Print the full record as JSON instead of the report
        #[arg(long)]
        json: bool,
    },
    /// Run the three-step basic sequence
    Basic {
        #[arg(short, long, default_value = "Hello Stageflow!")]
        input: String,

        /// explicit, shorthand or empty
        #[arg(short, long, default_value = "explicit")]
        method: BasicMethod,
    },
    /// Run a sequence from a YAML file
    Run {
        /// Path to the sequence file
        #[arg(short, long)]
        file: PathBuf,

        /// Input object as JSON
        #[arg(short, long, default_value = "{}")]
        input: String,
    },
    /// Start the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,

        /// Directory holding sequence YAML files
        #[arg(long)]
        sequences_dir: Option<PathBuf>,
    },
    /// Exercise a running server: health, basic sequences, text analysis
    Remote {
        /// Server base URL
        #[arg(short, long)]
        url: Option<String>,

        #[arg(short, long, default_value = SAMPLE_TEXT)]
        text: String,
    },
    /// Send one message to an assistant runtime and print the reply
    Assistant {
        #[arg(short, long, default_value = "agent")]
        assistant_id: String,

        #[arg(short, long, default_value = "What's 2 + 2?")]
        message: String,

        /// Runtime base URL
        #[arg(short, long)]
        url: Option<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stageflow_rs=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let args = Args::parse();
    if matches!(args.command, Commands::Serve { .. }) {
        init_tracing();
    } else {
        env_logger::init();
    }

    match args.command {
        Commands::Analyze { text, json } => {
            let analysis = analyze_text(&text)?;
            if json {
                print_json(&analysis)?;
            } else {
                println!("{}", analysis.final_report);
            }
        }
        Commands::Basic { input, method } => {
            let result = run_basic(method, &input)?;
            print_json(&result)?;
        }
        Commands::Run { file, input } => {
            let input: Value = serde_json::from_str(&input).context("--input must be JSON")?;
            let def = SequenceLoader::new()
                .load(&file)
                .with_context(|| format!("loading {}", file.display()))?;
            let sequence = def.build(&StageCatalog::builtin())?;

            log::info!("Running sequence: {}", sequence.name());
            let state = sequence.invoke_with(input, |event| {
                log::info!("Stage {} finished", event.stage);
            })?;
            print_json(&state)?;
        }
        Commands::Serve {
            host,
            port,
            sequences_dir,
        } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(dir) = sequences_dir {
                config.sequences_dir = dir;
            }

            tracing::info!("Starting server on {}", config.bind_addr());
            server::serve(config).await?;
        }
        Commands::Remote { url, text } => {
            let url = url.unwrap_or(ClientConfig::from_env().api_url);
            let client = AnalysisClient::new(&url)?;

            let health = client
                .health()
                .await
                .with_context(|| format!("cannot reach {}", url))?;
            println!("Server at {}: {}", url, health["status"]);

            for method in BasicMethod::ALL {
                println!("\n/basic/{}", method);
                print_json(&client.run_basic(method, "Hello from the Rust client!").await?)?;
            }

            println!("\n/practical/text-analysis");
            print_json(&client.analyze(&text).await?)?;
        }
        Commands::Assistant {
            assistant_id,
            message,
            url,
        } => {
            let config = ClientConfig::from_env();
            let client = RunsClient::new(
                &url.unwrap_or(config.runtime_url),
                config.runtime_api_key,
            )?;

            let run = client
                .wait(
                    &assistant_id,
                    json!({ "messages": [["user", message]] }),
                    None,
                    None,
                )
                .await?;
            match RunsClient::last_message_content(&run) {
                Some(content) => println!("{}", content),
                None => print_json(&run)?,
            }
        }
    }

    Ok(())
}
