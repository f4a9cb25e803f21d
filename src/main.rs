use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use seinsight::cli::Console;
use seinsight::config::Config;
use seinsight::logging;
use seinsight::oracle::{verify_integrity, RpcSignalOracle, SignalOracle, SignalPublisher};
use seinsight::session::{ExchangeRequest, HttpSessionTransport, SessionClient, SessionMetadata};
use seinsight::social::TwitterData;
use seinsight::workflow::AnalysisWorkflow;
use seinsight::{helpers::RetryPolicy, SeinsightError};

/// Seinsight - market signals from agent-collected social data
#[derive(Parser, Debug)]
#[command(name = "seinsight")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "SEINSIGHT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one prompt to an agent and print its reply
    Exchange {
        /// Agent id
        #[arg(short, long)]
        agent: String,

        /// Seconds to wait for the reply
        #[arg(long)]
        max_wait: Option<u64>,

        prompt: String,
    },

    /// Run the full market analysis for a business description
    Analyze {
        description: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Publish the top signals of a collected data file to the oracle
    Publish {
        /// JSON file with collected tweets
        data: PathBuf,
    },

    /// Check a data file against a stored hash
    Verify { data: PathBuf, hash: String },

    /// Oracle contract commands
    Oracle {
        #[command(subcommand)]
        command: OracleCommand,
    },
}

#[derive(Subcommand, Debug)]
enum OracleCommand {
    /// Show connection state and the latest batch
    Status,
}

fn session_client(config: &Config) -> Result<SessionClient, SeinsightError> {
    let transport = HttpSessionTransport::with_timeout(
        config.service.base_url.clone(),
        config.service.request_timeout(),
    )?;
    Ok(SessionClient::new(Arc::new(transport)).with_poll_policy(config.poll))
}

/// Cancel `token` on Ctrl-C
fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling");
            token.cancel();
        }
    });
}

async fn run(command: Command, config: Config, console: &Console) -> Result<(), SeinsightError> {
    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    match command {
        Command::Exchange {
            agent,
            max_wait,
            prompt,
        } => {
            let client = session_client(&config)?;
            let mut request = ExchangeRequest::new(agent, &config.service.user_id, prompt)
                .with_session_metadata(SessionMetadata::for_session(&config.service.platform, "exchange"));
            if let Some(secs) = max_wait {
                request = request.with_max_wait(Duration::from_secs(secs));
            }

            let reply = client.exchange_with_cancel(&request, &cancel).await?;
            console.print_reply(&reply);
        }

        Command::Analyze { description, json } => {
            let client = session_client(&config)?;
            let steps = RetryPolicy {
                max_retries: 2,
                ..config.retry
            };
            let workflow = AnalysisWorkflow::new(client, config.agents.clone(), &config.service.user_id)
                .with_platform(&config.service.platform)
                .with_retry_policies(config.retry, steps);

            if !json {
                console.print_banner("Seinsight Market Analysis");
            }
            let report = workflow
                .run_with_cancel(&description, &cancel, |step| {
                    if !json {
                        console.print_step(step);
                    }
                })
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                console.print_analysis(&report);
            }
        }

        Command::Publish { data } => {
            let data = TwitterData::from_json_file(&data)?;
            let oracle = Arc::new(RpcSignalOracle::new(config.oracle.clone())?);
            let publisher = SignalPublisher::from_config(oracle, &config.oracle);

            let report = publisher.publish(&data).await?;
            console.print_publication(&report);
        }

        Command::Verify { data, hash } => {
            let data = TwitterData::from_json_file(&data)?;
            if verify_integrity(&data, &hash) {
                console.print_success("Data matches the stored hash");
            } else {
                console.print_warning("Data does NOT match the stored hash");
            }
        }

        Command::Oracle {
            command: OracleCommand::Status,
        } => {
            let oracle = RpcSignalOracle::new(config.oracle.clone())?;
            let status = oracle.validate_connection().await;
            let latest = if status.is_ready() {
                match oracle.latest_signals().await {
                    Ok(latest) => latest,
                    Err(e) => {
                        tracing::warn!("Could not read latest signals: {}", e);
                        None
                    }
                }
            } else {
                None
            };
            console.print_oracle_status(&oracle.contract_info(), &status, latest.as_ref());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    let log_guard = logging::init_logging(&config.logging)?;

    tracing::debug!("Agent API at {}", config.service.base_url);

    let console = Console::new();
    if let Err(e) = run(args.command, config, &console).await {
        console.print_failure(&e);
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}
