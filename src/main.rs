use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

mod args;
mod assembler;
mod audio;
mod config;
mod delivery;
mod error;
mod heuristics;
mod jobs;
mod pipeline;
mod providers;
mod request;
mod script;
mod server;

use args::{Args, Command};
use config::Config;
use delivery::{DeliverySink, HttpStorageSink, LocalFileSink};
use heuristics::HeuristicsTable;
use jobs::JobStore;
use pipeline::Pipeline;
use request::GenerationRequest;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info") // set to "debug" for more logs
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    let heuristics = match &args.heuristics {
        Some(path) => {
            info!("loading heuristics table from {}", path.display());
            HeuristicsTable::from_json(&std::fs::read_to_string(path)?)?
        }
        None => HeuristicsTable::load_default()?,
    };

    match args.command {
        Command::Generate {
            duration,
            guidance,
            ai_provider,
            tts_provider,
            voice,
            focus,
            out,
            upload_url,
        } => {
            let pipeline = Pipeline::new(heuristics, config);
            let request = GenerationRequest {
                duration,
                guidance,
                script_provider: ai_provider,
                speech_provider: tts_provider,
                voice,
                focus,
            };

            info!("starting meditation generation pipeline");
            let audio = pipeline.run(&request).await?;
            info!(
                "generated {} of audio ({:.2}s)",
                audio.duration_display(),
                audio.duration_seconds
            );

            let name = out
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "meditation.wav".to_string());
            let out_dir = out
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));

            let location = match upload_url {
                Some(url) => {
                    let sink = HttpStorageSink::new(url, out_dir.join("catalog.json"));
                    sink.deliver(&name, &audio).await?
                }
                None => {
                    let sink = LocalFileSink::new(out_dir);
                    sink.deliver(&name, &audio).await?
                }
            };
            info!("meditation delivered to {}", location);
        }
        Command::Serve { host, port } => {
            let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
            let state = AppState {
                pipeline: Arc::new(Pipeline::new(heuristics, config.clone())),
                jobs: JobStore::new(),
                secret_token: config.secret_token,
            };
            server::serve(state, addr).await?;
        }
    }

    Ok(())
}
