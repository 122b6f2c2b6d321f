use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::request::{DurationTier, GuidanceLevel, ScriptProvider, SpeechProvider};

#[derive(Parser, Debug)]
#[command(name = "stillpoint", about = "Guided meditation audio generator")]
pub struct Args {
    /// Override the built-in heuristics table with a JSON file.
    #[arg(long, global = true)]
    pub heuristics: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the pipeline once and write the result locally (or upload it).
    Generate {
        #[arg(long, value_enum, default_value_t = DurationTier::Short)]
        duration: DurationTier,

        #[arg(long, value_enum, default_value_t = GuidanceLevel::Medium)]
        guidance: GuidanceLevel,

        #[arg(long, value_enum, default_value_t = ScriptProvider::OpenAi)]
        ai_provider: ScriptProvider,

        #[arg(long, value_enum, default_value_t = SpeechProvider::OpenAi)]
        tts_provider: SpeechProvider,

        #[arg(long, default_value = "onyx")]
        voice: String,

        #[arg(long, default_value = "mindfulness and breath control")]
        focus: String,

        #[arg(long, default_value = "meditation.wav")]
        out: PathBuf,

        /// Upload to this object-storage base URL instead of writing locally.
        #[arg(long)]
        upload_url: Option<String>,
    },
    /// Run the web service.
    Serve {
        #[arg(long, default_value = "127.0.0.1", env = "STILLPOINT_HOST")]
        host: String,

        #[arg(long, default_value_t = 8080, env = "STILLPOINT_PORT")]
        port: u16,
    },
}
