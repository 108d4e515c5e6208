//! One-shot synthesis to a local mp3 file.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! murmur-say --style "Warm, confident coach voice." --file script.txt --out coach_voice.mp3
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use murmur_core::{OpenAiSpeechProvider, SynthesisOrchestrator, SynthesisRequest};
use murmur_server::MurmurConfig;

#[derive(Parser, Debug)]
#[command(name = "murmur-say")]
#[command(about = "Synthesize speech to an mp3 file")]
struct Args {
    /// Text to speak
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    text: Option<String>,

    /// Read the script from a file instead
    #[arg(long)]
    file: Option<PathBuf>,

    /// Style guide for how the voice should sound
    #[arg(long)]
    style: Option<String>,

    /// Voice name (defaults to DEFAULT_VOICE)
    #[arg(long)]
    voice: Option<String>,

    /// Speech speed (defaults to DEFAULT_SPEED)
    #[arg(long)]
    speed: Option<f32>,

    /// Output path
    #[arg(long, default_value = "speech.mp3")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let text = match (&args.text, &args.file) {
        (None, Some(path)) => tokio::fs::read_to_string(path).await?,
        (text, _) => text.clone().unwrap_or_default(),
    };

    let cfg = MurmurConfig::load();
    let provider = Arc::new(OpenAiSpeechProvider::new(cfg.openai.clone())?);
    let orchestrator = SynthesisOrchestrator::new(provider, cfg.synthesis.clone());

    let request = SynthesisRequest {
        text,
        style: args.style,
        voice: args.voice,
        speed: args.speed,
    };
    let audio = orchestrator.synthesize(&request).await?;
    tokio::fs::write(&args.out, &audio).await?;

    println!("MP3 created → {} ({} bytes)", args.out.display(), audio.len());
    Ok(())
}
