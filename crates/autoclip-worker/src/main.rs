//! Clip pipeline worker binary.
//!
//! Submits every video path given on the command line, waits for the
//! pipelines to finish and prints a per-video report (`--json` for the
//! full video views).

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use autoclip_ai::{FallbackScorer, OracleClient, TranscriptionService, Transcriber, ViralityScorer};
use autoclip_media::FfmpegToolkit;
use autoclip_models::PipelineConfig;
use autoclip_store::{JsonFileStore, MemoryStore, VideoStore};
use autoclip_worker::{ClipService, MediaCapabilities, PipelineContext, WorkerConfig};

fn init_tracing() -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("autoclip=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

async fn open_store(config: &WorkerConfig) -> anyhow::Result<Arc<dyn VideoStore>> {
    match &config.store_path {
        Some(path) => {
            let store = JsonFileStore::open(path)
                .await
                .with_context(|| format!("failed to open store at {}", path.display()))?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    info!("Starting autoclip-worker");

    let (flags, sources): (Vec<String>, Vec<String>) =
        std::env::args().skip(1).partition(|a| a.starts_with("--"));
    let json_report = flags.iter().any(|f| f == "--json");
    if sources.is_empty() {
        anyhow::bail!("usage: autoclip-worker [--json] <video> [<video> ...]");
    }

    let worker_config = WorkerConfig::from_env();
    let pipeline_config = PipelineConfig::from_env();
    info!("Worker config: {:?}", worker_config);
    info!("Pipeline config: {:?}", pipeline_config);

    FfmpegToolkit::check_available().context("ffmpeg and ffprobe must be on PATH")?;
    let mut toolkit = FfmpegToolkit::new();
    if let Some(limit) = worker_config.ffmpeg_timeout {
        toolkit = toolkit.with_timeout(limit.as_secs());
    }

    let oracle = OracleClient::from_env().context("failed to build oracle client")?;
    let (transcriber, scorer): (Option<Arc<dyn Transcriber>>, Option<Arc<dyn ViralityScorer>>) =
        match oracle {
            Some(client) => {
                info!("Oracle configured at {}", client.config().base_url);
                let client = Arc::new(client);
                let transcriber: Arc<dyn Transcriber> = client.clone();
                let scorer: Arc<dyn ViralityScorer> = client;
                (Some(transcriber), Some(scorer))
            }
            None => {
                warn!("AI_API_KEY not set, using synthetic transcripts and heuristic scores");
                (None, None)
            }
        };

    let store = open_store(&worker_config).await?;
    let ctx = PipelineContext::new(
        store,
        MediaCapabilities::ffmpeg(toolkit),
        TranscriptionService::new(transcriber),
        FallbackScorer::new(scorer),
        pipeline_config,
        worker_config,
    );
    let service = ClipService::new(ctx);

    let mut submitted = Vec::new();
    for source in &sources {
        let path = Path::new(source);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.clone());

        match service.submit_video(path, &name).await {
            Ok(id) => submitted.push(id),
            Err(e) => error!("Rejected {}: {}", source, e),
        }
    }

    tokio::select! {
        _ = service.wait_all() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
            service.shutdown().await;
        }
    }

    for id in &submitted {
        let view = service.get_video_view(id).await?;
        if json_report {
            println!("{}", serde_json::to_string_pretty(&view)?);
            continue;
        }
        println!(
            "{}  {}  status={}  score={}  clips={}",
            view.video.id,
            view.video.original_name,
            view.video.status,
            view.video
                .virality_score
                .map(|s| format!("{:.0}", s))
                .unwrap_or_else(|| "-".to_string()),
            view.clips.len()
        );
        for clip in &view.clips {
            println!(
                "    {:>7.2}-{:<7.2} {:>3.0}  {}  {}",
                clip.start_time, clip.end_time, clip.virality_score, clip.output_location, clip.summary
            );
        }
    }

    info!("autoclip-worker stopped");
    Ok(())
}
