pub mod core;
pub mod models;
pub mod platform;

use crate::core::config::Config;
use crate::core::pose_tracker::{PoseEvent, PoseTracker};
use models::pose::{PoseError, PoseResult};
use platform::display::{ConsoleDisplay, DisplaySink};
use platform::pose::{MediaPipeBridge, ReplayMediaPipe};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub use crate::core::pose_classifier::{classify, PoseClassifier, PoseRule};
pub use models::pose::{BodyLandmark, Keypoint3D, PoseFrame, PoseLabel, PoseThresholds};

/// Counts for one completed session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: String,
    pub frames: u64,
    pub frames_with_body: u64,
    pub labelled_frames: u64,
}

impl SessionSummary {
    fn record(&mut self, event: &PoseEvent) {
        self.frames += 1;
        if event.has_body() {
            self.frames_with_body += 1;
        }
        if event.label.is_some() {
            self.labelled_frames += 1;
        }
    }
}

/// Application state, passed explicitly to the frame loop
pub struct AppContext {
    pub config: Config,
    pub tracker: PoseTracker,
    running: Arc<RwLock<bool>>,
    stop_requested: Arc<RwLock<bool>>,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        let tracker = PoseTracker::new(config.thresholds.clone(), config.event_buffer);
        Self {
            config,
            tracker,
            running: Arc::new(RwLock::new(false)),
            stop_requested: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Ask the frame loop to stop after the current frame. A request made
    /// before `run` gets going still applies to that run.
    pub async fn shutdown(&self) {
        *self.stop_requested.write().await = true;
    }

    /// Pull frames from `source` until it runs dry or `shutdown` is called,
    /// handing every classified frame to `sink`.
    pub async fn run<B, S>(&self, source: &mut B, sink: &mut S) -> PoseResult<SessionSummary>
    where
        B: MediaPipeBridge,
        S: DisplaySink,
    {
        if !source.is_initialized() {
            return Err(PoseError::NotInitialized);
        }

        let session_id = Uuid::new_v4().to_string();
        let mut events = self.tracker.start_tracking(session_id.clone()).await?;
        *self.running.write().await = true;

        tracing::info!(
            session_id = %session_id,
            source = %source.get_model_info(),
            fps = self.config.target_fps,
            realtime = self.config.realtime,
            "frame loop started"
        );

        let mut ticker = self
            .config
            .realtime
            .then(|| tokio::time::interval(self.config.frame_interval()));
        let mut summary = SessionSummary {
            session_id,
            ..SessionSummary::default()
        };

        let outcome = loop {
            if *self.stop_requested.read().await {
                break Ok(());
            }

            let result = match source.next_result() {
                Ok(Some(result)) => result,
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            };

            if let Some(ticker) = ticker.as_mut() {
                ticker.tick().await;
            }

            // Keep presenting while the frame is queued so a full event
            // channel can't stall the send
            let send = self.tracker.process_frame(result);
            tokio::pin!(send);
            let sent = loop {
                tokio::select! {
                    sent = &mut send => break sent,
                    Some(event) = events.recv() => {
                        summary.record(&event);
                        sink.present(&event);
                    }
                }
            };

            if let Err(e) = sent {
                break Err(e);
            }
        };

        self.tracker.stop_tracking().await?;
        while let Some(event) = events.recv().await {
            summary.record(&event);
            sink.present(&event);
        }
        *self.running.write().await = false;
        *self.stop_requested.write().await = false;

        tracing::info!(
            session_id = %summary.session_id,
            frames = summary.frames,
            labelled = summary.labelled_frames,
            "frame loop finished"
        );

        outcome.map(|_| summary)
    }
}

/// Command-line entry: `posecam <recording.jsonl> [config.json]`
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let recording = args
        .next()
        .map(PathBuf::from)
        .ok_or("usage: posecam <recording.jsonl> [config.json]")?;

    let config = match args.next() {
        Some(path) => Config::load_from(&PathBuf::from(path))?,
        None => Config::load()?,
    };

    let mut source = ReplayMediaPipe::open(&recording)?;
    let mut display = ConsoleDisplay::stdout();

    let ctx = Arc::new(AppContext::new(config));

    let signal_ctx = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping");
            signal_ctx.shutdown().await;
        }
    });

    let summary = ctx.run(&mut source, &mut display).await?;

    if source.skipped_lines() > 0 {
        tracing::warn!(
            skipped = source.skipped_lines(),
            "some landmark records were unreadable"
        );
    }
    tracing::info!(
        frames = summary.frames,
        with_body = summary.frames_with_body,
        labelled = summary.labelled_frames,
        "replay complete"
    );

    Ok(())
}
