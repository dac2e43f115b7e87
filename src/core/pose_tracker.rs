use crate::core::annotation::Annotation;
use crate::core::pose_classifier::PoseClassifier;
use crate::models::pose::{PoseError, PoseLabel, PoseResult, PoseThresholds};
use crate::platform::pose::MediaPipeResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, RwLock};

// ==============================================================================
// Events
// ==============================================================================

/// Outcome for one detector result, handed to the display layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseEvent {
    pub session_id: String,
    pub timestamp: i64,
    /// Label, when a body was detected and a pose rule matched
    pub label: Option<PoseLabel>,
    /// Overlay to draw; absent when the detector found no body
    pub annotation: Option<Annotation>,
    pub detection_time_ms: u64,
    pub classification_time_us: u64,
    /// Wall-clock time the frame was classified (ms since epoch)
    pub classified_at: i64,
}

impl PoseEvent {
    pub fn has_body(&self) -> bool {
        self.annotation.is_some()
    }
}

// ==============================================================================
// Pose Tracker
// ==============================================================================

pub struct PoseTracker {
    classifier: Arc<PoseClassifier>,
    event_buffer: usize,
    current_session_id: Arc<RwLock<Option<String>>>,
    is_tracking: Arc<RwLock<bool>>,
    frame_tx: Arc<RwLock<Option<mpsc::Sender<MediaPipeResult>>>>,
}

impl PoseTracker {
    pub fn new(thresholds: PoseThresholds, event_buffer: usize) -> Self {
        Self {
            classifier: Arc::new(PoseClassifier::new(thresholds)),
            event_buffer: event_buffer.max(1),
            current_session_id: Arc::new(RwLock::new(None)),
            is_tracking: Arc::new(RwLock::new(false)),
            frame_tx: Arc::new(RwLock::new(None)),
        }
    }

    /// Start a tracking session. Returns the stream of classified frames,
    /// which ends once the session is stopped and queued frames are drained.
    pub async fn start_tracking(
        &self,
        session_id: String,
    ) -> PoseResult<mpsc::Receiver<PoseEvent>> {
        let mut is_tracking = self.is_tracking.write().await;
        if *is_tracking {
            return Err(PoseError::AlreadyRunning);
        }

        *self.current_session_id.write().await = Some(session_id.clone());

        let (frame_tx, frame_rx) = mpsc::channel::<MediaPipeResult>(self.event_buffer);
        let (event_tx, event_rx) = mpsc::channel::<PoseEvent>(self.event_buffer);
        *self.frame_tx.write().await = Some(frame_tx);

        *is_tracking = true;

        let classifier = self.classifier.clone();
        let task_session = session_id.clone();
        tokio::spawn(async move {
            Self::process_pose_frames(frame_rx, event_tx, classifier, task_session).await;
        });

        tracing::info!(session_id = %session_id, "started pose tracking");
        Ok(event_rx)
    }

    /// Stop tracking. Frames already queued are still classified.
    pub async fn stop_tracking(&self) -> PoseResult<()> {
        let mut is_tracking = self.is_tracking.write().await;
        if !*is_tracking {
            return Ok(());
        }

        // Dropping the sender lets the processing task finish
        *self.frame_tx.write().await = None;

        *is_tracking = false;
        let session_id = self.current_session_id.write().await.take();

        tracing::info!(session_id = ?session_id, "stopped pose tracking");
        Ok(())
    }

    pub async fn is_tracking(&self) -> bool {
        *self.is_tracking.read().await
    }

    pub async fn current_session(&self) -> Option<String> {
        self.current_session_id.read().await.clone()
    }

    /// Queue one detector result for classification. Ignored when no
    /// session is running.
    pub async fn process_frame(&self, result: MediaPipeResult) -> PoseResult<()> {
        if !*self.is_tracking.read().await {
            return Ok(());
        }

        let tx = self.frame_tx.read().await.clone();
        if let Some(tx) = tx {
            tx.send(result).await.map_err(|_| {
                PoseError::SourceFailed("pose processing task has stopped".to_string())
            })?;
        }

        Ok(())
    }

    async fn process_pose_frames(
        mut rx: mpsc::Receiver<MediaPipeResult>,
        events: mpsc::Sender<PoseEvent>,
        classifier: Arc<PoseClassifier>,
        session_id: String,
    ) {
        while let Some(result) = rx.recv().await {
            let event = Self::classify_result(&classifier, &session_id, result);

            tracing::debug!(
                timestamp = event.timestamp,
                label = event.label.map(|l| l.as_str()).unwrap_or("-"),
                "classified frame"
            );

            if events.send(event).await.is_err() {
                // Nobody is listening any more
                break;
            }
        }
    }

    fn classify_result(
        classifier: &PoseClassifier,
        session_id: &str,
        result: MediaPipeResult,
    ) -> PoseEvent {
        let start_time = Instant::now();

        let (label, annotation) = match result.body_pose.as_ref() {
            Some(frame) => {
                let label = classifier.classify(frame);
                (label, Some(Annotation::for_label(label)))
            }
            None => (None, None),
        };

        PoseEvent {
            session_id: session_id.to_string(),
            timestamp: result.timestamp,
            label,
            annotation,
            detection_time_ms: result.processing_time_ms,
            classification_time_us: start_time.elapsed().as_micros() as u64,
            classified_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
