// Display layer seam: where classified frames end up

use crate::core::pose_tracker::PoseEvent;
use std::io::Write;

/// Receives one event per processed frame
pub trait DisplaySink: Send {
    fn present(&mut self, event: &PoseEvent);
}

/// Writes `timestamp<TAB>label` lines; frames without a body are skipped
pub struct ConsoleDisplay<W: Write + Send> {
    out: W,
}

impl ConsoleDisplay<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> DisplaySink for ConsoleDisplay<W> {
    fn present(&mut self, event: &PoseEvent) {
        let Some(annotation) = event.annotation.as_ref() else {
            return;
        };

        if let Err(e) = writeln!(self.out, "{}\t{}", event.timestamp, annotation.text) {
            tracing::warn!("failed to write pose label: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annotation::Annotation;
    use crate::models::pose::PoseLabel;

    fn event(timestamp: i64, label: Option<PoseLabel>, has_body: bool) -> PoseEvent {
        PoseEvent {
            session_id: "s".to_string(),
            timestamp,
            label,
            annotation: has_body.then(|| Annotation::for_label(label)),
            detection_time_ms: 0,
            classification_time_us: 0,
            classified_at: 0,
        }
    }

    #[test]
    fn test_console_lines() {
        let mut display = ConsoleDisplay::new(Vec::new());
        display.present(&event(1, Some(PoseLabel::Waving), true));
        display.present(&event(2, None, false));
        display.present(&event(3, None, true));

        let text = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(text, "1\tWaving\n3\tUnknown Pose\n");
    }
}
