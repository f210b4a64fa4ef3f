use std::collections::VecDeque;

use thiserror::Error;

use super::marker::TargetFix;

// ---------------------------------------------------------------------------
// Detection adapter seam
// ---------------------------------------------------------------------------

/// Frame acquisition or decode failure. The tracking loop treats a failed
/// cycle like a no-target cycle; it never aborts on one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("frame acquisition failed: {reason}")]
pub struct AcquisitionError {
    pub reason: String,
}

impl AcquisitionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Supplies one detection result per control cycle.
///
/// Implement this to plug a real capture/detect pipeline into the loop.
/// `detect` may block while waiting for the next frame; the loop calls it
/// exactly once per cycle and never re-enters it. It must not touch
/// controller state; presence and position are all it reports.
pub trait DetectionSource {
    /// `Ok(Some(fix))` when the target marker was seen this frame,
    /// `Ok(None)` when it was not.
    fn detect(&mut self) -> Result<Option<TargetFix>, AcquisitionError>;

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}

// ---------------------------------------------------------------------------
// Scripted source: canned frame sequences for tests and demos
// ---------------------------------------------------------------------------

/// One scripted frame outcome.
#[derive(Debug, Clone)]
pub enum ScriptFrame {
    /// Target seen at this fix.
    Fix(TargetFix),
    /// Frame decoded fine, no target in it.
    Empty,
    /// Acquisition failed (sensor fault, decode error, ...).
    Fail(&'static str),
}

/// Replays a fixed frame script, then reports empty frames forever.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    frames: VecDeque<ScriptFrame>,
}

impl ScriptedSource {
    pub fn new(frames: Vec<ScriptFrame>) -> Self {
        Self { frames: frames.into() }
    }

    /// Script that holds the same fix for `n` consecutive frames.
    pub fn holding(fix: TargetFix, n: usize) -> Self {
        Self::new(vec![ScriptFrame::Fix(fix); n])
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl DetectionSource for ScriptedSource {
    fn detect(&mut self) -> Result<Option<TargetFix>, AcquisitionError> {
        match self.frames.pop_front() {
            Some(ScriptFrame::Fix(fix)) => Ok(Some(fix)),
            Some(ScriptFrame::Empty) | None => Ok(None),
            Some(ScriptFrame::Fail(reason)) => Err(AcquisitionError::new(reason)),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_source_replays_then_runs_dry() {
        let fix = TargetFix { cx: 480.0, cy: 360.0, area: 10_000.0 };
        let mut source = ScriptedSource::new(vec![
            ScriptFrame::Fix(fix),
            ScriptFrame::Empty,
            ScriptFrame::Fail("stream stalled"),
        ]);

        assert_eq!(source.detect().unwrap(), Some(fix));
        assert_eq!(source.detect().unwrap(), None);
        let err = source.detect().unwrap_err();
        assert_eq!(err.reason, "stream stalled");

        // Exhausted scripts keep producing empty frames.
        assert_eq!(source.detect().unwrap(), None);
        assert_eq!(source.detect().unwrap(), None);
    }

    #[test]
    fn holding_repeats_the_fix() {
        let fix = TargetFix { cx: 100.0, cy: 200.0, area: 5_000.0 };
        let mut source = ScriptedSource::holding(fix, 3);
        for _ in 0..3 {
            assert_eq!(source.detect().unwrap(), Some(fix));
        }
        assert_eq!(source.detect().unwrap(), None);
    }
}
