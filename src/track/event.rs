use std::fmt;

use super::runner::{CycleRecord, TrackState};

// ---------------------------------------------------------------------------
// Session events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    /// The loop went from searching to tracking.
    Acquired,
    /// The loop went from tracking to searching.
    Lost,
    /// A loss gap of at least the configured length ended; `cycles` is how
    /// long the loop flew blind.
    Dropout { cycles: u64 },
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Acquired => write!(f, "target acquired"),
            EventKind::Lost => write!(f, "target lost"),
            EventKind::Dropout { cycles } => write!(f, "dropout ended ({} cycles blind)", cycles),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackEvent {
    pub kind: EventKind,
    pub cycle: u64,
    pub t: f64,
}

impl fmt::Display for TrackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[cycle {:>5}  t={:7.2}s] {}", self.cycle, self.t, self.kind)
    }
}

/// Stateful inspector run over a session's records in order.
pub trait EventDetector {
    fn check(&mut self, prev: Option<&CycleRecord>, current: &CycleRecord) -> Option<TrackEvent>;

    fn name(&self) -> &str {
        "unnamed detector"
    }
}

// ---------------------------------------------------------------------------
// Built-in detectors
// ---------------------------------------------------------------------------

/// Emits [`EventKind::Acquired`] and [`EventKind::Lost`] on state flips. A
/// session whose first record is already tracking counts as an acquisition.
#[derive(Debug, Default)]
pub struct TransitionDetector;

impl TransitionDetector {
    pub fn new() -> Self {
        Self
    }
}

impl EventDetector for TransitionDetector {
    fn check(&mut self, prev: Option<&CycleRecord>, current: &CycleRecord) -> Option<TrackEvent> {
        let before = prev.map_or(TrackState::Searching, |r| r.state);
        let kind = match (before, current.state) {
            (TrackState::Searching, TrackState::Tracking) => EventKind::Acquired,
            (TrackState::Tracking, TrackState::Searching) => EventKind::Lost,
            _ => return None,
        };
        Some(TrackEvent { kind, cycle: current.cycle, t: current.t })
    }

    fn name(&self) -> &str {
        "state transitions"
    }
}

/// Reports loss gaps of at least `min_cycles` once they end. The initial
/// search before the first acquisition is not a dropout.
#[derive(Debug)]
pub struct DropoutDetector {
    min_cycles: u64,
    streak: u64,
    armed: bool,
}

impl DropoutDetector {
    pub fn new(min_cycles: u64) -> Self {
        Self { min_cycles, streak: 0, armed: false }
    }
}

impl EventDetector for DropoutDetector {
    fn check(&mut self, _prev: Option<&CycleRecord>, current: &CycleRecord) -> Option<TrackEvent> {
        match current.state {
            TrackState::Searching => {
                if self.armed {
                    self.streak += 1;
                }
                None
            }
            TrackState::Tracking => {
                let gap = self.streak;
                self.streak = 0;
                self.armed = true;
                if gap >= self.min_cycles {
                    Some(TrackEvent {
                        kind: EventKind::Dropout { cycles: gap },
                        cycle: current.cycle,
                        t: current.t,
                    })
                } else {
                    None
                }
            }
        }
    }

    fn name(&self) -> &str {
        "dropout gaps"
    }
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

/// Run every detector over the records in order and collect what fired.
pub fn scan(records: &[CycleRecord], detectors: &mut [Box<dyn EventDetector>]) -> Vec<TrackEvent> {
    let mut events = Vec::new();
    let mut prev: Option<&CycleRecord> = None;
    for record in records {
        for detector in detectors.iter_mut() {
            if let Some(event) = detector.check(prev, record) {
                events.push(event);
            }
        }
        prev = Some(record);
    }
    events
}

/// The detector set most sessions want: transitions plus dropout gaps.
pub fn standard_detectors(min_dropout: u64) -> Vec<Box<dyn EventDetector>> {
    vec![
        Box::new(TransitionDetector::new()),
        Box::new(DropoutDetector::new(min_dropout)),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuate::RcCommand;

    fn rec(cycle: u64, state: TrackState) -> CycleRecord {
        CycleRecord {
            cycle,
            t: cycle as f64 * 0.1,
            state,
            error: None,
            command: RcCommand::neutral(),
        }
    }

    fn records(states: &[TrackState]) -> Vec<CycleRecord> {
        states
            .iter()
            .enumerate()
            .map(|(i, &s)| rec(i as u64, s))
            .collect()
    }

    #[test]
    fn transitions_mark_acquire_and_loss() {
        use TrackState::{Searching as S, Tracking as T};
        let recs = records(&[S, S, T, T, S, S, T]);
        let mut detectors: Vec<Box<dyn EventDetector>> = vec![Box::new(TransitionDetector::new())];
        let events = scan(&recs, &mut detectors);

        assert_eq!(events.len(), 3);
        assert_eq!((events[0].kind, events[0].cycle), (EventKind::Acquired, 2));
        assert_eq!((events[1].kind, events[1].cycle), (EventKind::Lost, 4));
        assert_eq!((events[2].kind, events[2].cycle), (EventKind::Acquired, 6));
    }

    #[test]
    fn immediate_tracking_counts_as_acquisition() {
        use TrackState::{Searching as S, Tracking as T};
        let recs = records(&[T, S]);
        let mut detectors: Vec<Box<dyn EventDetector>> = vec![Box::new(TransitionDetector::new())];
        let events = scan(&recs, &mut detectors);

        assert_eq!(events[0].kind, EventKind::Acquired);
        assert_eq!(events[0].cycle, 0);
        assert_eq!(events[1].kind, EventKind::Lost);
    }

    #[test]
    fn dropout_reports_gap_length_when_it_ends() {
        use TrackState::{Searching as S, Tracking as T};
        let recs = records(&[T, S, S, S, S, S, S, T]);
        let mut detectors: Vec<Box<dyn EventDetector>> = vec![Box::new(DropoutDetector::new(5))];
        let events = scan(&recs, &mut detectors);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Dropout { cycles: 6 });
        assert_eq!(events[0].cycle, 7, "fires on the reacquire record");
    }

    #[test]
    fn short_gaps_and_initial_search_stay_quiet() {
        use TrackState::{Searching as S, Tracking as T};
        // Leading search is not a loss, and a 2-cycle blink is under the bar.
        let recs = records(&[S, S, S, S, T, S, S, T]);
        let mut detectors: Vec<Box<dyn EventDetector>> = vec![Box::new(DropoutDetector::new(3))];
        let events = scan(&recs, &mut detectors);

        assert!(events.is_empty());
    }
}
