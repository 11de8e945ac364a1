use thiserror::Error;

use crate::model::{StopId, Time, TripId};

#[derive(Error, Debug, PartialEq)]
pub enum RaptorError {
    #[error("invalid departure time")]
    InvalidTime,
    #[error("label references data missing from the index")]
    InvalidJourney,
}

/// How a round label was reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Via {
    /// Round-0 walk from the query origin.
    Seed,
    /// Rode `trip`, boarded at `from`.
    Boarded { trip: TripId, from: StopId },
    /// Walked a footpath from `from` within the same round.
    Walked { from: StopId },
}

#[derive(Debug, Clone, Copy)]
pub struct Label {
    pub arrival: Time,
    pub via: Via,
}

/// Per-seed search state: one label map per round plus the star labels.
#[derive(Debug)]
pub struct RaptorLabels {
    /// `rounds[k][stop]` is the best arrival found with exactly the round-k
    /// effort, if the stop improved in that round.
    pub rounds: Vec<Vec<Option<Label>>>,
    /// Best arrival per stop across all rounds, `Time::MAX` when unreached.
    pub best: Vec<Time>,
}

impl RaptorLabels {
    pub(crate) fn new(num_stops: usize, max_rounds: usize) -> Self {
        Self {
            rounds: vec![vec![None; num_stops]; max_rounds + 1],
            best: vec![Time::MAX; num_stops],
        }
    }

    /// Record an improvement: callers check `label.arrival < best[stop]`
    /// first, so the star label always tracks the round labels.
    pub(crate) fn improve(&mut self, round: usize, stop: StopId, label: Label) {
        self.best[stop] = label.arrival;
        self.rounds[round][stop] = Some(label);
    }
}
