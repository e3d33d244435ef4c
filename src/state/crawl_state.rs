use crate::state::CrawlPhase;
use crate::HarvestError;
use chrono::{DateTime, Utc};

/// Tracks a single crawl invocation
///
/// Owned by the orchestrator's consumer loop, so none of the counters need
/// synchronization: fan-out workers only ever hand their outcome over a channel.
#[derive(Debug, Clone)]
pub struct CrawlState {
    /// Current phase
    pub phase: CrawlPhase,

    /// Listing pages fetched (successfully or not)
    pub pages_walked: u32,

    /// Product URLs handed to the detail fan-out
    pub urls_discovered: usize,

    /// Detail fetches that have settled
    pub details_completed: usize,

    /// Detail fetches that produced a record
    pub records_kept: usize,

    pub started_at: DateTime<Utc>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self {
            phase: CrawlPhase::Idle,
            pages_walked: 0,
            urls_discovered: 0,
            details_completed: 0,
            records_kept: 0,
            started_at: Utc::now(),
        }
    }

    /// Moves to the next phase, rejecting edges the pipeline does not allow
    pub fn transition(&mut self, next: CrawlPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::debug!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Records one settled detail fetch and returns the new progress fraction
    ///
    /// The fraction is `completed / discovered`, so the final call returns
    /// exactly 1.0.
    pub fn record_completion(&mut self, kept: bool) -> f64 {
        self.details_completed += 1;
        if kept {
            self.records_kept += 1;
        }
        self.progress()
    }

    /// Fraction of discovered URLs whose detail fetch has settled
    pub fn progress(&self) -> f64 {
        if self.urls_discovered == 0 {
            return 0.0;
        }
        (self.details_completed as f64 / self.urls_discovered as f64).min(1.0)
    }
}

impl Default for CrawlState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_idle() {
        let state = CrawlState::new();
        assert_eq!(state.phase, CrawlPhase::Idle);
        assert_eq!(state.progress(), 0.0);
    }

    #[test]
    fn test_transition_rejects_skipped_phase() {
        let mut state = CrawlState::new();
        let result = state.transition(CrawlPhase::Aggregating);
        assert!(matches!(
            result,
            Err(HarvestError::InvalidTransition {
                from: CrawlPhase::Idle,
                to: CrawlPhase::Aggregating
            })
        ));
        assert_eq!(state.phase, CrawlPhase::Idle);
    }

    #[test]
    fn test_progress_reaches_exactly_one() {
        let mut state = CrawlState::new();
        state.urls_discovered = 3;

        let values: Vec<f64> = [true, false, true]
            .into_iter()
            .map(|kept| state.record_completion(kept))
            .collect();

        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*values.last().unwrap(), 1.0);
        assert_eq!(state.records_kept, 2);
        assert_eq!(state.details_completed, 3);
    }
}
