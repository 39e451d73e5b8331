/*
 * Request sequencing: last-requested-wins for in-flight backend reads
 */

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one quote/sync request. Tickets are monotonically
/// increasing; a ticket is current until a newer one is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Verdict on committing a finished request's result to display state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Applied,
    /// A newer request was issued while this one was in flight; its
    /// result must be discarded, never displayed.
    Superseded,
}

/// Coalesces concurrent reads without cancelling them: every request takes
/// a ticket before suspending, and checks it on completion. Only the most
/// recently issued ticket may commit, so a stale response arriving late
/// can never overwrite a newer result. There is a single logical writer
/// (the holder of the newest ticket); no lock is needed.
#[derive(Debug, Default)]
pub struct SequenceGate {
    issued: AtomicU64,
}

impl SequenceGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[must_use]
    pub fn commit(&self, ticket: Ticket) -> Commit {
        if ticket.0 == self.issued.load(Ordering::SeqCst) {
            Commit::Applied
        } else {
            Commit::Superseded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_ticket_commits() {
        let gate = SequenceGate::new();
        let ticket = gate.issue();
        assert_eq!(gate.commit(ticket), Commit::Applied);
    }

    #[test]
    fn stale_ticket_is_superseded() {
        let gate = SequenceGate::new();
        let first = gate.issue();
        let second = gate.issue();

        // Request #1 resolves after #2 was issued: discard it.
        assert_eq!(gate.commit(first), Commit::Superseded);
        assert_eq!(gate.commit(second), Commit::Applied);
    }

    #[test]
    fn commit_is_idempotent_until_next_issue() {
        let gate = SequenceGate::new();
        let ticket = gate.issue();
        assert_eq!(gate.commit(ticket), Commit::Applied);
        assert_eq!(gate.commit(ticket), Commit::Applied);

        let newer = gate.issue();
        assert_eq!(gate.commit(ticket), Commit::Superseded);
        assert_eq!(gate.commit(newer), Commit::Applied);
    }

    #[test]
    fn tickets_are_strictly_increasing() {
        let gate = SequenceGate::new();
        let a = gate.issue();
        let b = gate.issue();
        let c = gate.issue();
        assert!(a < b && b < c);
    }
}
