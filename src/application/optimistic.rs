//! Optimistic update with rollback
//!
//! Snapshot, apply the expected state, run the mutation, restore the snapshot
//! if the mutation did not succeed.

use tracing::debug;

use crate::domain::MutationResult;

/// Outcome of a mutation call that may require rollback.
pub trait MutationOutcome {
    fn succeeded(&self) -> bool;
}

impl MutationOutcome for MutationResult {
    fn succeeded(&self) -> bool {
        self.success
    }
}

impl<T, E> MutationOutcome for Result<T, E> {
    fn succeeded(&self) -> bool {
        self.is_ok()
    }
}

/// Apply `optimistic` to `state`, run `call`, and roll back on failure.
///
/// The snapshot is restored exactly, so any partial change made by
/// `optimistic` disappears when the mutation fails.
pub fn attempt<S, R>(
    state: &mut S,
    optimistic: impl FnOnce(&mut S),
    call: impl FnOnce() -> R,
) -> R
where
    S: Clone,
    R: MutationOutcome,
{
    let snapshot = state.clone();
    optimistic(state);
    let outcome = call();
    if !outcome.succeeded() {
        debug!("mutation failed, rolling back optimistic update");
        *state = snapshot;
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_keeps_optimistic_state() {
        let mut state = vec![1, 2];
        let result = attempt(&mut state, |s| s.push(3), MutationResult::ok);
        assert!(result.success);
        assert_eq!(state, vec![1, 2, 3]);
    }

    #[test]
    fn test_failure_restores_snapshot() {
        let mut state = vec![1, 2];
        let result = attempt(
            &mut state,
            |s| {
                s.clear();
                s.push(9);
            },
            || MutationResult::failed("network down"),
        );
        assert!(!result.success);
        assert_eq!(state, vec![1, 2]);
    }

    #[test]
    fn test_result_outcome_rolls_back_on_err() {
        let mut state = String::from("before");
        let result: Result<(), String> = attempt(
            &mut state,
            |s| *s = "after".into(),
            || Err("boom".to_string()),
        );
        assert!(result.is_err());
        assert_eq!(state, "before");
    }
}
