use serde::Serialize;

use crate::models::Session;

/// Two sessions that overlap in time on the same date. `first` precedes `second`
/// in the input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionConflict {
    pub first: Session,
    pub second: Session,
}

/// Every unordered overlapping pair. Quadratic, which is fine for one course's term.
pub fn find_conflicts(sessions: &[Session]) -> Vec<SessionConflict> {
    let mut conflicts = Vec::new();
    for (i, a) in sessions.iter().enumerate() {
        for b in &sessions[i + 1..] {
            if a.overlaps(b) {
                conflicts.push(SessionConflict {
                    first: a.clone(),
                    second: b.clone(),
                });
            }
        }
    }
    conflicts
}

/// Conflicts between `candidate` and `existing`, ignoring an existing session with the
/// same id (the one being edited).
pub fn find_conflicts_with(existing: &[Session], candidate: &Session) -> Vec<SessionConflict> {
    existing
        .iter()
        .filter(|s| s.id != candidate.id && s.overlaps(candidate))
        .map(|s| SessionConflict {
            first: s.clone(),
            second: candidate.clone(),
        })
        .collect()
}
