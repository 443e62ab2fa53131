use serde::{Deserialize, Serialize};

/// Summary of a rating reconciliation pass.
///
/// Counts how many stored counters disagreed with the values recomputed
/// from the votes and were rewritten.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReconcileReport {
    pub entities_corrected: u64,
    pub users_corrected: u64,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.entities_corrected == 0 && self.users_corrected == 0
    }
}
