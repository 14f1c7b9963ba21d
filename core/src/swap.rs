//! Swap executor.
//!
//! Exchanges the two shift labels and takes a flat decrement off the
//! high-stress side's score. This does not re-run the scorer: a shift change
//! never feeds back into the six raw metrics.

use crate::{employee::EmployeeRecord, scoring::StressScorer};

pub struct SwapExecutor<'a> {
    scorer: &'a StressScorer,
    decrement: f64,
}

impl<'a> SwapExecutor<'a> {
    pub fn new(scorer: &'a StressScorer, decrement: f64) -> Self {
        Self { scorer, decrement }
    }

    /// `high` is the critical side and takes the decrement (floored at 0);
    /// `low` keeps its score. Both are reclassified before returning.
    pub fn apply(&self, high: &mut EmployeeRecord, low: &mut EmployeeRecord) {
        std::mem::swap(&mut high.shift, &mut low.shift);

        let reduced = (high.stress_score() - self.decrement).max(0.0);
        high.set_stress_score(reduced, self.scorer);
        let unchanged = low.stress_score();
        low.set_stress_score(unchanged, self.scorer);

        log::debug!(
            "Swapped {} <-> {}: {} now {:.2} ({})",
            high.employee_id,
            low.employee_id,
            high.employee_id,
            high.stress_score(),
            high.stress_level()
        );
    }
}
