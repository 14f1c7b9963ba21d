//! The in-memory collection of employee records for one session.

use crate::{
    employee::EmployeeRecord,
    error::{MindError, MindResult},
    scoring::StressLevel,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingSet {
    records: Vec<EmployeeRecord>,
}

impl WorkingSet {
    pub fn new(records: Vec<EmployeeRecord>) -> Self {
        Self { records }
    }

    /// Replace the whole set. Ingest never merges.
    pub fn replace(&mut self, records: Vec<EmployeeRecord>) {
        self.records = records;
    }

    pub fn records(&self) -> &[EmployeeRecord] {
        &self.records
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut EmployeeRecord> {
        self.records.iter_mut()
    }

    pub fn find(&self, employee_id: &str) -> Option<&EmployeeRecord> {
        self.records.iter().find(|e| e.employee_id == employee_id)
    }

    pub fn count_level(&self, level: StressLevel) -> usize {
        self.records.iter().filter(|e| e.is_level(level)).count()
    }

    fn position(&self, employee_id: &str) -> MindResult<usize> {
        self.records
            .iter()
            .position(|e| e.employee_id == employee_id)
            .ok_or_else(|| MindError::EmployeeNotFound { employee_id: employee_id.to_string() })
    }

    /// Mutable access to two distinct records at once.
    pub fn pair_mut(
        &mut self,
        first_id: &str,
        second_id: &str,
    ) -> MindResult<(&mut EmployeeRecord, &mut EmployeeRecord)> {
        let i = self.position(first_id)?;
        let j = self.position(second_id)?;
        if i == j {
            return Err(MindError::InvalidSwap { employee_id: first_id.to_string() });
        }
        if i < j {
            let (left, right) = self.records.split_at_mut(j);
            Ok((&mut left[i], &mut right[0]))
        } else {
            let (left, right) = self.records.split_at_mut(i);
            Ok((&mut right[0], &mut left[j]))
        }
    }
}
