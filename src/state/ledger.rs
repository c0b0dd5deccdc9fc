use crate::state::UnitState;
use std::collections::BTreeMap;

/// Per-run record of every unit's latest state, keyed by output filename
#[derive(Debug, Clone, Default)]
pub struct CrawlLedger {
    units: BTreeMap<String, UnitState>,
    failures: BTreeMap<String, String>,
}

impl CrawlLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves `unit` to `state`
    ///
    /// Terminal states are final; later updates for the same unit are ignored.
    pub fn record(&mut self, unit: &str, state: UnitState) {
        match self.units.get_mut(unit) {
            Some(current) if current.is_terminal() => {}
            Some(current) => *current = state,
            None => {
                self.units.insert(unit.to_string(), state);
            }
        }
    }

    /// Marks `unit` failed with a cause for the report
    pub fn fail(&mut self, unit: &str, cause: impl Into<String>) {
        self.record(unit, UnitState::Failed);
        if self.state(unit) == Some(UnitState::Failed) {
            self.failures
                .entry(unit.to_string())
                .or_insert_with(|| cause.into());
        }
    }

    pub fn state(&self, unit: &str) -> Option<UnitState> {
        self.units.get(unit).copied()
    }

    /// Number of units whose current state matches `predicate`
    pub fn count(&self, predicate: impl Fn(UnitState) -> bool) -> usize {
        self.units.values().filter(|s| predicate(**s)).count()
    }

    /// Permanent failures in filename order
    pub fn failures(&self) -> Vec<(String, String)> {
        self.failures
            .iter()
            .map(|(unit, cause)| (unit.clone(), cause.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
