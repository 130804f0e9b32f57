//! Per-unit outcomes of a migrate or rollback run.

use std::fmt;

/// How a unit fared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// The unit ran to completion.
    Success,
    /// The unit failed; the batch stopped here.
    Failure,
    /// Nothing had to be done.
    Noop,
}

/// Result of one attempted unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// How the unit fared.
    pub status: OutcomeStatus,
    /// Hash of the unit, when there was one.
    pub hash: Option<String>,
    /// Human-readable message.
    pub message: String,
}

impl Outcome {
    /// A successful unit.
    #[must_use]
    pub fn success(hash: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Success,
            hash: Some(hash.into()),
            message: message.into(),
        }
    }

    /// A failed unit.
    #[must_use]
    pub fn failure(hash: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failure,
            hash: Some(hash.into()),
            message: message.into(),
        }
    }

    /// Nothing to do.
    #[must_use]
    pub fn noop(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Noop,
            hash: None,
            message: message.into(),
        }
    }

    /// Returns whether the unit failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status == OutcomeStatus::Failure
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.status {
            OutcomeStatus::Success => "[OK]",
            OutcomeStatus::Failure => "[FAIL]",
            OutcomeStatus::Noop => "[--]",
        };
        write!(f, "{tag} {}", self.message)
    }
}

/// Ordered outcomes of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    outcomes: Vec<Outcome>,
}

impl MigrationReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the outcome of the next unit.
    pub fn push(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    /// Outcomes in the order the units were attempted.
    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// True when no outcome failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.has_failure()
    }

    /// True when some outcome failed.
    #[must_use]
    pub fn has_failure(&self) -> bool {
        self.outcomes.iter().any(Outcome::is_failure)
    }

    /// Number of outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns whether no unit was attempted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl IntoIterator for MigrationReport {
    type Item = Outcome;
    type IntoIter = std::vec::IntoIter<Outcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(f, "{outcome}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display() {
        let mut report = MigrationReport::new();
        report.push(Outcome::success("20240101000000", "applied"));
        report.push(Outcome::failure("20240102000000", "broke\nDatabase error"));

        assert!(report.has_failure());
        assert_eq!(report.len(), 2);
        assert_eq!(
            report.to_string(),
            "[OK] applied\n[FAIL] broke\nDatabase error\n"
        );
    }

    #[test]
    fn test_noop_is_not_a_failure() {
        let mut report = MigrationReport::new();
        report.push(Outcome::noop("There's no migration to roll back"));

        assert!(report.is_success());
        assert_eq!(report.outcomes()[0].hash, None);
    }
}
