// -----------------------------------------------------------------------------
// PopulateReport

/// What happened to one incoming member during a populate walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopulateOutcome {
    /// The member was written into the target.
    Applied,
    /// The member exists but is declared read-only.
    MemberNotWritable,
    /// The target type has no member with that name.
    UnknownMember,
    /// The visibility filter excluded the member.
    Filtered,
    /// Applying the member failed; the reason is attached.
    Failed(String),
}

impl PopulateOutcome {
    /// Whether this outcome counts against overall success.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            PopulateOutcome::MemberNotWritable | PopulateOutcome::Failed(_)
        )
    }
}

/// Per-member log of a populate walk.
///
/// Populate never aborts on a bad member; it records the outcome here and
/// keeps walking, so a caller can tell exactly which parts of the document
/// landed.
#[derive(Debug, Default)]
pub struct PopulateReport {
    entries: Vec<(String, PopulateOutcome)>,
}

impl PopulateReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome for the member at `path`.
    pub fn record(&mut self, path: String, outcome: PopulateOutcome) {
        self.entries.push((path, outcome));
    }

    /// All recorded `(path, outcome)` pairs, in walk order.
    pub fn entries(&self) -> &[(String, PopulateOutcome)] {
        &self.entries
    }

    /// The outcome recorded for `path`, if any.
    pub fn outcome_of(&self, path: &str) -> Option<&PopulateOutcome> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, outcome)| outcome)
    }

    /// Whether every incoming member was applied.
    pub fn is_complete(&self) -> bool {
        !self.entries.iter().any(|(_, outcome)| outcome.is_failure())
    }

    /// The entries that count as failures.
    pub fn failures(&self) -> impl Iterator<Item = &(String, PopulateOutcome)> {
        self.entries.iter().filter(|(_, outcome)| outcome.is_failure())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_are_tracked() {
        let mut report = PopulateReport::new();
        report.record("#/name".to_owned(), PopulateOutcome::Applied);
        assert!(report.is_complete());

        report.record("#/status".to_owned(), PopulateOutcome::MemberNotWritable);
        assert!(!report.is_complete());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(
            report.outcome_of("#/status"),
            Some(&PopulateOutcome::MemberNotWritable)
        );
    }
}
