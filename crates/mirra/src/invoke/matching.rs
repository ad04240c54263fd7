// -----------------------------------------------------------------------------
// MatchLevel

/// How strictly a discovery query matches a candidate name.
///
/// Levels are ordered loosest to strictest; every level admits at least what
/// the next stricter one does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum MatchLevel {
    /// Every candidate matches, regardless of the query.
    Any = 0,
    /// Candidate contains the query, case-insensitive.
    ContainsCi = 1,
    /// Candidate contains the query, case-sensitive.
    ContainsCs = 2,
    /// Candidate starts with the query, case-insensitive.
    PrefixCi = 3,
    /// Candidate starts with the query, case-sensitive.
    PrefixCs = 4,
    /// Exact match, case-insensitive.
    ExactCi = 5,
    /// Exact match, case-sensitive.
    ExactCs = 6,
}

impl MatchLevel {
    /// Whether `candidate` satisfies `query` at this level.
    pub fn admits(self, candidate: &str, query: &str) -> bool {
        match self {
            MatchLevel::Any => true,
            MatchLevel::ContainsCi => {
                candidate.to_lowercase().contains(&query.to_lowercase())
            }
            MatchLevel::ContainsCs => candidate.contains(query),
            MatchLevel::PrefixCi => {
                candidate.to_lowercase().starts_with(&query.to_lowercase())
            }
            MatchLevel::PrefixCs => candidate.starts_with(query),
            MatchLevel::ExactCi => candidate.eq_ignore_ascii_case(query),
            MatchLevel::ExactCs => candidate == query,
        }
    }
}

impl TryFrom<u8> for MatchLevel {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        Ok(match value {
            0 => MatchLevel::Any,
            1 => MatchLevel::ContainsCi,
            2 => MatchLevel::ContainsCs,
            3 => MatchLevel::PrefixCi,
            4 => MatchLevel::PrefixCs,
            5 => MatchLevel::ExactCi,
            6 => MatchLevel::ExactCs,
            other => return Err(other),
        })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_tighten_monotonically() {
        // `Process` queried against `ProcessAll`.
        let candidate = "ProcessAll";
        assert!(MatchLevel::Any.admits(candidate, "zzz"));
        assert!(MatchLevel::ContainsCi.admits(candidate, "process"));
        assert!(MatchLevel::ContainsCs.admits(candidate, "Process"));
        assert!(!MatchLevel::ContainsCs.admits(candidate, "process"));
        assert!(MatchLevel::PrefixCs.admits(candidate, "Process"));
        assert!(!MatchLevel::ExactCi.admits(candidate, "Process"));
        assert!(MatchLevel::ExactCi.admits("PROCESS", "Process"));
        assert!(!MatchLevel::ExactCs.admits("PROCESS", "Process"));
        assert!(MatchLevel::ExactCs.admits("Process", "Process"));
    }

    #[test]
    fn numeric_conversion() {
        assert_eq!(MatchLevel::try_from(6), Ok(MatchLevel::ExactCs));
        assert_eq!(MatchLevel::try_from(7), Err(7));
    }
}
