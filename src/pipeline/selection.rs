//! Which task indices a run processes.

use std::collections::BTreeSet;

use tracing::warn;

use crate::domain::Domain;

/// Selection policy, evaluated once per task index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSelection {
    /// Process exactly these indices.
    Explicit(BTreeSet<usize>),
    /// Process everything except the denylisted indices.
    AllExcept(BTreeSet<usize>),
}

impl TaskSelection {
    /// Explicit indices when any were given, otherwise the domain's default.
    pub fn for_domain(domain: Domain, indices: Option<&[usize]>) -> Self {
        match indices {
            Some(indices) => Self::Explicit(indices.iter().copied().collect()),
            None => Self::AllExcept(domain.default_denylist().iter().copied().collect()),
        }
    }

    pub fn should_process(&self, index: usize) -> bool {
        match self {
            Self::Explicit(indices) => indices.contains(&index),
            Self::AllExcept(denylist) => !denylist.contains(&index),
        }
    }

    /// Selected indices in ascending order for a list of `len` tasks.
    ///
    /// Explicit indices past the end of the list are reported and dropped.
    pub fn resolve(&self, len: usize) -> Vec<usize> {
        if let Self::Explicit(indices) = self {
            for &index in indices.range(len..) {
                warn!(task_index = index, total = len, "Ignoring task index out of range");
            }
        }
        (0..len).filter(|&i| self.should_process(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_selection() {
        let selection = TaskSelection::for_domain(Domain::Airline, Some(&[5, 1]));
        assert!(selection.should_process(5));
        assert!(selection.should_process(1));
        assert!(!selection.should_process(0));
        assert_eq!(selection.resolve(10), vec![1, 5]);
    }

    #[test]
    fn test_explicit_selection_overrides_denylist() {
        let selection = TaskSelection::for_domain(Domain::Airline, Some(&[9]));
        assert_eq!(selection.resolve(50), vec![9]);
    }

    #[test]
    fn test_airline_default_skips_denylist() {
        let selection = TaskSelection::for_domain(Domain::Airline, None);
        let selected = selection.resolve(50);
        for index in Domain::Airline.default_denylist() {
            assert!(!selected.contains(index));
        }
        assert_eq!(selected.len(), 50 - Domain::Airline.default_denylist().len());
        assert!(selected.contains(&0));
    }

    #[test]
    fn test_retail_default_selects_everything() {
        let selection = TaskSelection::for_domain(Domain::Retail, None);
        assert_eq!(selection.resolve(4), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_out_of_range_indices_are_dropped() {
        let selection = TaskSelection::for_domain(Domain::Retail, Some(&[2, 7, 100]));
        assert_eq!(selection.resolve(3), vec![2]);
    }

    #[test]
    fn test_empty_explicit_selection() {
        let selection = TaskSelection::for_domain(Domain::Retail, Some(&[]));
        assert!(selection.resolve(3).is_empty());
    }
}
