//! Benchmark domains and their artifacts.
//!
//! Each [`Domain`] is statically linked to a tool catalog and a set of data
//! tables. The [`DomainRegistry`] pairs that with the on-disk artifacts
//! found under a data root:
//!
//! ```text
//! <data_root>/<domain>/tasks.json          ordered task list
//! <data_root>/<domain>/wiki.md             policy text
//! <data_root>/<domain>/data/<table>.json   one file per data table
//! ```

pub mod airline;
pub mod common;
pub mod data;
pub mod registry;
pub mod retail;
pub mod tool;

pub use data::{DataLoader, DomainData};
pub use registry::{DomainModule, DomainRegistry};
pub use tool::{Tool, ToolCatalog};

use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// The closed set of supported benchmark domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Airline,
    Retail,
}

impl Domain {
    pub const ALL: [Domain; 2] = [Domain::Airline, Domain::Retail];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Airline => "airline",
            Domain::Retail => "retail",
        }
    }

    /// Tools the domain exposes, in catalog order.
    pub fn tool_catalog(&self) -> ToolCatalog {
        match self {
            Domain::Airline => airline::catalog(),
            Domain::Retail => retail::catalog(),
        }
    }

    /// Data tables a snapshot of this domain consists of.
    pub fn tables(&self) -> &'static [&'static str] {
        match self {
            Domain::Airline => airline::TABLES,
            Domain::Retail => retail::TABLES,
        }
    }

    /// Task indices skipped when no explicit selection is given.
    pub fn default_denylist(&self) -> &'static [usize] {
        match self {
            Domain::Airline => airline::DEFAULT_DENYLIST,
            Domain::Retail => &[],
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "airline" => Ok(Domain::Airline),
            "retail" => Ok(Domain::Retail),
            other => Err(DomainError::UnknownDomain(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_round_trips_through_str() {
        for domain in Domain::ALL {
            assert_eq!(domain.as_str().parse::<Domain>().unwrap(), domain);
            assert_eq!(domain.to_string(), domain.as_str());
        }
    }

    #[test]
    fn test_unknown_domain() {
        let err = "Retail".parse::<Domain>().unwrap_err();
        assert!(matches!(err, DomainError::UnknownDomain(name) if name == "Retail"));
    }

    #[test]
    fn test_catalog_tools_are_named_and_described() {
        for domain in Domain::ALL {
            let catalog = domain.tool_catalog();
            let mut names = std::collections::HashSet::new();
            for tool in &catalog {
                assert!(names.insert(tool.name()), "{} declared twice in {}", tool.name(), domain);
                assert!(
                    !tool.description().trim().is_empty(),
                    "{} has no description",
                    tool.name()
                );
            }
            assert!(names.contains("calculate"), "{} lacks calculate", domain);
        }
    }

    #[test]
    fn test_only_airline_has_denylist() {
        assert!(!Domain::Airline.default_denylist().is_empty());
        assert!(Domain::Retail.default_denylist().is_empty());
    }
}
