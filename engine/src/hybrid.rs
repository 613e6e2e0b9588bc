//! Backend selection by estimated volume

use std::fmt;

use crate::error::Result;

/// Execution backend for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Fetch every row, then filter, sort and page in process
    Memory,
    /// Count and page in the database
    Relational,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Memory => "memory",
            Backend::Relational => "relational",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Chooses a backend from a row count estimate
#[derive(Debug, Clone, Copy)]
pub struct HybridSelector {
    threshold: u64,
}

impl HybridSelector {
    pub fn new(threshold: u64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Tables at or under the threshold go to memory; a failed estimate goes relational
    pub fn select(&self, estimate: Result<u64>) -> Backend {
        match estimate {
            Ok(rows) if rows <= self.threshold => Backend::Memory,
            Ok(_) => Backend::Relational,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Row count estimate unavailable, using relational backend"
                );
                Backend::Relational
            }
        }
    }
}
