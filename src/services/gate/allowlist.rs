//! Lazily initialized allowlist shared by every request of the process.
//!
//! The set is computed on first use and published once. A failed load is not
//! cached: the next request reads the source again, so fixing the environment
//! of a long-lived process does not require a restart.

use std::fmt;
use std::sync::OnceLock;

use super::domain::AllowedDomainSet;

/// Where the raw comma-separated domain list comes from.
pub trait DomainSource: Send + Sync {
    /// Raw list, or `None` when not configured.
    fn load(&self) -> Option<String>;
}

/// Fixed list, for tests.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct StaticDomainSource(pub Option<String>);

#[cfg(test)]
impl DomainSource for StaticDomainSource {
    fn load(&self) -> Option<String> {
        self.0.clone()
    }
}

pub struct DomainAllowlist {
    source: Box<dyn DomainSource>,
    cell: OnceLock<AllowedDomainSet>,
}

impl fmt::Debug for DomainAllowlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainAllowlist")
            .field("domains", &self.cell.get())
            .finish()
    }
}

impl DomainAllowlist {
    pub fn new(source: impl DomainSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cell: OnceLock::new(),
        }
    }

    /// Return the published set, loading it first if needed.
    ///
    /// `None` means the source is missing or holds no usable domain.
    pub fn get(&self) -> Option<&AllowedDomainSet> {
        if let Some(set) = self.cell.get() {
            return Some(set);
        }

        let set = AllowedDomainSet::parse(&self.source.load()?)?;
        // Losing a race is fine: both sides parsed the same source.
        if self.cell.set(set).is_ok()
            && let Some(set) = self.cell.get()
        {
            tracing::info!(domains = %set, "allowed domains loaded");
        }
        self.cell.get()
    }
}
