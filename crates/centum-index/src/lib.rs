#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/centum/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod differ;
pub mod error;
pub mod query;
pub mod ranker;
pub mod returns;
pub mod snapshot;
pub mod weights;

pub use builder::{BuildPhase, BuildReport, IndexBuilder};
pub use differ::CompositionChange;
pub use error::{IndexError, PartialDataWarning, Result};
pub use ranker::{MAX_CONSTITUENTS, UniverseRanker};
pub use snapshot::{IndexLedger, MarketSnapshot};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
