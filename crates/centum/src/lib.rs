#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/centum/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod service;
pub mod settings;
pub mod universe;

// Re-export main types from sub-crates
pub use centum_data as data;
pub use centum_index as index;
pub use centum_output as output;

pub use error::{Error, Result};
pub use service::IndexService;
pub use settings::Settings;
pub use universe::{SeedUniverse, Universe};

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
