#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/centum/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod ingest;
pub mod model;
pub mod store;
pub mod yahoo;

pub use error::{DataError, Result};
pub use ingest::{IngestOptions, IngestSummary};
pub use model::{ConstituentWeight, IndexDay, PerformanceRow, PricePoint, Ticker};
pub use store::{BuildLock, SqliteStore, StoreStats};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
