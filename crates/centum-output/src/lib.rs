#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/centum/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod summary;

pub use export::{
    ChangeKind, ChangeRecord, CompositionRecord, ExportError, ExportFormat, Exporter, IndexExport,
    PerformanceRecord,
};
pub use summary::{DayReturn, PerformanceSummary};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
