//! Yahoo Finance data providers.

pub mod profile;
pub mod quotes;

pub use profile::{TickerProfile, YahooProfileProvider};
pub use quotes::YahooQuoteProvider;
