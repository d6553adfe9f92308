//! Record types produced by the scraping workflow.

mod ad;

pub use ad::{AdData, AdDataBuilder, AdPosition};
