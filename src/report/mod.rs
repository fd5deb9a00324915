// Appointment aggregation and enrichment pipeline.

pub mod dates;
pub mod enrich;
pub mod filter;
pub mod pdf;
pub mod resolve;
pub mod stats;
