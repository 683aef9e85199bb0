//! Operations and observability.
//!
//! - [`observability`] - In-process counters and latency histograms

pub mod observability;
