//! SLA evaluation engine: turns a batch of JTL samples into a [`report::Verdict`].
//!
//! Everything here is synchronous and side-effect free apart from `tracing` output.
//! Latencies are buffered per group, so inputs are expected to be bounded load-test logs.

pub mod aggregate;
pub mod breach;
pub mod ingest;
pub mod percentile;
pub mod rank;
pub mod report;

pub use aggregate::{aggregate, Aggregation, StatBundle, Window};
pub use breach::{evaluate, Breach};
pub use ingest::{ingest, Ingested, MalformedSample, SampleField};
pub use percentile::percentile;
pub use rank::{rank, LabelRanking};
pub use report::{assess, TrackedOutcome, Verdict};
