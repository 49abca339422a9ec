pub mod announcement;
pub mod config;
pub mod http;
pub mod metrics_server;
pub mod observability;
pub mod report;
pub mod schedule_source;
pub mod sources;

pub use sources::{EventSource, SourceError};
