pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod infra;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod strategies;
pub mod telemetry;
pub mod types;

pub use error::{FetchError, Result};
pub use normalize::JobNormalizer;
pub use pipeline::{FetchOrchestrator, JobFetcher, OperationContext};
pub use strategies::FetchStrategy;
pub use telemetry::{MetricsTelemetry, Telemetry, TelemetryHandle};
pub use types::{FetchConfig, FetchResult, JobSource, NormalizedRecord, RawRecord};
