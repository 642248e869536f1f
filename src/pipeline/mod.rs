// Fetch pipeline: per-call context, strategy fallback, and the public entry point

pub mod context;
pub mod fetcher;
pub mod orchestrator;

pub use context::OperationContext;
pub use fetcher::JobFetcher;
pub use orchestrator::FetchOrchestrator;
