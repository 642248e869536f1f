use super::context::OperationContext;
use crate::app::ports::HttpClientPort;
use crate::constants::{FETCH_PHASE, STATUS_ALL_FAILED, STATUS_STRATEGY_FAILED, STATUS_SUCCESS};
use crate::error::FetchError;
use crate::normalize::JobNormalizer;
use crate::strategies::FetchStrategy;
use crate::telemetry::{attr, TelemetryHandle};
use crate::types::{FetchConfig, FetchResult, JobSource, RawRecord};
use tracing::{error, field, info, info_span, warn, Instrument, Span};

/// Drives an ordered strategy list to exactly one `FetchResult`.
///
/// Strategies run one at a time in the order given. The first success is
/// normalized and returned; a failure is logged, recorded and falls through to
/// the next strategy. Nothing a strategy returns as an error reaches the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchOrchestrator {
    normalizer: JobNormalizer,
}

impl FetchOrchestrator {
    pub fn new() -> Self {
        Self {
            normalizer: JobNormalizer::new(),
        }
    }

    pub async fn execute(
        &self,
        config: &FetchConfig,
        source: JobSource,
        strategies: &[Box<dyn FetchStrategy>],
        http: &dyn HttpClientPort,
        telemetry: TelemetryHandle<'_>,
    ) -> FetchResult {
        let ctx = OperationContext::new(config, source);
        let span = info_span!(
            "fetch_jobs",
            operation_id = %ctx.operation_id(),
            company_id = %ctx.company_id(),
            source = %ctx.source(),
            strategy = field::Empty,
            status = field::Empty,
            job_count = field::Empty,
        );

        self.run(&ctx, config, strategies, http, telemetry, &span)
            .instrument(span.clone())
            .await
    }

    async fn run(
        &self,
        ctx: &OperationContext,
        config: &FetchConfig,
        strategies: &[Box<dyn FetchStrategy>],
        http: &dyn HttpClientPort,
        telemetry: TelemetryHandle<'_>,
        span: &Span,
    ) -> FetchResult {
        let mut attempted = 0usize;

        for strategy in strategies {
            if !strategy.can_handle(config) {
                continue;
            }
            attempted += 1;

            match strategy.extract(config, http).await {
                Ok(raw) => return self.complete(ctx, strategy.name(), raw, telemetry, span),
                Err(e) => self.record_failure(ctx, strategy.name(), &e, telemetry, span),
            }
        }

        self.exhausted(ctx, attempted, telemetry, span)
    }

    fn complete(
        &self,
        ctx: &OperationContext,
        strategy: &str,
        raw: Vec<RawRecord>,
        telemetry: TelemetryHandle<'_>,
        span: &Span,
    ) -> FetchResult {
        let raw_count = raw.len();
        let jobs = self.normalizer.normalize_batch(raw, ctx.source(), ctx.fetched_at());
        let duration_ms = ctx.elapsed_ms();

        info!(
            "Strategy {} fetched {} jobs ({} raw) for {} in {:.1}ms",
            strategy,
            jobs.len(),
            raw_count,
            ctx.company_id(),
            duration_ms
        );

        let attributes = vec![
            attr("strategy", strategy),
            attr("job_count", jobs.len()),
            attr("status", STATUS_SUCCESS),
        ];
        telemetry.record_metrics(
            ctx.operation_id(),
            FETCH_PHASE,
            STATUS_SUCCESS,
            duration_ms,
            &attributes,
        );
        telemetry.set_span_attributes(span, &attributes);

        FetchResult::succeeded(strategy, jobs, ctx.fetched_at_iso())
    }

    fn record_failure(
        &self,
        ctx: &OperationContext,
        strategy: &str,
        err: &FetchError,
        telemetry: TelemetryHandle<'_>,
        span: &Span,
    ) {
        warn!("Strategy {} failed for {}: {}", strategy, ctx.company_id(), err);

        telemetry.record_metrics(
            ctx.operation_id(),
            FETCH_PHASE,
            STATUS_STRATEGY_FAILED,
            ctx.elapsed_ms(),
            &[attr("strategy", strategy), attr("error", err)],
        );
        telemetry.set_span_attributes(span, &[attr(format!("strategy.{strategy}"), "failed")]);
    }

    fn exhausted(
        &self,
        ctx: &OperationContext,
        attempted: usize,
        telemetry: TelemetryHandle<'_>,
        span: &Span,
    ) -> FetchResult {
        error!(
            "No fetch strategy succeeded for {} ({} attempted)",
            ctx.company_id(),
            attempted
        );

        telemetry.record_metrics(
            ctx.operation_id(),
            FETCH_PHASE,
            STATUS_ALL_FAILED,
            ctx.elapsed_ms(),
            &[attr("strategies_attempted", attempted)],
        );
        telemetry.set_span_attributes(span, &[attr("status", STATUS_ALL_FAILED)]);

        FetchResult::exhausted(ctx.fetched_at_iso())
    }
}
