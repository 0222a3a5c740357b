//! Fallback loop run after a retryable first failure

use super::process::{Gateway, RequestContext};
use super::types::{AttemptSummary, GatewayResponse};
use crate::config::FallbackExclusion;
use crate::core::cache_manager::CacheKey;
use crate::core::classifier::ErrorKind;
use crate::core::providers::CompletionResult;
use std::collections::HashSet;
use tracing::{info, warn};

impl Gateway {
    /// Try other providers, at most `max_retries` times.
    ///
    /// Providers that failed with a severe error are never reselected. Under
    /// [`FallbackExclusion::Cumulative`] no provider is tried twice and the
    /// loop stops once nothing is left.
    pub(super) async fn run_fallback(
        &self,
        ctx: &RequestContext<'_>,
        key: &CacheKey,
        original: String,
        first: CompletionResult,
    ) -> GatewayResponse {
        let exclusion = self.fallback.exclusion;
        let mut attempts = vec![AttemptSummary::from_result(&first)];
        let mut tried: HashSet<String> = HashSet::from([original.clone()]);
        let mut severe: HashSet<String> = HashSet::new();

        for attempt in 1..=self.fallback.max_retries {
            let delay = self.fallback.delay_before(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let exclude = match exclusion {
                FallbackExclusion::Cumulative => tried.clone(),
                FallbackExclusion::OriginalOnly => {
                    let mut exclude = severe.clone();
                    exclude.insert(original.clone());
                    exclude
                }
            };

            let Some(provider) = self.selector.select_best_provider(
                ctx.task_type,
                ctx.options.strategy,
                attempt - 1,
                &exclude,
            ) else {
                warn!(attempt = attempt, "No alternative provider left");
                match exclusion {
                    FallbackExclusion::Cumulative => break,
                    FallbackExclusion::OriginalOnly => continue,
                }
            };

            let Some(model) = self.resolve_model(ctx.task_type, &provider, ctx.options) else {
                warn!(attempt = attempt, provider = %provider, "No model configured, skipping");
                attempts.push(AttemptSummary::new(provider.as_str(), ErrorKind::ModelUnavailable));
                tried.insert(provider);
                continue;
            };

            info!(
                attempt = attempt,
                max_retries = self.fallback.max_retries,
                provider = %provider,
                model = %model,
                "Fallback attempt"
            );
            let result = self.invoke(&provider, &model, ctx.input).await;
            if result.success {
                info!(attempt = attempt, provider = %provider, "Failover succeeded");
                let mut response = GatewayResponse::from(result);
                response.was_failover = true;
                let response = self.finish(ctx, response);
                self.remember(ctx, key, &response);
                return response;
            }

            let summary = AttemptSummary::from_result(&result);
            if summary.kind.is_severe() {
                severe.insert(provider.clone());
            }
            warn!(attempt = attempt, provider = %provider, kind = %summary.kind, "Fallback attempt failed");
            attempts.push(summary);
            tried.insert(provider);
        }

        info!(
            task_type = ctx.task_type,
            attempts = attempts.len(),
            "All providers failed"
        );
        self.finish(ctx, GatewayResponse::all_failed(ctx.task_type, &attempts))
    }
}
