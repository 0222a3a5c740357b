//! Gateway integration tests
//!
//! Failover, caching and batching through the public `Gateway` API.

#[cfg(test)]
mod tests {
    use crate::common::providers::{connection_refused, registry_of};
    use crate::common::{ConfigFactory, Outcome, PROVIDER_NAMES, ResponseAssertions, ScriptedProvider};
    use llm_relay::{ErrorKind, Gateway, ProcessOptions, RawFailure, SelectionStrategy};
    use std::time::Duration;

    /// Local runtime refusing connections fails over to the next provider
    #[tokio::test]
    async fn test_failover_after_connection_error() {
        let ollama = ScriptedProvider::failing("ollama", connection_refused());
        let openai = ScriptedProvider::healthy("openai");
        let anthropic = ScriptedProvider::healthy("anthropic");
        let gateway = Gateway::new(
            &ConfigFactory::preferring("seo", "ollama"),
            registry_of(&[ollama.clone(), openai.clone(), anthropic.clone()]),
        );

        let response = gateway.process("seo", "Write a meta description", None).await;

        response.assert_served_by("openai");
        assert!(response.was_failover);
        assert!(!response.from_cache);
        assert!(response.text.contains("Write a meta description"));
        assert_eq!(ollama.calls(), 1);
        assert_eq!(openai.calls(), 1);
        assert_eq!(anthropic.calls(), 0);

        let health = gateway.health_snapshot();
        assert_eq!(health["ollama"].last_error_kind, Some(ErrorKind::ConnectionError));
        assert_eq!(health["ollama"].recent_errors, 1.0);
        assert!(health["openai"].last_used_at.is_some());
        assert!(health["openai"].average_latency_ms.is_some());
    }

    /// Every provider failing ends in AllProvidersFailed with bounded invocations
    #[tokio::test]
    async fn test_all_providers_failed() {
        let providers: Vec<_> = PROVIDER_NAMES
            .iter()
            .map(|name| ScriptedProvider::failing(name, connection_refused()))
            .collect();
        let config = ConfigFactory::create();
        let max_retries = config.fallback.max_retries as usize;
        let gateway = Gateway::new(&config, registry_of(&providers));

        let response = gateway.process("text-generation", "hello", None).await;

        response.assert_failed_with(ErrorKind::AllProvidersFailed);
        assert_eq!(response.provider, "none");
        assert_eq!(response.model, "none");
        assert!(response.was_failover);
        let message = response.error.as_deref().unwrap_or_default();
        assert!(message.starts_with("All providers failed for task type text-generation"));
        assert!(message.contains("anthropic: ConnectionError"));

        let total: usize = providers.iter().map(|p| p.calls()).sum();
        assert_eq!(total, max_retries + 1);
        assert!(providers.iter().all(|p| p.calls() <= 1));
        assert_eq!(gateway.cache_stats().entries, 0);
    }

    /// A severe first failure is returned without trying anyone else
    #[tokio::test]
    async fn test_severe_failure_short_circuits() {
        let openai = ScriptedProvider::failing("openai", RawFailure::http(401, "invalid api key"));
        let anthropic = ScriptedProvider::healthy("anthropic");
        let gateway = Gateway::new(
            &ConfigFactory::create(),
            registry_of(&[openai.clone(), anthropic.clone()]),
        );

        let response = gateway.process("code-generation", "fn main", None).await;

        response.assert_failed_with(ErrorKind::AuthenticationError);
        assert_eq!(response.provider, "openai");
        assert!(!response.was_failover);
        assert_eq!(anthropic.calls(), 0);
    }

    /// Provider-specific wording is classified with that provider's vocabulary
    #[tokio::test]
    async fn test_provider_message_classification() {
        let anthropic =
            ScriptedProvider::failing("anthropic", RawFailure::message("Monthly quota exceeded"));
        let openai = ScriptedProvider::healthy("openai");
        let gateway = Gateway::new(
            &ConfigFactory::create(),
            registry_of(&[anthropic.clone(), openai.clone()]),
        );

        let response = gateway.process("text-generation", "summarize", None).await;

        response.assert_served_by("openai");
        assert!(response.was_failover);
        assert_eq!(
            gateway.health_snapshot()["anthropic"].last_error_kind,
            Some(ErrorKind::RateLimit)
        );
    }

    /// Cumulative exclusion moves on to a provider not yet tried
    #[tokio::test]
    async fn test_cumulative_exclusion_reaches_every_provider() {
        let openai = ScriptedProvider::failing("openai", connection_refused());
        let anthropic = ScriptedProvider::failing("anthropic", RawFailure::http(500, "overloaded"));
        let ollama = ScriptedProvider::healthy("ollama");
        let gateway = Gateway::new(
            &ConfigFactory::create(),
            registry_of(&[openai.clone(), anthropic.clone(), ollama.clone()]),
        );

        let response = gateway.process("code-generation", "build it", None).await;

        response.assert_served_by("ollama");
        assert_eq!(anthropic.calls(), 1);
    }

    /// Single exclusion may pick the same failing fallback again
    #[tokio::test]
    async fn test_original_only_exclusion_repeats_fallback() {
        let openai = ScriptedProvider::failing("openai", connection_refused());
        let anthropic = ScriptedProvider::failing("anthropic", RawFailure::http(500, "overloaded"));
        let ollama = ScriptedProvider::healthy("ollama");
        let config = ConfigFactory::original_only();
        let max_retries = config.fallback.max_retries as usize;
        let gateway = Gateway::new(
            &config,
            registry_of(&[openai.clone(), anthropic.clone(), ollama.clone()]),
        );

        let response = gateway.process("code-generation", "build it", None).await;

        response.assert_failed_with(ErrorKind::AllProvidersFailed);
        assert_eq!(openai.calls(), 1);
        assert_eq!(anthropic.calls(), max_retries);
        assert_eq!(ollama.calls(), 0);
    }

    /// A repeated request is answered from the cache without another call
    #[tokio::test]
    async fn test_cache_is_idempotent() {
        let openai = ScriptedProvider::healthy("openai");
        let gateway = Gateway::new(&ConfigFactory::create(), registry_of(&[openai.clone()]));

        let first = gateway.process("text-generation", "same input", None).await;
        let second = gateway.process("text-generation", "same input", None).await;

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.text, second.text);
        assert_eq!(first.provider, second.provider);
        assert_ne!(first.request_id, second.request_id);
        assert_eq!(openai.calls(), 1);

        let stats = gateway.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
    }

    /// Cache keys include the task type
    #[tokio::test]
    async fn test_cache_is_keyed_by_task_type() {
        let openai = ScriptedProvider::healthy("openai");
        let gateway = Gateway::new(&ConfigFactory::create(), registry_of(&[openai.clone()]));

        gateway.process("text-generation", "input", None).await;
        let other = gateway.process("code-generation", "input", None).await;

        assert!(!other.from_cache);
        assert_eq!(openai.calls(), 2);
        assert_eq!(gateway.cache_stats().entries, 2);
    }

    /// Failures are never cached
    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let openai = ScriptedProvider::scripted(
            "openai",
            vec![Outcome::Fail(RawFailure::http(400, "bad request"))],
            Outcome::Succeed,
        );
        let gateway = Gateway::new(&ConfigFactory::create(), registry_of(&[openai.clone()]));

        let first = gateway.process("text-generation", "retry me", None).await;
        first.assert_failed_with(ErrorKind::InvalidRequest);

        let second = gateway.process("text-generation", "retry me", None).await;
        second.assert_served_by("openai");
        assert!(!second.from_cache);
        assert_eq!(openai.calls(), 2);
    }

    /// Cache writes can be turned off per request while reads still happen
    #[tokio::test]
    async fn test_without_cache_skips_writes() {
        let openai = ScriptedProvider::healthy("openai");
        let gateway = Gateway::new(&ConfigFactory::create(), registry_of(&[openai.clone()]));
        let options = ProcessOptions::default().without_cache();

        gateway
            .process_with_options("text-generation", "fresh", &options)
            .await
            .assert_served_by("openai");
        gateway
            .process_with_options("text-generation", "fresh", &options)
            .await
            .assert_served_by("openai");

        assert_eq!(openai.calls(), 2);
        assert_eq!(gateway.cache_stats().entries, 0);
    }

    /// A slow provider hits the request deadline and the gateway moves on
    #[tokio::test(start_paused = true)]
    async fn test_request_deadline_triggers_failover() {
        let mut config = ConfigFactory::create();
        config.fallback.request_timeout_ms = 50;
        let openai = ScriptedProvider::slow("openai", Duration::from_secs(5));
        let anthropic = ScriptedProvider::healthy("anthropic");
        let gateway = Gateway::new(&config, registry_of(&[openai.clone(), anthropic.clone()]));

        let response = gateway.process("code-generation", "slow one", None).await;

        response.assert_served_by("anthropic");
        assert!(response.was_failover);
        assert_eq!(
            gateway.health_snapshot()["openai"].last_error_kind,
            Some(ErrorKind::Timeout)
        );
    }

    /// The model override reaches the provider unchanged
    #[tokio::test]
    async fn test_model_override() {
        let openai = ScriptedProvider::healthy("openai");
        let gateway = Gateway::new(&ConfigFactory::create(), registry_of(&[openai.clone()]));

        let response = gateway
            .process("text-generation", "hi", Some("gpt-4o-mini"))
            .await;

        response.assert_served_by("openai");
        assert_eq!(response.model, "gpt-4o-mini");
        assert_eq!(openai.requests()[0].model, "gpt-4o-mini");
    }

    /// The model table picks the task row, then the default row
    #[tokio::test]
    async fn test_model_resolution_from_table() {
        let ollama = ScriptedProvider::healthy("ollama");
        let gateway = Gateway::new(&ConfigFactory::create(), registry_of(&[ollama.clone()]));

        gateway.process("code-generation", "a", None).await;
        gateway.process("unlisted-task", "b", None).await;

        let models: Vec<String> = ollama.requests().into_iter().map(|r| r.model).collect();
        assert_eq!(models, vec!["codellama", "llama3"]);
    }

    /// Inputs are processed in order and answered in order
    #[tokio::test]
    async fn test_batch_preserves_order() {
        let openai = ScriptedProvider::healthy("openai");
        let gateway = Gateway::new(&ConfigFactory::create(), registry_of(&[openai.clone()]));
        let inputs: Vec<String> = (0..4).map(|i| format!("input number {}", i)).collect();

        let responses = gateway.process_batch("text-generation", &inputs).await;

        assert_eq!(responses.len(), inputs.len());
        for (input, response) in inputs.iter().zip(&responses) {
            response.assert_served_by("openai");
            assert!(response.text.ends_with(input.as_str()));
        }
        let seen: Vec<String> = openai.requests().into_iter().map(|r| r.prompt).collect();
        assert_eq!(seen, inputs);
    }

    /// Round robin walks the registered providers
    #[tokio::test]
    async fn test_round_robin_rotates() {
        let providers: Vec<_> = ["openai", "anthropic", "ollama"]
            .iter()
            .map(|name| ScriptedProvider::healthy(name))
            .collect();
        let gateway = Gateway::new(&ConfigFactory::create(), registry_of(&providers));
        let options = ProcessOptions::default().with_strategy(SelectionStrategy::RoundRobin);

        for i in 0..6 {
            let response = gateway
                .process_with_options("text-generation", &format!("prompt {}", i), &options)
                .await;
            assert!(response.success);
        }

        assert!(providers.iter().all(|p| p.calls() == 2));
    }

    /// An unregistered preferred provider is reported, not replaced
    #[tokio::test]
    async fn test_unknown_preferred_provider() {
        let openai = ScriptedProvider::healthy("openai");
        let gateway = Gateway::new(&ConfigFactory::create(), registry_of(&[openai.clone()]));
        let options = ProcessOptions::default().with_provider("mistral");

        let response = gateway
            .process_with_options("text-generation", "hi", &options)
            .await;

        response.assert_failed_with(ErrorKind::ProviderUnavailable);
        assert_eq!(response.provider, "mistral");
        assert_eq!(openai.calls(), 0);
    }

    /// A provider missing from the model table is never invoked
    #[tokio::test]
    async fn test_provider_without_model() {
        let mystery = ScriptedProvider::healthy("mystery");
        let gateway = Gateway::new(&ConfigFactory::create(), registry_of(&[mystery.clone()]));

        let response = gateway.process("text-generation", "hi", None).await;

        response.assert_failed_with(ErrorKind::ModelUnavailable);
        assert_eq!(mystery.calls(), 0);
    }

    /// Clearing the cache forces a fresh call
    #[tokio::test]
    async fn test_clear_cache() {
        let openai = ScriptedProvider::healthy("openai");
        let gateway = Gateway::new(&ConfigFactory::create(), registry_of(&[openai.clone()]));

        gateway.process("text-generation", "again", None).await;
        gateway.clear_cache();
        let response = gateway.process("text-generation", "again", None).await;

        assert!(!response.from_cache);
        assert_eq!(openai.calls(), 2);
    }
}
