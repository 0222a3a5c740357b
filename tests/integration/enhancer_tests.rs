//! Enhancer integration tests
//!
//! Strategy overrides, fault injection and concurrent batches.

#[cfg(test)]
mod tests {
    use crate::common::providers::registry_of;
    use crate::common::{ConfigFactory, Outcome, ResponseAssertions, ScriptedProvider};
    use llm_relay::{
        EnhancedOptions, ErrorKind, Gateway, GatewayEnhancer, ProviderRegistry, QueuedProvider,
        RawFailure, SelectionStrategy,
    };
    use std::sync::Arc;
    use std::time::Duration;

    fn enhancer(registry: ProviderRegistry) -> GatewayEnhancer {
        GatewayEnhancer::new(Arc::new(Gateway::new(&ConfigFactory::create(), registry)))
    }

    /// Fault injection never reaches providers, cache or health
    #[tokio::test]
    async fn test_simulated_failure_is_isolated() {
        let openai = ScriptedProvider::healthy("openai");
        let enhancer = enhancer(registry_of(&[openai.clone()]));
        let options = EnhancedOptions::default().simulate(ErrorKind::RateLimit);

        let response = enhancer
            .process_with_smart_fallback("text-generation", "hello", &options)
            .await;

        response.assert_failed_with(ErrorKind::RateLimit);
        assert_eq!(response.provider, "test");
        assert_eq!(response.model, "test");
        assert_eq!(
            response.error.as_deref(),
            Some("Simulated error for task type text-generation: Rate limit exceeded, try again later")
        );
        assert_eq!(openai.calls(), 0);
        assert!(enhancer.providers_health().is_empty());
        assert_eq!(enhancer.gateway().cache_stats().entries, 0);
    }

    /// Test mode without an error kind processes normally
    #[tokio::test]
    async fn test_test_mode_without_error_is_ignored() {
        let openai = ScriptedProvider::healthy("openai");
        let enhancer = enhancer(registry_of(&[openai.clone()]));
        let options = EnhancedOptions {
            test_mode: true,
            ..EnhancedOptions::default()
        };

        enhancer
            .process_with_smart_fallback("text-generation", "hello", &options)
            .await
            .assert_served_by("openai");
        assert_eq!(openai.calls(), 1);
    }

    /// The preferred provider wins over priority
    #[tokio::test]
    async fn test_preferred_provider() {
        let openai = ScriptedProvider::healthy("openai");
        let local = ScriptedProvider::healthy("local");
        let enhancer = enhancer(registry_of(&[openai.clone(), local.clone()]));
        let options = EnhancedOptions::default().with_provider("local");

        enhancer
            .process_with_smart_fallback("text-generation", "hello", &options)
            .await
            .assert_served_by("local");
        assert_eq!(openai.calls(), 0);
    }

    /// A failing preferred provider still falls back
    #[tokio::test]
    async fn test_preferred_provider_falls_back() {
        let openai = ScriptedProvider::healthy("openai");
        let local = ScriptedProvider::failing("local", RawFailure::http(503, "loading model"));
        let enhancer = enhancer(registry_of(&[openai.clone(), local.clone()]));
        let options = EnhancedOptions::default().with_provider("local");

        let response = enhancer
            .process_with_smart_fallback("text-generation", "hello", &options)
            .await;

        response.assert_served_by("openai");
        assert!(response.was_failover);
    }

    /// Batch answers line up with their inputs
    #[tokio::test]
    async fn test_batch_order() {
        let openai = ScriptedProvider::scripted(
            "openai",
            vec![
                Outcome::Delay(Duration::from_millis(30)),
                Outcome::Delay(Duration::from_millis(10)),
            ],
            Outcome::Succeed,
        );
        let enhancer = enhancer(registry_of(&[openai.clone()]));
        let inputs: Vec<String> = (0..5).map(|i| format!("question {}", i)).collect();

        let responses = enhancer
            .process_batch_with_smart_fallback("text-generation", &inputs, &EnhancedOptions::default())
            .await;

        assert_eq!(responses.len(), 5);
        for (input, response) in inputs.iter().zip(&responses) {
            response.assert_served_by("openai");
            assert!(response.text.ends_with(input.as_str()));
        }
        assert_eq!(openai.calls(), 5);
    }

    /// A batch behind a dispatcher never exceeds the concurrency cap
    #[tokio::test(start_paused = true)]
    async fn test_batch_respects_dispatcher_cap() {
        let queued = Arc::new(QueuedProvider::new(
            ScriptedProvider::new("ollama", Outcome::Delay(Duration::from_millis(100))),
            ConfigFactory::dispatcher(2),
        ));
        let registry = ProviderRegistry::new().with_provider(queued.clone());
        let enhancer = enhancer(registry);
        let inputs: Vec<String> = (0..6).map(|i| format!("load {}", i)).collect();

        let responses = enhancer
            .process_batch_with_smart_fallback("text-generation", &inputs, &EnhancedOptions::default())
            .await;

        assert!(responses.iter().all(|r| r.success));
        assert_eq!(queued.inner().calls(), 6);
        assert!(queued.inner().peak_concurrency() <= 2);
        assert_eq!(queued.queue_length(), 0);
        assert_eq!(queued.active_requests(), 0);
    }

    /// Strategy in the options reaches selection
    #[tokio::test]
    async fn test_strategy_option() {
        let providers: Vec<_> = ["openai", "anthropic"]
            .iter()
            .map(|name| ScriptedProvider::healthy(name))
            .collect();
        let enhancer = enhancer(registry_of(&providers));
        let options = EnhancedOptions::default().with_strategy(SelectionStrategy::RoundRobin);

        for i in 0..4 {
            enhancer
                .process_with_smart_fallback("text-generation", &format!("q{}", i), &options)
                .await;
        }

        assert_eq!(providers[0].calls(), 2);
        assert_eq!(providers[1].calls(), 2);
    }

    /// Providers that keep failing drop to the bottom of the health ranking
    #[tokio::test]
    async fn test_health_ranking_after_failures() {
        let anthropic =
            ScriptedProvider::failing("anthropic", RawFailure::message("quota exceeded"));
        let openai = ScriptedProvider::healthy("openai");
        let enhancer = enhancer(registry_of(&[anthropic.clone(), openai.clone()]));

        for i in 0..5 {
            enhancer
                .process_with_smart_fallback("text-generation", &format!("q{}", i), &EnhancedOptions::default())
                .await
                .assert_served_by("openai");
        }

        let ranking = enhancer.providers_by_health_score();
        assert_eq!(ranking[0].0, "openai");
        assert_eq!(ranking[1].0, "anthropic");
        assert!(ranking[1].1.abs() < f64::EPSILON);
        assert!(!enhancer.providers_health()["anthropic"].available);

        let available = enhancer.available_providers().await;
        assert_eq!(available, vec!["openai".to_string()]);
    }

    /// Model listing comes from the model table
    #[tokio::test]
    async fn test_available_models() {
        let ollama = ScriptedProvider::healthy("ollama");
        let enhancer = enhancer(registry_of(&[ollama]));

        let models = enhancer.available_models();
        assert_eq!(models["ollama"], vec!["codellama", "llama3"]);
    }
}
