//! Dispatcher integration tests
//!
//! `QueuedProvider` on its own and registered inside a gateway.

#[cfg(test)]
mod tests {
    use crate::common::{ConfigFactory, Outcome, ResponseAssertions, ScriptedProvider};
    use llm_relay::{
        CompletionRequest, DispatcherConfig, ErrorKind, Gateway, Provider, ProviderRegistry,
        QueuedProvider, RawFailure,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_test::{assert_pending, assert_ready_ok};

    fn tripping_config() -> DispatcherConfig {
        DispatcherConfig {
            max_retries: 0,
            failure_threshold: 1,
            ..ConfigFactory::dispatcher(4)
        }
    }

    /// A request waits in the queue while every slot is busy
    #[tokio::test(start_paused = true)]
    async fn test_saturated_dispatcher_queues() {
        let queued = QueuedProvider::new(
            ScriptedProvider::new("ollama", Outcome::Delay(Duration::from_secs(1))),
            ConfigFactory::dispatcher(1),
        );

        let busy = queued.clone();
        let first = tokio::spawn(async move { busy.submit(CompletionRequest::new("first", "llama3")).await });
        tokio::task::yield_now().await;
        assert_eq!(queued.active_requests(), 1);

        let mut second = tokio_test::task::spawn(queued.submit(CompletionRequest::new("second", "llama3")));
        assert_pending!(second.poll());
        assert_eq!(queued.queue_length(), 1);
        assert_eq!(queued.status().queue_length, 1);

        // Abandon the queued request; it must never reach the backend
        drop(second);

        let completion = first.await.unwrap().unwrap();
        assert_eq!(completion.model, "llama3");
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(queued.queue_length(), 0);
        assert_eq!(queued.inner().calls(), 1);
    }

    /// An idle dispatcher runs the request immediately
    #[tokio::test]
    async fn test_idle_dispatcher_is_ready_on_first_poll() {
        let queued = QueuedProvider::new(
            ScriptedProvider::new("ollama", Outcome::Succeed),
            ConfigFactory::dispatcher(1),
        );

        let mut call = tokio_test::task::spawn(queued.submit(CompletionRequest::new("hi", "llama3")));
        let completion = assert_ready_ok!(call.poll());
        assert_eq!(completion.text, "ollama answered: hi");
        assert_eq!(queued.status().successful_requests, 1);
    }

    /// A dispatcher in cool-down is skipped by selection until it recovers
    #[tokio::test(start_paused = true)]
    async fn test_gateway_skips_cooling_provider() {
        let openai = Arc::new(QueuedProvider::new(
            ScriptedProvider::new("openai", Outcome::Fail(RawFailure::http(500, "boom"))),
            tripping_config(),
        ));
        let anthropic = Arc::new(QueuedProvider::new(
            ScriptedProvider::new("anthropic", Outcome::Succeed),
            tripping_config(),
        ));
        let registry = ProviderRegistry::new()
            .with_provider(openai.clone())
            .with_provider(anthropic.clone());
        let gateway = Gateway::new(&ConfigFactory::create(), registry);

        let first = gateway.process("code-generation", "first", None).await;
        first.assert_served_by("anthropic");
        assert!(first.was_failover);
        assert!(!openai.status().is_available);

        let second = gateway.process("code-generation", "second", None).await;
        second.assert_served_by("anthropic");
        assert!(!second.was_failover);
        assert_eq!(openai.inner().calls(), 1);
        assert_eq!(gateway.available_providers().await, vec!["anthropic".to_string()]);

        // After the cool-down a successful model listing restores the provider
        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(openai.is_available().await);
        assert_eq!(openai.status().consecutive_failures, 0);
    }

    /// Retries inside the dispatcher surface as `was_retry`
    #[tokio::test(start_paused = true)]
    async fn test_dispatcher_retry_is_reported() {
        let openai = Arc::new(QueuedProvider::new(
            ScriptedProvider::new("openai", Outcome::Succeed)
                .with_script(vec![Outcome::Fail(RawFailure::http(502, "bad gateway"))]),
            DispatcherConfig {
                max_retries: 2,
                ..ConfigFactory::dispatcher(4)
            },
        ));
        let registry = ProviderRegistry::new().with_provider(openai.clone());
        let gateway = Gateway::new(&ConfigFactory::create(), registry);

        let response = gateway.process("code-generation", "retry", None).await;

        response.assert_served_by("openai");
        assert!(response.was_retry);
        assert!(!response.was_failover);
        assert_eq!(openai.inner().calls(), 2);
        assert_eq!(openai.status().consecutive_failures, 0);
    }

    /// Refusals during cool-down are classified as provider unavailability
    #[tokio::test(start_paused = true)]
    async fn test_cooling_provider_refuses_direct_calls() {
        let ollama = QueuedProvider::new(
            ScriptedProvider::new("ollama", Outcome::Fail(RawFailure::http(500, "boom"))),
            tripping_config(),
        );

        let _ = ollama.submit(CompletionRequest::new("trip", "llama3")).await;
        let refused = ollama
            .submit(CompletionRequest::new("again", "llama3"))
            .await
            .unwrap_err();

        assert_eq!(llm_relay::classify(&refused), ErrorKind::ProviderUnavailable);
        assert_eq!(ollama.inner().calls(), 1);
    }
}
