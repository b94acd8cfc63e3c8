//! Gift idea service.
//!
//! Ties the provider to the deterministic core:
//! - Validates the request before any provider call
//! - Serves repeated requests from the cache
//! - Calls the provider with timeout, retry and circuit breaker
//! - Normalizes the reply into gift ideas
//! - Substitutes generated ideas when the provider is over quota

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use giftwise_core::{
    DeterministicFallbackGenerator, GiftIdea, GiftRequest, ParseLayer, RequestError,
    ResponseNormalizer,
};

use crate::cache::{CacheKey, IdeaCache};
use crate::config::RuntimeConfig;
use crate::prompts::gift_messages;
use crate::providers::{LlmProvider, ProviderError, ProviderRegistry};
use crate::resilience::{with_retry, CircuitBreaker, FallbackReason};

/// Errors from the gift service.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    InvalidRequest(#[from] RequestError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ServiceError {
    /// HTTP-style status for the error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::InvalidRequest(_) => 400,
            ServiceError::Provider(_) => 500,
        }
    }

    /// Error body: `{"error": "..."}`.
    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.to_string() })
    }
}

/// Ideas returned for a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftResponse {
    pub gift_ideas: Vec<GiftIdea>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub from_fallback: bool,

    /// Set when `from_fallback` is true
    #[serde(skip)]
    pub fallback_reason: Option<FallbackReason>,

    /// Parser layer that produced the ideas, for provider results
    #[serde(skip)]
    pub layer: Option<ParseLayer>,

    #[serde(skip)]
    pub cached: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl GiftResponse {
    fn from_provider(gift_ideas: Vec<GiftIdea>, layer: ParseLayer) -> Self {
        Self {
            gift_ideas,
            from_fallback: false,
            fallback_reason: None,
            layer: Some(layer),
            cached: false,
        }
    }

    fn from_cache(gift_ideas: Vec<GiftIdea>) -> Self {
        Self {
            gift_ideas,
            from_fallback: false,
            fallback_reason: None,
            layer: None,
            cached: true,
        }
    }

    fn from_fallback(gift_ideas: Vec<GiftIdea>, reason: FallbackReason) -> Self {
        Self {
            gift_ideas,
            from_fallback: true,
            fallback_reason: Some(reason),
            layer: None,
            cached: false,
        }
    }
}

/// Generates gift ideas through a provider, falling back to the
/// deterministic generator.
pub struct GiftService {
    provider: Arc<dyn LlmProvider>,
    config: RuntimeConfig,
    circuit_breaker: CircuitBreaker,
    cache: Option<IdeaCache>,
    normalizer: ResponseNormalizer,
    fallback: DeterministicFallbackGenerator,
}

impl GiftService {
    pub fn new(provider: Arc<dyn LlmProvider>, config: RuntimeConfig) -> Self {
        let circuit_breaker = CircuitBreaker::new(config.circuit_breaker.clone());
        let cache = config
            .cache
            .enabled
            .then(|| IdeaCache::from_config(&config.cache));

        Self {
            provider,
            config,
            circuit_breaker,
            cache,
            normalizer: ResponseNormalizer::new(),
            fallback: DeterministicFallbackGenerator::new(),
        }
    }

    pub fn builder() -> GiftServiceBuilder {
        GiftServiceBuilder::new()
    }

    /// Build the provider named in `config` from `registry`.
    pub fn from_config(
        config: RuntimeConfig,
        registry: &ProviderRegistry,
    ) -> Result<Self, ServiceError> {
        let provider = registry.create(&config.provider, &config.provider_config)?;
        Ok(Self::new(provider, config))
    }

    /// Parse a JSON payload and generate ideas for it.
    pub async fn generate_json(&self, payload: &str) -> Result<GiftResponse, ServiceError> {
        let request = GiftRequest::from_json(payload)?;
        self.generate(&request).await
    }

    /// Generate gift ideas for a request.
    pub async fn generate(&self, request: &GiftRequest) -> Result<GiftResponse, ServiceError> {
        request.validate()?;

        let key = CacheKey::new(request);
        if let Some(cache) = &self.cache {
            if let Some(ideas) = cache.get(&key).await {
                tracing::debug!(occasion = %request.occasion, "Serving gift ideas from cache");
                return Ok(GiftResponse::from_cache(ideas));
            }
        }

        let name = self.provider.name().to_string();

        if self.circuit_breaker.is_open(&name) {
            tracing::warn!(provider = %name, "Circuit open, using fallback ideas");
            return Ok(self.fallback_response(request, FallbackReason::CircuitOpen));
        }

        match self.call_provider(request, &name).await {
            Ok(text) => {
                self.circuit_breaker.record_success(&name);
                let normalized = self.normalizer.normalize_detailed(&text);
                tracing::info!(
                    provider = %name,
                    layer = ?normalized.layer,
                    count = normalized.ideas.len(),
                    "Generated gift ideas"
                );

                // Sample ideas are never cached
                if normalized.layer.is_extracted() {
                    if let Some(cache) = &self.cache {
                        cache.insert(key, normalized.ideas.clone()).await;
                    }
                }
                Ok(GiftResponse::from_provider(normalized.ideas, normalized.layer))
            }
            Err(e) => {
                self.circuit_breaker.record_failure(&name);
                if e.is_quota_exceeded() {
                    tracing::warn!(provider = %name, error = %e, "Provider over quota, using fallback ideas");
                    Ok(self.fallback_response(request, FallbackReason::QuotaExceeded))
                } else {
                    tracing::warn!(provider = %name, error = %e, "Provider call failed");
                    Err(ServiceError::Provider(e))
                }
            }
        }
    }

    async fn call_provider(&self, request: &GiftRequest, name: &str) -> Result<String, ProviderError> {
        let messages = gift_messages(request);
        let completion = &self.config.completion;
        let timeout = completion.timeout;

        let response = with_retry(&self.config.retry, name, || {
            let messages = messages.clone();
            async move {
                tokio::time::timeout(timeout, self.provider.complete(messages, completion))
                    .await
                    .map_err(|_| ProviderError::Timeout(timeout))?
            }
        })
        .await?;

        tracing::debug!(
            provider = %name,
            model = %response.model,
            tokens = response.usage.total(),
            "Provider responded"
        );
        Ok(response.content)
    }

    fn fallback_response(&self, request: &GiftRequest, reason: FallbackReason) -> GiftResponse {
        let ideas = self.fallback.generate(&request.occasion, &request.interests);
        tracing::info!(reason = %reason, "Returning fallback gift ideas");
        GiftResponse::from_fallback(ideas.to_vec(), reason)
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

/// Builder for [`GiftService`].
pub struct GiftServiceBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    config: RuntimeConfig,
}

impl GiftServiceBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            config: RuntimeConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<GiftService, ServiceError> {
        let provider = self
            .provider
            .ok_or_else(|| ProviderError::NotConfigured("No provider set".to_string()))?;
        Ok(GiftService::new(provider, self.config))
    }
}

impl Default for GiftServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ChatMessage, CompletionConfig, CompletionResponse, TokenUsage};
    use async_trait::async_trait;
    use giftwise_core::{generate_fallback, MISSING_INPUT_MESSAGE};
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Clone)]
    enum Step {
        Reply(&'static str),
        Quota,
        RateLimited,
        ServerError,
        BadRequest,
    }

    impl Step {
        fn run(self) -> Result<String, ProviderError> {
            match self {
                Step::Reply(text) => Ok(text.to_string()),
                Step::Quota => Err(ProviderError::ApiError {
                    status: 429,
                    message: "Resource has been exhausted (e.g. check quota).".to_string(),
                }),
                Step::RateLimited => Err(ProviderError::RateLimited {
                    retry_after: Some(Duration::from_secs(30)),
                }),
                Step::ServerError => Err(ProviderError::ApiError {
                    status: 500,
                    message: "Internal error".to_string(),
                }),
                Step::BadRequest => Err(ProviderError::ApiError {
                    status: 400,
                    message: "API key not valid".to_string(),
                }),
            }
        }
    }

    /// Replays scripted steps, then repeats the last one.
    struct ScriptedProvider {
        script: Mutex<VecDeque<Step>>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn always(step: Step) -> Arc<Self> {
            Self::new(vec![step])
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn complete(
            &self,
            _messages: Vec<ChatMessage>,
            _config: &CompletionConfig,
        ) -> Result<CompletionResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = {
                let mut script = self.script.lock();
                if script.len() > 1 {
                    script.pop_front()
                } else {
                    script.front().cloned()
                }
            };
            let content = step.ok_or(ProviderError::EmptyResponse)?.run()?;
            Ok(CompletionResponse {
                content,
                usage: TokenUsage::default(),
                model: "scripted".to_string(),
            })
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn test_config() -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.retry.min_delay = Duration::from_millis(1);
        config.retry.max_delay = Duration::from_millis(2);
        config
    }

    fn service(provider: Arc<ScriptedProvider>) -> GiftService {
        GiftService::builder()
            .provider(provider)
            .config(test_config())
            .build()
            .unwrap()
    }

    fn birthday() -> GiftRequest {
        GiftRequest::new("Birthday", ["Sports", "Cooking"])
    }

    const IDEAS_JSON: &str = r#"```json
[{"title":"Chef Knife","desc":"For the home cook","budget":"Luxury","likeMeter":"95%"}]
```"#;

    #[tokio::test]
    async fn test_successful_generation() {
        let provider = ScriptedProvider::always(Step::Reply(IDEAS_JSON));
        let service = service(provider.clone());

        let response = service.generate(&birthday()).await.unwrap();

        assert!(!response.from_fallback);
        assert_eq!(response.layer, Some(ParseLayer::DirectJson));
        assert_eq!(response.gift_ideas.len(), 1);
        assert_eq!(response.gift_ideas[0].title, "Chef Knife");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_response_wire_format() {
        let service = service(ScriptedProvider::always(Step::Reply(IDEAS_JSON)));
        let response = service.generate(&birthday()).await.unwrap();

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["giftIdeas"][0]["desc"], "For the home cook");
        assert!(json.get("fromFallback").is_none());
    }

    #[tokio::test]
    async fn test_quota_error_uses_fallback() {
        let provider = ScriptedProvider::always(Step::Quota);
        let service = service(provider.clone());
        let request = birthday();

        let response = service.generate(&request).await.unwrap();

        assert!(response.from_fallback);
        assert_eq!(response.fallback_reason, Some(FallbackReason::QuotaExceeded));
        assert_eq!(
            response.gift_ideas,
            generate_fallback(&request.occasion, &request.interests).to_vec()
        );
        // Quota errors are never retried
        assert_eq!(provider.calls(), 1);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["fromFallback"], true);
        assert_eq!(json["giftIdeas"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_rate_limited_variant_uses_fallback() {
        let service = service(ScriptedProvider::always(Step::RateLimited));

        let response = service.generate(&birthday()).await.unwrap();
        assert!(response.from_fallback);
    }

    #[tokio::test]
    async fn test_other_errors_surface() {
        let provider = ScriptedProvider::always(Step::BadRequest);
        let service = service(provider.clone());

        let err = service.generate(&birthday()).await.unwrap_err();

        assert!(matches!(err, ServiceError::Provider(_)));
        assert_eq!(err.status_code(), 500);
        assert!(err.to_body()["error"]
            .as_str()
            .unwrap()
            .contains("API key not valid"));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let provider = ScriptedProvider::new(vec![
            Step::ServerError,
            Step::ServerError,
            Step::Reply(IDEAS_JSON),
        ]);
        let service = service(provider.clone());

        let response = service.generate(&birthday()).await.unwrap();

        assert!(!response.from_fallback);
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_invalid_request_skips_provider() {
        let provider = ScriptedProvider::always(Step::Reply(IDEAS_JSON));
        let service = service(provider.clone());

        let err = service
            .generate(&GiftRequest::new("Birthday", Vec::<String>::new()))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_body()["error"], MISSING_INPUT_MESSAGE);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_generate_json_rejects_bad_payload() {
        let provider = ScriptedProvider::always(Step::Reply(IDEAS_JSON));
        let service = service(provider.clone());

        let err = service.generate_json(r#"{"occasion":"Birthday"}"#).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(provider.calls(), 0);

        let ok = service
            .generate_json(r#"{"occasion":"Birthday","interests":["Tea"]}"#)
            .await
            .unwrap();
        assert_eq!(ok.gift_ideas[0].title, "Chef Knife");
    }

    #[tokio::test]
    async fn test_repeated_request_served_from_cache() {
        let provider = ScriptedProvider::always(Step::Reply(IDEAS_JSON));
        let service = service(provider.clone());

        let first = service.generate(&birthday()).await.unwrap();
        let second = service.generate(&birthday()).await.unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.gift_ideas, second.gift_ideas);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_fallback_results_are_not_cached() {
        let provider = ScriptedProvider::always(Step::Quota);
        let service = service(provider.clone());

        service.generate(&birthday()).await.unwrap();
        service.generate(&birthday()).await.unwrap();

        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_sample_ideas_are_not_cached() {
        let provider = ScriptedProvider::new(vec![Step::Reply("nonsense"), Step::Reply(IDEAS_JSON)]);
        let service = service(provider.clone());

        let first = service.generate(&birthday()).await.unwrap();
        assert_eq!(first.layer, Some(ParseLayer::Samples));

        let second = service.generate(&birthday()).await.unwrap();
        assert!(!second.cached);
        assert_eq!(second.gift_ideas[0].title, "Chef Knife");
        assert_eq!(provider.calls(), 2);

        let third = service.generate(&birthday()).await.unwrap();
        assert!(third.cached);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_open_circuit_uses_fallback() {
        let provider = ScriptedProvider::always(Step::BadRequest);
        let mut config = test_config();
        config.circuit_breaker.failure_threshold = 2;
        config.cache.enabled = false;
        let service = GiftService::new(provider.clone(), config);

        assert!(service.generate(&birthday()).await.is_err());
        assert!(service.generate(&birthday()).await.is_err());

        let response = service.generate(&birthday()).await.unwrap();
        assert!(response.from_fallback);
        assert_eq!(response.fallback_reason, Some(FallbackReason::CircuitOpen));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_unparseable_reply_yields_samples() {
        let service = service(ScriptedProvider::always(Step::Reply("nonsense")));
        let response = service.generate(&birthday()).await.unwrap();

        assert!(!response.from_fallback);
        assert_eq!(response.layer, Some(ParseLayer::Samples));
        assert_eq!(response.gift_ideas.len(), 4);
        assert_eq!(response.gift_ideas[0].title, "Smart Speaker");
    }

    #[test]
    fn test_builder_requires_provider() {
        let result = GiftService::builder().build();
        assert!(matches!(
            result,
            Err(ServiceError::Provider(ProviderError::NotConfigured(_)))
        ));
    }

    #[test]
    fn test_from_config_unknown_provider() {
        let mut config = RuntimeConfig::default();
        config.provider = "carrier-pigeon".to_string();

        let result = GiftService::from_config(config, &ProviderRegistry::new());
        assert!(matches!(result, Err(ServiceError::Provider(_))));
    }
}
