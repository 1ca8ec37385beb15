use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::{LabelCache, cache_key};
use crate::error::LabelGateError;
use crate::sources::openfda::OpenFdaClient;

/// A drug label record exactly as openFDA returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawLabel(serde_json::Map<String, serde_json::Value>);

impl RawLabel {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn into_inner(self) -> serde_json::Map<String, serde_json::Value> {
        self.0
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for RawLabel {
    fn from(value: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(value)
    }
}

/// Fixed-shape label view; every field is a single string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedLabel {
    pub brand_name: String,
    pub generic_name: String,
    pub purpose: String,
    pub indications: String,
    pub warnings: String,
    pub interactions: String,
}

/// Label lookups through an optional read-through cache.
pub struct LabelService {
    source: OpenFdaClient,
    cache: Option<Arc<dyn LabelCache>>,
    ttl: Duration,
}

impl LabelService {
    pub fn new(source: OpenFdaClient, cache: Option<Arc<dyn LabelCache>>, ttl: Duration) -> Self {
        Self { source, cache, ttl }
    }

    pub fn cache_backend(&self) -> Option<&'static str> {
        self.cache.as_ref().map(|c| c.backend())
    }

    pub(crate) fn cache(&self) -> Option<&Arc<dyn LabelCache>> {
        self.cache.as_ref()
    }

    pub(crate) fn source(&self) -> &OpenFdaClient {
        &self.source
    }

    /// Returns the raw label for `drug_name`, serving from cache when possible.
    ///
    /// Cache failures are logged and treated as misses. Only found records are
    /// written back; `Ok(None)` and upstream errors pass through untouched.
    ///
    /// # Errors
    ///
    /// Returns the label source's error when the cache misses and the fetch fails.
    pub async fn lookup(&self, drug_name: &str) -> Result<Option<RawLabel>, LabelGateError> {
        let Some(cache) = self.cache.as_ref() else {
            return self.source.label_search(drug_name).await;
        };

        let key = cache_key(drug_name);
        match cache.get(&key).await {
            Ok(Some(cached)) => match serde_json::from_str::<RawLabel>(&cached) {
                Ok(label) => {
                    debug!(drug = drug_name, key = %key, "label cache hit");
                    return Ok(Some(label));
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "discarding undecodable cached label");
                }
            },
            Ok(None) => debug!(drug = drug_name, key = %key, "label cache miss"),
            Err(err) => warn!(
                backend = cache.backend(),
                key = %key,
                error = %err,
                "label cache read failed; fetching directly"
            ),
        }

        let fetched = self.source.label_search(drug_name).await?;
        if let Some(label) = fetched.as_ref() {
            match serde_json::to_string(label) {
                Ok(serialized) => {
                    if let Err(err) = cache.set(&key, &serialized, self.ttl).await {
                        warn!(
                            backend = cache.backend(),
                            key = %key,
                            error = %err,
                            "label cache write failed"
                        );
                    }
                }
                Err(err) => warn!(key = %key, error = %err, "label not serializable for cache"),
            }
        }
        Ok(fetched)
    }

    /// Looks up and normalizes the label for `drug_name`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no label matches, or the lookup error.
    pub async fn get(&self, drug_name: &str) -> Result<NormalizedLabel, LabelGateError> {
        match self.lookup(drug_name).await? {
            Some(raw) => Ok(crate::transform::label::normalize(&raw)),
            None => Err(LabelGateError::drug_not_found(drug_name)),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::config::{DEFAULT_CACHE_TTL, HttpSettings};
    use crate::transform::label::normalize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Cache whose store is always unreachable.
    pub(crate) struct UnreachableCache;

    #[async_trait::async_trait]
    impl LabelCache for UnreachableCache {
        fn backend(&self) -> &'static str {
            "unreachable"
        }

        async fn get(&self, _key: &str) -> Result<Option<String>, LabelGateError> {
            Err(LabelGateError::Cache {
                backend: "unreachable",
                message: "connection refused".into(),
            })
        }

        async fn set(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Duration,
        ) -> Result<(), LabelGateError> {
            Err(LabelGateError::Cache {
                backend: "unreachable",
                message: "connection refused".into(),
            })
        }

        async fn ping(&self) -> Result<(), LabelGateError> {
            Err(LabelGateError::Cache {
                backend: "unreachable",
                message: "connection refused".into(),
            })
        }
    }

    pub(crate) fn advil_body() -> serde_json::Value {
        serde_json::json!({
            "meta": {"results": {"skip": 0, "limit": 1, "total": 1}},
            "results": [{
                "openfda": {"brand_name": ["Advil"], "generic_name": ["ibuprofen"]},
                "purpose": ["Pain reliever"],
                "indications_and_usage": "For headache",
                "warnings": ["May cause drowsiness"],
                "drug_interactions": null
            }]
        })
    }

    pub(crate) fn service_for(base: String, cache: Option<Arc<dyn LabelCache>>) -> LabelService {
        let http = crate::sources::http_client(&HttpSettings::default()).unwrap();
        LabelService::new(
            OpenFdaClient::new(http, base, "test-key"),
            cache,
            DEFAULT_CACHE_TTL,
        )
    }

    #[tokio::test]
    async fn second_lookup_within_ttl_is_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drug/label.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(advil_body()))
            .expect(1)
            .mount(&server)
            .await;

        let cache = Arc::new(MemoryCache::new());
        let service = service_for(server.uri(), Some(cache.clone()));

        let first = service.lookup("Advil").await.unwrap().expect("label");
        let second = service.lookup("ADVIL").await.unwrap().expect("cached label");
        assert_eq!(first, second);
        assert!(cache.get("drug_label:advil").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn cached_round_trip_normalizes_identically() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drug/label.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(advil_body()))
            .mount(&server)
            .await;

        let cache = Arc::new(MemoryCache::new());
        let service = service_for(server.uri(), Some(cache.clone()));
        let direct = service.lookup("advil").await.unwrap().expect("label");

        let stored = cache.get("drug_label:advil").await.unwrap().expect("stored");
        let restored: RawLabel = serde_json::from_str(&stored).unwrap();
        assert_eq!(normalize(&restored), normalize(&direct));
    }

    #[tokio::test]
    async fn not_found_results_are_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drug/label.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let cache = Arc::new(MemoryCache::new());
        let service = service_for(server.uri(), Some(cache.clone()));

        assert!(service.lookup("Zzzyx").await.unwrap().is_none());
        assert!(service.lookup("Zzzyx").await.unwrap().is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn unreachable_cache_degrades_to_direct_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drug/label.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(advil_body()))
            .expect(2)
            .mount(&server)
            .await;

        let service = service_for(server.uri(), Some(Arc::new(UnreachableCache)));

        let label = service.get("Advil").await.unwrap();
        assert_eq!(label.brand_name, "Advil");
        assert!(service.get("Advil").await.is_ok());
    }

    #[tokio::test]
    async fn undecodable_cache_entry_is_treated_as_miss() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drug/label.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(advil_body()))
            .expect(1)
            .mount(&server)
            .await;

        let cache = Arc::new(MemoryCache::new());
        cache
            .set("drug_label:advil", "not json", DEFAULT_CACHE_TTL)
            .await
            .unwrap();
        let service = service_for(server.uri(), Some(cache.clone()));

        let label = service.get("Advil").await.unwrap();
        assert_eq!(label.generic_name, "ibuprofen");
        let stored = cache.get("drug_label:advil").await.unwrap().unwrap();
        assert!(stored.contains("ibuprofen"));
    }

    #[tokio::test]
    async fn disabled_cache_fetches_every_time() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drug/label.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(advil_body()))
            .expect(2)
            .mount(&server)
            .await;

        let service = service_for(server.uri(), None);
        assert_eq!(service.cache_backend(), None);
        assert!(service.lookup("Advil").await.unwrap().is_some());
        assert!(service.lookup("Advil").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn get_maps_missing_label_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drug/label.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let service = service_for(server.uri(), None);
        let err = service.get("Zzzyx").await.unwrap_err();
        assert!(matches!(err, LabelGateError::NotFound { .. }));
        assert!(err.to_string().contains("Zzzyx"));
    }

    #[tokio::test]
    async fn upstream_errors_pass_through_and_are_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drug/label.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let cache = Arc::new(MemoryCache::new());
        let service = service_for(server.uri(), Some(cache.clone()));
        let err = service.lookup("Advil").await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(cache.len().await, 0);
    }
}
