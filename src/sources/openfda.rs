use serde::Deserialize;

use crate::entities::label::RawLabel;
use crate::error::LabelGateError;

pub(crate) const OPENFDA_API: &str = "openfda";
const LABEL_PATH: &str = "drug/label.json";

/// Client for the openFDA drug label endpoint.
#[derive(Clone)]
pub struct OpenFdaClient {
    client: reqwest_middleware::ClientWithMiddleware,
    base: String,
    api_key: String,
}

impl OpenFdaClient {
    pub fn new(
        client: reqwest_middleware::ClientWithMiddleware,
        base: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base: base.into(),
            api_key: api_key.into(),
        }
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(crate) fn escape_query_value(value: &str) -> String {
        crate::utils::query::escape_lucene_value(value)
    }

    /// Matches `drug_name` exactly against the brand or generic name.
    pub(crate) fn label_query(drug_name: &str) -> String {
        let escaped = Self::escape_query_value(drug_name);
        format!("openfda.brand_name:\"{escaped}\" OR openfda.generic_name:\"{escaped}\"")
    }

    /// Fetches the first label whose brand or generic name matches `drug_name`.
    ///
    /// The name is passed through as-is; openFDA does the matching. Returns
    /// `Ok(None)` when openFDA has no match (absent, null or empty result list,
    /// or HTTP 404).
    ///
    /// # Errors
    ///
    /// Returns an error for network failures, non-404 error statuses and
    /// undecodable payloads. No retries are attempted.
    pub async fn label_search(&self, drug_name: &str) -> Result<Option<RawLabel>, LabelGateError> {
        let q = Self::label_query(drug_name);
        let url = self.endpoint(LABEL_PATH);
        let req = self.client.get(&url).query(&[
            ("search", q.as_str()),
            ("limit", "1"),
            ("api_key", self.api_key.as_str()),
        ]);

        let resp = req.send().await?;
        let status = resp.status();
        let content_type = resp.headers().get(reqwest::header::CONTENT_TYPE).cloned();
        let bytes = crate::sources::read_limited_body(resp, OPENFDA_API).await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(drug = drug_name, "openFDA returned 404 for label search");
            return Ok(None);
        }

        if !status.is_success() {
            let excerpt = crate::sources::body_excerpt(&bytes);
            return Err(LabelGateError::Api {
                api: OPENFDA_API.to_string(),
                message: format!("HTTP {status}: {excerpt}"),
            });
        }

        crate::sources::ensure_json_content_type(OPENFDA_API, content_type.as_ref(), &bytes)?;
        let body: LabelSearchResponse =
            serde_json::from_slice(&bytes).map_err(|source| LabelGateError::ApiJson {
                api: OPENFDA_API.to_string(),
                source,
            })?;

        Ok(body.results.and_then(|results| results.into_iter().next()))
    }
}

#[derive(Debug, Deserialize)]
struct LabelSearchResponse {
    #[serde(default)]
    results: Option<Vec<RawLabel>>,
}
