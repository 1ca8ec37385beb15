use std::time::Instant;

use http::Extensions;
use reqwest::Url;
use reqwest_middleware::{Middleware, Next};
use tracing::{debug, warn};

const REDACTED_PARAMS: &[&str] = &["api_key"];

/// Logs each outbound request with its status and latency.
#[derive(Clone, Debug, Default)]
pub(crate) struct OutboundTraceMiddleware;

/// Renders a URL for logs with credential query values masked.
pub(crate) fn redacted_url(url: &Url) -> String {
    if url.query().is_none() {
        return url.to_string();
    }

    let mut out = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if REDACTED_PARAMS.contains(&k.as_ref()) {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    out.query_pairs_mut().clear().extend_pairs(pairs);
    out.to_string()
}

#[async_trait::async_trait]
impl Middleware for OutboundTraceMiddleware {
    async fn handle(
        &self,
        req: reqwest::Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        let method = req.method().clone();
        let url = redacted_url(req.url());
        let start = Instant::now();

        let result = next.run(req, extensions).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(resp) => debug!(
                %method,
                url = %url,
                status = resp.status().as_u16(),
                elapsed_ms,
                "outbound request"
            ),
            Err(err) => warn!(
                %method,
                url = %url,
                elapsed_ms,
                error = %err,
                "outbound request failed"
            ),
        }
        result
    }
}
