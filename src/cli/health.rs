use std::time::Instant;

use crate::entities::label::LabelService;

#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthRow {
    pub api: String,
    pub status: String,
    pub latency: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthReport {
    pub healthy: usize,
    pub total: usize,
    pub rows: Vec<HealthRow>,
}

impl HealthReport {
    pub fn all_healthy(&self) -> bool {
        self.healthy == self.total
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# labelgate Health Check\n\n");
        out.push_str("| Dependency | Status | Latency |\n");
        out.push_str("|------------|--------|---------|\n");
        for row in &self.rows {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                row.api, row.status, row.latency
            ));
        }
        out.push_str(&format!(
            "\nStatus: {}/{} dependencies healthy\n",
            self.healthy, self.total
        ));
        out
    }
}

/// A known label that openFDA always has; a miss still proves reachability.
const PROBE_DRUG: &str = "ibuprofen";

async fn check_openfda(labels: &LabelService) -> HealthRow {
    let start = Instant::now();
    let result = labels.source().label_search(PROBE_DRUG).await;
    let elapsed = start.elapsed().as_millis();

    match result {
        Ok(_) => HealthRow {
            api: "OpenFDA".into(),
            status: "ok".into(),
            latency: format!("{elapsed}ms"),
        },
        Err(err) => HealthRow {
            api: "OpenFDA".into(),
            status: "error".into(),
            latency: format!("{elapsed}ms ({err})"),
        },
    }
}

async fn check_cache(labels: &LabelService) -> Option<HealthRow> {
    let cache = labels.cache()?;
    let start = Instant::now();
    let result = cache.ping().await;
    let elapsed = start.elapsed().as_millis();
    let api = format!("Cache ({})", cache.backend());

    Some(match result {
        Ok(()) => HealthRow {
            api,
            status: "ok".into(),
            latency: format!("{elapsed}ms"),
        },
        Err(err) => HealthRow {
            api,
            status: "error".into(),
            latency: format!("{elapsed}ms ({err})"),
        },
    })
}

/// Probes the label API and, when enabled, the cache store.
pub async fn check(labels: &LabelService) -> HealthReport {
    let (openfda, cache) = tokio::join!(check_openfda(labels), check_cache(labels));

    let mut rows = vec![openfda];
    rows.extend(cache);
    let healthy = rows.iter().filter(|r| r.status == "ok").count();
    HealthReport {
        healthy,
        total: rows.len(),
        rows,
    }
}
