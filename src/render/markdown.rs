use reqwest::Url;

use crate::entities::label::NormalizedLabel;

const DAILYMED_SEARCH: &str = "https://dailymed.nlm.nih.gov/dailymed/search.cfm";

fn append_evidence_urls(mut body: String, urls: Vec<(&str, String)>) -> String {
    let links = urls
        .into_iter()
        .filter_map(|(label, url)| {
            let label = label.trim();
            let url = url.trim();
            if label.is_empty() || url.is_empty() {
                return None;
            }
            Some(format!("[{label}]({url})"))
        })
        .collect::<Vec<_>>();
    if links.is_empty() {
        return body;
    }
    if !body.ends_with('\n') {
        body.push('\n');
    }
    body.push('\n');
    body.push_str(&links.join(" | "));
    body.push('\n');
    body
}

fn label_evidence_urls(label: &NormalizedLabel) -> Vec<(&'static str, String)> {
    let mut urls = Vec::new();
    if label.brand_name == crate::transform::label::UNKNOWN {
        return urls;
    }
    if let Ok(url) = Url::parse_with_params(DAILYMED_SEARCH, &[("query", &label.brand_name)]) {
        urls.push(("DailyMed", url.to_string()));
    }
    urls
}

pub fn label_markdown(query: &str, label: &NormalizedLabel) -> String {
    let mut out = format!("# {} ({})\n\n", label.brand_name, label.generic_name);
    out.push_str(&format!("Lookup: `{query}`\n"));
    for (heading, text) in [
        ("Purpose", &label.purpose),
        ("Indications", &label.indications),
        ("Warnings", &label.warnings),
        ("Interactions", &label.interactions),
    ] {
        out.push_str(&format!("\n## {heading}\n\n{}\n", text.trim()));
    }
    append_evidence_urls(out, label_evidence_urls(label))
}
