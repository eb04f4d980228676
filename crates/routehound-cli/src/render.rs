//! Catalog renderers.
//!
//! Renderers consume the sorted record sequence read-only; all scoring
//! and merging already happened in the core crate.

use anyhow::Result;
use routehound_core::AggregatedRecord;
use serde_json::json;
use tabled::{settings::Style, Table, Tabled};

use crate::Format;

const CSV_HEADER: [&str; 8] = [
    "endpoint",
    "method",
    "confidence",
    "severity",
    "params",
    "controller",
    "sources",
    "locations",
];

/// Render the catalog in the requested file format.
pub(crate) fn render(records: &[AggregatedRecord], format: Format) -> Result<String> {
    match format {
        Format::Csv => to_csv(records),
        Format::Json => Ok(serde_json::to_string_pretty(records)?),
        Format::Markdown => Ok(to_markdown(records)),
        Format::Postman => to_postman(records),
        Format::Text => Ok(to_text(records)),
    }
}

fn to_csv(records: &[AggregatedRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;
    for r in records {
        wtr.write_record([
            r.endpoint.clone(),
            r.method.clone(),
            r.confidence.to_string(),
            r.severity.to_string(),
            r.params.join("|"),
            r.controller.clone(),
            r.sources.join("|"),
            r.locations.join("|"),
        ])?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flush csv: {e}"))?;
    Ok(String::from_utf8(bytes)?)
}

fn to_markdown(records: &[AggregatedRecord]) -> String {
    let mut out = String::from(
        "| Endpoint | Method | Confidence | Severity | Params | Controller | Sources | Locations |\n\
         |----------|--------|------------|----------|--------|------------|---------|-----------|\n",
    );
    for r in records {
        out.push_str(&format!(
            "| {} | {} | {}% | {} | {} | {} | {} | {} |\n",
            r.endpoint,
            r.method,
            r.confidence,
            r.severity,
            r.params.join(", "),
            r.controller,
            r.sources.join(", "),
            r.locations.join(", "),
        ));
    }
    out
}

fn to_postman(records: &[AggregatedRecord]) -> Result<String> {
    let items: Vec<_> = records
        .iter()
        .map(|r| {
            let segments: Vec<&str> = r.endpoint.trim_matches('/').split('/').collect();
            json!({
                "name": format!("{} {}", r.method, r.endpoint),
                "request": {
                    "method": r.method,
                    "header": [],
                    "url": {
                        "raw": format!("{{{{baseUrl}}}}{}", r.endpoint),
                        "host": ["{{baseUrl}}"],
                        "path": segments,
                    },
                    "description": r.locations.join("; "),
                }
            })
        })
        .collect();
    let collection = json!({
        "info": {
            "name": "Discovered Endpoints",
            "schema": "https://schema.getpostman.com/json/collection/v2.1.0/collection.json",
        },
        "item": items,
    });
    Ok(serde_json::to_string_pretty(&collection)?)
}

fn to_text(records: &[AggregatedRecord]) -> String {
    let mut out = String::new();
    for r in records {
        out.push_str(&format!(
            "{:<8} {} ({}%, {}) [{}] {}\n",
            r.method,
            r.endpoint,
            r.confidence,
            r.severity,
            r.sources.join(", "),
            r.locations.join("; "),
        ));
    }
    out
}

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Conf")]
    confidence: String,
    #[tabled(rename = "Sev")]
    severity: String,
    #[tabled(rename = "Controller")]
    controller: String,
    #[tabled(rename = "Sources")]
    sources: String,
}

/// Console table for runs without an output file.
pub(crate) fn print_table(records: &[AggregatedRecord]) {
    if records.is_empty() {
        println!("No endpoints found.");
        return;
    }
    let rows: Vec<Row> = records
        .iter()
        .map(|r| Row {
            method: r.method.clone(),
            endpoint: r.endpoint.clone(),
            confidence: format!("{}%", r.confidence),
            severity: r.severity.to_string(),
            controller: r.controller.clone(),
            sources: r.sources.join(", "),
        })
        .collect();
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!("{} endpoint(s)", records.len());
}
