//! Tabular rendering of scored items and merged results.

use std::io::Write;

use serde::Serialize;

use crate::error::{ApprovalError, Result};
use crate::queue::{Action, Decision, Item, Recommendation, Suggestion};
use crate::request::{format_value, Features};

/// File format for persisted results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }

    fn delimiter(&self) -> u8 {
        match self {
            OutputFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use csv, tsv, or json.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// One item joined with its decision.
#[derive(Debug, Serialize)]
pub struct MergedRecord<'a> {
    pub id: &'a str,
    pub features: &'a Features,
    pub confidence: f64,
    pub suggestion: Suggestion,
    pub recommendation: Recommendation,
    pub action: Action,
    pub decided_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<&'a str>,
}

impl<'a> MergedRecord<'a> {
    pub fn new(item: &'a Item, decision: &'a Decision) -> Self {
        Self {
            id: item.id(),
            features: item.features(),
            confidence: item.confidence(),
            suggestion: item.suggestion(),
            recommendation: item.recommendation(),
            action: decision.action,
            decided_at: decision.decided_at.to_rfc3339(),
            decided_by: decision.decided_by.as_deref(),
        }
    }
}

pub(crate) fn write_merged<W: Write>(
    writer: W,
    records: &[MergedRecord<'_>],
    format: OutputFormat,
) -> Result<()> {
    if format == OutputFormat::Json {
        serde_json::to_writer_pretty(writer, records)?;
        return Ok(());
    }

    let Some(first) = records.first() else {
        return Ok(());
    };
    let columns = feature_columns(first.features);

    let mut csv = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_writer(writer);

    let mut header = vec!["id".to_string()];
    header.extend(columns.iter().cloned());
    header.extend(
        [
            "confidence",
            "suggestion",
            "recommendation",
            "action",
            "decided_at",
            "decided_by",
        ]
        .map(String::from),
    );
    csv.write_record(&header)?;

    for record in records {
        let mut row = vec![record.id.to_string()];
        row.extend(feature_values(record.id, record.features, &columns)?);
        row.push(format_value(record.confidence));
        row.push(record.suggestion.label().to_string());
        row.push(record.recommendation.label().to_string());
        row.push(record.action.label().to_string());
        row.push(record.decided_at.clone());
        row.push(record.decided_by.unwrap_or_default().to_string());
        csv.write_record(&row)?;
    }

    csv.flush().map_err(|e| ApprovalError::Persistence(e.to_string()))?;
    Ok(())
}

pub(crate) fn write_scored<W: Write>(writer: W, items: &[Item]) -> Result<()> {
    let Some(first) = items.first() else {
        return Err(ApprovalError::InvalidBatch(
            "No scored items to export".to_string(),
        ));
    };
    let columns = feature_columns(first.features());

    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["id".to_string()];
    header.extend(columns.iter().cloned());
    header.extend(["confidence", "suggestion", "recommendation"].map(String::from));
    csv.write_record(&header)?;

    for item in items {
        let mut row = vec![item.id().to_string()];
        row.extend(feature_values(item.id(), item.features(), &columns)?);
        row.push(format_value(item.confidence()));
        row.push(item.suggestion().label().to_string());
        row.push(item.recommendation().label().to_string());
        csv.write_record(&row)?;
    }

    csv.flush().map_err(|e| ApprovalError::Persistence(e.to_string()))?;
    Ok(())
}

fn feature_columns(features: &Features) -> Vec<String> {
    features.keys().cloned().collect()
}

fn feature_values(id: &str, features: &Features, columns: &[String]) -> Result<Vec<String>> {
    columns
        .iter()
        .map(|name| {
            features.get(name).map(|v| format_value(*v)).ok_or_else(|| {
                ApprovalError::InvalidBatch(format!("Item '{}' is missing feature '{}'", id, name))
            })
        })
        .collect()
}
