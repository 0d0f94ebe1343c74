//! CSV transcription import

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;
use tcv_common::csv_row::{has_required_headers, CsvRow};

use super::find_model;
use crate::client::TcvClient;

/// Parse a CSV file with a header row into header → cell rows
///
/// Rows whose cells are all blank are dropped.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<CsvRow>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = csv
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(str::to_string)
        .collect();

    if !has_required_headers(&headers) {
        bail!(
            "CSV must have an audio name column (audio_name, audio or filename) and a transcription column"
        );
    }

    let mut rows: Vec<CsvRow> = Vec::new();
    for record in csv.records() {
        let record = record.context("Failed to parse CSV record")?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(headers.iter().cloned().zip(record.iter().map(str::to_string)).collect());
    }
    Ok(rows)
}

pub async fn run(client: &TcvClient, model_key: &str, path: &Path) -> Result<()> {
    let models = client.list_models().await?;
    let Some(model) = find_model(&models, model_key) else {
        bail!("Model not found: {model_key}");
    };

    let file = std::fs::File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let rows = read_rows(file)?;
    if rows.is_empty() {
        bail!("No valid CSV data provided");
    }
    println!("Importing {} rows for {}", rows.len(), model.model_name);

    let response = client.import_csv(&model.id, rows).await?;
    let report = &response.results;
    println!("{}", response.message);
    println!("  processed:            {}", report.processed);
    println!("  transcriptions added: {}", report.transcriptions_added);
    println!("  skipped rows:         {}", report.skipped);
    if !report.audio_not_found.is_empty() {
        println!("  audio not found ({}):", report.audio_not_found.len());
        for name in &report.audio_not_found {
            println!("    {name}");
        }
    }
    for error in &report.errors {
        println!("  error  {}: {}", error.audio_name, error.error);
    }
    Ok(())
}
