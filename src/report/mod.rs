pub mod csv;
pub mod json;

use crate::stego::{DecodeOutcome, EncodeOutcome};
use serde::Serialize;
use std::io;
use std::path::Path;

/// Outcome of an encode, as reported to the user
#[derive(Debug, Clone, Serialize)]
pub struct EncodeRecord {
    pub input: String,
    pub output: String,
    pub secret_name: String,
    pub width: u8,
    pub encrypted: bool,
    pub random_order: bool,
    pub bits_written: usize,
    pub capacity_bits: usize,
    /// `None` when the carrier is unchanged (infinite PSNR) or PSNR failed
    pub psnr_db: Option<f64>,
    pub quality: String,
}

/// Outcome of a decode, as reported to the user
#[derive(Debug, Clone, Serialize)]
pub struct DecodeRecord {
    pub input: String,
    pub output: String,
    pub name: String,
    pub ext: String,
    pub size: usize,
    pub width: u8,
    pub random_order: bool,
    pub encrypted: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum Report {
    Encode(EncodeRecord),
    Decode(DecodeRecord),
}

impl EncodeRecord {
    pub fn new(input: &Path, output: &Path, outcome: &EncodeOutcome) -> Self {
        let header = &outcome.stats.header;
        Self {
            input: input.display().to_string(),
            output: output.display().to_string(),
            secret_name: header.name.clone(),
            width: header.lsb_width,
            encrypted: header.is_encrypted(),
            random_order: header.is_random_start(),
            bits_written: outcome.stats.bits_written,
            capacity_bits: outcome.stats.capacity_bits,
            psnr_db: outcome.psnr.filter(|p| p.is_finite()),
            quality: outcome
                .quality
                .map(|q| q.to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

impl DecodeRecord {
    pub fn new(input: &Path, output: &Path, outcome: &DecodeOutcome) -> Self {
        Self {
            input: input.display().to_string(),
            output: output.display().to_string(),
            name: outcome.header.name.clone(),
            ext: outcome.header.ext.clone(),
            size: outcome.payload.len(),
            width: outcome.width,
            random_order: outcome.random_order,
            encrypted: outcome.header.is_encrypted(),
        }
    }
}

/// Write a report in the format matching the file extension (JSON, else CSV)
pub fn generate<P: AsRef<Path>>(path: P, report: &Report) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "json" => json::write(&mut file, report),
        _ => csv::write(&mut file, report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(super) fn encode_report() -> Report {
        Report::Encode(EncodeRecord {
            input: "cover.mp3".to_string(),
            output: "stego, final.mp3".to_string(),
            secret_name: "secret.txt".to_string(),
            width: 2,
            encrypted: true,
            random_order: true,
            bits_written: 512,
            capacity_bits: 80_000,
            psnr_db: Some(71.25),
            quality: "Excellent Quality".to_string(),
        })
    }

    #[test]
    fn test_generate_picks_format_by_extension() {
        let dir = tempfile::tempdir().expect("Should create temp dir");

        let json_path = dir.path().join("report.JSON");
        generate(&json_path, &encode_report()).expect("Should write JSON");
        let text = std::fs::read_to_string(&json_path).expect("Should read");
        assert!(text.trim_start().starts_with('{'));

        let csv_path = dir.path().join("report.csv");
        generate(&csv_path, &encode_report()).expect("Should write CSV");
        let text = std::fs::read_to_string(&csv_path).expect("Should read");
        assert!(text.starts_with("operation,"));
    }
}
