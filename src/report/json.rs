//! JSON report generation

use crate::report::Report;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct JsonReport<'a> {
    generated: String,
    #[serde(flatten)]
    report: &'a Report,
}

pub fn write<W: Write>(writer: &mut W, report: &Report) -> io::Result<()> {
    let doc = JsonReport {
        generated: chrono::Utc::now().to_rfc3339(),
        report,
    };

    let json = serde_json::to_string_pretty(&doc).map_err(io::Error::other)?;

    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::encode_report;

    #[test]
    fn test_json_fields() {
        let mut out = Vec::new();
        write(&mut out, &encode_report()).expect("Should write");
        let value: serde_json::Value = serde_json::from_slice(&out).expect("Valid JSON");

        assert_eq!(value["operation"], "encode");
        assert_eq!(value["width"], 2);
        assert_eq!(value["psnr_db"], 71.25);
        assert_eq!(value["secret_name"], "secret.txt");
        assert!(value["generated"].as_str().is_some_and(|s| s.contains('T')));
    }
}
