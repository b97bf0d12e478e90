//! Request telemetry sink
//!
//! Appends one JSON record per answered request to a log file. Telemetry is
//! observability only: every failure here is swallowed and must never affect
//! the response.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use log::warn;
use serde_json::json;

use askdocs_core::Pathway;

/// Append-only JSON-line request log
pub struct Telemetry {
    path: PathBuf,
}

impl Telemetry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Record one answered request. Failures are logged and swallowed.
    pub fn log_request(&self, question: &str, pathway: Pathway, latency_s: f64, index_loaded: bool) {
        let record = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "question_len": question.chars().count(),
            "pathway": pathway.to_string(),
            "latency_s": latency_s,
            "index_loaded": index_loaded,
        });
        if let Err(e) = self.append(&record) {
            warn!("telemetry logging failed: {}", e);
        }
    }

    fn append(&self, record: &serde_json::Value) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_json_line_per_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.log");
        let telemetry = Telemetry::new(&path);

        telemetry.log_request("When does the contract expire?", Pathway::Rag, 0.42, true);
        telemetry.log_request("hi", Pathway::None, 0.01, false);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["pathway"], "RAG");
        assert_eq!(first["question_len"], 30);
        assert_eq!(first["index_loaded"], true);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["pathway"], "none");
    }

    #[test]
    fn failures_are_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let telemetry = Telemetry::new(dir.path().join("missing").join("telemetry.log"));
        // Parent directory does not exist; the call must still return.
        telemetry.log_request("question", Pathway::None, 0.0, false);
    }
}
