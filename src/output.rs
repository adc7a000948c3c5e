mod table;

use crate::model::{OutputConfig, OutputFormat, ScanResults};
use std::io::{BufWriter, Write};

pub struct OutputSink<W: Write> {
    cfg: OutputConfig,
    writer: BufWriter<W>,
}

impl OutputSink<std::io::Stdout> {
    pub fn stdout(cfg: OutputConfig) -> Self {
        Self::new(cfg, std::io::stdout())
    }
}

impl<W: Write> OutputSink<W> {
    pub fn new(cfg: OutputConfig, writer: W) -> Self {
        Self {
            cfg,
            writer: BufWriter::new(writer),
        }
    }

    pub fn write_results(&mut self, results: &ScanResults) -> anyhow::Result<()> {
        match self.cfg.format {
            OutputFormat::Table => table::write_table(&mut self.writer, results, self.cfg.color)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut self.writer, results)?;
                writeln!(self.writer)?;
            }
            OutputFormat::Jsonl => {
                for host in &results.hosts {
                    let line = serde_json::to_string(host)?;
                    writeln!(self.writer, "{line}")?;
                }
            }
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> anyhow::Result<W> {
        self.writer
            .into_inner()
            .map_err(|err| anyhow::anyhow!("failed to flush output: {}", err.error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HostResult, ProbeOutcome, TlsVersion};
    use chrono::Utc;

    fn sample() -> ScanResults {
        let mut modern = HostResult::new("modern.example");
        for version in TlsVersion::ALL {
            let outcome = if version >= TlsVersion::Tls12 {
                ProbeOutcome::Supported
            } else {
                ProbeOutcome::NotSupported
            };
            modern.record(version, outcome);
        }

        let mut gone = HostResult::new("gone.invalid:8443");
        for version in TlsVersion::ALL {
            gone.record(version, ProbeOutcome::ConnectionFailed("no such host".into()));
        }

        ScanResults {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            hosts: vec![gone, modern],
        }
    }

    fn render(format: OutputFormat) -> String {
        let cfg = OutputConfig {
            format,
            color: false,
        };
        let mut sink = OutputSink::new(cfg, Vec::new());
        sink.write_results(&sample()).unwrap();
        String::from_utf8(sink.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn table_has_one_row_per_host() {
        let text = render(OutputFormat::Table);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0].split_whitespace().collect::<Vec<_>>(),
            ["Host", "TLS1.0", "TLS1.1", "TLS1.2", "TLS1.3", "Error"]
        );
        assert_eq!(
            lines[1].split_whitespace().collect::<Vec<_>>(),
            ["gone.invalid:8443", "-", "-", "-", "-", "no", "such", "host"]
        );
        assert_eq!(
            lines[2].split_whitespace().collect::<Vec<_>>(),
            ["modern.example", "N", "N", "Y", "Y", "-"]
        );
    }

    #[test]
    fn jsonl_emits_a_line_per_host() {
        let text = render(OutputFormat::Jsonl);
        let rows: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["error"], "no such host");
        assert_eq!(rows[1]["tls12"], "supported");
        assert_eq!(rows[1]["tls10"], "not_supported");
        assert!(rows[1].get("error").is_none());
    }

    #[test]
    fn json_wraps_the_whole_scan() {
        let text = render(OutputFormat::Json);
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["hosts"].as_array().unwrap().len(), 2);
        assert!(doc["started_at"].is_string());
    }
}
