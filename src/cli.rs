use crate::model::{Config, OutputConfig, OutputFormat, DEFAULT_TIMEOUT_SECS};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

const EXAMPLES: &str = "\
Examples:
  tlsversion google.com
  tlsversion example.com:8443
  tlsversion google.com example.com:8443
  tlsversion --timeout 5 google.com example.com:8443
  tlsversion --file some_hosts.txt";

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Displays the TLS versions (TLS1.0, TLS1.1, TLS1.2, TLS1.3) supported by servers",
    long_about = None,
    after_help = EXAMPLES
)]
pub struct Cli {
    /// Hosts to probe, as HOST or HOST:PORT (port defaults to 443)
    #[arg(value_name = "HOST")]
    pub hosts: Vec<String>,

    /// File containing hosts (one per line)
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Connection timeout in seconds, per TLS version attempt
    #[arg(
        short = 't',
        long = "timeout",
        value_name = "SECONDS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Output debug information
    #[arg(short = 'd', long = "debug", action = ArgAction::SetTrue)]
    pub debug: bool,

    /// Output format
    #[arg(short = 'o', long = "output", default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Disable colors in table output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,

    /// Maximum number of hosts probed at the same time (unlimited by default)
    #[arg(short = 'c', long = "concurrency", value_name = "N")]
    pub concurrency: Option<usize>,
}

impl Cli {
    /// Gathers hosts from `--file` (first) and the positional arguments.
    pub async fn into_config(self) -> anyhow::Result<Config> {
        if self.concurrency == Some(0) {
            anyhow::bail!("concurrency must be greater than zero");
        }

        let mut hosts = match &self.file {
            Some(path) => crate::input::read_hosts(path).await?,
            None => Vec::new(),
        };
        hosts.extend(self.hosts);

        if hosts.is_empty() {
            anyhow::bail!("not enough options or arguments: pass HOST arguments or --file");
        }

        Ok(Config {
            hosts,
            timeout: Duration::from_secs(self.timeout_secs),
            concurrency: self.concurrency,
            output: OutputConfig {
                format: self.output,
                color: !self.no_color,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["tlsversion", "example.com"]).unwrap();
        assert_eq!(cli.timeout_secs, 2);
        assert_eq!(cli.output, OutputFormat::Table);
        assert!(!cli.debug);
        assert_eq!(cli.concurrency, None);
    }

    #[test]
    fn rejects_zero_timeout() {
        assert!(Cli::try_parse_from(["tlsversion", "-t", "0", "example.com"]).is_err());
    }

    #[tokio::test]
    async fn requires_some_host() {
        let cli = Cli::try_parse_from(["tlsversion", "--debug"]).unwrap();
        let err = cli.into_config().await.unwrap_err();
        assert!(err.to_string().contains("not enough"));
    }

    #[tokio::test]
    async fn rejects_zero_concurrency() {
        let cli = Cli::try_parse_from(["tlsversion", "-c", "0", "example.com"]).unwrap();
        assert!(cli.into_config().await.is_err());
    }

    #[tokio::test]
    async fn merges_file_and_arguments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# hosts").unwrap();
        writeln!(file, "from-file.example").unwrap();
        file.flush().unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let cli = Cli::try_parse_from([
            "tlsversion",
            "--file",
            path.as_str(),
            "--timeout",
            "5",
            "--no-color",
            "-o",
            "jsonl",
            "arg.example:8443",
        ])
        .unwrap();
        let cfg = cli.into_config().await.unwrap();

        assert_eq!(cfg.hosts, ["from-file.example", "arg.example:8443"]);
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.output.format, OutputFormat::Jsonl);
        assert!(!cfg.output.color);
    }
}
