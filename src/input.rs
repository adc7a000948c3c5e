use anyhow::Context;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Reads one host specification per line, skipping blank lines and `#` comments.
pub async fn read_hosts(path: impl AsRef<Path>) -> anyhow::Result<Vec<String>> {
    let path = path.as_ref();
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("cannot open host file {}", path.display()))?;

    let mut hosts = Vec::new();
    let mut lines = BufReader::new(file).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .with_context(|| format!("cannot read host file {}", path.display()))?
    {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        hosts.push(trimmed.to_string());
    }

    tracing::debug!(path = %path.display(), hosts = hosts.len(), "read host file");
    Ok(hosts)
}
