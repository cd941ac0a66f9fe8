//! Domain source reading.

use std::path::Path;

use anyhow::{Context, Result};
use futures::stream::{self, BoxStream, StreamExt};
use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Returns the domain on `line`, or `None` for blank lines and `#` comments.
pub fn parse_domain_line(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        None
    } else {
        Some(trimmed)
    }
}

/// Streams domains from any buffered reader, one per line.
///
/// The stream ends at end of input or at the first read error, which is logged.
pub fn domains_from_reader<R>(reader: R) -> BoxStream<'static, String>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    stream::unfold(reader.lines(), |mut lines| async move {
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(domain) = parse_domain_line(&line) {
                        return Some((domain.to_string(), lines));
                    }
                }
                Ok(None) => return None,
                Err(e) => {
                    warn!("Failed to read domain list, stopping input: {e}");
                    return None;
                }
            }
        }
    })
    .boxed()
}

/// Opens the domain source: a file path, or `-` for stdin.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub async fn read_domains(path: &Path) -> Result<BoxStream<'static, String>> {
    if path.as_os_str() == "-" {
        info!("Reading domains from stdin");
        return Ok(domains_from_reader(BufReader::new(tokio::io::stdin())));
    }

    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open domain list {}", path.display()))?;
    info!("Reading domains from {}", path.display());
    Ok(domains_from_reader(BufReader::new(file)))
}
