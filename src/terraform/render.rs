//! Rendering of moves as `moved` blocks or `state mv` commands.

use chrono::{DateTime, Utc};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::analysis::Move;
use crate::error::Result;

/// Renders moves as HCL `moved` blocks separated by blank lines.
#[must_use]
pub fn render_moved_blocks(moves: &[Move]) -> String {
    moves
        .iter()
        .map(|m| format!("moved {{\n  from = {}\n  to   = {}\n}}\n", m.from, m.to))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders one `state mv` command per move.
#[must_use]
pub fn render_state_mv_commands(bin: &str, moves: &[Move]) -> String {
    moves
        .iter()
        .map(|m| format!("{bin} state mv {} {}\n", shell_quote(&m.from), shell_quote(&m.to)))
        .collect()
}

/// Appends moves as `moved` blocks to `path`, creating the file if needed.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or written.
pub async fn append_moves_to_file(path: &Path, moves: &[Move], now: DateTime<Utc>) -> Result<()> {
    let existing_len = match tokio::fs::metadata(path).await {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
        Err(e) => return Err(e.into()),
    };

    let mut content = String::new();
    if existing_len > 0 {
        content.push('\n');
    }
    content.push_str(&format!("# Added by automv on {}\n\n", now.to_rfc3339()));
    content.push_str(&render_moved_blocks(moves));

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;

    info!("Appended {} moved blocks to {}", moves.len(), path.display());
    Ok(())
}

/// Quotes a string for POSIX shells.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
