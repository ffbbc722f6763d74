//! Directory ingestion helpers.
//!
//! Collects text files below a directory and splits them into overlapping
//! chunks that become individual documents.

use crate::config::IndexerConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IndexerError>;

/// A text file read for ingestion.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

/// Splits text into chunks of at most `chunk_size` bytes. Each chunk after
/// the first repeats the last `overlap` bytes of the one before it.
///
/// Chunk boundaries are moved to UTF-8 character boundaries, so a chunk never
/// splits a multi-byte character. A single character wider than `chunk_size`
/// becomes a chunk of its own. With an overlap of zero the chunks concatenate
/// back to `text`.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }
    if text.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let mut end = floor_char_boundary(text, (start + chunk_size).min(text.len()));
        if end <= start {
            end = ceil_char_boundary(text, start + 1);
        }

        chunks.push(text[start..end].to_string());
        if end == text.len() {
            break;
        }

        // Step back from the real end, but always move forward.
        let next = floor_char_boundary(text, end.saturating_sub(overlap));
        start = if next > start {
            next
        } else {
            ceil_char_boundary(text, start + 1)
        };
    }

    chunks
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// Recursively collects readable text files below `dir`.
///
/// Files are returned in path order so repeated runs ingest in the same order.
/// Unreadable or non-UTF-8 files are skipped.
pub async fn collect_files(dir: &Path, config: &IndexerConfig) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = fs::read_dir(&current).await?;
        let mut children = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            children.push(entry.path());
        }
        children.sort();

        for path in children {
            if should_exclude(&path, &config.exclude_patterns) {
                continue;
            }
            if path.is_dir() {
                pending.push(path);
            } else if is_indexable(&path, &config.extensions) {
                match fs::read_to_string(&path).await {
                    Ok(content) => files.push(SourceFile { path, content }),
                    Err(e) => debug!(file = %path.display(), error = %e, "Skipping unreadable file"),
                }
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Checks a file extension against the allow-list. An empty list allows all.
fn is_indexable(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e == ext))
        .unwrap_or(false)
}

/// A path is excluded if its file name contains any exclude pattern.
fn should_exclude(path: &Path, patterns: &[String]) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| patterns.iter().any(|pattern| name.contains(pattern.as_str())))
        .unwrap_or(false)
}
