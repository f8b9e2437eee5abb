use std::io;
use std::path::Path;

use tracing::info;

/// Cursors of pages 2, 3, ... one per non-empty line.
pub fn parse_cursors(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read the cursor file. A missing file means only the first page is
/// addressable.
pub fn load_cursors(path: &Path) -> io::Result<Vec<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let cursors = parse_cursors(&contents);
            info!(path = %path.display(), cursors = cursors.len(), "page cursors loaded");
            Ok(cursors)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "cursor file not found; only page 1 is available");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}
