//! Folder listing
//!
//! Turns a directory into playable tracks. The listing is not sorted here;
//! ordering is applied by whoever starts folder playback.

use crate::error::Result;
use crate::types::Track;
use std::io;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// List regular files in `dir` whose extension is in `extensions`
///
/// Non-recursive; symlinks are followed. Extensions are matched
/// case-insensitively and given without the leading dot. An empty
/// `extensions` list accepts every file.
pub fn list_tracks(dir: &Path, extensions: &[String]) -> Result<Vec<Track>> {
    let mut tracks = Vec::new();
    let walker = WalkDir::new(dir).follow_links(true).min_depth(1).max_depth(1);

    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !has_allowed_extension(path, extensions) {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        tracks.push(Track::new(path.to_string_lossy().into_owned(), name));
    }

    debug!(dir = %dir.display(), count = tracks.len(), "Listed folder");
    Ok(tracks)
}

fn has_allowed_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
}
