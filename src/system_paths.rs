//! Readers for the system path-list files (`/etc/paths`, `/etc/paths.d/*`).

use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// One directory per line; blank lines and `#` comments are skipped.
pub fn read_paths_file(path: &Path) -> io::Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Reads `<root>/etc/paths` then every regular file in `<root>/etc/paths.d`
/// in name order. Unreadable files are logged and skipped.
pub fn read_system_paths(root: &Path) -> Vec<String> {
    let etc = root.join("etc");
    let mut out = Vec::new();

    let main = etc.join("paths");
    if main.exists() {
        extend_from(&mut out, &main);
    }

    for file in paths_d_files(&etc.join("paths.d")) {
        extend_from(&mut out, &file);
    }

    tracing::debug!(root = %root.display(), count = out.len(), "read system paths");
    out
}

fn paths_d_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "cannot list system path directory");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| !t.is_dir()).unwrap_or(false))
        .map(|e| e.path())
        .collect();
    files.sort();
    files
}

fn extend_from(out: &mut Vec<String>, file: &Path) {
    match read_paths_file(file) {
        Ok(paths) => out.extend(paths),
        Err(e) => {
            tracing::warn!(file = %file.display(), error = %e, "skipping unreadable system path file");
        }
    }
}
