//! Path utilities

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Normalize an archive entry path.
///
/// Separators become `\`, every leading `..\` is removed, then any
/// remaining leading separators. `../../Config/Game.ini` and
/// `..\..\Config\Game.ini` both become `Config\Game.ini`.
pub fn normalize_entry_path(raw: &str) -> String {
    let mut path = raw.replace('/', "\\");
    while let Some(rest) = path.strip_prefix("..\\") {
        path = rest.to_string();
    }
    path.trim_start_matches('\\').to_string()
}

/// Resolve a normalized entry path under an output root.
///
/// Only plain name components are kept, so the result can never leave
/// `root`: `.`, `..`, empty components and drive prefixes are dropped.
///
/// # Errors
/// Returns [`Error::InvalidPath`] if no usable component remains.
pub fn entry_output_path<P: AsRef<Path>>(root: P, entry_path: &str) -> Result<PathBuf> {
    let mut out = root.as_ref().to_path_buf();
    let mut kept = 0usize;

    for component in entry_path.split(['\\', '/']) {
        match component {
            "" | "." => {}
            ".." => tracing::warn!("dropping '..' in entry path '{}'", entry_path),
            c if c.ends_with(':') => {
                tracing::warn!("dropping drive prefix '{}' in entry path '{}'", c, entry_path);
            }
            c => {
                out.push(c);
                kept += 1;
            }
        }
    }

    if kept == 0 {
        return Err(Error::InvalidPath(format!(
            "entry path '{entry_path}' has no file name"
        )));
    }
    Ok(out)
}

/// Get relative path of a file under `base` with `\` separators
pub fn relative_entry_path<P: AsRef<Path>>(path: P, base: P) -> Option<String> {
    let relative = path.as_ref().strip_prefix(base.as_ref()).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("\\"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_exactly_leading_traversal() {
        for k in 0..5 {
            let raw = format!("{}Config\\Game.ini", "..\\".repeat(k));
            assert_eq!(normalize_entry_path(&raw), "Config\\Game.ini");
        }
    }

    #[test]
    fn test_forward_slashes_normalized() {
        assert_eq!(normalize_entry_path("../../cfg/Game.ini"), "cfg\\Game.ini");
        assert_eq!(normalize_entry_path("..\\../cfg/Game.ini"), "cfg\\Game.ini");
    }

    #[test]
    fn test_leading_separators_stripped() {
        assert_eq!(normalize_entry_path("..\\..\\\\cfg\\a.ini"), "cfg\\a.ini");
        assert_eq!(normalize_entry_path("/cfg/a.ini"), "cfg\\a.ini");
    }

    #[test]
    fn test_interior_traversal_kept_in_name() {
        // only the leading prefix is part of the name convention
        assert_eq!(normalize_entry_path("..\\a\\..\\b.ini"), "a\\..\\b.ini");
    }

    #[test]
    fn test_output_path_stays_under_root() {
        let root = Path::new("out");
        assert_eq!(
            entry_output_path(root, "cfg\\Game.ini").unwrap(),
            root.join("cfg").join("Game.ini")
        );
        assert_eq!(
            entry_output_path(root, "a\\..\\..\\b.ini").unwrap(),
            root.join("a").join("b.ini")
        );
        assert_eq!(
            entry_output_path(root, "C:\\Windows\\x.ini").unwrap(),
            root.join("Windows").join("x.ini")
        );
    }

    #[test]
    fn test_output_path_requires_a_name() {
        assert!(matches!(
            entry_output_path("out", "..\\.\\"),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn test_relative_entry_path() {
        let base = Path::new("root");
        let file = base.join("Config").join("Game.ini");
        assert_eq!(
            relative_entry_path(file.as_path(), base).as_deref(),
            Some("Config\\Game.ini")
        );
        assert_eq!(relative_entry_path(base, base), None);
    }
}
