#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]
#![deny(clippy::unused_async)]

use std::path::{Component, Path, PathBuf};

/// Error produced while resolving a script-supplied path against a sandbox
/// root.
#[derive(Debug)]
pub enum SandboxError {
    /// The path resolved outside the sandbox root
    Escape { requested: String },
    Io(std::io::Error),
}

impl std::fmt::Display for SandboxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SandboxError::Escape { requested } => {
                write!(f, "path escapes the safe path: {requested}")
            }
            SandboxError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SandboxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SandboxError::Io(e) => Some(e),
            SandboxError::Escape { .. } => None,
        }
    }
}

impl From<std::io::Error> for SandboxError {
    fn from(e: std::io::Error) -> Self {
        SandboxError::Io(e)
    }
}

/// Resolve a script-supplied path against a sandbox root.
///
/// `root` must already be canonical (the caller canonicalizes it when the
/// safe path is configured). Relative requests are joined onto the root,
/// `.` and `..` are folded lexically, and the longest existing prefix is
/// canonicalized so a symlink cannot carry the path outside the root. The
/// leaf may be nonexistent; writes are allowed to create it.
///
/// ```
/// # use sandjs_path_util::resolve_sandboxed;
/// # #[cfg(unix)]
/// # {
/// let root = std::env::temp_dir().canonicalize().unwrap();
/// let resolved = resolve_sandboxed(&root, "sub/../report.json").unwrap();
/// assert_eq!(resolved, root.join("report.json"));
/// assert!(resolve_sandboxed(&root, "../etc/passwd").is_err());
/// # }
/// ```
///
/// # Errors
/// Returns `SandboxError::Escape` when the resolved path is not under the
/// root, and `SandboxError::Io` when canonicalizing an existing prefix fails.
pub fn resolve_sandboxed(root: &Path, requested: &str) -> Result<PathBuf, SandboxError> {
    let escape = || SandboxError::Escape {
        requested: requested.to_string(),
    };

    let requested_path = Path::new(requested);
    let joined = if requested_path.is_absolute() {
        requested_path.to_path_buf()
    } else {
        root.join(requested_path)
    };

    let normalized = normalize_lexically(&joined).ok_or_else(escape)?;

    let resolved = match split_existing(&normalized) {
        Some((existing, tail)) => {
            let canonical = strip_unc_prefix(std::fs::canonicalize(existing)?);
            canonical.join(tail)
        }
        None => normalized,
    };

    if resolved.starts_with(root) {
        Ok(resolved)
    } else {
        Err(escape())
    }
}

/// Fold `.` and `..` components without touching the filesystem. Returns
/// `None` when `..` would climb above the root of the path.
fn normalize_lexically(path: &Path) -> Option<PathBuf> {
    let mut stack: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => stack.push(component),
            Component::CurDir => {}
            Component::ParentDir => match stack.last() {
                Some(Component::Normal(_)) => {
                    stack.pop();
                }
                _ => return None,
            },
            Component::Normal(_) => stack.push(component),
        }
    }

    let mut normalized = PathBuf::new();
    for component in stack {
        normalized.push(component.as_os_str());
    }
    Some(normalized)
}

/// Split a normalized path into its longest existing ancestor and the
/// remaining (nonexistent) tail. Returns `None` when nothing on the path
/// exists yet.
fn split_existing(path: &Path) -> Option<(&Path, PathBuf)> {
    for ancestor in path.ancestors() {
        if ancestor.exists() {
            let tail = path
                .strip_prefix(ancestor)
                .map(Path::to_path_buf)
                .unwrap_or_default();
            return Some((ancestor, tail));
        }
    }
    None
}

/// Strips the UNC prefix from a Windows path.
///
/// Canonicalized paths on Windows carry the `\\?\` prefix, which would make
/// the `starts_with` containment check fail against an unprefixed root.
///
/// On non-Windows platforms, this function returns the path unchanged.
#[cfg(not(windows))]
#[inline]
pub fn strip_unc_prefix(path: PathBuf) -> PathBuf {
    path
}

/// Strips the unc prefix (ex. \\?\) from Windows paths.
#[cfg(windows)]
pub fn strip_unc_prefix(path: PathBuf) -> PathBuf {
    use std::path::Prefix;

    let mut components = path.components();
    match components.next() {
        Some(Component::Prefix(prefix)) => {
            match prefix.kind() {
                // \\?\device
                Prefix::Verbatim(device) => {
                    let mut path = PathBuf::new();
                    path.push(format!(r"\\{}\", device.to_string_lossy()));
                    path.extend(components.filter(|c| !matches!(c, Component::RootDir)));
                    path
                }
                // \\?\c:\path
                Prefix::VerbatimDisk(_) => {
                    let mut path = PathBuf::new();
                    path.push(prefix.as_os_str().to_string_lossy().replace(r"\\?\", ""));
                    path.extend(components);
                    path
                }
                // \\?\UNC\hostname\share_name\path
                Prefix::VerbatimUNC(hostname, share_name) => {
                    let mut path = PathBuf::new();
                    path.push(format!(
                        r"\\{}\{}\",
                        hostname.to_string_lossy(),
                        share_name.to_string_lossy()
                    ));
                    path.extend(components.filter(|c| !matches!(c, Component::RootDir)));
                    path
                }
                _ => path,
            }
        }
        _ => path,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code: unwrap is acceptable
mod tests {
    use super::*;

    fn sandbox_root() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = strip_unc_prefix(dir.path().canonicalize().unwrap());
        (dir, root)
    }

    #[test]
    fn resolves_relative_path_inside_root() {
        let (_dir, root) = sandbox_root();
        let resolved = resolve_sandboxed(&root, "data/input.txt").unwrap();
        assert_eq!(resolved, root.join("data").join("input.txt"));
    }

    #[test]
    fn folds_dot_and_dotdot_inside_root() {
        let (_dir, root) = sandbox_root();
        std::fs::create_dir(root.join("sub")).unwrap();
        let resolved = resolve_sandboxed(&root, "./sub/../sub/file.txt").unwrap();
        assert_eq!(resolved, root.join("sub").join("file.txt"));
    }

    #[test]
    fn rejects_dotdot_escape() {
        let (_dir, root) = sandbox_root();
        let err = resolve_sandboxed(&root, "../outside.txt").unwrap_err();
        assert!(matches!(err, SandboxError::Escape { .. }));
    }

    #[test]
    fn rejects_absolute_path_outside_root() {
        let (_dir, root) = sandbox_root();
        let other = tempfile::tempdir().unwrap();
        let outside = other.path().join("secret.txt");
        let err = resolve_sandboxed(&root, &outside.to_string_lossy()).unwrap_err();
        assert!(matches!(err, SandboxError::Escape { .. }));
    }

    #[test]
    fn accepts_absolute_path_inside_root() {
        let (_dir, root) = sandbox_root();
        let inside = root.join("ok.txt");
        let resolved = resolve_sandboxed(&root, &inside.to_string_lossy()).unwrap();
        assert_eq!(resolved, inside);
    }

    #[test]
    fn nonexistent_leaf_is_allowed() {
        let (_dir, root) = sandbox_root();
        let resolved = resolve_sandboxed(&root, "not/yet/created.txt").unwrap();
        assert!(resolved.starts_with(&root));
    }

    #[test]
    #[cfg(unix)]
    fn rejects_symlink_escape() {
        let (_dir, root) = sandbox_root();
        let outside = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("link")).unwrap();

        let err = resolve_sandboxed(&root, "link/file.txt").unwrap_err();
        assert!(matches!(err, SandboxError::Escape { .. }));
    }

    #[test]
    fn normalize_stops_at_filesystem_root() {
        assert!(normalize_lexically(Path::new("/../etc")).is_none());
    }
}
