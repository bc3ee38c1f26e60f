use std::fs;
use std::path::Path;

/// A JavaScript plugin found in the plugin search directory.
#[derive(Debug, Clone)]
pub struct Plugin {
    /// File stem, used in load-failure reports
    pub name: String,
    pub source: String,
}

/// Scan `dir` (non-recursively) for `.js` plugin files, sorted by name so
/// load order is deterministic. An unreadable directory yields zero plugins
/// with a warning; the instance still works without plugins.
pub fn discover(dir: &Path) -> Vec<Plugin> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Warning: plugin directory {}: {e}", dir.display());
            return Vec::new();
        }
    };

    let mut plugins = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "js") {
            continue;
        }
        let name = match path.file_stem() {
            Some(stem) => stem.to_string_lossy().to_string(),
            None => continue,
        };
        match fs::read_to_string(&path) {
            Ok(source) => plugins.push(Plugin { name, source }),
            Err(e) => {
                eprintln!("Warning: skipping plugin {}: {e}", path.display());
            }
        }
    }

    plugins.sort_by(|a, b| a.name.cmp(&b.name));
    plugins
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code: unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn missing_directory_yields_no_plugins() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir");
        assert!(discover(&missing).is_empty());
    }

    #[test]
    fn discovers_js_files_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.js"), "var B = 1;").unwrap();
        fs::write(dir.path().join("a.js"), "var A = 1;").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a plugin").unwrap();

        let plugins = discover(dir.path());
        let names: Vec<&str> = plugins.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
