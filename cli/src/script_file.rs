use deno_terminal::colors;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const LINE_SEPARATOR: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Read a script file the way the runner always has: line by line, with the
/// platform line separator appended after every line, so scripts written on
/// either platform run the same.
///
/// A read failure is reported on stderr and whatever was read so far is
/// returned; a missing file yields an empty script, which still produces an
/// (empty) JSON result instead of aborting the run.
pub fn read_script(path: &Path) -> String {
    match path.canonicalize() {
        Ok(canonical) => eprintln!("{}", colors::gray(format!("script: {}", canonical.display()))),
        Err(_) => eprintln!("{}", colors::gray(format!("script: {}", path.display()))),
    }

    let mut contents = String::new();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("{}: {}: {e}", colors::red_bold("error"), path.display());
            return contents;
        }
    };

    for line in BufReader::new(file).lines() {
        match line {
            Ok(line) => {
                contents.push_str(&line);
                contents.push_str(LINE_SEPARATOR);
            }
            Err(e) => {
                eprintln!("{}: {}: {e}", colors::red_bold("error"), path.display());
                break;
            }
        }
    }

    contents
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code: unwrap is acceptable
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn appends_separator_after_every_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.js");
        std::fs::write(&path, "var a = 1;\nvar b = 2;").unwrap();

        let contents = read_script(&path);
        assert_eq!(
            contents,
            format!("var a = 1;{LINE_SEPARATOR}var b = 2;{LINE_SEPARATOR}")
        );
    }

    #[test]
    fn normalizes_foreign_line_endings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.js");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"first\r\nsecond\r\n").unwrap();
        drop(file);

        let contents = read_script(&path);
        assert_eq!(
            contents,
            format!("first{LINE_SEPARATOR}second{LINE_SEPARATOR}")
        );
    }

    #[test]
    fn missing_file_yields_empty_script() {
        let dir = tempfile::tempdir().unwrap();
        let contents = read_script(&dir.path().join("no-such-script.js"));
        assert!(contents.is_empty());
    }
}
