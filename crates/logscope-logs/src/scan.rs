use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use logscope_types::{LogRecord, Rule};

use crate::buffer::{BufferError, LogBuffer};
use crate::rules::{RuleError, RuleRegistry};

/// File name suffix that marks a file as scannable
const LOG_SUFFIX: &str = ".log";

/// Errors that abort a directory scan
#[derive(Debug, Error)]
pub enum ScanError {
    /// Listing the directory or reading a file failed
    #[error("reading {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rule failed to evaluate against a line
    #[error("evaluating rule against line {line:?}")]
    Rule {
        line: String,
        #[source]
        source: RuleError,
    },

    /// The requested window shape is unusable
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Scan the `.log` files of a directory and return the most recent records.
///
/// Files are visited in name order and lines in file order, so later files
/// and later lines count as more recent. When a rule is given, it runs on
/// each raw line and only matching lines are kept. The buffer holds
/// `limit + offset` lines, which bounds memory no matter how much the
/// directory holds; the returned page skips the `offset` newest matches and
/// is ordered newest first.
///
/// Any I/O failure or rule evaluation failure aborts the whole scan. Line
/// content never does: bytes that are not valid UTF-8 are kept with
/// replacement characters, and a line of the returned page that does not
/// decode as a JSON record becomes a record with the raw line under
/// `message`.
pub fn process_dir(
    dir: &Path,
    rule: Option<&Rule>,
    registry: &RuleRegistry,
    limit: usize,
    offset: usize,
) -> Result<Vec<LogRecord>, ScanError> {
    let mut entries = Vec::new();
    for entry in read_dir(dir)? {
        let entry = entry.map_err(|source| ScanError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        entries.push(entry);
    }
    entries.sort_by_key(|entry| entry.file_name());

    let mut buffer = LogBuffer::new(limit.saturating_add(offset));
    let mut files = 0usize;
    for entry in entries {
        let file_type = entry.file_type().map_err(|source| ScanError::Io {
            path: entry.path(),
            source,
        })?;
        if file_type.is_dir() {
            continue;
        }
        if !entry.file_name().to_string_lossy().ends_with(LOG_SUFFIX) {
            continue;
        }
        scan_file(&entry.path(), rule, registry, &mut buffer)?;
        files += 1;
    }
    debug!(
        "scanned {} log files in {}, kept {} lines",
        files,
        dir.display(),
        buffer.len()
    );

    let mut window = buffer.get(offset, limit)?;
    window.reverse();
    Ok(window.iter().map(|line| LogRecord::parse(line)).collect())
}

fn read_dir(dir: &Path) -> Result<std::fs::ReadDir, ScanError> {
    std::fs::read_dir(dir).map_err(|source| ScanError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Feed one file through the rule into the buffer, line by line
fn scan_file(
    path: &Path,
    rule: Option<&Rule>,
    registry: &RuleRegistry,
    buffer: &mut LogBuffer,
) -> Result<(), ScanError> {
    let file = File::open(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let mut raw = Vec::new();
    loop {
        raw.clear();
        let read = reader
            .read_until(b'\n', &mut raw)
            .map_err(|source| ScanError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }
        if raw.last() == Some(&b'\n') {
            raw.pop();
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
        }
        // Invalid UTF-8 in a line is replaced, never fatal.
        let line = String::from_utf8_lossy(&raw).into_owned();
        if let Some(rule) = rule {
            let matched = registry
                .evaluate(rule, &line)
                .map_err(|source| ScanError::Rule {
                    line: line.clone(),
                    source,
                })?;
            if !matched {
                continue;
            }
        }
        buffer.push(line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, lines: &[&str]) {
        fs::write(dir.path().join(name), lines.join("\n")).unwrap();
    }

    fn messages(records: &[LogRecord]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.message().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_unfiltered_scan_is_newest_first() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "app.log", &["one", "two", "three"]);
        let registry = RuleRegistry::builtin();
        let records = process_dir(dir.path(), None, &registry, 10, 0).unwrap();
        assert_eq!(messages(&records), ["three", "two", "one"]);
    }

    #[test]
    fn test_later_files_are_more_recent() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "a.log", &["a1", "a2"]);
        write_file(&dir, "b.log", &["b1", "b2"]);
        let registry = RuleRegistry::builtin();
        let records = process_dir(dir.path(), None, &registry, 10, 0).unwrap();
        assert_eq!(messages(&records), ["b2", "b1", "a2", "a1"]);
    }

    #[test]
    fn test_rule_selects_matching_lines_across_files() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "one.log", &["boot ok", "ERROR: disk full", "shutdown"]);
        write_file(&dir, "two.log", &["boot ok", "idle", "ERROR: net down"]);
        let registry = RuleRegistry::builtin();
        let rule = Rule::contains("ERROR");
        let records = process_dir(dir.path(), Some(&rule), &registry, 2, 0).unwrap();
        assert_eq!(messages(&records), ["ERROR: net down", "ERROR: disk full"]);
    }

    #[test]
    fn test_offset_pages_back_to_the_oldest_lines() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "a.log", &["a1", "a2", "a3"]);
        write_file(&dir, "b.log", &["b1", "b2", "b3"]);
        let registry = RuleRegistry::builtin();

        // Skip the three most recent, keeping the oldest three.
        let page = process_dir(dir.path(), None, &registry, 3, 3).unwrap();
        assert_eq!(messages(&page), ["a3", "a2", "a1"]);

        // Skipping everything yields an empty page.
        let page = process_dir(dir.path(), None, &registry, 3, 6).unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_non_log_files_and_subdirectories_are_skipped() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "app.log", &["kept"]);
        write_file(&dir, "notes.txt", &["skipped"]);
        fs::create_dir(dir.path().join("nested.log")).unwrap();
        fs::write(dir.path().join("nested.log").join("inner.log"), "skipped").unwrap();
        let registry = RuleRegistry::builtin();
        let records = process_dir(dir.path(), None, &registry, 10, 0).unwrap();
        assert_eq!(messages(&records), ["kept"]);
    }

    #[test]
    fn test_structured_and_fallback_shapes_coexist() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "app.log",
            &[
                r#"{"message":"structured","level":"info","port":9172}"#,
                "panic: stack overflow",
            ],
        );
        let registry = RuleRegistry::builtin();
        let records = process_dir(dir.path(), None, &registry, 10, 0).unwrap();
        // Newest first: the fallback record, then the structured one.
        assert_eq!(records[0].fields().len(), 1);
        assert_eq!(records[0].message(), Some("panic: stack overflow"));
        assert_eq!(records[1].message(), Some("structured"));
        assert_eq!(records[1].get("port"), Some(&serde_json::json!(9172)));
    }

    #[test]
    fn test_non_utf8_bytes_degrade_instead_of_aborting() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("app.log"),
            b"ok line\nbad \xff\xfe line\nlast line\n",
        )
        .unwrap();
        let registry = RuleRegistry::builtin();

        let records = process_dir(dir.path(), None, &registry, 10, 0).unwrap();
        assert_eq!(
            messages(&records),
            ["last line", "bad \u{fffd}\u{fffd} line", "ok line"]
        );

        // Rules still run against the salvaged text.
        let rule = Rule::contains("bad");
        let records = process_dir(dir.path(), Some(&rule), &registry, 10, 0).unwrap();
        assert_eq!(messages(&records), ["bad \u{fffd}\u{fffd} line"]);
    }

    #[test]
    fn test_rule_error_aborts_the_scan() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "app.log", &["first line", "second line"]);
        let registry = RuleRegistry::builtin();
        let rule = Rule::new("bogus", serde_json::Value::Null);
        let err = process_dir(dir.path(), Some(&rule), &registry, 10, 0).unwrap_err();
        match err {
            ScanError::Rule { line, source } => {
                assert_eq!(line, "first line");
                assert!(matches!(source, RuleError::UnknownOp(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_directory_is_an_io_error() {
        let registry = RuleRegistry::builtin();
        let err = process_dir(Path::new("/no/such/dir"), None, &registry, 10, 0).unwrap_err();
        assert!(matches!(err, ScanError::Io { .. }));
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "app.log", &["one"]);
        let registry = RuleRegistry::builtin();
        let err = process_dir(dir.path(), None, &registry, 0, 5).unwrap_err();
        assert!(matches!(err, ScanError::Buffer(BufferError::ZeroLimit)));
    }

    #[test]
    fn test_retention_is_bounded_by_limit_plus_offset() {
        let dir = TempDir::new().unwrap();
        let lines: Vec<String> = (1..=50).map(|n| format!("m{n}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        write_file(&dir, "app.log", &refs);
        let registry = RuleRegistry::builtin();

        // Only the 3 + 2 newest lines are ever retained.
        let page = process_dir(dir.path(), None, &registry, 3, 2).unwrap();
        assert_eq!(messages(&page), ["m48", "m47", "m46"]);
    }

    #[test]
    fn test_empty_directory_yields_no_records() {
        let dir = TempDir::new().unwrap();
        let registry = RuleRegistry::builtin();
        let records = process_dir(dir.path(), None, &registry, 10, 0).unwrap();
        assert!(records.is_empty());
    }
}
