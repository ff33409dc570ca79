//! Requirements manifest files (`requirements*.txt`).

use std::fs;
use std::path::{Path, PathBuf};

use super::requirement::{is_pip_directive, Requirement};
use crate::error::{FloorError, Result};

/// One meaningful line of a requirements file.
#[derive(Debug, Clone)]
pub enum ManifestEntry {
    /// A named requirement.
    Requirement(Requirement),
    /// A pip option, path, or URL line passed through verbatim.
    Directive(String),
}

/// Find manifest files under `root` matching any of `patterns`.
///
/// Patterns are relative to `root` (`requirements*.txt`, `reqs/*.txt`).
/// The result is sorted and free of duplicates.
pub fn find_manifests(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let base = glob::Pattern::escape(&root.to_string_lossy());
    let mut found = Vec::new();

    for pattern in patterns.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
        let full = format!("{}/{}", base.trim_end_matches('/'), pattern);
        let paths = glob::glob(&full).map_err(|e| FloorError::ConfigValidationError {
            message: format!("Invalid requirements pattern '{}': {}", pattern, e),
        })?;
        for path in paths.flatten() {
            if path.is_file() {
                found.push(path);
            }
        }
    }

    found.sort();
    found.dedup();
    Ok(found)
}

/// Read and parse one requirements file.
///
/// Relative paths in directive lines are rewritten against the file's own
/// directory, so they install the same thing from any working directory.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    tracing::debug!("Reading requirements from {}", path.display());
    let read_error = |e: &dyn std::fmt::Display| FloorError::ManifestRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let content = fs::read_to_string(path).map_err(|e| read_error(&e))?;
    let base = fs::canonicalize(path)
        .map_err(|e| read_error(&e))?
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let entries = parse_manifest(&content).map_err(|e| read_error(&e))?;
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            ManifestEntry::Directive(line) => {
                ManifestEntry::Directive(anchor_directive(&line, &base))
            }
            other => other,
        })
        .collect())
}

/// Options whose value is a local path when it is not a URL.
const PATH_OPTIONS: &[&str] = &[
    "-e",
    "--editable",
    "-r",
    "--requirement",
    "-c",
    "--constraint",
    "-f",
    "--find-links",
];

/// Rewrite relative local paths in a directive line to live under `base`.
pub fn anchor_directive(line: &str, base: &Path) -> String {
    let mut tokens = Vec::new();
    let mut expects_path = false;

    for token in line.split_whitespace() {
        let assigned = token
            .split_once('=')
            .filter(|(option, _)| option.starts_with("--"));
        if let Some((option, value)) = assigned {
            if PATH_OPTIONS.contains(&option) {
                tokens.push(format!("{}={}", option, anchor_path(value, base)));
            } else {
                tokens.push(token.to_string());
            }
            expects_path = false;
        } else if token.starts_with('-') {
            expects_path = PATH_OPTIONS.contains(&token);
            tokens.push(token.to_string());
        } else {
            if expects_path || token.starts_with('.') {
                tokens.push(anchor_path(token, base));
            } else {
                tokens.push(token.to_string());
            }
            expects_path = false;
        }
    }
    tokens.join(" ")
}

fn anchor_path(value: &str, base: &Path) -> String {
    if value.contains("://") || value.starts_with('~') || Path::new(value).is_absolute() {
        return value.to_string();
    }
    base.join(value).display().to_string()
}

/// Parse requirements-file content.
pub fn parse_manifest(content: &str) -> Result<Vec<ManifestEntry>> {
    logical_lines(content)
        .into_iter()
        .map(|line| {
            if is_pip_directive(&line) {
                Ok(ManifestEntry::Directive(line))
            } else {
                line.parse().map(ManifestEntry::Requirement)
            }
        })
        .collect()
}

/// Join `\` continuations, strip comments, drop blank lines.
fn logical_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending = String::new();

    for physical in content.lines() {
        if let Some(head) = physical.strip_suffix('\\') {
            pending.push_str(head);
            pending.push(' ');
            continue;
        }
        pending.push_str(physical);
        let line = strip_comment(&pending).trim().to_string();
        if !line.is_empty() {
            lines.push(line);
        }
        pending.clear();
    }

    let tail = strip_comment(&pending).trim().to_string();
    if !tail.is_empty() {
        lines.push(tail);
    }
    lines
}

// `#` starts a comment at line start or after whitespace; URL fragments
// such as `#egg=name` are kept.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()) {
            return &line[..i];
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(entries: &[ManifestEntry]) -> Vec<String> {
        entries
            .iter()
            .map(|e| match e {
                ManifestEntry::Requirement(r) => r.raw().to_string(),
                ManifestEntry::Directive(d) => format!("directive:{}", d),
            })
            .collect()
    }

    #[test]
    fn parses_requirements_and_directives() {
        let content = "\
# pinned for tests
attrs==20.1.0  # newest known good

moreorless
-e ../
git+https://example.com/repo.git#egg=thing
";
        let entries = parse_manifest(content).unwrap();
        assert_eq!(
            names(&entries),
            vec![
                "attrs==20.1.0",
                "moreorless",
                "directive:-e ../",
                "directive:git+https://example.com/repo.git#egg=thing",
            ]
        );
    }

    #[test]
    fn joins_continuation_lines() {
        let entries = parse_manifest("attrs\\\n  ==20.1.0\n").unwrap();
        assert_eq!(names(&entries), vec!["attrs   ==20.1.0"]);
    }

    #[test]
    fn invalid_line_is_an_error() {
        assert!(parse_manifest("attrs >> 2\n").is_err());
    }

    #[test]
    fn find_manifests_matches_globs() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("requirements.txt"), "a\n").unwrap();
        fs::write(temp.path().join("requirements-dev.txt"), "b\n").unwrap();
        fs::write(temp.path().join("other.txt"), "c\n").unwrap();
        fs::create_dir(temp.path().join("reqs")).unwrap();
        fs::write(temp.path().join("reqs/test.txt"), "d\n").unwrap();

        let found = find_manifests(
            temp.path(),
            &["requirements*.txt".to_string(), "reqs/*.txt".to_string()],
        )
        .unwrap();
        let file_names: Vec<String> = found
            .iter()
            .map(|p| {
                p.strip_prefix(temp.path())
                    .unwrap()
                    .to_string_lossy()
                    .to_string()
            })
            .collect();
        assert_eq!(
            file_names,
            vec!["reqs/test.txt", "requirements-dev.txt", "requirements.txt"]
        );
    }

    #[test]
    fn find_manifests_rejects_bad_pattern() {
        let temp = TempDir::new().unwrap();
        let err = find_manifests(temp.path(), &["[".to_string()]).unwrap_err();
        assert!(matches!(err, FloorError::ConfigValidationError { .. }));
    }

    #[test]
    fn directives_resolve_from_manifest_directory() {
        let base = Path::new("/work/proj/reqs");
        assert_eq!(anchor_directive("-e ..", base), "-e /work/proj/reqs/..");
        assert_eq!(anchor_directive("-r base.txt", base), "-r /work/proj/reqs/base.txt");
        assert_eq!(
            anchor_directive("--constraint=pins.txt", base),
            "--constraint=/work/proj/reqs/pins.txt"
        );
        assert_eq!(anchor_directive("./vendor/x.whl", base), "/work/proj/reqs/./vendor/x.whl");
        assert_eq!(
            anchor_directive("-e git+https://example.com/r.git#egg=r", base),
            "-e git+https://example.com/r.git#egg=r"
        );
        assert_eq!(
            anchor_directive("--index-url https://mirror.example/simple", base),
            "--index-url https://mirror.example/simple"
        );
        assert_eq!(anchor_directive("-r /abs/other.txt", base), "-r /abs/other.txt");
    }

    #[test]
    fn read_manifest_anchors_directives() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("reqs");
        fs::create_dir(&dir).unwrap();
        let path = dir.join("dev.txt");
        fs::write(&path, "-r base.txt
-e ..
attrs==20.1.0
").unwrap();

        let entries = read_manifest(&path).unwrap();
        let dir = fs::canonicalize(&dir).unwrap();
        assert_eq!(
            names(&entries),
            vec![
                format!("directive:-r {}", dir.join("base.txt").display()),
                format!("directive:-e {}", dir.join("..").display()),
                "attrs==20.1.0".to_string(),
            ]
        );
    }

    #[test]
    fn read_manifest_reports_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = read_manifest(&temp.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, FloorError::ManifestRead { .. }));
    }
}
