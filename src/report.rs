//! End-of-run project tree, printed for the operator.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{ScaffoldError, ScaffoldResult};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Append the tree under `dir` to `lines`, depth-first, entries sorted by name
///
/// An empty directory adds no lines. A subdirectory that cannot be listed
/// keeps its own entry but contributes no children; its siblings and
/// everything after it are still walked.
///
/// # Errors
///
/// Returns [`ScaffoldError::DirectoryRead`] naming the first directory that
/// could not be listed, after the rest of the tree has been collected.
pub fn collect_tree(dir: &Path, prefix: &str, lines: &mut Vec<String>) -> ScaffoldResult<()> {
    let read_err = |source| ScaffoldError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(read_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_err)?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut first_failure = None;
    let count = entries.len();
    for (idx, entry) in entries.into_iter().enumerate() {
        let last = idx + 1 == count;
        let name = entry.file_name().to_string_lossy().into_owned();
        lines.push(format!("{prefix}{}{name}", if last { LAST_BRANCH } else { BRANCH }));

        let path = entry.path();
        if path.is_dir() {
            let child_prefix = format!("{prefix}{}", if last { SPACE } else { PIPE });
            if let Err(e) = collect_tree(&path, &child_prefix, lines) {
                first_failure.get_or_insert(e);
            }
        }
    }

    match first_failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Print the tree under `dir` to `out`
///
/// Everything readable is printed even when part of the tree is not.
///
/// # Errors
///
/// Returns [`ScaffoldError::DirectoryRead`] for the first directory that
/// could not be listed, or [`ScaffoldError::ReportOutput`] if `out` cannot
/// be written.
pub fn report_tree<W: Write>(out: &mut W, dir: &Path) -> ScaffoldResult<()> {
    let mut lines = Vec::new();
    let walked = collect_tree(dir, "", &mut lines);
    for line in &lines {
        writeln!(out, "{line}").map_err(|source| ScaffoldError::ReportOutput { source })?;
    }
    walked
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_empty_directory_reports_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        report_tree(&mut out, dir.path()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_nested_layout() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("routes")).unwrap();
        fs::create_dir_all(dir.path().join("dtos")).unwrap();
        fs::write(dir.path().join("routes").join("user.route.ts"), "").unwrap();
        fs::write(dir.path().join("routes").join("order.route.ts"), "").unwrap();
        fs::write(dir.path().join("dtos").join("user.dto.ts"), "").unwrap();
        fs::write(dir.path().join("app.ts"), "").unwrap();

        let mut lines = Vec::new();
        collect_tree(dir.path(), "", &mut lines).unwrap();
        assert_eq!(
            lines,
            vec![
                "├── app.ts",
                "├── dtos",
                "│   └── user.dto.ts",
                "└── routes",
                "    ├── order.route.ts",
                "    └── user.route.ts",
            ]
        );
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("src");
        let mut lines = Vec::new();
        let err = collect_tree(&missing, "", &mut lines).unwrap_err();
        assert!(err.to_string().contains("src"));
        assert!(lines.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_unreadable_subtree_keeps_the_rest() {
        // /proc/1/map_files refuses listing without CAP_SYS_ADMIN
        let locked_target = Path::new("/proc/1/map_files");
        if !locked_target.is_dir() || fs::read_dir(locked_target).is_ok() {
            println!("Skipping test: no unreadable directory available");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.ts"), "").unwrap();
        fs::create_dir_all(dir.path().join("routes")).unwrap();
        fs::write(dir.path().join("routes").join("user.route.ts"), "").unwrap();
        std::os::unix::fs::symlink(locked_target, dir.path().join("zlocked")).unwrap();

        let mut out = Vec::new();
        let err = report_tree(&mut out, dir.path()).unwrap_err();
        match err {
            ScaffoldError::DirectoryRead { path, .. } => {
                assert_eq!(path, dir.path().join("zlocked"))
            }
            other => panic!("unexpected error: {other}"),
        }

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed, "├── app.ts\n├── routes\n│   └── user.route.ts\n└── zlocked\n");
    }

    #[test]
    fn test_output_failure_is_not_a_directory_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.ts"), "").unwrap();
        let err = report_tree(&mut BrokenPipe, dir.path()).unwrap_err();
        assert!(matches!(err, ScaffoldError::ReportOutput { .. }));
    }
}
