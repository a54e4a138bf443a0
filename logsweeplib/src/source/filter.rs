//! File filtering and tree walking.
//!
//! [`FilterConfig`] decides which directories are pruned and which files are
//! candidates. [`Walk`] streams the candidates of a tree lazily, depth-first,
//! reporting unreadable entries without stopping.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;
use log::warn;
use walkdir::WalkDir;

use crate::error::SweepError;
use crate::Result;

/// Build and output directories skipped by default.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["node_modules", "dist", "build", "out", "lib", ".git"];

/// Source extensions processed by default.
pub const DEFAULT_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

/// Configuration for file filtering.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Directory basenames pruned from the walk
    pub excluded_dirs: BTreeSet<String>,
    /// Allowed extensions, lowercase without the dot
    pub extensions: BTreeSet<String>,
    /// Glob patterns to include (if empty, include every allowed extension)
    pub include: Vec<Pattern>,
    /// Glob patterns to exclude
    pub exclude: Vec<Pattern>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| SweepError::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

impl FilterConfig {
    /// Create a filter with the default exclusions and extensions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also prune directories named `name`.
    pub fn exclude_dir(mut self, name: &str) -> Self {
        self.excluded_dirs.insert(name.to_string());
        self
    }

    /// Stop pruning directories named `name`.
    pub fn allow_dir(mut self, name: &str) -> Self {
        self.excluded_dirs.remove(name);
        self
    }

    /// Prune nothing by name.
    pub fn clear_excluded_dirs(mut self) -> Self {
        self.excluded_dirs.clear();
        self
    }

    /// Replace the allowed extensions. Leading dots and case are ignored.
    pub fn extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|e| normalize_extension(e.as_ref()))
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    /// Add an include pattern.
    pub fn include(mut self, pattern: &str) -> Result<Self> {
        self.include.push(compile(pattern)?);
        Ok(self)
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        self.exclude.push(compile(pattern)?);
        Ok(self)
    }

    /// Add multiple include patterns.
    pub fn include_many<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        for pattern in patterns {
            self = self.include(pattern.as_ref())?;
        }
        Ok(self)
    }

    /// Add multiple exclude patterns.
    pub fn exclude_many<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self> {
        for pattern in patterns {
            self = self.exclude(pattern.as_ref())?;
        }
        Ok(self)
    }

    /// True when a directory with this basename is pruned.
    pub fn excludes_dir(&self, name: &str) -> bool {
        self.excluded_dirs.contains(name)
    }

    /// Check if a file path matches the filter criteria.
    ///
    /// A path matches if its extension is allowed, it matches at least one
    /// include pattern (or there are none), and it matches no exclude pattern.
    pub fn matches(&self, path: &Path) -> bool {
        let allowed = path
            .extension()
            .is_some_and(|ext| self.extensions.contains(&ext.to_string_lossy().to_lowercase()));
        if !allowed {
            return false;
        }

        let path_str = path.to_string_lossy();
        if self.exclude.iter().any(|p| p.matches(&path_str)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|p| p.matches(&path_str))
    }
}

/// Lazy, single-pass walk over the candidate files below a root.
///
/// Symbolic links are never followed, so directory cycles cannot occur.
/// Entries that cannot be read are yielded as [`SweepError::PathUnreadable`]
/// and the walk carries on with their siblings.
#[derive(Debug)]
pub struct Walk {
    inner: walkdir::IntoIter,
    filter: FilterConfig,
}

impl Walk {
    pub fn new(root: impl AsRef<Path>, filter: FilterConfig) -> Self {
        let inner = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        Self { inner, filter }
    }
}

impl Iterator for Walk {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_default();
                    let source = io::Error::from(e);
                    return Some(Err(SweepError::PathUnreadable { path, source }));
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                let pruned = entry.depth() > 0
                    && self
                        .filter
                        .excludes_dir(&entry.file_name().to_string_lossy());
                if pruned {
                    self.inner.skip_current_dir();
                }
                continue;
            }
            if file_type.is_file() && self.filter.matches(entry.path()) {
                return Some(Ok(entry.into_path()));
            }
        }
    }
}

/// Walk `root` with `filter`.
///
/// A root that is itself a file is yielded alone if it passes the filter.
pub fn walk(root: impl AsRef<Path>, filter: &FilterConfig) -> Result<Walk> {
    let root = root.as_ref();
    if !root.exists() {
        return Err(SweepError::PathNotFound(root.to_path_buf()));
    }
    Ok(Walk::new(root, filter.clone()))
}

/// Collect every candidate path. Unreadable entries are logged and dropped.
pub fn discover_files(root: impl AsRef<Path>, filter: &FilterConfig) -> Result<Vec<PathBuf>> {
    Ok(walk(root, filter)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("{e}");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn create_test_files(dir: &Path) {
        for sub in ["src/components", "node_modules/pkg", "dist", "lib", "tests"] {
            fs::create_dir_all(dir.join(sub)).unwrap();
        }
        fs::write(dir.join("src/index.js"), "console.log(1);").unwrap();
        fs::write(dir.join("src/components/App.tsx"), "export {}").unwrap();
        fs::write(dir.join("src/components/util.TS"), "export {}").unwrap();
        fs::write(dir.join("src/styles.css"), "body {}").unwrap();
        fs::write(dir.join("node_modules/pkg/index.js"), "").unwrap();
        fs::write(dir.join("dist/bundle.js"), "").unwrap();
        fs::write(dir.join("lib/compiled.js"), "").unwrap();
        fs::write(dir.join("tests/app.test.jsx"), "").unwrap();
        fs::write(dir.join("README.md"), "# Readme").unwrap();
    }

    fn relative(root: &Path, files: Vec<PathBuf>) -> Vec<String> {
        files
            .iter()
            .map(|f| {
                f.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_filter_matches_source_extensions() {
        let filter = FilterConfig::new();

        assert!(filter.matches(Path::new("src/main.js")));
        assert!(filter.matches(Path::new("App.tsx")));
        assert!(filter.matches(Path::new("Upper.JSX")));
        assert!(!filter.matches(Path::new("README.md")));
        assert!(!filter.matches(Path::new("Makefile")));
    }

    #[test]
    fn test_filter_custom_extensions() {
        let filter = FilterConfig::new().extensions(&[".mjs", "CJS"]);

        assert!(filter.matches(Path::new("a.mjs")));
        assert!(filter.matches(Path::new("b.cjs")));
        assert!(!filter.matches(Path::new("c.js")));
    }

    #[test]
    fn test_filter_with_include_pattern() {
        let filter = FilterConfig::new().include("**/components/*").unwrap();

        assert!(filter.matches(Path::new("src/components/App.tsx")));
        assert!(!filter.matches(Path::new("src/index.js")));
    }

    #[test]
    fn test_filter_with_exclude_pattern() {
        let filter = FilterConfig::new()
            .exclude_many(&["**/*.test.*", "**/fixtures/**"])
            .unwrap();

        assert!(filter.matches(Path::new("src/index.js")));
        assert!(!filter.matches(Path::new("tests/app.test.jsx")));
        assert!(!filter.matches(Path::new("src/fixtures/a.js")));
    }

    #[test]
    fn test_invalid_glob_is_rejected() {
        let err = FilterConfig::new().include("[").unwrap_err();
        assert!(matches!(err, SweepError::InvalidGlob { .. }));
    }

    #[test]
    fn test_excluded_dirs_can_be_adjusted() {
        let filter = FilterConfig::new().allow_dir("lib").exclude_dir("vendor");

        assert!(!filter.excludes_dir("lib"));
        assert!(filter.excludes_dir("vendor"));
        assert!(filter.excludes_dir("node_modules"));
        assert!(!FilterConfig::new()
            .clear_excluded_dirs()
            .excludes_dir("node_modules"));
    }

    #[test]
    fn test_walk_prunes_excluded_dirs() {
        let temp = tempdir().unwrap();
        create_test_files(temp.path());

        let files = discover_files(temp.path(), &FilterConfig::new()).unwrap();

        assert_eq!(
            relative(temp.path(), files),
            vec![
                "src/components/App.tsx",
                "src/components/util.TS",
                "src/index.js",
                "tests/app.test.jsx",
            ]
        );
    }

    #[test]
    fn test_walk_without_default_excludes() {
        let temp = tempdir().unwrap();
        create_test_files(temp.path());

        let filter = FilterConfig::new().clear_excluded_dirs();
        let files = relative(temp.path(), discover_files(temp.path(), &filter).unwrap());

        assert!(files.contains(&"node_modules/pkg/index.js".to_string()));
        assert!(files.contains(&"dist/bundle.js".to_string()));
        assert_eq!(files.len(), 7);
    }

    #[test]
    fn test_excluded_root_is_still_walked() {
        let temp = tempdir().unwrap();
        create_test_files(temp.path());

        let files = discover_files(temp.path().join("dist"), &FilterConfig::new()).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_walk_single_file_root() {
        let temp = tempdir().unwrap();
        create_test_files(temp.path());
        let file = temp.path().join("src/index.js");

        assert_eq!(
            discover_files(&file, &FilterConfig::new()).unwrap(),
            vec![file]
        );
    }

    #[test]
    fn test_walk_missing_root() {
        let err = walk("/definitely/not/here", &FilterConfig::new()).unwrap_err();
        assert!(matches!(err, SweepError::PathNotFound(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_reports_unreadable_dir_and_continues() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        create_test_files(temp.path());
        let locked = temp.path().join("src/components");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let entries: Vec<_> = walk(temp.path(), &FilterConfig::new()).unwrap().collect();
        let files = discover_files(temp.path(), &FilterConfig::new()).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let errors: Vec<_> = entries.iter().filter_map(|e| e.as_ref().err()).collect();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], SweepError::PathUnreadable { path, .. } if *path == locked));
        assert_eq!(
            relative(temp.path(), files),
            vec!["src/index.js", "tests/app.test.jsx"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_skips_symlinks() {
        let temp = tempdir().unwrap();
        create_test_files(temp.path());
        std::os::unix::fs::symlink(temp.path().join("src"), temp.path().join("src/loop")).unwrap();
        std::os::unix::fs::symlink(
            temp.path().join("src/index.js"),
            temp.path().join("alias.js"),
        )
        .unwrap();

        let files = relative(temp.path(), discover_files(temp.path(), &FilterConfig::new()).unwrap());

        assert_eq!(files.len(), 4);
        assert!(!files.iter().any(|f| f.contains("loop") || f == "alias.js"));
    }
}
