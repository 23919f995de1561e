//! Shared test constants and helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Bibliography with three entries, one of them carrying a DOI.
pub const SAMPLE_BIBLIOGRAPHY: &str = "\
1. `tag:smith2020` Smith, J. Fast numbering. J. Doc. 2020. doi:10.1000/fast.1
2. `tag:jones2019` Jones, K. Slow numbering. 2019.
3. `tag:lee2021` Lee, M. Numbering at scale. 2021.
";

/// Build a numbered-list bibliography from tags.
///
/// Each entry's source text is `Source {tag}.`.
pub fn build_bibliography(tags: &[&str]) -> String {
    tags.iter()
        .enumerate()
        .map(|(i, tag)| format!("{}. `tag:{}` Source {}.\n", i + 1, tag, tag))
        .collect()
}

/// A throwaway project directory laid out the conventional way:
/// `src/index.md`, `src/references.md` and an optional `refmark.toml`.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new(manuscript: &str, bibliography: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/index.md"), manuscript).unwrap();
        fs::write(dir.path().join("src/references.md"), bibliography).unwrap();
        Self { dir }
    }

    pub fn with_config(self, toml: &str) -> Self {
        fs::write(self.dir.path().join("refmark.toml"), toml).unwrap();
        self
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }
}
