//! Build orchestration: read inputs, compile, render, write.
//!
//! Each call to [`compile_source`] or [`build`] starts a fresh
//! [`Session`], so repeated builds (watch mode) never share counters.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{
    ProjectConfig, DEFAULT_BIBLIOGRAPHY, DEFAULT_MANUSCRIPT, DEFAULT_OUT_DIR, DEFAULT_STYLE,
};
use crate::entries::{Entries, Figure, Table};
use crate::error::{CompileError, Warning};
use crate::output::{
    wrap_document, write_outputs, CommonMark, OutputError, Outputs, Renderer, DEFAULT_STYLESHEET,
    STYLESHEET_FILE,
};
use crate::refs::{load_reference_store, RefsError};
use crate::resolver::{Library, Resolved, Session};
use crate::style::{builtin_style, load_style, Style, StyleError};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("'{}': {}", .path.display(), .source)]
    Manuscript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}': {}", .path.display(), .source)]
    Bibliography {
        path: PathBuf,
        #[source]
        source: RefsError,
    },

    #[error("invalid style '{name}': {source}")]
    Style {
        name: String,
        #[source]
        source: StyleError,
    },

    #[error("'{0}' is not a builtin style name and no file with this path exists")]
    UnknownStyle(String),

    #[error("'{}': {}", .path.display(), .source)]
    Stylesheet {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Everything needed to run one build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub manuscript: PathBuf,
    pub bibliography: PathBuf,
    pub out_dir: PathBuf,
    /// Builtin style name or path to a style file.
    pub style: String,
    pub stylesheet: Option<PathBuf>,
    pub figures: Entries<Figure>,
    pub tables: Entries<Table>,
}

impl BuildOptions {
    /// Options from a project file, with defaults for anything it leaves out.
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self {
            manuscript: config
                .manuscript
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MANUSCRIPT)),
            bibliography: config
                .bibliography
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BIBLIOGRAPHY)),
            out_dir: config
                .out_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR)),
            style: config
                .style
                .clone()
                .unwrap_or_else(|| DEFAULT_STYLE.to_string()),
            stylesheet: config.stylesheet.clone(),
            figures: config.figure_entries(),
            tables: config.table_entries(),
        }
    }

    /// Files whose changes should trigger a rebuild.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.manuscript.clone(), self.bibliography.clone()];
        if let Some(stylesheet) = &self.stylesheet {
            paths.push(stylesheet.clone());
        }
        if Path::new(&self.style).is_file() {
            paths.push(PathBuf::from(&self.style));
        }
        paths
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::from_config(&ProjectConfig::default())
    }
}

/// Summary of a finished build.
#[derive(Debug)]
pub struct BuildReport {
    pub resolved: Resolved,
    /// Bibliography warnings followed by compile warnings.
    pub warnings: Vec<Warning>,
    pub outputs: Outputs,
}

/// Resolves a builtin style name or loads a style file.
pub fn resolve_style(name: &str) -> Result<Style, BuildError> {
    if let Some(style) = builtin_style(name) {
        return Ok(style);
    }
    let path = Path::new(name);
    if !path.exists() {
        return Err(BuildError::UnknownStyle(name.to_string()));
    }
    load_style(path).map_err(|source| BuildError::Style {
        name: name.to_string(),
        source,
    })
}

/// Compiles manuscript text against the configured bibliography and
/// entries. Nothing is written.
///
/// Returns the resolved text plus all warnings (bibliography first).
pub fn compile_source(
    manuscript: &str,
    options: &BuildOptions,
) -> Result<(Resolved, Vec<Warning>), BuildError> {
    let (store, mut warnings) =
        load_reference_store(&options.bibliography).map_err(|source| BuildError::Bibliography {
            path: options.bibliography.clone(),
            source,
        })?;
    let style = resolve_style(&options.style)?;

    let library = Library {
        references: &store,
        figures: &options.figures,
        tables: &options.tables,
    };
    let resolved = Session::new(library, &style).resolve(manuscript)?;

    info!(
        citations = resolved.assignments.citations.len(),
        figures = resolved.assignments.figures.len(),
        tables = resolved.assignments.tables.len(),
        "resolved manuscript"
    );
    warnings.extend(resolved.warnings.iter().cloned());
    Ok((resolved, warnings))
}

/// Runs a full build: compile, render to HTML, write the output directory.
pub fn build(options: &BuildOptions) -> Result<BuildReport, BuildError> {
    let manuscript =
        fs::read_to_string(&options.manuscript).map_err(|source| BuildError::Manuscript {
            path: options.manuscript.clone(),
            source,
        })?;
    let (resolved, warnings) = compile_source(&manuscript, options)?;

    let stylesheet = match &options.stylesheet {
        Some(path) => fs::read_to_string(path).map_err(|source| BuildError::Stylesheet {
            path: path.clone(),
            source,
        })?,
        None => DEFAULT_STYLESHEET.to_string(),
    };

    let html = wrap_document(&CommonMark::default().render(&resolved.text), STYLESHEET_FILE);
    let outputs = write_outputs(&options.out_dir, &resolved.text, &html, &stylesheet)?;

    for warning in &warnings {
        warn!("{}", warning);
    }

    Ok(BuildReport {
        resolved,
        warnings,
        outputs,
    })
}
