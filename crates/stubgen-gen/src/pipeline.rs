//! The scan → generate pipeline.
//!
//! `Scanning` enumerates eligible `.go` files (generated and test files
//! excluded so previously written stubs are never re-ingested) and
//! extracts service descriptions; `Generating` renders, normalizes, and
//! writes one output file per service. No state loops back.

use crate::imports::{ImportError, normalize_imports};
use crate::template::{RenderError, StubRenderer};
use std::path::{Path, PathBuf};
use stubgen_core::{ErrorPolicy, GenConfig, ServiceDescription};
use stubgen_parser::ParseError;

/// A fatal pipeline failure.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("render failed for service {service}: {source}")]
    Render {
        service: String,
        source: RenderError,
    },
    #[error("import normalization failed for service {service}: {source}")]
    Imports {
        service: String,
        source: ImportError,
    },
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("generation failed for {} service(s)", .errors.len())]
    Aggregate { errors: Vec<PipelineError> },
}

/// What one run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub files_scanned: usize,
    pub services_found: usize,
    pub methods_rejected: usize,
    pub stubs_written: usize,
}

enum DriverState {
    Scanning,
    Generating(Vec<ServiceDescription>),
    Done(RunSummary),
}

/// Orchestrates one generation run. Configuration is threaded through
/// the constructor; the driver holds no global state.
pub struct Driver {
    config: GenConfig,
    renderer: StubRenderer,
}

impl Driver {
    /// Build a driver, compiling the stub template up front so a
    /// malformed template fails at configuration time.
    pub fn new(config: GenConfig) -> Result<Self, RenderError> {
        let renderer = StubRenderer::new()?;
        Ok(Self { config, renderer })
    }

    /// Run the pipeline over the source tree rooted at `source_root`.
    pub fn run(&self, source_root: &Path) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary::default();
        let mut state = DriverState::Scanning;

        loop {
            state = match state {
                DriverState::Scanning => {
                    let services = self.scan(source_root, &mut summary)?;
                    DriverState::Generating(services)
                }
                DriverState::Generating(services) => {
                    self.generate(&services, &mut summary)?;
                    DriverState::Done(summary.clone())
                }
                DriverState::Done(summary) => return Ok(summary),
            };
        }
    }

    /// Scan only: extract service descriptions without generating.
    pub fn discover(&self, source_root: &Path) -> Result<Vec<ServiceDescription>, PipelineError> {
        let mut summary = RunSummary::default();
        self.scan(source_root, &mut summary)
    }

    /// Enumerate eligible source files and extract every service.
    /// Parse failures are fatal regardless of error policy.
    fn scan(
        &self,
        source_root: &Path,
        summary: &mut RunSummary,
    ) -> Result<Vec<ServiceDescription>, PipelineError> {
        let mut services = Vec::new();
        for path in eligible_files(source_root) {
            tracing::debug!("processing file: {}", path.display());
            let source =
                std::fs::read_to_string(&path).map_err(|source| PipelineError::Io {
                    path: path.clone(),
                    source,
                })?;
            let extraction = stubgen_parser::extract_services(&path, &source)?;
            summary.files_scanned += 1;
            summary.methods_rejected += extraction.rejected_methods;
            services.extend(extraction.services);
        }
        summary.services_found = services.len();
        Ok(services)
    }

    /// Render, normalize, and write each service independently, honoring
    /// the configured error policy.
    fn generate(
        &self,
        services: &[ServiceDescription],
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        let mut failures = Vec::new();

        for service in services {
            tracing::debug!("generating client for service: {}", service.name);
            match self.generate_one(service) {
                Ok(()) => {
                    summary.stubs_written += 1;
                    tracing::info!(
                        "generated {} for service {}",
                        service.output_file_name(),
                        service.name
                    );
                }
                Err(err) => {
                    tracing::error!("{err}");
                    match self.config.error_policy {
                        ErrorPolicy::Halt => return Err(err),
                        ErrorPolicy::Collect => failures.push(err),
                    }
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::Aggregate { errors: failures })
        }
    }

    fn generate_one(&self, service: &ServiceDescription) -> Result<(), PipelineError> {
        let rendered = self
            .renderer
            .render(service)
            .map_err(|source| PipelineError::Render {
                service: service.name.clone(),
                source,
            })?;
        let normalized =
            normalize_imports(&rendered).map_err(|source| PipelineError::Imports {
                service: service.name.clone(),
                source,
            })?;

        let path = self.config.output_dir.join(service.output_file_name());
        write_atomic(&path, &normalized)
    }
}

/// Eligible `.go` files under the root, lexicographically sorted so
/// cross-file traversal order is reproducible.
fn eligible_files(source_root: &Path) -> Vec<PathBuf> {
    let walker = ignore::WalkBuilder::new(source_root)
        .hidden(true)
        .git_ignore(true)
        .build();

    let mut files: Vec<PathBuf> = walker
        .flatten()
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                return false;
            };
            name.ends_with(".go") && !name.ends_with("_test.go") && !name.ends_with("_gen.go")
        })
        .collect();
    files.sort();
    files
}

/// Write through a temp file and rename, so no partial output file is
/// left behind on any error path.
fn write_atomic(path: &Path, contents: &str) -> Result<(), PipelineError> {
    let io_err = |source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let tmp = path.with_extension("go.tmp");
    std::fs::write(&tmp, contents).map_err(io_err)?;
    if let Err(source) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(source));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligible_files_filters_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        for name in [
            "zeta.go",
            "alpha.go",
            "alpha_test.go",
            "echo_client_gen.go",
            "notes.txt",
        ] {
            std::fs::write(tmp.path().join(name), "package p\n").unwrap();
        }

        let files = eligible_files(tmp.path());
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["alpha.go", "zeta.go"]);
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out").join("echo_client_gen.go");
        write_atomic(&path, "package echo\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "package echo\n");
        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .flatten()
            .filter(|e| e.path() != path)
            .collect();
        assert!(leftovers.is_empty());
    }
}
