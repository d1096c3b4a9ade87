//! # Batch Configuration
//!
//! [`BatchConfig`] carries the tunables of a batch run. [`JobManifest`] is the
//! on-disk description of a batch used by `ctr-batch`:
//!
//! ```json
//! {
//!   "concurrency": 4,
//!   "credentials": "keys.json",
//!   "jobs": [ { "id": "a", "input": "a.ctr", "output": "out/a.bin" } ]
//! }
//! ```
//!
//! `credentials` points at a JSON object mapping job id to key string. Relative
//! paths are resolved against the manifest's directory.

use crate::aliases::Credential;
use crate::consts::{DEFAULT_CONCURRENCY, MAX_CONCURRENCY};
use crate::error::ConfigError;
use crate::job::DecodeJob;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tunables for one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Maximum number of jobs decoding at once.
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::Invalid(format!(
                "concurrency must be between 1 and {MAX_CONCURRENCY}, got {}",
                self.concurrency
            )));
        }
        Ok(())
    }
}

/// One entry of the manifest's `jobs` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobSpec {
    pub id: String,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// A batch description loaded from JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobManifest {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    pub credentials: PathBuf,
    pub jobs: Vec<JobSpec>,
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl JobManifest {
    /// Parse a manifest file. Relative paths inside it are anchored to the
    /// directory containing `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut manifest: JobManifest = read_json(path)?;
        manifest.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        manifest.config().validate()?;

        let mut seen = HashSet::with_capacity(manifest.jobs.len());
        for job in &manifest.jobs {
            if !seen.insert(job.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate job id {}", job.id)));
            }
        }
        manifest.check_outputs()?;

        debug!(
            path = %path.display(),
            jobs = manifest.jobs.len(),
            concurrency = manifest.concurrency,
            "loaded manifest"
        );
        Ok(manifest)
    }

    pub fn config(&self) -> BatchConfig {
        BatchConfig {
            concurrency: self.concurrency,
        }
    }

    /// Override the manifest's concurrency (e.g. from the command line).
    pub fn set_concurrency(&mut self, concurrency: usize) -> Result<(), ConfigError> {
        let config = BatchConfig { concurrency };
        config.validate()?;
        self.concurrency = concurrency;
        Ok(())
    }

    /// Resolve a path from the manifest against its directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Every output must be unique and must not be any job's input: jobs run
    /// in parallel, so a shared path would be overwritten by whichever job
    /// finishes last.
    fn check_outputs(&self) -> Result<(), ConfigError> {
        let inputs: HashSet<PathBuf> = self
            .jobs
            .iter()
            .map(|job| self.resolve_path(&job.input))
            .collect();

        let mut outputs = HashSet::with_capacity(self.jobs.len());
        for job in &self.jobs {
            let output = self.resolve_path(&job.output);
            if inputs.contains(&output) {
                return Err(ConfigError::Invalid(format!(
                    "job {} writes to {}, which is also a job input",
                    job.id,
                    output.display()
                )));
            }
            if !outputs.insert(output) {
                return Err(ConfigError::Invalid(format!(
                    "job {} reuses output path {}",
                    job.id,
                    job.output.display()
                )));
            }
        }
        Ok(())
    }

    /// Load the credential map and pair every job with its credential.
    ///
    /// Fails with [`ConfigError::MissingCredential`] for the first job without
    /// one; nothing is returned in that case.
    pub fn into_jobs(self) -> Result<Vec<DecodeJob>, ConfigError> {
        let credentials_path = self.resolve_path(&self.credentials);
        let mut credentials: HashMap<String, String> = read_json(&credentials_path)?;

        let mut jobs = Vec::with_capacity(self.jobs.len());
        for spec in &self.jobs {
            let key = credentials
                .remove(&spec.id)
                .ok_or_else(|| ConfigError::MissingCredential {
                    id: spec.id.clone(),
                })?;
            jobs.push(DecodeJob::new(
                spec.id.clone(),
                self.resolve_path(&spec.input),
                self.resolve_path(&spec.output),
                Credential::new(key.into_bytes()),
            ));
        }
        Ok(jobs)
    }
}

fn read_json<T>(path: &Path) -> Result<T, ConfigError>
where
    T: serde::de::DeserializeOwned,
{
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Json {
        path: path.display().to_string(),
        source,
    })
}
