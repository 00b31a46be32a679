//! The name to address registry of prior deployments

use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{errors::ScriptError, types::DeploymentRecord};

/// A lookup of prior deployments by contract name
pub trait Registry {
    /// Returns the recorded deployment of `name`, `None` if it was never deployed
    fn get(&self, name: &str) -> Result<Option<DeploymentRecord>, ScriptError>;
}

/// The contents of the deployments file
#[derive(Debug, Default, Serialize, Deserialize)]
struct Deployments {
    /// Deployments keyed by contract name
    #[serde(default)]
    deployments: BTreeMap<String, DeploymentRecord>,
}

/// A registry backed by a JSON deployments file, re-read on every lookup
#[derive(Debug, Clone)]
pub struct DeploymentsFile {
    /// The path of the file
    path: PathBuf,
}

impl DeploymentsFile {
    /// Creates a registry over the file at `path`, which need not exist yet
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns every recorded deployment
    pub fn all(&self) -> Result<BTreeMap<String, DeploymentRecord>, ScriptError> {
        Ok(self.read()?.deployments)
    }

    /// Records a deployment, creating the file if it doesn't exist.
    ///
    /// The new contents are written beside the file and renamed over it, so
    /// an interrupted write leaves the previous records intact.
    pub fn record(&self, name: &str, record: DeploymentRecord) -> Result<(), ScriptError> {
        let mut contents = self.read()?;
        contents.deployments.insert(name.to_string(), record);

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp =
            NamedTempFile::new_in(dir).map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        serde_json::to_writer_pretty(&mut tmp, &contents)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        tmp.flush()
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        tmp.persist(&self.path)
            .map(|_| ())
            .map_err(|e| ScriptError::WriteDeployments(e.error.to_string()))
    }

    /// Reads the file, a missing file holds no deployments
    fn read(&self) -> Result<Deployments, ScriptError> {
        if !self.path.exists() {
            return Ok(Deployments::default());
        }

        let contents = fs::read_to_string(&self.path)
            .map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| {
            ScriptError::ReadDeployments(format!("{}: {e}", self.path.display()))
        })
    }
}

impl Registry for DeploymentsFile {
    fn get(&self, name: &str) -> Result<Option<DeploymentRecord>, ScriptError> {
        Ok(self.read()?.deployments.remove(name))
    }
}
