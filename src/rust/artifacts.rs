use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::classifier::{ArtifactKind, ClassifierError};

/// Environment variable that overrides the artifact directory.
pub const ARTIFACTS_ENV: &str = "NEWSCLASS_ARTIFACTS";

const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Missing {artifact} artifact: {path}")]
    Missing { artifact: ArtifactKind, path: PathBuf },
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Invalid manifest: {0}")]
    InvalidManifest(#[from] serde_json::Error),
    #[error("Hash mismatch: expected {expected}, got {actual} for {artifact} file")]
    HashMismatch {
        artifact: ArtifactKind,
        expected: String,
        actual: String,
    },
}

impl From<ArtifactError> for ClassifierError {
    fn from(err: ArtifactError) -> Self {
        match &err {
            ArtifactError::Missing { artifact, path } => ClassifierError::ArtifactLoad {
                artifact: *artifact,
                reason: format!("file not found: {}", path.display()),
            },
            ArtifactError::HashMismatch { artifact, .. } => ClassifierError::ArtifactLoad {
                artifact: *artifact,
                reason: err.to_string(),
            },
            _ => ClassifierError::Build(err.to_string()),
        }
    }
}

/// Expected SHA-256 digests, keyed `model`, `tokenizer` and `labels`.
/// Artifacts without an entry are only checked for presence.
#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(flatten)]
    hashes: HashMap<String, String>,
}

impl Manifest {
    fn expected(&self, artifact: ArtifactKind) -> Option<&str> {
        self.hashes.get(&artifact.to_string()).map(String::as_str)
    }
}

/// A directory holding the classifier's pre-trained artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Creates a store over the default artifact directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_dir())
    }

    /// Returns the default artifact directory path
    pub fn get_default_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var(ARTIFACTS_ENV) {
            return PathBuf::from(path);
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("newsclass").join("artifacts");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("newsclass").join("artifacts");
        }

        // 4. If all else fails, use system temp directory (platform agnostic)
        env::temp_dir().join("newsclass").join("artifacts")
    }

    /// Opens an artifact directory. The directory must already exist.
    pub fn new<P: AsRef<Path>>(dir: P) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("artifact directory not found: {}", dir.display()),
            ));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, artifact: ArtifactKind) -> PathBuf {
        self.dir.join(artifact.file_name())
    }

    pub fn model_path(&self) -> PathBuf {
        self.path(ArtifactKind::Model)
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.path(ArtifactKind::Tokenizer)
    }

    pub fn labels_path(&self) -> PathBuf {
        self.path(ArtifactKind::Labels)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    /// Artifacts whose files are absent.
    pub fn missing(&self) -> Vec<ArtifactKind> {
        ArtifactKind::ALL
            .into_iter()
            .filter(|&artifact| {
                let path = self.path(artifact);
                log::debug!("  {} path: {:?} (exists: {})", artifact, path, path.exists());
                !path.exists()
            })
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    fn manifest(&self) -> Result<Option<Manifest>, ArtifactError> {
        let path = self.manifest_path();
        if !path.exists() {
            return Ok(None);
        }
        let manifest = serde_json::from_str(&fs::read_to_string(&path)?)?;
        Ok(Some(manifest))
    }

    fn hash_file(path: &Path) -> Result<String, ArtifactError> {
        let bytes = fs::read(path)?;
        log::debug!("Read {} bytes from {:?}", bytes.len(), path);
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// First artifact whose hash differs from the manifest, with both digests.
    fn first_mismatch(&self, manifest: &Manifest) -> Result<Option<(ArtifactKind, String, String)>, ArtifactError> {
        for artifact in ArtifactKind::ALL {
            let Some(expected) = manifest.expected(artifact) else {
                continue;
            };
            let actual = Self::hash_file(&self.path(artifact))?;
            log::info!("Verifying {}: expected {}, got {}", artifact, expected, actual);
            if !actual.eq_ignore_ascii_case(expected) {
                return Ok(Some((artifact, expected.to_string(), actual)));
            }
        }
        Ok(None)
    }

    /// Checks presence and, when a manifest exists, the recorded hashes.
    pub fn verify(&self) -> Result<bool, ArtifactError> {
        if !self.is_complete() {
            log::info!("One or more artifact files do not exist");
            return Ok(false);
        }
        match self.manifest()? {
            Some(manifest) => Ok(self.first_mismatch(&manifest)?.is_none()),
            None => {
                log::info!("No manifest in {:?}; checked presence only", self.dir);
                Ok(true)
            }
        }
    }

    /// Fails with the first missing artifact or hash mismatch.
    pub fn ensure_ready(&self) -> Result<(), ArtifactError> {
        if let Some(&artifact) = self.missing().first() {
            return Err(ArtifactError::Missing {
                artifact,
                path: self.path(artifact),
            });
        }
        if let Some(manifest) = self.manifest()? {
            if let Some((artifact, expected, actual)) = self.first_mismatch(&manifest)? {
                log::error!("{} hash mismatch: expected {}, got {}", artifact, expected, actual);
                return Err(ArtifactError::HashMismatch { artifact, expected, actual });
            }
        }
        Ok(())
    }
}
