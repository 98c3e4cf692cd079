//! Weight manifest and integrity verification for the landmark detector.
//!
//! The liveness check depends on two pretrained bundles from the face-api.js
//! weight distribution: a fast face locator (tiny face detector) and the
//! 68-point landmark model. Each bundle is a weights manifest plus one shard.
//!
//! The upstream distribution publishes no stable digests, so integrity is a
//! sidecar file (`<name>.sha256`) recorded by `presage setup` at download
//! time and re-verified before the models are loaded. A missing sidecar is
//! an error: it means the file did not arrive through setup.

use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Model file descriptor: expected filename, URL, human-readable size.
pub struct ModelFile {
    pub name: &'static str,
    pub url: &'static str,
    pub size_display: &'static str,
}

pub const MODELS: &[ModelFile] = &[
    ModelFile {
        name: "tiny_face_detector_model-weights_manifest.json",
        url: "https://raw.githubusercontent.com/justadudewhohacks/face-api.js/master/weights/tiny_face_detector_model-weights_manifest.json",
        size_display: "3 KB",
    },
    ModelFile {
        name: "tiny_face_detector_model-shard1",
        url: "https://raw.githubusercontent.com/justadudewhohacks/face-api.js/master/weights/tiny_face_detector_model-shard1",
        size_display: "190 KB",
    },
    ModelFile {
        name: "face_landmark_68_model-weights_manifest.json",
        url: "https://raw.githubusercontent.com/justadudewhohacks/face-api.js/master/weights/face_landmark_68_model-weights_manifest.json",
        size_display: "8 KB",
    },
    ModelFile {
        name: "face_landmark_68_model-shard1",
        url: "https://raw.githubusercontent.com/justadudewhohacks/face-api.js/master/weights/face_landmark_68_model-shard1",
        size_display: "350 KB",
    },
];

#[derive(Error, Debug)]
pub enum ModelIntegrityError {
    #[error("model file not found: {name} ({path})")]
    MissingModel { name: String, path: PathBuf },

    #[error("no recorded digest for {name} — run `presage setup` ({path})")]
    MissingDigest { name: String, path: PathBuf },

    #[error("failed to open model file: {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read model file: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write digest sidecar: {path}: {source}")]
    WriteDigest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "model checksum mismatch for {name} ({path})\n  expected: {expected}\n  got:      {got}"
    )]
    ChecksumMismatch {
        name: String,
        path: PathBuf,
        expected: String,
        got: String,
    },
}

/// Path of the digest sidecar recorded next to a model file.
pub fn sidecar_path(model_path: &Path) -> PathBuf {
    let mut name = model_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(".sha256");
    model_path.with_file_name(name)
}

/// Compute SHA-256 hex digest of a file.
pub fn sha256_file_hex(path: &Path) -> Result<String, ModelIntegrityError> {
    let mut file = fs::File::open(path).map_err(|source| ModelIntegrityError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = file
            .read(&mut buf)
            .map_err(|source| ModelIntegrityError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Digest a freshly downloaded model file and write its sidecar.
/// Returns the hex digest that was recorded.
pub fn record_digest(path: &Path) -> Result<String, ModelIntegrityError> {
    let digest = sha256_file_hex(path)?;
    let sidecar = sidecar_path(path);
    fs::write(&sidecar, format!("{digest}\n")).map_err(|source| {
        ModelIntegrityError::WriteDigest {
            path: sidecar.clone(),
            source,
        }
    })?;
    Ok(digest)
}

/// Verify a model file against its recorded sidecar digest.
pub fn verify_file(name: &str, path: &Path) -> Result<(), ModelIntegrityError> {
    if !path.exists() {
        return Err(ModelIntegrityError::MissingModel {
            name: name.to_string(),
            path: path.to_path_buf(),
        });
    }

    let sidecar = sidecar_path(path);
    let expected = fs::read_to_string(&sidecar).map_err(|_| ModelIntegrityError::MissingDigest {
        name: name.to_string(),
        path: sidecar.clone(),
    })?;
    let expected = expected.trim();

    let got = sha256_file_hex(path)?;
    if got != expected {
        return Err(ModelIntegrityError::ChecksumMismatch {
            name: name.to_string(),
            path: path.to_path_buf(),
            expected: expected.to_string(),
            got,
        });
    }

    Ok(())
}

/// Verify every manifest entry under `model_dir`.
pub fn verify_models_dir(model_dir: &Path) -> Result<(), ModelIntegrityError> {
    for model in MODELS {
        let path = model_dir.join(model.name);
        verify_file(model.name, &path)?;
    }

    Ok(())
}
