//! Shared utility functions for minc crates

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Get the user's home directory
///
/// Prefers the HOME environment variable over `dirs::home_dir()`, which reads
/// the password database and ignores overrides.
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }

    dirs::home_dir().ok_or_else(|| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "could not determine home directory",
        ))
    })
}

/// Resolve the user's kubeconfig path
///
/// The first entry of `KUBECONFIG` wins; otherwise `~/.kube/config`.
pub fn kubeconfig_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os("KUBECONFIG")
        .and_then(|v| std::env::split_paths(&v).find(|p| !p.as_os_str().is_empty()))
    {
        return Ok(path);
    }

    Ok(get_home_dir()?.join(".kube").join("config"))
}

/// Fail with [`Error::FileNotFound`] unless `path` exists
pub fn ensure_file_exists(what: &str, path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::file_not_found(what, path.display()))
    }
}
