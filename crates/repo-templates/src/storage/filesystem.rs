//! Filesystem repository host
//!
//! Serves repositories checked out as `{root}/{namespace}/{name}/`. Every
//! directory two levels below the root is a repository; hidden directories are
//! ignored at both levels. Symlinked namespace and repository directories are
//! followed, but a session only reads files whose real path stays inside the
//! real repository directory.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use crate::error::RepositoryError;
use crate::repository::{
    Repository, RepositoryManager, RepositoryService, RepositoryServiceFactory,
};

/// Repository host backed by a directory tree
#[derive(Debug, Clone)]
pub struct FsRepositoryHost {
    root: PathBuf,
}

impl FsRepositoryHost {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn repository_dir(&self, repository: &Repository) -> Result<PathBuf, RepositoryError> {
        let namespace = checked_segment(&repository.namespace)?;
        let name = checked_segment(&repository.name)?;
        Ok(self.root.join(namespace).join(name))
    }

    /// Repositories of the given namespaces. An unreadable namespace is
    /// logged and contributes nothing.
    async fn list_repositories(&self, namespaces: Vec<String>) -> Vec<Repository> {
        let mut repositories = Vec::new();
        for namespace in namespaces {
            let names = match list_dirs(&self.root.join(&namespace)).await {
                Ok(names) => names,
                Err(e) => {
                    warn!("Skipping unreadable namespace {}: {}", namespace, e);
                    continue;
                }
            };
            for name in names {
                let id = format!("{}/{}", namespace, name);
                repositories.push(Repository::new(id, namespace.clone(), name));
            }
        }
        repositories
    }
}

/// Reject anything that is not a single plain path segment
fn checked_segment(segment: &str) -> Result<&str, RepositoryError> {
    let mut components = Path::new(segment).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(segment),
        _ => Err(RepositoryError::InvalidPath(segment.to_string())),
    }
}

/// Resolve a repository-relative path lexically
fn resolve(base: &Path, path: &str) -> Result<PathBuf, RepositoryError> {
    let relative = Path::new(path);
    let plain = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
    if path.is_empty() || !plain {
        return Err(RepositoryError::InvalidPath(path.to_string()));
    }
    Ok(base.join(relative))
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Visible subdirectories of `path`, symlinks to directories included
async fn list_dirs(path: &Path) -> Result<Vec<String>, RepositoryError> {
    let mut entries = tokio::fs::read_dir(path).await?;
    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            debug!("Skipping non UTF-8 directory in {}", path.display());
            continue;
        };
        if is_hidden(&name) {
            continue;
        }
        match tokio::fs::metadata(entry.path()).await {
            Ok(metadata) if metadata.is_dir() => dirs.push(name),
            Ok(_) => {}
            Err(e) => debug!("Skipping {}: {}", entry.path().display(), e),
        }
    }
    dirs.sort();
    Ok(dirs)
}

#[async_trait]
impl RepositoryManager for FsRepositoryHost {
    async fn get_all(&self) -> Result<Vec<Repository>, RepositoryError> {
        let namespaces = list_dirs(&self.root).await?;
        Ok(self.list_repositories(namespaces).await)
    }
}

#[async_trait]
impl RepositoryServiceFactory for FsRepositoryHost {
    async fn create(
        &self,
        repository: &Repository,
    ) -> Result<Box<dyn RepositoryService>, RepositoryError> {
        let dir = self.repository_dir(repository)?;
        let dir = match tokio::fs::canonicalize(&dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RepositoryError::NotFound(
                    repository.namespace_and_name().to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };
        if !tokio::fs::metadata(&dir).await?.is_dir() {
            return Err(RepositoryError::InvalidPath(dir.display().to_string()));
        }
        Ok(Box::new(FsRepositorySession {
            repository: repository.clone(),
            dir,
        }))
    }
}

struct FsRepositorySession {
    repository: Repository,
    /// Canonical repository directory
    dir: PathBuf,
}

impl FsRepositorySession {
    /// Real path of `path`, or `None` if it does not exist. Fails when the
    /// real path lies outside the repository.
    async fn locate(&self, path: &str) -> Result<Option<PathBuf>, RepositoryError> {
        let file = resolve(&self.dir, path)?;
        let real = match tokio::fs::canonicalize(&file).await {
            Ok(real) => real,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if !real.starts_with(&self.dir) {
            return Err(RepositoryError::InvalidPath(format!(
                "{} points outside the repository",
                path
            )));
        }
        Ok(Some(real))
    }
}

#[async_trait]
impl RepositoryService for FsRepositorySession {
    fn repository(&self) -> &Repository {
        &self.repository
    }

    async fn exists(&self, path: &str) -> Result<bool, RepositoryError> {
        match self.locate(path).await? {
            Some(real) => Ok(tokio::fs::metadata(&real).await?.is_file()),
            None => Ok(false),
        }
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, RepositoryError> {
        let real = self
            .locate(path)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(path.to_string()))?;
        tokio::fs::read(&real).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => RepositoryError::NotFound(path.to_string()),
            _ => e.into(),
        })
    }

    fn close(&mut self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
