//! Host repository abstraction
//!
//! The scan never talks to a version control backend directly. A host
//! provides a [`RepositoryManager`] that lists repositories and a
//! [`RepositoryServiceFactory`] that opens one [`RepositoryService`] session
//! per repository. Sessions are wrapped in a [`RepositorySession`] guard so
//! they are closed on every exit path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use tracing::warn;

use crate::error::RepositoryError;

/// `namespace/name` identity of a repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamespaceAndName {
    pub namespace: String,
    pub name: String,
}

impl NamespaceAndName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for NamespaceAndName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// A repository as listed by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Host-assigned identifier, opaque to the scan
    pub id: String,
    pub namespace: String,
    pub name: String,
}

impl Repository {
    pub fn new(
        id: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn namespace_and_name(&self) -> NamespaceAndName {
        NamespaceAndName::new(self.namespace.clone(), self.name.clone())
    }
}

/// Lists every repository managed by the host
#[async_trait]
pub trait RepositoryManager: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Repository>, RepositoryError>;
}

/// Opens per-repository sessions
#[async_trait]
pub trait RepositoryServiceFactory: Send + Sync {
    async fn create(
        &self,
        repository: &Repository,
    ) -> Result<Box<dyn RepositoryService>, RepositoryError>;
}

/// Read access to the files of one repository
///
/// Paths are relative to the repository root. A session is owned by the
/// worker that opened it and must be closed exactly once.
#[async_trait]
pub trait RepositoryService: Send + Sync {
    /// The repository this session was opened for
    fn repository(&self) -> &Repository;

    /// Check whether a file exists. Absence is `Ok(false)`, never an error.
    async fn exists(&self, path: &str) -> Result<bool, RepositoryError>;

    /// Read the full content of a file
    async fn read(&self, path: &str) -> Result<Vec<u8>, RepositoryError>;

    /// Release the session
    fn close(&mut self) -> Result<(), RepositoryError>;
}

/// Scoped session that closes the underlying service when dropped
pub struct RepositorySession {
    service: Box<dyn RepositoryService>,
    closed: bool,
}

impl RepositorySession {
    /// Open a session for `repository` through `factory`
    pub async fn open(
        factory: &dyn RepositoryServiceFactory,
        repository: &Repository,
    ) -> Result<Self, RepositoryError> {
        let service = factory.create(repository).await?;
        Ok(Self {
            service,
            closed: false,
        })
    }

    /// Close the session and report the outcome. Dropping afterwards is a no-op.
    pub fn close(mut self) -> Result<(), RepositoryError> {
        self.closed = true;
        self.service.close()
    }
}

impl Deref for RepositorySession {
    type Target = dyn RepositoryService;

    fn deref(&self) -> &Self::Target {
        self.service.as_ref()
    }
}

impl Drop for RepositorySession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.service.close() {
            warn!(
                "Failed to close session for repository {}: {}",
                self.service.repository().namespace_and_name(),
                e
            );
        }
    }
}
