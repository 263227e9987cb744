//! Error types for repository template discovery

use thiserror::Error;

use crate::repository::NamespaceAndName;

/// Failures reported by a repository host or one of its sessions
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Invalid repository path: {0}")]
    InvalidPath(String),

    #[error("Repository backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures while turning descriptor bytes into a [`TemplateDescriptor`](crate::TemplateDescriptor)
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Descriptor is empty")]
    Empty,
}

/// Failures that cause a single repository to be skipped during a scan
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Could not list repositories: {0}")]
    Listing(#[source] RepositoryError),

    #[error("Could not open repository {repository}: {source}")]
    Open {
        repository: NamespaceAndName,
        #[source]
        source: RepositoryError,
    },

    #[error("Could not read template file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: RepositoryError,
    },

    #[error("Could not parse template file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },

    #[error("Could not close repository {repository}: {source}")]
    Close {
        repository: NamespaceAndName,
        #[source]
        source: RepositoryError,
    },
}

/// Result type for scan operations
pub type Result<T> = std::result::Result<T, ScanError>;
