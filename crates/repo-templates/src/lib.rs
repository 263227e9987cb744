//! # Repository Templates
//!
//! Discovers template descriptors committed to repositories and aggregates
//! them into a single hyperlinked collection:
//! - Every repository of a host is checked for `template.yml`, then `template.yaml`
//! - Descriptors are parsed from YAML and stamped with their owning repository
//! - A repository that cannot be read or parsed is skipped, never failing the scan
//! - The result is rendered as a HAL collection, optionally paginated
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use repo_templates::*;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let host = MemoryRepositoryHost::new();
//! let repository = host.add_repository("hitchhiker", "heart-of-gold");
//! host.put_file(&repository, "template.yml", "name: Improbability Drive");
//!
//! let collector = TemplateCollector::new(Arc::new(host.clone()), Arc::new(host));
//! let templates = collector.collect().await;
//!
//! let envelope = assemble(&templates, "/api");
//! println!("{}", serde_json::to_string_pretty(&envelope).unwrap());
//! # }
//! ```

pub mod assembler;
pub mod collector;
pub mod descriptor;
pub mod error;
pub mod repository;
pub mod storage;
pub mod template;

pub use assembler::{
    CollectionEnvelope, PageRequest, TemplateRepresentation, assemble, assemble_page,
    templates_href,
};
pub use collector::{CollectorConfig, ScanFailure, ScanReport, TemplateCollector};
pub use descriptor::{DescriptorParser, YamlDescriptorParser};
pub use error::{ParseError, RepositoryError, Result, ScanError};
pub use repository::{
    NamespaceAndName, Repository, RepositoryManager, RepositoryService,
    RepositoryServiceFactory, RepositorySession,
};
pub use storage::MemoryRepositoryHost;
pub use template::{RepositoryTemplate, TemplateDescriptor};

#[cfg(feature = "fs")]
pub use storage::FsRepositoryHost;
