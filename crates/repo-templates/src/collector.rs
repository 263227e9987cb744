//! Repository-wide template collection

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::descriptor::{DescriptorParser, YamlDescriptorParser, read_descriptor};
use crate::error::{Result, ScanError};
use crate::repository::{
    NamespaceAndName, Repository, RepositoryManager, RepositoryServiceFactory, RepositorySession,
};
use crate::template::RepositoryTemplate;

/// Collector tuning
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Maximum number of repositories scanned at the same time
    pub concurrency: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// A repository that was skipped because scanning it failed
#[derive(Debug)]
pub struct ScanFailure {
    pub repository: NamespaceAndName,
    pub error: ScanError,
}

/// Outcome of one scan over all repositories
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Templates in repository listing order
    pub templates: Vec<RepositoryTemplate>,
    pub failures: Vec<ScanFailure>,
    /// Number of distinct repositories visited
    pub scanned: usize,
}

/// Scans every repository of a host for template descriptors
pub struct TemplateCollector {
    manager: Arc<dyn RepositoryManager>,
    factory: Arc<dyn RepositoryServiceFactory>,
    parser: Arc<dyn DescriptorParser>,
    config: CollectorConfig,
}

impl TemplateCollector {
    /// Create a collector parsing descriptors as YAML
    pub fn new(
        manager: Arc<dyn RepositoryManager>,
        factory: Arc<dyn RepositoryServiceFactory>,
    ) -> Self {
        Self {
            manager,
            factory,
            parser: Arc::new(YamlDescriptorParser),
            config: CollectorConfig::default(),
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn DescriptorParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_config(mut self, config: CollectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Collect the templates of all repositories.
    ///
    /// Never fails: repositories that cannot be scanned are logged and left
    /// out, as if they had no template.
    pub async fn collect(&self) -> Vec<RepositoryTemplate> {
        self.collect_report().await.templates
    }

    /// Collect the templates of all repositories, keeping track of failures
    pub async fn collect_report(&self) -> ScanReport {
        let repositories = match self.manager.get_all().await {
            Ok(repositories) => repositories,
            Err(e) => {
                error!("{}", ScanError::Listing(e));
                return ScanReport::default();
            }
        };

        let mut seen = HashSet::new();
        let repositories: Vec<Repository> = repositories
            .into_iter()
            .filter(|repository| {
                let first = seen.insert(repository.namespace_and_name());
                if !first {
                    warn!(
                        "Repository {} listed more than once, scanning it once",
                        repository.namespace_and_name()
                    );
                }
                first
            })
            .collect();

        debug!("Scanning {} repositories for templates", repositories.len());

        // `buffered` keeps listing order while up to `concurrency` scans run
        let outcomes: Vec<(Repository, Result<Option<RepositoryTemplate>>)> =
            stream::iter(repositories)
                .map(|repository| async move {
                    let outcome = self.scan_repository(&repository).await;
                    (repository, outcome)
                })
                .buffered(self.config.concurrency.max(1))
                .collect()
                .await;

        let mut report = ScanReport {
            scanned: outcomes.len(),
            ..ScanReport::default()
        };

        for (repository, outcome) in outcomes {
            match outcome {
                Ok(Some(template)) => report.templates.push(template),
                Ok(None) => {}
                Err(e) => {
                    error!(
                        "Could not read template file in repository {}: {}",
                        repository.namespace_and_name(),
                        e
                    );
                    report.failures.push(ScanFailure {
                        repository: repository.namespace_and_name(),
                        error: e,
                    });
                }
            }
        }

        info!(
            "Found {} templates in {} repositories ({} skipped)",
            report.templates.len(),
            report.scanned,
            report.failures.len()
        );

        report
    }

    /// Scan a single repository within its own session
    pub async fn scan_repository(
        &self,
        repository: &Repository,
    ) -> Result<Option<RepositoryTemplate>> {
        let session = RepositorySession::open(self.factory.as_ref(), repository)
            .await
            .map_err(|source| ScanError::Open {
                repository: repository.namespace_and_name(),
                source,
            })?;

        let descriptor = read_descriptor(&*session, self.parser.as_ref()).await;
        let owner = session.repository().namespace_and_name();
        let closed = session.close();

        let descriptor = descriptor?;
        closed.map_err(|source| ScanError::Close {
            repository: owner.clone(),
            source,
        })?;

        Ok(descriptor.map(|descriptor| RepositoryTemplate::new(owner, descriptor)))
    }
}
