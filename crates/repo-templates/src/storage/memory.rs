//! In-memory repository host for testing and development
//!
//! Repositories are plain maps of path to bytes. Failures can be injected per
//! repository and per path to exercise the scan's fault isolation, and the
//! host counts opened and closed sessions.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::RepositoryError;
use crate::repository::{
    Repository, RepositoryManager, RepositoryService, RepositoryServiceFactory,
};

#[derive(Debug, Default, Clone)]
struct Faults {
    open: bool,
    close: bool,
    exists: HashSet<String>,
    read: HashSet<String>,
}

#[derive(Debug, Clone)]
struct StoredRepository {
    repository: Repository,
    files: HashMap<String, Vec<u8>>,
    faults: Faults,
}

#[derive(Debug, Default)]
struct HostState {
    repositories: Vec<StoredRepository>,
    fail_listing: bool,
    opened: usize,
    closed: usize,
}

/// In-memory repository host
#[derive(Debug, Default, Clone)]
pub struct MemoryRepositoryHost {
    state: Arc<Mutex<HostState>>,
}

fn lock(state: &Mutex<HostState>) -> Result<MutexGuard<'_, HostState>, RepositoryError> {
    state
        .lock()
        .map_err(|_| RepositoryError::Backend("Lock poisoned".into()))
}

impl MemoryRepositoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository; its id is its position in the listing
    pub fn add_repository(&self, namespace: &str, name: &str) -> Repository {
        let mut state = self.state.lock().unwrap();
        let repository = Repository::new(state.repositories.len().to_string(), namespace, name);
        state.repositories.push(StoredRepository {
            repository: repository.clone(),
            files: HashMap::new(),
            faults: Faults::default(),
        });
        repository
    }

    /// Store a file in the repository, replacing any previous content
    pub fn put_file(&self, repository: &Repository, path: &str, content: impl Into<Vec<u8>>) {
        self.with_repository(repository, |stored| {
            stored.files.insert(path.to_string(), content.into());
        });
    }

    pub fn remove_file(&self, repository: &Repository, path: &str) {
        self.with_repository(repository, |stored| {
            stored.files.remove(path);
        });
    }

    /// Make `exists(path)` fail for this repository
    pub fn fail_exists(&self, repository: &Repository, path: &str) {
        self.with_repository(repository, |stored| {
            stored.faults.exists.insert(path.to_string());
        });
    }

    /// Make `read(path)` fail for this repository
    pub fn fail_read(&self, repository: &Repository, path: &str) {
        self.with_repository(repository, |stored| {
            stored.faults.read.insert(path.to_string());
        });
    }

    /// Make opening a session for this repository fail
    pub fn fail_open(&self, repository: &Repository) {
        self.with_repository(repository, |stored| stored.faults.open = true);
    }

    /// Make closing sessions of this repository fail
    pub fn fail_close(&self, repository: &Repository) {
        self.with_repository(repository, |stored| stored.faults.close = true);
    }

    /// Make `get_all` fail
    pub fn fail_listing(&self) {
        self.state.lock().unwrap().fail_listing = true;
    }

    /// Number of sessions handed out so far
    pub fn sessions_opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    /// Number of `close` calls received so far, failed ones included
    pub fn sessions_closed(&self) -> usize {
        self.state.lock().unwrap().closed
    }

    /// Sessions opened but not yet closed
    pub fn open_sessions(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.opened - state.closed
    }

    fn with_repository(&self, repository: &Repository, f: impl FnOnce(&mut StoredRepository)) {
        let mut state = self.state.lock().unwrap();
        if let Some(stored) = state
            .repositories
            .iter_mut()
            .find(|stored| stored.repository.id == repository.id)
        {
            f(stored);
        }
    }
}

#[async_trait]
impl RepositoryManager for MemoryRepositoryHost {
    async fn get_all(&self) -> Result<Vec<Repository>, RepositoryError> {
        let state = lock(&self.state)?;
        if state.fail_listing {
            return Err(RepositoryError::Backend("Repository listing unavailable".into()));
        }
        Ok(state
            .repositories
            .iter()
            .map(|stored| stored.repository.clone())
            .collect())
    }
}

#[async_trait]
impl RepositoryServiceFactory for MemoryRepositoryHost {
    async fn create(
        &self,
        repository: &Repository,
    ) -> Result<Box<dyn RepositoryService>, RepositoryError> {
        let mut state = lock(&self.state)?;
        let stored = state
            .repositories
            .iter()
            .find(|stored| stored.repository.id == repository.id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(repository.namespace_and_name().to_string()))?;

        if stored.faults.open {
            return Err(RepositoryError::Backend(format!(
                "Cannot open repository {}",
                repository.namespace_and_name()
            )));
        }

        state.opened += 1;

        // The session works on a snapshot so it sees a consistent view
        Ok(Box::new(MemorySession {
            repository: stored.repository,
            files: stored.files,
            faults: stored.faults,
            state: Arc::clone(&self.state),
        }))
    }
}

struct MemorySession {
    repository: Repository,
    files: HashMap<String, Vec<u8>>,
    faults: Faults,
    state: Arc<Mutex<HostState>>,
}

#[async_trait]
impl RepositoryService for MemorySession {
    fn repository(&self) -> &Repository {
        &self.repository
    }

    async fn exists(&self, path: &str) -> Result<bool, RepositoryError> {
        if self.faults.exists.contains(path) {
            return Err(RepositoryError::Backend(format!("Cannot browse {}", path)));
        }
        Ok(self.files.contains_key(path))
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, RepositoryError> {
        if self.faults.read.contains(path) {
            return Err(RepositoryError::Backend(format!("Cannot read {}", path)));
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(path.to_string()))
    }

    fn close(&mut self) -> Result<(), RepositoryError> {
        lock(&self.state)?.closed += 1;
        if self.faults.close {
            return Err(RepositoryError::Backend(format!(
                "Cannot close repository {}",
                self.repository.namespace_and_name()
            )));
        }
        Ok(())
    }
}
