//! Audit context for dependency injection

use provaudit_compare::{CompareOptions, Comparator};
use provaudit_config::Config;
use provaudit_errors::{Error, OpsError};
use provaudit_events::{EventEmitter, EventSender};
use provaudit_net::{NetClient, NetConfig};
use provaudit_sources::{
    ArtifactSource, GitHubArchive, PipIndex, PipRegistry, PypiIndex, PypiRegistry, RepoRef,
    Staging, VersionIndex,
};
use provaudit_types::RegistryBackend;
use std::sync::Arc;

/// Everything one audit run needs
///
/// Each run owns its context; nothing is shared between runs.
pub struct AuditCtx {
    /// Package name on the registry
    pub package: String,
    /// `owner/repo` on the hosting service
    pub repository: String,
    /// Version enumerator
    pub index: Arc<dyn VersionIndex>,
    /// Registry channel
    pub registry: Arc<dyn ArtifactSource>,
    /// Source hosting channel
    pub source: Arc<dyn ArtifactSource>,
    pub comparator: Comparator,
    /// Optional on-disk copy of fetched artifacts
    pub staging: Option<Staging>,
    /// Versions processed at once
    pub jobs: usize,
    /// Event sender for progress reporting
    pub tx: Option<EventSender>,
}

impl EventEmitter for AuditCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl std::fmt::Debug for AuditCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditCtx")
            .field("package", &self.package)
            .field("repository", &self.repository)
            .field("staging", &self.staging)
            .field("jobs", &self.jobs)
            .finish_non_exhaustive()
    }
}

/// Builder for [`AuditCtx`]
#[derive(Default)]
pub struct AuditContextBuilder {
    package: Option<String>,
    repository: Option<String>,
    index: Option<Arc<dyn VersionIndex>>,
    registry: Option<Arc<dyn ArtifactSource>>,
    source: Option<Arc<dyn ArtifactSource>>,
    options: CompareOptions,
    staging: Option<Staging>,
    jobs: usize,
    tx: Option<EventSender>,
}

impl AuditContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            jobs: 1,
            ..Self::default()
        }
    }

    /// Wire every component from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if `repository` is not an `owner/repo` reference or
    /// the HTTP client cannot be created.
    pub fn from_config(config: &Config, package: &str, repository: &str) -> Result<Self, Error> {
        let repo: RepoRef = repository.parse()?;
        let client = NetClient::new(NetConfig::from(&config.network))?;

        let source = GitHubArchive::new(client.clone(), &config.hosting.base_url, repo)
            .with_tag_prefix(&config.hosting.tag_prefix);
        let registry: Arc<dyn ArtifactSource> = match config.registry.backend {
            RegistryBackend::Api => Arc::new(PypiRegistry::new(
                client.clone(),
                &config.registry.base_url,
                package,
            )),
            RegistryBackend::Pip => Arc::new(PipRegistry::new(&config.registry.python, package)),
        };

        let mut builder = Self::new()
            .with_package(package)
            .with_repository(repository)
            .with_index(version_index(config, client))
            .with_registry(registry)
            .with_source(Arc::new(source))
            .with_options(CompareOptions {
                decode_policy: config.compare.decode_policy,
                path_match: config.compare.path_match,
            })
            .with_jobs(config.jobs());

        if config.staging.enabled {
            builder = builder.with_staging(Staging::new(config.staging_root(), package));
        }

        Ok(builder)
    }

    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    #[must_use]
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    #[must_use]
    pub fn with_index(mut self, index: Arc<dyn VersionIndex>) -> Self {
        self.index = Some(index);
        self
    }

    #[must_use]
    pub fn with_registry(mut self, registry: Arc<dyn ArtifactSource>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn ArtifactSource>) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: CompareOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_staging(mut self, staging: Staging) -> Self {
        self.staging = Some(staging);
        self
    }

    /// Set the number of versions processed concurrently (at least 1)
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Build the context
    ///
    /// # Errors
    ///
    /// Returns an error if any required component is missing.
    pub fn build(self) -> Result<AuditCtx, Error> {
        let missing = |component: &str| OpsError::MissingComponent {
            component: component.to_string(),
        };

        let package = self.package.ok_or_else(|| missing("package"))?;
        let repository = self.repository.ok_or_else(|| missing("repository"))?;
        let index = self.index.ok_or_else(|| missing("version_index"))?;
        let registry = self.registry.ok_or_else(|| missing("registry_source"))?;
        let source = self.source.ok_or_else(|| missing("source_archive"))?;

        Ok(AuditCtx {
            comparator: Comparator::new(&package, self.options),
            package,
            repository,
            index,
            registry,
            source,
            staging: self.staging,
            jobs: self.jobs.max(1),
            tx: self.tx,
        })
    }
}

/// Version enumerator selected by the configured registry backend
#[must_use]
pub fn version_index(config: &Config, client: NetClient) -> Arc<dyn VersionIndex> {
    match config.registry.backend {
        RegistryBackend::Api => Arc::new(PypiIndex::new(client, &config.registry.base_url)),
        RegistryBackend::Pip => Arc::new(PipIndex::new(&config.registry.python)),
    }
}
