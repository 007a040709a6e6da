//! Operations context for dependency injection

use std::future::Future;
use std::path::Path;

use modsync_checker::Checker;
use modsync_config::Config;
use modsync_errors::Error;
use modsync_events::{EventEmitter, EventSender};
use modsync_install::Downloader;
use modsync_net::{CancellationToken, NetClient};
use modsync_provider::ProviderRegistry;

/// Everything an operation needs for one command invocation
#[derive(Debug)]
pub struct OpsCtx {
    /// Effective configuration, CLI overrides included
    pub config: Config,
    pub net: NetClient,
    pub registry: ProviderRegistry,
    /// Event sender for progress reporting
    pub tx: EventSender,
    /// Tripped by Ctrl-C or the deadline
    pub cancel: CancellationToken,
}

impl OpsCtx {
    // No public constructor - use OpsContextBuilder instead

    /// Install root from the configuration
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.general.path
    }

    #[must_use]
    pub fn downloader(&self) -> Downloader<'_> {
        Downloader::new(
            &self.registry,
            self.net.clone(),
            self.config.general.branch,
            self.config.general.arch,
        )
        .with_parallelism(self.config.general.parallel_downloads)
        .with_events(Some(self.tx.clone()))
    }

    #[must_use]
    pub fn checker(&self, modules: &[String]) -> Checker<'_> {
        Checker::new(
            &self.registry,
            self.config.general.branch,
            self.config.general.arch,
            modules.to_vec(),
        )
        .with_concurrency(self.config.general.parallel_downloads)
        .with_events(Some(self.tx.clone()))
    }

    /// Run `work` as the named operation, bounded by cancellation and the deadline
    ///
    /// When the deadline passes, the work is dropped (which aborts its
    /// download tasks) and the token is tripped for anything still watching.
    ///
    /// # Errors
    ///
    /// Returns the work's own error, [`Error::Cancelled`], or
    /// [`Error::DeadlineExceeded`].
    pub async fn run<T, F>(&self, operation: &str, work: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        self.emit_operation_started(operation);

        let guarded = async {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => Err(Error::Cancelled),
                result = work => result,
            }
        };
        let result = match self.config.deadline() {
            Some(limit) => match tokio::time::timeout(limit, guarded).await {
                Ok(result) => result,
                Err(_) => {
                    self.cancel.cancel();
                    Err(Error::DeadlineExceeded)
                }
            },
            None => guarded.await,
        };

        match &result {
            Ok(_) => self.emit_operation_completed(operation, true),
            Err(e) => self.emit_operation_failed(operation, e),
        }
        result
    }
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

/// Builder for operations context
#[derive(Debug, Default)]
pub struct OpsContextBuilder {
    config: Option<Config>,
    net: Option<NetClient>,
    registry: Option<ProviderRegistry>,
    tx: Option<EventSender>,
    cancel: Option<CancellationToken>,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set network client
    #[must_use]
    pub fn with_net(mut self, net: NetClient) -> Self {
        self.net = Some(net);
        self
    }

    /// Use a prepared registry instead of building one from the config
    #[must_use]
    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Build the context
    ///
    /// # Errors
    ///
    /// Returns an error if the config, network client or event sender is missing.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let config = self.config.ok_or_else(|| missing("config"))?;
        let net = self.net.ok_or_else(|| missing("net"))?;
        let tx = self.tx.ok_or_else(|| missing("event_sender"))?;

        let registry = self
            .registry
            .unwrap_or_else(|| ProviderRegistry::from_config(&config, &net, Some(tx.clone())));

        Ok(OpsCtx {
            config,
            net,
            registry,
            tx,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

fn missing(component: &str) -> Error {
    Error::internal(format!("operations context is missing its {component}"))
}
