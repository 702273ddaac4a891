use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::core::Config;
use crate::printing::{LocalLink, PrintDispatcher, PrinterLink, TicketComposer};
use crate::settings::{SettingsError, SettingsStore};

/// Shared state handed to every handler
///
/// Cheap to clone; everything behind it is reference counted.
///
/// | Field | Description |
/// |-------|-------------|
/// | config | Immutable bridge configuration |
/// | settings | Persisted restaurant settings, one snapshot per request |
/// | dispatcher | Print engine (resolver cache, station lanes) |
/// | shutdown | Cancelled on Ctrl-C; unstarted tickets are abandoned |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub settings: SettingsStore,
    pub dispatcher: Arc<PrintDispatcher>,
    pub shutdown: CancellationToken,
    pub started_at: Instant,
}

impl ServerState {
    /// Open the settings store under `WORK_DIR` and build the print engine
    pub fn initialize(config: &Config) -> Result<Self, SettingsError> {
        let settings = SettingsStore::open(Path::new(&config.work_dir))?;
        let link = Arc::new(LocalLink::new(config.probe_timeout(), config.write_timeout()));

        let state = Self::with_link(config.clone(), settings, link);
        tracing::info!(
            settings = %state.settings.path().display(),
            printers = state.settings.snapshot().printers.len(),
            "Server state initialized"
        );
        Ok(state)
    }

    /// Build state around any printer link
    pub fn with_link(config: Config, settings: SettingsStore, link: Arc<dyn PrinterLink>) -> Self {
        let composer = TicketComposer::new(config.paper_width, config.tz());
        let dispatcher = PrintDispatcher::new(
            link,
            config.probe_timeout(),
            composer,
            config.retry_policy(),
        );

        Self {
            config,
            settings,
            dispatcher: Arc::new(dispatcher),
            shutdown: CancellationToken::new(),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
