//! Printer address resolution
//!
//! LAN printers are reachable in different ways depending on how the
//! restaurant PC was set up. Candidates are tried in a fixed order and the
//! first one that answers is cached per station until a print fails.
//!
//! Candidate order:
//! 1. `tcp://<ip>:<port>` when an IP is configured
//! 2. `tcp://127.0.0.1:<port>`, `tcp://localhost:<port>`
//! 3. `\\localhost\SHARE`, `\\127.0.0.1\SHARE`, `\\<host ip hint>\SHARE`
//! 4. `printer:SHARE`

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use masa_printer::PrinterAddress;
use serde::Serialize;
use shared::models::{PrinterConfig, RestaurantSettings};
use tracing::{debug, info, instrument, warn};

use super::error::DispatchError;
use super::link::PrinterLink;
use super::types::ProbeAttempt;

const LOOPBACK_HOSTS: [&str; 2] = ["127.0.0.1", "localhost"];
const SHARE_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

/// Address that answered for a station
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAddress {
    pub station_id: String,
    #[serde(serialize_with = "serialize_address")]
    pub address: PrinterAddress,
    pub from_cache: bool,
}

fn serialize_address<S: serde::Serializer>(addr: &PrinterAddress, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(addr)
}

/// Ordered candidate addresses for a printer, without duplicates
///
/// Lazy: nothing past the first answering candidate is ever built.
pub fn candidates<'a>(
    config: &'a PrinterConfig,
    host_ip_hint: Option<&'a str>,
) -> impl Iterator<Item = PrinterAddress> + 'a {
    let port = config.effective_port();
    let share = config.effective_share();
    let spooler_share = share.clone();
    let hint = host_ip_hint.map(str::trim).filter(|h| !h.is_empty());

    let direct = config
        .has_ip()
        .then(|| PrinterAddress::tcp(config.ip.trim(), port));
    let loopback = LOOPBACK_HOSTS
        .into_iter()
        .map(move |host| PrinterAddress::tcp(host, port));
    let shares = SHARE_HOSTS
        .into_iter()
        .chain(hint)
        .map(move |host| PrinterAddress::share(host, share.clone()));
    let spooler = std::iter::once_with(move || PrinterAddress::spooler(spooler_share));

    let mut seen = HashSet::new();
    direct
        .into_iter()
        .chain(loopback)
        .chain(shares)
        .chain(spooler)
        .filter(move |addr| seen.insert(addr.clone()))
}

/// Resolves and caches a working address per station
pub struct PrinterAddressResolver {
    link: Arc<dyn PrinterLink>,
    probe_timeout: Duration,
    cache: DashMap<String, PrinterAddress>,
}

impl PrinterAddressResolver {
    pub fn new(link: Arc<dyn PrinterLink>, probe_timeout: Duration) -> Self {
        Self {
            link,
            probe_timeout,
            cache: DashMap::new(),
        }
    }

    /// Cached address of a station, if any
    pub fn cached(&self, station_id: &str) -> Option<PrinterAddress> {
        self.cache.get(station_id).map(|a| a.clone())
    }

    /// Forget a station's address, the next job probes again
    pub fn invalidate(&self, station_id: &str) {
        if self.cache.remove(station_id).is_some() {
            debug!(station_id, "Cached printer address invalidated");
        }
    }

    /// Forget `address` for a station unless the cache already moved on
    ///
    /// A late failure must not evict an address that a newer resolution put
    /// there in the meantime.
    pub fn invalidate_if(&self, station_id: &str, address: &PrinterAddress) {
        if self
            .cache
            .remove_if(station_id, |_, cached| cached == address)
            .is_some()
        {
            debug!(station_id, address = %address, "Cached printer address invalidated");
        }
    }

    pub fn invalidate_all(&self) {
        self.cache.clear();
    }

    /// Cached address, or the first candidate that answers a probe
    ///
    /// `station_id` keys the cache; it is the station whose printer `config`
    /// describes, which for the default bucket may differ from the bucket id.
    #[instrument(skip(self, config, settings))]
    pub async fn resolve(
        &self,
        station_id: &str,
        config: &PrinterConfig,
        settings: &RestaurantSettings,
    ) -> Result<ResolvedAddress, DispatchError> {
        if let Some(address) = self.cached(station_id) {
            return Ok(ResolvedAddress {
                station_id: station_id.to_string(),
                address,
                from_cache: true,
            });
        }

        let mut attempts = Vec::new();
        for address in candidates(config, settings.host_ip_hint.as_deref()) {
            let attempt = self.probe_one(&address).await;
            let ok = attempt.ok;
            attempts.push(attempt);

            if ok {
                info!(address = %address, tried = attempts.len(), "Printer address resolved");
                self.cache.insert(station_id.to_string(), address.clone());
                return Ok(ResolvedAddress {
                    station_id: station_id.to_string(),
                    address,
                    from_cache: false,
                });
            }
        }

        warn!(tried = attempts.len(), "No printer address candidate answered");
        Err(DispatchError::PrinterUnreachable {
            station_id: station_id.to_string(),
            attempts,
        })
    }

    /// Probe every candidate, no early exit, cache untouched
    pub async fn diagnose(
        &self,
        config: &PrinterConfig,
        settings: &RestaurantSettings,
    ) -> Vec<ProbeAttempt> {
        let mut attempts = Vec::new();
        for address in candidates(config, settings.host_ip_hint.as_deref()) {
            attempts.push(self.probe_one(&address).await);
        }
        attempts
    }

    /// Probe a single address
    pub async fn probe_one(&self, address: &PrinterAddress) -> ProbeAttempt {
        let started = Instant::now();
        let result = match tokio::time::timeout(
            self.probe_timeout,
            self.link.probe(address, self.probe_timeout),
        )
        .await
        {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(_) => Err(format!("probe timed out after {:?}", self.probe_timeout)),
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        if let Err(e) = &result {
            debug!(address = %address, error = %e, "Candidate did not answer");
        }

        ProbeAttempt {
            address: address.to_string(),
            kind: address.kind(),
            ok: result.is_ok(),
            latency_ms,
            error: result.err(),
        }
    }
}
