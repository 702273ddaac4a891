//! Print dispatch
//!
//! One station ticket moves through
//! `Pending -> Resolving -> Resolved|Unreachable -> Printing -> Success|Failed`.
//! Transmissions to the same printer are serialized through
//! [`StationQueues`]; different printers print concurrently.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use shared::models::{Order, RestaurantSettings};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::composer::{TicketComposer, code_page_for, encode_escpos};
use super::error::{DispatchError, InvalidTransition};
use super::link::PrinterLink;
use super::queue::StationQueues;
use super::resolver::{PrinterAddressResolver, ResolvedAddress};
use super::router::{self, StationRouting, route};
use super::types::{
    FontConfig, JobReport, JobStatus, MenuIndex, PrintOutcome, PrintResult, StationBucket,
    TicketContext,
};
use super::zone::{self, ZoneAssignment, ZoneContext};

/// Bounded retries with linear backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Wait before retry number `retry` (1-based)
    pub fn delay(&self, retry: u32) -> Duration {
        self.backoff * retry
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_millis(250),
        }
    }
}

/// Lifecycle of one station ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DispatchState {
    Pending,
    Resolving,
    Resolved { address: String },
    Unreachable,
    Printing { attempt: u32 },
    Success,
    Failed { retryable: bool },
    Abandoned,
}

impl DispatchState {
    /// Move to `next`, rejecting steps the lifecycle does not allow
    pub fn advance(self, next: DispatchState) -> Result<DispatchState, InvalidTransition> {
        use DispatchState::*;

        let allowed = match (&self, &next) {
            (Pending, Resolving | Abandoned) => true,
            (Pending, Resolved { .. }) => true,
            (Resolving, Resolved { .. } | Unreachable) => true,
            (Resolved { .. }, Printing { attempt: 1 } | Abandoned) => true,
            (Printing { .. }, Success | Failed { .. }) => true,
            (Failed { retryable: true }, Printing { .. } | Abandoned) => true,
            _ => false,
        };

        if allowed {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DispatchState::Unreachable
                | DispatchState::Success
                | DispatchState::Failed { retryable: false }
                | DispatchState::Abandoned
        )
    }
}

/// State of one in-flight ticket, logged on every step
struct Progress {
    station_id: String,
    state: DispatchState,
    started: Instant,
}

impl Progress {
    fn new(station_id: &str) -> Self {
        Self {
            station_id: station_id.to_string(),
            state: DispatchState::Pending,
            started: Instant::now(),
        }
    }

    fn to(&mut self, next: DispatchState) -> Result<(), InvalidTransition> {
        let prev = std::mem::replace(&mut self.state, DispatchState::Pending);
        match prev.clone().advance(next) {
            Ok(state) => {
                debug!(station_id = %self.station_id, from = ?prev, to = ?state, "Dispatch state");
                self.state = state;
                Ok(())
            }
            Err(e) => {
                self.state = prev;
                Err(e)
            }
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn result(&self, outcome: PrintOutcome, error: Option<String>) -> PrintResult {
        PrintResult {
            station_id: self.station_id.clone(),
            outcome,
            latency_ms: self.elapsed_ms(),
            attempts: 0,
            address: None,
            error,
            probes: Vec::new(),
        }
    }
}

/// How the attempt loop ended
enum Transmitted {
    Printed(u32),
    /// Cancelled between attempts, after this many
    Cancelled(u32),
    Failed(DispatchError),
}

fn outcome_of(err: &DispatchError) -> PrintOutcome {
    match err {
        DispatchError::PrinterUnreachable { .. } => PrintOutcome::Unreachable,
        DispatchError::RetryExhausted { .. } | DispatchError::Transmission { .. } => {
            PrintOutcome::RetryExhausted
        }
        DispatchError::Config(_) | DispatchError::ZoneNotFound(_) | DispatchError::State(_) => {
            PrintOutcome::ConfigError
        }
    }
}

/// One order, routed and ready to print
#[derive(Debug, Clone)]
pub struct JobPlan {
    pub routing: StationRouting,
    pub zone: Option<ZoneAssignment>,
    pub ctx: TicketContext,
}

/// Resolve the table zone and route the order's items
///
/// Zone routing is off when no floors are configured; a table outside every
/// floor only raises a routing warning.
pub fn plan_job(order: &Order, settings: &RestaurantSettings, menu: &MenuIndex) -> JobPlan {
    let floors = &settings.drink_station_routing.floors;
    let lookup = (!floors.is_empty()).then(|| zone::resolve(order.table_number, floors));
    let zone_ctx = match &lookup {
        None => ZoneContext::NotConfigured,
        Some(Ok(assignment)) => ZoneContext::Resolved(assignment),
        Some(Err(_)) => ZoneContext::Unresolved,
    };

    let routing = route(order, settings, menu, zone_ctx);
    let ctx = TicketContext::for_order(order, zone_ctx.assignment());

    JobPlan {
        routing,
        zone: lookup.and_then(Result::ok),
        ctx,
    }
}

/// Print engine entry point
pub struct PrintDispatcher {
    link: Arc<dyn PrinterLink>,
    resolver: PrinterAddressResolver,
    queues: StationQueues,
    composer: TicketComposer,
    policy: RetryPolicy,
}

impl PrintDispatcher {
    pub fn new(
        link: Arc<dyn PrinterLink>,
        probe_timeout: Duration,
        composer: TicketComposer,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            resolver: PrinterAddressResolver::new(Arc::clone(&link), probe_timeout),
            link,
            queues: StationQueues::new(),
            composer,
            policy,
        }
    }

    pub fn resolver(&self) -> &PrinterAddressResolver {
        &self.resolver
    }

    pub fn composer(&self) -> &TicketComposer {
        &self.composer
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Transmit an encoded ticket to an already resolved printer
    ///
    /// Waits for the printer's lane first; a ticket still waiting when
    /// `cancel` fires is abandoned, one that started transmitting finishes.
    pub async fn dispatch(
        &self,
        station_id: &str,
        resolved: &ResolvedAddress,
        data: &[u8],
        cancel: &CancellationToken,
    ) -> PrintResult {
        let mut progress = Progress::new(station_id);
        if let Err(e) = progress.to(DispatchState::Resolved {
            address: resolved.address.to_string(),
        }) {
            return progress.result(PrintOutcome::ConfigError, Some(e.to_string()));
        }
        self.deliver(progress, resolved, data, cancel).await
    }

    async fn deliver(
        &self,
        mut progress: Progress,
        resolved: &ResolvedAddress,
        data: &[u8],
        cancel: &CancellationToken,
    ) -> PrintResult {
        let address = resolved.address.to_string();

        let lane = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            guard = self.queues.acquire(&resolved.station_id) => Some(guard),
        };
        let Some(_lane) = lane else {
            let _ = progress.to(DispatchState::Abandoned);
            info!(station_id = %progress.station_id, "Print abandoned before transmission");
            return progress.result(PrintOutcome::Abandoned, Some("Cancelled before transmission".into()));
        };

        let mut result = match self.transmit(&mut progress, resolved, data, cancel).await {
            Transmitted::Printed(attempts) => {
                let mut r = progress.result(PrintOutcome::Success, None);
                r.attempts = attempts;
                r
            }
            Transmitted::Cancelled(attempts) => {
                let mut r = progress.result(
                    PrintOutcome::Abandoned,
                    Some(format!("Cancelled after {} attempt(s)", attempts)),
                );
                r.attempts = attempts;
                r
            }
            Transmitted::Failed(err) => {
                let mut r = progress.result(outcome_of(&err), Some(err.to_string()));
                if let DispatchError::RetryExhausted { attempts, .. } = err {
                    r.attempts = attempts;
                }
                r
            }
        };
        result.address = Some(address);

        match result.outcome {
            PrintOutcome::Success => info!(
                station_id = %result.station_id,
                address = result.address.as_deref().unwrap_or_default(),
                attempts = result.attempts,
                latency_ms = result.latency_ms,
                "Ticket printed"
            ),
            PrintOutcome::Abandoned => info!(
                station_id = %result.station_id,
                attempts = result.attempts,
                "Retries abandoned after cancellation"
            ),
            _ => {
                // Next job probes the candidates again
                self.resolver
                    .invalidate_if(&resolved.station_id, &resolved.address);
                error!(
                    station_id = %result.station_id,
                    attempts = result.attempts,
                    error = result.error.as_deref().unwrap_or_default(),
                    "Ticket failed"
                );
            }
        }
        result
    }

    /// Attempts with backoff
    ///
    /// An attempt that started always finishes; `cancel` only stops the
    /// next one from starting.
    async fn transmit(
        &self,
        progress: &mut Progress,
        resolved: &ResolvedAddress,
        data: &[u8],
        cancel: &CancellationToken,
    ) -> Transmitted {
        let max_attempts = self.policy.max_attempts();
        let mut last = String::new();

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                let cancelled = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => true,
                    _ = tokio::time::sleep(self.policy.delay(attempt - 1)) => false,
                };
                if cancelled {
                    let _ = progress.to(DispatchState::Abandoned);
                    return Transmitted::Cancelled(attempt - 1);
                }
            }
            if let Err(e) = progress.to(DispatchState::Printing { attempt }) {
                return Transmitted::Failed(e.into());
            }

            match self.link.send(&resolved.address, data).await {
                Ok(()) => {
                    if let Err(e) = progress.to(DispatchState::Success) {
                        return Transmitted::Failed(e.into());
                    }
                    return Transmitted::Printed(attempt);
                }
                Err(source) => {
                    let err = DispatchError::Transmission {
                        address: resolved.address.to_string(),
                        source,
                    };
                    warn!(
                        station_id = %progress.station_id,
                        attempt,
                        max_attempts,
                        error = %err,
                        "Print attempt failed"
                    );
                    last = err.to_string();
                    if let Err(e) = progress.to(DispatchState::Failed {
                        retryable: attempt < max_attempts,
                    }) {
                        return Transmitted::Failed(e.into());
                    }
                }
            }
        }

        Transmitted::Failed(DispatchError::RetryExhausted {
            station_id: progress.station_id.clone(),
            attempts: max_attempts,
            last,
        })
    }

    /// Resolve, compose, encode and transmit one station bucket
    #[instrument(skip_all, fields(station_id = %bucket.station_id, items = bucket.items.len()))]
    pub async fn dispatch_station(
        &self,
        bucket: &StationBucket,
        settings: &RestaurantSettings,
        ctx: &TicketContext,
        font: FontConfig,
        cancel: &CancellationToken,
    ) -> PrintResult {
        let mut progress = Progress::new(&bucket.station_id);

        if cancel.is_cancelled() {
            let _ = progress.to(DispatchState::Abandoned);
            return progress.result(PrintOutcome::Abandoned, Some("Cancelled before start".into()));
        }

        let Some(printer) = router::printer_for(&bucket.station_id, settings) else {
            let err = DispatchError::Config(format!(
                "No enabled printer for station '{}'",
                bucket.station_id
            ));
            warn!(error = %err, "Bucket has no printer");
            return progress.result(PrintOutcome::ConfigError, Some(err.to_string()));
        };

        if let Err(e) = progress.to(DispatchState::Resolving) {
            return progress.result(PrintOutcome::ConfigError, Some(e.to_string()));
        }
        let resolved = match self
            .resolver
            .resolve(&printer.station_id, printer, settings)
            .await
        {
            Ok(resolved) => resolved,
            Err(err) => {
                let _ = progress.to(DispatchState::Unreachable);
                let mut result = progress.result(outcome_of(&err), Some(err.to_string()));
                if let DispatchError::PrinterUnreachable { attempts, .. } = err {
                    result.probes = attempts;
                }
                return result;
            }
        };
        if let Err(e) = progress.to(DispatchState::Resolved {
            address: resolved.address.to_string(),
        }) {
            return progress.result(PrintOutcome::ConfigError, Some(e.to_string()));
        }

        let ticket = self
            .composer
            .compose(&bucket.label, &bucket.items, ctx, font, printer.language);
        let data = encode_escpos(&ticket, self.composer.width(), code_page_for(printer.language));

        self.deliver(progress, &resolved, &data, cancel).await
    }

    /// Route an order and print every bucket concurrently
    ///
    /// Results come back in bucket order. A failing station never affects
    /// its siblings.
    #[instrument(skip_all, fields(order_id = %order.id, table = order.table_number))]
    pub async fn dispatch_job(
        self: &Arc<Self>,
        order: &Order,
        settings: Arc<RestaurantSettings>,
        menu: &MenuIndex,
        font: FontConfig,
        cancel: &CancellationToken,
    ) -> JobReport {
        let JobPlan { routing, zone, ctx } = plan_job(order, &settings, menu);
        let ctx = Arc::new(ctx);

        let mut tasks = JoinSet::new();
        for (idx, bucket) in routing.buckets.iter().cloned().enumerate() {
            let this = Arc::clone(self);
            let settings = Arc::clone(&settings);
            let ctx = Arc::clone(&ctx);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let result = this
                    .dispatch_station(&bucket, &settings, &ctx, font, &cancel)
                    .await;
                (idx, result)
            });
        }

        let mut slots: Vec<Option<PrintResult>> = vec![None; routing.buckets.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, result)) => slots[idx] = Some(result),
                Err(e) => error!(error = %e, "Print task failed to complete"),
            }
        }

        let results: Vec<PrintResult> = slots
            .into_iter()
            .zip(&routing.buckets)
            .map(|(slot, bucket)| {
                slot.unwrap_or_else(|| {
                    PrintResult::failed(&bucket.station_id, PrintOutcome::Abandoned, "Print task aborted")
                })
            })
            .collect();

        let status = JobStatus::from_results(&results);
        info!(
            status = ?status,
            stations = results.len(),
            warnings = routing.warnings.len(),
            "Print job finished"
        );

        JobReport {
            order_id: order.id.clone(),
            status,
            zone,
            results,
            warnings: routing.warnings,
        }
    }
}
