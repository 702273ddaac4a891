//! Print job dispatch against an in-memory printer link

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{MockLink, menu, order, settings};
use print_bridge::printing::{
    FontConfig, JobStatus, PrintDispatcher, PrintOutcome, RetryPolicy, TicketComposer, WarningKind,
    index_menu,
};
use shared::models::{DrinkStationRouting, FloorZone};
use tokio_util::sync::CancellationToken;

const GRILL: &str = "tcp://10.0.0.1:9100";
const TATLI: &str = "tcp://10.0.0.2:9100";
const CUT: [u8; 4] = [0x1D, 0x56, 0x42, 4];

fn dispatcher(link: Arc<MockLink>) -> Arc<PrintDispatcher> {
    dispatcher_with_backoff(link, Duration::from_millis(1))
}

fn dispatcher_with_backoff(link: Arc<MockLink>, backoff: Duration) -> Arc<PrintDispatcher> {
    Arc::new(PrintDispatcher::new(
        link,
        Duration::from_millis(200),
        TicketComposer::new(48, chrono_tz::Europe::Istanbul),
        RetryPolicy {
            max_retries: 2,
            backoff,
        },
    ))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[tokio::test]
async fn test_grill_and_dessert_both_print() {
    let link = MockLink::new();
    link.online(GRILL);
    link.online(TATLI);
    let dispatcher = dispatcher(link.clone());

    let report = dispatcher
        .dispatch_job(
            &order("3f2a9c41-aa", 7, &["kunefe", "adana"]),
            Arc::new(settings()),
            &index_menu(menu()),
            FontConfig::default(),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(report.status, JobStatus::Completed);
    let stations: Vec<_> = report.results.iter().map(|r| r.station_id.as_str()).collect();
    assert_eq!(stations, ["grill", "tatli"]);
    assert!(report.results.iter().all(|r| r.is_success() && r.attempts == 1));
    assert!(report.warnings.is_empty());

    let grill = link.received(GRILL);
    assert!(contains(&grill, b"MASA 7"));
    assert!(contains(&grill, b"[ IZGARA ]"));
    assert!(contains(&grill, b"Siparis No: 3f2a9c41"));
    assert!(grill.ends_with(&CUT));
    assert!(contains(&link.received(TATLI), b"[ TATLI ]"));
}

#[tokio::test]
async fn test_retry_exhausted_does_not_affect_siblings() {
    let link = MockLink::new();
    link.flaky(GRILL);
    link.online(TATLI);
    let dispatcher = dispatcher(link.clone());

    let report = dispatcher
        .dispatch_job(
            &order("order-2", 3, &["adana", "kunefe"]),
            Arc::new(settings()),
            &index_menu(menu()),
            FontConfig::default(),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(report.status, JobStatus::PartiallyFailed);
    let grill = &report.results[0];
    assert_eq!(grill.outcome, PrintOutcome::RetryExhausted);
    assert_eq!(grill.attempts, 3);
    assert_eq!(grill.address.as_deref(), Some(GRILL));
    assert!(grill.error.as_deref().unwrap().contains("3 attempts"));
    assert_eq!(link.send_count(GRILL), 3);
    assert!(report.results[1].is_success());

    // Final failure drops the cached address
    assert!(dispatcher.resolver().cached("grill").is_none());
    assert!(dispatcher.resolver().cached("tatli").is_some());
}

#[tokio::test]
async fn test_unreachable_printer_reports_every_candidate() {
    let link = MockLink::new();
    let dispatcher = dispatcher(link.clone());

    let report = dispatcher
        .dispatch_job(
            &order("order-3", 1, &["ayran"]),
            Arc::new(settings()),
            &index_menu(menu()),
            FontConfig::default(),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(report.status, JobStatus::Failed);
    let bar = &report.results[0];
    assert_eq!(bar.outcome, PrintOutcome::Unreachable);
    let tried: Vec<_> = bar.probes.iter().map(|p| p.address.as_str()).collect();
    assert_eq!(
        tried,
        [
            "tcp://10.0.0.3:9100",
            "tcp://127.0.0.1:9100",
            "tcp://localhost:9100",
            r"\\localhost\BAR",
            r"\\127.0.0.1\BAR",
            "printer:BAR",
        ]
    );
    assert!(bar.probes.iter().all(|p| !p.ok && p.error.is_some()));
}

#[tokio::test]
async fn test_unknown_station_prints_on_default_printer() {
    let link = MockLink::new();
    link.online(GRILL);
    let dispatcher = dispatcher(link.clone());
    let mut settings = settings();
    settings.default_station = Some("grill".into());

    let report = dispatcher
        .dispatch_job(
            &order("order-4", 9, &["pide"]),
            Arc::new(settings),
            &index_menu(menu()),
            FontConfig::default(),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(report.status, JobStatus::Completed);
    assert_eq!(report.results[0].station_id, "genel");
    assert_eq!(report.results[0].address.as_deref(), Some(GRILL));
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].kind, WarningKind::UnknownStation);
    assert!(contains(&link.received(GRILL), b"[ GENEL ]"));
}

#[tokio::test]
async fn test_unknown_station_without_default_printer() {
    let link = MockLink::new();
    let dispatcher = dispatcher(link.clone());

    let report = dispatcher
        .dispatch_job(
            &order("order-5", 9, &["pide"]),
            Arc::new(settings()),
            &index_menu(menu()),
            FontConfig::default(),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(report.results[0].outcome, PrintOutcome::ConfigError);
    assert!(link.probes().is_empty());
}

#[tokio::test]
async fn test_resolution_stops_at_first_answer_and_is_cached() {
    let link = MockLink::new();
    link.online("tcp://localhost:9100");
    let dispatcher = dispatcher(link.clone());
    let mut settings = settings();
    settings.printers.get_mut("grill").unwrap().ip = String::new();
    let settings = Arc::new(settings);
    let menu = index_menu(menu());

    for id in ["order-6", "order-7"] {
        let report = dispatcher
            .dispatch_job(
                &order(id, 2, &["adana"]),
                Arc::clone(&settings),
                &menu,
                FontConfig::default(),
                &CancellationToken::new(),
            )
            .await;
        assert_eq!(report.status, JobStatus::Completed);
    }

    assert_eq!(link.probes(), ["tcp://127.0.0.1:9100", "tcp://localhost:9100"]);
    assert_eq!(link.send_count("tcp://localhost:9100"), 2);
}

#[tokio::test]
async fn test_same_station_jobs_do_not_interleave() {
    let link = MockLink::new();
    link.online(GRILL);
    let dispatcher = dispatcher(link.clone());
    let settings = Arc::new(settings());
    let menu = index_menu(menu());
    let cancel = CancellationToken::new();

    let first = order("aaaaaaaa-1", 4, &["adana", "adana"]);
    let second = order("bbbbbbbb-2", 5, &["adana"]);
    let (a, b) = tokio::join!(
        dispatcher.dispatch_job(&first, Arc::clone(&settings), &menu, FontConfig::default(), &cancel),
        dispatcher.dispatch_job(&second, Arc::clone(&settings), &menu, FontConfig::default(), &cancel),
    );
    assert_eq!(a.status, JobStatus::Completed);
    assert_eq!(b.status, JobStatus::Completed);

    let stream = link.received(GRILL);
    let split = stream
        .windows(CUT.len())
        .position(|w| w == CUT)
        .map(|p| p + CUT.len())
        .unwrap();
    let (one, two) = stream.split_at(split);

    assert!(one.starts_with(&[0x1B, 0x40]));
    assert!(two.starts_with(&[0x1B, 0x40]));
    assert!(two.ends_with(&CUT));
    assert_ne!(contains(one, b"aaaaaaaa"), contains(two, b"aaaaaaaa"));
    assert_ne!(contains(one, b"bbbbbbbb"), contains(two, b"bbbbbbbb"));
    assert_ne!(contains(one, b"aaaaaaaa"), contains(one, b"bbbbbbbb"));
}

#[tokio::test]
async fn test_cancelled_job_abandons_every_station() {
    let link = MockLink::new();
    link.online(GRILL);
    link.online(TATLI);
    let dispatcher = dispatcher(link.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = dispatcher
        .dispatch_job(
            &order("order-8", 1, &["adana", "kunefe"]),
            Arc::new(settings()),
            &index_menu(menu()),
            FontConfig::default(),
            &cancel,
        )
        .await;

    assert_eq!(report.status, JobStatus::Failed);
    assert!(report.results.iter().all(|r| r.outcome == PrintOutcome::Abandoned));
    assert_eq!(link.send_count(GRILL), 0);
}

#[tokio::test]
async fn test_cancel_abandons_waiting_ticket_but_finishes_running_one() {
    let link = MockLink::new();
    link.online(GRILL);
    link.set_send_delay(Duration::from_millis(5));
    let dispatcher = dispatcher(link.clone());
    let settings = Arc::new(settings());
    let menu = Arc::new(index_menu(menu()));
    let cancel = CancellationToken::new();

    let running = {
        let (d, s, m, c) = (dispatcher.clone(), settings.clone(), menu.clone(), cancel.clone());
        tokio::spawn(async move {
            d.dispatch_job(&order("order-9", 1, &["adana"]), s, &m, FontConfig::default(), &c)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let waiting = {
        let (d, s, m, c) = (dispatcher.clone(), settings.clone(), menu.clone(), cancel.clone());
        tokio::spawn(async move {
            d.dispatch_job(&order("order-10", 2, &["adana"]), s, &m, FontConfig::default(), &c)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    cancel.cancel();

    let running = running.await.unwrap();
    let waiting = waiting.await.unwrap();
    assert_eq!(running.results[0].outcome, PrintOutcome::Success);
    assert_eq!(waiting.results[0].outcome, PrintOutcome::Abandoned);
    assert_eq!(link.send_count(GRILL), 1);
}

#[tokio::test]
async fn test_cancel_stops_pending_retries() {
    let link = MockLink::new();
    link.flaky(GRILL);
    let dispatcher = dispatcher_with_backoff(link.clone(), Duration::from_millis(200));
    let cancel = CancellationToken::new();

    let job = {
        let (d, c) = (dispatcher.clone(), cancel.clone());
        tokio::spawn(async move {
            d.dispatch_job(
                &order("order-11", 4, &["adana"]),
                Arc::new(settings()),
                &index_menu(menu()),
                FontConfig::default(),
                &c,
            )
            .await
        })
    };
    // First attempt fails at once, the job then waits out the backoff
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let report = job.await.unwrap();
    let grill = &report.results[0];
    assert_eq!(grill.outcome, PrintOutcome::Abandoned);
    assert_eq!(grill.attempts, 1);
    assert_eq!(grill.address.as_deref(), Some(GRILL));
    assert_eq!(link.send_count(GRILL), 1);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(link.send_count(GRILL), 1);
}

#[tokio::test]
async fn test_takeaway_zone_prints_packet_number() {
    let link = MockLink::new();
    link.online(GRILL);
    let dispatcher = dispatcher(link.clone());
    let mut settings = settings();
    settings.drink_station_routing = DrinkStationRouting {
        source_station: Some("bar".into()),
        floors: vec![FloorZone {
            name: "Paket Servis".into(),
            start_table: 50,
            end_table: 60,
            is_takeaway: true,
            drink_station: None,
        }],
    };

    let report = dispatcher
        .dispatch_job(
            &order("order-11", 53, &["adana"]),
            Arc::new(settings),
            &index_menu(menu()),
            FontConfig::default(),
            &CancellationToken::new(),
        )
        .await;

    let zone = report.zone.unwrap();
    assert_eq!(zone.zone.name, "Paket Servis");
    assert_eq!(zone.packet_number, Some(4));
    assert!(contains(&link.received(GRILL), b"PAKET 4"));
}

#[tokio::test]
async fn test_table_outside_zones_warns() {
    let link = MockLink::new();
    link.online(GRILL);
    let dispatcher = dispatcher(link.clone());
    let mut settings = settings();
    settings.drink_station_routing.floors = vec![FloorZone {
        name: "Zemin".into(),
        start_table: 1,
        end_table: 10,
        is_takeaway: false,
        drink_station: None,
    }];

    let report = dispatcher
        .dispatch_job(
            &order("order-12", 99, &["adana"]),
            Arc::new(settings),
            &index_menu(menu()),
            FontConfig::default(),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(report.status, JobStatus::Completed);
    assert!(report.zone.is_none());
    assert_eq!(report.warnings[0].kind, WarningKind::ZoneNotFound);
}
