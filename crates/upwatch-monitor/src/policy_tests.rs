
use super::*;
use crate::health::{HealthReport, MemoryUsage};
use crate::metrics::{CpuInfo, DiskInfo, MemoryInfo, SystemInfo, SystemSnapshot};
use chrono::TimeZone;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
}

fn snapshot(cpu: f64, memory: f64, disk: f64) -> SystemSnapshot {
    SystemSnapshot {
        cpu: CpuInfo {
            usage_percent: cpu,
            logical_cores: 4,
            physical_cores: 2,
        },
        memory: MemoryInfo {
            total_gb: 16.0,
            used_gb: 16.0 * memory / 100.0,
            percent: memory,
        },
        disk: DiskInfo {
            total_gb: 100.0,
            used_gb: disk,
            percent: disk,
        },
        system: SystemInfo {
            platform: "Linux".to_string(),
            version: "6.1".to_string(),
            machine: "x86_64".to_string(),
            hostname: "testhost".to_string(),
            boot_time: t0(),
            uptime_seconds: 1000,
        },
        network_connections: 12,
        process_count: 100,
        timestamp: t0(),
    }
}

fn online() -> ServiceHealth {
    ServiceHealth::Online(HealthReport {
        timestamp: "2026-03-10T12:00:00Z".to_string(),
        uptime: 100.0,
        environment: "test".to_string(),
        memory_usage: MemoryUsage {
            rss: 1,
            heap_total: 1,
            heap_used: 1,
        },
    })
}

fn offline(reason: &str) -> ServiceHealth {
    ServiceHealth::Offline {
        reason: reason.to_string(),
    }
}

fn policy() -> AlertPolicy {
    AlertPolicy::new(
        AlertThresholds {
            cpu: 90.0,
            memory: 90.0,
            disk: 90.0,
        },
        Duration::seconds(1800),
        true,
    )
}

#[test]
fn test_all_clear_yields_no_events() {
    let mut policy = policy();
    let events = policy.evaluate(
        crate::metrics::mean(&[85.0, 89.0, 80.0]),
        &snapshot(50.0, 40.0, 30.0),
        &online(),
        t0(),
    );
    assert!(events.is_empty());
}

#[test]
fn test_high_cpu_average_fires() {
    let mut policy = policy();
    let events = policy.evaluate(
        crate::metrics::mean(&[95.0, 96.0, 94.0]),
        &snapshot(95.0, 40.0, 30.0),
        &online(),
        t0(),
    );
    assert_eq!(
        events,
        vec![AlertEvent::Alert {
            issues: vec!["High CPU Usage: 95.0%".to_string()]
        }]
    );
}

#[test]
fn test_multiple_issues_sorted() {
    let mut policy = policy();
    let events = policy.evaluate(10.0, &snapshot(10.0, 95.0, 99.0), &offline("boom"), t0());

    match &events[0] {
        AlertEvent::Alert { issues } => {
            assert_eq!(issues.len(), 3);
            let mut sorted = issues.clone();
            sorted.sort();
            assert_eq!(*issues, sorted);
            assert!(issues.iter().any(|i| i == "Service Down: boom"));
        }
        other => panic!("expected alert, got {:?}", other),
    }
}

#[test]
fn test_identical_fingerprint_suppressed_within_interval() {
    let mut policy = policy();
    let snap = snapshot(10.0, 95.0, 30.0);

    let first = policy.evaluate(10.0, &snap, &online(), t0());
    assert_eq!(first.len(), 1);

    let second = policy.evaluate(10.0, &snap, &online(), t0() + Duration::seconds(60));
    assert!(second.is_empty());

    // A third call after the interval fires again.
    let third = policy.evaluate(10.0, &snap, &online(), t0() + Duration::seconds(1860));
    assert_eq!(third.len(), 1);
}

#[test]
fn test_new_fingerprint_resets_suppression() {
    let mut policy = policy();

    let first = policy.evaluate(10.0, &snapshot(10.0, 95.0, 30.0), &online(), t0());
    assert_eq!(first.len(), 1);

    // Memory still high, disk now also critical: new issue set, fires at once.
    let second = policy.evaluate(
        10.0,
        &snapshot(10.0, 95.0, 99.0),
        &online(),
        t0() + Duration::seconds(10),
    );
    assert_eq!(second.len(), 1);
}

#[test]
fn test_recovery_on_offline_to_online_transition() {
    let mut policy = policy();

    policy.evaluate(10.0, &snapshot(10.0, 10.0, 10.0), &offline("down"), t0());
    let events = policy.evaluate(
        10.0,
        &snapshot(10.0, 10.0, 10.0),
        &online(),
        t0() + Duration::seconds(10),
    );
    assert_eq!(events, vec![AlertEvent::Recovery]);
}

#[test]
fn test_recovery_never_suppressed() {
    let mut policy = policy();

    for i in 0..3 {
        policy.evaluate(
            10.0,
            &snapshot(10.0, 10.0, 10.0),
            &offline("down"),
            t0() + Duration::seconds(i * 20),
        );
        let events = policy.evaluate(
            10.0,
            &snapshot(10.0, 10.0, 10.0),
            &online(),
            t0() + Duration::seconds(i * 20 + 10),
        );
        assert!(events.contains(&AlertEvent::Recovery));
    }
}

#[test]
fn test_recovery_disabled_by_config() {
    let mut policy = AlertPolicy::new(
        AlertThresholds {
            cpu: 90.0,
            memory: 90.0,
            disk: 90.0,
        },
        Duration::seconds(1800),
        false,
    );

    policy.evaluate(10.0, &snapshot(10.0, 10.0, 10.0), &offline("down"), t0());
    let events = policy.evaluate(
        10.0,
        &snapshot(10.0, 10.0, 10.0),
        &online(),
        t0() + Duration::seconds(10),
    );
    assert!(events.is_empty());
}

#[test]
fn test_no_recovery_while_staying_online() {
    let mut policy = policy();
    policy.evaluate(10.0, &snapshot(10.0, 10.0, 10.0), &online(), t0());
    let events = policy.evaluate(
        10.0,
        &snapshot(10.0, 10.0, 10.0),
        &online(),
        t0() + Duration::seconds(10),
    );
    assert!(events.is_empty());
}

#[test]
fn test_service_down_alert_and_recovery_coexist() {
    let mut policy = policy();
    policy.evaluate(10.0, &snapshot(10.0, 10.0, 10.0), &offline("down"), t0());

    // Back online but with high memory: recovery plus a fresh alert.
    let events = policy.evaluate(
        10.0,
        &snapshot(10.0, 95.0, 10.0),
        &online(),
        t0() + Duration::seconds(10),
    );
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], AlertEvent::Recovery);
}

#[test]
fn test_fingerprint_is_sorted_join() {
    let issues = vec!["b".to_string(), "c".to_string()];
    assert_eq!(fingerprint(&issues), "b|c");
    assert_eq!(fingerprint(&[]), "");
}

#[test]
fn test_from_config_uses_thresholds() {
    let mut config = MonitorConfig::default();
    config.cpu_threshold = 50.0;
    let mut policy = AlertPolicy::from_config(&config);

    let events = policy.evaluate(60.0, &snapshot(60.0, 10.0, 10.0), &online(), t0());
    assert_eq!(events.len(), 1);
}
