#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use logprom_core::{LogEvent, Severity, StaticLabels};
use logprom_exporter::{http, CounterVec, HandlerOpts, Hook, Registry};

fn labels(pairs: &[(&str, &str)]) -> StaticLabels {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn scrape(hook: &Hook) -> String {
    http::render(hook.registry(), &HandlerOpts::default()).expect("render")
}

#[test]
fn error_event_with_type_is_counted() {
    let hook = Hook::new("log_messages").unwrap();
    hook.observe(&LogEvent::new(Severity::Error, "query failed").with("type", "db timeout"));

    let body = scrape(&hook);
    assert!(body.contains("log_messages{level=\"error\",type=\"db_timeout\"} 1\n"), "{body}");
}

#[test]
fn static_labels_follow_fixed_labels() {
    let hook = Hook::builder("log_messages")
        .static_labels(labels(&[("service", "api")]))
        .build()
        .unwrap();
    hook.observe(&LogEvent::new(Severity::Warn, "slow").with("user", "bob"));

    let body = scrape(&hook);
    assert!(
        body.contains("log_messages{level=\"warn\",type=\"untyped\",service=\"api\"} 1\n"),
        "{body}"
    );
}

#[test]
fn metric_name_is_sanitized() {
    let hook = Hook::new("  log messages  ").unwrap();
    assert_eq!(hook.metric_name(), "log_messages");
    assert_eq!(hook.registry().names(), ["log_messages"]);
    assert!(scrape(&hook).contains("# HELP log_messages Total number of log messages."));
}

#[test]
fn every_severity_starts_at_zero() {
    let hook = Hook::new("log_messages").unwrap();
    assert_eq!(hook.levels(), Severity::ALL);
    let c = hook.collector();
    for sev in Severity::ALL {
        assert_eq!(c.get(&[sev.as_str(), "untyped"]), Some(0));
    }

    let lazy = Hook::builder("lazy").preinit(false).build().unwrap();
    assert!(lazy.collector().label_sets().is_empty());
}

#[test]
fn non_string_type_is_stringified() {
    let hook = Hook::builder("m").type_key("error_type").build().unwrap();
    hook.observe(&LogEvent::new(Severity::Error, "x").with("error_type", 503u64));
    hook.observe(&LogEvent::new(Severity::Error, "x").with("error_type", false));
    hook.observe(&LogEvent::new(Severity::Error, "x").with("type", "ignored"));

    let c = hook.collector();
    assert_eq!(c.get(&["error", "503"]), Some(1));
    assert_eq!(c.get(&["error", "false"]), Some(1));
    assert_eq!(c.get(&["error", "untyped"]), Some(1));
    assert!(scrape(&hook).contains("m{level=\"error\",error_type=\"503\"} 1"));
}

#[test]
fn static_label_insertion_order_is_irrelevant() {
    let mut a = BTreeMap::new();
    a.insert("zone".to_string(), "eu".to_string());
    a.insert("app".to_string(), "web".to_string());
    let mut b = BTreeMap::new();
    b.insert("app".to_string(), "web".to_string());
    b.insert("zone".to_string(), "eu".to_string());

    let ha = Hook::builder("m").static_labels(a).build().unwrap();
    let hb = Hook::builder("m").static_labels(b).build().unwrap();
    assert_eq!(ha.collector().schema(), hb.collector().schema());
    assert_eq!(ha.collector().schema().keys(), ["level", "type", "app", "zone"]);
}

#[test]
fn static_label_clashing_with_fixed_key_fails() {
    let err = Hook::builder("m")
        .static_labels(labels(&[("level", "x")]))
        .build()
        .err()
        .expect("duplicate key");
    assert_eq!(err.code().as_str(), "INVALID_LABELS");

    let err = Hook::new("   ").err().expect("empty name");
    assert_eq!(err.code().as_str(), "INVALID_NAME");
}

#[test]
fn construction_fails_on_taken_name() {
    let reg = Registry::new();
    let _first = Hook::builder("log_messages").registry(reg.clone()).build().unwrap();
    let err = Hook::builder("log messages")
        .registry(reg)
        .build()
        .err()
        .expect("collision");
    assert_eq!(err.code().as_str(), "ALREADY_REGISTERED");
}

#[test]
fn concurrent_observes_are_not_lost() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 2_000;

    let hook = Hook::builder("log_messages")
        .static_labels(labels(&[("service", "api")]))
        .build()
        .unwrap();
    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..PER_THREAD {
                    hook.record(Severity::Info, Some("tick"));
                }
            });
        }
    });

    assert_eq!(
        hook.collector().get(&["info", "tick", "api"]),
        Some((THREADS * PER_THREAD) as u64)
    );
}

#[test]
fn rename_drops_old_metric_and_resets_counts() {
    let hook = Hook::new("log_messages").unwrap();
    hook.observe(&LogEvent::new(Severity::Error, "x").with("type", "db timeout"));
    hook.observe(&LogEvent::new(Severity::Error, "x").with("type", "db timeout"));

    hook.set_name("app logs").unwrap();
    assert_eq!(hook.metric_name(), "app_logs");
    assert_eq!(hook.registry().names(), ["app_logs"]);

    let body = scrape(&hook);
    assert!(!body.lines().any(|l| l.starts_with("log_messages")), "{body}");
    assert!(body.contains("app_logs{level=\"error\",type=\"db_timeout\"} 0\n"), "{body}");
    assert!(body.contains("app_logs{level=\"info\",type=\"untyped\"} 0\n"), "{body}");

    hook.observe(&LogEvent::new(Severity::Error, "x").with("type", "db timeout"));
    assert_eq!(hook.collector().get(&["error", "db_timeout"]), Some(1));
}

#[test]
fn rename_to_same_name_rebuilds_in_place() {
    let hook = Hook::new("log_messages").unwrap();
    hook.record(Severity::Warn, None);
    hook.set_name("log_messages").unwrap();
    assert_eq!(hook.registry().names(), ["log_messages"]);
    assert_eq!(hook.collector().get(&["warn", "untyped"]), Some(0));
}

#[test]
fn failed_rename_keeps_previous_counter() {
    let hook = Hook::new("log_messages").unwrap();
    let other = Arc::new(
        CounterVec::new(
            "taken",
            "someone else",
            hook.collector().schema().clone(),
        )
        .unwrap(),
    );
    hook.registry().register(other).unwrap();
    hook.record(Severity::Error, Some("a"));

    let err = hook.set_name("taken").unwrap_err();
    assert_eq!(err.code().as_str(), "ALREADY_REGISTERED");
    assert_eq!(hook.metric_name(), "log_messages");
    assert_eq!(hook.registry().names(), ["log_messages", "taken"]);

    hook.record(Severity::Error, Some("a"));
    assert_eq!(hook.collector().get(&["error", "a"]), Some(2));
    assert!(scrape(&hook).contains("log_messages{level=\"error\",type=\"a\"} 2"));
}

#[test]
fn relabel_changes_schema() {
    let hook = Hook::new("log_messages").unwrap();
    hook.record(Severity::Error, Some("disk"));

    hook.set_labels(labels(&[("service", "api"), ("env", "prod")])).unwrap();
    assert_eq!(hook.static_labels(), labels(&[("env", "prod"), ("service", "api")]));

    let c = hook.collector();
    assert_eq!(c.schema().keys(), ["level", "type", "env", "service"]);
    assert_eq!(c.get(&["error", "disk", "prod", "api"]), Some(0));

    hook.record(Severity::Error, Some("disk"));
    assert!(scrape(&hook)
        .contains("log_messages{level=\"error\",type=\"disk\",env=\"prod\",service=\"api\"} 1"));

    assert!(hook.set_labels(labels(&[("type", "x")])).is_err());
    assert_eq!(hook.collector().schema().keys(), ["level", "type", "env", "service"]);
}

#[test]
fn observes_survive_concurrent_rebuilds() {
    let hook = Hook::new("a").unwrap();
    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for i in 0..5_000 {
                    hook.record(Severity::Debug, Some(if i % 2 == 0 { "even" } else { "odd" }));
                }
            });
        }
        s.spawn(|| {
            for i in 0..50 {
                let name = if i % 2 == 0 { "b" } else { "a" };
                hook.set_name(name).unwrap();
            }
        });
    });

    assert_eq!(hook.registry().names(), ["a"]);
    let c = hook.collector();
    let before = c.get(&["debug", "even"]).unwrap_or(0);
    hook.record(Severity::Debug, Some("even"));
    assert_eq!(c.get(&["debug", "even"]), Some(before + 1));
}
