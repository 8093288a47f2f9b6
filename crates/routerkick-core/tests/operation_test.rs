#![allow(clippy::unwrap_used)]
// Integration tests for the reboot and network-join operations against
// scripted browser and joiner fakes.

mod support;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use routerkick_core::{
    AutomationEvent, DeviceReboot, FailureKind, NetworkJoin, OperationKind, OperationResult,
    PageFlow,
};

use support::{
    BrowserLog, FakeJoiner, FakeLauncher, channel, drain, failed, log_messages, progress_values,
    router_config,
};

// ── Helpers ─────────────────────────────────────────────────────────

/// Every browser action of a successful reboot, in order.
fn full_flow() -> Vec<String> {
    vec![
        "navigate http://192.168.1.1/".to_string(),
        "click #role_user a.user".into(),
        "fill input[name='skypsd'] hunter2".into(),
        "click input[type='submit']".into(),
        "navigate http://192.168.1.1/manage.htm".into(),
        "click #Submit1".into(),
        "click #msgconfirmb".into(),
    ]
}

/// Run one reboot and check it stopped after `done` actions, quit the
/// browser once, and logged exactly one failure line.
async fn assert_reboot_aborts(launcher: FakeLauncher, expected: OperationResult, done: usize) {
    let log: Arc<BrowserLog> = Arc::clone(&launcher.log);
    let reboot = DeviceReboot::new(Arc::new(launcher));
    let (sink, mut rx) = channel();

    let result = reboot
        .execute(&router_config(&[]), &sink.for_operation(OperationKind::Reboot))
        .await;

    let reason = expected.failure_reason().unwrap().to_string();
    assert_eq!(result, expected);
    assert_eq!(log.launches(), 1, "{reason}");
    assert_eq!(log.quits(), 1, "{reason}");
    assert_eq!(log.actions(), full_flow()[..done].to_vec(), "{reason}");

    let events = drain(&mut rx);
    let failures: Vec<_> = log_messages(&events)
        .into_iter()
        .filter(|m| m.contains("failed"))
        .collect();
    assert_eq!(failures, vec![format!("router reboot failed: {reason}")]);
    assert_eq!(progress_values(&events).last(), Some(&0), "{reason}");
}

// ── Reboot ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_reboot_walks_full_page_flow() {
    let launcher = FakeLauncher::new();
    let log = Arc::clone(&launcher.log);
    let reboot = DeviceReboot::new(Arc::new(launcher));
    let (sink, mut rx) = channel();
    let sink = sink.for_operation(OperationKind::Reboot);

    let result = reboot.execute(&router_config(&[]), &sink).await;

    assert_eq!(result, OperationResult::Success(Some("192.168.1.1".into())));
    assert_eq!(log.launches(), 1);
    assert_eq!(log.quits(), 1);
    assert_eq!(log.actions(), full_flow());

    let events = drain(&mut rx);
    assert_eq!(
        progress_values(&events),
        vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]
    );
    assert!(log_messages(&events).iter().any(|m| m == "browser closed"));
}

#[tokio::test(start_paused = true)]
async fn test_reboot_timeout_aborts_remaining_steps() {
    let launcher = FakeLauncher::missing("#Submit1");
    let log = Arc::clone(&launcher.log);
    let reboot = DeviceReboot::new(Arc::new(launcher));
    let (sink, mut rx) = channel();
    let sink = sink.for_operation(OperationKind::Reboot);

    let result = reboot.execute(&router_config(&[]), &sink).await;

    assert_eq!(result, failed(FailureKind::Timeout, "click reboot timed out"));
    assert_eq!(log.quits(), 1, "session must be quit exactly once");
    assert!(!log.actions().iter().any(|a| a.contains("#msgconfirmb")));

    let events = drain(&mut rx);
    let failures: Vec<_> = log_messages(&events)
        .into_iter()
        .filter(|m| m.contains("failed"))
        .collect();
    assert_eq!(failures, vec!["router reboot failed: click reboot timed out".to_string()]);
    assert_eq!(progress_values(&events).last(), Some(&0));
}

#[tokio::test(start_paused = true)]
async fn test_reboot_each_missing_element_stops_at_its_step() {
    let flow = PageFlow::default();
    let cases = [
        (&flow.role_switch, "switch user role timed out", 1),
        (&flow.password_field, "enter password timed out", 2),
        (&flow.submit, "submit login timed out", 3),
        (&flow.reboot_button, "click reboot timed out", 5),
        (&flow.confirm_button, "confirm reboot timed out", 6),
    ];

    for (selector, reason, done) in cases {
        assert_reboot_aborts(
            FakeLauncher::missing(selector.as_str()),
            failed(FailureKind::Timeout, reason),
            done,
        )
        .await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_reboot_each_broken_action_stops_at_its_step() {
    let cases = [
        (
            "navigate http://192.168.1.1/",
            "open login page failed: Browser session already closed",
            1,
        ),
        (
            "click #role_user",
            "switch user role failed: Element not found: #role_user a.user",
            2,
        ),
        (
            "fill input[name='skypsd']",
            "enter password failed: Element not found: input[name='skypsd']",
            3,
        ),
        (
            "click input[type='submit']",
            "submit login failed: Element not found: input[type='submit']",
            4,
        ),
        (
            "navigate http://192.168.1.1/manage.htm",
            "open management page failed: Browser session already closed",
            5,
        ),
        (
            "click #Submit1",
            "click reboot failed: Element not found: #Submit1",
            6,
        ),
        (
            "click #msgconfirmb",
            "confirm reboot failed: Element not found: #msgconfirmb",
            7,
        ),
    ];

    for (action, reason, done) in cases {
        assert_reboot_aborts(
            FakeLauncher::faulting(action),
            failed(FailureKind::Failed, reason),
            done,
        )
        .await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_reboot_times_out_when_login_never_lands() {
    let launcher = FakeLauncher {
        stuck_after_login: true,
        ..FakeLauncher::default()
    };
    let log = Arc::clone(&launcher.log);
    let reboot = DeviceReboot::new(Arc::new(launcher));
    let (sink, _rx) = channel();

    let result = reboot
        .execute(&router_config(&[]), &sink.for_operation(OperationKind::Reboot))
        .await;

    assert_eq!(
        result,
        failed(FailureKind::Timeout, "await landing page timed out")
    );
    assert_eq!(log.quits(), 1);
    assert!(!log.actions().iter().any(|a| a.contains("manage.htm")));
}

#[tokio::test]
async fn test_reboot_launch_failure_never_quits() {
    let launcher = FakeLauncher {
        launch_fails: true,
        ..FakeLauncher::default()
    };
    let log = Arc::clone(&launcher.log);
    let reboot = DeviceReboot::new(Arc::new(launcher));
    let (sink, _rx) = channel();

    let result = reboot
        .execute(&router_config(&[]), &sink.for_operation(OperationKind::Reboot))
        .await;

    assert_eq!(result.failure_kind(), Some(FailureKind::EnvironmentMissing));
    let reason = result.failure_reason().unwrap();
    assert!(reason.contains("Browser executable not found"), "{reason}");
    assert_eq!(log.quits(), 0);
}

// ── Network join ────────────────────────────────────────────────────

#[tokio::test]
async fn test_join_empty_list_never_calls_joiner() {
    let joiner = Arc::new(FakeJoiner::default());
    let join = NetworkJoin::new(Arc::clone(&joiner) as _);
    let (sink, mut rx) = channel();

    let result = join
        .execute(&router_config(&[]), &sink.for_operation(OperationKind::WifiJoin))
        .await;

    assert_eq!(result, failed(FailureKind::Failed, "no configured networks"));
    assert!(joiner.attempts().is_empty());
    let events = drain(&mut rx);
    assert_eq!(
        log_messages(&events),
        vec!["wifi join failed: no configured networks".to_string()]
    );
}

#[tokio::test]
async fn test_join_falls_through_to_next_network() {
    let joiner = Arc::new(FakeJoiner::reaching(&["Home-2G"]));
    let join = NetworkJoin::new(Arc::clone(&joiner) as _);
    let (sink, mut rx) = channel();

    let result = join
        .execute(
            &router_config(&["Home-5G", "Home-2G", "Guest"]),
            &sink.for_operation(OperationKind::WifiJoin),
        )
        .await;

    assert_eq!(result, OperationResult::Success(Some("Home-2G".into())));
    assert_eq!(joiner.attempts(), vec!["Home-5G", "Home-2G"]);

    let events = drain(&mut rx);
    assert_eq!(progress_values(&events), vec![10, 10, 36, 100]);
    assert!(
        log_messages(&events)
            .iter()
            .any(|m| m.starts_with("failed to join Home-5G"))
    );
}

#[tokio::test]
async fn test_join_exhausts_every_candidate() {
    let joiner = Arc::new(FakeJoiner::reaching(&[]));
    let join = NetworkJoin::new(Arc::clone(&joiner) as _);
    let (sink, mut rx) = channel();

    let result = join
        .execute(
            &router_config(&["Home-5G", "Home-2G"]),
            &sink.for_operation(OperationKind::WifiJoin),
        )
        .await;

    assert_eq!(
        result,
        failed(FailureKind::Failed, "all configured networks failed")
    );
    assert_eq!(joiner.attempts(), vec!["Home-5G", "Home-2G"]);
    let events = drain(&mut rx);
    assert!(
        events
            .iter()
            .all(|e| !matches!(e.as_ref(), AutomationEvent::Finished { .. }))
    );
}
