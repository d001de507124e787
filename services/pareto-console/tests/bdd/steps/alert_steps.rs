//! BDD step definitions for timed alerts

use std::sync::atomic::Ordering;

use cucumber::{then, when};
use pareto_model::Severity;

use crate::world::ConsoleWorld;

fn severity(name: &str) -> Severity {
    match name {
        "info" => Severity::Info,
        "success" => Severity::Success,
        "error" => Severity::Error,
        "warning" => Severity::Warning,
        other => panic!("Unknown severity: {}", other),
    }
}

#[when(expr = "{int} second(s) pass(es)")]
fn time_passes(world: &mut ConsoleWorld, seconds: u64) {
    world.clock.fetch_add(seconds * 1000, Ordering::SeqCst);
    world.dashboard().tick();
}

#[then(expr = "a(n) {word} alert should say {string}")]
fn alert_says(world: &mut ConsoleWorld, kind: String, message: String) {
    let expected = severity(&kind);
    let alerts = world.dashboard().alerts();
    let found = alerts
        .visible()
        .any(|a| a.severity == expected && a.message == message);
    assert!(found, "no {kind} alert {message:?} in {alerts:?}");
}

#[then("no alerts should be visible")]
fn no_alerts(world: &mut ConsoleWorld) {
    assert!(world.dashboard().alerts().is_empty());
}
