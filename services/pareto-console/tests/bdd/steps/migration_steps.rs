//! BDD step definitions for the tenants timestamp migration

use cucumber::{given, then, when};
use pareto_console::migration;

use crate::world::ConsoleWorld;

#[given(expr = "a tenants table with columns {string}")]
fn table_with_columns(world: &mut ConsoleWorld, columns: String) {
    world.columns = columns
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
}

#[when("the migration is applied")]
fn apply_migration(world: &mut ConsoleWorld) {
    let existing: Vec<&str> = world.columns.iter().map(String::as_str).collect();
    let added: Vec<&'static str> = migration::pending(&existing)
        .into_iter()
        .map(|addition| addition.column)
        .collect();
    world.columns.extend(added.iter().map(|c| c.to_string()));
    world.added = added;
}

#[then(expr = "the columns {string} should have been added")]
fn columns_added(world: &mut ConsoleWorld, columns: String) {
    let expected: Vec<&str> = columns.split(',').map(str::trim).collect();
    assert_eq!(world.added, expected);
}

#[then("no columns should have been added")]
fn nothing_added(world: &mut ConsoleWorld) {
    assert!(world.added.is_empty(), "unexpected {:?}", world.added);
}

#[then(expr = "the migration script should contain {string}")]
fn script_contains(_world: &mut ConsoleWorld, text: String) {
    let script = migration::render();
    assert!(script.contains(&text), "missing {text:?} in\n{script}");
}
