//! BDD step definitions for tenant list management

use cucumber::{given, then, when};

use crate::world::ConsoleWorld;

#[given(expr = "the API has a tenant {string}")]
async fn api_has_tenant(world: &mut ConsoleWorld, name: String) {
    let id = world.api().add_tenant(&name).await;
    world.tenant_ids.insert(name, id);
}

#[given("the server fails every delete")]
async fn deletes_fail(world: &mut ConsoleWorld) {
    world.api().state.lock().await.fail_deletes = true;
}

#[given("I open the tenants list")]
async fn open_tenants(world: &mut ConsoleWorld) {
    world.dashboard().load_tenants("").await.expect("load tenants");
}

#[when(expr = "I delete the tenant {string}")]
async fn delete_tenant(world: &mut ConsoleWorld, name: String) {
    let id = *world.tenant_ids.get(&name).expect("unknown tenant");
    let result = world.dashboard().delete_tenant(id).await;
    world.last_error = result.err().map(|e| e.user_message());
}

#[then(expr = "the tenant list should contain {string}")]
fn list_contains(world: &mut ConsoleWorld, name: String) {
    let names: Vec<String> = tenant_names(world);
    assert!(names.contains(&name), "{name} missing from {names:?}");
}

#[then(expr = "the tenant list should not contain {string}")]
fn list_lacks(world: &mut ConsoleWorld, name: String) {
    let names: Vec<String> = tenant_names(world);
    assert!(!names.contains(&name), "{name} still in {names:?}");
}

fn tenant_names(world: &mut ConsoleWorld) -> Vec<String> {
    world
        .dashboard()
        .tenants()
        .iter()
        .map(|t| t.company_name.clone())
        .collect()
}
