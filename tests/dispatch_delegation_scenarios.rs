//! Behaviour tests for dispatching links through local and proxy registries.

mod dispatch_delegation_steps;

use dispatch_delegation_steps::world::{DispatchWorld, world};
use rstest_bdd_macros::scenario;

#[scenario(
    path = "tests/features/dispatch_delegation.feature",
    name = "A local mapping wins over a proxy"
)]
fn local_mapping_wins(world: DispatchWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/dispatch_delegation.feature",
    name = "A proxy supplies a missing category"
)]
fn proxy_supplies_category(world: DispatchWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/dispatch_delegation.feature",
    name = "Proxies of proxies are not consulted"
)]
fn proxies_are_one_hop(world: DispatchWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/dispatch_delegation.feature",
    name = "The local default handler catches unmapped categories"
)]
fn default_handler_catches_unmapped(world: DispatchWorld) {
    let _ = world;
}
