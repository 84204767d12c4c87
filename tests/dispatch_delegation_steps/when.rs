//! When steps for dispatch delegation BDD scenarios.

use super::world::DispatchWorld;
use rstest_bdd_macros::when;

#[when(r#""{link}" is dispatched from "{install_dir}""#)]
fn link_is_dispatched(world: &mut DispatchWorld, link: String, install_dir: String) {
    let registry = world.registry(&install_dir);
    world.last_dispatch = Some(world.dispatcher.dispatch(&link, &registry));
}
