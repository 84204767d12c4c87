//! Given steps for dispatch delegation BDD scenarios.

use super::world::DispatchWorld;
use camino::Utf8Path;
use eyre::WrapErr;
use linkhandler::routing::domain::{Category, HandlerTarget};
use rstest_bdd_macros::given;

#[given(r#"installation "{install_dir}" maps "{category}" to "{handler}""#)]
fn installation_maps_category(
    world: &mut DispatchWorld,
    install_dir: String,
    category: String,
    handler: String,
) -> Result<(), eyre::Report> {
    let category = Category::new(category).wrap_err("parse scenario category")?;
    world
        .registry(&install_dir)
        .register_category(&category, Utf8Path::new(&handler), true)
        .wrap_err("register category for scenario")?;
    Ok(())
}

#[given(r#"installation "{install_dir}" uses "{handler}" as its default handler"#)]
fn installation_uses_default(
    world: &mut DispatchWorld,
    install_dir: String,
    handler: String,
) -> Result<(), eyre::Report> {
    world
        .registry(&install_dir)
        .register(&HandlerTarget::Default, Utf8Path::new(&handler), true)
        .wrap_err("register default handler for scenario")?;
    Ok(())
}

#[given(r#"installation "{install_dir}" proxies to "{proxy_dir}""#)]
fn installation_proxies_to(
    world: &mut DispatchWorld,
    install_dir: String,
    proxy_dir: String,
) -> Result<(), eyre::Report> {
    world
        .registry(&install_dir)
        .register_proxy(Utf8Path::new(&proxy_dir))
        .wrap_err("register proxy for scenario")?;
    Ok(())
}
