//! Then steps for dispatch delegation BDD scenarios.

use super::world::DispatchWorld;
use camino::Utf8PathBuf;
use linkhandler::routing::services::{DispatchError, HandlerSource};
use rstest_bdd_macros::then;

#[then(r#""{handler}" is launched with "{link}""#)]
fn handler_is_launched(
    world: &mut DispatchWorld,
    handler: String,
    link: String,
) -> Result<(), eyre::Report> {
    world.dispatched()?;
    let launches = world
        .launcher
        .launches()
        .map_err(|err| eyre::eyre!("reading launches failed: {err}"))?;
    let [request] = launches.as_slice() else {
        return Err(eyre::eyre!("expected one launch, found {}", launches.len()));
    };
    if request.executable().as_str() != handler || request.argument() != link {
        return Err(eyre::eyre!(
            "expected {handler} with {link}, launched {} with {}",
            request.executable(),
            request.argument()
        ));
    }
    Ok(())
}

#[then("the handler was found locally")]
fn handler_found_locally(world: &mut DispatchWorld) -> Result<(), eyre::Report> {
    let source = world.dispatched()?.source();
    if *source != HandlerSource::Local {
        return Err(eyre::eyre!("expected a local handler, got {source:?}"));
    }
    Ok(())
}

#[then(r#"the handler was found through proxy "{proxy_dir}""#)]
fn handler_found_through_proxy(
    world: &mut DispatchWorld,
    proxy_dir: String,
) -> Result<(), eyre::Report> {
    let source = world.dispatched()?.source();
    if *source != HandlerSource::Proxy(Utf8PathBuf::from(&proxy_dir)) {
        return Err(eyre::eyre!("expected proxy {proxy_dir}, got {source:?}"));
    }
    Ok(())
}

#[then("the handler was the default")]
fn handler_was_default(world: &mut DispatchWorld) -> Result<(), eyre::Report> {
    let source = world.dispatched()?.source();
    if *source != HandlerSource::Default {
        return Err(eyre::eyre!("expected the default handler, got {source:?}"));
    }
    Ok(())
}

#[then(r#"dispatch fails with no handler for "{category}""#)]
fn dispatch_fails_without_handler(
    world: &mut DispatchWorld,
    category: String,
) -> Result<(), eyre::Report> {
    let result = world.last_dispatch()?;
    let matched = matches!(
        result,
        Err(DispatchError::NoHandlerFound { category: Some(found) }) if found.as_str() == category
    );
    if !matched {
        return Err(eyre::eyre!("expected no handler for {category}, got {result:?}"));
    }
    Ok(())
}

#[then("nothing is launched")]
fn nothing_is_launched(world: &mut DispatchWorld) -> Result<(), eyre::Report> {
    let launches = world
        .launcher
        .launches()
        .map_err(|err| eyre::eyre!("reading launches failed: {err}"))?;
    if !launches.is_empty() {
        return Err(eyre::eyre!("expected no launches, found {launches:?}"));
    }
    Ok(())
}
