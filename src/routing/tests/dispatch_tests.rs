//! Unit tests for link dispatch and proxy resolution.

use std::sync::Arc;

use crate::routing::{
    adapters::memory::{InMemoryRegistryStore, RecordingLauncher},
    domain::{Category, HandlerTarget, RoutingDomainError},
    services::{DispatchError, Dispatcher, HandlerRegistry, HandlerSource},
};
use camino::{Utf8Path, Utf8PathBuf};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type TestRegistry = HandlerRegistry<InMemoryRegistryStore, DefaultClock>;

struct DispatchHarness {
    store: Arc<InMemoryRegistryStore>,
    launcher: Arc<RecordingLauncher>,
    dispatcher: Dispatcher<InMemoryRegistryStore, RecordingLauncher>,
}

impl DispatchHarness {
    fn registry(&self, install_dir: &str) -> TestRegistry {
        HandlerRegistry::open(install_dir, Arc::clone(&self.store), Arc::new(DefaultClock))
    }

    fn map(&self, install_dir: &str, category: &str, handler: &str) {
        self.registry(install_dir)
            .register_category(&category_of(category), Utf8Path::new(handler), true)
            .expect("registration should persist");
    }

    fn proxy(&self, install_dir: &str, proxy_dir: &str) {
        self.registry(install_dir)
            .register_proxy(Utf8Path::new(proxy_dir))
            .expect("proxy registration should persist");
    }

    fn launched(&self) -> Vec<(Utf8PathBuf, String)> {
        self.launcher
            .launches()
            .expect("recorded launches")
            .into_iter()
            .map(|request| {
                (
                    request.executable().to_owned(),
                    request.argument().to_owned(),
                )
            })
            .collect()
    }
}

#[fixture]
fn harness() -> DispatchHarness {
    let store = Arc::new(InMemoryRegistryStore::new());
    let launcher = Arc::new(RecordingLauncher::new());
    let dispatcher = Dispatcher::new("nxm", Arc::clone(&store), Arc::clone(&launcher));
    DispatchHarness {
        store,
        launcher,
        dispatcher,
    }
}

fn category_of(value: &str) -> Category {
    Category::new(value).expect("valid category")
}

#[rstest]
fn empty_registry_reports_no_handler_then_dispatches_after_registration(
    harness: DispatchHarness,
) {
    let before = harness
        .dispatcher
        .dispatch("nxm://gameA/x", &harness.registry("/opt/a"));
    assert!(matches!(
        before,
        Err(DispatchError::NoHandlerFound { category: Some(ref c) }) if c.as_str() == "gamea"
    ));

    harness.map("/opt/a", "gameA", "/bin/h.exe");
    let outcome = harness
        .dispatcher
        .dispatch("nxm://gameA/x", &harness.registry("/opt/a"))
        .expect("dispatch should succeed");

    assert_eq!(outcome.handler(), Utf8Path::new("/bin/h.exe"));
    assert_eq!(outcome.source(), &HandlerSource::Local);
    assert_eq!(
        harness.launched(),
        vec![(Utf8PathBuf::from("/bin/h.exe"), "nxm://gameA/x".to_owned())]
    );
}

#[rstest]
fn launch_runs_in_the_handler_directory(harness: DispatchHarness) {
    harness.map("/opt/a", "skyrimse", "/opt/a/bin/mo2");

    harness
        .dispatcher
        .dispatch("nxm://skyrimse/mods/1", &harness.registry("/opt/a"))
        .expect("dispatch should succeed");

    let launches = harness.launcher.launches().expect("recorded launches");
    assert_eq!(launches.len(), 1);
    assert_eq!(
        launches.first().map(|request| request.working_dir()),
        Some(Utf8Path::new("/opt/a/bin"))
    );
}

#[rstest]
fn local_mapping_wins_over_proxies(harness: DispatchHarness) {
    harness.map("/opt/a", "skyrimse", "/bin/local");
    harness.map("/opt/b", "skyrimse", "/bin/proxy");
    harness.proxy("/opt/a", "/opt/b");

    let outcome = harness
        .dispatcher
        .dispatch("nxm://skyrimse/1", &harness.registry("/opt/a"))
        .expect("dispatch should succeed");

    assert_eq!(outcome.handler(), Utf8Path::new("/bin/local"));
    assert_eq!(outcome.source(), &HandlerSource::Local);
}

#[rstest]
fn first_matching_proxy_in_registration_order_wins(harness: DispatchHarness) {
    harness.map("/opt/c", "skyrimse", "/bin/from-c");
    harness.map("/opt/d", "skyrimse", "/bin/from-d");
    harness.proxy("/opt/a", "/opt/b");
    harness.proxy("/opt/a", "/opt/c");
    harness.proxy("/opt/a", "/opt/d");

    let outcome = harness
        .dispatcher
        .dispatch("nxm://skyrimse/1", &harness.registry("/opt/a"))
        .expect("dispatch should succeed");

    assert_eq!(outcome.handler(), Utf8Path::new("/bin/from-c"));
    assert_eq!(
        outcome.source(),
        &HandlerSource::Proxy(Utf8PathBuf::from("/opt/c"))
    );
}

#[rstest]
fn proxies_of_proxies_are_never_consulted(harness: DispatchHarness) {
    harness.proxy("/opt/a", "/opt/b");
    harness.proxy("/opt/b", "/opt/c");
    harness.map("/opt/c", "skyrimse", "/bin/from-c");

    let result = harness
        .dispatcher
        .dispatch("nxm://skyrimse/1", &harness.registry("/opt/a"));

    assert!(matches!(result, Err(DispatchError::NoHandlerFound { .. })));
    assert!(harness.launched().is_empty());
}

#[rstest]
fn self_referencing_proxy_is_skipped(harness: DispatchHarness) {
    harness.proxy("/opt/a", "/opt/a/");

    let result = harness
        .dispatcher
        .dispatch("nxm://skyrimse/1", &harness.registry("/opt/a"));

    assert!(matches!(result, Err(DispatchError::NoHandlerFound { .. })));
}

#[rstest]
fn corrupt_proxy_registry_is_treated_as_empty(harness: DispatchHarness) {
    harness.proxy("/opt/a", "/opt/b");
    harness.proxy("/opt/a", "/opt/c");
    harness.map("/opt/c", "skyrimse", "/bin/from-c");
    harness
        .store
        .mark_corrupt(Utf8Path::new("/opt/b"))
        .expect("mark corrupt");

    let outcome = harness
        .dispatcher
        .dispatch("nxm://skyrimse/1", &harness.registry("/opt/a"))
        .expect("dispatch should fall through to the next proxy");

    assert_eq!(outcome.handler(), Utf8Path::new("/bin/from-c"));
}

#[rstest]
fn default_handler_takes_unmapped_and_uncategorised_links(harness: DispatchHarness) {
    harness
        .registry("/opt/a")
        .register(&HandlerTarget::Default, Utf8Path::new("/bin/any"), true)
        .expect("default registration");

    let unmapped = harness
        .dispatcher
        .dispatch("nxm://fallout4/1", &harness.registry("/opt/a"))
        .expect("default handler should take unmapped categories");
    let uncategorised = harness
        .dispatcher
        .dispatch("nxm://", &harness.registry("/opt/a"))
        .expect("default handler should take links without a category");

    assert_eq!(unmapped.source(), &HandlerSource::Default);
    assert_eq!(uncategorised.handler(), Utf8Path::new("/bin/any"));
    assert_eq!(uncategorised.link().category(), None);
}

#[rstest]
fn proxy_mapping_wins_over_local_default(harness: DispatchHarness) {
    harness
        .registry("/opt/a")
        .register(&HandlerTarget::Default, Utf8Path::new("/bin/any"), true)
        .expect("default registration");
    harness.map("/opt/b", "skyrimse", "/bin/from-b");
    harness.proxy("/opt/a", "/opt/b");

    let outcome = harness
        .dispatcher
        .dispatch("nxm://skyrimse/1", &harness.registry("/opt/a"))
        .expect("dispatch should succeed");

    assert_eq!(outcome.handler(), Utf8Path::new("/bin/from-b"));
}

#[rstest]
fn malformed_links_are_rejected_before_lookup(harness: DispatchHarness) {
    let result = harness
        .dispatcher
        .dispatch("https://example.com", &harness.registry("/opt/a"));

    assert!(matches!(
        result,
        Err(DispatchError::MalformedLink(RoutingDomainError::MalformedLink { .. }))
    ));
    assert!(harness.launched().is_empty());
}

#[rstest]
fn uncategorised_link_without_default_reports_no_category(harness: DispatchHarness) {
    let result = harness
        .dispatcher
        .dispatch("nxm://", &harness.registry("/opt/a"));

    assert!(matches!(
        result,
        Err(DispatchError::NoHandlerFound { category: None })
    ));
}
