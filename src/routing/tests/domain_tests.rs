//! Unit tests for routing domain types.

use crate::routing::domain::{
    Category, HandlerTable, HandlerTarget, RegistrationOutcome, RoutingDomainError, SchemeLink,
    same_location, stripped_command_line_with,
};
use camino::{Utf8Path, Utf8PathBuf};
use mockable::DefaultClock;
use rstest::rstest;

fn category(value: &str) -> Category {
    Category::new(value).expect("valid category")
}

// ── Category validation ────────────────────────────────────────────

#[rstest]
#[case("skyrimse", "skyrimse")]
#[case("  SkyrimSE ", "skyrimse")]
#[case("fallout4", "fallout4")]
#[case("site-x_1.2", "site-x_1.2")]
fn categories_are_trimmed_and_lowercased(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(category(input).as_str(), expected);
}

#[rstest]
#[case("")]
#[case("   ")]
fn empty_category_is_rejected(#[case] input: &str) {
    assert_eq!(Category::new(input), Err(RoutingDomainError::EmptyCategory));
}

#[rstest]
#[case("sky rim")]
#[case("a/b")]
#[case("a?b")]
#[case("a#b")]
#[case("a,b")]
#[case("a*")]
fn reserved_characters_are_rejected(#[case] input: &str) {
    assert!(matches!(
        Category::new(input),
        Err(RoutingDomainError::InvalidCategory(_))
    ));
}

// ── Target lists ───────────────────────────────────────────────────

#[rstest]
fn target_list_splits_dedups_and_recognises_default() {
    let targets =
        HandlerTarget::parse_list("SkyrimSE, fallout4,,skyrimse,*").expect("valid target list");

    assert_eq!(
        targets,
        vec![
            HandlerTarget::Category(category("skyrimse")),
            HandlerTarget::Category(category("fallout4")),
            HandlerTarget::Default,
        ]
    );
}

#[rstest]
#[case("")]
#[case(" , ,")]
fn target_list_without_entries_is_rejected(#[case] input: &str) {
    assert_eq!(
        HandlerTarget::parse_list(input),
        Err(RoutingDomainError::EmptyCategoryList)
    );
}

#[rstest]
fn target_list_reports_first_invalid_entry() {
    assert!(matches!(
        HandlerTarget::parse_list("skyrimse,bad entry"),
        Err(RoutingDomainError::InvalidCategory(raw)) if raw == "bad entry"
    ));
}

// ── Link parsing ───────────────────────────────────────────────────

#[rstest]
#[case("nxm://gameA/1234-abcdef", Some("gamea"))]
#[case("nxm://skyrimse/mods/266/files/1?key=k&expires=1", Some("skyrimse"))]
#[case("NXM://Fallout4?x=1", Some("fallout4"))]
#[case("nxm://gameA#frag", Some("gamea"))]
#[case("nxm://", None)]
#[case("nxm:///mods/1", None)]
#[case("nxm://bad game/1", None)]
fn link_category_is_the_first_segment(#[case] raw: &str, #[case] expected: Option<&str>) {
    let link = SchemeLink::parse("nxm", raw).expect("link of the scheme");

    assert_eq!(link.category().map(Category::as_str), expected);
    assert_eq!(link.as_str(), raw);
}

#[rstest]
#[case("https://example.com/")]
#[case("nxm:/gameA/1")]
#[case("nx")]
#[case("")]
fn links_outside_the_scheme_are_malformed(#[case] raw: &str) {
    assert!(matches!(
        SchemeLink::parse("nxm", raw),
        Err(RoutingDomainError::MalformedLink { link, .. }) if link == raw
    ));
}

// ── Command line normalisation ─────────────────────────────────────

#[rstest]
fn quoted_command_line_yields_the_quoted_path() {
    let path = stripped_command_line_with(r#""C:\Program Files\App\app.exe" "%1""#, |_| false);

    assert_eq!(path.as_str(), r"C:\Program Files\App\app.exe");
}

#[rstest]
fn unterminated_quote_takes_the_rest_of_the_input() {
    let path = stripped_command_line_with(r#""/opt/app/app"#, |_| false);

    assert_eq!(path.as_str(), "/opt/app/app");
}

#[rstest]
fn unquoted_path_with_spaces_is_probed_against_the_filesystem() {
    let path = stripped_command_line_with("/opt/Mod Organizer/mo2 %u", |candidate| {
        candidate == "/opt/Mod Organizer/mo2"
    });

    assert_eq!(path.as_str(), "/opt/Mod Organizer/mo2");
}

#[rstest]
#[case("/usr/bin/handler %u", "/usr/bin/handler")]
#[case("  /usr/bin/handler  ", "/usr/bin/handler")]
#[case("", "")]
fn unknown_paths_fall_back_to_the_first_token(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(stripped_command_line_with(raw, |_| false).as_str(), expected);
}

#[rstest]
#[case("/opt/mo2", "/opt/mo2/", true)]
#[case("/opt/mo2", "/opt/mo2", true)]
#[case("/opt/mo2", "/opt/other", false)]
fn same_location_ignores_trailing_separators(
    #[case] left: &str,
    #[case] right: &str,
    #[case] expected: bool,
) {
    assert_eq!(
        same_location(Utf8Path::new(left), Utf8Path::new(right)),
        expected
    );
}

// ── Handler table ──────────────────────────────────────────────────

#[rstest]
fn occupied_slot_is_kept_without_overwrite() {
    let clock = DefaultClock;
    let target = HandlerTarget::Category(category("skyrimse"));
    let mut table = HandlerTable::new();

    let first = table.register(&target, Utf8Path::new("/bin/first"), false, &clock);
    let second = table.register(&target, Utf8Path::new("/bin/second"), false, &clock);

    assert_eq!(first, RegistrationOutcome::Registered);
    assert_eq!(second, RegistrationOutcome::AlreadySet);
    assert_eq!(
        table.lookup(&category("skyrimse")),
        Some(Utf8Path::new("/bin/first"))
    );
}

#[rstest]
fn overwrite_replaces_the_handler() {
    let clock = DefaultClock;
    let target = HandlerTarget::Default;
    let mut table = HandlerTable::new();

    table.register(&target, Utf8Path::new("/bin/first"), false, &clock);
    let outcome = table.register(&target, Utf8Path::new("/bin/second"), true, &clock);

    assert_eq!(outcome, RegistrationOutcome::Registered);
    assert_eq!(
        table.default_handler().map(|entry| entry.executable()),
        Some(Utf8Path::new("/bin/second"))
    );
}

#[rstest]
fn adding_a_proxy_twice_keeps_its_original_position() {
    let mut table = HandlerTable::new();

    assert!(table.add_proxy(Utf8Path::new("/opt/a")));
    assert!(table.add_proxy(Utf8Path::new("/opt/b")));
    assert!(!table.add_proxy(Utf8Path::new("/opt/a/")));

    assert_eq!(
        table.proxies().to_vec(),
        vec![Utf8PathBuf::from("/opt/a"), Utf8PathBuf::from("/opt/b")]
    );
}

#[rstest]
fn removing_proxies_and_handlers_reports_changes() {
    let clock = DefaultClock;
    let target = HandlerTarget::Category(category("skyrimse"));
    let mut table = HandlerTable::new();
    table.register(&target, Utf8Path::new("/bin/h"), true, &clock);
    table.add_proxy(Utf8Path::new("/opt/a"));

    assert!(table.unregister(&target));
    assert!(!table.unregister(&target));
    assert!(table.remove_proxy(Utf8Path::new("/opt/a")));
    assert!(!table.remove_proxy(Utf8Path::new("/opt/a")));
    assert!(table.is_empty());
}
