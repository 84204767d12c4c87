//! Per-installation handler table aggregate.

use super::{Category, HandlerTarget, same_location};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Deserializer, Serialize, de::IgnoredAny};
use std::collections::BTreeMap;
use tracing::warn;

/// A handler executable registered for one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerEntry {
    executable: Utf8PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    registered_at: Option<DateTime<Utc>>,
}

impl HandlerEntry {
    /// Creates an entry stamped with the current time.
    #[must_use]
    pub fn new(executable: impl Into<Utf8PathBuf>, clock: &impl Clock) -> Self {
        Self {
            executable: executable.into(),
            registered_at: Some(clock.utc()),
        }
    }

    /// Returns the handler executable path.
    #[must_use]
    pub fn executable(&self) -> &Utf8Path {
        &self.executable
    }

    /// Returns when the entry was registered, if the stored entry says.
    #[must_use]
    pub const fn registered_at(&self) -> Option<DateTime<Utc>> {
        self.registered_at
    }
}

/// Result of registering a handler into an occupied or free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The slot now points at the requested executable.
    Registered,
    /// The slot already had a handler and overwriting was not requested.
    AlreadySet,
}

/// Category mappings, proxy installations, and prompt preferences of one
/// installation.
///
/// This is the persisted shape of an installation's registry. Unknown fields
/// are ignored and missing fields take their defaults, so older and newer
/// files load without error. A malformed field or entry is dropped on its
/// own; the rest of the table still loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerTable {
    #[serde(deserialize_with = "lenient_handlers")]
    handlers: BTreeMap<Category, HandlerEntry>,
    #[serde(deserialize_with = "lenient_default_handler")]
    default_handler: Option<HandlerEntry>,
    #[serde(deserialize_with = "lenient_proxies")]
    proxies: Vec<Utf8PathBuf>,
    #[serde(deserialize_with = "lenient_flag")]
    no_register: bool,
}

impl HandlerTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handler mapped to `category`, without consulting the
    /// default handler or proxies.
    #[must_use]
    pub fn lookup(&self, category: &Category) -> Option<&Utf8Path> {
        self.handlers.get(category).map(HandlerEntry::executable)
    }

    /// Returns the entry occupying `target`, if any.
    #[must_use]
    pub fn entry(&self, target: &HandlerTarget) -> Option<&HandlerEntry> {
        match target {
            HandlerTarget::Category(category) => self.handlers.get(category),
            HandlerTarget::Default => self.default_handler.as_ref(),
        }
    }

    /// Returns all category mappings ordered by category.
    pub fn handlers(&self) -> impl Iterator<Item = (&Category, &HandlerEntry)> {
        self.handlers.iter()
    }

    /// Returns the catch-all handler entry.
    #[must_use]
    pub const fn default_handler(&self) -> Option<&HandlerEntry> {
        self.default_handler.as_ref()
    }

    /// Returns proxy installation directories in fallback order.
    #[must_use]
    pub fn proxies(&self) -> &[Utf8PathBuf] {
        &self.proxies
    }

    /// Returns whether first-run registration prompts are suppressed.
    #[must_use]
    pub const fn no_register(&self) -> bool {
        self.no_register
    }

    /// Returns whether the table holds no mappings and no proxies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty() && self.default_handler.is_none() && self.proxies.is_empty()
    }

    /// Points `target` at `executable`.
    ///
    /// An occupied slot is only replaced when `overwrite` is set; otherwise
    /// the table is left untouched and [`RegistrationOutcome::AlreadySet`] is
    /// returned.
    pub fn register(
        &mut self,
        target: &HandlerTarget,
        executable: &Utf8Path,
        overwrite: bool,
        clock: &impl Clock,
    ) -> RegistrationOutcome {
        if !overwrite && self.entry(target).is_some() {
            return RegistrationOutcome::AlreadySet;
        }

        let entry = HandlerEntry::new(executable.to_owned(), clock);
        match target {
            HandlerTarget::Category(category) => {
                self.handlers.insert(category.clone(), entry);
            }
            HandlerTarget::Default => self.default_handler = Some(entry),
        }
        RegistrationOutcome::Registered
    }

    /// Clears `target`. Returns whether a handler was removed.
    pub fn unregister(&mut self, target: &HandlerTarget) -> bool {
        match target {
            HandlerTarget::Category(category) => self.handlers.remove(category).is_some(),
            HandlerTarget::Default => self.default_handler.take().is_some(),
        }
    }

    /// Appends `install_dir` to the proxy list unless already present.
    /// Returns whether the list changed.
    pub fn add_proxy(&mut self, install_dir: &Utf8Path) -> bool {
        if self.has_proxy(install_dir) {
            return false;
        }
        self.proxies.push(install_dir.to_owned());
        true
    }

    /// Removes `install_dir` from the proxy list. Returns whether the list
    /// changed.
    pub fn remove_proxy(&mut self, install_dir: &Utf8Path) -> bool {
        let before = self.proxies.len();
        self.proxies.retain(|proxy| !same_location(proxy, install_dir));
        self.proxies.len() != before
    }

    /// Returns whether `install_dir` is a registered proxy.
    #[must_use]
    pub fn has_proxy(&self, install_dir: &Utf8Path) -> bool {
        self.proxies
            .iter()
            .any(|proxy| same_location(proxy, install_dir))
    }

    /// Sets the prompt suppression flag. Returns whether it changed.
    pub const fn set_no_register(&mut self, value: bool) -> bool {
        let changed = self.no_register != value;
        self.no_register = value;
        changed
    }
}

/// A persisted value that is kept when well-formed and skipped otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

impl<T> Lenient<T> {
    fn into_valid(self, field: &str) -> Option<T> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid(IgnoredAny) => {
                warn!(field, "ignoring malformed registry value");
                None
            }
        }
    }
}

fn lenient_handlers<'de, D>(deserializer: D) -> Result<BTreeMap<Category, HandlerEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Lenient::<BTreeMap<String, Lenient<HandlerEntry>>>::deserialize(deserializer)?;
    let handlers = raw
        .into_valid("handlers")
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, entry)| {
            let category = match Category::new(key.as_str()) {
                Ok(category) => category,
                Err(err) => {
                    warn!(category = %key, error = %err, "ignoring invalid registry category");
                    return None;
                }
            };
            entry
                .into_valid("handlers")
                .map(|valid| (category, valid))
        })
        .collect();
    Ok(handlers)
}

fn lenient_default_handler<'de, D>(deserializer: D) -> Result<Option<HandlerEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Lenient<HandlerEntry>>::deserialize(deserializer)?;
    Ok(raw.and_then(|entry| entry.into_valid("default_handler")))
}

fn lenient_proxies<'de, D>(deserializer: D) -> Result<Vec<Utf8PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Lenient::<Vec<Lenient<Utf8PathBuf>>>::deserialize(deserializer)?;
    Ok(raw
        .into_valid("proxies")
        .unwrap_or_default()
        .into_iter()
        .filter_map(|proxy| proxy.into_valid("proxies"))
        .collect())
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Lenient::<bool>::deserialize(deserializer)?;
    Ok(raw.into_valid("no_register").unwrap_or_default())
}
