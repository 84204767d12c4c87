//! Link dispatch service.
//!
//! Resolution order for a link's category:
//!
//! 1. the local installation's own mapping;
//! 2. each proxy installation's own mapping, in registration order;
//! 3. the local installation's default handler.
//!
//! Proxies are consulted one hop deep only: a proxy's own proxies are never
//! opened, so delegation cannot loop.

use super::registry::{HandlerRegistry, load_or_empty};
use crate::routing::{
    domain::{Category, RoutingDomainError, SchemeLink, same_location},
    ports::{LaunchError, LaunchRequest, ProcessLauncher, RegistryStore},
};
use camino::{Utf8Path, Utf8PathBuf};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Where a resolved handler was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerSource {
    /// The local installation maps the category.
    Local,
    /// The proxy installation at this directory maps the category.
    Proxy(Utf8PathBuf),
    /// The local installation's default handler took the link.
    Default,
}

/// A link that was handed to a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    link: SchemeLink,
    handler: Utf8PathBuf,
    source: HandlerSource,
}

impl DispatchOutcome {
    /// Returns the dispatched link.
    #[must_use]
    pub const fn link(&self) -> &SchemeLink {
        &self.link
    }

    /// Returns the launched handler executable.
    #[must_use]
    pub fn handler(&self) -> &Utf8Path {
        &self.handler
    }

    /// Returns where the handler was found.
    #[must_use]
    pub const fn source(&self) -> &HandlerSource {
        &self.source
    }
}

/// Errors returned while dispatching a link.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The input is not a link of the claimed scheme.
    #[error(transparent)]
    MalformedLink(#[from] RoutingDomainError),

    /// Neither this installation nor its proxies handle the category.
    #[error("{}", no_handler_message(.category.as_ref()))]
    NoHandlerFound {
        /// Category of the link, if it carried one.
        category: Option<Category>,
    },

    /// The resolved handler could not be started.
    #[error(transparent)]
    Launch(#[from] LaunchError),
}

fn no_handler_message(category: Option<&Category>) -> String {
    category.map_or_else(
        || "no handler registered for links without a category".to_owned(),
        |name| format!("no handler registered for category '{name}'"),
    )
}

/// Resolves links to handler executables and launches them.
#[derive(Clone)]
pub struct Dispatcher<S, L>
where
    S: RegistryStore,
    L: ProcessLauncher,
{
    scheme: String,
    store: Arc<S>,
    launcher: Arc<L>,
}

impl<S, L> Dispatcher<S, L>
where
    S: RegistryStore,
    L: ProcessLauncher,
{
    /// Creates a dispatcher for links of `scheme`. Proxy registries are
    /// opened through `store`.
    #[must_use]
    pub fn new(scheme: impl Into<String>, store: Arc<S>, launcher: Arc<L>) -> Self {
        Self {
            scheme: scheme.into(),
            store,
            launcher,
        }
    }

    /// Returns the scheme this dispatcher accepts.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Finds the handler for `link` without launching anything.
    #[must_use]
    pub fn resolve<C>(
        &self,
        link: &SchemeLink,
        local: &HandlerRegistry<S, C>,
    ) -> Option<(Utf8PathBuf, HandlerSource)>
    where
        C: Clock + Send + Sync,
    {
        if let Some(category) = link.category() {
            if let Some(handler) = local.lookup(category) {
                return Some((handler.to_owned(), HandlerSource::Local));
            }
            if let Some(found) = self.resolve_through_proxies(category, local) {
                return Some(found);
            }
        }

        local
            .default_handler()
            .map(|handler| (handler.to_owned(), HandlerSource::Default))
    }

    /// Parses `raw_link`, resolves its handler, and launches the handler with
    /// the link as its sole argument.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedLink`] for input outside the scheme,
    /// [`DispatchError::NoHandlerFound`] when nothing resolves, or
    /// [`DispatchError::Launch`] when the handler cannot be started.
    pub fn dispatch<C>(
        &self,
        raw_link: &str,
        local: &HandlerRegistry<S, C>,
    ) -> Result<DispatchOutcome, DispatchError>
    where
        C: Clock + Send + Sync,
    {
        let link = SchemeLink::parse(&self.scheme, raw_link)?;
        let Some((handler, source)) = self.resolve(&link, local) else {
            return Err(DispatchError::NoHandlerFound {
                category: link.category().cloned(),
            });
        };

        self.launcher
            .launch(&LaunchRequest::new(handler.clone(), link.as_str()))?;
        info!(
            category = link.category().map(Category::as_str),
            %handler,
            ?source,
            "dispatched link"
        );

        Ok(DispatchOutcome {
            link,
            handler,
            source,
        })
    }

    fn resolve_through_proxies<C>(
        &self,
        category: &Category,
        local: &HandlerRegistry<S, C>,
    ) -> Option<(Utf8PathBuf, HandlerSource)>
    where
        C: Clock + Send + Sync,
    {
        local
            .proxies()
            .iter()
            .filter(|proxy| !same_location(proxy, local.install_dir()))
            .find_map(|proxy| {
                let table = load_or_empty(&*self.store, proxy);
                let handler = table.lookup(category)?;
                debug!(%category, %proxy, %handler, "category resolved by proxy installation");
                Some((handler.to_owned(), HandlerSource::Proxy(proxy.clone())))
            })
    }
}
