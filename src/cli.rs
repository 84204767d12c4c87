//! Command-line surface of the `linkhandler` binary.
//!
//! ```text
//! linkhandler <scheme>://<category>/<payload>      dispatch a link
//! linkhandler reg <categories> <handler> [--force-reg | forcereg]
//! linkhandler forcereg <categories> <handler>
//! linkhandler unreg <categories>
//! linkhandler unproxy <install-dir>
//! linkhandler                                      list the active registry
//! ```
//!
//! `<categories>` is comma-separated; `*` selects the default handler.

use crate::app::{
    AppError, AppOutcome, Invocation, LinkHandlerApp, RegistryListing, RunNotice,
};
use crate::association::{
    adapters::{PlatformAssociation, TerminalPrompt, memory::FixedConsent},
    domain::{AssociationDomainError, ConsentAnswer, InstallationIdentity},
    ports::ConsentPrompt,
    services::{OsBinding, RegistrationReconciler},
};
use crate::config::{ConfigError, HandlerConfig};
use crate::routing::{
    adapters::{JsonFileRegistryStore, SpawnLauncher},
    domain::{HandlerTarget, RegistrationOutcome, RoutingDomainError, SchemeLink},
    services::{DispatchError, Dispatcher},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use mockable::DefaultClock;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

const NO_HANDLER_GUIDANCE: &str = "\
Register a handler with `linkhandler reg <category> <handler>`. If another \
installation handles this category, run it once so it is added as a proxy.";

/// Parsed command line.
#[derive(Debug, Parser)]
#[command(name = "linkhandler", version)]
#[command(about = "Routes URL-scheme links to per-category handler executables")]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Answer yes to every consent prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Action to perform; lists the registry when omitted
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

/// Subcommands. Anything that is not a known subcommand is taken as a link.
#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Register a handler for comma-separated categories (`*` = default)
    Reg {
        /// Categories such as `skyrimse,fallout4`
        categories: String,
        /// Handler executable
        path: Utf8PathBuf,
        /// Also claim the scheme for this installation
        #[arg(long)]
        force_reg: bool,
        /// Trailing `forcereg`, equivalent to `--force-reg`
        #[arg(value_parser = ["forcereg"], hide = true)]
        force_token: Option<String>,
    },
    /// Register a handler and claim the scheme for this installation
    Forcereg {
        /// Categories such as `skyrimse,fallout4`
        categories: String,
        /// Handler executable
        path: Utf8PathBuf,
    },
    /// Remove handlers for comma-separated categories (`*` = default)
    Unreg {
        /// Categories such as `skyrimse,fallout4`
        categories: String,
    },
    /// Stop consulting another installation
    Unproxy {
        /// Installation directory of the proxy
        install_dir: Utf8PathBuf,
    },
    /// A link to dispatch
    #[command(external_subcommand)]
    Link(Vec<String>),
}

/// Errors reported by the binary before exiting with status 1.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be assembled.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The running executable does not describe an installation.
    #[error(transparent)]
    Identity(#[from] AssociationDomainError),

    /// A category list or link argument is invalid.
    #[error(transparent)]
    Arguments(#[from] RoutingDomainError),

    /// A link was followed by further arguments.
    #[error("expected a single link, got {0:?}")]
    UnexpectedArguments(Vec<String>),

    /// The handler path could not be made absolute.
    #[error("cannot resolve handler path {path}: {reason}")]
    HandlerPath {
        /// Path as given.
        path: Utf8PathBuf,
        /// Why it could not be resolved.
        reason: String,
    },

    /// The run failed.
    #[error(transparent)]
    App(#[from] AppError),

    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl CliError {
    const fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::App(AppError::Dispatch(DispatchError::NoHandlerFound { .. })) => {
                Some(NO_HANDLER_GUIDANCE)
            }
            _ => None,
        }
    }
}

impl Cli {
    /// Converts the parsed arguments into an [`Invocation`] for `scheme`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Arguments`] for invalid category lists or links
    /// outside `scheme`, [`CliError::UnexpectedArguments`] when a link is
    /// followed by more arguments, or [`CliError::HandlerPath`] when a
    /// handler path cannot be made absolute.
    pub fn invocation(&self, scheme: &str) -> Result<Invocation, CliError> {
        let Some(command) = &self.command else {
            return Ok(Invocation::Show);
        };
        match command {
            CliCommand::Reg {
                categories,
                path,
                force_reg,
                force_token,
            } => Ok(Invocation::Register {
                targets: HandlerTarget::parse_list(categories)?,
                handler: absolute_handler_path(path)?,
                force: *force_reg || force_token.is_some(),
            }),
            CliCommand::Forcereg { categories, path } => Ok(Invocation::Register {
                targets: HandlerTarget::parse_list(categories)?,
                handler: absolute_handler_path(path)?,
                force: true,
            }),
            CliCommand::Unreg { categories } => Ok(Invocation::Unregister {
                targets: HandlerTarget::parse_list(categories)?,
            }),
            CliCommand::Unproxy { install_dir } => Ok(Invocation::RemoveProxy {
                install_dir: install_dir.clone(),
            }),
            CliCommand::Link(arguments) => match arguments.as_slice() {
                [link] => {
                    SchemeLink::parse(scheme, link)?;
                    Ok(Invocation::Dispatch { link: link.clone() })
                }
                _ => Err(CliError::UnexpectedArguments(arguments.clone())),
            },
        }
    }
}

fn absolute_handler_path(path: &Utf8Path) -> Result<Utf8PathBuf, CliError> {
    let handler_path_error = |reason: String| CliError::HandlerPath {
        path: path.to_owned(),
        reason,
    };
    let absolute =
        std::path::absolute(path.as_std_path()).map_err(|err| handler_path_error(err.to_string()))?;
    Utf8PathBuf::from_path_buf(absolute)
        .map_err(|_| handler_path_error("path is not valid UTF-8".to_owned()))
}

/// Reports a command-line parse failure and returns the exit status.
///
/// Help and version requests exit with 0; usage errors exit with 1.
#[must_use]
pub fn report_parse_error(err: &clap::Error) -> ExitCode {
    if err.print().is_err() || err.use_stderr() {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Runs the parsed command line against the real environment.
#[must_use]
pub fn run(cli: &Cli) -> ExitCode {
    let stdout = io::stdout();
    match execute(cli, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "linkhandler failed");
            if let Err(write_err) = report_error(&err) {
                error!(error = %write_err, "failed to report error on stderr");
            }
            ExitCode::FAILURE
        }
    }
}

fn report_error(err: &CliError) -> io::Result<()> {
    let mut stderr = io::stderr().lock();
    writeln!(stderr, "linkhandler: {err}")?;
    if let Some(guidance) = err.guidance() {
        writeln!(stderr, "{guidance}")?;
    }
    Ok(())
}

fn execute(cli: &Cli, out: &mut impl Write) -> Result<(), CliError> {
    let config = HandlerConfig::from_env()?;
    let invocation = cli.invocation(config.scheme())?;
    let identity = InstallationIdentity::new(config.executable().to_owned())?;
    let association = Arc::new(platform_association(&config)?);
    let store = Arc::new(JsonFileRegistryStore::new());

    let reconciler = RegistrationReconciler::new(
        identity,
        OsBinding::new(association),
        consent_prompt(cli.yes),
        Arc::clone(&store),
        Arc::new(DefaultClock),
    );
    let dispatcher = Dispatcher::new(config.scheme(), store, Arc::new(SpawnLauncher::new()));
    let app = LinkHandlerApp::new(reconciler, dispatcher, config.suppress_prompts());

    let report = app.run(&invocation)?;
    render(&report.outcome, out)?;
    render_notices(&report.notices, out)?;
    Ok(())
}

#[cfg(unix)]
fn platform_association(config: &HandlerConfig) -> Result<PlatformAssociation, CliError> {
    Ok(PlatformAssociation::new(
        config.scheme(),
        config.applications_dir()?,
    ))
}

#[cfg(windows)]
fn platform_association(config: &HandlerConfig) -> Result<PlatformAssociation, CliError> {
    Ok(PlatformAssociation::new(config.scheme()))
}

fn consent_prompt(assume_yes: bool) -> Arc<dyn ConsentPrompt> {
    if assume_yes {
        return Arc::new(FixedConsent::new(ConsentAnswer::Yes));
    }
    if io::stdin().is_terminal() {
        return Arc::new(TerminalPrompt::stdio());
    }
    Arc::new(FixedConsent::new(ConsentAnswer::No))
}

/// Writes a human-readable summary of `outcome`.
///
/// # Errors
///
/// Returns write failures from `out`.
pub fn render(outcome: &AppOutcome, out: &mut impl Write) -> io::Result<()> {
    match outcome {
        AppOutcome::Passive { state } => writeln!(
            out,
            "This installation does not handle links ({state}); nothing to do."
        ),
        AppOutcome::Dispatched(dispatched) => writeln!(
            out,
            "Opened {} with {}",
            dispatched.link().as_str(),
            dispatched.handler()
        ),
        AppOutcome::Registered {
            install_dir,
            outcomes,
        } => {
            writeln!(out, "Registry: {install_dir}")?;
            for (target, registration) in outcomes {
                let status = match registration {
                    RegistrationOutcome::Registered => "registered",
                    RegistrationOutcome::AlreadySet => "already set",
                };
                writeln!(out, "  {target}: {status}")?;
            }
            Ok(())
        }
        AppOutcome::Unregistered {
            install_dir,
            removed,
        } => {
            if removed.is_empty() {
                return writeln!(out, "Registry {install_dir}: nothing to remove");
            }
            writeln!(out, "Registry: {install_dir}")?;
            for target in removed {
                writeln!(out, "  {target}: removed")?;
            }
            Ok(())
        }
        AppOutcome::ProxyRemoved {
            install_dir,
            removed,
        } => {
            let status = if *removed { "removed" } else { "was not registered" };
            writeln!(out, "Registry {install_dir}: proxy {status}")
        }
        AppOutcome::Listing(listing) => render_listing(listing, out),
    }
}

/// Writes one line per notice.
///
/// # Errors
///
/// Returns write failures from `out`.
pub fn render_notices(notices: &[RunNotice], out: &mut impl Write) -> io::Result<()> {
    for notice in notices {
        match notice {
            RunNotice::OwnerNotJoined { owner_dir } => writeln!(
                out,
                "Warning: could not add this installation as a proxy of {owner_dir}; \
                 links it does not map will not reach this installation."
            )?,
        }
    }
    Ok(())
}

fn render_listing(listing: &RegistryListing, out: &mut impl Write) -> io::Result<()> {
    let table = &listing.table;
    writeln!(out, "Registry: {} ({})", listing.install_dir, listing.state)?;

    writeln!(out, "Handlers:")?;
    if table.handlers().next().is_none() {
        writeln!(out, "  (none)")?;
    }
    for (category, entry) in table.handlers() {
        match entry.registered_at() {
            Some(registered_at) => writeln!(
                out,
                "  {category}: {} (since {})",
                entry.executable(),
                registered_at.format("%Y-%m-%d %H:%M UTC")
            )?,
            None => writeln!(out, "  {category}: {}", entry.executable())?,
        }
    }

    match table.default_handler() {
        Some(entry) => writeln!(out, "Default: {}", entry.executable())?,
        None => writeln!(out, "Default: (none)")?,
    }

    writeln!(out, "Proxies:")?;
    if table.proxies().is_empty() {
        writeln!(out, "  (none)")?;
    }
    for proxy in table.proxies() {
        writeln!(out, "  {proxy}")?;
    }

    let prompts = if table.no_register() { "off" } else { "on" };
    writeln!(out, "Registration prompts: {prompts}")
}
