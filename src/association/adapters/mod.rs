//! Adapter implementations for scheme ownership ports.

pub mod memory;

#[cfg(unix)]
mod desktop_entry;
mod terminal;
#[cfg(windows)]
mod windows_registry;

#[cfg(unix)]
pub use desktop_entry::DesktopEntryAssociation;
pub use terminal::TerminalPrompt;
#[cfg(windows)]
pub use windows_registry::WindowsRegistryAssociation;

/// Scheme association used for the current platform.
#[cfg(unix)]
pub type PlatformAssociation = DesktopEntryAssociation;

/// Scheme association used for the current platform.
#[cfg(windows)]
pub type PlatformAssociation = WindowsRegistryAssociation;
