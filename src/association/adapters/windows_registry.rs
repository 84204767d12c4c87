//! Windows registry scheme association under `HKEY_CURRENT_USER`.

use crate::association::ports::{AssociationError, AssociationResult, SchemeAssociation};
use camino::Utf8Path;
use tracing::info;
use windows_registry::CURRENT_USER;
use windows_result::{Error, HRESULT};

const ERROR_FILE_NOT_FOUND: u32 = 2;
const ERROR_PATH_NOT_FOUND: u32 = 3;
const ERROR_ACCESS_DENIED: u32 = 5;

/// Returns whether `err` reports a missing key or value.
fn is_not_found(err: &Error) -> bool {
    let code = err.code();
    code == HRESULT::from_win32(ERROR_FILE_NOT_FOUND)
        || code == HRESULT::from_win32(ERROR_PATH_NOT_FOUND)
}

/// Maps a registry failure, treating access denial as a refused write.
fn association_error(scheme: &str, err: Error) -> AssociationError {
    if err.code() == HRESULT::from_win32(ERROR_ACCESS_DENIED) {
        return AssociationError::Denied {
            scheme: scheme.to_owned(),
            reason: err.message(),
        };
    }
    AssociationError::backend(err)
}

/// Scheme association stored in `HKCU\Software\Classes\<scheme>`.
///
/// The open command is `"<exe>" "%1"` and the `URL Protocol` marker is set
/// so browsers hand links over. No elevation is ever requested.
#[derive(Debug, Clone)]
pub struct WindowsRegistryAssociation {
    scheme: String,
}

impl WindowsRegistryAssociation {
    /// Creates an association for `scheme`.
    #[must_use]
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
        }
    }

    fn scheme_key_path(&self) -> String {
        format!(r"Software\Classes\{}", self.scheme)
    }

    fn command_key_path(&self) -> String {
        format!(r"{}\shell\open\command", self.scheme_key_path())
    }

    fn map_error(&self, err: Error) -> AssociationError {
        association_error(&self.scheme, err)
    }
}

impl SchemeAssociation for WindowsRegistryAssociation {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn read_command(&self) -> AssociationResult<Option<String>> {
        let command = CURRENT_USER
            .open(self.command_key_path())
            .and_then(|key| key.get_string(""));
        match command {
            Ok(value) => Ok(Some(value)),
            Err(err) if is_not_found(&err) => Ok(None),
            Err(err) => Err(self.map_error(err)),
        }
    }

    fn write_owner(&self, executable: &Utf8Path) -> AssociationResult<()> {
        let description = format!("URL:{} link", self.scheme);
        let command = format!("\"{executable}\" \"%1\"");

        let scheme_key = CURRENT_USER
            .create(self.scheme_key_path())
            .map_err(|err| self.map_error(err))?;
        scheme_key
            .set_string("", description.as_str())
            .map_err(|err| self.map_error(err))?;
        scheme_key
            .set_string("URL Protocol", "")
            .map_err(|err| self.map_error(err))?;
        CURRENT_USER
            .create(self.command_key_path())
            .and_then(|key| key.set_string("", command.as_str()))
            .map_err(|err| self.map_error(err))?;

        info!(scheme = %self.scheme, %executable, "wrote registry association");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ERROR_FILE_NOT_FOUND, true)]
    #[case(ERROR_PATH_NOT_FOUND, true)]
    #[case(ERROR_ACCESS_DENIED, false)]
    fn missing_keys_are_recognised_from_their_hresult(#[case] win32: u32, #[case] expected: bool) {
        let err = Error::from_hresult(HRESULT::from_win32(win32));

        assert_eq!(is_not_found(&err), expected);
    }

    #[rstest]
    fn access_denied_is_a_refused_write() {
        let err = Error::from_hresult(HRESULT::from_win32(ERROR_ACCESS_DENIED));

        assert!(matches!(
            association_error("nxm", err),
            AssociationError::Denied { ref scheme, .. } if scheme == "nxm"
        ));
    }

    #[rstest]
    fn other_failures_are_backend_errors() {
        let err = Error::from_hresult(HRESULT::from_win32(ERROR_FILE_NOT_FOUND));

        assert!(matches!(
            association_error("nxm", err),
            AssociationError::Backend(_)
        ));
    }
}
