//! freedesktop.org desktop-entry scheme association.

use crate::association::ports::{AssociationError, AssociationResult, SchemeAssociation};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use minijinja::{Environment, context};
use std::io;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

const DESKTOP_ENTRY_TEMPLATE: &str = "\
[Desktop Entry]
Type=Application
Name={{ scheme | upper }} link handler
Comment=Opens {{ scheme }}:// links with the registered handler
Exec={{ exec }}
Terminal=false
NoDisplay=true
MimeType=x-scheme-handler/{{ scheme }};
";

const EXEC_KEY: &str = "Exec=";

/// Scheme association backed by a desktop entry in the user's applications
/// directory, registered as the default `x-scheme-handler/<scheme>` handler.
///
/// Every installation writes the same entry, so the entry's `Exec` line is
/// the single record of which executable owns the scheme.
#[derive(Debug, Clone)]
pub struct DesktopEntryAssociation {
    scheme: String,
    applications_dir: Utf8PathBuf,
    update_mime_defaults: bool,
}

impl DesktopEntryAssociation {
    /// Creates an association for `scheme` whose entry lives in
    /// `applications_dir`.
    #[must_use]
    pub fn new(scheme: impl Into<String>, applications_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            scheme: scheme.into(),
            applications_dir: applications_dir.into(),
            update_mime_defaults: true,
        }
    }

    /// Skips the `xdg-mime default` call after writing the entry.
    #[must_use]
    pub const fn without_mime_update(mut self) -> Self {
        self.update_mime_defaults = false;
        self
    }

    /// Returns the desktop entry file name, such as `nxm-linkhandler.desktop`.
    #[must_use]
    pub fn entry_file_name(&self) -> String {
        format!("{}-linkhandler.desktop", self.scheme)
    }

    /// Returns the full path of the desktop entry.
    #[must_use]
    pub fn entry_path(&self) -> Utf8PathBuf {
        self.applications_dir.join(self.entry_file_name())
    }

    fn render(&self, executable: &Utf8Path) -> AssociationResult<String> {
        let exec = format!("{} %u", quote_exec_argument(executable.as_str()));
        let mut entry = Environment::new()
            .render_str(
                DESKTOP_ENTRY_TEMPLATE,
                context! {
                    scheme => &self.scheme,
                    exec => escape_string_value(&exec),
                },
            )
            .map_err(AssociationError::backend)?;
        entry.push('\n');
        Ok(entry)
    }

    fn update_mime_default(&self) {
        let mime_type = format!("x-scheme-handler/{}", self.scheme);
        let status = Command::new("xdg-mime")
            .args(["default", &self.entry_file_name(), &mime_type])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(exit) if exit.success() => debug!(%mime_type, "updated default scheme handler"),
            Ok(exit) => warn!(%mime_type, %exit, "xdg-mime did not update the default handler"),
            Err(err) => warn!(%mime_type, error = %err, "xdg-mime unavailable"),
        }
    }
}

impl SchemeAssociation for DesktopEntryAssociation {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn read_command(&self) -> AssociationResult<Option<String>> {
        let dir = match Dir::open_ambient_dir(&self.applications_dir, ambient_authority()) {
            Ok(dir) => dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AssociationError::from_io(&self.scheme, err)),
        };
        let contents = match dir.read_to_string(self.entry_file_name()) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AssociationError::from_io(&self.scheme, err)),
        };

        Ok(contents
            .lines()
            .find_map(|line| line.trim_start().strip_prefix(EXEC_KEY))
            .map(|exec| unescape_exec(exec.trim())))
    }

    fn write_owner(&self, executable: &Utf8Path) -> AssociationResult<()> {
        let entry = self.render(executable)?;
        Dir::create_ambient_dir_all(&self.applications_dir, ambient_authority())
            .map_err(|err| AssociationError::from_io(&self.scheme, err))?;
        let dir = Dir::open_ambient_dir(&self.applications_dir, ambient_authority())
            .map_err(|err| AssociationError::from_io(&self.scheme, err))?;

        let file_name = self.entry_file_name();
        let staging_name = format!("{file_name}.{}.tmp", std::process::id());
        dir.write(&staging_name, entry.as_bytes())
            .map_err(|err| AssociationError::from_io(&self.scheme, err))?;
        if let Err(err) = dir.rename(&staging_name, &dir, &file_name) {
            if let Err(cleanup_err) = dir.remove_file(&staging_name) {
                debug!(error = %cleanup_err, "failed to remove staging desktop entry");
            }
            return Err(AssociationError::from_io(&self.scheme, err));
        }

        info!(
            scheme = %self.scheme,
            %executable,
            entry = %self.entry_path(),
            "wrote desktop entry"
        );
        if self.update_mime_defaults {
            self.update_mime_default();
        }
        Ok(())
    }
}

/// Quotes an `Exec` argument, escaping the characters that stay special
/// inside double quotes.
fn quote_exec_argument(argument: &str) -> String {
    let mut quoted = String::with_capacity(argument.len() + 2);
    quoted.push('"');
    for character in argument.chars() {
        if matches!(character, '"' | '`' | '$' | '\\') {
            quoted.push('\\');
        }
        quoted.push(character);
    }
    quoted.push('"');
    quoted
}

/// Escapes backslashes for a desktop-entry string value.
fn escape_string_value(value: &str) -> String {
    value.replace('\\', "\\\\")
}

/// Reverses [`escape_string_value`] and the `Exec` quoting escapes, yielding
/// a plain `"path" %u` command line.
fn unescape_exec(value: &str) -> String {
    let string_value = value.replace("\\\\", "\\");
    let mut command = String::with_capacity(string_value.len());
    let mut characters = string_value.chars();
    while let Some(character) = characters.next() {
        if character == '\\' {
            if let Some(escaped) = characters.next() {
                command.push(escaped);
            }
            continue;
        }
        command.push(character);
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::domain::stripped_command_line;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn applications_dir() -> (TempDir, Utf8PathBuf) {
        let temp = tempfile::tempdir().expect("temporary directory");
        let path = Utf8PathBuf::from_path_buf(temp.path().join("applications"))
            .expect("temporary directory path should be UTF-8");
        (temp, path)
    }

    #[rstest]
    fn missing_entry_reads_as_unregistered(applications_dir: (TempDir, Utf8PathBuf)) {
        let (_guard, path) = applications_dir;
        let association = DesktopEntryAssociation::new("nxm", path);

        assert_eq!(association.read_command().expect("read should succeed"), None);
    }

    #[rstest]
    fn written_owner_reads_back_through_normalisation(applications_dir: (TempDir, Utf8PathBuf)) {
        let (_guard, path) = applications_dir;
        let association = DesktopEntryAssociation::new("nxm", path).without_mime_update();
        let executable = Utf8Path::new("/opt/Mod Organizer/linkhandler");

        association
            .write_owner(executable)
            .expect("write should succeed");
        let command = association
            .read_command()
            .expect("read should succeed")
            .expect("entry should exist");

        assert_eq!(command, "\"/opt/Mod Organizer/linkhandler\" %u");
        assert_eq!(stripped_command_line(&command), executable);
    }

    #[rstest]
    fn entry_declares_the_scheme_mime_type(applications_dir: (TempDir, Utf8PathBuf)) {
        let (_guard, path) = applications_dir;
        let association = DesktopEntryAssociation::new("nxm", path).without_mime_update();

        association
            .write_owner(Utf8Path::new("/opt/mo2/linkhandler"))
            .expect("write should succeed");
        let contents = std::fs::read_to_string(association.entry_path().as_std_path())
            .expect("entry should be readable");

        assert!(contents.starts_with("[Desktop Entry]\n"));
        assert!(contents.contains("MimeType=x-scheme-handler/nxm;\n"));
        assert!(contents.contains("Exec=\"/opt/mo2/linkhandler\" %u\n"));
    }

    #[rstest]
    #[case("/opt/plain/app", "\"/opt/plain/app\" %u")]
    #[case("/opt/co$t/app", "\"/opt/co\\\\$t/app\" %u")]
    #[case(r"/opt/back\slash/app", r#""/opt/back\\\\slash/app" %u"#)]
    fn special_characters_are_escaped_and_restored(
        #[case] executable: &str,
        #[case] stored_exec: &str,
    ) {
        let stored = escape_string_value(&format!("{} %u", quote_exec_argument(executable)));

        assert_eq!(stored, stored_exec);
        assert_eq!(unescape_exec(&stored), format!("\"{executable}\" %u"));
    }
}
