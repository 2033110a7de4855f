//! Presentation layer: directory chooser, upgrade prompt and link opening.
//!
//! Nothing here touches the update flow directly; every user decision is
//! turned into a value ([`PathBuf`], [`UpdateCommand`]) that the orchestrator
//! acts on.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use inquire::Select;
use leapfrog_updater::{
    DirectoryChooser, LinkOpener, ReleaseIdentity, UpdateCommand, UpdateError, UpgradeNotice,
};

/// Title of the native folder picker.
pub const CHOOSER_TITLE: &str = "Choose directory to install";

/// Native folder picker, skipped when a directory was given on the command line.
#[derive(Debug, Clone, Default)]
pub struct DialogChooser {
    preset: Option<PathBuf>,
}

impl DialogChooser {
    /// Uses `preset` when given instead of showing a dialog.
    #[must_use]
    pub fn new(preset: Option<PathBuf>) -> Self {
        Self { preset }
    }
}

impl DirectoryChooser for DialogChooser {
    fn choose_directory(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.preset {
            return Some(dir.clone());
        }
        rfd::FileDialog::new()
            .set_title(CHOOSER_TITLE)
            .pick_folder()
    }
}

/// Opens links with the system handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLinks;

impl LinkOpener for SystemLinks {
    fn open_link(&self, url: &str) -> Result<(), UpdateError> {
        open::that(url).map_err(|e| UpdateError::Launch(format!("cannot open {url}: {e}")))
    }
}

/// Entries of the upgrade prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    UpdateNow,
    ReleaseNotes,
    ReleasePage,
    NotNow,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::UpdateNow => "Update now",
            Self::ReleaseNotes => "Read what's new",
            Self::ReleasePage => "Open the releases page",
            Self::NotNow => "Not now",
        };
        f.write_str(label)
    }
}

/// Releases page of a repository on GitHub.
#[must_use]
pub fn releases_page(identity: &ReleaseIdentity) -> String {
    format!(
        "https://github.com/{}/{}/releases",
        identity.owner, identity.project
    )
}

/// Terminal prompt answering an [`UpgradeNotice`].
#[derive(Debug, Clone)]
pub struct ConsolePrompt {
    identity: ReleaseIdentity,
}

impl ConsolePrompt {
    /// Prompt for updates of `identity`.
    #[must_use]
    pub fn new(identity: ReleaseIdentity) -> Self {
        Self { identity }
    }

    /// Asks once; a skipped or failed prompt is a dismissal.
    pub fn ask(&self, notice: &UpgradeNotice) -> UpdateCommand {
        let mut choices = vec![Choice::UpdateNow];
        if !notice.changelog_html.is_empty() {
            choices.push(Choice::ReleaseNotes);
        }
        choices.push(Choice::ReleasePage);
        choices.push(Choice::NotNow);

        let message = format!("{} is available", notice.update_name);
        let choice = match Select::new(&message, choices)
            .with_starting_cursor(0)
            .without_filtering()
            .with_help_message("↑↓ to move, ENTER to select, ESC to dismiss")
            .prompt_skippable()
        {
            Ok(Some(choice)) => choice,
            Ok(None) => Choice::NotNow,
            Err(e) => {
                tracing::warn!("Update prompt unavailable: {}", e);
                Choice::NotNow
            }
        };

        self.command_for(choice, notice)
    }

    fn command_for(&self, choice: Choice, notice: &UpgradeNotice) -> UpdateCommand {
        match choice {
            Choice::UpdateNow => UpdateCommand::Update,
            Choice::ReleaseNotes => match self.write_notes(notice) {
                Ok(path) => UpdateCommand::OpenLink(path.display().to_string()),
                Err(e) => {
                    tracing::warn!("Could not write release notes: {}", e);
                    UpdateCommand::OpenLink(releases_page(&self.identity))
                }
            },
            Choice::ReleasePage => UpdateCommand::OpenLink(releases_page(&self.identity)),
            Choice::NotNow => UpdateCommand::Dismiss,
        }
    }

    /// Writes the changelog to an HTML page in the temporary directory.
    fn write_notes(&self, notice: &UpgradeNotice) -> std::io::Result<PathBuf> {
        let path = std::env::temp_dir().join(format!(
            "{}-{}-release-notes.html",
            self.identity.owner, self.identity.project
        ));
        fs::write(&path, notes_page(notice))?;
        Ok(path)
    }
}

/// Standalone HTML page for the changelog.
#[must_use]
pub fn notes_page(notice: &UpgradeNotice) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body><h2>{title}</h2>{body}</body></html>\n",
        title = notice.update_name,
        body = notice.changelog_html
    )
}
