//! Changelog accumulation across the releases a user has not installed yet.

use pulldown_cmark::{Options, Parser};

use crate::release::ReleaseDescriptor;

/// Render markdown release notes to HTML.
#[must_use]
pub fn render_notes(markdown: &str) -> String {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(markdown, options);

    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

/// Concatenates the rendered notes of every release newer than `installed`.
///
/// `releases` must be ordered newest first. The walk stops at the first release
/// whose tag equals `installed`, which is excluded; when no tag matches, every
/// release is included.
#[must_use]
pub fn accumulate(releases: &[ReleaseDescriptor], installed: &str) -> String {
    let mut changelog = String::new();
    for release in releases.iter().take_while(|r| r.tag != installed) {
        changelog.push_str("<blockquote><h4><u>");
        changelog.push_str(&release.display_name);
        changelog.push_str("</u></h4>");
        changelog.push_str(&render_notes(&release.notes_body));
        changelog.push_str("<br></blockquote>");
    }
    changelog
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(tag: &str, notes: &str) -> ReleaseDescriptor {
        ReleaseDescriptor {
            tag: tag.to_string(),
            display_name: format!("Release {tag}"),
            notes_body: notes.to_string(),
            assets: vec![],
        }
    }

    #[test]
    fn test_render_notes() {
        assert_eq!(render_notes("**bold**"), "<p><strong>bold</strong></p>\n");
        assert_eq!(render_notes(""), "");
    }

    #[test]
    fn test_accumulate_stops_at_installed() {
        let releases = vec![
            release("v3", "third"),
            release("v2", "second"),
            release("v1", "first"),
        ];
        let changelog = accumulate(&releases, "v2");
        assert_eq!(
            changelog,
            "<blockquote><h4><u>Release v3</u></h4><p>third</p>\n<br></blockquote>"
        );
        assert!(!changelog.contains("second"));
        assert!(!changelog.contains("first"));
    }

    #[test]
    fn test_accumulate_unknown_installed_includes_all() {
        let releases = vec![release("v2", "second"), release("v1", "first")];
        let changelog = accumulate(&releases, "v0");
        assert!(changelog.contains("second"));
        assert!(changelog.contains("first"));
    }

    #[test]
    fn test_accumulate_up_to_date_is_empty() {
        let releases = vec![release("v3", "third"), release("v2", "second")];
        assert!(accumulate(&releases, "v3").is_empty());
    }

    #[test]
    fn test_untitled_release_has_empty_heading() {
        let mut untitled = release("v4", "notes");
        untitled.display_name.clear();
        assert!(accumulate(&[untitled], "v3").starts_with("<blockquote><h4><u></u></h4><p>notes</p>"));
    }
}
