//! Markdown helpers shared by documents and the feed.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches `![alt](url)` and `![](url)`, capturing the url
static IMAGE_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!\[[^\]]*\]\s*\(\s*([^)\s]+)\s*\)").expect("image pattern is valid")
});

/// Extension every stored document filename ends with
pub const MARKDOWN_EXTENSION: &str = ".md";

/// Returns the url of the first markdown image reference in `content`
///
/// Only the first match counts. The result is derived on every read and never
/// stored, so it always reflects the current content.
///
/// ```
/// use mdnote_shared::markdown::first_image_url;
///
/// let content = "intro\n![cat](/uploads/images/a1.png)\n![dog](/b.png)";
/// assert_eq!(first_image_url(content), Some("/uploads/images/a1.png"));
/// assert_eq!(first_image_url("no images here"), None);
/// ```
pub fn first_image_url(content: &str) -> Option<&str> {
    IMAGE_REF
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|url| !url.is_empty())
}

/// Builds the markdown body of an image document
pub fn image_reference(url: &str) -> String {
    format!("![]({})", url)
}

/// Normalizes a document title into its filename
///
/// Appends `.md` unless the title already ends with it (case-insensitive).
pub fn markdown_filename(title: &str) -> String {
    if title.to_lowercase().ends_with(MARKDOWN_EXTENSION) {
        title.to_string()
    } else {
        format!("{}{}", title, MARKDOWN_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_image_url_picks_first_match() {
        let content = "![one](/a.png) text ![two](/b.png)";
        assert_eq!(first_image_url(content), Some("/a.png"));
    }

    #[test]
    fn test_first_image_url_tolerates_whitespace() {
        assert_eq!(first_image_url("![x] ( /spaced.gif )"), Some("/spaced.gif"));
        assert_eq!(first_image_url("![](/empty-alt.webp)"), Some("/empty-alt.webp"));
    }

    #[test]
    fn test_first_image_url_ignores_plain_links() {
        assert_eq!(first_image_url("[link](/not-an-image)"), None);
        assert_eq!(first_image_url("![broken]()"), None);
        assert_eq!(first_image_url(""), None);
    }

    #[test]
    fn test_image_reference() {
        assert_eq!(
            image_reference("/uploads/images/abc.png"),
            "![](/uploads/images/abc.png)"
        );
        assert_eq!(
            first_image_url(&image_reference("/uploads/images/abc.png")),
            Some("/uploads/images/abc.png")
        );
    }

    #[test]
    fn test_markdown_filename() {
        assert_eq!(markdown_filename("Notes"), "Notes.md");
        assert_eq!(markdown_filename("readme.md"), "readme.md");
        assert_eq!(markdown_filename("README.MD"), "README.MD");
        assert_eq!(markdown_filename("cat.png"), "cat.png.md");
    }
}
