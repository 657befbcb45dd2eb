//! Text-level fixes applied to rendered Markdown.

use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::assets::ImageMapping;

/// Three or more newlines, possibly with whitespace between them.
static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n").unwrap());

/// Literal `<div ...>` and `</div>` tags left in the text.
static DIV_TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<div[^>]*>|</div>").unwrap());

/// `[](...)` not preceded by `!`, with the preceding character captured.
static EMPTY_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[^!])\[\]\([^)]*\)").unwrap());

/// Tidy rendered Markdown and point mapped image URLs at their local copies.
///
/// Steps, in order: collapse runs of blank lines to one, strip literal
/// `div` tags, replace every mapped URL (and the `//host/...` form of an
/// `https:` one) with its local path, then drop
/// empty links (image syntax `![](...)` is kept).
pub fn post_process(markdown: &str, mapping: &ImageMapping) -> String {
    let mut md = EXCESS_NEWLINES.replace_all(markdown, "\n\n").into_owned();
    md = DIV_TAGS.replace_all(&md, "").into_owned();

    for (url, local) in mapping.iter() {
        md = md.replace(url, local);

        // Links in the page may still carry the scheme-less `//host/...` form.
        if let Some(rest) = url.strip_prefix("https://") {
            let scheme_less = format!(r"(^|[^:])//{}", regex_lite::escape(rest));
            if let Ok(re) = Regex::new(&scheme_less) {
                md = re
                    .replace_all(&md, format!("${{1}}{local}").as_str())
                    .into_owned();
            }
        }

        let bare_image = format!(r"!\[\]\({}\)", regex_lite::escape(url));
        if let Ok(re) = Regex::new(&bare_image) {
            let basename = Path::new(local)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(local);
            md = re
                .replace_all(&md, format!("![](images/{basename})").as_str())
                .into_owned();
        }
    }

    remove_empty_links(md)
}

/// Adjacent empty links share the separating character, so repeat until
/// nothing matches.
fn remove_empty_links(mut md: String) -> String {
    loop {
        let next = match EMPTY_LINK.replace_all(&md, "$1") {
            Cow::Borrowed(_) => None,
            Cow::Owned(next) => Some(next),
        };
        match next {
            Some(next) => md = next,
            None => return md,
        }
    }
}
