//! Guide content → Markdown.
//!
//! - [`render`]: DOM subtree → Markdown text
//! - [`fence`]: backtick counting for code spans and fenced blocks
//! - [`cleanup`]: text-level post-processing and image URL rewriting
//!
//! [`convert_guide`] ties them together: it strips the Steam page chrome,
//! finds the guide body, renders it and post-processes the result.

pub mod cleanup;
mod fence;
mod render;

pub use cleanup::post_process;
pub use fence::{fence_length, inline_code_ticks};
pub use render::{RenderContext, render_markdown};

use tracing::debug;

use crate::assets::ImageMapping;
use crate::dom::{ArenaDom, ArenaNodeId, CssQuery, Query};
use crate::error::{Error, Result};
use crate::prune::{PruneList, prune};

/// Selector for the guide body on a Steam guide page.
const GUIDE_BODY: &str = "div.guide.subSections";

/// Fallback container id when the guide body is absent.
const PROFILE_BLOCK: &str = "profileBlock";

/// Convert a guide page to Markdown.
///
/// Prunes [`PruneList::chrome`], renders the first `div.guide.subSections`
/// (or `div#profileBlock`), and rewrites URLs found in `mapping` to their
/// local paths.
pub fn convert_guide(dom: &mut ArenaDom, mapping: &ImageMapping) -> Result<String> {
    let report = prune(dom, &PruneList::chrome());
    debug!(removed = report.removed, "pruned page chrome");

    let root = find_content_root(dom)?;
    let markdown = render_markdown(dom, root);
    Ok(post_process(&markdown, mapping))
}

/// The container whose subtree becomes the Markdown body.
pub fn find_content_root(dom: &ArenaDom) -> Result<ArenaNodeId> {
    if let Some(body) = CssQuery::parse(GUIDE_BODY)?.first(dom) {
        return Ok(body);
    }
    Query::tag("div")
        .with_id(PROFILE_BLOCK)
        .first(dom)
        .ok_or_else(|| {
            Error::ContentNotFound(format!(
                "no {GUIDE_BODY} or div#{PROFILE_BLOCK} in page"
            ))
        })
}
