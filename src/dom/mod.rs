//! Mutable, queryable HTML tree.
//!
//! Pages are parsed with html5ever into an [`ArenaDom`]. Elements can be
//! looked up with a typed [`Query`] (tag + id + class token) or with CSS
//! selectors via [`CssQuery`], pruned with [`ArenaDom::detach`], and written
//! back out with [`to_pretty_html`].
//!
//! ```
//! use steamguide::dom::{parse_html, Query};
//!
//! let mut dom = parse_html(r#"<div id="global_header">nav</div><p>body</p>"#);
//! let header = Query::tag("div").with_id("global_header").first(&dom).unwrap();
//! dom.detach(header);
//! assert!(!steamguide::dom::to_pretty_html(&dom).contains("nav"));
//! ```

mod arena;
mod element_ref;
mod query;
pub mod serialize;
mod tree_sink;

pub use arena::{ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute};
pub use element_ref::{ElementRef, GuideSelectors};
pub use query::{CssQuery, Query, select_all, select_first};
pub use serialize::{inner_html, outer_html, to_pretty_html};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use tree_sink::ArenaSink;

/// Parse an HTML document into an arena DOM.
pub fn parse_html(html: &str) -> ArenaDom {
    let sink = ArenaSink::new();
    parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}
