//! # steamguide
//!
//! Fetch Steam Workshop guides and turn them into clean HTML or Markdown.
//!
//! ## Features
//!
//! - Remove navigation and boilerplate `div`s by id or class
//! - Convert the guide body to Markdown with YAML front matter
//! - Download embedded images and rewrite references to local (or CDN) paths
//! - Skip Steam UI chrome images (ratings, avatars, reactions)
//!
//! ## Quick Start
//!
//! ```no_run
//! use steamguide::{ConvertConfig, GuideConverter};
//!
//! let converter = GuideConverter::new(ConvertConfig::default()).unwrap();
//! let outcome = converter
//!     .process("https://steamcommunity.com/sharedfiles/filedetails/?id=123456")
//!     .unwrap();
//! println!("{} ({} images)", outcome.path.display(), outcome.images);
//! ```
//!
//! ## Working Offline
//!
//! Every stage works on an in-memory [`dom::ArenaDom`], so already-fetched
//! HTML can be pruned and rendered directly:
//!
//! ```
//! use steamguide::dom::parse_html;
//! use steamguide::{ImageMapping, convert_guide};
//!
//! let mut dom = parse_html(r#"<div class="guide subSections"><p>Hello</p></div>"#);
//! let markdown = convert_guide(&mut dom, &ImageMapping::new()).unwrap();
//! assert_eq!(markdown, "Hello\n");
//! ```

pub mod assets;
pub mod clean;
pub mod convert;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod markdown;
pub mod metadata;
pub mod prune;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;

pub use assets::{AssetConfig, AssetLocalizer, ImageMapping, UI_CHROME_PATTERNS};
pub use clean::{CleanConfig, CleanedPage, DEFAULT_HTML_OUTPUT, PageCleaner, clean_html};
pub use convert::{
    ConvertConfig, ConvertOutcome, DEFAULT_OUTPUT_DIR, GuideConverter, UNTITLED_GUIDE,
    convert_page,
};
pub use error::{Error, Result};
pub use fetch::{Fetcher, ImageSource};
pub use markdown::convert_guide;
pub use metadata::{GuideMetadata, extract_metadata};
pub use prune::{PruneList, PruneReport, prune};
pub use util::sanitize_filename;
