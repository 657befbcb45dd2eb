//! Downloading guide images and rewriting their references.
//!
//! Every `img` in the page is visited in document order. Content images are
//! downloaded through an [`ImageSource`] into
//! `{output_dir}/{guide_name}/images/image_NNN.ext` and their `src` rewritten
//! to the local (or CDN) path. Steam UI chrome is skipped, and failed
//! downloads leave the reference untouched.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};
use url::Url;

use crate::dom::{ArenaDom, Query};
use crate::error::{Error, Result};
use crate::fetch::ImageSource;

/// URL substrings identifying Steam UI images rather than guide content.
pub const UI_CHROME_PATTERNS: &[&str] = &[
    "/public/images/sharedfiles/4-star_large.png",
    "/public/images/sharedfiles/filterselect_blue.png",
    "/public/images/skin_1/footerLogo_valve.png",
    "/public/images/loyalty/reactions/",
    "/avatars.fastly.steamstatic.com/",
];

/// Pause before each image request.
pub const DEFAULT_DOWNLOAD_DELAY: Duration = Duration::from_millis(500);

/// Extension used when the image URL path has none.
const DEFAULT_EXTENSION: &str = ".jpg";

/// Configuration for [`AssetLocalizer`].
#[derive(Debug, Clone)]
pub struct AssetConfig {
    /// Root under which `{guide_name}/images/` is created.
    pub output_dir: PathBuf,
    /// When set, rewritten `src` attributes point here instead of the local
    /// relative path.
    pub cdn_base: Option<String>,
    /// Skip images whose URL contains one of `skip_patterns`.
    pub skip_ui: bool,
    pub skip_patterns: Vec<String>,
    pub delay: Duration,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            cdn_base: None,
            skip_ui: true,
            skip_patterns: UI_CHROME_PATTERNS.iter().map(|p| p.to_string()).collect(),
            delay: DEFAULT_DOWNLOAD_DELAY,
        }
    }
}

impl AssetConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_cdn_base(mut self, base: Option<String>) -> Self {
        self.cdn_base = base.map(|b| b.trim_end_matches('/').to_string());
        self
    }

    pub fn with_skip_ui(mut self, skip: bool) -> Self {
        self.skip_ui = skip;
        self
    }

    pub fn with_skip_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn is_ui_image(&self, url: &str) -> bool {
        self.skip_ui && self.skip_patterns.iter().any(|p| url.contains(p.as_str()))
    }
}

/// Insertion-ordered map from absolute image URL to `images/image_NNN.ext`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMapping {
    entries: Vec<(String, String)>,
}

impl ImageMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `url → local`. A URL seen again keeps its position and takes
    /// the newer local path.
    pub fn insert(&mut self, url: impl Into<String>, local: impl Into<String>) {
        let url = url.into();
        let local = local.into();
        match self.entries.iter_mut().find(|(u, _)| *u == url) {
            Some(entry) => entry.1 = local,
            None => self.entries.push((url, local)),
        }
    }

    pub fn get(&self, url: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, local)| local.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(u, l)| (u.as_str(), l.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Downloads images and rewrites `img` references in place.
pub struct AssetLocalizer<'a> {
    config: AssetConfig,
    source: &'a dyn ImageSource,
}

impl<'a> AssetLocalizer<'a> {
    pub fn new(config: AssetConfig, source: &'a dyn ImageSource) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &AssetConfig {
        &self.config
    }

    /// Localize every `img` in `dom`.
    ///
    /// `page_url` resolves root-relative references; `guide_name` is the
    /// directory under `output_dir` that receives the files.
    pub fn localize(&self, dom: &mut ArenaDom, page_url: &str, guide_name: &str) -> ImageMapping {
        let images_dir = self.config.output_dir.join(guide_name).join("images");
        let base = Url::parse(page_url).ok();
        let mut mapping = ImageMapping::new();
        let mut counter = 1usize;

        for img in Query::tag("img").all(dom) {
            let Some(src) = dom.get_attr(img, "src").filter(|s| !s.is_empty()) else {
                continue;
            };
            let Some(url) = normalize_url(src, base.as_ref()) else {
                debug!("Skipping non-HTTP image reference: {src}");
                continue;
            };

            if self.config.is_ui_image(&url) {
                info!("Skipping UI image: {url}");
                continue;
            }

            let file_name = format!("image_{counter:03}{}", extension_from_url(&url));
            info!("Downloading image {counter}: {url}");

            match self.download(&url, &images_dir.join(&file_name)) {
                Ok(()) => {
                    let local = format!("images/{file_name}");
                    let new_src = match &self.config.cdn_base {
                        Some(cdn) => format!("{cdn}/{guide_name}/{local}"),
                        None => local.clone(),
                    };
                    dom.set_attr(img, "src", &new_src);
                    mapping.insert(url, local);
                    counter += 1;
                }
                Err(e) => warn!("{e}"),
            }
        }

        mapping
    }

    fn download(&self, url: &str, path: &Path) -> Result<()> {
        if !self.config.delay.is_zero() {
            thread::sleep(self.config.delay);
        }
        let bytes = self.source.fetch_image(url)?;
        write_file(path, &bytes).map_err(|e| Error::ImageDownload {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)
}

/// Turn an `img` `src` into an absolute HTTP(S) URL.
///
/// Protocol-relative references get `https:`; root-relative ones are joined
/// onto the page origin. Anything else that is not already `http...` yields
/// `None`.
fn normalize_url(src: &str, base: Option<&Url>) -> Option<String> {
    if let Some(rest) = src.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if src.starts_with('/') {
        return base.and_then(|b| b.join(src).ok()).map(String::from);
    }
    src.starts_with("http").then(|| src.to_string())
}

/// File extension (with dot) of the URL path, ignoring the query.
fn extension_from_url(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    // Only the last segment counts; a path ending in `/` has no file name.
    let file_name = path.rsplit('/').next().unwrap_or_default();
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => format!(".{ext}"),
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use tempfile::TempDir;

    use super::*;
    use crate::dom::parse_html;

    /// Serves fixed bytes, failing for URLs containing `fail`.
    #[derive(Default)]
    struct FakeSource {
        requested: RefCell<Vec<String>>,
    }

    impl ImageSource for FakeSource {
        fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
            self.requested.borrow_mut().push(url.to_string());
            if url.contains("fail") {
                return Err(Error::ImageDownload {
                    url: url.to_string(),
                    message: "404 Not Found".into(),
                });
            }
            Ok(format!("bytes of {url}").into_bytes())
        }
    }

    fn config(dir: &TempDir) -> AssetConfig {
        AssetConfig::new(dir.path()).with_delay(Duration::ZERO)
    }

    fn srcs(dom: &ArenaDom) -> Vec<String> {
        Query::tag("img")
            .all(dom)
            .into_iter()
            .map(|img| dom.get_attr(img, "src").unwrap_or_default().to_string())
            .collect()
    }

    const PAGE_URL: &str = "https://steamcommunity.com/sharedfiles/filedetails/?id=1";

    #[test]
    fn test_protocol_relative_scenario() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource::default();
        let mut dom = parse_html(r#"<img src="//foo.com/bar.png">"#);

        let mapping = AssetLocalizer::new(config(&dir), &source).localize(&mut dom, PAGE_URL, "G");

        assert_eq!(srcs(&dom), ["images/image_001.png"]);
        assert_eq!(mapping.get("https://foo.com/bar.png"), Some("images/image_001.png"));
        let saved = dir.path().join("G/images/image_001.png");
        assert_eq!(
            fs::read_to_string(saved).unwrap(),
            "bytes of https://foo.com/bar.png"
        );
    }

    #[test]
    fn test_sequential_numbering_skips_do_not_consume() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource::default();
        let mut dom = parse_html(
            r#"
            <img src="https://cdn.test/a.png">
            <img src="https://community.test/public/images/sharedfiles/4-star_large.png">
            <img src="https://cdn.test/fail.gif">
            <img src="data:image/png;base64,AAAA">
            <img>
            <img src="https://cdn.test/b?size=large">
            "#,
        );

        let mapping = AssetLocalizer::new(config(&dir), &source).localize(&mut dom, PAGE_URL, "G");

        assert_eq!(
            srcs(&dom),
            [
                "images/image_001.png",
                "https://community.test/public/images/sharedfiles/4-star_large.png",
                "https://cdn.test/fail.gif",
                "data:image/png;base64,AAAA",
                "",
                "images/image_002.jpg",
            ]
        );
        let locals: Vec<_> = mapping.iter().map(|(_, l)| l).collect();
        assert_eq!(locals, ["images/image_001.png", "images/image_002.jpg"]);
        assert!(!dir.path().join("G/images/image_003.gif").exists());
        // The UI image was never requested.
        assert_eq!(source.requested.borrow().len(), 3);
    }

    #[test]
    fn test_include_ui_downloads_chrome() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource::default();
        let ui = "https://avatars.fastly.steamstatic.com/abc_full.jpg";
        let mut dom = parse_html(&format!(r#"<img src="{ui}">"#));

        let cfg = config(&dir).with_skip_ui(false);
        let mapping = AssetLocalizer::new(cfg, &source).localize(&mut dom, PAGE_URL, "G");

        assert_eq!(mapping.get(ui), Some("images/image_001.jpg"));
    }

    #[test]
    fn test_custom_skip_patterns() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource::default();
        let mut dom = parse_html(r#"<img src="https://cdn.test/emoticon/smile.png">"#);

        let cfg = config(&dir).with_skip_patterns(["/emoticon/"]);
        let mapping = AssetLocalizer::new(cfg, &source).localize(&mut dom, PAGE_URL, "G");

        assert!(mapping.is_empty());
        assert_eq!(srcs(&dom), ["https://cdn.test/emoticon/smile.png"]);
    }

    #[test]
    fn test_cdn_rewrite_keeps_local_mapping() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource::default();
        let mut dom = parse_html(r#"<img src="https://cdn.test/a.webp">"#);

        let cfg = config(&dir).with_cdn_base(Some("https://media.example.org/".into()));
        let mapping = AssetLocalizer::new(cfg, &source).localize(&mut dom, PAGE_URL, "My_Guide");

        assert_eq!(
            srcs(&dom),
            ["https://media.example.org/My_Guide/images/image_001.webp"]
        );
        assert_eq!(mapping.get("https://cdn.test/a.webp"), Some("images/image_001.webp"));
    }

    #[test]
    fn test_root_relative_uses_page_origin() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource::default();
        let mut dom = parse_html(r#"<img src="/ugc/shot.jpeg">"#);

        let mapping = AssetLocalizer::new(config(&dir), &source).localize(
            &mut dom,
            "http://127.0.0.1:8080/sharedfiles/filedetails/?id=5",
            "G",
        );

        assert_eq!(
            mapping.get("http://127.0.0.1:8080/ugc/shot.jpeg"),
            Some("images/image_001.jpeg")
        );
    }

    #[test]
    fn test_normalize_url() {
        let base = Url::parse("https://steamcommunity.com/sharedfiles/x").unwrap();
        assert_eq!(
            normalize_url("//img.test/a.png", Some(&base)).as_deref(),
            Some("https://img.test/a.png")
        );
        assert_eq!(
            normalize_url("/a.png", Some(&base)).as_deref(),
            Some("https://steamcommunity.com/a.png")
        );
        assert_eq!(normalize_url("/a.png", None), None);
        assert_eq!(normalize_url("images/a.png", Some(&base)), None);
        assert_eq!(
            normalize_url("http://x.test/a", None).as_deref(),
            Some("http://x.test/a")
        );
    }

    #[test]
    fn test_extension_from_url() {
        assert_eq!(extension_from_url("https://a.test/x/y.PNG?v=2"), ".PNG");
        assert_eq!(extension_from_url("https://a.test/ugc/123/ABCDEF/"), ".jpg");
        assert_eq!(extension_from_url("https://a.test/pic.tar.gz"), ".gz");
        assert_eq!(extension_from_url("https://a.test/.hidden"), ".jpg");
        assert_eq!(extension_from_url("https://a.test/ugc/1/v1.2/"), ".jpg");
        assert_eq!(extension_from_url("https://a.test/v1.2/pic"), ".jpg");
    }

    #[test]
    fn test_mapping_reinsert_keeps_position() {
        let mut mapping = ImageMapping::new();
        mapping.insert("a", "images/image_001.png");
        mapping.insert("b", "images/image_002.png");
        mapping.insert("a", "images/image_003.png");

        let entries: Vec<_> = mapping.iter().collect();
        assert_eq!(
            entries,
            [("a", "images/image_003.png"), ("b", "images/image_002.png")]
        );
    }
}
