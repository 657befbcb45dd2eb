//! Markdown mode: guide page → `{output_dir}/{guide}/index.md` plus images.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::assets::{AssetConfig, AssetLocalizer, DEFAULT_DOWNLOAD_DELAY, UI_CHROME_PATTERNS};
use crate::dom::{Query, parse_html};
use crate::error::Result;
use crate::fetch::{Fetcher, ImageSource};
use crate::markdown::convert_guide;
use crate::metadata::{GuideMetadata, extract_metadata};
use crate::util::sanitize_filename;

/// Default root directory for converted guides.
pub const DEFAULT_OUTPUT_DIR: &str = "./steam_guides";

/// Directory name used when the guide has no usable title.
pub const UNTITLED_GUIDE: &str = "Untitled_Guide";

/// Configuration for [`GuideConverter`].
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub output_dir: PathBuf,
    pub cdn_base: Option<String>,
    pub skip_ui: bool,
    pub skip_patterns: Vec<String>,
    pub delay: Duration,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            cdn_base: None,
            skip_ui: true,
            skip_patterns: UI_CHROME_PATTERNS.iter().map(|p| p.to_string()).collect(),
            delay: DEFAULT_DOWNLOAD_DELAY,
        }
    }
}

impl ConvertConfig {
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_cdn_base(mut self, base: Option<String>) -> Self {
        self.cdn_base = base;
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

    fn asset_config(&self) -> AssetConfig {
        AssetConfig::new(&self.output_dir)
            .with_cdn_base(self.cdn_base.clone())
            .with_skip_ui(self.skip_ui)
            .with_skip_patterns(self.skip_patterns.iter().cloned())
            .with_delay(self.delay)
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConvertOutcome {
    /// Path of the written `index.md`.
    pub path: PathBuf,
    pub guide_name: String,
    /// Number of distinct images downloaded.
    pub images: usize,
    pub metadata: GuideMetadata,
}

/// Directory name for a guide: the sanitized title, or [`UNTITLED_GUIDE`].
pub fn guide_name(title: Option<&str>) -> String {
    title
        .map(sanitize_filename)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNTITLED_GUIDE.to_string())
}

/// Convert already-fetched guide HTML, downloading images through `images`.
pub fn convert_page(
    config: &ConvertConfig,
    html: &str,
    url: &str,
    images: &dyn ImageSource,
) -> Result<ConvertOutcome> {
    let mut dom = parse_html(html);

    let title = Query::tag("div")
        .with_class("workshopItemTitle")
        .first(&dom)
        .map(|node| dom.text_of(node).trim().to_string());
    let guide_name = guide_name(title.as_deref());
    let guide_dir = config.output_dir.join(&guide_name);
    fs::create_dir_all(&guide_dir)?;

    let mapping =
        AssetLocalizer::new(config.asset_config(), images).localize(&mut dom, url, &guide_name);
    let metadata = extract_metadata(&dom, url)?;
    let body = convert_guide(&mut dom, &mapping)?;

    let path = guide_dir.join("index.md");
    fs::write(&path, format!("{}\n{body}", metadata.to_front_matter()))?;

    info!("Guide saved to: {}", path.display());
    info!("Images downloaded: {}", mapping.len());

    Ok(ConvertOutcome {
        path,
        guide_name,
        images: mapping.len(),
        metadata,
    })
}

/// Fetches guides and converts them to Markdown.
pub struct GuideConverter {
    config: ConvertConfig,
    fetcher: Fetcher,
}

impl GuideConverter {
    pub fn new(config: ConvertConfig) -> Result<Self> {
        Ok(Self::with_fetcher(config, Fetcher::new()?))
    }

    pub fn with_fetcher(config: ConvertConfig, fetcher: Fetcher) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Fetch and convert the guide at `url`.
    pub fn process(&self, url: &str) -> Result<ConvertOutcome> {
        info!("Processing: {url}");
        let html = self.fetcher.fetch_page(url)?;
        convert_page(&self.config, &html, url, &self.fetcher)
    }

    /// Fetch the guide at `url` and return its metadata without writing
    /// anything.
    pub fn info(&self, url: &str) -> Result<GuideMetadata> {
        let html = self.fetcher.fetch_page(url)?;
        extract_metadata(&parse_html(&html), url)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::error::Error;

    struct PixelSource;

    impl ImageSource for PixelSource {
        fn fetch_image(&self, _url: &str) -> Result<Vec<u8>> {
            Ok(vec![0x89, b'P', b'N', b'G'])
        }
    }

    fn config(dir: &TempDir) -> ConvertConfig {
        ConvertConfig::default()
            .with_output_dir(dir.path())
            .with_delay(Duration::ZERO)
    }

    const URL: &str = "https://steamcommunity.com/sharedfiles/filedetails/?id=77";

    #[test]
    fn test_guide_name() {
        assert_eq!(guide_name(Some("My: Guide / Test")), "My_Guide_Test");
        assert_eq!(guide_name(Some("///")), UNTITLED_GUIDE);
        assert_eq!(guide_name(None), UNTITLED_GUIDE);
    }

    #[test]
    fn test_convert_page_writes_index() {
        let dir = TempDir::new().unwrap();
        let html = r#"
            <div class="workshopItemTitle">Boss Guide</div>
            <div class="guide subSections">
              <div class="subSectionTitle">Phase one</div>
              <div class="subSectionDesc">Dodge left.<img src="https://cdn.test/p1.png"></div>
            </div>"#;

        let outcome = convert_page(&config(&dir), html, URL, &PixelSource).unwrap();

        assert_eq!(outcome.path, dir.path().join("Boss_Guide/index.md"));
        assert_eq!(outcome.images, 1);
        assert!(dir.path().join("Boss_Guide/images/image_001.png").exists());

        let written = fs::read_to_string(&outcome.path).unwrap();
        assert!(written.starts_with("---\n"));
        assert!(written.contains("steam_guide_id: '77'\n"));
        assert!(written.contains("title: Boss Guide\n---\n\n## Phase one\n"));
        assert!(written.contains("Dodge left.![](images/image_001.png)"));
        assert!(!written.contains("cdn.test"));
    }

    #[test]
    fn test_untitled_guide_directory() {
        let dir = TempDir::new().unwrap();
        let html = r#"<div id="profileBlock"><p>Only text</p></div>"#;

        let outcome = convert_page(&config(&dir), html, URL, &PixelSource).unwrap();

        assert_eq!(outcome.guide_name, UNTITLED_GUIDE);
        assert!(dir.path().join("Untitled_Guide/index.md").exists());
    }

    #[test]
    fn test_missing_content_fails_without_index() {
        let dir = TempDir::new().unwrap();
        let html = r#"<div class="workshopItemTitle">Empty</div>"#;

        let err = convert_page(&config(&dir), html, URL, &PixelSource).unwrap_err();

        assert!(matches!(err, Error::ContentNotFound(_)));
        assert!(!dir.path().join("Empty/index.md").exists());
    }
}
