//! HTML-cleaning mode: fetch a page, prune it, write pretty-printed HTML.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::dom::{Query, parse_html, to_pretty_html};
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::prune::{DEFAULT_IDS, PruneList, PruneReport, prune};
use crate::util::sanitize_filename;

/// Output file used when no path is given and the page has no title.
pub const DEFAULT_HTML_OUTPUT: &str = "cleaned_page.html";

/// Configuration for [`PageCleaner`].
#[derive(Debug, Clone)]
pub struct CleanConfig {
    pub prune: PruneList,
    /// Explicit output file. When unset the name is derived from the title.
    pub output: Option<PathBuf>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            prune: PruneList::new(DEFAULT_IDS.iter().copied(), Vec::<String>::new()),
            output: None,
        }
    }
}

impl CleanConfig {
    pub fn with_prune_list(mut self, prune: PruneList) -> Self {
        self.prune = prune;
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }
}

/// A pruned, re-serialized page.
#[derive(Debug, Clone)]
pub struct CleanedPage {
    pub html: String,
    /// Trimmed text of the first `div.workshopItemTitle`, if any.
    pub title: Option<String>,
    pub report: PruneReport,
}

impl CleanedPage {
    /// Where to write the page: `explicit` if given, else
    /// `{sanitized title}.html`, else [`DEFAULT_HTML_OUTPUT`].
    pub fn output_path(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        self.title
            .as_deref()
            .map(sanitize_filename)
            .filter(|name| !name.is_empty())
            .map(|name| PathBuf::from(format!("{name}.html")))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_HTML_OUTPUT))
    }
}

/// Parse `html`, remove the divs named by `list` and pretty-print the rest.
pub fn clean_html(html: &str, list: &PruneList) -> CleanedPage {
    let mut dom = parse_html(html);
    let title = Query::tag("div")
        .with_class("workshopItemTitle")
        .first(&dom)
        .map(|node| dom.text_of(node).trim().to_string());
    let report = prune(&mut dom, list);
    CleanedPage {
        html: to_pretty_html(&dom),
        title,
        report,
    }
}

/// Fetches a page and writes a cleaned copy.
pub struct PageCleaner {
    config: CleanConfig,
    fetcher: Fetcher,
}

impl PageCleaner {
    pub fn new(config: CleanConfig) -> Result<Self> {
        Ok(Self::with_fetcher(config, Fetcher::new()?))
    }

    pub fn with_fetcher(config: CleanConfig, fetcher: Fetcher) -> Self {
        Self { config, fetcher }
    }

    /// Fetch `url`, clean it and write it out, returning the written path.
    pub fn process(&self, url: &str) -> Result<PathBuf> {
        info!("Processing URL: {url}");
        info!("Attempting to remove divs with IDs: {:?}", self.config.prune.ids);
        if !self.config.prune.classes.is_empty() {
            info!(
                "Attempting to remove divs with classes: {:?}",
                self.config.prune.classes
            );
        }

        let html = self.fetcher.fetch_page(url)?;
        let page = clean_html(&html, &self.config.prune);
        let path = page.output_path(self.config.output.as_deref());
        fs::write(&path, &page.html)?;

        info!(
            "Page downloaded and cleaned successfully. Saved as {}",
            path.display()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_html_prunes_and_keeps_title() {
        let page = clean_html(
            r#"<div id="global_header">nav</div>
               <div class="workshopItemTitle"> My: Guide / Test </div>
               <p>body</p>"#,
            &CleanConfig::default().prune,
        );

        assert!(!page.html.contains("nav"));
        assert!(page.html.contains("body"));
        assert_eq!(page.title.as_deref(), Some("My: Guide / Test"));
        assert_eq!(page.report.removed, 1);
        assert_eq!(page.report.missing, ["-1"]);
    }

    #[test]
    fn test_output_path_resolution() {
        let mut page = clean_html("<p>x</p>", &PruneList::default());
        assert_eq!(page.title, None);
        assert_eq!(page.output_path(None), PathBuf::from(DEFAULT_HTML_OUTPUT));

        page.title = Some("My: Guide / Test".into());
        assert_eq!(page.output_path(None), PathBuf::from("My_Guide_Test.html"));
        assert_eq!(
            page.output_path(Some(Path::new("out/page.html"))),
            PathBuf::from("out/page.html")
        );

        page.title = Some("???".into());
        assert_eq!(page.output_path(None), PathBuf::from(DEFAULT_HTML_OUTPUT));
    }

    #[test]
    fn test_default_config() {
        let config = CleanConfig::default();
        assert_eq!(config.prune.ids, ["global_header", "-1"]);
        assert!(config.prune.classes.is_empty());
        assert_eq!(config.output, None);
    }
}
