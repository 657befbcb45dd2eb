//! Removal of navigation and boilerplate `div`s.
//!
//! A single pruner serves both output modes: the HTML cleaner runs it with a
//! user-supplied [`PruneList`], the Markdown converter with
//! [`PruneList::chrome`].

use tracing::{info, warn};

use crate::dom::{ArenaDom, Query};

/// Element ids removed by default in HTML-cleaning mode.
pub const DEFAULT_IDS: &[&str] = &["global_header", "-1"];

/// Ids of Steam page chrome removed before Markdown conversion.
const CHROME_IDS: &[&str] = &["global_header", "-1", "footer", "ScrollingItemControls"];

/// Classes of Steam page chrome removed before Markdown conversion.
const CHROME_CLASSES: &[&str] = &[
    "responsive_header",
    "responsive_page_menu_ctn",
    "breadcrumbs",
    "apphub_HeaderTop",
    "apphub_sectionTabs",
    "rightContents",
    "sidebar",
    "footer",
    "workshopItemControls",
    "ratingSection",
    "workshopItemControlCtn",
];

/// Which `div`s to remove.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneList {
    /// For each id, the first `div` carrying it is removed.
    pub ids: Vec<String>,
    /// For each class token, every `div` carrying it is removed.
    pub classes: Vec<String>,
}

impl PruneList {
    pub fn new<I, C>(ids: I, classes: C) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    /// The Steam navigation, sidebar, footer and rating chrome.
    pub fn chrome() -> Self {
        Self::new(CHROME_IDS.iter().copied(), CHROME_CLASSES.iter().copied())
    }
}

/// Outcome of a pruning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Number of subtrees detached.
    pub removed: usize,
    /// Ids and classes that matched nothing, in the order they were tried.
    pub missing: Vec<String>,
}

/// Detach the `div`s named by `list` from the document.
///
/// Ids are processed before classes, each list in its given order. A name
/// that matches nothing is logged and skipped.
pub fn prune(dom: &mut ArenaDom, list: &PruneList) -> PruneReport {
    let mut report = PruneReport::default();

    for id in &list.ids {
        match Query::tag("div").with_id(id.as_str()).first(dom) {
            Some(node) => {
                dom.detach(node);
                report.removed += 1;
                info!("Removed div with ID: {id}");
            }
            None => {
                warn!("Div with ID '{id}' not found.");
                report.missing.push(id.clone());
            }
        }
    }

    for class in &list.classes {
        let matches = Query::tag("div").with_class(class.as_str()).all(dom);
        if matches.is_empty() {
            warn!("Div with class '{class}' not found.");
            report.missing.push(class.clone());
            continue;
        }
        for (i, node) in matches.into_iter().enumerate() {
            dom.detach(node);
            report.removed += 1;
            info!("Removed div with class '{class}' (occurrence {})", i + 1);
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_html, select_all, to_pretty_html};

    #[test]
    fn test_scenario_ids_and_classes() {
        let mut dom = parse_html(
            r#"<div id="global_header">A</div><div class="x">B</div><div class="x">C</div><p>D</p>"#,
        );

        let report = prune(&mut dom, &PruneList::new(["global_header"], ["x"]));

        let html = to_pretty_html(&dom);
        assert!(!html.contains('A'));
        assert!(!html.contains('B'));
        assert!(!html.contains('C'));
        assert!(html.contains('D'));
        assert_eq!(report.removed, 3);
        assert!(report.missing.is_empty());
    }

    #[test]
    fn test_absent_names_are_a_no_op() {
        let source = r#"<div id="keep">1</div><div class="stay">2</div>"#;
        let mut pruned = parse_html(source);
        let untouched = parse_html(source);

        let report = prune(&mut pruned, &PruneList::new(["nope", "-1"], ["ghost"]));

        assert_eq!(to_pretty_html(&pruned), to_pretty_html(&untouched));
        assert_eq!(report.removed, 0);
        assert_eq!(report.missing, ["nope", "-1", "ghost"]);
    }

    #[test]
    fn test_class_pruning_removes_every_match() {
        let mut dom = parse_html(
            r#"<div class="ad">1</div><section><div class="big ad">2</div></section><div class="ad"><div class="ad">3</div></div>"#,
        );
        let before = select_all(&dom, "div.ad").unwrap().len();
        assert_eq!(before, 4);

        let report = prune(&mut dom, &PruneList::new(Vec::<String>::new(), ["ad"]));

        assert_eq!(report.removed, before);
        assert!(select_all(&dom, "div.ad").unwrap().is_empty());
    }

    #[test]
    fn test_id_pruning_takes_first_only() {
        let mut dom = parse_html(r#"<div id="dup">one</div><div id="dup">two</div>"#);

        prune(&mut dom, &PruneList::new(["dup"], Vec::<String>::new()));

        let html = to_pretty_html(&dom);
        assert!(!html.contains("one"));
        assert!(html.contains("two"));
    }

    #[test]
    fn test_only_divs_are_pruned() {
        let mut dom = parse_html(r#"<span class="footer">s</span><div class="footer">d</div>"#);

        prune(&mut dom, &PruneList::new(Vec::<String>::new(), ["footer"]));

        assert!(Query::tag("span").with_class("footer").first(&dom).is_some());
        assert!(Query::tag("div").with_class("footer").first(&dom).is_none());
    }

    #[test]
    fn test_ids_run_before_classes() {
        // An id nested in a class target is still found.
        let mut dom = parse_html(r#"<div class="outer"><div id="inner">x</div></div>"#);

        let report = prune(&mut dom, &PruneList::new(["inner"], ["outer"]));

        assert_eq!(report.removed, 2);
        assert!(report.missing.is_empty());
    }

    #[test]
    fn test_chrome_list() {
        let chrome = PruneList::chrome();
        assert!(chrome.ids.iter().any(|i| i == "global_header"));
        assert!(chrome.classes.iter().any(|c| c == "ratingSection"));
        assert_eq!(chrome.ids.len(), CHROME_IDS.len());
    }
}
