//! Element lookup: a small typed [`Query`] for the pruner, and compiled CSS
//! selectors for everything that needs descendant combinators.

use cssparser::{Parser, ParserInput};
use selectors::context::{MatchingContext, SelectorCaches};
use selectors::parser::{ParseRelative, Selector, SelectorList};

use super::arena::{ArenaDom, ArenaNodeId};
use super::element_ref::{ElementRef, GuideSelectors};
use crate::error::{Error, Result};

/// Match on tag name plus an optional id and an optional class token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub tag: String,
    pub id: Option<String>,
    pub class: Option<String>,
}

impl Query {
    /// Match every element with this tag.
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            class: None,
        }
    }

    /// Also require the `id` attribute to equal `id`.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Also require the class list to contain `class`.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Check whether a node satisfies this query.
    pub fn matches(&self, dom: &ArenaDom, id: ArenaNodeId) -> bool {
        if !dom.is_tag(id, &self.tag) {
            return false;
        }
        if let Some(want) = &self.id
            && dom.element_id(id) != Some(want.as_str())
        {
            return false;
        }
        if let Some(want) = &self.class
            && !dom.element_classes(id).iter().any(|c| c == want)
        {
            return false;
        }
        true
    }

    /// First attached match in document order.
    pub fn first(&self, dom: &ArenaDom) -> Option<ArenaNodeId> {
        dom.descendants(dom.document())
            .find(|&id| self.matches(dom, id))
    }

    /// All attached matches in document order.
    pub fn all(&self, dom: &ArenaDom) -> Vec<ArenaNodeId> {
        dom.descendants(dom.document())
            .filter(|&id| self.matches(dom, id))
            .collect()
    }
}

/// A compiled, comma-separated CSS selector list.
#[derive(Debug, Clone)]
pub struct CssQuery {
    selectors: Vec<Selector<GuideSelectors>>,
}

impl CssQuery {
    /// Parse a selector list such as `.workshopTags a`.
    pub fn parse(source: &str) -> Result<Self> {
        let mut input = ParserInput::new(source);
        let mut parser = Parser::new(&mut input);
        let list = SelectorList::parse(&GuideSelectors, &mut parser, ParseRelative::No)
            .map_err(|e| Error::Unknown(format!("invalid selector {source:?}: {:?}", e.kind)))?;
        Ok(Self {
            selectors: list.slice().to_vec(),
        })
    }

    /// Check whether an element matches any selector in the list.
    pub fn matches(&self, dom: &ArenaDom, id: ArenaNodeId) -> bool {
        if !dom.is_element(id) {
            return false;
        }
        let elem = ElementRef::new(dom, id);
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            selectors::matching::MatchingMode::Normal,
            None,
            &mut caches,
            selectors::context::QuirksMode::NoQuirks,
            selectors::matching::NeedsSelectorFlags::No,
            selectors::matching::MatchingForInvalidation::No,
        );
        self.selectors.iter().any(|selector| {
            selectors::matching::matches_selector(selector, 0, None, &elem, &mut context)
        })
    }

    /// First attached match in document order.
    pub fn first(&self, dom: &ArenaDom) -> Option<ArenaNodeId> {
        dom.descendants(dom.document())
            .find(|&id| self.matches(dom, id))
    }

    /// All attached matches in document order.
    pub fn all(&self, dom: &ArenaDom) -> Vec<ArenaNodeId> {
        dom.descendants(dom.document())
            .filter(|&id| self.matches(dom, id))
            .collect()
    }
}

/// Parse `selector` and return its first match.
pub fn select_first(dom: &ArenaDom, selector: &str) -> Result<Option<ArenaNodeId>> {
    Ok(CssQuery::parse(selector)?.first(dom))
}

/// Parse `selector` and return every match in document order.
pub fn select_all(dom: &ArenaDom, selector: &str) -> Result<Vec<ArenaNodeId>> {
    Ok(CssQuery::parse(selector)?.all(dom))
}
