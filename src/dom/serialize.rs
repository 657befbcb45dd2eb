//! HTML serialization of an [`ArenaDom`].
//!
//! [`to_pretty_html`] writes one node per line with a single space of
//! indentation per depth, the layout people expect from a "prettified" page
//! dump. Whitespace-sensitive elements (`pre`, `textarea`) and raw-text
//! elements (`script`, `style`) are written compactly so their content
//! survives unchanged.

use std::fmt::Write;

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId};

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text is emitted without entity escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

/// Elements whose whitespace is significant.
const PRESERVE_WHITESPACE: &[&str] = &["pre", "textarea"];

/// Serialize the whole document with one node per line.
pub fn to_pretty_html(dom: &ArenaDom) -> String {
    let mut ctx = PrettyContext {
        dom,
        out: String::new(),
        depth: 0,
    };
    for child in dom.children(dom.document()) {
        ctx.walk(child);
    }
    ctx.out
}

/// Serialize a node and its subtree without added whitespace.
pub fn outer_html(dom: &ArenaDom, id: ArenaNodeId) -> String {
    let mut out = String::new();
    write_compact(dom, id, &mut out, false);
    out
}

/// Serialize the children of a node without added whitespace.
pub fn inner_html(dom: &ArenaDom, id: ArenaNodeId) -> String {
    let mut out = String::new();
    let raw = is_raw_text(dom, id);
    for child in dom.children(id) {
        write_compact(dom, child, &mut out, raw);
    }
    out
}

struct PrettyContext<'a> {
    dom: &'a ArenaDom,
    out: String,
    depth: usize,
}

impl PrettyContext<'_> {
    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push(' ');
        }
    }

    fn line(&mut self, content: &str) {
        self.indent();
        self.out.push_str(content);
        self.out.push('\n');
    }

    fn walk(&mut self, id: ArenaNodeId) {
        let Some(node) = self.dom.get(id) else {
            return;
        };

        match &node.data {
            ArenaNodeData::Document => {
                for child in self.dom.children(id) {
                    self.walk(child);
                }
            }
            ArenaNodeData::Doctype { name, .. } => {
                let line = format!("<!DOCTYPE {name}>");
                self.line(&line);
            }
            ArenaNodeData::Comment(text) => {
                let line = format!("<!--{text}-->");
                self.line(&line);
            }
            ArenaNodeData::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    let escaped = escape_text(trimmed);
                    self.line(&escaped);
                }
            }
            ArenaNodeData::Element { name, .. } => {
                let tag = name.local.as_ref();
                let open = start_tag(self.dom, id);

                if VOID_ELEMENTS.contains(&tag) {
                    self.line(&open);
                    return;
                }

                if PRESERVE_WHITESPACE.contains(&tag) || RAW_TEXT_ELEMENTS.contains(&tag) {
                    let inline = format!("{open}{}</{tag}>", inner_html(self.dom, id));
                    self.line(&inline);
                    return;
                }

                self.line(&open);
                self.depth += 1;
                for child in self.dom.children(id) {
                    self.walk(child);
                }
                self.depth -= 1;
                let close = format!("</{tag}>");
                self.line(&close);
            }
        }
    }
}

fn write_compact(dom: &ArenaDom, id: ArenaNodeId, out: &mut String, raw: bool) {
    let Some(node) = dom.get(id) else {
        return;
    };

    match &node.data {
        ArenaNodeData::Document => {
            for child in dom.children(id) {
                write_compact(dom, child, out, false);
            }
        }
        ArenaNodeData::Doctype { name, .. } => {
            let _ = write!(out, "<!DOCTYPE {name}>");
        }
        ArenaNodeData::Comment(text) => {
            let _ = write!(out, "<!--{text}-->");
        }
        ArenaNodeData::Text(text) => {
            if raw {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        ArenaNodeData::Element { name, .. } => {
            let tag = name.local.as_ref();
            out.push_str(&start_tag(dom, id));
            if VOID_ELEMENTS.contains(&tag) {
                return;
            }
            let raw_children = RAW_TEXT_ELEMENTS.contains(&tag);
            for child in dom.children(id) {
                write_compact(dom, child, out, raw_children);
            }
            let _ = write!(out, "</{tag}>");
        }
    }
}

fn is_raw_text(dom: &ArenaDom, id: ArenaNodeId) -> bool {
    dom.element_name(id)
        .is_some_and(|n| RAW_TEXT_ELEMENTS.contains(&n.as_ref()))
}

/// Build the opening tag, closing void elements with `/>`.
fn start_tag(dom: &ArenaDom, id: ArenaNodeId) -> String {
    let Some(tag) = dom.element_name(id) else {
        return String::new();
    };
    let mut out = format!("<{tag}");
    for attr in dom.attrs(id) {
        let name = match &attr.name.prefix {
            Some(prefix) => format!("{prefix}:{}", attr.name.local),
            None => attr.name.local.to_string(),
        };
        let _ = write!(out, " {name}=\"{}\"", escape_attr(&attr.value));
    }
    if VOID_ELEMENTS.contains(&tag.as_ref()) {
        out.push_str("/>");
    } else {
        out.push('>');
    }
    out
}

/// Escape text content.
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape a double-quoted attribute value.
pub fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}
