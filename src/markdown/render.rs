//! Arena DOM → Markdown rendering.
//!
//! A single depth-first walk over the subtree, accumulating output in a
//! [`RenderContext`]. Block elements are separated by blank lines; list items
//! and blockquotes carry a line prefix that is written lazily at the start of
//! each content line. Text is whitespace-normalized but not escaped.

use crate::dom::{ArenaDom, ArenaNodeData, ArenaNodeId};

use super::fence::{fence_length, inline_code_ticks};

/// Elements whose content never reaches the output.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements rendered as a paragraph-like block.
const BLOCK_TAGS: &[&str] = &[
    "p",
    "div",
    "section",
    "article",
    "header",
    "footer",
    "main",
    "nav",
    "aside",
    "figure",
    "figcaption",
    "center",
    "address",
    "details",
    "summary",
    "dl",
    "dt",
    "dd",
    "form",
    "fieldset",
];

/// Tracks list context for numbering.
#[derive(Debug, Clone)]
struct ListContext {
    is_ordered: bool,
    /// Number of the last item written.
    counter: usize,
}

/// Context for rendering (pure string accumulation, no I/O).
pub struct RenderContext<'a> {
    dom: &'a ArenaDom,
    output: String,
    // Formatting state
    line_prefix: String,
    list_stack: Vec<ListContext>,
    at_line_start: bool,
    /// The current line holds text that a following space should separate from.
    has_line_content: bool,
    /// A block ended; the next content starts after a blank line.
    pending_newline: bool,
    /// Collapsed whitespace to emit before the next inline content.
    pending_space: bool,
    in_heading: bool,
}

impl<'a> RenderContext<'a> {
    pub fn new(dom: &'a ArenaDom) -> Self {
        Self {
            dom,
            output: String::new(),
            line_prefix: String::new(),
            list_stack: Vec::new(),
            at_line_start: true,
            has_line_content: false,
            pending_newline: false,
            pending_space: false,
            in_heading: false,
        }
    }

    /// Render the subtree rooted at `root` (the root included).
    pub fn render(mut self, root: ArenaNodeId) -> String {
        self.walk_node(root);
        if !self.at_line_start {
            self.write_newline();
        }
        self.output
    }

    /// Write the line prefix if nothing has been written on this line yet.
    fn ensure_line_started(&mut self) {
        if self.at_line_start {
            self.output.push_str(&self.line_prefix);
            self.at_line_start = false;
        }
    }

    fn write_newline(&mut self) {
        let kept = self.output.trim_end_matches(' ').len();
        self.output.truncate(kept);
        self.output.push('\n');
        self.at_line_start = true;
        self.has_line_content = false;
        self.pending_space = false;
    }

    fn write_blank_line(&mut self) {
        self.output.push_str(self.line_prefix.trim_end());
        self.output.push('\n');
    }

    /// Two trailing spaces and a newline.
    fn write_hard_break(&mut self) {
        if self.has_line_content {
            let kept = self.output.trim_end_matches(' ').len();
            self.output.truncate(kept);
            self.output.push_str("  \n");
            self.at_line_start = true;
            self.has_line_content = false;
            self.pending_space = false;
        } else if self.at_line_start && !self.output.is_empty() {
            self.write_blank_line();
        }
    }

    /// Start a new block element.
    fn start_block(&mut self) {
        if self.has_line_content {
            self.write_newline();
            self.pending_newline = true;
        }
        if self.pending_newline {
            if self.at_line_start && !self.output.is_empty() {
                self.write_blank_line();
            }
            self.pending_newline = false;
        }
        self.pending_space = false;
    }

    /// End a block element.
    fn end_block(&mut self) {
        self.pending_newline = true;
    }

    /// Prepare to write inline content on the current line.
    fn begin_inline(&mut self) {
        if self.pending_newline {
            self.start_block();
        }
        if self.pending_space && self.has_line_content {
            self.output.push(' ');
        }
        self.pending_space = false;
        self.ensure_line_started();
    }

    fn walk_node(&mut self, id: ArenaNodeId) {
        let dom = self.dom;
        let Some(node) = dom.get(id) else {
            return;
        };

        match &node.data {
            ArenaNodeData::Document => self.walk_children(id),
            ArenaNodeData::Text(text) => self.write_text(text),
            ArenaNodeData::Element { name, .. } => self.walk_element(id, name.local.as_ref()),
            ArenaNodeData::Comment(_) | ArenaNodeData::Doctype { .. } => {}
        }
    }

    fn walk_element(&mut self, id: ArenaNodeId, tag: &str) {
        let dom = self.dom;

        match tag {
            t if SKIPPED_TAGS.contains(&t) => {}

            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = usize::from(tag.as_bytes()[1] - b'0');
                self.write_heading(id, level);
            }

            t if BLOCK_TAGS.contains(&t) => {
                if let Some(level) = steam_heading_level(dom, id) {
                    self.write_heading(id, level);
                    return;
                }
                self.start_block();
                self.walk_children(id);
                self.end_block();
            }

            "ul" | "ol" => {
                if self.list_stack.is_empty() {
                    self.start_block();
                } else {
                    // Nested lists stay tight under their parent item.
                    if self.has_line_content {
                        self.write_newline();
                    }
                    self.pending_newline = false;
                }
                let start = if tag == "ol" {
                    dom.get_attr(id, "start")
                        .and_then(|s| s.trim().parse::<usize>().ok())
                        .unwrap_or(1)
                } else {
                    1
                };
                self.list_stack.push(ListContext {
                    is_ordered: tag == "ol",
                    counter: start.saturating_sub(1),
                });
                self.walk_children(id);
                self.list_stack.pop();
                self.end_block();
            }

            "li" => {
                if !self.at_line_start {
                    self.write_newline();
                }
                self.pending_newline = false;
                self.pending_space = false;
                self.ensure_line_started();

                let bullet = match self.list_stack.last_mut() {
                    Some(ctx) if ctx.is_ordered => {
                        ctx.counter += 1;
                        format!("{}. ", ctx.counter)
                    }
                    _ => "- ".to_string(),
                };
                self.output.push_str(&bullet);

                let old_prefix = self.line_prefix.clone();
                self.line_prefix.push_str(&" ".repeat(bullet.len()));
                self.walk_children(id);
                self.line_prefix = old_prefix;
                self.pending_newline = false;
            }

            "blockquote" => {
                self.start_block();
                let old_prefix = self.line_prefix.clone();
                self.line_prefix.push_str("> ");
                self.walk_children(id);
                self.line_prefix = old_prefix;
                self.end_block();
            }

            "pre" => self.write_code_block(id),

            "table" => self.write_table(id),

            "hr" => {
                self.start_block();
                self.ensure_line_started();
                self.output.push_str("---");
                self.has_line_content = true;
                self.end_block();
            }

            "br" => {
                if self.in_heading {
                    self.pending_space = true;
                } else {
                    self.write_hard_break();
                }
            }

            "b" | "strong" => self.wrap_inline(id, "**"),
            "i" | "em" => self.wrap_inline(id, "*"),
            "s" | "strike" | "del" => self.wrap_inline(id, "~~"),

            "code" | "kbd" | "samp" | "tt" => {
                let text = dom.text_of(id).replace('\n', " ");
                if text.is_empty() {
                    return;
                }
                let ticks = "`".repeat(inline_code_ticks(&text));
                let spacer = if text.starts_with('`') || text.ends_with('`') {
                    " "
                } else {
                    ""
                };
                self.begin_inline();
                self.output
                    .push_str(&format!("{ticks}{spacer}{text}{spacer}{ticks}"));
                self.has_line_content = true;
            }

            "a" => {
                let href = dom.get_attr(id, "href").map(str::trim).unwrap_or_default();
                if href.is_empty() {
                    self.walk_children(id);
                    return;
                }
                if dom.text_of(id).starts_with(char::is_whitespace) {
                    self.pending_space = true;
                }
                self.begin_inline();
                self.output.push('[');
                self.has_line_content = false;
                self.walk_children(id);
                self.output.push_str("](");
                self.output.push_str(href);
                self.output.push(')');
                self.has_line_content = true;
            }

            "img" => {
                let Some(src) = dom.get_attr(id, "src").filter(|s| !s.is_empty()) else {
                    return;
                };
                let alt = dom
                    .get_attr(id, "alt")
                    .map(|a| a.split_whitespace().collect::<Vec<_>>().join(" "))
                    .unwrap_or_default();
                self.begin_inline();
                self.output.push_str(&format!("![{alt}]({src})"));
                self.has_line_content = true;
            }

            _ => self.walk_children(id),
        }
    }

    fn walk_children(&mut self, id: ArenaNodeId) {
        let dom = self.dom;
        for child in dom.children(id) {
            self.walk_node(child);
        }
    }

    fn write_text(&mut self, text: &str) {
        let leading = text.starts_with(char::is_whitespace);
        let trailing = text.ends_with(char::is_whitespace);

        let mut words = text.split_whitespace().peekable();
        if words.peek().is_none() {
            if !text.is_empty() {
                self.pending_space = true;
            }
            return;
        }

        if leading {
            self.pending_space = true;
        }
        self.begin_inline();
        for (i, word) in words.enumerate() {
            if i > 0 {
                self.output.push(' ');
            }
            self.output.push_str(word);
        }
        self.has_line_content = true;
        self.pending_space = trailing;
    }

    fn write_heading(&mut self, id: ArenaNodeId, level: usize) {
        if self.dom.text_of(id).trim().is_empty() {
            return;
        }
        self.start_block();
        self.ensure_line_started();
        self.output.push_str(&"#".repeat(level));
        self.output.push(' ');
        self.has_line_content = false;
        self.in_heading = true;
        self.walk_children(id);
        self.in_heading = false;
        self.has_line_content = true;
        self.end_block();
    }

    /// `**`, `*` or `~~` around the children, kept tight against the text.
    fn wrap_inline(&mut self, id: ArenaNodeId, marker: &str) {
        let dom = self.dom;
        let has_image = dom.descendants(id).any(|d| dom.is_tag(d, "img"));
        let text = dom.text_of(id);
        if text.trim().is_empty() && !has_image {
            self.walk_children(id);
            return;
        }
        if text.starts_with(char::is_whitespace) {
            self.pending_space = true;
        }
        self.begin_inline();
        self.output.push_str(marker);
        self.has_line_content = false;
        self.walk_children(id);
        self.output.push_str(marker);
        self.has_line_content = true;
    }

    fn write_code_block(&mut self, id: ArenaNodeId) {
        let text = self.dom.text_of(id);
        let text = text.trim_end_matches('\n');
        let fence = "`".repeat(fence_length(text, '`'));

        self.start_block();
        self.ensure_line_started();
        self.output.push_str(&fence);
        self.output.push('\n');
        for line in text.lines() {
            self.output.push_str(&self.line_prefix);
            self.output.push_str(line);
            self.output.push('\n');
        }
        self.output.push_str(&self.line_prefix);
        self.output.push_str(&fence);
        self.has_line_content = true;
        self.end_block();
    }

    /// GitHub-style pipe table; the first row is the header.
    fn write_table(&mut self, id: ArenaNodeId) {
        let mut rows = Vec::new();
        collect_rows(self.dom, id, &mut rows);
        if rows.is_empty() {
            return;
        }

        self.start_block();
        for (i, row) in rows.iter().enumerate() {
            self.ensure_line_started();
            self.output.push_str(&format!("| {} |", row.join(" | ")));
            self.write_newline();
            if i == 0 {
                self.ensure_line_started();
                self.output.push('|');
                self.output.push_str(&" --- |".repeat(row.len()));
                self.write_newline();
            }
        }
        self.end_block();
    }
}

/// Cell text of every row belonging to `table`, skipping nested tables.
fn collect_rows(dom: &ArenaDom, id: ArenaNodeId, rows: &mut Vec<Vec<String>>) {
    for child in dom.children(id) {
        if dom.is_tag(child, "tr") {
            let cells: Vec<String> = dom
                .children(child)
                .filter(|&c| dom.is_tag(c, "td") || dom.is_tag(c, "th"))
                .map(|c| {
                    dom.text_of(c)
                        .split_whitespace()
                        .collect::<Vec<_>>()
                        .join(" ")
                        .replace('|', "\\|")
                })
                .collect();
            if !cells.is_empty() {
                rows.push(cells);
            }
        } else if dom.is_element(child) && !dom.is_tag(child, "table") {
            collect_rows(dom, child, rows);
        }
    }
}

/// Heading level for Steam's BBCode heading and section title divs.
fn steam_heading_level(dom: &ArenaDom, id: ArenaNodeId) -> Option<usize> {
    dom.element_classes(id)
        .iter()
        .find_map(|class| match class.as_str() {
            "bb_h1" => Some(1),
            "bb_h2" | "subSectionTitle" => Some(2),
            "bb_h3" => Some(3),
            _ => None,
        })
}

/// Render the subtree rooted at `root` to Markdown.
pub fn render_markdown(dom: &ArenaDom, root: ArenaNodeId) -> String {
    RenderContext::new(dom).render(root)
}
