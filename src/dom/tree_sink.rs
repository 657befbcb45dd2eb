//! Builds an [`ArenaDom`] from html5ever tree-builder callbacks.

use std::borrow::Cow;
use std::cell::{Ref, RefCell};

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, QualName, local_name, ns};

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId, Attribute};

/// Name reported for handles that are not elements.
static NO_NAME: QualName = QualName {
    prefix: None,
    ns: ns!(),
    local: local_name!(""),
};

/// Node handle passed back and forth with the tree builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkHandle(pub ArenaNodeId);

/// Tree sink over a `RefCell` since html5ever calls it through `&self`.
pub struct ArenaSink {
    dom: RefCell<ArenaDom>,
}

impl ArenaSink {
    pub fn new() -> Self {
        Self {
            dom: RefCell::new(ArenaDom::new()),
        }
    }

    pub fn into_dom(self) -> ArenaDom {
        self.dom.into_inner()
    }

    fn insert(
        &self,
        child: NodeOrText<SinkHandle>,
        place: impl FnOnce(&mut ArenaDom, ArenaNodeId),
    ) {
        let mut dom = self.dom.borrow_mut();
        let id = match child {
            NodeOrText::AppendNode(node) => node.0,
            NodeOrText::AppendText(text) => dom.create_text(text.to_string()),
        };
        place(&mut dom, id);
    }
}

fn convert_attrs(attrs: Vec<Html5Attribute>) -> Vec<Attribute> {
    attrs
        .into_iter()
        .map(|a| Attribute {
            name: a.name,
            value: a.value.to_string(),
        })
        .collect()
}

impl TreeSink for ArenaSink {
    type Handle = SinkHandle;
    type Output = Self;
    type ElemName<'a>
        = Ref<'a, QualName>
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    // Community pages are rarely valid HTML; recover like a browser.
    fn parse_error(&self, _msg: Cow<'static, str>) {}

    fn get_document(&self) -> SinkHandle {
        SinkHandle(self.dom.borrow().document())
    }

    fn elem_name<'a>(&'a self, target: &'a SinkHandle) -> Ref<'a, QualName> {
        Ref::map(self.dom.borrow(), |dom| match dom.get(target.0).map(|n| &n.data) {
            Some(ArenaNodeData::Element { name, .. }) => name,
            _ => &NO_NAME,
        })
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Html5Attribute>,
        _flags: ElementFlags,
    ) -> SinkHandle {
        SinkHandle(
            self.dom
                .borrow_mut()
                .create_element(name, convert_attrs(attrs)),
        )
    }

    fn create_comment(&self, text: StrTendril) -> SinkHandle {
        SinkHandle(self.dom.borrow_mut().create_comment(text.to_string()))
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> SinkHandle {
        SinkHandle(self.dom.borrow_mut().create_comment(String::new()))
    }

    fn append(&self, parent: &SinkHandle, child: NodeOrText<SinkHandle>) {
        match child {
            NodeOrText::AppendText(text) => self.dom.borrow_mut().append_text(parent.0, &text),
            node => self.insert(node, |dom, id| dom.append(parent.0, id)),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &SinkHandle,
        prev_element: &SinkHandle,
        child: NodeOrText<SinkHandle>,
    ) {
        let parent = self
            .dom
            .borrow()
            .get(element.0)
            .map(|n| n.parent)
            .filter(ArenaNodeId::is_some);
        match parent {
            Some(parent) => self.append(&SinkHandle(parent), child),
            None => self.append(prev_element, child),
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        let mut dom = self.dom.borrow_mut();
        let doctype = dom.create_doctype(
            name.to_string(),
            public_id.to_string(),
            system_id.to_string(),
        );
        let document = dom.document();
        dom.append(document, doctype);
    }

    fn get_template_contents(&self, target: &SinkHandle) -> SinkHandle {
        *target
    }

    fn same_node(&self, x: &SinkHandle, y: &SinkHandle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &SinkHandle, new_node: NodeOrText<SinkHandle>) {
        self.insert(new_node, |dom, id| dom.insert_before(sibling.0, id));
    }

    fn add_attrs_if_missing(&self, target: &SinkHandle, attrs: Vec<Html5Attribute>) {
        let mut dom = self.dom.borrow_mut();
        for attr in attrs {
            let name = attr.name.local.to_string();
            if dom.get_attr(target.0, &name).is_none() {
                dom.set_attr(target.0, &name, &attr.value);
            }
        }
    }

    fn remove_from_parent(&self, target: &SinkHandle) {
        self.dom.borrow_mut().detach(target.0);
    }

    fn reparent_children(&self, node: &SinkHandle, new_parent: &SinkHandle) {
        self.dom.borrow_mut().reparent_children(node.0, new_parent.0);
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::{Query, parse_html};

    #[test]
    fn test_basic_parse() {
        let dom = parse_html("<html><body><p>Hello</p></body></html>");

        // document + html + head + body + p + text
        assert!(dom.len() > 3);

        let p = Query::tag("p").first(&dom).expect("should find p");
        let text_id = dom.children(p).next().expect("p should have child");
        assert_eq!(dom.text_content(text_id), Some("Hello"));
    }

    #[test]
    fn test_attributes() {
        let dom = parse_html(r#"<div id="main" class="guide subSections">Content</div>"#);

        let div = Query::tag("div").first(&dom).expect("should find div");
        assert_eq!(dom.element_id(div), Some("main"));
        assert_eq!(dom.element_classes(div), ["guide", "subSections"]);
    }

    #[test]
    fn test_misnested_markup_is_repaired() {
        // The adoption agency algorithm reparents and removes nodes.
        let dom = parse_html("<p><b>bold<i>both</b>italic</i></p>");

        let p = Query::tag("p").first(&dom).expect("should find p");
        assert_eq!(dom.text_of(p), "boldbothitalic");
    }

    #[test]
    fn test_table_text_is_foster_parented() {
        let dom = parse_html("<table>stray<tr><td>cell</td></tr></table>");

        let body = Query::tag("body").first(&dom).expect("should find body");
        assert!(dom.text_of(body).contains("stray"));
        assert!(Query::tag("td").first(&dom).is_some());
    }
}
