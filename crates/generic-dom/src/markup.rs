//! Declarative markup
//!
//! Parses an HTML fragment and inserts the resulting elements, attributes and
//! text into a document.

use scraper::{ElementRef, Html, Node as HtmlNode};

use crate::document::{Document, ElementId, TreeWriter};
use crate::Result;

enum MarkupNode {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<MarkupNode>,
    },
    Text(String),
}

fn collect(element: ElementRef<'_>) -> Vec<MarkupNode> {
    element
        .children()
        .filter_map(|child| match child.value() {
            HtmlNode::Element(_) => ElementRef::wrap(child).map(|el| MarkupNode::Element {
                tag: el.value().name().to_string(),
                attributes: el
                    .value()
                    .attrs()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
                children: collect(el),
            }),
            HtmlNode::Text(text) => Some(MarkupNode::Text(text.to_string())),
            _ => None,
        })
        .collect()
}

fn insert(writer: &mut TreeWriter<'_>, parent: ElementId, node: &MarkupNode) -> Result<ElementId> {
    let id = match node {
        MarkupNode::Element {
            tag,
            attributes,
            children,
        } => {
            let id = writer.create_element(tag);
            for (name, value) in attributes {
                writer.set_attribute(id, name, value)?;
            }
            for child in children {
                insert(writer, id, child)?;
            }
            id
        }
        MarkupNode::Text(text) => writer.create_text(text),
    };

    // Attach last so the subtree is complete when it becomes visible
    writer.append_child(parent, id)?;
    Ok(id)
}

impl Document {
    /// Parse `markup` and append its top-level nodes to `parent`.
    ///
    /// Returns the ids of the top-level elements, in order. Whitespace between
    /// elements is kept as text nodes.
    pub fn parse_fragment(&self, parent: ElementId, markup: &str) -> Result<Vec<ElementId>> {
        let fragment = Html::parse_fragment(markup);
        let nodes = collect(fragment.root_element());

        let inserted = self.with_tree_mut(|writer| {
            let mut elements = Vec::new();
            for node in &nodes {
                let id = insert(writer, parent, node)?;
                if matches!(node, MarkupNode::Element { .. }) {
                    elements.push(id);
                }
            }
            Ok(elements)
        })?;

        tracing::trace!(parent = %parent, elements = inserted.len(), "Parsed markup fragment");

        Ok(inserted)
    }
}
