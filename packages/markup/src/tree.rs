use serde::{Deserialize, Serialize};

/// A node in the external markup tree.
///
/// Attributes are an ordered list rather than a map: the order they were
/// produced in is the order they render in, which keeps output deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MarkupNode {
    /// An element with a tag name, attributes and children
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<MarkupNode>,
    },

    /// A text node
    Text { content: String },
}

impl MarkupNode {
    pub fn element(tag: impl Into<String>) -> Self {
        MarkupNode::Element {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        MarkupNode::Text {
            content: content.into(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let MarkupNode::Element { ref mut attrs, .. } = self {
            attrs.push((name.into(), value.into()));
        }
        self
    }

    pub fn with_child(mut self, child: MarkupNode) -> Self {
        if let MarkupNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<MarkupNode>) -> Self {
        if let MarkupNode::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }

    /// Tag name, or `None` for text nodes.
    pub fn tag(&self) -> Option<&str> {
        match self {
            MarkupNode::Element { tag, .. } => Some(tag),
            MarkupNode::Text { .. } => None,
        }
    }

    /// Look up an attribute value. First occurrence wins.
    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            MarkupNode::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            MarkupNode::Text { .. } => None,
        }
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Look up one declaration inside the inline `style` attribute.
    ///
    /// `style="font-style: italic; color: red"` makes
    /// `style_value("font-style")` return `Some("italic")`.
    pub fn style_value(&self, property: &str) -> Option<&str> {
        let style = self.attr("style")?;
        for decl in style.split(';') {
            let decl = decl.trim();
            if decl.is_empty() {
                continue;
            }
            if let Some((name, value)) = decl.split_once(':') {
                if name.trim() == property {
                    return Some(value.trim());
                }
            }
        }
        None
    }

    pub fn children(&self) -> &[MarkupNode] {
        match self {
            MarkupNode::Element { children, .. } => children,
            MarkupNode::Text { .. } => &[],
        }
    }
}
