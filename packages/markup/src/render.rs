//! Pretty-printed HTML rendering of markup trees.

use crate::MarkupNode;

struct Context {
    buffer: String,
    depth: usize,
}

impl Context {
    fn new() -> Self {
        Self {
            buffer: String::new(),
            depth: 0,
        }
    }

    fn add_line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.buffer.push_str("  ");
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }
}

/// Render a sequence of markup nodes as an HTML fragment.
pub fn render_html_fragment(nodes: &[MarkupNode]) -> String {
    let mut ctx = Context::new();
    for node in nodes {
        render_node(node, &mut ctx);
    }
    ctx.buffer
}

/// Render a single markup node as HTML.
pub fn render_html(node: &MarkupNode) -> String {
    render_html_fragment(std::slice::from_ref(node))
}

fn render_node(node: &MarkupNode, ctx: &mut Context) {
    match node {
        MarkupNode::Text { content } => {
            ctx.add_line(&escape_text(content));
        }
        MarkupNode::Element {
            tag,
            attrs,
            children,
        } => {
            let mut open = format!("<{}", tag);
            for (name, value) in attrs {
                open.push_str(&format!(" {}=\"{}\"", name, escape_attr(value)));
            }

            if children.is_empty() {
                open.push_str(" />");
                ctx.add_line(&open);
                return;
            }

            // Text-only content stays on one line so rendering does not
            // introduce whitespace into it.
            if children.iter().all(|child| matches!(child, MarkupNode::Text { .. })) {
                open.push('>');
                for child in children {
                    if let MarkupNode::Text { content } = child {
                        open.push_str(&escape_text(content));
                    }
                }
                open.push_str(&format!("</{}>", tag));
                ctx.add_line(&open);
                return;
            }

            open.push('>');
            ctx.add_line(&open);
            ctx.indent();
            for child in children {
                render_node(child, ctx);
            }
            ctx.dedent();
            ctx.add_line(&format!("</{}>", tag));
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
