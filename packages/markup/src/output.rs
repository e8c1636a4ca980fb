/// Serialization template for a single document node or mark.
///
/// A schema type's serialization rule produces one of these: the tag to
/// emit, the attributes to put on it, and where the node's children go.
/// Specs can nest (`pre > code` for code blocks); the child slot may sit on
/// the innermost spec.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSpec {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub child: OutputChild,
}

/// Where the children of a serialized node are placed.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputChild {
    /// No slot: the element is a leaf (`<hr>`, `<img>`, `<br>`)
    None,
    /// Children are rendered directly inside this element
    Hole,
    /// Children go into a nested element
    Nested(Box<OutputSpec>),
}

impl OutputSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            child: OutputChild::None,
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Add an attribute only when a value is present. `None` is skipped
    /// entirely rather than rendered as an empty string.
    pub fn with_optional_attr(
        mut self,
        name: impl Into<String>,
        value: Option<impl Into<String>>,
    ) -> Self {
        if let Some(value) = value {
            self.attrs.push((name.into(), value.into()));
        }
        self
    }

    /// Mark this element as the child slot.
    pub fn with_hole(mut self) -> Self {
        self.child = OutputChild::Hole;
        self
    }

    /// Nest another spec inside this one (the hole, if any, lives in the
    /// nested spec).
    pub fn wrapping(mut self, inner: OutputSpec) -> Self {
        self.child = OutputChild::Nested(Box::new(inner));
        self
    }

    /// Whether this spec (or anything nested in it) has a child slot.
    pub fn has_hole(&self) -> bool {
        match &self.child {
            OutputChild::None => false,
            OutputChild::Hole => true,
            OutputChild::Nested(inner) => inner.has_hole(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_attrs_are_skipped_when_absent() {
        let spec = OutputSpec::new("img")
            .with_attr("src", "pic.png")
            .with_optional_attr("alt", None::<String>)
            .with_optional_attr("title", Some("caption"));

        assert_eq!(
            spec.attrs,
            vec![
                ("src".to_string(), "pic.png".to_string()),
                ("title".to_string(), "caption".to_string()),
            ]
        );
        assert!(!spec.has_hole());
    }

    #[test]
    fn nested_specs_carry_the_hole() {
        let spec = OutputSpec::new("pre").wrapping(OutputSpec::new("code").with_hole());
        assert!(spec.has_hole());
    }
}
