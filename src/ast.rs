//! Syntax tree for a parsed Flui document.
//!
//! Every node is span-tagged and exclusively owns its children. Elements and
//! attributes with exactly one child always use their `*Single` variant; the
//! generator relies on that to decide between inline and block output.

use std::fmt;

use serde::Serialize;

use crate::source::SourceSpan;

/// Semantic grouping of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeCategory {
    Element,
    Attribute,
    Value,
}

/// Concrete node kind, one per [`Node`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    Element,
    ElementSingle,
    Attribute,
    AttributeSingle,
    Identifier,
    FunctionCall,
    Callback,
    Constant,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Element => "ElementNode",
            Self::ElementSingle => "ElementSingleNode",
            Self::Attribute => "AttributeNode",
            Self::AttributeSingle => "AttributeSingleNode",
            Self::Identifier => "IdentifierNode",
            Self::FunctionCall => "FunctionCallNode",
            Self::Callback => "CallbackNode",
            Self::Constant => "ConstantNode",
        };
        f.write_str(name)
    }
}

/// Literal type of a [`ConstantNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConstantKind {
    Null,
    Integer,
    Float,
    String,
    Boolean,
}

/// Widget with two or more children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementNode {
    pub value: String,
    pub children: Vec<Node>,
    #[serde(skip)]
    pub span: SourceSpan,
}

/// Widget with exactly one child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementSingleNode {
    pub value: String,
    pub child: Box<Node>,
    #[serde(skip)]
    pub span: SourceSpan,
}

/// Named attribute with two or more values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeNode {
    pub value: String,
    pub children: Vec<Node>,
    #[serde(skip)]
    pub span: SourceSpan,
}

/// Named attribute with exactly one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSingleNode {
    pub value: String,
    pub child: Box<Node>,
    #[serde(skip)]
    pub span: SourceSpan,
}

/// Bare name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierNode {
    pub value: String,
    #[serde(skip)]
    pub span: SourceSpan,
}

/// `$name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionCallNode {
    pub value: String,
    #[serde(skip)]
    pub span: SourceSpan,
}

/// `@name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallbackNode {
    pub value: String,
    #[serde(skip)]
    pub span: SourceSpan,
}

/// Literal value. `value` holds the literal text, without quotes for strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstantNode {
    pub value: String,
    pub constant_kind: ConstantKind,
    #[serde(skip)]
    pub span: SourceSpan,
}

/// Any syntax tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Node {
    Element(ElementNode),
    ElementSingle(ElementSingleNode),
    Attribute(AttributeNode),
    AttributeSingle(AttributeSingleNode),
    Identifier(IdentifierNode),
    FunctionCall(FunctionCallNode),
    Callback(CallbackNode),
    Constant(ConstantNode),
}

impl Node {
    /// Build an element, choosing the variant from the child count.
    ///
    /// A header with no children at all is just a name, so it becomes an
    /// [`IdentifierNode`].
    #[must_use]
    pub fn element(value: String, span: SourceSpan, mut children: Vec<Self>) -> Self {
        match children.len() {
            0 => Self::Identifier(IdentifierNode { value, span }),
            1 => Self::ElementSingle(ElementSingleNode {
                value,
                child: Box::new(children.remove(0)),
                span,
            }),
            _ => Self::Element(ElementNode {
                value,
                children,
                span,
            }),
        }
    }

    /// Build an attribute, choosing the variant from the child count.
    ///
    /// Returns `None` when `children` is empty.
    #[must_use]
    pub fn attribute(value: String, span: SourceSpan, mut children: Vec<Self>) -> Option<Self> {
        match children.len() {
            0 => None,
            1 => Some(Self::AttributeSingle(AttributeSingleNode {
                value,
                child: Box::new(children.remove(0)),
                span,
            })),
            _ => Some(Self::Attribute(AttributeNode {
                value,
                children,
                span,
            })),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Element(_) => NodeKind::Element,
            Self::ElementSingle(_) => NodeKind::ElementSingle,
            Self::Attribute(_) => NodeKind::Attribute,
            Self::AttributeSingle(_) => NodeKind::AttributeSingle,
            Self::Identifier(_) => NodeKind::Identifier,
            Self::FunctionCall(_) => NodeKind::FunctionCall,
            Self::Callback(_) => NodeKind::Callback,
            Self::Constant(_) => NodeKind::Constant,
        }
    }

    #[must_use]
    pub const fn category(&self) -> NodeCategory {
        match self {
            Self::Element(_) | Self::ElementSingle(_) => NodeCategory::Element,
            Self::Attribute(_) | Self::AttributeSingle(_) => NodeCategory::Attribute,
            Self::Identifier(_) | Self::FunctionCall(_) | Self::Callback(_) | Self::Constant(_) => {
                NodeCategory::Value
            }
        }
    }

    #[must_use]
    pub const fn span(&self) -> SourceSpan {
        match self {
            Self::Element(n) => n.span,
            Self::ElementSingle(n) => n.span,
            Self::Attribute(n) => n.span,
            Self::AttributeSingle(n) => n.span,
            Self::Identifier(n) => n.span,
            Self::FunctionCall(n) => n.span,
            Self::Callback(n) => n.span,
            Self::Constant(n) => n.span,
        }
    }

    /// Element or attribute name, or the leaf's text.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Element(n) => &n.value,
            Self::ElementSingle(n) => &n.value,
            Self::Attribute(n) => &n.value,
            Self::AttributeSingle(n) => &n.value,
            Self::Identifier(n) => &n.value,
            Self::FunctionCall(n) => &n.value,
            Self::Callback(n) => &n.value,
            Self::Constant(n) => &n.value,
        }
    }

    /// Direct children; empty for value leaves.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Element(n) => &n.children,
            Self::Attribute(n) => &n.children,
            Self::ElementSingle(n) => std::slice::from_ref(&*n.child),
            Self::AttributeSingle(n) => std::slice::from_ref(&*n.child),
            Self::Identifier(_) | Self::FunctionCall(_) | Self::Callback(_) | Self::Constant(_) => {
                &[]
            }
        }
    }

    #[must_use]
    pub const fn is_value(&self) -> bool {
        matches!(self.category(), NodeCategory::Value)
    }
}

/// Root declaration type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WidgetKind {
    Stateless,
    Stateful,
}

impl WidgetKind {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Stateless" => Some(Self::Stateless),
            "Stateful" => Some(Self::Stateful),
            _ => None,
        }
    }
}

/// Root of a successful parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDocument {
    pub kind: WidgetKind,
    /// `.viewModel`, whose child is an [`IdentifierNode`].
    pub view_model: AttributeSingleNode,
    /// `.view`, whose child is the root widget.
    pub view: AttributeSingleNode,
}

impl SourceDocument {
    /// Name of the view-model class.
    #[must_use]
    pub fn view_model_class_name(&self) -> &str {
        self.view_model.child.value()
    }

    /// Name of the root widget, used as the view class name.
    #[must_use]
    pub fn view_class_name(&self) -> &str {
        self.view.child.value()
    }

    /// The root widget node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.view.child
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Node {
        Node::Identifier(IdentifierNode {
            value: name.to_string(),
            span: SourceSpan::default(),
        })
    }

    #[test]
    fn element_collapses_by_child_count() {
        let span = SourceSpan::default();
        assert_eq!(
            Node::element("Row".into(), span, Vec::new()).kind(),
            NodeKind::Identifier
        );
        assert_eq!(
            Node::element("Row".into(), span, vec![ident("a")]).kind(),
            NodeKind::ElementSingle
        );
        let many = Node::element("Row".into(), span, vec![ident("a"), ident("b")]);
        assert_eq!(many.kind(), NodeKind::Element);
        assert_eq!(many.children().len(), 2);
        assert_eq!(many.category(), NodeCategory::Element);
    }

    #[test]
    fn attribute_collapses_by_child_count() {
        let span = SourceSpan::default();
        assert!(Node::attribute("a".into(), span, Vec::new()).is_none());
        let single = Node::attribute("a".into(), span, vec![ident("x")]).expect("attribute");
        assert_eq!(single.kind(), NodeKind::AttributeSingle);
        assert_eq!(single.children()[0].value(), "x");
        assert_eq!(single.category(), NodeCategory::Attribute);
    }

    #[test]
    fn leaves_have_no_children() {
        let leaf = ident("x");
        assert!(leaf.children().is_empty());
        assert!(leaf.is_value());
    }

    #[test]
    fn widget_kind_names() {
        assert_eq!(WidgetKind::from_name("Stateful"), Some(WidgetKind::Stateful));
        assert_eq!(WidgetKind::from_name("stateless"), None);
    }
}
