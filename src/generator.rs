//! Dart code generation from a parsed [`SourceDocument`].
//!
//! A document produces two files: the view, a widget class whose `build`
//! method returns the widget tree, and the view model it extends, holding a
//! placeholder member for every name the view references.

use std::collections::HashSet;
use std::fmt::Write as _;

use tracing::debug;

use crate::ast::{ConstantKind, Node, SourceDocument};

/// Indentation used in generated files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub indent_char: char,
    /// Number of `indent_char` per level.
    pub indent_width: usize,
}

impl GeneratorOptions {
    /// One tab per level.
    #[must_use]
    pub const fn tabs() -> Self {
        Self {
            indent_char: '\t',
            indent_width: 1,
        }
    }

    /// Two spaces per level.
    #[must_use]
    pub const fn spaces() -> Self {
        Self {
            indent_char: ' ',
            indent_width: 2,
        }
    }

    fn unit(&self) -> String {
        std::iter::repeat_n(self.indent_char, self.indent_width).collect()
    }
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self::tabs()
    }
}

/// `CounterViewModel` -> `counter_view_model`.
#[must_use]
pub fn pascal_case_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_uppercase() && !out.is_empty() {
            out.push('_');
        }
        out.extend(ch.to_lowercase());
    }
    out
}

// ------------------------------------------------------------------ //
//  View
// ------------------------------------------------------------------ //

/// Generate the view file for `doc`.
#[must_use]
pub fn generate_view(doc: &SourceDocument, options: &GeneratorOptions) -> String {
    let unit = options.unit();
    let view_model = doc.view_model_class_name();
    let view = doc.view_class_name();
    debug!(view, view_model, "generating view");

    let mut out = String::new();
    out.push_str("// DO NOT WRITE CODE IN THIS FILE\n");
    out.push_str("// IT WILL GET OVERWRITTEN WHEN THE UI CODE IS REBUILT\n\n");
    out.push_str("import 'package:flutter/material.dart';\n\n");
    let _ = writeln!(out, "import './{}.dart';\n", pascal_case_to_snake(view_model));
    let _ = writeln!(out, "class {view} extends {view_model} {{");
    let _ = writeln!(out, "{unit}@override");
    let _ = writeln!(out, "{unit}Widget build(BuildContext context) {{");
    let _ = write!(out, "{unit}{unit}return ");

    match doc.root() {
        Node::Identifier(node) => {
            out.push_str(&node.value);
            out.push_str("()");
        }
        root => write_node(&mut out, root, 2, &unit),
    }

    let _ = write!(out, ";\n{unit}}}\n}}\n");
    out
}

fn push_indent(out: &mut String, level: usize, unit: &str) {
    for _ in 0..level {
        out.push_str(unit);
    }
}

/// Write each child on its own line at `level + 1`, followed by `,`.
fn write_children(out: &mut String, children: &[Node], level: usize, unit: &str) {
    for child in children {
        out.push('\n');
        push_indent(out, level + 1, unit);
        write_node(out, child, level + 1, unit);
        out.push(',');
    }
    out.push('\n');
    push_indent(out, level, unit);
}

/// Write `node` as a Dart expression. The caller owns the leading
/// indentation and any separator after it.
fn write_node(out: &mut String, node: &Node, level: usize, unit: &str) {
    match node {
        Node::Element(n) => {
            out.push_str(&n.value);
            out.push('(');
            write_children(out, &n.children, level, unit);
            out.push(')');
        }
        Node::ElementSingle(n) => {
            out.push_str(&n.value);
            out.push('(');
            if n.child.is_value() {
                write_node(out, &n.child, level, unit);
            } else {
                write_children(out, std::slice::from_ref(&*n.child), level, unit);
            }
            out.push(')');
        }
        Node::Attribute(n) => {
            out.push_str(&n.value);
            out.push_str(": [");
            write_children(out, &n.children, level, unit);
            out.push(']');
        }
        Node::AttributeSingle(n) => {
            out.push_str(&n.value);
            out.push_str(": ");
            write_node(out, &n.child, level, unit);
        }
        Node::Identifier(n) => out.push_str(&n.value),
        Node::FunctionCall(n) => {
            out.push_str(&n.value);
            out.push_str("()");
        }
        Node::Callback(n) => {
            out.push_str("() => ");
            out.push_str(&n.value);
            out.push_str("()");
        }
        Node::Constant(n) => match n.constant_kind {
            ConstantKind::Null => out.push_str("null"),
            ConstantKind::String => {
                out.push('\'');
                out.push_str(&n.value);
                out.push('\'');
            }
            ConstantKind::Integer
            | ConstantKind::Float
            | ConstantKind::Boolean => out.push_str(&n.value),
        },
    }
}

// ------------------------------------------------------------------ //
//  View model
// ------------------------------------------------------------------ //

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Member<'a> {
    Field(&'a str),
    Method(&'a str),
}

/// Generate the view-model file for `doc`.
#[must_use]
pub fn generate_view_model(doc: &SourceDocument, options: &GeneratorOptions) -> String {
    let unit = options.unit();
    let view_model = doc.view_model_class_name();

    let mut members = Vec::new();
    let mut seen = HashSet::new();
    if !matches!(doc.root(), Node::Identifier(_)) {
        collect_members(doc.root(), &mut members, &mut seen);
    }
    debug!(view_model, members = members.len(), "generating view model");

    let mut out = String::new();
    out.push_str("import 'package:flutter/material.dart';\n\n");
    let _ = writeln!(out, "class {view_model} extends StatelessWidget {{");

    for (i, member) in members.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        match member {
            Member::Field(name) => {
                let _ = write!(out, "{unit}var {name} = null; // TODO: Populate field {name}");
            }
            Member::Method(name) => {
                let _ = write!(
                    out,
                    "{unit}{name}() {{\n{unit}{unit}// TODO: Populate function {name}\n{unit}}}"
                );
            }
        }
    }

    out.push_str("\n}\n");
    out
}

/// Collect members in first-appearance order; a name is emitted once.
fn collect_members<'a>(node: &'a Node, members: &mut Vec<Member<'a>>, seen: &mut HashSet<&'a str>) {
    let member = match node {
        Node::Identifier(n) => Member::Field(&n.value),
        Node::FunctionCall(n) => Member::Method(&n.value),
        Node::Callback(n) => Member::Method(&n.value),
        Node::Constant(_) => return,
        Node::Element(_) | Node::ElementSingle(_) | Node::Attribute(_) | Node::AttributeSingle(_) => {
            for child in node.children() {
                collect_members(child, members, seen);
            }
            return;
        }
    };

    let name = match member {
        Member::Field(name) | Member::Method(name) => name,
    };
    if seen.insert(name) {
        members.push(member);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_names() {
        assert_eq!(pascal_case_to_snake("CounterViewModel"), "counter_view_model");
        assert_eq!(pascal_case_to_snake("Abc"), "abc");
        assert_eq!(pascal_case_to_snake("already_snake"), "already_snake");
        assert_eq!(pascal_case_to_snake(""), "");
    }

    #[test]
    fn indent_units() {
        assert_eq!(GeneratorOptions::default().unit(), "\t");
        assert_eq!(GeneratorOptions::spaces().unit(), "  ");
    }

    #[test]
    fn element_single_inline_value() {
        let doc = crate::parse_str("Stateless .viewModel: Vm, .view: Text 'hi'").expect("parse");
        let mut out = String::new();
        write_node(&mut out, doc.root(), 2, "\t");
        assert_eq!(out, "Text('hi')");
    }
}
