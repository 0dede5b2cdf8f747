#![allow(dead_code)]

use flui_rs::{
    DiagnosticSink, Node, NodeKind, ParseError, Parser, ParserOptions, SourceBuffer,
    SourceDocument, Token, compile, tokenize,
};

/// Tokenize `input`, returning the tokens and lexer diagnostics.
pub fn lex(input: &str) -> (Vec<Token>, DiagnosticSink) {
    let source = SourceBuffer::new(input);
    let mut sink = DiagnosticSink::new();
    let tokens = tokenize(&source, &mut sink);
    (tokens, sink)
}

/// Wrap a view expression in a minimal root document.
pub fn wrap(view: &str) -> String {
    format!("Stateless .viewModel: Vm, .view: {view}")
}

/// Compile `input` and panic with the diagnostics if it fails.
pub fn document(input: &str) -> SourceDocument {
    document_with(input, ParserOptions::default())
}

pub fn document_with(input: &str, options: ParserOptions) -> SourceDocument {
    let result = compile(&SourceBuffer::new(input), options);
    let diagnostics: Vec<_> = result.diagnostics.iter().map(ToString::to_string).collect();
    result.document.unwrap_or_else(|e| {
        panic!(
            "parse failed: {e}\n--- diagnostics ---\n{}\n--- input ---\n{input}",
            diagnostics.join("\n")
        )
    })
}

/// Parse `input` as a single node.
pub fn fragment_with(input: &str, options: ParserOptions) -> Result<Node, ParseError> {
    let source = SourceBuffer::new(input);
    let (tokens, _) = lex(input);
    Parser::new(options).parse_fragment(&source, &tokens)
}

pub fn fragment(input: &str) -> Node {
    fragment_with(input, ParserOptions::default())
        .unwrap_or_else(|e| panic!("fragment failed: {e}\n--- input ---\n{input}"))
}

/// Check the structural invariants every parsed tree must hold.
pub fn assert_well_formed(node: &Node) {
    match node.kind() {
        NodeKind::Element | NodeKind::Attribute => assert!(
            node.children().len() >= 2,
            "{} '{}' has {} children",
            node.kind(),
            node.value(),
            node.children().len()
        ),
        NodeKind::ElementSingle | NodeKind::AttributeSingle => {
            assert_eq!(node.children().len(), 1);
        }
        _ => assert!(node.children().is_empty()),
    }

    for child in node.children() {
        assert!(
            node.span().contains(&child.span()),
            "{} '{}' span {:?} does not contain child '{}' span {:?}",
            node.kind(),
            node.value(),
            node.span(),
            child.value(),
            child.span()
        );
        assert_well_formed(child);
    }
}
