//! End-to-end pipeline: compile, reusable stages, and JSON output.

mod common;

use common::{lex, wrap};
use flui_rs::{
    Lexer, NodeKind, Parser, ParserOptions, Severity, SourceBuffer, compile, parse_str,
};

#[test]
fn compile_success() {
    let source = SourceBuffer::new(wrap("Center:\n\tText 'hello'"));
    let result = compile(&source, ParserOptions::default());
    assert!(!result.has_errors());
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.tokens, lex(source.text()).0);

    let doc = result.document.expect("document");
    assert_eq!(doc.root().kind(), NodeKind::ElementSingle);
}

#[test]
fn compile_warnings_do_not_block() {
    let source = SourceBuffer::new(wrap("Column:\n\tText 'a'\n  Text 'b'"));
    let result = compile(&source, ParserOptions::default());
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics.max_severity(), Some(Severity::Warning));
    assert!(!result.has_errors());
    assert!(result.document.is_ok());
}

#[test]
fn compile_orders_lexer_before_parser_diagnostics() {
    let source = SourceBuffer::new("Stateless .viewModel: Vm,\n.view: 'open");
    let result = compile(&source, ParserOptions::default());
    assert!(result.has_errors());
    let severities: Vec<_> = result.diagnostics.iter().map(|d| d.severity).collect();
    assert_eq!(severities[0], Severity::Fatal);
    assert_eq!(result.diagnostics.as_slice()[0].message, "Unexpected end of file");
    assert!(severities.len() >= 2);
}

#[test]
fn diagnostics_capture_source_lines() {
    let source = SourceBuffer::new("Stateless .viewModel: Vm,\n.layout: Text 'a'");
    let result = compile(&source, ParserOptions::default());
    assert!(result.document.is_err());
    let diagnostic = &result.diagnostics.as_slice()[0];
    assert_eq!(diagnostic.source_lines, vec![".layout: Text 'a'"]);
}

#[test]
fn stages_match_compile() {
    let source = SourceBuffer::new(wrap("Row 1, 2"));
    let mut lexer = Lexer::new();
    let tokens: Vec<_> = lexer.tokenize(&source).collect();
    let mut parser = Parser::new(ParserOptions::default());
    let doc = parser.parse(&source, &tokens).expect("parse");

    let compiled = compile(&source, ParserOptions::default());
    assert_eq!(compiled.tokens, tokens);
    assert_eq!(compiled.document.expect("document"), doc);
}

#[test]
fn parser_resets_diagnostics_between_runs() {
    let mut parser = Parser::new(ParserOptions::default());

    let bad = SourceBuffer::new("Stateless .viewModel: Vm, .view: 'x'");
    let (tokens, _) = lex(bad.text());
    assert!(parser.parse(&bad, &tokens).is_err());
    assert_eq!(parser.diagnostics().len(), 1);

    let good = SourceBuffer::new(wrap("Text 'x'"));
    let (tokens, _) = lex(good.text());
    assert!(parser.parse(&good, &tokens).is_ok());
    assert!(parser.diagnostics().is_empty());
}

#[test]
fn parse_str_matches_compile() {
    let input = wrap("Text $name");
    let doc = parse_str(&input).expect("parse");
    let compiled = compile(&SourceBuffer::new(input.as_str()), ParserOptions::default());
    assert_eq!(compiled.document.expect("document"), doc);
}

#[test]
fn document_serializes_to_json() {
    let doc = parse_str(&wrap("Text 'hi', $name")).expect("parse");
    let json = serde_json::to_value(&doc).expect("json");
    assert_eq!(json["kind"], "Stateless");
    assert_eq!(json["view_model"]["child"]["kind"], "Identifier");
    assert_eq!(json["view_model"]["child"]["value"], "Vm");

    let root = &json["view"]["child"];
    assert_eq!(root["kind"], "Element");
    assert_eq!(root["value"], "Text");
    assert_eq!(root["children"][0]["constant_kind"], "String");
    assert_eq!(root["children"][1]["kind"], "FunctionCall");
    assert!(root.get("span").is_none());
}

#[test]
fn tokens_serialize_to_json() {
    let (tokens, sink) = lex("Text 1.x");
    let json = serde_json::to_value(&tokens).expect("json");
    assert_eq!(json[0]["kind"], "Widget");
    assert_eq!(json[0]["span"]["start"]["line"], 1);

    let diagnostics = serde_json::to_value(&sink).expect("json");
    assert_eq!(diagnostics[0]["severity"], "Error");
}
