//! Lexer, parser, and Dart generator for the Flui widget-tree language.
//!
//! Flui describes a Flutter widget tree with indentation instead of
//! brackets. A document names its widget kind, its view-model class, and
//! the root widget:
//!
//! ```text
//! Stateless .viewModel: CounterViewModel,
//! .view: Center:
//!     Text 'Hello'
//! ```
//!
//! # Quick start
//!
//! ## Parse a document
//!
//! ```
//! use flui_rs::{parse_str, NodeKind, WidgetKind};
//!
//! let doc = parse_str("Stateless .viewModel: Abc, .view: Text 'hi'").unwrap();
//! assert_eq!(doc.kind, WidgetKind::Stateless);
//! assert_eq!(doc.view_model_class_name(), "Abc");
//! assert_eq!(doc.root().kind(), NodeKind::ElementSingle);
//! ```
//!
//! ## Compile with diagnostics and generate Dart
//!
//! ```
//! use flui_rs::{compile, generate_view, GeneratorOptions, ParserOptions, SourceBuffer};
//!
//! let source = SourceBuffer::new("Stateless .viewModel: Vm, .view: Text $label");
//! let result = compile(&source, ParserOptions::default());
//! assert!(!result.has_errors());
//!
//! let doc = result.document.unwrap();
//! let view = generate_view(&doc, &GeneratorOptions::default());
//! assert!(view.contains("return Text(label());"));
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod diagnostic;
pub mod generator;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod token;

use tracing::debug;

pub use ast::{
    AttributeNode, AttributeSingleNode, CallbackNode, ConstantKind, ConstantNode, ElementNode,
    ElementSingleNode, FunctionCallNode, IdentifierNode, Node, NodeCategory, NodeKind,
    SourceDocument, WidgetKind,
};
pub use diagnostic::{Diagnostic, DiagnosticSink, Severity};
pub use generator::{GeneratorOptions, generate_view, generate_view_model, pascal_case_to_snake};
pub use lexer::{LexErrorKind, Lexer, Tokens, tokenize};
pub use parser::{ParseError, ParseErrorKind, Parser, ParserOptions, parse};
pub use source::{SourceBuffer, SourceLocation, SourceSpan};
pub use token::{Token, TokenCategory, TokenKind};

/// Output of [`compile`]: the token stream, the parse result, and every
/// diagnostic from both stages in the order they were reported.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub tokens: Vec<Token>,
    pub document: Result<SourceDocument, ParseError>,
    pub diagnostics: DiagnosticSink,
}

impl Compilation {
    /// Whether code generation should be refused.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.document.is_err() || self.diagnostics.has_errors()
    }
}

/// Tokenize and parse `source`, collecting diagnostics from both stages.
#[must_use]
pub fn compile(source: &SourceBuffer, options: ParserOptions) -> Compilation {
    let mut diagnostics = DiagnosticSink::new();
    let tokens = tokenize(source, &mut diagnostics);
    let document = parse(source, &tokens, options, &mut diagnostics);
    debug!(
        tokens = tokens.len(),
        diagnostics = diagnostics.len(),
        ok = document.is_ok(),
        "compiled"
    );
    Compilation {
        tokens,
        document,
        diagnostics,
    }
}

/// Tokenize and parse a source string in one step with default options.
///
/// Lexer diagnostics are discarded; malformed input surfaces as a
/// `ParseError` when the parser reaches the offending `Error` token.
pub fn parse_str(input: &str) -> Result<SourceDocument, ParseError> {
    compile(&SourceBuffer::new(input), ParserOptions::default()).document
}
