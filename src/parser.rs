use std::fmt;

use tracing::{debug, trace};

use crate::ast::{
    CallbackNode, ConstantKind, ConstantNode, FunctionCallNode, IdentifierNode, Node,
    SourceDocument, WidgetKind,
};
use crate::diagnostic::{DiagnosticSink, Severity};
use crate::lexer::WIDGETS;
use crate::source::{SourceBuffer, SourceSpan};
use crate::token::{Token, TokenCategory, TokenKind};

/// Switches that tighten the grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// Reserved; accepted but not consulted by any rule.
    pub enforce_strict_indentation: bool,
    /// Require `:` after every header that could otherwise omit it.
    pub enforce_colons: bool,
}

impl ParserOptions {
    /// Both switches enabled.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            enforce_strict_indentation: true,
            enforce_colons: true,
        }
    }
}

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A token other than the one the grammar requires.
    UnexpectedToken { found: String, expected: String },
    /// The first identifier is not `Stateless` or `Stateful`.
    InvalidRootKind { found: String },
    /// The first root attribute is not `.viewModel` with one identifier.
    MissingViewModel,
    /// The second root attribute is not `.view` with one child.
    MissingView,
    /// The `.view` child is not a widget.
    ViewNotWidget,
    /// A block-form attribute with no indented values.
    EmptyAttribute { name: String },
}

impl ParseErrorKind {
    /// `Fatal` for root document violations, `Error` for local mismatches.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::InvalidRootKind { .. }
            | Self::MissingViewModel
            | Self::MissingView
            | Self::ViewNotWidget => Severity::Fatal,
            Self::UnexpectedToken { .. } | Self::EmptyAttribute { .. } => Severity::Error,
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found, expected } => {
                write!(f, "Unexpected '{found}'. Expected '{expected}'.")
            }
            Self::InvalidRootKind { .. } => write!(
                f,
                "Root node identifier must indicate a widget type (e.g. Stateful, Stateless)"
            ),
            Self::MissingViewModel => write!(
                f,
                "Root node must have a specified `viewModel` attribute \
                 with a single identifier as a value"
            ),
            Self::MissingView => write!(
                f,
                "Root node must have a specified `view` attribute \
                 with a single child widget as a value"
            ),
            Self::ViewNotWidget => write!(
                f,
                "The `view` attribute of the root node must have a single widget as a child"
            ),
            Self::EmptyAttribute { name } => {
                write!(f, "Attribute '{name}' must have at least one value")
            }
        }
    }
}

/// Error that ended a parse attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", span.start.line, span.start.column)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: SourceSpan,
}

impl ParseError {
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

/// Parse a lexed token stream into a [`SourceDocument`].
///
/// Trivia is filtered first. Every error is also recorded in `diagnostics`
/// before it is returned; there is no recovery within a document.
///
/// # Errors
///
/// Returns `ParseError` on the first token that does not fit the grammar or
/// when the root document is missing its `viewModel`/`view` attributes.
pub fn parse(
    source: &SourceBuffer,
    tokens: &[Token],
    options: ParserOptions,
    diagnostics: &mut DiagnosticSink,
) -> Result<SourceDocument, ParseError> {
    debug!(tokens = tokens.len(), ?options, "parsing");
    Cursor::new(source, tokens, options, diagnostics).parse_document()
}

/// Reusable parser owning its options and diagnostic sink.
///
/// The sink is cleared at the start of every call.
#[derive(Debug, Default)]
pub struct Parser {
    options: ParserOptions,
    diagnostics: DiagnosticSink,
}

impl Parser {
    #[must_use]
    pub const fn new(options: ParserOptions) -> Self {
        Self {
            options,
            diagnostics: DiagnosticSink::new(),
        }
    }

    pub fn parse(
        &mut self,
        source: &SourceBuffer,
        tokens: &[Token],
    ) -> Result<SourceDocument, ParseError> {
        self.diagnostics.clear();
        parse(source, tokens, self.options, &mut self.diagnostics)
    }

    /// Parse exactly one node without the root document wrapper. A single
    /// trailing `,` is allowed; anything else after the node is an error.
    pub fn parse_fragment(
        &mut self,
        source: &SourceBuffer,
        tokens: &[Token],
    ) -> Result<Node, ParseError> {
        self.diagnostics.clear();
        let mut cursor = Cursor::new(source, tokens, self.options, &mut self.diagnostics);
        cursor.skip_newlines();
        let node = cursor.parse_node(0)?;
        if cursor.at(TokenKind::Comma) {
            cursor.advance();
        }
        cursor.skip_newlines();
        cursor.expect(TokenKind::EndOfFile)?;
        Ok(node)
    }

    #[must_use]
    pub const fn diagnostics(&self) -> &DiagnosticSink {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticSink {
        std::mem::take(&mut self.diagnostics)
    }
}

/// Drop trivia and indentation on otherwise blank lines.
fn significant_tokens(tokens: &[Token]) -> Vec<Token> {
    let mut out: Vec<Token> = tokens
        .iter()
        .enumerate()
        .filter(|&(i, t)| !t.is_trivia() && !is_blank_indentation(tokens, i))
        .map(|(_, t)| t.clone())
        .collect();

    if out.last().is_none_or(|t| t.kind != TokenKind::EndOfFile) {
        let span = out
            .last()
            .map_or_else(SourceSpan::default, |t| SourceSpan::new(t.span.end, t.span.end));
        out.push(Token::new(TokenKind::EndOfFile, "", span));
    }
    out
}

fn is_blank_indentation(tokens: &[Token], i: usize) -> bool {
    if tokens[i].kind != TokenKind::Indentation {
        return false;
    }
    let ends_line = |t: Option<&Token>| {
        t.is_none_or(|t| matches!(t.kind, TokenKind::NewLine | TokenKind::EndOfFile))
    };
    let before = tokens[..i].iter().rev().find(|t| !t.is_trivia());
    let after = tokens[i + 1..].iter().find(|t| !t.is_trivia());
    ends_line(before) && ends_line(after)
}

struct Cursor<'a> {
    source: &'a SourceBuffer,
    tokens: Vec<Token>,
    eof: Token,
    pos: usize,
    options: ParserOptions,
    diagnostics: &'a mut DiagnosticSink,
}

impl<'a> Cursor<'a> {
    fn new(
        source: &'a SourceBuffer,
        tokens: &[Token],
        options: ParserOptions,
        diagnostics: &'a mut DiagnosticSink,
    ) -> Self {
        let tokens = significant_tokens(tokens);
        let eof = tokens
            .last()
            .cloned()
            .unwrap_or_else(|| Token::new(TokenKind::EndOfFile, "", SourceSpan::default()));
        Self {
            source,
            tokens,
            eof,
            pos: 0,
            options,
            diagnostics,
        }
    }

    // -- Navigation --

    /// Token at `pos + offset`; the last token when out of range either way.
    fn peek(&self, offset: isize) -> &Token {
        self.pos
            .checked_add_signed(offset)
            .and_then(|i| self.tokens.get(i))
            .unwrap_or(&self.eof)
    }

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    const fn advance(&mut self) {
        self.pos += 1;
    }

    fn bump(&mut self) -> Token {
        let token = self.current().clone();
        self.advance();
        token
    }

    fn skip_newlines(&mut self) {
        while self.at(TokenKind::NewLine) {
            self.advance();
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        self.expect_one_of(&[kind])
    }

    fn expect_one_of(&mut self, kinds: &[TokenKind]) -> Result<Token, ParseError> {
        if kinds.contains(&self.current().kind) {
            return Ok(self.bump());
        }
        let expected = kinds
            .iter()
            .map(|k| k.name())
            .collect::<Vec<_>>()
            .join(",");
        Err(self.unexpected(&expected))
    }

    /// Take a header colon if present, or fail when colons are enforced.
    fn take_colon(&mut self) -> Result<Option<Token>, ParseError> {
        if self.options.enforce_colons || self.at(TokenKind::Colon) {
            return self.expect(TokenKind::Colon).map(Some);
        }
        Ok(None)
    }

    /// Child nodes on following lines indented deeper than `indent`.
    fn parse_block(&mut self, indent: usize, children: &mut Vec<Node>) -> Result<(), ParseError> {
        loop {
            self.skip_newlines();
            let current = self.current();
            if current.kind != TokenKind::Indentation || current.span.len() <= indent {
                return Ok(());
            }
            children.push(self.parse_node(indent)?);
        }
    }

    // -- Grammar --

    fn parse_document(&mut self) -> Result<SourceDocument, ParseError> {
        self.skip_newlines();
        let root = self.expect(TokenKind::Identifier)?;
        let Some(kind) = WidgetKind::from_name(&root.value) else {
            return Err(self.fail(ParseErrorKind::InvalidRootKind { found: root.value }, root.span));
        };
        self.skip_newlines();

        let view_model = match self.parse_attribute(0)? {
            Node::AttributeSingle(attr)
                if attr.value == "viewModel" && matches!(*attr.child, Node::Identifier(_)) =>
            {
                attr
            }
            other => return Err(self.fail(ParseErrorKind::MissingViewModel, other.span())),
        };

        self.expect(TokenKind::Comma)?;
        self.skip_newlines();

        let view = match self.parse_attribute(0)? {
            Node::AttributeSingle(attr) if attr.value == "view" => attr,
            other => return Err(self.fail(ParseErrorKind::MissingView, other.span())),
        };
        let is_widget = match &*view.child {
            Node::Element(_) | Node::ElementSingle(_) => true,
            Node::Identifier(id) => WIDGETS.contains(&id.value.as_str()),
            _ => false,
        };
        if !is_widget {
            return Err(self.fail(ParseErrorKind::ViewNotWidget, view.child.span()));
        }

        self.skip_newlines();
        self.expect(TokenKind::EndOfFile)?;

        debug!(?kind, view = view.child.value(), "parsed document");
        Ok(SourceDocument {
            kind,
            view_model,
            view,
        })
    }

    fn parse_node(&mut self, indent: usize) -> Result<Node, ParseError> {
        let mut indent = indent;
        if self.at(TokenKind::Indentation) {
            indent = self.bump().span.len();
        }

        let current = self.current();
        let is_constant = current.category == TokenCategory::Constant
            || (current.kind == TokenKind::Identifier && current.value == "null");
        let node = if is_constant {
            self.parse_constant()?
        } else {
            match current.kind {
                TokenKind::Dot => self.parse_attribute(indent)?,
                TokenKind::DollarSign => self.parse_function_call()?,
                TokenKind::Ampersand => self.parse_callback()?,
                _ => self.parse_element(indent)?,
            }
        };

        trace!(kind = %node.kind(), value = node.value(), "node");
        Ok(node)
    }

    /// A bare name is a leaf unless structure follows it on the same line or
    /// on deeper-indented lines below.
    fn is_bare_identifier(&self, indent: usize) -> bool {
        match self.current().kind {
            TokenKind::Comma | TokenKind::EndOfFile => true,
            TokenKind::NewLine => {
                let mut offset = 1;
                while self.peek(offset).kind == TokenKind::NewLine {
                    offset += 1;
                }
                let next = self.peek(offset);
                !(next.kind == TokenKind::Indentation && next.span.len() > indent)
            }
            _ => false,
        }
    }

    fn parse_element(&mut self, indent: usize) -> Result<Node, ParseError> {
        let start = self.expect_one_of(&[TokenKind::Identifier, TokenKind::Widget])?;

        if self.is_bare_identifier(indent) {
            return Ok(Node::Identifier(IdentifierNode {
                value: start.value,
                span: start.span,
            }));
        }

        let mut children = Vec::new();
        while !matches!(
            self.current().kind,
            TokenKind::Colon | TokenKind::Indentation | TokenKind::NewLine | TokenKind::EndOfFile
        ) {
            children.push(self.parse_node(indent)?);
            if self.at(TokenKind::Comma) {
                self.advance();
            }
        }

        let mut end = children.last().map_or(start.span.end, |c| c.span().end);
        if !self.at(TokenKind::EndOfFile) {
            let needs_colon =
                !self.at(TokenKind::Indentation) && children.last().is_none_or(|c| !c.is_value());
            if needs_colon {
                if let Some(colon) = self.take_colon()? {
                    end = colon.span.end;
                }
            }
            self.parse_block(indent, &mut children)?;
        }

        if let Some(last) = children.last() {
            if last.span().end.index > end.index {
                end = last.span().end;
            }
        }
        Ok(Node::element(
            start.value,
            SourceSpan::new(start.span.start, end),
            children,
        ))
    }

    fn parse_attribute(&mut self, indent: usize) -> Result<Node, ParseError> {
        let start = self.expect(TokenKind::Dot)?;
        let name = self.expect(TokenKind::Identifier)?;

        let mut end = name.span.end;
        if let Some(colon) = self.take_colon()? {
            end = colon.span.end;
        }

        let mut children = Vec::new();
        if self.at(TokenKind::NewLine) {
            self.parse_block(indent, &mut children)?;
        } else {
            children.push(self.parse_node(indent)?);
        }

        if let Some(last) = children.last() {
            end = last.span().end;
        }
        let span = SourceSpan::new(start.span.start, end);
        match Node::attribute(name.value.clone(), span, children) {
            Some(node) => Ok(node),
            None => Err(self.fail(ParseErrorKind::EmptyAttribute { name: name.value }, span)),
        }
    }

    fn parse_function_call(&mut self) -> Result<Node, ParseError> {
        let start = self.expect(TokenKind::DollarSign)?;
        let id = self.expect(TokenKind::Identifier)?;
        Ok(Node::FunctionCall(FunctionCallNode {
            value: id.value,
            span: SourceSpan::new(start.span.start, id.span.end),
        }))
    }

    fn parse_callback(&mut self) -> Result<Node, ParseError> {
        let start = self.expect(TokenKind::Ampersand)?;
        let id = self.expect(TokenKind::Identifier)?;
        Ok(Node::Callback(CallbackNode {
            value: id.value,
            span: SourceSpan::new(start.span.start, id.span.end),
        }))
    }

    fn parse_constant(&mut self) -> Result<Node, ParseError> {
        let current = self.current();
        let constant_kind = match current.kind {
            TokenKind::BooleanLiteral => ConstantKind::Boolean,
            TokenKind::StringLiteral => ConstantKind::String,
            TokenKind::IntegerLiteral => ConstantKind::Integer,
            TokenKind::FloatLiteral => ConstantKind::Float,
            TokenKind::Identifier if current.value == "null" => ConstantKind::Null,
            _ => return Err(self.unexpected("Constant")),
        };
        let token = self.bump();
        Ok(Node::Constant(ConstantNode {
            value: token.value,
            constant_kind,
            span: token.span,
        }))
    }

    // -- Errors --

    /// Step past the offending token and report it.
    fn unexpected(&mut self, expected: &str) -> ParseError {
        self.advance();
        let found = self.peek(-1);
        let kind = ParseErrorKind::UnexpectedToken {
            found: found.to_string(),
            expected: expected.to_string(),
        };
        let span = found.span;
        self.fail(kind, span)
    }

    fn fail(&mut self, kind: ParseErrorKind, span: SourceSpan) -> ParseError {
        debug!(%kind, line = span.start.line, "parse failed");
        self.diagnostics
            .report(kind.severity(), kind.to_string(), span, self.source);
        ParseError { kind, span }
    }
}
