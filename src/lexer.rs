use std::fmt;

use tracing::{debug, trace};

use crate::diagnostic::{DiagnosticSink, Severity};
use crate::source::{SourceBuffer, SourceLocation, SourceSpan};
use crate::token::{Token, TokenKind};

/// Widget names promoted from `Identifier` to `Widget`.
pub const WIDGETS: &[&str] = &[
    "AbsorbPointer",
    "AlertDialog",
    "Align",
    "AnimatedBuilder",
    "AnimatedContainer",
    "AnimatedCrossFade",
    "AnimatedDefaultTextStyle",
    "AnimatedListState",
    "AnimatedModalBarrier",
    "AnimatedOpacity",
    "AnimatedPhysicalModel",
    "AnimatedPositioned",
    "AnimatedSize",
    "AnimatedWidget",
    "AnimatedWidgetBaseState",
    "Appbar",
    "AspectRatio",
    "AssetBundle",
    "BackdropFilter",
    "Baseline",
    "BottomNavigationBar",
    "BottomSheet",
    "ButtonBar",
    "Card",
    "Center",
    "Checkbox",
    "Chip",
    "ClipOval",
    "ClipPath",
    "ClipRect",
    "Column",
    "ConstrainedBox",
    "Container",
    "CupertinoActivityIndicator",
    "CupertinoAlertDialog",
    "CupertinoButton",
    "CupertinoDialog",
    "CupertinoDialogAction",
    "CupertinoFullscreenDialogTransition",
    "CupertinoNavigationBar",
    "CupertinoPageScaffold",
    "CupertinoPageTransition",
    "CupertinoPicker",
    "CupertinoSlider",
    "CupertinoSwitch",
    "CupertinoTabBar",
    "CupertinoTabScaffold",
    "CupertinoTabView",
    "CustomMultiChildLayout",
    "CustomPaint",
    "CustomScrollView",
    "CustomSingleChildLayout",
    "DataTable",
    "DecoratedBox",
    "DecoratedBoxTransition",
    "DefaultTextStyle",
    "Dismissible",
    "Divider",
    "DragTarget",
    "Draggable",
    "Drawer",
    "ExcludeSemantics",
    "ExpansionPanel",
    "FadeTransition",
    "FittedBox",
    "FlatButton",
    "FloatingActionButton",
    "Flow",
    "FlutterLogo",
    "Form",
    "FormField",
    "FractionalTranslation",
    "FractionallySizedBox",
    "FutureBuilder",
    "GestureDetector",
    "GridView",
    "Hero",
    "Icon",
    "IconButton",
    "IgnorePointer",
    "Image",
    "IndexedStack",
    "IntrinsicHeight",
    "IntrinsicWidth",
    "LayoutBuilder",
    "LimitedBox",
    "LinearProgressIndicator",
    "ListBody",
    "ListTile",
    "ListView",
    "LongPressDraggable",
    "MediaQuery",
    "MergeSemantics",
    "Navigator",
    "NestedScrollView",
    "NotificationListener",
    "Offstage",
    "Opacity",
    "OverflowBox",
    "Padding",
    "Placeholder",
    "PopupMenuButton",
    "PositionedTransition",
    "Radio",
    "RaisedButton",
    "RawImage",
    "RawKeyboardListener",
    "RefreshIndicator",
    "RichText",
    "RotatedBox",
    "RotationTransition",
    "Row",
    "Scaffold",
    "ScaleTransition",
    "ScrollConfiguration",
    "Scrollable",
    "Scrollbar",
    "Semantics",
    "SimpleDialog",
    "SingleChildScrollView",
    "SizeTransition",
    "SizedBox",
    "SizedOverflowBox",
    "SlideTransition",
    "Slider",
    "SnackBar",
    "Stack",
    "Stepper",
    "StreamBuilder",
    "Switch",
    "TabBar",
    "TabBarView",
    "Table",
    "Text",
    "TextField",
    "Theme",
    "Tooltip",
    "Transform",
    "Wrap",
];

const BOOLEANS: &[&str] = &["true", "false"];

const PUNCTUATION: &str = "<>{}()[]!$%^&*+-=/.,?;:|~@#";

/// Classifies a lexer diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Indentation uses a different character than the first indented line.
    InconsistentIndentation { expected: char },
    /// Text that cannot start or continue any token.
    UnexpectedToken(String),
    /// A `.`, `e`, or `-` in a number with no digits after it.
    MissingDigits { after: char },
    /// A float immediately followed by letters.
    InvalidFloat(String),
    /// End of input inside a string literal.
    UnterminatedString,
    /// Raw line break inside a string literal.
    LineBreakInString,
    /// End of input inside a `!! ... !!` comment.
    UnterminatedBlockComment,
}

impl LexErrorKind {
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::InconsistentIndentation { .. } => Severity::Warning,
            Self::UnterminatedString => Severity::Fatal,
            Self::UnexpectedToken(_)
            | Self::MissingDigits { .. }
            | Self::InvalidFloat(_)
            | Self::LineBreakInString
            | Self::UnterminatedBlockComment => Severity::Error,
        }
    }
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InconsistentIndentation { expected } => {
                let name = if *expected == '\t' { "tab" } else { "space" };
                write!(f, "Inconsistent indentation character, {name} expected.")
            }
            Self::UnexpectedToken(text) => write!(f, "Unexpected token '{text}'"),
            Self::MissingDigits { after } => write!(f, "Must contain digits after '{after}'"),
            Self::InvalidFloat(text) => write!(f, "'{text}' is an invalid float value."),
            Self::UnterminatedString => write!(f, "Unexpected end of file"),
            Self::LineBreakInString => write!(f, "Unexpected line break in string literal"),
            Self::UnterminatedBlockComment => write!(f, "Unterminated block comment"),
        }
    }
}

/// Tokenize `source` eagerly, appending lexer diagnostics to `diagnostics`.
///
/// The returned vector always ends with exactly one `EndOfFile` token.
pub fn tokenize(source: &SourceBuffer, diagnostics: &mut DiagnosticSink) -> Vec<Token> {
    Tokens::new(source, diagnostics).collect()
}

/// Reusable lexer owning its own diagnostic sink.
///
/// Each call to [`Lexer::tokenize`] clears the sink and starts from a fresh
/// scan state, so one instance can process any number of files.
#[derive(Debug, Default)]
pub struct Lexer {
    diagnostics: DiagnosticSink,
}

impl Lexer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            diagnostics: DiagnosticSink::new(),
        }
    }

    /// Lazily tokenize `source`.
    pub fn tokenize<'a>(&'a mut self, source: &'a SourceBuffer) -> Tokens<'a> {
        self.diagnostics.clear();
        Tokens::new(source, &mut self.diagnostics)
    }

    #[must_use]
    pub const fn diagnostics(&self) -> &DiagnosticSink {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticSink {
        std::mem::take(&mut self.diagnostics)
    }
}

/// Lazy token stream over a [`SourceBuffer`].
pub struct Tokens<'a> {
    source: &'a SourceBuffer,
    diagnostics: &'a mut DiagnosticSink,
    text: String,
    index: usize,
    line: u32,
    column: u32,
    token_start: SourceLocation,
    indentation: Option<char>,
    finished: bool,
}

impl<'a> Tokens<'a> {
    pub fn new(source: &'a SourceBuffer, diagnostics: &'a mut DiagnosticSink) -> Self {
        debug!(chars = source.len(), "tokenizing");
        Self {
            source,
            diagnostics,
            text: String::new(),
            index: 0,
            line: 1,
            column: 0,
            token_start: SourceLocation::new(0, 1, 0),
            indentation: None,
            finished: false,
        }
    }

    fn ch(&self) -> char {
        self.source.char_at(self.index)
    }

    fn peek(&self, offset: usize) -> char {
        self.source.char_at(self.index + offset)
    }

    fn prev_char(&self) -> char {
        self.index
            .checked_sub(1)
            .map_or(SourceBuffer::SENTINEL, |i| self.source.char_at(i))
    }

    const fn location(&self) -> SourceLocation {
        SourceLocation::new(self.index, self.line, self.column)
    }

    fn advance(&mut self) {
        self.index += 1;
        self.column += 1;
    }

    fn consume(&mut self) {
        let ch = self.ch();
        self.text.push(ch);
        self.advance();
    }

    fn consume_digits(&mut self) -> usize {
        let mut count = 0;
        while self.ch().is_ascii_digit() {
            self.consume();
            count += 1;
        }
        count
    }

    fn create(&mut self, kind: TokenKind) -> Token {
        let end = self.location();
        let span = SourceSpan::new(self.token_start, end);
        self.token_start = end;
        Token::new(kind, std::mem::take(&mut self.text), span)
    }

    fn report(&mut self, kind: &LexErrorKind) {
        let span = SourceSpan::new(self.token_start, self.location());
        self.diagnostics
            .report(kind.severity(), kind.to_string(), span, self.source);
    }

    fn is_eof(&self) -> bool {
        self.index >= self.source.len()
    }

    fn is_newline(&self) -> bool {
        matches!(self.ch(), '\r' | '\n')
    }

    fn is_whitespace(&self) -> bool {
        !self.is_eof() && self.ch().is_whitespace() && !self.is_newline()
    }

    fn is_indentation(&self) -> bool {
        matches!(self.ch(), ' ' | '\t')
    }

    fn is_punctuation(&self) -> bool {
        PUNCTUATION.contains(self.ch())
    }

    fn is_identifier(&self) -> bool {
        let ch = self.ch();
        ch.is_alphanumeric() || ch == '_'
    }

    /// Characters allowed to directly follow a literal or identifier.
    fn is_terminator(&self) -> bool {
        self.is_eof() || self.is_whitespace() || self.is_newline() || self.is_punctuation()
    }

    fn next_token(&mut self) -> Token {
        let ch = self.ch();
        if self.is_newline() {
            self.scan_newline()
        } else if self.is_whitespace() {
            self.scan_whitespace()
        } else if ch.is_ascii_digit() || (ch == '-' && self.peek(1).is_ascii_digit()) {
            self.scan_number()
        } else if ch == '!' {
            self.scan_comment()
        } else if ch.is_alphabetic() || ch == '_' {
            self.scan_identifier()
        } else if ch == '\'' || ch == '"' {
            self.scan_string()
        } else if self.is_punctuation() {
            self.scan_punctuation()
        } else {
            self.scan_word(LexErrorKind::UnexpectedToken)
        }
    }

    fn scan_newline(&mut self) -> Token {
        while self.is_newline() {
            if self.ch() == '\n' {
                self.line += 1;
            }
            self.consume();
        }
        self.column = 0;
        self.create(TokenKind::NewLine)
    }

    fn scan_whitespace(&mut self) -> Token {
        if self.column == 0 && self.is_indentation() {
            return self.scan_indentation();
        }

        while self.is_whitespace() {
            self.consume();
        }
        self.create(TokenKind::WhiteSpace)
    }

    fn scan_indentation(&mut self) -> Token {
        let first = self.ch();
        while self.is_indentation() {
            self.consume();
        }

        match self.indentation {
            None => self.indentation = Some(first),
            Some(expected) if expected != first => {
                self.report(&LexErrorKind::InconsistentIndentation { expected });
            }
            Some(_) => {}
        }

        self.create(TokenKind::Indentation)
    }

    fn scan_number(&mut self) -> Token {
        if self.ch() == '-' {
            self.consume();
        }
        self.consume_digits();

        if matches!(self.ch(), '.' | 'e') {
            return self.scan_float();
        }
        if self.ch() == 'x' && matches!(self.text.as_str(), "0" | "-0") {
            self.consume();
            while self.ch().is_ascii_hexdigit() {
                self.consume();
            }
        }

        if !self.is_terminator() {
            return self.scan_word(LexErrorKind::UnexpectedToken);
        }
        self.create(TokenKind::IntegerLiteral)
    }

    fn scan_float(&mut self) -> Token {
        if self.ch() == '.' {
            self.consume();
            if self.consume_digits() == 0 {
                return self.scan_word(|_| LexErrorKind::MissingDigits { after: '.' });
            }
        }

        if self.ch() == 'e' {
            self.consume();
            if self.ch() == '-' {
                self.consume();
            }
            if self.consume_digits() == 0 {
                let after = self.prev_char();
                return self.scan_word(|_| LexErrorKind::MissingDigits { after });
            }
        }

        if !self.is_terminator() {
            if self.ch().is_alphabetic() {
                return self.scan_word(LexErrorKind::InvalidFloat);
            }
            return self.scan_word(LexErrorKind::UnexpectedToken);
        }
        self.create(TokenKind::FloatLiteral)
    }

    fn scan_comment(&mut self) -> Token {
        self.consume();
        if self.ch() == '!' {
            self.consume();
            return self.scan_block_comment();
        }

        while !self.is_newline() && !self.is_eof() {
            self.consume();
        }
        self.create(TokenKind::LineComment)
    }

    fn scan_block_comment(&mut self) -> Token {
        loop {
            if self.is_eof() {
                self.report(&LexErrorKind::UnterminatedBlockComment);
                return self.create(TokenKind::Error);
            }
            if self.ch() == '!' && self.peek(1) == '!' {
                self.consume();
                self.consume();
                return self.create(TokenKind::BlockComment);
            }

            let newline = self.ch() == '\n';
            self.consume();
            if newline {
                self.line += 1;
                self.column = 0;
            }
        }
    }

    fn scan_identifier(&mut self) -> Token {
        while self.is_identifier() {
            self.consume();
        }

        if !self.is_terminator() {
            return self.scan_word(LexErrorKind::UnexpectedToken);
        }

        let kind = if BOOLEANS.contains(&self.text.as_str()) {
            TokenKind::BooleanLiteral
        } else if WIDGETS.contains(&self.text.as_str()) {
            TokenKind::Widget
        } else {
            TokenKind::Identifier
        };
        self.create(kind)
    }

    fn scan_string(&mut self) -> Token {
        let quote = self.ch();
        self.advance();

        while self.ch() != quote {
            if self.is_eof() {
                self.report(&LexErrorKind::UnterminatedString);
                return self.create(TokenKind::Error);
            }
            if self.is_newline() {
                self.report(&LexErrorKind::LineBreakInString);
                return self.create(TokenKind::Error);
            }
            self.consume();
        }

        self.advance();
        self.create(TokenKind::StringLiteral)
    }

    fn scan_punctuation(&mut self) -> Token {
        let kind = match self.ch() {
            ':' => TokenKind::Colon,
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            '$' => TokenKind::DollarSign,
            '@' => TokenKind::Ampersand,
            _ => return self.scan_word(LexErrorKind::UnexpectedToken),
        };
        self.consume();
        self.create(kind)
    }

    /// Consume the rest of a malformed word and report it as one error token.
    fn scan_word(&mut self, error: impl FnOnce(String) -> LexErrorKind) -> Token {
        if self.text.is_empty() {
            self.consume();
        }
        while !self.is_terminator() {
            self.consume();
        }

        let kind = error(self.text.clone());
        self.report(&kind);
        self.create(TokenKind::Error)
    }
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        let token = if self.is_eof() {
            self.finished = true;
            debug!(lines = self.line, "tokenized");
            self.create(TokenKind::EndOfFile)
        } else {
            self.next_token()
        };
        trace!(kind = %token.kind, value = %token.value, "token");
        Some(token)
    }
}

impl std::iter::FusedIterator for Tokens<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> (Vec<Token>, DiagnosticSink) {
        let source = SourceBuffer::new(input);
        let mut sink = DiagnosticSink::new();
        let tokens = tokenize(&source, &mut sink);
        (tokens, sink)
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).0.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_input_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::EndOfFile]);
    }

    #[test]
    fn header_with_attribute() {
        assert_eq!(
            kinds("Text .style: bold"),
            vec![
                TokenKind::Widget,
                TokenKind::WhiteSpace,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::WhiteSpace,
                TokenKind::Identifier,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn indentation_only_at_line_start() {
        assert_eq!(
            kinds("a\n\tb c"),
            vec![
                TokenKind::Identifier,
                TokenKind::NewLine,
                TokenKind::Indentation,
                TokenKind::Identifier,
                TokenKind::WhiteSpace,
                TokenKind::Identifier,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn newline_run_is_one_token_but_counts_lines() {
        let (tokens, _) = lex("a\n\n\nb");
        assert_eq!(tokens[1].kind, TokenKind::NewLine);
        assert_eq!(tokens[2].value, "b");
        assert_eq!(tokens[2].span.start.line, 4);
        assert_eq!(tokens[2].span.start.column, 0);
    }

    #[test]
    fn crlf_newlines() {
        let (tokens, _) = lex("a\r\nb");
        assert_eq!(tokens[1].value, "\r\n");
        assert_eq!(tokens[2].span.start.line, 2);
    }

    #[test]
    fn hex_literal() {
        let (tokens, sink) = lex("0xFF");
        assert_eq!(tokens[0].kind, TokenKind::IntegerLiteral);
        assert_eq!(tokens[0].value, "0xFF");
        assert!(sink.is_empty());

        let (tokens, sink) = lex("-0x1f");
        assert_eq!(tokens[0].kind, TokenKind::IntegerLiteral);
        assert_eq!(tokens[0].value, "-0x1f");
        assert!(sink.is_empty());
    }

    #[test]
    fn hex_prefix_needs_lone_zero() {
        let (tokens, sink) = lex("10x5");
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].value, "10x5");
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn negative_number_and_stray_minus() {
        let (tokens, _) = lex("-42");
        assert_eq!(tokens[0].kind, TokenKind::IntegerLiteral);
        assert_eq!(tokens[0].value, "-42");

        let (tokens, sink) = lex("- 1");
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].value, "-");
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn float_missing_fraction_digits() {
        let (tokens, sink) = lex("1. x");
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(sink.as_slice()[0].message, "Must contain digits after '.'");
    }

    #[test]
    fn float_missing_exponent_digits() {
        let (_, sink) = lex("1e ");
        assert_eq!(sink.as_slice()[0].message, "Must contain digits after 'e'");
        let (_, sink) = lex("1e- ");
        assert_eq!(sink.as_slice()[0].message, "Must contain digits after '-'");
    }

    #[test]
    fn invalid_float_suffix() {
        let (tokens, sink) = lex("1.5px");
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].value, "1.5px");
        assert_eq!(sink.as_slice()[0].message, "'1.5px' is an invalid float value.");
    }

    #[test]
    fn booleans_and_widgets() {
        let (tokens, _) = lex("true Column column");
        assert_eq!(tokens[0].kind, TokenKind::BooleanLiteral);
        assert_eq!(tokens[2].kind, TokenKind::Widget);
        assert_eq!(tokens[4].kind, TokenKind::Identifier);
    }

    #[test]
    fn string_value_excludes_quotes() {
        let (tokens, _) = lex("\"it's\"");
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].value, "it's");
        assert_eq!(tokens[0].span.len(), 6);
    }

    #[test]
    fn comments_are_trivia() {
        let (tokens, _) = lex("a ! note\n!! multi\nline !!b");
        assert_eq!(tokens[2].kind, TokenKind::LineComment);
        assert_eq!(tokens[2].value, "! note");
        assert_eq!(tokens[4].kind, TokenKind::BlockComment);
        assert!(tokens[2].is_trivia());
        assert!(tokens[4].is_trivia());
        assert_eq!(tokens[5].value, "b");
        assert_eq!(tokens[5].span.start.line, 3);
    }

    #[test]
    fn unterminated_block_comment() {
        let (tokens, sink) = lex("!! never closed");
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[1].kind, TokenKind::EndOfFile);
        assert!(sink.has_errors());
    }

    #[test]
    fn punctuation_tokens() {
        assert_eq!(
            kinds(":.,$@"),
            vec![
                TokenKind::Colon,
                TokenKind::Dot,
                TokenKind::Comma,
                TokenKind::DollarSign,
                TokenKind::Ampersand,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn unknown_punctuation_is_error_word() {
        let (tokens, sink) = lex("#hash ok");
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].value, "#hash");
        assert_eq!(sink.as_slice()[0].message, "Unexpected token '#hash'");
        assert_eq!(tokens[2].value, "ok");
    }

    #[test]
    fn lexer_instance_resets_between_runs() {
        let mut lexer = Lexer::new();
        let first = SourceBuffer::new("\ta\n  b");
        let count = lexer.tokenize(&first).count();
        assert!(count > 0);
        assert_eq!(lexer.diagnostics().len(), 1);

        let second = SourceBuffer::new("  a\n  b");
        let tokens: Vec<_> = lexer.tokenize(&second).collect();
        assert_eq!(tokens[0].span.start, SourceLocation::new(0, 1, 0));
        assert!(lexer.diagnostics().is_empty());
    }

    #[test]
    fn span_tracking() {
        let (tokens, _) = lex("a\nbc d");
        assert_eq!(tokens[0].span.start, SourceLocation::new(0, 1, 0));
        assert_eq!(tokens[0].span.end, SourceLocation::new(1, 1, 1));
        assert_eq!(tokens[2].span.start, SourceLocation::new(2, 2, 0));
        assert_eq!(tokens[4].span.start, SourceLocation::new(5, 2, 3));
    }
}
