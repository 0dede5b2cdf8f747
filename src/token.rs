use std::fmt;

use serde::Serialize;

use crate::source::SourceSpan;

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// End of input. Always the last token.
    EndOfFile,
    /// Malformed input; a diagnostic was recorded for it.
    Error,

    /// Whitespace in the middle of a line.
    WhiteSpace,
    /// A run of line breaks.
    NewLine,
    /// Whitespace at the start of a line.
    Indentation,

    /// `! ...` up to the end of the line.
    LineComment,
    /// `!! ... !!`, may span lines.
    BlockComment,

    IntegerLiteral,
    StringLiteral,
    FloatLiteral,
    /// `true` or `false`.
    BooleanLiteral,

    Identifier,
    /// An identifier naming a known widget.
    Widget,

    /// `.`
    Dot,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `$`, introduces a function call.
    DollarSign,
    /// `@`, introduces a callback.
    Ampersand,
}

impl TokenKind {
    /// Category of this kind.
    #[must_use]
    pub const fn category(self) -> TokenCategory {
        match self {
            Self::Dot | Self::Colon | Self::Comma | Self::DollarSign | Self::Ampersand => {
                TokenCategory::Punctuation
            }
            Self::LineComment | Self::BlockComment => TokenCategory::Comment,
            Self::NewLine | Self::WhiteSpace | Self::Indentation => TokenCategory::WhiteSpace,
            Self::Identifier | Self::Widget => TokenCategory::Identifier,
            Self::StringLiteral | Self::IntegerLiteral | Self::FloatLiteral | Self::BooleanLiteral => {
                TokenCategory::Constant
            }
            Self::EndOfFile => TokenCategory::Metadata,
            Self::Error => TokenCategory::Invalid,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EndOfFile => "EndOfFile",
            Self::Error => "Error",
            Self::WhiteSpace => "WhiteSpace",
            Self::NewLine => "NewLine",
            Self::Indentation => "Indentation",
            Self::LineComment => "LineComment",
            Self::BlockComment => "BlockComment",
            Self::IntegerLiteral => "IntegerLiteral",
            Self::StringLiteral => "StringLiteral",
            Self::FloatLiteral => "FloatLiteral",
            Self::BooleanLiteral => "BooleanLiteral",
            Self::Identifier => "Identifier",
            Self::Widget => "Widget",
            Self::Dot => "Dot",
            Self::Colon => "Colon",
            Self::Comma => "Comma",
            Self::DollarSign => "DollarSign",
            Self::Ampersand => "Ampersand",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coarse grouping of token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenCategory {
    WhiteSpace,
    Comment,
    Constant,
    Identifier,
    Punctuation,
    Metadata,
    Invalid,
}

/// A single token with its kind, text, and source span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub category: TokenCategory,
    pub value: String,
    pub span: SourceSpan,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, value: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            kind,
            category: kind.category(),
            value: value.into(),
            span,
        }
    }

    /// Whitespace and comments, dropped before parsing.
    #[must_use]
    pub fn is_trivia(&self) -> bool {
        self.kind == TokenKind::WhiteSpace || self.category == TokenCategory::Comment
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}", self.value)
        }
    }
}
