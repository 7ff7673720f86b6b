//! Syntax kind enumeration for the CST
//!
//! Every token and node the parser can produce has a kind here. Values are
//! grouped in numbered ranges so classification is a range check.

use std::fmt;

/// Syntax kind for source elements
///
/// The enum covers:
/// - Trivia (whitespace, newlines, comments)
/// - Keywords
/// - Punctuation and operators
/// - Literals and identifiers
/// - Structural nodes (declarations, statements, expressions, types)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum CsSyntaxKind {
    // ==================
    // Trivia (0-9)
    // ==================
    /// Spaces and tabs
    Whitespace = 0,
    /// `\n` or `\r\n`
    Newline = 1,
    /// `// ...` up to the end of the line
    LineComment = 2,
    /// `/* ... */`
    BlockComment = 3,

    // ==================
    // Keywords (10-99)
    // ==================

    // Declaration keywords
    UsingKw = 10,
    NamespaceKw = 11,
    ClassKw = 12,
    StructKw = 13,
    InterfaceKw = 14,

    // Modifiers
    PublicKw = 15,
    PrivateKw = 16,
    ProtectedKw = 17,
    InternalKw = 18,
    StaticKw = 19,
    SealedKw = 20,
    AbstractKw = 21,
    ReadonlyKw = 22,
    OverrideKw = 23,
    VirtualKw = 24,
    PartialKw = 25,
    ConstKw = 26,

    // Statement and expression keywords
    ThisKw = 30,
    OutKw = 31,
    RefKw = 32,
    InKw = 33,
    NewKw = 34,
    ReturnKw = 35,
    IfKw = 36,
    ElseKw = 37,
    ForeachKw = 38,
    TrueKw = 39,
    FalseKw = 40,
    NullKw = 41,

    // Predefined types
    VoidKw = 50,
    IntKw = 51,
    LongKw = 52,
    DoubleKw = 53,
    FloatKw = 54,
    DecimalKw = 55,
    BoolKw = 56,
    CharKw = 57,
    StringKw = 58,
    ObjectKw = 59,

    // ==================
    // Punctuation (100-149)
    // ==================
    LBrace = 100,
    RBrace = 101,
    LParen = 102,
    RParen = 103,
    LBracket = 104,
    RBracket = 105,
    Semicolon = 106,
    Comma = 107,
    Dot = 108,
    /// `..` (spread)
    DotDot = 109,
    Colon = 110,
    Question = 111,
    QuestionQuestion = 112,
    /// `=>`
    FatArrow = 113,
    Eq = 114,
    EqEq = 115,
    Bang = 116,
    BangEq = 117,
    Lt = 118,
    Gt = 119,
    LtEq = 120,
    GtEq = 121,
    Plus = 122,
    Minus = 123,
    Star = 124,
    Slash = 125,
    Percent = 126,
    AmpAmp = 127,
    PipePipe = 128,
    Amp = 129,
    Pipe = 130,
    Caret = 131,
    Tilde = 132,
    PlusEq = 133,
    MinusEq = 134,
    StarEq = 135,
    SlashEq = 136,
    PlusPlus = 137,
    MinusMinus = 138,

    // ==================
    // Literals and identifiers (150-199)
    // ==================
    Ident = 150,
    IntLiteral = 151,
    RealLiteral = 152,
    StringLiteral = 153,
    /// `$"..."`, kept as a single token
    InterpolatedString = 154,
    CharLiteral = 155,
    /// Unrecognized input
    Error = 190,
    /// Zero-width end marker; carries the final leading trivia
    Eof = 191,

    // ==================
    // Declarations (200-229)
    // ==================
    CompilationUnit = 200,
    UsingDirective = 201,
    NamespaceDecl = 202,
    /// Dotted name in `using` and `namespace` declarations
    QualifiedName = 203,
    /// `class`, `struct` or `interface` declaration
    TypeDecl = 204,
    BaseList = 205,
    FieldDecl = 206,
    MethodDecl = 207,
    PropertyDecl = 208,
    ConstructorDecl = 209,
    AccessorList = 210,
    TypeParamList = 211,
    ParamList = 212,
    Param = 213,
    /// `=> expr` member body
    ArrowBody = 214,

    // ==================
    // Statements (230-249)
    // ==================
    Block = 230,
    LocalDecl = 231,
    VarDeclarator = 232,
    ExprStmt = 233,
    ReturnStmt = 234,
    IfStmt = 235,
    ElseClause = 236,
    ForeachStmt = 237,
    EmptyStmt = 238,

    // ==================
    // Types (250-269)
    // ==================
    PredefinedType = 250,
    NamedType = 251,
    ArrayType = 252,
    NullableType = 253,
    TypeArgList = 254,

    // ==================
    // Expressions (270-329)
    // ==================
    Literal = 270,
    /// Identifier (or predefined type keyword) in expression position,
    /// with optional type arguments
    NameRef = 271,
    MemberAccess = 272,
    Invocation = 273,
    ArgList = 274,
    Arg = 275,
    /// `var x` / `int x` inside an argument
    DeclExpr = 276,
    ElementAccess = 277,
    ParenExpr = 278,
    BinaryExpr = 279,
    PrefixExpr = 280,
    PostfixExpr = 281,
    ConditionalExpr = 282,
    AssignExpr = 283,
    Lambda = 284,
    LambdaParamList = 285,
    /// `new[] { ... }`
    ImplicitArrayCreation = 287,
    /// `new T[] { ... }`
    ArrayCreation = 288,
    /// `new T(...) { ... }`
    ObjectCreation = 289,
    InitializerList = 290,
    /// `[a, ..b]`
    CollectionExpr = 291,
    SpreadElement = 292,

    /// Node wrapping input the parser could not place
    ErrorNode = 399,
}

impl CsSyntaxKind {
    /// Check if this is trivia (whitespace, newline or comment)
    pub const fn is_trivia(self) -> bool {
        (self as u16) < 10
    }

    pub const fn is_comment(self) -> bool {
        matches!(self, Self::LineComment | Self::BlockComment)
    }

    pub const fn is_keyword(self) -> bool {
        let v = self as u16;
        v >= 10 && v < 100
    }

    pub const fn is_punct(self) -> bool {
        let v = self as u16;
        v >= 100 && v < 150
    }

    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::IntLiteral
                | Self::RealLiteral
                | Self::StringLiteral
                | Self::InterpolatedString
                | Self::CharLiteral
                | Self::TrueKw
                | Self::FalseKw
                | Self::NullKw
        )
    }

    /// Check if this is a node kind rather than a token kind
    pub const fn is_node(self) -> bool {
        (self as u16) >= 200
    }

    /// Keywords that name a predefined type
    pub const fn is_predefined_type(self) -> bool {
        let v = self as u16;
        v >= 50 && v < 60
    }

    pub const fn is_modifier(self) -> bool {
        let v = self as u16;
        v >= 15 && v <= 26
    }

    /// Binding power of a binary operator (higher binds tighter)
    pub const fn binary_precedence(self) -> Option<u8> {
        Some(match self {
            Self::QuestionQuestion => 1,
            Self::PipePipe => 2,
            Self::AmpAmp => 3,
            Self::Pipe => 4,
            Self::Caret => 5,
            Self::Amp => 6,
            Self::EqEq | Self::BangEq => 7,
            Self::Lt | Self::Gt | Self::LtEq | Self::GtEq => 8,
            Self::Plus | Self::Minus => 9,
            Self::Star | Self::Slash | Self::Percent => 10,
            _ => return None,
        })
    }

    pub const fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::PlusEq | Self::MinusEq | Self::StarEq | Self::SlashEq
        )
    }

    /// Keyword for an identifier-like word, if it is reserved
    pub fn from_keyword(text: &str) -> Option<Self> {
        Some(match text {
            "using" => Self::UsingKw,
            "namespace" => Self::NamespaceKw,
            "class" => Self::ClassKw,
            "struct" => Self::StructKw,
            "interface" => Self::InterfaceKw,
            "public" => Self::PublicKw,
            "private" => Self::PrivateKw,
            "protected" => Self::ProtectedKw,
            "internal" => Self::InternalKw,
            "static" => Self::StaticKw,
            "sealed" => Self::SealedKw,
            "abstract" => Self::AbstractKw,
            "readonly" => Self::ReadonlyKw,
            "override" => Self::OverrideKw,
            "virtual" => Self::VirtualKw,
            "partial" => Self::PartialKw,
            "const" => Self::ConstKw,
            "this" => Self::ThisKw,
            "out" => Self::OutKw,
            "ref" => Self::RefKw,
            "in" => Self::InKw,
            "new" => Self::NewKw,
            "return" => Self::ReturnKw,
            "if" => Self::IfKw,
            "else" => Self::ElseKw,
            "foreach" => Self::ForeachKw,
            "true" => Self::TrueKw,
            "false" => Self::FalseKw,
            "null" => Self::NullKw,
            "void" => Self::VoidKw,
            "int" => Self::IntKw,
            "long" => Self::LongKw,
            "double" => Self::DoubleKw,
            "float" => Self::FloatKw,
            "decimal" => Self::DecimalKw,
            "bool" => Self::BoolKw,
            "char" => Self::CharKw,
            "string" => Self::StringKw,
            "object" => Self::ObjectKw,
            _ => return None,
        })
    }

    /// Fixed source text of keyword and punctuation kinds
    pub const fn static_text(self) -> Option<&'static str> {
        Some(match self {
            Self::UsingKw => "using",
            Self::NamespaceKw => "namespace",
            Self::ClassKw => "class",
            Self::StructKw => "struct",
            Self::InterfaceKw => "interface",
            Self::PublicKw => "public",
            Self::PrivateKw => "private",
            Self::ProtectedKw => "protected",
            Self::InternalKw => "internal",
            Self::StaticKw => "static",
            Self::SealedKw => "sealed",
            Self::AbstractKw => "abstract",
            Self::ReadonlyKw => "readonly",
            Self::OverrideKw => "override",
            Self::VirtualKw => "virtual",
            Self::PartialKw => "partial",
            Self::ConstKw => "const",
            Self::ThisKw => "this",
            Self::OutKw => "out",
            Self::RefKw => "ref",
            Self::InKw => "in",
            Self::NewKw => "new",
            Self::ReturnKw => "return",
            Self::IfKw => "if",
            Self::ElseKw => "else",
            Self::ForeachKw => "foreach",
            Self::TrueKw => "true",
            Self::FalseKw => "false",
            Self::NullKw => "null",
            Self::VoidKw => "void",
            Self::IntKw => "int",
            Self::LongKw => "long",
            Self::DoubleKw => "double",
            Self::FloatKw => "float",
            Self::DecimalKw => "decimal",
            Self::BoolKw => "bool",
            Self::CharKw => "char",
            Self::StringKw => "string",
            Self::ObjectKw => "object",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Semicolon => ";",
            Self::Comma => ",",
            Self::Dot => ".",
            Self::DotDot => "..",
            Self::Colon => ":",
            Self::Question => "?",
            Self::QuestionQuestion => "??",
            Self::FatArrow => "=>",
            Self::Eq => "=",
            Self::EqEq => "==",
            Self::Bang => "!",
            Self::BangEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::AmpAmp => "&&",
            Self::PipePipe => "||",
            Self::Amp => "&",
            Self::Pipe => "|",
            Self::Caret => "^",
            Self::Tilde => "~",
            Self::PlusEq => "+=",
            Self::MinusEq => "-=",
            Self::StarEq => "*=",
            Self::SlashEq => "/=",
            Self::PlusPlus => "++",
            Self::MinusMinus => "--",
            _ => return None,
        })
    }
}

impl fmt::Display for CsSyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.static_text() {
            Some(text) => write!(f, "'{text}'"),
            None => write!(f, "{self:?}"),
        }
    }
}

impl From<CsSyntaxKind> for rowan::SyntaxKind {
    fn from(kind: CsSyntaxKind) -> Self {
        Self(kind as u16)
    }
}
