//! Rowan language implementation
//!
//! Connects `CsSyntaxKind` to rowan's generic tree types.

use rowan::Language;

use super::CsSyntaxKind;

/// Zero-sized language tag for rowan trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CsLanguage;

impl Language for CsLanguage {
    type Kind = CsSyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        match raw.0 {
            0 => CsSyntaxKind::Whitespace,
            1 => CsSyntaxKind::Newline,
            2 => CsSyntaxKind::LineComment,
            3 => CsSyntaxKind::BlockComment,
            10 => CsSyntaxKind::UsingKw,
            11 => CsSyntaxKind::NamespaceKw,
            12 => CsSyntaxKind::ClassKw,
            13 => CsSyntaxKind::StructKw,
            14 => CsSyntaxKind::InterfaceKw,
            15 => CsSyntaxKind::PublicKw,
            16 => CsSyntaxKind::PrivateKw,
            17 => CsSyntaxKind::ProtectedKw,
            18 => CsSyntaxKind::InternalKw,
            19 => CsSyntaxKind::StaticKw,
            20 => CsSyntaxKind::SealedKw,
            21 => CsSyntaxKind::AbstractKw,
            22 => CsSyntaxKind::ReadonlyKw,
            23 => CsSyntaxKind::OverrideKw,
            24 => CsSyntaxKind::VirtualKw,
            25 => CsSyntaxKind::PartialKw,
            26 => CsSyntaxKind::ConstKw,
            30 => CsSyntaxKind::ThisKw,
            31 => CsSyntaxKind::OutKw,
            32 => CsSyntaxKind::RefKw,
            33 => CsSyntaxKind::InKw,
            34 => CsSyntaxKind::NewKw,
            35 => CsSyntaxKind::ReturnKw,
            36 => CsSyntaxKind::IfKw,
            37 => CsSyntaxKind::ElseKw,
            38 => CsSyntaxKind::ForeachKw,
            39 => CsSyntaxKind::TrueKw,
            40 => CsSyntaxKind::FalseKw,
            41 => CsSyntaxKind::NullKw,
            50 => CsSyntaxKind::VoidKw,
            51 => CsSyntaxKind::IntKw,
            52 => CsSyntaxKind::LongKw,
            53 => CsSyntaxKind::DoubleKw,
            54 => CsSyntaxKind::FloatKw,
            55 => CsSyntaxKind::DecimalKw,
            56 => CsSyntaxKind::BoolKw,
            57 => CsSyntaxKind::CharKw,
            58 => CsSyntaxKind::StringKw,
            59 => CsSyntaxKind::ObjectKw,
            100 => CsSyntaxKind::LBrace,
            101 => CsSyntaxKind::RBrace,
            102 => CsSyntaxKind::LParen,
            103 => CsSyntaxKind::RParen,
            104 => CsSyntaxKind::LBracket,
            105 => CsSyntaxKind::RBracket,
            106 => CsSyntaxKind::Semicolon,
            107 => CsSyntaxKind::Comma,
            108 => CsSyntaxKind::Dot,
            109 => CsSyntaxKind::DotDot,
            110 => CsSyntaxKind::Colon,
            111 => CsSyntaxKind::Question,
            112 => CsSyntaxKind::QuestionQuestion,
            113 => CsSyntaxKind::FatArrow,
            114 => CsSyntaxKind::Eq,
            115 => CsSyntaxKind::EqEq,
            116 => CsSyntaxKind::Bang,
            117 => CsSyntaxKind::BangEq,
            118 => CsSyntaxKind::Lt,
            119 => CsSyntaxKind::Gt,
            120 => CsSyntaxKind::LtEq,
            121 => CsSyntaxKind::GtEq,
            122 => CsSyntaxKind::Plus,
            123 => CsSyntaxKind::Minus,
            124 => CsSyntaxKind::Star,
            125 => CsSyntaxKind::Slash,
            126 => CsSyntaxKind::Percent,
            127 => CsSyntaxKind::AmpAmp,
            128 => CsSyntaxKind::PipePipe,
            129 => CsSyntaxKind::Amp,
            130 => CsSyntaxKind::Pipe,
            131 => CsSyntaxKind::Caret,
            132 => CsSyntaxKind::Tilde,
            133 => CsSyntaxKind::PlusEq,
            134 => CsSyntaxKind::MinusEq,
            135 => CsSyntaxKind::StarEq,
            136 => CsSyntaxKind::SlashEq,
            137 => CsSyntaxKind::PlusPlus,
            138 => CsSyntaxKind::MinusMinus,
            150 => CsSyntaxKind::Ident,
            151 => CsSyntaxKind::IntLiteral,
            152 => CsSyntaxKind::RealLiteral,
            153 => CsSyntaxKind::StringLiteral,
            154 => CsSyntaxKind::InterpolatedString,
            155 => CsSyntaxKind::CharLiteral,
            190 => CsSyntaxKind::Error,
            191 => CsSyntaxKind::Eof,
            200 => CsSyntaxKind::CompilationUnit,
            201 => CsSyntaxKind::UsingDirective,
            202 => CsSyntaxKind::NamespaceDecl,
            203 => CsSyntaxKind::QualifiedName,
            204 => CsSyntaxKind::TypeDecl,
            205 => CsSyntaxKind::BaseList,
            206 => CsSyntaxKind::FieldDecl,
            207 => CsSyntaxKind::MethodDecl,
            208 => CsSyntaxKind::PropertyDecl,
            209 => CsSyntaxKind::ConstructorDecl,
            210 => CsSyntaxKind::AccessorList,
            211 => CsSyntaxKind::TypeParamList,
            212 => CsSyntaxKind::ParamList,
            213 => CsSyntaxKind::Param,
            214 => CsSyntaxKind::ArrowBody,
            230 => CsSyntaxKind::Block,
            231 => CsSyntaxKind::LocalDecl,
            232 => CsSyntaxKind::VarDeclarator,
            233 => CsSyntaxKind::ExprStmt,
            234 => CsSyntaxKind::ReturnStmt,
            235 => CsSyntaxKind::IfStmt,
            236 => CsSyntaxKind::ElseClause,
            237 => CsSyntaxKind::ForeachStmt,
            238 => CsSyntaxKind::EmptyStmt,
            250 => CsSyntaxKind::PredefinedType,
            251 => CsSyntaxKind::NamedType,
            252 => CsSyntaxKind::ArrayType,
            253 => CsSyntaxKind::NullableType,
            254 => CsSyntaxKind::TypeArgList,
            270 => CsSyntaxKind::Literal,
            271 => CsSyntaxKind::NameRef,
            272 => CsSyntaxKind::MemberAccess,
            273 => CsSyntaxKind::Invocation,
            274 => CsSyntaxKind::ArgList,
            275 => CsSyntaxKind::Arg,
            276 => CsSyntaxKind::DeclExpr,
            277 => CsSyntaxKind::ElementAccess,
            278 => CsSyntaxKind::ParenExpr,
            279 => CsSyntaxKind::BinaryExpr,
            280 => CsSyntaxKind::PrefixExpr,
            281 => CsSyntaxKind::PostfixExpr,
            282 => CsSyntaxKind::ConditionalExpr,
            283 => CsSyntaxKind::AssignExpr,
            284 => CsSyntaxKind::Lambda,
            285 => CsSyntaxKind::LambdaParamList,
            287 => CsSyntaxKind::ImplicitArrayCreation,
            288 => CsSyntaxKind::ArrayCreation,
            289 => CsSyntaxKind::ObjectCreation,
            290 => CsSyntaxKind::InitializerList,
            291 => CsSyntaxKind::CollectionExpr,
            292 => CsSyntaxKind::SpreadElement,
            399 => CsSyntaxKind::ErrorNode,
            // Unknown values only come from a green tree built outside this crate
            _ => CsSyntaxKind::ErrorNode,
        }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}
