//! # Token kinds
//!
//! The lexer's output contract: a stream of [`Token`]s, each carrying a
//! [`Span`]. [`OpKind`] enumerates every opcode keyword as a single flat
//! enum, written out directly rather than generated.

use crate::span::Span;

/// Every opcode keyword recognized in TEXT mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Pop8,
    Pop32,
    Pop64,

    UlPush,
    UlAdd,
    UlSub,
    UlMult,
    UlDiv,
    UlMod,
    UlPrint,

    IPush,
    IAdd,
    ISub,
    IMult,
    IDiv,
    IMod,
    IPrint,

    FPush,
    FAdd,
    FSub,
    FMult,
    FDiv,
    FPrint,

    CPush,
    CAdd,
    CSub,
    CMult,
    CDiv,
    CMod,
    CPrint,
    CiPrint,

    PPush,
    PLoad,
    PDeref,
    PDeref8,
    PDeref32,
    PDeref64,
    PSet,
    PSet8,
    PSet32,
    PSet64,

    Jump,
    JumpCmp,
    JumpProc,

    Dupe8,
    Dupe32,
    Dupe64,

    Swap8,
    Swap32,
    Swap64,

    Copy8,
    Copy32,
    Copy64,

    Store8,
    Store32,
    Store64,

    Load8,
    Load32,
    Load64,

    Ret,
    Ret8,
    Ret32,
    Ret64,

    IClt,
    ICle,
    ICeq,
    ICgt,
    ICge,

    UlClt,
    UlCle,
    UlCeq,
    UlCgt,
    UlCge,

    FClt,
    FCle,
    FCeq,
    FCgt,
    FCge,

    CClt,
    CCle,
    CCeq,
    CCgt,
    CCge,
}

impl OpKind {
    /// Look up the opcode keyword for a bare identifier, if any.
    ///
    /// Returns `None` for anything that isn't one of the fixed opcode
    /// spellings — the lexer falls back to `Ident`/`LabelDef` in that
    /// case.
    pub fn from_keyword(s: &str) -> Option<OpKind> {
        use OpKind::*;
        Some(match s {
            "pop8" => Pop8,
            "pop32" => Pop32,
            "pop64" => Pop64,

            "ulpush" => UlPush,
            "uladd" => UlAdd,
            "ulsub" => UlSub,
            "ulmult" => UlMult,
            "uldiv" => UlDiv,
            "ulmod" => UlMod,
            "ulprint" => UlPrint,

            "ipush" => IPush,
            "iadd" => IAdd,
            "isub" => ISub,
            "imult" => IMult,
            "idiv" => IDiv,
            "imod" => IMod,
            "iprint" => IPrint,

            "fpush" => FPush,
            "fadd" => FAdd,
            "fsub" => FSub,
            "fmult" => FMult,
            "fdiv" => FDiv,
            "fprint" => FPrint,

            "cpush" => CPush,
            "cadd" => CAdd,
            "csub" => CSub,
            "cmult" => CMult,
            "cdiv" => CDiv,
            "cmod" => CMod,
            "cprint" => CPrint,
            "ciprint" => CiPrint,

            "ppush" => PPush,
            "pload" => PLoad,
            "pderef" => PDeref,
            "pderef8" => PDeref8,
            "pderef32" => PDeref32,
            "pderef64" => PDeref64,
            "pset" => PSet,
            "pset8" => PSet8,
            "pset32" => PSet32,
            "pset64" => PSet64,

            "jump" => Jump,
            "jumpcmp" => JumpCmp,
            "jumpproc" => JumpProc,

            "dupe8" => Dupe8,
            "dupe32" => Dupe32,
            "dupe64" => Dupe64,

            "swap8" => Swap8,
            "swap32" => Swap32,
            "swap64" => Swap64,

            "copy8" => Copy8,
            "copy32" => Copy32,
            "copy64" => Copy64,

            "store8" => Store8,
            "store32" => Store32,
            "store64" => Store64,

            "load8" => Load8,
            "load32" => Load32,
            "load64" => Load64,

            "ret" => Ret,
            "ret8" => Ret8,
            "ret32" => Ret32,
            "ret64" => Ret64,

            "iclt" => IClt,
            "icle" => ICle,
            "iceq" => ICeq,
            "icgt" => ICgt,
            "icge" => ICge,

            "ulclt" => UlClt,
            "ulcle" => UlCle,
            "ulceq" => UlCeq,
            "ulcgt" => UlCgt,
            "ulcge" => UlCge,

            "fclt" => FClt,
            "fcle" => FCle,
            "fceq" => FCeq,
            "fcgt" => FCgt,
            "fcge" => FCge,

            "cclt" => CClt,
            "ccle" => CCle,
            "cceq" => CCeq,
            "ccgt" => CCgt,
            "ccge" => CCge,

            _ => return None,
        })
    }
}

/// The kind of declaration a DATA-mode statement introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKeyword {
    Dd,
    Dw,
    Db,
    Extern,
}

/// A lexed numeric or textual literal, carried verbatim by its token.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralTok {
    UInt(u64),
    Int(i64),
    Float(f32),
    Str(String),
}

/// One lexical token plus the span it was lexed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    SectionData,
    SectionText,

    Op(OpKind),
    Decl(DeclKeyword),

    /// A bare identifier (not immediately followed by `:`).
    Ident(String),
    /// An identifier immediately followed by `:` — a label definition.
    LabelDef(String),

    Literal(LiteralTok),

    Comma,
    OpenBracket,
    CloseBracket,
    Eol,
    Eof,

    /// A malformed token (bad escape, unterminated string, bad numeric base).
    Illegal(String),
}
