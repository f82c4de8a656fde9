//! # Parser
//!
//! Line-oriented, stateful DATA/TEXT mode switch. Direct-match style: no
//! precedence climbing, just one `match` per statement shape, since this
//! language has no expressions — only flat statement forms. A `Parser`
//! owns a `Lexer` plus one token of lookahead.

use std::collections::HashSet;

use crate::ast::{DeclKind, Literal, Node, Operand};
use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{DeclKeyword, LiteralTok, OpKind, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Data,
    Text,
}

/// The operand grammar a given opcode expects.
enum OperandForm {
    None,
    Imm,
    UInt,
    Symbol,
    Call,
}

fn operand_form(op: OpKind) -> OperandForm {
    use OpKind::*;
    match op {
        UlPush | IPush | FPush | CPush | PPush => OperandForm::Imm,
        PLoad | Copy8 | Copy32 | Copy64 | Store8 | Store32 | Store64 | Load8 | Load32 | Load64
        | Ret | PDeref | PSet => OperandForm::UInt,
        Jump | JumpCmp => OperandForm::Symbol,
        JumpProc => OperandForm::Call,
        _ => OperandForm::None,
    }
}

pub struct Parser {
    lexer: Lexer,
    lookahead: Token,
    mode: Mode,
    seen_data_names: HashSet<String>,
}

impl Parser {
    pub fn new(src: &str) -> Self {
        let mut lexer = Lexer::new(src);
        let lookahead = lexer.next_token();
        Parser {
            lexer,
            lookahead,
            mode: Mode::Text,
            seen_data_names: HashSet::new(),
        }
    }

    fn bump(&mut self) -> Token {
        let next = self.lexer.next_token();
        std::mem::replace(&mut self.lookahead, next)
    }

    fn at_eof(&self) -> bool {
        self.lookahead.kind == TokenKind::Eof
    }

    /// Consume through the next `Eol`/`Eof`, reporting `message` at `span`.
    fn recover(&mut self, message: String, span: Span) -> ParseError {
        while !matches!(self.lookahead.kind, TokenKind::Eol | TokenKind::Eof) {
            self.bump();
        }
        if matches!(self.lookahead.kind, TokenKind::Eol) {
            self.bump();
        }
        ParseError { message, span }
    }

    fn expect_eol(&mut self) -> Result<(), String> {
        match self.lookahead.kind {
            TokenKind::Eol | TokenKind::Eof => {
                if matches!(self.lookahead.kind, TokenKind::Eol) {
                    self.bump();
                }
                Ok(())
            }
            _ => Err("expected end of line".to_string()),
        }
    }

    /// Parse the whole program, returning every accepted node and every
    /// error encountered. Errors do not stop parsing: one bad statement
    /// is recovered past so the rest of the file still gets checked.
    pub fn parse(mut self) -> (Vec<Node>, Vec<ParseError>) {
        let mut nodes = Vec::new();
        let mut errors = Vec::new();

        while !self.at_eof() {
            if matches!(self.lookahead.kind, TokenKind::Eol) {
                self.bump();
                continue;
            }
            match self.parse_statement() {
                Ok(node) => nodes.push(node),
                Err(e) => errors.push(e),
            }
        }

        (nodes, errors)
    }

    fn parse_statement(&mut self) -> Result<Node, ParseError> {
        let start_span = self.lookahead.span;
        let tok = self.bump();

        match tok.kind {
            TokenKind::SectionData => {
                self.mode = Mode::Data;
                self.expect_eol()
                    .map_err(|m| self.recover(m, start_span))?;
                // Section markers don't themselves emit a node; reparse.
                self.parse_next_or_eof(start_span)
            }
            TokenKind::SectionText => {
                self.mode = Mode::Text;
                self.expect_eol()
                    .map_err(|m| self.recover(m, start_span))?;
                self.parse_next_or_eof(start_span)
            }
            TokenKind::LabelDef(name) => {
                if self.mode != Mode::Text {
                    return Err(self.recover(
                        "label definition outside TEXT section".to_string(),
                        start_span,
                    ));
                }
                self.expect_eol()
                    .map_err(|m| self.recover(m, start_span))?;
                Ok(Node::Label(name))
            }
            TokenKind::Op(op) => {
                if self.mode != Mode::Text {
                    return Err(self.recover("instruction outside TEXT section".to_string(), start_span));
                }
                self.parse_instruction(op, start_span)
            }
            TokenKind::Ident(name) => {
                if self.mode == Mode::Data {
                    self.parse_data(name, start_span)
                } else {
                    Err(self.recover(format!("unknown opcode '{}'", name), start_span))
                }
            }
            TokenKind::Eof => Err(ParseError {
                message: "unexpected end of input".to_string(),
                span: start_span,
            }),
            TokenKind::Illegal(message) => Err(self.recover(message, start_span)),
            other => Err(self.recover(format!("unexpected token {:?}", other), start_span)),
        }
    }

    /// After consuming a section marker's own end-of-line, immediately
    /// parse the next statement so the marker itself never yields a node.
    fn parse_next_or_eof(&mut self, start_span: Span) -> Result<Node, ParseError> {
        loop {
            if self.at_eof() {
                return Err(ParseError {
                    message: "unexpected end of input".to_string(),
                    span: start_span,
                });
            }
            if matches!(self.lookahead.kind, TokenKind::Eol) {
                self.bump();
                continue;
            }
            return self.parse_statement();
        }
    }

    fn parse_data(&mut self, name: String, start_span: Span) -> Result<Node, ParseError> {
        let decl_tok = self.bump();
        let kind = match decl_tok.kind {
            TokenKind::Decl(DeclKeyword::Dd) => DeclKind::Dd,
            TokenKind::Decl(DeclKeyword::Dw) => DeclKind::Dw,
            TokenKind::Decl(DeclKeyword::Db) => DeclKind::Db,
            TokenKind::Decl(DeclKeyword::Extern) => DeclKind::Extern,
            _ => {
                return Err(self.recover(
                    "expected 'dd', 'dw', 'db' or 'extern' after identifier".to_string(),
                    start_span,
                ))
            }
        };

        if !self.seen_data_names.insert(name.clone()) {
            return Err(self.recover(format!("duplicate data declaration '{}'", name), start_span));
        }

        let count = if kind == DeclKind::Extern {
            None
        } else {
            self.expect_token(TokenKind::OpenBracket, "expected '['")
                .map_err(|m| self.recover(m, start_span))?;
            let n = self
                .expect_uint()
                .map_err(|m| self.recover(m, start_span))?;
            self.expect_token(TokenKind::CloseBracket, "expected ']'")
                .map_err(|m| self.recover(m, start_span))?;
            Some(n)
        };

        self.expect_eol()
            .map_err(|m| self.recover(m, start_span))?;
        Ok(Node::Data { name, kind, count })
    }

    fn parse_instruction(&mut self, op: OpKind, start_span: Span) -> Result<Node, ParseError> {
        let operand = match operand_form(op) {
            OperandForm::None => None,
            OperandForm::Imm => Some(Operand::Literal(
                self.expect_literal()
                    .map_err(|m| self.recover(m, start_span))?,
            )),
            OperandForm::UInt => Some(Operand::Index(
                self.expect_uint()
                    .map_err(|m| self.recover(m, start_span))?,
            )),
            OperandForm::Symbol => Some(Operand::Symbol(
                self.expect_ident()
                    .map_err(|m| self.recover(m, start_span))?,
            )),
            OperandForm::Call => {
                let target = self
                    .expect_ident()
                    .map_err(|m| self.recover(m, start_span))?;
                let argc = self
                    .expect_uint()
                    .map_err(|m| self.recover(m, start_span))?;
                Some(Operand::Call { target, argc })
            }
        };

        self.expect_eol()
            .map_err(|m| self.recover(m, start_span))?;
        Ok(Node::Instruction { op, operand })
    }

    fn expect_token(&mut self, kind: TokenKind, message: &str) -> Result<(), String> {
        if self.lookahead.kind == kind {
            self.bump();
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    fn expect_uint(&mut self) -> Result<u64, String> {
        match self.bump().kind {
            TokenKind::Literal(LiteralTok::UInt(v)) => Ok(v),
            _ => Err("expected an unsigned integer".to_string()),
        }
    }

    fn expect_ident(&mut self) -> Result<String, String> {
        match self.bump().kind {
            TokenKind::Ident(name) => Ok(name),
            _ => Err("expected an identifier".to_string()),
        }
    }

    fn expect_literal(&mut self) -> Result<Literal, String> {
        match self.bump().kind {
            TokenKind::Literal(LiteralTok::UInt(v)) => Ok(Literal::UInt(v)),
            TokenKind::Literal(LiteralTok::Int(v)) => Ok(Literal::Int(v)),
            TokenKind::Literal(LiteralTok::Float(v)) => Ok(Literal::Float(v)),
            TokenKind::Literal(LiteralTok::Str(_)) => {
                Err("string literal is not valid here".to_string())
            }
            TokenKind::Ident(name) => Ok(Literal::Ident(name)),
            _ => Err("expected a literal or identifier".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> Vec<Node> {
        let (nodes, errors) = Parser::new(src).parse();
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        nodes
    }

    #[test]
    fn parses_simple_text_program() {
        let nodes = parse_ok(".text\nmain:\n    ipush 3\n    ipush 4\n    iadd\n    iprint\n");
        assert_eq!(nodes.len(), 5);
        assert_eq!(nodes[0], Node::Label("main".to_string()));
        assert!(matches!(nodes[1], Node::Instruction { op: OpKind::IPush, .. }));
    }

    #[test]
    fn parses_data_declaration() {
        let nodes = parse_ok(".data\nbuf db [4]\n.text\nmain:\n    ret 0\n");
        assert_eq!(
            nodes[0],
            Node::Data {
                name: "buf".to_string(),
                kind: DeclKind::Db,
                count: Some(4),
            }
        );
    }

    #[test]
    fn duplicate_data_declaration_is_error() {
        let (_, errors) = Parser::new(".data\nx db [1]\nx db [2]\n").parse();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn unknown_opcode_recovers_to_next_statement() {
        let (nodes, errors) =
            Parser::new(".text\nmain:\n    bogus\n    iprint\n").parse();
        assert_eq!(errors.len(), 1);
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn illegal_token_reports_the_lexer_message() {
        let (_, errors) = Parser::new(".text\nmain:\n    #\n    iprint\n").parse();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("unexpected character"));
    }

    #[test]
    fn jumpproc_parses_target_and_argc() {
        let nodes = parse_ok(".text\nmain:\n    jumpproc helper 4\nhelper:\n    ret 0\n");
        assert_eq!(
            nodes[1],
            Node::Instruction {
                op: OpKind::JumpProc,
                operand: Some(Operand::Call {
                    target: "helper".to_string(),
                    argc: 4,
                }),
            }
        );
    }

    #[test]
    fn ppush_with_identifier_operand() {
        let nodes = parse_ok(".data\nbuf db [4]\n.text\nmain:\n    ppush buf\n    ret 0\n");
        assert_eq!(
            nodes[1],
            Node::Instruction {
                op: OpKind::PPush,
                operand: Some(Operand::Literal(Literal::Ident("buf".to_string()))),
            }
        );
    }
}
