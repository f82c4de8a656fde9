//! # Lexer
//!
//! A hand-rolled, lazy token scanner over the source text: `bump`/`peek`
//! over a character cursor, whitespace handled by tail-looping rather
//! than recursing, comments skipped inline. Adds string/char literal
//! forms and hex-digit validation on top of the bare integer/identifier
//! scanning a minimal revision of this would have.

use crate::span::{Pos, Span};
use crate::token::{DeclKeyword, LiteralTok, OpKind, Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    cursor: usize,
    row: usize,
    col: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_cont(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl Lexer {
    pub fn new(src: &str) -> Self {
        Lexer {
            chars: src.chars().collect(),
            cursor: 0,
            row: 1,
            col: 1,
        }
    }

    fn peek(&self) -> char {
        self.chars.get(self.cursor).copied().unwrap_or('\0')
    }

    fn peek_at(&self, offset: usize) -> char {
        self.chars.get(self.cursor + offset).copied().unwrap_or('\0')
    }

    fn bump(&mut self) -> char {
        let c = self.peek();
        if c == '\0' {
            return c;
        }
        self.cursor += 1;
        if c == '\n' {
            self.row += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        c
    }

    fn pos(&self) -> Pos {
        Pos {
            row: self.row,
            col: self.col,
        }
    }

    /// Lex and return the next token, advancing the cursor past it.
    pub fn next_token(&mut self) -> Token {
        loop {
            let start = self.pos();
            let c = self.bump();

            if c == '\0' {
                return Token {
                    kind: TokenKind::Eof,
                    span: Span::new(start, self.pos()),
                };
            }

            match c {
                ' ' | '\t' | '\r' => continue,
                '\n' => {
                    return Token {
                        kind: TokenKind::Eol,
                        span: Span::new(start, start),
                    }
                }
                ';' => {
                    while self.peek() != '\n' && self.peek() != '\0' {
                        self.bump();
                    }
                    continue;
                }
                ',' => {
                    return Token {
                        kind: TokenKind::Comma,
                        span: Span::new(start, start),
                    }
                }
                '[' => {
                    return Token {
                        kind: TokenKind::OpenBracket,
                        span: Span::new(start, start),
                    }
                }
                ']' => {
                    return Token {
                        kind: TokenKind::CloseBracket,
                        span: Span::new(start, start),
                    }
                }
                '\'' => return self.lex_char(start),
                '"' => return self.lex_string(start),
                '-' => return self.lex_number(start, c),
                c if c.is_ascii_digit() => return self.lex_number(start, c),
                c if is_ident_start(c) => return self.lex_ident(start, c),
                '.' => return self.lex_section(start),
                _ => {
                    return Token {
                        kind: TokenKind::Illegal(format!("unexpected character '{}'", c)),
                        span: Span::new(start, self.pos()),
                    }
                }
            }
        }
    }

    fn lex_section(&mut self, start: Pos) -> Token {
        let mut name = String::new();
        while is_ident_cont(self.peek()) {
            name.push(self.bump());
        }
        let kind = match name.as_str() {
            "data" => TokenKind::SectionData,
            "text" => TokenKind::SectionText,
            _ => TokenKind::Illegal(format!("unknown section '.{}'", name)),
        };
        Token {
            kind,
            span: Span::new(start, self.pos()),
        }
    }

    fn lex_ident(&mut self, start: Pos, first: char) -> Token {
        let mut s = String::new();
        s.push(first);
        while is_ident_cont(self.peek()) {
            s.push(self.bump());
        }

        let kind = if let Some(op) = OpKind::from_keyword(&s) {
            TokenKind::Op(op)
        } else {
            match s.as_str() {
                "dd" => TokenKind::Decl(DeclKeyword::Dd),
                "dw" => TokenKind::Decl(DeclKeyword::Dw),
                "db" => TokenKind::Decl(DeclKeyword::Db),
                "extern" => TokenKind::Decl(DeclKeyword::Extern),
                _ => {
                    if self.peek() == ':' {
                        self.bump();
                        TokenKind::LabelDef(s)
                    } else {
                        TokenKind::Ident(s)
                    }
                }
            }
        };

        Token {
            kind,
            span: Span::new(start, self.pos()),
        }
    }

    /// Consume a decimal or hex numeric literal, or a negative decimal
    /// integer when `first == '-'`.
    fn lex_number(&mut self, start: Pos, first: char) -> Token {
        if first == '-' {
            if !self.peek().is_ascii_digit() {
                return Token {
                    kind: TokenKind::Illegal("expected digit after '-'".to_string()),
                    span: Span::new(start, self.pos()),
                };
            }
            let mut digits = String::new();
            digits.push('-');
            while self.peek().is_ascii_digit() {
                digits.push(self.bump());
            }
            let value: i64 = digits.parse().unwrap_or(0);
            return Token {
                kind: TokenKind::Literal(LiteralTok::Int(value)),
                span: Span::new(start, self.pos()),
            };
        }

        if first == '0' && (self.peek() == 'x' || self.peek() == 'X') {
            self.bump();
            let mut digits = String::new();
            while self.peek().is_ascii_hexdigit() {
                digits.push(self.bump());
            }
            if digits.is_empty() {
                return Token {
                    kind: TokenKind::Illegal("malformed hex literal".to_string()),
                    span: Span::new(start, self.pos()),
                };
            }
            // Anything immediately trailing that still looks like an
            // identifier character but isn't a valid hex digit makes the
            // whole literal malformed (e.g. `0x1g`).
            if is_ident_cont(self.peek()) {
                while is_ident_cont(self.peek()) {
                    self.bump();
                }
                return Token {
                    kind: TokenKind::Illegal("malformed hex literal".to_string()),
                    span: Span::new(start, self.pos()),
                };
            }
            let value = u64::from_str_radix(&digits, 16).unwrap_or(0);
            return Token {
                kind: TokenKind::Literal(LiteralTok::UInt(value)),
                span: Span::new(start, self.pos()),
            };
        }

        let mut digits = String::new();
        digits.push(first);
        let mut is_float = false;
        while self.peek().is_ascii_digit() || self.peek() == '.' {
            if self.peek() == '.' {
                if is_float {
                    break;
                }
                is_float = true;
            }
            digits.push(self.bump());
        }

        let kind = if is_float {
            match digits.parse::<f32>() {
                Ok(v) => TokenKind::Literal(LiteralTok::Float(v)),
                Err(_) => TokenKind::Illegal(format!("malformed float literal '{}'", digits)),
            }
        } else {
            match digits.parse::<u64>() {
                Ok(v) => TokenKind::Literal(LiteralTok::UInt(v)),
                Err(_) => TokenKind::Illegal(format!("malformed integer literal '{}'", digits)),
            }
        };

        Token {
            kind,
            span: Span::new(start, self.pos()),
        }
    }

    /// Resolve a backslash escape. Returns `None` for an unrecognized escape.
    fn escape(&mut self) -> Option<char> {
        let c = self.bump();
        Some(match c {
            '0' => '\0',
            'a' => '\u{07}',
            'b' => '\u{08}',
            't' => '\t',
            'n' => '\n',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            _ => return None,
        })
    }

    fn lex_char(&mut self, start: Pos) -> Token {
        let c = if self.peek() == '\\' {
            self.bump();
            match self.escape() {
                Some(c) => c,
                None => {
                    return Token {
                        kind: TokenKind::Illegal("invalid escape in char literal".to_string()),
                        span: Span::new(start, self.pos()),
                    }
                }
            }
        } else if self.peek() == '\0' || self.peek() == '\'' {
            return Token {
                kind: TokenKind::Illegal("empty char literal".to_string()),
                span: Span::new(start, self.pos()),
            };
        } else {
            self.bump()
        };

        if self.peek() != '\'' {
            return Token {
                kind: TokenKind::Illegal("unterminated char literal".to_string()),
                span: Span::new(start, self.pos()),
            };
        }
        self.bump();

        Token {
            kind: TokenKind::Literal(LiteralTok::Int(c as i64)),
            span: Span::new(start, self.pos()),
        }
    }

    fn lex_string(&mut self, start: Pos) -> Token {
        let mut s = String::new();
        loop {
            match self.peek() {
                '\0' | '\n' => {
                    return Token {
                        kind: TokenKind::Illegal("unterminated string literal".to_string()),
                        span: Span::new(start, self.pos()),
                    }
                }
                '"' => {
                    self.bump();
                    break;
                }
                '\\' => {
                    self.bump();
                    match self.escape() {
                        Some(c) => s.push(c),
                        None => {
                            return Token {
                                kind: TokenKind::Illegal(
                                    "invalid escape in string literal".to_string(),
                                ),
                                span: Span::new(start, self.pos()),
                            }
                        }
                    }
                }
                _ => s.push(self.bump()),
            }
        }

        Token {
            kind: TokenKind::Literal(LiteralTok::Str(s)),
            span: Span::new(start, self.pos()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token();
            let done = tok.kind == TokenKind::Eof;
            out.push(tok.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn lexes_ipush_line() {
        let toks = kinds("ipush 3\n");
        assert_eq!(
            toks,
            vec![
                TokenKind::Op(OpKind::IPush),
                TokenKind::Literal(LiteralTok::UInt(3)),
                TokenKind::Eol,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn label_def_vs_ident() {
        let toks = kinds("loop: jump loop\n");
        assert_eq!(
            toks,
            vec![
                TokenKind::LabelDef("loop".to_string()),
                TokenKind::Op(OpKind::Jump),
                TokenKind::Ident("loop".to_string()),
                TokenKind::Eol,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn negative_int_literal() {
        let toks = kinds("ipush -7\n");
        assert_eq!(toks[1], TokenKind::Literal(LiteralTok::Int(-7)));
    }

    #[test]
    fn hex_literal() {
        let toks = kinds("ppush 0x1F\n");
        assert_eq!(toks[1], TokenKind::Literal(LiteralTok::UInt(0x1F)));
    }

    #[test]
    fn malformed_hex_is_illegal() {
        let toks = kinds("ppush 0x1g\n");
        assert!(matches!(toks[1], TokenKind::Illegal(_)));
    }

    #[test]
    fn char_literal_escape() {
        let toks = kinds("cpush '\\n'\n");
        assert_eq!(toks[1], TokenKind::Literal(LiteralTok::Int(10)));
    }

    #[test]
    fn unterminated_string_is_illegal() {
        let toks = kinds("\"abc\n");
        assert!(matches!(toks[0], TokenKind::Illegal(_)));
    }

    #[test]
    fn comment_is_skipped() {
        let toks = kinds("; a comment\nipush 1\n");
        assert_eq!(toks[0], TokenKind::Eol);
        assert_eq!(toks[1], TokenKind::Op(OpKind::IPush));
    }

    #[test]
    fn data_decl_keywords() {
        let toks = kinds(".data\nbuf db [4]\n");
        assert_eq!(toks[0], TokenKind::SectionData);
        assert_eq!(toks[1], TokenKind::Ident("buf".to_string()));
        assert_eq!(toks[2], TokenKind::Decl(DeclKeyword::Db));
        assert_eq!(toks[3], TokenKind::OpenBracket);
        assert_eq!(toks[4], TokenKind::Literal(LiteralTok::UInt(4)));
        assert_eq!(toks[5], TokenKind::CloseBracket);
    }
}
