//! Expression parser for Stylus.
//!
//! Parses the tokens of a property value, condition, iteration source or
//! argument list into `Expression` nodes. Stylus values are space-separated
//! sequences of operands, optionally comma-separated into lists; operators
//! bind tighter than spaces.
//!
//! Precedence, loosest first:
//!
//! ```text
//! or ||  <  and &&  <  == != is isnt  <  < > <= >=  <  .. ...  <  + -  <  * / %  <  **
//! ```

use crate::ast::{
    Arguments, BinOp, Boolean, Call, Expression, Ident, Literal, Node, Rgba, UnaryOp, Unit,
};
use crate::ParseError;
use stylconv_lexer::{Token, TokenKind};

/// Stylus expression parser.
///
/// Operates on a slice of source tokens belonging to one logical line.
pub struct ExprParser<'t> {
    tokens: &'t [Token],
    pos: usize,
    lineno: usize,
}

impl<'t> ExprParser<'t> {
    /// Create a new expression parser for the given tokens.
    pub fn new(tokens: &'t [Token], lineno: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            lineno,
        }
    }

    /// Parse a complete expression; every token must be consumed.
    pub fn parse_tokens(tokens: &'t [Token], lineno: usize) -> Result<Expression, ParseError> {
        let mut parser = ExprParser::new(tokens, lineno);
        let expr = parser.parse_list()?;

        if let Some(token) = parser.peek() {
            return Err(parser.error_at(token, format!("Unexpected {:?} in expression", token.kind)));
        }

        Ok(expr)
    }

    // =========================================================================
    // Lists and sequences
    // =========================================================================

    /// `a b, c d` → list of two sequences. A single sequence is returned as is.
    fn parse_list(&mut self) -> Result<Expression, ParseError> {
        let mut items = vec![self.parse_sequence()?];

        while self.eat(&TokenKind::Comma) {
            items.push(self.parse_sequence()?);
        }

        if items.len() == 1 {
            if let Some(only) = items.pop() {
                return Ok(only);
            }
        }

        Ok(Expression {
            nodes: items.into_iter().map(Node::Expression).collect(),
            is_list: true,
            parenthesized: false,
            lineno: self.lineno,
        })
    }

    /// Space-separated operands up to a comma, closing paren or the end.
    fn parse_sequence(&mut self) -> Result<Expression, ParseError> {
        let mut nodes = Vec::new();

        while let Some(token) = self.peek() {
            if matches!(token.kind, TokenKind::Comma | TokenKind::RParen) {
                break;
            }
            nodes.push(self.parse_binary(0)?);
        }

        if nodes.is_empty() {
            return Err(self.error("Expected a value".into()));
        }

        Ok(Expression::new(nodes, self.lineno))
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Node, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some((op, precedence, width)) = self.peek_binary_op() {
            if precedence < min_precedence {
                break;
            }
            self.pos += width;

            // `**` is right-associative, everything else left-associative
            let next_min = if op == "**" { precedence } else { precedence + 1 };
            let right = self.parse_binary(next_min)?;

            left = Node::BinOp(BinOp {
                op: op.to_string(),
                left: Box::new(left),
                right: Box::new(right),
                lineno: self.lineno,
            });
        }

        Ok(left)
    }

    /// The binary operator at the cursor: (spelling, precedence, token count).
    fn peek_binary_op(&self) -> Option<(&'static str, u8, usize)> {
        let token = self.peek()?;
        let op = match &token.kind {
            TokenKind::OrOr => ("||", 1, 1),
            TokenKind::AndAnd => ("&&", 2, 1),
            TokenKind::EqEq => ("==", 3, 1),
            TokenKind::NotEq => ("!=", 3, 1),
            TokenKind::Lt => ("<", 4, 1),
            TokenKind::Gt => (">", 4, 1),
            TokenKind::Lte => ("<=", 4, 1),
            TokenKind::Gte => (">=", 4, 1),
            TokenKind::DotDot => ("..", 5, 1),
            TokenKind::DotDotDot => ("...", 5, 1),
            TokenKind::Plus => ("+", 6, 1),
            TokenKind::Minus => ("-", 6, 1),
            TokenKind::Star => ("*", 7, 1),
            TokenKind::Slash => ("/", 7, 1),
            TokenKind::Percent => ("%", 7, 1),
            TokenKind::StarStar => ("**", 8, 1),
            TokenKind::Ident(word) => match word.as_str() {
                "or" => ("or", 1, 1),
                "and" => ("and", 2, 1),
                "is" if self.peek_ident_at(1, "not") => ("is not", 3, 2),
                "is" => ("is", 3, 1),
                "isnt" => ("isnt", 3, 1),
                _ => return None,
            },
            _ => return None,
        };
        Some(op)
    }

    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.error("Expected a value".into()));
        };

        let op = match &token.kind {
            TokenKind::Bang => {
                if let Some(next) = self.peek_at(1) {
                    if token.touches(next) && next.kind == TokenKind::Ident("important".into()) {
                        self.pos += 2;
                        return Ok(Node::Literal(Literal::new("!important", self.lineno)));
                    }
                }
                "!"
            }
            TokenKind::Ident(word) if word == "not" => "not",
            TokenKind::Minus => "-",
            TokenKind::Plus => "+",
            _ => return self.parse_primary(),
        };
        self.pos += 1;

        let operand = self.parse_unary()?;
        Ok(Node::UnaryOp(UnaryOp {
            op: op.to_string(),
            operand: Box::new(operand),
            lineno: self.lineno,
        }))
    }

    // =========================================================================
    // Operands
    // =========================================================================

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.error("Expected a value".into()));
        };
        let token = token.clone();
        self.pos += 1;

        match token.kind.clone() {
            TokenKind::Number { value, unit } => Ok(Node::Unit(Unit {
                val: value,
                unit: (!unit.is_empty()).then_some(unit),
                lineno: self.lineno,
            })),
            TokenKind::String { value, quote } => {
                Ok(Node::Literal(Literal::quoted(value, quote, self.lineno)))
            }
            TokenKind::Hash(word) => {
                let raw = format!("#{word}");
                if is_hex_color(&word) {
                    Ok(Node::Rgba(Rgba {
                        raw,
                        lineno: self.lineno,
                    }))
                } else {
                    Ok(Node::Literal(Literal::new(raw, self.lineno)))
                }
            }
            TokenKind::Url(raw) => Ok(Node::Literal(Literal::new(raw, self.lineno))),
            TokenKind::AtWord(name) => Ok(Node::Ident(Ident {
                lookup: true,
                ..Ident::new(name, self.lineno)
            })),
            TokenKind::Ident(name) => self.parse_ident(name, &token),
            TokenKind::LParen => {
                let mut inner = self.parse_list()?;
                self.expect_rparen()?;
                inner.parenthesized = true;
                Ok(Node::Expression(inner))
            }
            kind => Err(self.error_at(&token, format!("Unexpected {kind:?} in expression"))),
        }
    }

    /// Identifier, boolean, call (`name(` with no space) or assignment (`name = value`).
    fn parse_ident(&mut self, name: String, token: &Token) -> Result<Node, ParseError> {
        match name.as_str() {
            "true" => {
                return Ok(Node::Boolean(Boolean {
                    val: true,
                    lineno: self.lineno,
                }))
            }
            "false" => {
                return Ok(Node::Boolean(Boolean {
                    val: false,
                    lineno: self.lineno,
                }))
            }
            _ => {}
        }

        match self.peek() {
            Some(next) if next.kind == TokenKind::LParen && token.touches(next) => {
                self.pos += 1;
                let args = self.parse_arguments()?;
                Ok(Node::Call(Call {
                    name,
                    args,
                    lineno: self.lineno,
                }))
            }
            Some(next) if matches!(next.kind, TokenKind::Assign | TokenKind::ConditionalAssign) => {
                self.pos += 1;
                let value = self.parse_sequence()?;
                Ok(Node::Ident(Ident {
                    value: Some(Box::new(Node::Expression(value))),
                    ..Ident::new(name, self.lineno)
                }))
            }
            _ => Ok(Node::Ident(Ident::new(name, self.lineno))),
        }
    }

    /// Arguments after the opening paren, up to and including the closing one.
    /// `name: value` is a keyword argument.
    fn parse_arguments(&mut self) -> Result<Arguments, ParseError> {
        let mut nodes = Vec::new();

        if self.eat(&TokenKind::RParen) {
            return Ok(Arguments {
                nodes,
                lineno: self.lineno,
            });
        }

        loop {
            let keyword = match (self.peek(), self.peek_at(1)) {
                (Some(Token { kind: TokenKind::Ident(name), .. }), Some(colon))
                    if colon.kind == TokenKind::Colon =>
                {
                    Some(name.clone())
                }
                _ => None,
            };

            let arg = match keyword {
                Some(name) => {
                    self.pos += 2;
                    let value = self.parse_sequence()?;
                    Node::Ident(Ident {
                        value: Some(Box::new(Node::Expression(value))),
                        ..Ident::new(name, self.lineno)
                    })
                }
                None => unwrap_single(self.parse_sequence()?),
            };
            nodes.push(arg);

            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect_rparen()?;
            break;
        }

        Ok(Arguments {
            nodes,
            lineno: self.lineno,
        })
    }

    // =========================================================================
    // Token navigation helpers
    // =========================================================================

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, distance: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + distance)
    }

    fn peek_ident_at(&self, distance: usize, word: &str) -> bool {
        matches!(self.peek_at(distance), Some(Token { kind: TokenKind::Ident(w), .. }) if w == word)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().is_some_and(|t| &t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_rparen(&mut self) -> Result<(), ParseError> {
        if self.eat(&TokenKind::RParen) {
            Ok(())
        } else {
            Err(self.error("Expected ')'".into()))
        }
    }

    fn error(&self, message: String) -> ParseError {
        match self.peek().or_else(|| self.tokens.last()) {
            Some(token) => self.error_at(token, message),
            None => ParseError {
                message,
                line: self.lineno,
                column: 1,
            },
        }
    }

    fn error_at(&self, token: &Token, message: String) -> ParseError {
        ParseError {
            message,
            line: token.span.line,
            column: token.span.column,
        }
    }
}

/// A one-operand sequence collapses to its operand.
fn unwrap_single(mut expr: Expression) -> Node {
    if expr.nodes.len() == 1 && !expr.parenthesized {
        if let Some(node) = expr.nodes.pop() {
            return node;
        }
    }
    Node::Expression(expr)
}

fn is_hex_color(word: &str) -> bool {
    matches!(word.len(), 3 | 4 | 6 | 8) && word.chars().all(|c| c.is_ascii_hexdigit())
}
