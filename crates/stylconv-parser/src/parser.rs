//! Statement parser for Stylus.
//!
//! Parses a stream of source-level tokens (from `stylconv-lexer`) into a
//! `Stylesheet` AST. Works one logical line at a time: the first tokens of a
//! line, and whether an indented block follows it, decide what the line is.
//! Values are handed to `expr_parser`; selector and property-name text is
//! sliced from the source verbatim.

use crate::ast::{
    Arguments, Block, Each, Expression, Function, Group, If, Ident, Import, Literal, Node,
    Property, Selector, Stylesheet, UnaryOp, Unsupported,
};
use crate::expr_parser::ExprParser;
use crate::segments::{split_segments, split_selector_list};
use crate::ParseError;
use stylconv_lexer::{Span, Token, TokenKind};

/// Stylus statement parser.
///
/// Converts the flat token stream from the scanner into a hierarchical
/// `Stylesheet` using recursive descent over indented blocks.
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given source and its tokens.
    pub fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    /// Parse source code into a stylesheet AST.
    pub fn parse(source: &str) -> Result<Stylesheet, ParseError> {
        let tokens = stylconv_lexer::Scanner::tokenize(source)?;

        let mut parser = Parser::new(source, tokens);
        parser.parse_stylesheet()
    }

    fn parse_stylesheet(&mut self) -> Result<Stylesheet, ParseError> {
        let mut nodes = Vec::new();

        loop {
            self.skip_newlines();
            match self.peek().kind {
                TokenKind::Eof => break,
                TokenKind::Indent => return Err(self.error("Unexpected indentation".into())),
                TokenKind::Dedent => self.advance(),
                _ => {
                    if let Some(node) = self.parse_statement()? {
                        nodes.push(node);
                    }
                }
            }
        }

        Ok(Stylesheet { nodes })
    }

    /// Parse an indented block. The cursor sits at the end of the header line.
    fn parse_block(&mut self, lineno: usize) -> Result<Block, ParseError> {
        self.skip_newlines();
        if self.peek().kind != TokenKind::Indent {
            return Err(self.error("Expected an indented block".into()));
        }
        self.advance();

        let mut nodes = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek().kind {
                TokenKind::Dedent => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => break,
                TokenKind::Indent => return Err(self.error("Unexpected indentation".into())),
                _ => {
                    if let Some(node) = self.parse_statement()? {
                        nodes.push(node);
                    }
                }
            }
        }

        Ok(Block { nodes, lineno })
    }

    /// Skip an indented block without parsing it.
    fn skip_block(&mut self) {
        self.skip_newlines();
        if self.peek().kind != TokenKind::Indent {
            return;
        }
        self.advance();

        let mut depth = 1usize;
        while depth > 0 && !self.is_at_end() {
            match self.peek().kind {
                TokenKind::Indent => depth += 1,
                TokenKind::Dedent => depth -= 1,
                _ => {}
            }
            self.advance();
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Parse one statement. Lines holding nothing but `;` produce no node.
    fn parse_statement(&mut self) -> Result<Option<Node>, ParseError> {
        let line = self.take_line();
        let Some(first) = line.first() else {
            return Ok(None);
        };
        let lineno = first.span.line;

        let node = match &first.kind {
            TokenKind::AtWord(word) if word == "import" || word == "require" => {
                self.parse_import(&line, lineno)?
            }
            TokenKind::AtWord(word) => {
                let kind = format!("@{word}");
                self.skip_block();
                Node::Unsupported(Unsupported { kind, lineno })
            }
            TokenKind::Ident(word) => match word.as_str() {
                "if" | "unless" => self.parse_if(&line, lineno)?,
                "else" => {
                    return Err(error_at(first, "'else' without a matching 'if'".into()));
                }
                "for" => self.parse_each(&line, lineno)?,
                "return" => {
                    Node::Expression(self.parse_expression(&line[1..], first, lineno)?)
                }
                _ => self.parse_declaration(&line, lineno)?,
            },
            _ => self.parse_declaration(&line, lineno)?,
        };

        Ok(Some(node))
    }

    /// `@import "a"` / `@require "a" "b"` / `@import url(foo.css)`
    fn parse_import(&mut self, line: &[Token], lineno: usize) -> Result<Node, ParseError> {
        let rest = &line[1..];
        if rest.is_empty() {
            return Err(error_at(&line[0], "Expected a path after @import".into()));
        }

        let quoted: Option<Vec<Literal>> = rest
            .iter()
            .map(|token| match &token.kind {
                TokenKind::String { value, quote } => {
                    Some(Literal::quoted(value.clone(), *quote, lineno))
                }
                _ => None,
            })
            .collect();

        let path = match quoted {
            Some(literals) => literals,
            None => vec![Literal::new(self.raw_text(rest), lineno)],
        };

        Ok(Node::Import(Import { path, lineno }))
    }

    /// `if cond` / `unless cond`, followed by any `else if` / `else` clauses.
    fn parse_if(&mut self, line: &[Token], lineno: usize) -> Result<Node, ParseError> {
        let cond = self.parse_condition(line)?;
        let block = self.parse_block(lineno)?;

        let mut elses = Vec::new();
        loop {
            let resume = self.pos;
            self.skip_newlines();
            if !matches!(&self.peek().kind, TokenKind::Ident(word) if word == "else") {
                self.pos = resume;
                break;
            }

            let clause = self.take_line();
            let clause_lineno = clause[0].span.line;

            match clause.get(1).map(|t| &t.kind) {
                None => {
                    elses.push(Node::Block(self.parse_block(clause_lineno)?));
                    break;
                }
                Some(TokenKind::Ident(word)) if word == "if" || word == "unless" => {
                    let cond = self.parse_condition(&clause[1..])?;
                    let block = self.parse_block(clause_lineno)?;
                    elses.push(Node::If(If {
                        cond,
                        block,
                        elses: Vec::new(),
                        lineno: clause_lineno,
                    }));
                }
                Some(_) => {
                    return Err(error_at(
                        &clause[1],
                        "Expected 'if' or the end of the line after 'else'".into(),
                    ));
                }
            }
        }

        Ok(Node::If(If {
            cond,
            block,
            elses,
            lineno,
        }))
    }

    /// The condition after `if` / `unless`; `unless` negates it.
    fn parse_condition(&self, line: &[Token]) -> Result<Box<Node>, ParseError> {
        let keyword = &line[0];
        let lineno = keyword.span.line;
        let cond = collapse(self.parse_expression(&line[1..], keyword, lineno)?);

        if matches!(&keyword.kind, TokenKind::Ident(word) if word == "unless") {
            return Ok(Box::new(Node::UnaryOp(UnaryOp {
                op: "!".into(),
                operand: Box::new(cond),
                lineno,
            })));
        }
        Ok(Box::new(cond))
    }

    /// `for val in expr` / `for val, key in expr`
    fn parse_each(&mut self, line: &[Token], lineno: usize) -> Result<Node, ParseError> {
        let val = match line.get(1).map(|t| &t.kind) {
            Some(TokenKind::Ident(name)) => name.clone(),
            _ => return Err(error_at(&line[0], "Expected a variable name after 'for'".into())),
        };

        let mut cursor = 2;
        let mut key = None;
        if matches!(line.get(cursor).map(|t| &t.kind), Some(TokenKind::Comma)) {
            match line.get(cursor + 1).map(|t| &t.kind) {
                Some(TokenKind::Ident(name)) => key = Some(name.clone()),
                _ => return Err(error_at(&line[cursor], "Expected a key name after ','".into())),
            }
            cursor += 2;
        }

        match line.get(cursor) {
            Some(Token {
                kind: TokenKind::Ident(word),
                ..
            }) if word == "in" => {}
            _ => return Err(error_at(&line[0], "Expected 'in' in for loop".into())),
        }

        let expr = self.parse_expression(&line[cursor + 1..], &line[cursor], lineno)?;
        let block = self.parse_block(lineno)?;

        Ok(Node::Each(Each {
            val,
            key,
            expr,
            block,
            lineno,
        }))
    }

    /// Assignments, function definitions, mixin calls, selector groups and
    /// properties: everything that starts with something other than a keyword.
    fn parse_declaration(&mut self, line: &[Token], lineno: usize) -> Result<Node, ParseError> {
        let first = &line[0];

        // name = value / name ?= value
        if let (TokenKind::Ident(name), Some(op)) = (&first.kind, line.get(1)) {
            if matches!(op.kind, TokenKind::Assign | TokenKind::ConditionalAssign) {
                let mut value = self.parse_expression(&line[2..], op, lineno)?;
                if op.kind == TokenKind::ConditionalAssign {
                    value.nodes.push(Node::Literal(Literal::new("!default", lineno)));
                }
                return Ok(Node::Ident(Ident {
                    value: Some(Box::new(Node::Expression(value))),
                    ..Ident::new(name.clone(), lineno)
                }));
            }
        }

        // name(...) with a block is a definition, without one a mixin call
        if let (TokenKind::Ident(name), Some(open)) = (&first.kind, line.get(1)) {
            if open.kind == TokenKind::LParen && first.touches(open) {
                if closing_paren(line, 1) == Some(line.len() - 1) && self.block_follows() {
                    let params = self.parse_params(&line[2..line.len() - 1], lineno)?;
                    let block = self.parse_block(lineno)?;
                    return Ok(Node::Function(Function {
                        name: name.clone(),
                        params,
                        block,
                        lineno,
                    }));
                }
                if !self.block_follows() {
                    return Ok(Node::Expression(self.parse_expression(line, first, lineno)?));
                }
            }
        }

        if self.block_follows() || ends_with_comma(line) {
            return self.parse_group(line.to_vec(), lineno);
        }

        self.parse_property(line, lineno)
    }

    /// One or more selector lines followed by a block.
    fn parse_group(&mut self, mut line: Vec<Token>, lineno: usize) -> Result<Node, ParseError> {
        let mut selectors = Vec::new();

        loop {
            let selector_line = line[0].span.line;
            for part in split_selector_list(&self.raw_text(&line)) {
                selectors.push(Selector {
                    segments: split_segments(part, selector_line, line[0].span.column)?,
                    lineno: selector_line,
                });
            }

            if !ends_with_comma(&line) {
                break;
            }
            if self.peek().kind != TokenKind::Newline {
                return Err(self.error("Expected a selector after ','".into()));
            }
            self.skip_newlines();
            line = self.take_line();
            if line.is_empty() {
                return Err(self.error("Expected a selector after ','".into()));
            }
        }

        let block = self.parse_block(lineno)?;
        Ok(Node::Group(Group { selectors, block }))
    }

    /// `name: value` or `name value`. A line that cannot be split into a name
    /// and a value is an expression statement.
    fn parse_property(&mut self, line: &[Token], lineno: usize) -> Result<Node, ParseError> {
        let first = &line[0];
        let run = touching_run(line);

        if let Some(colon) = line[..run]
            .iter()
            .position(|t| t.kind == TokenKind::Colon)
        {
            if colon == 0 {
                return Err(error_at(first, "Expected a property name before ':'".into()));
            }
            let value = &line[colon + 1..];
            if value.is_empty() {
                return Err(error_at(
                    &line[colon],
                    format!("Expected a value for property '{}'", self.raw_text(&line[..colon])),
                ));
            }
            return self.property(&line[..colon], value, &line[colon], lineno);
        }

        let starts_expression = matches!(
            first.kind,
            TokenKind::Number { .. }
                | TokenKind::String { .. }
                | TokenKind::LParen
                | TokenKind::Bang
                | TokenKind::Minus
                | TokenKind::Plus
        );
        if run == line.len() || starts_expression || continues_expression(line, run) {
            return Ok(Node::Expression(self.parse_expression(line, first, lineno)?));
        }

        self.property(&line[..run], &line[run..], &line[run - 1], lineno)
    }

    fn property(
        &self,
        name: &[Token],
        value: &[Token],
        anchor: &Token,
        lineno: usize,
    ) -> Result<Node, ParseError> {
        let segments = split_segments(&self.raw_text(name), lineno, name[0].span.column)?;
        let value = self.parse_expression(value, anchor, lineno)?;
        Ok(Node::Property(Property {
            segments,
            value,
            lineno,
        }))
    }

    /// Definition parameters: `a`, `b = 10px`, `rest...`
    fn parse_params(&self, tokens: &[Token], lineno: usize) -> Result<Arguments, ParseError> {
        let mut nodes = Vec::new();

        for param in split_top_level(tokens) {
            let node = match param {
                [Token {
                    kind: TokenKind::Ident(name),
                    ..
                }] => Ident::new(name.clone(), lineno),
                [Token {
                    kind: TokenKind::Ident(name),
                    ..
                }, Token {
                    kind: TokenKind::DotDotDot,
                    ..
                }] => Ident::new(format!("{name}..."), lineno),
                [Token {
                    kind: TokenKind::Ident(name),
                    ..
                }, eq @ Token {
                    kind: TokenKind::Assign,
                    ..
                }, default @ ..] => {
                    let value = self.parse_expression(default, eq, lineno)?;
                    Ident {
                        value: Some(Box::new(Node::Expression(value))),
                        ..Ident::new(name.clone(), lineno)
                    }
                }
                [] => return Err(ParseError {
                    message: "Empty parameter".into(),
                    line: lineno,
                    column: 1,
                }),
                [token, ..] => return Err(error_at(token, "Invalid parameter".into())),
            };
            nodes.push(Node::Ident(node));
        }

        Ok(Arguments { nodes, lineno })
    }

    fn parse_expression(
        &self,
        tokens: &[Token],
        anchor: &Token,
        lineno: usize,
    ) -> Result<Expression, ParseError> {
        if tokens.is_empty() {
            return Err(error_at(anchor, "Expected a value".into()));
        }
        ExprParser::parse_tokens(tokens, lineno)
    }

    // =========================================================================
    // Line helpers
    // =========================================================================

    /// Take the tokens up to the end of the logical line, without trailing `;`.
    fn take_line(&mut self) -> Vec<Token> {
        let mut line = Vec::new();
        while !self.peek().kind.is_line_end() {
            line.push(self.peek().clone());
            self.advance();
        }
        while line.last().is_some_and(|t| t.kind == TokenKind::Semicolon) {
            line.pop();
        }
        line
    }

    /// Whether an indented block starts after the current line.
    fn block_follows(&self) -> bool {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .find(|t| t.kind != TokenKind::Newline)
            .is_some_and(|t| t.kind == TokenKind::Indent)
    }

    /// The source text covered by a run of tokens.
    fn raw_text(&self, tokens: &[Token]) -> String {
        match (tokens.first(), tokens.last()) {
            (Some(first), Some(last)) => self.source[first.span.start..last.span.end].to_string(),
            _ => String::new(),
        }
    }

    // =========================================================================
    // Token navigation helpers
    // =========================================================================

    fn peek(&self) -> &Token {
        static EOF: std::sync::LazyLock<Token> =
            std::sync::LazyLock::new(|| Token::new(TokenKind::Eof, Span::new(0, 0, 0, 0)));
        self.tokens.get(self.pos).unwrap_or(&EOF)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len() || matches!(self.peek().kind, TokenKind::Eof)
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek().kind, TokenKind::Newline) {
            self.advance();
        }
    }

    fn error(&self, message: String) -> ParseError {
        error_at(self.peek(), message)
    }
}

fn error_at(token: &Token, message: String) -> ParseError {
    ParseError {
        message,
        line: token.span.line,
        column: token.span.column,
    }
}

/// A one-node expression stands for its node.
fn collapse(mut expr: Expression) -> Node {
    if expr.nodes.len() == 1 && !expr.is_list && !expr.parenthesized {
        if let Some(node) = expr.nodes.pop() {
            return node;
        }
    }
    Node::Expression(expr)
}

fn ends_with_comma(line: &[Token]) -> bool {
    line.last().is_some_and(|t| t.kind == TokenKind::Comma)
}

/// Length of the leading run of tokens written without whitespace between them.
fn touching_run(line: &[Token]) -> usize {
    line.windows(2)
        .position(|pair| !pair[0].touches(&pair[1]))
        .map_or(line.len(), |gap| gap + 1)
}

/// Whether the token at `index` continues an expression (`n * 2`) rather than
/// starting a value. A sign touching its operand (`-(x)`) starts a value.
fn continues_expression(line: &[Token], index: usize) -> bool {
    let token = &line[index];
    match &token.kind {
        TokenKind::Plus | TokenKind::Minus => line
            .get(index + 1)
            .is_none_or(|next| !token.touches(next)),
        TokenKind::Star
        | TokenKind::StarStar
        | TokenKind::Slash
        | TokenKind::Percent
        | TokenKind::EqEq
        | TokenKind::NotEq
        | TokenKind::Lt
        | TokenKind::Gt
        | TokenKind::Lte
        | TokenKind::Gte
        | TokenKind::AndAnd
        | TokenKind::OrOr
        | TokenKind::DotDot
        | TokenKind::DotDotDot => true,
        TokenKind::Ident(word) => matches!(word.as_str(), "and" | "or" | "is" | "isnt"),
        _ => false,
    }
}

/// Index of the parenthesis closing the one at `open`.
fn closing_paren(line: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in line.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split tokens on commas outside parentheses.
fn split_top_level(tokens: &[Token]) -> Vec<&[Token]> {
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth = depth.saturating_sub(1),
            TokenKind::Comma if depth == 0 => {
                parts.push(&tokens[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(&tokens[start..]);
    parts
}
