use crate::token::{Span, Token, TokenKind};
use crate::LexerError;

/// Stylus source scanner.
///
/// Tokenizes `.styl` source files into a stream of tokens.
/// Handles indentation tracking, CSS-style identifiers, numbers with units,
/// string literals and the operator set of the Stylus expression language.
///
/// - `Vec<char>` source for index-based navigation
/// - Stack-based indentation tracking
/// - Newlines inside parentheses are plain whitespace
/// - Byte-offset spans on every token, so the parser can slice raw selector text
pub struct Scanner<'a> {
    source: &'a str,
    chars: Vec<char>,
    offsets: Vec<usize>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    indent_stack: Vec<usize>,
    at_line_start: bool,
    paren_depth: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source.
    pub fn new(source: &'a str) -> Self {
        let mut offsets: Vec<usize> = source.char_indices().map(|(offset, _)| offset).collect();
        offsets.push(source.len());

        Self {
            source,
            chars: source.chars().collect(),
            offsets,
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            indent_stack: vec![0],
            at_line_start: true,
            paren_depth: 0,
        }
    }

    /// Tokenize the entire source into a vector of tokens.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
        let mut scanner = Scanner::new(source);
        scanner.scan_tokens()?;
        Ok(scanner.tokens)
    }

    /// Scan all tokens from the source.
    fn scan_tokens(&mut self) -> Result<(), LexerError> {
        while !self.is_at_end() {
            self.scan_token()?;
        }

        // Close all pending indents at EOF
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.emit(TokenKind::Dedent);
        }

        self.emit(TokenKind::Eof);
        Ok(())
    }

    /// Scan the next token.
    fn scan_token(&mut self) -> Result<(), LexerError> {
        if self.at_line_start {
            self.handle_indentation()?;
            self.at_line_start = false;
            if self.is_at_end() {
                return Ok(());
            }
        }

        let ch = self.peek();

        match ch {
            // Whitespace (mid-line, skip)
            ' ' | '\t' => {
                self.advance();
                Ok(())
            }

            // Newlines
            '\n' => {
                self.advance();
                self.end_line();
                Ok(())
            }
            '\r' => {
                self.advance();
                // Handle \r\n as single newline
                if !self.is_at_end() && self.peek() == '\n' {
                    self.advance();
                }
                self.end_line();
                Ok(())
            }

            // Comments
            '/' if self.peek_next() == '/' => {
                self.skip_line_comment();
                Ok(())
            }
            '/' if self.peek_next() == '*' => self.skip_block_comment(),

            // Strings
            '"' | '\'' => self.scan_string(),

            // Numbers
            '0'..='9' => self.scan_number(self.pos),
            '.' if self.peek_next().is_ascii_digit() => self.scan_number(self.pos),
            '-' if self.starts_negative_number() => self.scan_number(self.pos),
            '-' if Self::starts_ident_after_dash(self.peek_next()) => self.scan_identifier(),

            // Hash words and at-keywords
            '#' => self.scan_prefixed_word('#'),
            '@' => self.scan_prefixed_word('@'),

            // Dots and ranges
            '.' => {
                if self.peek_next() == '.' {
                    if self.peek_at(2) == '.' {
                        self.emit_wide(TokenKind::DotDotDot, 3);
                    } else {
                        self.emit_wide(TokenKind::DotDot, 2);
                    }
                } else {
                    self.emit_wide(TokenKind::Dot, 1);
                }
                Ok(())
            }

            // Punctuation
            ':' => self.single(TokenKind::Colon),
            ';' => self.single(TokenKind::Semicolon),
            ',' => self.single(TokenKind::Comma),
            '(' => {
                self.paren_depth += 1;
                self.single(TokenKind::LParen)
            }
            ')' => {
                self.paren_depth = self.paren_depth.saturating_sub(1);
                self.single(TokenKind::RParen)
            }
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),

            // Operators
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '/' => self.single(TokenKind::Slash),
            '%' => self.single(TokenKind::Percent),
            '*' => self.one_or_two('*', TokenKind::StarStar, TokenKind::Star),
            '=' => self.one_or_two('=', TokenKind::EqEq, TokenKind::Assign),
            '!' => self.one_or_two('=', TokenKind::NotEq, TokenKind::Bang),
            '?' => self.one_or_two('=', TokenKind::ConditionalAssign, TokenKind::Symbol('?')),
            '<' => self.one_or_two('=', TokenKind::Lte, TokenKind::Lt),
            '>' => self.one_or_two('=', TokenKind::Gte, TokenKind::Gt),
            '&' => self.one_or_two('&', TokenKind::AndAnd, TokenKind::Amp),
            '|' => self.one_or_two('|', TokenKind::OrOr, TokenKind::Symbol('|')),

            // Identifiers and keywords
            c if c.is_alphabetic() || c == '_' || c == '$' => self.scan_identifier(),

            c if c.is_control() => Err(self.error(format!("Unexpected character: {c:?}"))),

            // Selector-only characters (`~`, `^`, `'` inside attribute selectors ...)
            c => self.single(TokenKind::Symbol(c)),
        }
    }

    // --- Indentation ---

    /// Handle indentation at the start of a line.
    /// Counts leading whitespace, compares with indent stack, emits Indent/Dedent.
    fn handle_indentation(&mut self) -> Result<(), LexerError> {
        let mut width = 0;

        while !self.is_at_end() && matches!(self.peek(), ' ' | '\t') {
            self.advance();
            width += 1;
        }

        // Comment-only lines don't affect indentation
        if self.peek() == '/' && self.peek_next() == '/' {
            self.skip_line_comment();
            return Ok(());
        }
        if self.peek() == '/' && self.peek_next() == '*' {
            self.skip_block_comment()?;
            while !self.is_at_end() && matches!(self.peek(), ' ' | '\t') {
                self.advance();
            }
        }

        // Skip blank lines (just whitespace then newline or EOF)
        if self.is_at_end() || self.peek() == '\n' || self.peek() == '\r' {
            return Ok(());
        }

        let current_indent = *self.indent_stack.last().expect("indent stack never empty");

        if width > current_indent {
            self.indent_stack.push(width);
            self.emit(TokenKind::Indent);
        } else if width < current_indent {
            // Pop multiple levels if needed
            while self.indent_stack.len() > 1
                && *self.indent_stack.last().expect("indent stack never empty") > width
            {
                self.indent_stack.pop();
                self.emit(TokenKind::Dedent);
            }

            // Validate alignment
            if *self.indent_stack.last().expect("indent stack never empty") != width {
                return Err(self.error(format!(
                    "Indentation does not match any outer level (got {width} columns)"
                )));
            }
        }

        Ok(())
    }

    /// Finish a physical line. Inside parentheses a line break is plain whitespace.
    fn end_line(&mut self) {
        if self.paren_depth == 0 {
            let span = Span::new(
                self.offset(self.pos - 1),
                self.offset(self.pos),
                self.line,
                self.column,
            );
            self.tokens.push(Token::new(TokenKind::Newline, span));
            self.at_line_start = true;
        }
        self.line += 1;
        self.column = 1;
    }

    // --- Comments ---

    fn skip_line_comment(&mut self) {
        while !self.is_at_end() && self.peek() != '\n' && self.peek() != '\r' {
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexerError> {
        let start_line = self.line;
        let start_col = self.column;

        // Skip `/*`
        self.advance();
        self.advance();

        while !self.is_at_end() {
            if self.peek() == '*' && self.peek_next() == '/' {
                self.advance();
                self.advance();
                return Ok(());
            }
            if self.peek() == '\n' {
                self.line += 1;
                self.column = 0;
            }
            self.advance();
        }

        Err(LexerError {
            message: "Unterminated block comment".into(),
            line: start_line,
            column: start_col,
        })
    }

    // --- Scanners ---

    /// Scan a string literal. The quote character is kept on the token so the
    /// emitter can reproduce it.
    fn scan_string(&mut self) -> Result<(), LexerError> {
        let quote = self.peek();
        let start_line = self.line;
        let start_col = self.column;
        let start_pos = self.pos;
        self.advance(); // consume opening quote

        let mut value = String::new();

        while !self.is_at_end() && self.peek() != quote {
            match self.peek() {
                '\\' => {
                    // Escapes are kept verbatim: CSS and SCSS share the same escape syntax
                    value.push('\\');
                    self.advance();
                    if self.is_at_end() {
                        return Err(LexerError {
                            message: "Unterminated escape sequence".into(),
                            line: self.line,
                            column: self.column,
                        });
                    }
                    value.push(self.peek());
                    self.advance();
                }
                '\n' | '\r' => {
                    return Err(LexerError {
                        message: "Unterminated string".into(),
                        line: start_line,
                        column: start_col,
                    });
                }
                c => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        if self.is_at_end() {
            return Err(LexerError {
                message: "Unterminated string".into(),
                line: start_line,
                column: start_col,
            });
        }

        self.advance(); // consume closing quote

        let span = Span::new(self.offset(start_pos), self.offset(self.pos), start_line, start_col);
        self.tokens
            .push(Token::new(TokenKind::String { value, quote }, span));
        Ok(())
    }

    /// Scan an identifier. Supports hyphens (`font-size`, `-webkit-box`) and
    /// `$` anywhere in the name (`$base-color`). `url(` switches to raw scanning.
    fn scan_identifier(&mut self) -> Result<(), LexerError> {
        let start_line = self.line;
        let start_col = self.column;
        let start_pos = self.pos;

        let mut ident = String::new();
        ident.push(self.peek());
        self.advance();

        while !self.is_at_end()
            && (self.peek().is_alphanumeric()
                || self.peek() == '_'
                || self.peek() == '$'
                || (self.peek() == '-' && Self::is_ident_continue(self.peek_next())))
        {
            ident.push(self.peek());
            self.advance();
        }

        if ident == "url" && self.peek() == '(' {
            return self.scan_url(start_pos, start_line, start_col);
        }

        let span = Span::new(self.offset(start_pos), self.offset(self.pos), start_line, start_col);
        self.tokens.push(Token::new(TokenKind::Ident(ident), span));
        Ok(())
    }

    /// Scan `url(...)` verbatim, including the parentheses.
    fn scan_url(
        &mut self,
        start_pos: usize,
        start_line: usize,
        start_col: usize,
    ) -> Result<(), LexerError> {
        while !self.is_at_end() && self.peek() != ')' {
            if self.peek() == '\n' || self.peek() == '\r' {
                break;
            }
            self.advance();
        }

        if self.peek() != ')' {
            return Err(LexerError {
                message: "Unterminated url()".into(),
                line: start_line,
                column: start_col,
            });
        }
        self.advance(); // consume `)`

        let raw = self.source[self.offset(start_pos)..self.offset(self.pos)].to_string();
        let span = Span::new(self.offset(start_pos), self.offset(self.pos), start_line, start_col);
        self.tokens.push(Token::new(TokenKind::Url(raw), span));
        Ok(())
    }

    /// Scan a number with an optional unit: `10`, `1.5em`, `.5s`, `50%`, `-2px`.
    fn scan_number(&mut self, start_pos: usize) -> Result<(), LexerError> {
        let start_line = self.line;
        let start_col = self.column;

        if self.peek() == '-' {
            self.advance();
        }
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            self.advance();
        }
        // A fraction needs a digit after the dot, so `1..5` stays a range
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text = &self.source[self.offset(start_pos)..self.offset(self.pos)];
        let value: f64 = text.parse().map_err(|_| LexerError {
            message: format!("Invalid number: '{text}'"),
            line: start_line,
            column: start_col,
        })?;

        let mut unit = String::new();
        if self.peek() == '%' {
            unit.push('%');
            self.advance();
        } else {
            while !self.is_at_end() && self.peek().is_ascii_alphabetic() {
                unit.push(self.peek());
                self.advance();
            }
        }

        let span = Span::new(self.offset(start_pos), self.offset(self.pos), start_line, start_col);
        self.tokens
            .push(Token::new(TokenKind::Number { value, unit }, span));
        Ok(())
    }

    /// Scan `#word` or `@word`. A bare prefix becomes a symbol.
    fn scan_prefixed_word(&mut self, prefix: char) -> Result<(), LexerError> {
        let start_line = self.line;
        let start_col = self.column;
        let start_pos = self.pos;
        self.advance(); // consume prefix

        let mut word = String::new();
        while !self.is_at_end()
            && (self.peek().is_alphanumeric() || self.peek() == '-' || self.peek() == '_')
        {
            word.push(self.peek());
            self.advance();
        }

        let kind = match (prefix, word.is_empty()) {
            (_, true) => TokenKind::Symbol(prefix),
            ('#', false) => TokenKind::Hash(word),
            _ => TokenKind::AtWord(word),
        };

        let span = Span::new(self.offset(start_pos), self.offset(self.pos), start_line, start_col);
        self.tokens.push(Token::new(kind, span));
        Ok(())
    }

    // --- Helpers ---

    /// A `-` directly followed by a digit starts a negative number when it sits
    /// in value-start position (after whitespace, `(`, `,` or `:`).
    fn starts_negative_number(&self) -> bool {
        let next = self.peek_next();
        let digit_follows =
            next.is_ascii_digit() || (next == '.' && self.peek_at(2).is_ascii_digit());
        if !digit_follows {
            return false;
        }
        match self.pos.checked_sub(1).map(|index| self.chars[index]) {
            None => true,
            Some(prev) => prev.is_whitespace() || matches!(prev, '(' | ',' | ':'),
        }
    }

    /// `-webkit-box`, `--custom`, `-_private`; not `-$x` or `-2`.
    fn starts_ident_after_dash(c: char) -> bool {
        c.is_alphabetic() || c == '_' || c == '-'
    }

    fn is_ident_continue(c: char) -> bool {
        c.is_alphanumeric() || c == '_' || c == '$' || c == '-'
    }

    fn single(&mut self, kind: TokenKind) -> Result<(), LexerError> {
        self.emit_wide(kind, 1);
        Ok(())
    }

    fn one_or_two(
        &mut self,
        second: char,
        double: TokenKind,
        single: TokenKind,
    ) -> Result<(), LexerError> {
        if self.peek_next() == second {
            self.emit_wide(double, 2);
        } else {
            self.emit_wide(single, 1);
        }
        Ok(())
    }

    /// Emit a token covering the next `width` characters and consume them.
    fn emit_wide(&mut self, kind: TokenKind, width: usize) {
        let start = self.pos;
        let column = self.column;
        for _ in 0..width {
            self.advance();
        }
        let span = Span::new(self.offset(start), self.offset(self.pos), self.line, column);
        self.tokens.push(Token::new(kind, span));
    }

    /// Emit a zero-width structural token.
    fn emit(&mut self, kind: TokenKind) {
        let offset = self.offset(self.pos);
        let span = Span::new(offset, offset, self.line, self.column);
        self.tokens.push(Token::new(kind, span));
    }

    fn offset(&self, pos: usize) -> usize {
        self.offsets[pos.min(self.chars.len())]
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_next(&self) -> char {
        self.peek_at(1)
    }

    fn peek_at(&self, distance: usize) -> char {
        self.chars.get(self.pos + distance).copied().unwrap_or('\0')
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
            self.column += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn error(&self, message: String) -> LexerError {
        LexerError {
            message,
            line: self.line,
            column: self.column,
        }
    }
}
