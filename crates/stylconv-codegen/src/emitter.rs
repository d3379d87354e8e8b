//! Emitter state and node dispatch.
//!
//! Every renderer is a method on [`Emitter`]. Nodes are dispatched from one of
//! two positions:
//!
//! - **statement position** ([`Emitter::visit`]): the node owns a line, gets
//!   the newline/indentation lead, and ends with `;` or a block. A bare call
//!   here is a mixin inclusion, and inside a function an expression is a
//!   return value.
//! - **value position** ([`Emitter::value`]): the node is part of a larger
//!   expression (a property value, condition, argument or loop source) and
//!   renders as plain text.

use crate::scope::Scope;
use crate::{malformed, ConvertError, ConvertOptions, UnsupportedPolicy};
use stylconv_parser::ast::{Block, Node, Stylesheet};

pub(crate) struct Emitter<'o> {
    options: &'o ConvertOptions,
    /// Last source line accounted for in the output.
    pub(crate) current_line: usize,
    pub(crate) indent_depth: usize,
    /// Whether a statement has been emitted yet.
    started: bool,
    pub(crate) scope: Scope,
    /// Inside a mixin or function body.
    pub(crate) in_function: bool,
    /// Prefix for expression statements (`@return ` inside a function).
    pub(crate) return_prefix: Option<&'static str>,
}

impl<'o> Emitter<'o> {
    pub(crate) fn new(options: &'o ConvertOptions) -> Self {
        Self {
            options,
            current_line: 1,
            indent_depth: 0,
            started: false,
            scope: Scope::default(),
            in_function: false,
            return_prefix: None,
        }
    }

    pub(crate) fn stylesheet(&mut self, sheet: &Stylesheet) -> Result<String, ConvertError> {
        self.statements(&sheet.nodes)
    }

    pub(crate) fn statements(&mut self, nodes: &[Node]) -> Result<String, ConvertError> {
        let mut out = String::new();
        for node in nodes {
            out.push_str(&self.visit(node)?);
        }
        Ok(out)
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Render a node in statement position.
    pub(crate) fn visit(&mut self, node: &Node) -> Result<String, ConvertError> {
        match node {
            Node::Import(import) => self.import(import),
            Node::Group(group) => self.group(group),
            Node::Property(property) => self.property(property),
            Node::Ident(ident) => match ident.value.as_deref() {
                Some(value) => self.assignment(ident, value),
                None => self.expression_statement(node),
            },
            Node::If(branch) => self.if_statement(branch),
            Node::Each(each) => self.each(each),
            Node::Function(function) => self.function(function),
            Node::Unsupported(unsupported) => {
                self.unsupported(&unsupported.kind, unsupported.lineno)
            }
            Node::Expression(_)
            | Node::Call(_)
            | Node::BinOp(_)
            | Node::UnaryOp(_)
            | Node::Literal(_)
            | Node::Unit(_)
            | Node::Boolean(_)
            | Node::Rgba(_) => self.expression_statement(node),
            Node::Selector(_) | Node::Block(_) | Node::Arguments(_) | Node::Params(_) => Err(
                malformed(
                    format!("`{}` cannot appear as a statement", node.kind()),
                    node.lineno(),
                ),
            ),
        }
    }

    /// Render a node in value position.
    pub(crate) fn value(&mut self, node: &Node) -> Result<String, ConvertError> {
        match node {
            Node::Expression(expr) => self.expression(expr),
            Node::Ident(ident) => self.ident(ident),
            Node::Call(call) => self.call(call),
            Node::Arguments(args) | Node::Params(args) => self.arguments(args),
            Node::BinOp(op) => self.binop(op),
            Node::UnaryOp(op) => self.unary(op),
            Node::Literal(literal) => Ok(crate::expr::literal(literal)),
            Node::Unit(unit) => Ok(crate::expr::unit(unit)),
            Node::Boolean(boolean) => Ok(boolean.val.to_string()),
            Node::Rgba(color) => Ok(color.raw.clone()),
            Node::Unsupported(unsupported) => {
                self.unsupported(&unsupported.kind, unsupported.lineno)
            }
            Node::Import(_)
            | Node::Group(_)
            | Node::Selector(_)
            | Node::Block(_)
            | Node::Property(_)
            | Node::If(_)
            | Node::Each(_)
            | Node::Function(_) => Err(malformed(
                format!("`{}` cannot appear inside an expression", node.kind()),
                node.lineno(),
            )),
        }
    }

    /// An expression forming a whole statement: `@return` inside a function,
    /// `@include` for a bare call, otherwise the value itself.
    fn expression_statement(&mut self, node: &Node) -> Result<String, ConvertError> {
        let lead = self.statement_lead(node.lineno());
        let text = self.value(node)?;

        let keyword = match self.return_prefix {
            Some(prefix) => prefix,
            None if is_call(node) => "@include ",
            None => "",
        };
        Ok(format!("{lead}{keyword}{text};"))
    }

    pub(crate) fn unsupported(&mut self, kind: &str, line: usize) -> Result<String, ConvertError> {
        match self.options.unsupported {
            UnsupportedPolicy::Error => Err(ConvertError::Unsupported {
                kind: kind.to_string(),
                line,
            }),
            UnsupportedPolicy::Skip => {
                log::warn!("Skipping unsupported construct `{kind}` at line {line}");
                Ok(String::new())
            }
        }
    }

    // =========================================================================
    // Lines and indentation
    // =========================================================================

    /// Newlines separating the output so far from a node on `lineno`.
    pub(crate) fn line_break(&mut self, lineno: usize) -> String {
        let count = lineno.saturating_sub(self.current_line);
        self.current_line = self.current_line.max(lineno);
        "\n".repeat(count)
    }

    /// Move the line position forward without emitting anything.
    pub(crate) fn sync_line(&mut self, lineno: usize) {
        self.current_line = self.current_line.max(lineno);
    }

    /// Newlines and indentation before a statement. Every statement after
    /// the first starts on its own line.
    pub(crate) fn statement_lead(&mut self, lineno: usize) -> String {
        let mut lead = self.line_break(lineno);
        if self.started && lead.is_empty() {
            lead.push('\n');
        }
        self.started = true;
        lead.push_str(&self.indentation());
        lead
    }

    pub(crate) fn indentation(&self) -> String {
        "  ".repeat(self.indent_depth)
    }

    /// ` {`, the body one level deeper, then `}` on its own line.
    pub(crate) fn block(&mut self, block: &Block) -> Result<String, ConvertError> {
        self.indent_depth += 1;
        let body = self.statements(&block.nodes);
        self.indent_depth -= 1;
        Ok(format!(" {{{}\n{}}}", body?, self.indentation()))
    }
}

fn is_call(node: &Node) -> bool {
    match node {
        Node::Call(_) => true,
        Node::Expression(expr) if !expr.parenthesized => matches!(expr.single(), Some(Node::Call(_))),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stylconv_parser::ast::{Literal, Property, Selector};

    fn literal_property(name: &str, value: &str, lineno: usize) -> Node {
        Node::Property(Property {
            segments: vec![Node::Literal(Literal::new(name, lineno))],
            value: stylconv_parser::Expression::new(
                vec![Node::Literal(Literal::new(value, lineno))],
                lineno,
            ),
            lineno,
        })
    }

    #[test]
    fn test_line_break_never_goes_back() {
        let options = ConvertOptions::default();
        let mut emitter = Emitter::new(&options);
        assert_eq!(emitter.line_break(4), "\n\n\n");
        assert_eq!(emitter.current_line, 4);
        assert_eq!(emitter.line_break(2), "");
        assert_eq!(emitter.current_line, 4);
    }

    #[test]
    fn test_statement_lead_forces_a_newline() {
        let options = ConvertOptions::default();
        let mut emitter = Emitter::new(&options);
        assert_eq!(emitter.statement_lead(1), "");
        assert_eq!(emitter.statement_lead(1), "\n");
        emitter.indent_depth = 2;
        assert_eq!(emitter.statement_lead(3), "\n\n    ");
    }

    #[test]
    fn test_block_restores_depth() {
        let options = ConvertOptions::default();
        let mut emitter = Emitter::new(&options);
        let block = Block {
            nodes: vec![literal_property("color", "red", 2)],
            lineno: 1,
        };
        assert_eq!(emitter.block(&block).unwrap(), " {\n  color: red;\n}");
        assert_eq!(emitter.indent_depth, 0);
    }

    #[test]
    fn test_block_restores_depth_on_error() {
        let options = ConvertOptions::default();
        let mut emitter = Emitter::new(&options);
        let block = Block {
            nodes: vec![Node::Selector(Selector {
                segments: vec![],
                lineno: 2,
            })],
            lineno: 1,
        };
        assert!(emitter.block(&block).is_err());
        assert_eq!(emitter.indent_depth, 0);
    }

    #[test]
    fn test_expression_statement_keywords() {
        let options = ConvertOptions::default();
        let mut emitter = Emitter::new(&options);
        let literal = Node::Literal(Literal::new("x", 1));
        assert_eq!(emitter.visit(&literal).unwrap(), "x;");

        emitter.return_prefix = Some("@return ");
        assert_eq!(emitter.visit(&literal).unwrap(), "\n@return x;");
    }
}
