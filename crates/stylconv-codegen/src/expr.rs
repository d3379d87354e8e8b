//! Value-position renderers: expressions, identifiers, calls and operators.

use crate::emitter::Emitter;
use crate::scope::variable_ref;
use crate::{format_number, ConvertError};
use stylconv_parser::ast::{Arguments, BinOp, Call, Expression, Ident, Literal, Node, UnaryOp, Unit};

impl Emitter<'_> {
    /// Nodes joined by `, ` (lists) or a space, in parentheses if written so.
    pub(crate) fn expression(&mut self, expr: &Expression) -> Result<String, ConvertError> {
        let separator = if expr.is_list { ", " } else { " " };
        let parts = expr
            .nodes
            .iter()
            .map(|node| self.value(node))
            .collect::<Result<Vec<_>, _>>()?;

        let text = parts.join(separator);
        if expr.parenthesized {
            Ok(format!("({text})"))
        } else {
            Ok(text)
        }
    }

    /// An identifier in value position. One carrying a value is a keyword
    /// argument (`$name: value`).
    pub(crate) fn ident(&mut self, ident: &Ident) -> Result<String, ConvertError> {
        if let Some(value) = ident.value.as_deref() {
            let value = self.value(value)?;
            return Ok(format!("{}: {value}", variable_ref(&ident.name)));
        }
        Ok(self.resolve(ident))
    }

    /// Property lookup, then interpolation, then variable, then bare name.
    fn resolve(&self, ident: &Ident) -> String {
        if ident.lookup {
            if let Some(value) = self.scope.lookup_alias(&ident.name) {
                return value.to_string();
            }
        }
        if ident.interpolated {
            return format!("#{{{}}}", variable_ref(&ident.name));
        }
        if ident.name.starts_with('$') || self.scope.is_variable(&ident.name) {
            variable_ref(&ident.name)
        } else {
            ident.name.clone()
        }
    }

    pub(crate) fn call(&mut self, call: &Call) -> Result<String, ConvertError> {
        let args = self.arguments(&call.args)?;
        Ok(format!("{}({args})", call.name))
    }

    /// Comma-joined arguments. Inside a definition a bare name is a variable.
    pub(crate) fn arguments(&mut self, args: &Arguments) -> Result<String, ConvertError> {
        let parts = args
            .nodes
            .iter()
            .map(|arg| match arg {
                Node::Ident(ident) if self.in_function && ident.is_plain() => {
                    Ok(variable_ref(&ident.name))
                }
                other => self.value(other),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join(", "))
    }

    pub(crate) fn binop(&mut self, op: &BinOp) -> Result<String, ConvertError> {
        let left = self.value(&op.left)?;
        let right = self.value(&op.right)?;
        Ok(format!("{left} {} {right}", operator(&op.op)))
    }

    /// `not x` for word operators, `-x` for signs. Compound operands get
    /// parentheses.
    pub(crate) fn unary(&mut self, op: &UnaryOp) -> Result<String, ConvertError> {
        let operand = self.value(&op.operand)?;
        let operand = match &*op.operand {
            Node::BinOp(_) => format!("({operand})"),
            Node::Expression(expr) if !expr.parenthesized && expr.nodes.len() > 1 => {
                format!("({operand})")
            }
            _ => operand,
        };

        let spelled = operator(&op.op);
        if spelled.chars().all(char::is_alphabetic) {
            Ok(format!("{spelled} {operand}"))
        } else {
            Ok(format!("{spelled}{operand}"))
        }
    }
}

/// SCSS spelling of a Stylus operator.
pub(crate) fn operator(op: &str) -> &str {
    match op {
        "&&" => "and",
        "||" => "or",
        "!" => "not",
        "is" => "==",
        "isnt" | "is not" => "!=",
        other => other,
    }
}

pub(crate) fn literal(literal: &Literal) -> String {
    match literal.quote {
        Some(quote) => format!("{quote}{}{quote}", literal.val),
        None => literal.val.clone(),
    }
}

pub(crate) fn unit(unit: &Unit) -> String {
    format!("{}{}", format_number(unit.val), unit.unit.as_deref().unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConvertOptions;
    use pretty_assertions::assert_eq;

    fn ident(name: &str) -> Node {
        Node::Ident(Ident::new(name, 1))
    }

    fn binop(op: &str, left: Node, right: Node) -> Node {
        Node::BinOp(BinOp {
            op: op.into(),
            left: Box::new(left),
            right: Box::new(right),
            lineno: 1,
        })
    }

    #[test]
    fn test_operator_map() {
        assert_eq!(operator("&&"), "and");
        assert_eq!(operator("||"), "or");
        assert_eq!(operator("!"), "not");
        assert_eq!(operator("is"), "==");
        assert_eq!(operator("isnt"), "!=");
        assert_eq!(operator("is not"), "!=");
        assert_eq!(operator("+"), "+");
        assert_eq!(operator("and"), "and");
    }

    #[test]
    fn test_literal_and_unit() {
        assert_eq!(literal(&Literal::quoted("a b", '"', 1)), "\"a b\"");
        assert_eq!(literal(&Literal::new("auto", 1)), "auto");
        let half = Unit {
            val: 0.5,
            unit: Some("em".into()),
            lineno: 1,
        };
        assert_eq!(unit(&half), "0.5em");
    }

    #[test]
    fn test_ident_resolution_order() {
        let options = ConvertOptions::default();
        let mut emitter = Emitter::new(&options);
        emitter.scope.declare("width");
        emitter.scope.push_alias("width".into(), "10px".into());

        let lookup = Ident {
            lookup: true,
            ..Ident::new("width", 1)
        };
        let interpolated = Ident {
            interpolated: true,
            ..Ident::new("width", 1)
        };
        let missing_lookup = Ident {
            lookup: true,
            ..Ident::new("height", 1)
        };

        assert_eq!(emitter.ident(&lookup).unwrap(), "10px");
        assert_eq!(emitter.ident(&interpolated).unwrap(), "#{$width}");
        assert_eq!(emitter.ident(&Ident::new("width", 1)).unwrap(), "$width");
        assert_eq!(emitter.ident(&Ident::new("$other", 1)).unwrap(), "$other");
        assert_eq!(emitter.ident(&missing_lookup).unwrap(), "height");
    }

    #[test]
    fn test_unary_wraps_compound_operand() {
        let options = ConvertOptions::default();
        let mut emitter = Emitter::new(&options);
        let negated = UnaryOp {
            op: "!".into(),
            operand: Box::new(binop("&&", ident("a"), ident("b"))),
            lineno: 1,
        };
        assert_eq!(emitter.unary(&negated).unwrap(), "not (a and b)");

        let minus = UnaryOp {
            op: "-".into(),
            operand: Box::new(ident("x")),
            lineno: 1,
        };
        assert_eq!(emitter.unary(&minus).unwrap(), "-x");
    }

    #[test]
    fn test_keyword_argument() {
        let options = ConvertOptions::default();
        let mut emitter = Emitter::new(&options);
        let call = Call {
            name: "border".into(),
            args: Arguments {
                nodes: vec![Node::Ident(Ident {
                    value: Some(Box::new(Node::Expression(Expression::new(
                        vec![Node::Unit(Unit {
                            val: 2.0,
                            unit: Some("px".into()),
                            lineno: 1,
                        })],
                        1,
                    )))),
                    ..Ident::new("width", 1)
                })],
                lineno: 1,
            },
            lineno: 1,
        };
        assert_eq!(emitter.call(&call).unwrap(), "border($width: 2px)");
    }

    #[test]
    fn test_arguments_outside_definition_stay_bare() {
        let options = ConvertOptions::default();
        let mut emitter = Emitter::new(&options);
        let args = Arguments {
            nodes: vec![ident("black"), ident("white")],
            lineno: 1,
        };
        assert_eq!(emitter.arguments(&args).unwrap(), "black, white");

        emitter.in_function = true;
        assert_eq!(emitter.arguments(&args).unwrap(), "$black, $white");
    }

    #[test]
    fn test_list_and_parenthesized() {
        let options = ConvertOptions::default();
        let mut emitter = Emitter::new(&options);
        let list = Expression {
            nodes: vec![ident("a"), ident("b")],
            is_list: true,
            parenthesized: true,
            lineno: 1,
        };
        assert_eq!(emitter.expression(&list).unwrap(), "(a, b)");
    }
}
