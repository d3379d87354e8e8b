//! Conditionals and loops.

use crate::emitter::Emitter;
use crate::scope::variable_ref;
use crate::{malformed, ConvertError};
use stylconv_parser::ast::{BinOp, Each, Expression, If, Node};

impl Emitter<'_> {
    /// `@if cond {…}` followed by ` @else if cond {…}` / ` @else {…}`.
    pub(crate) fn if_statement(&mut self, branch: &If) -> Result<String, ConvertError> {
        let lead = self.statement_lead(branch.lineno);
        let cond = self.value(&branch.cond)?;

        let mut out = format!("{lead}@if {cond}");
        out.push_str(&self.block(&branch.block)?);
        self.alternatives(&branch.elses, &mut out)?;
        Ok(out)
    }

    fn alternatives(&mut self, elses: &[Node], out: &mut String) -> Result<(), ConvertError> {
        for alternative in elses {
            match alternative {
                Node::If(branch) => {
                    self.sync_line(branch.lineno);
                    let cond = self.value(&branch.cond)?;
                    out.push_str(" @else if ");
                    out.push_str(&cond);
                    out.push_str(&self.block(&branch.block)?);
                    self.alternatives(&branch.elses, out)?;
                }
                Node::Block(block) => {
                    self.sync_line(block.lineno);
                    out.push_str(" @else");
                    out.push_str(&self.block(block)?);
                }
                other => {
                    return Err(malformed(
                        format!("`{}` cannot be an else branch", other.kind()),
                        other.lineno(),
                    ))
                }
            }
        }
        Ok(())
    }

    /// `@for $i from a through b` for `a..b`, `@for $i from a to b` for
    /// `a...b`, `@each $v[, $k] in …` for anything else. A key on a range
    /// loop goes through the unsupported policy.
    pub(crate) fn each(&mut self, each: &Each) -> Result<String, ConvertError> {
        let lead = self.statement_lead(each.lineno);
        let variable = variable_ref(&each.val);
        self.scope.declare(&each.val);

        let header = match range(&each.expr) {
            Some(bounds) => {
                // `@for` has no key variable
                if each.key.is_some() {
                    self.unsupported("range loop key", each.lineno)?;
                }
                let from = self.value(&bounds.left)?;
                let to = self.value(&bounds.right)?;
                let keyword = if bounds.op == "..." { "to" } else { "through" };
                format!("@for {variable} from {from} {keyword} {to}")
            }
            None => {
                let mut names = variable;
                if let Some(key) = &each.key {
                    self.scope.declare(key);
                    names.push_str(", ");
                    names.push_str(&variable_ref(key));
                }
                let items = each
                    .expr
                    .nodes
                    .iter()
                    .map(|item| self.iteration_item(item))
                    .collect::<Result<Vec<_>, _>>()?;
                format!("@each {names} in {}", items.join(", "))
            }
        };

        let block = self.block(&each.block)?;
        Ok(format!("{lead}{header}{block}"))
    }

    /// Loop sources name variables: a bare identifier is a variable reference.
    fn iteration_item(&mut self, item: &Node) -> Result<String, ConvertError> {
        match item {
            Node::Ident(ident) if ident.is_plain() => Ok(variable_ref(&ident.name)),
            Node::Expression(expr) if !expr.parenthesized && expr.nodes.len() == 1 => {
                self.iteration_item(&expr.nodes[0])
            }
            other => self.value(other),
        }
    }
}

/// The bounds of `a..b` / `a...b` when that is the whole loop source.
fn range(expr: &Expression) -> Option<&BinOp> {
    match expr.single() {
        Some(Node::BinOp(op)) if op.op == ".." || op.op == "..." => Some(op),
        _ => None,
    }
}
