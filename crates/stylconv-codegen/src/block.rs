//! Selector groups, properties, variable assignments and imports.

use crate::emitter::Emitter;
use crate::scope::variable_ref;
use crate::{malformed, ConvertError};
use stylconv_parser::ast::{Group, Ident, Import, Node, Property};

impl Emitter<'_> {
    /// `a, b {…}`. Selectors from the same source line share it; a selector
    /// from a later line starts its own.
    pub(crate) fn group(&mut self, group: &Group) -> Result<String, ConvertError> {
        let Some((first, rest)) = group.selectors.split_first() else {
            return Err(malformed("selector group without selectors", group.block.lineno));
        };

        let mut out = self.statement_lead(first.lineno);
        out.push_str(&self.segments(&first.segments)?);

        for selector in rest {
            out.push(',');
            let breaks = self.line_break(selector.lineno);
            if breaks.is_empty() {
                out.push(' ');
            } else {
                out.push_str(&breaks);
                out.push_str(&self.indentation());
            }
            out.push_str(&self.segments(&selector.segments)?);
        }

        out.push_str(&self.block(&group.block)?);
        Ok(out)
    }

    /// Selector or property-name text: literal pieces and `#{$name}`.
    pub(crate) fn segments(&mut self, segments: &[Node]) -> Result<String, ConvertError> {
        segments.iter().map(|segment| self.value(segment)).collect()
    }

    /// `name: value;`
    ///
    /// `name: x = value` declares the variable first:
    ///
    /// ```text
    /// $x: value;
    /// name: $x;
    /// ```
    pub(crate) fn property(&mut self, property: &Property) -> Result<String, ConvertError> {
        let lead = self.statement_lead(property.lineno);
        let name = self.segments(&property.segments)?;

        if let Some(Node::Ident(ident)) = property.value.single() {
            if let Some(Node::Expression(expr)) = ident.value.as_deref() {
                let value = self.expression(expr)?;
                let variable = variable_ref(&ident.name);
                self.scope.declare(&ident.name);
                self.scope.push_alias(name.clone(), variable.clone());
                return Ok(format!(
                    "{lead}{variable}: {value};\n{}{name}: {variable};",
                    self.indentation()
                ));
            }
        }

        let value = self.expression(&property.value)?;
        let text = format!("{lead}{name}: {value};");
        self.scope.push_alias(name, value);
        Ok(text)
    }

    /// `name = value` as a statement.
    pub(crate) fn assignment(&mut self, ident: &Ident, value: &Node) -> Result<String, ConvertError> {
        if let Node::Function(function) = value {
            return self.function(function);
        }

        let lead = self.statement_lead(ident.lineno);
        let text = self.value(value)?;
        self.scope.declare(&ident.name);
        Ok(format!("{lead}{}: {text};", variable_ref(&ident.name)))
    }

    /// `@import "path";` with the first quote found among the path pieces.
    pub(crate) fn import(&mut self, import: &Import) -> Result<String, ConvertError> {
        if import.path.is_empty() {
            return Err(malformed("import without a path", import.lineno));
        }

        let lead = self.statement_lead(import.lineno);
        let quote = import
            .path
            .iter()
            .find_map(|piece| piece.quote)
            .map(String::from)
            .unwrap_or_default();
        let path: String = import.path.iter().map(|piece| piece.val.as_str()).collect();

        Ok(format!("{lead}@import {quote}{path}{quote};"))
    }
}
