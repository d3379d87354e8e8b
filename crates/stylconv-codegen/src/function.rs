//! Mixin and function definitions.
//!
//! Stylus has one definition form for both. A body that sets any property
//! (at any depth) is a mixin; anything else is a function whose expression
//! statements are return values.

use crate::emitter::Emitter;
use crate::scope::variable_ref;
use crate::{malformed, ConvertError};
use stylconv_parser::ast::{Arguments, Block, Function, Node};

impl Emitter<'_> {
    pub(crate) fn function(&mut self, function: &Function) -> Result<String, ConvertError> {
        let lead = self.statement_lead(function.lineno);
        let is_mixin = sets_property(&function.block);
        let keyword = if is_mixin { "@mixin" } else { "@function" };

        let saved = (self.in_function, self.return_prefix);
        self.in_function = true;
        self.return_prefix = if is_mixin { None } else { Some("@return ") };

        let rendered = self.definition(function);
        (self.in_function, self.return_prefix) = saved;
        let (params, block) = rendered?;

        Ok(format!("{lead}{keyword} {}({params}){block}", function.name))
    }

    fn definition(&mut self, function: &Function) -> Result<(String, String), ConvertError> {
        let params = self.params(&function.params)?;
        let block = self.block(&function.block)?;
        Ok((params, block))
    }

    /// `$a, $b: default, $rest...`. Every name is declared before the body.
    fn params(&mut self, params: &Arguments) -> Result<String, ConvertError> {
        let mut rendered = Vec::with_capacity(params.nodes.len());

        for param in &params.nodes {
            let Node::Ident(ident) = param else {
                return Err(malformed(
                    format!("`{}` cannot be a parameter", param.kind()),
                    param.lineno(),
                ));
            };

            let name = variable_ref(&ident.name);
            self.scope.declare(ident.name.trim_end_matches("..."));

            match ident.value.as_deref() {
                Some(default) => {
                    let default = self.value(default)?;
                    rendered.push(format!("{name}: {default}"));
                }
                None => rendered.push(name),
            }
        }

        Ok(rendered.join(", "))
    }
}

/// Whether a body sets a property, looking through nested blocks.
fn sets_property(block: &Block) -> bool {
    block.nodes.iter().any(node_sets_property)
}

fn node_sets_property(node: &Node) -> bool {
    match node {
        Node::Property(_) => true,
        Node::Block(block) => sets_property(block),
        Node::Group(group) => sets_property(&group.block),
        Node::Each(each) => sets_property(&each.block),
        Node::If(branch) => {
            sets_property(&branch.block) || branch.elses.iter().any(node_sets_property)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{convert, ConvertOptions};
    use pretty_assertions::assert_eq;
    use stylconv_parser::Parser;

    fn scss(source: &str) -> String {
        convert(source, &ConvertOptions::default()).unwrap()
    }

    fn first_function(source: &str) -> Function {
        match Parser::parse(source).unwrap().nodes.remove(0) {
            Node::Function(function) => function,
            other => panic!("Expected Function, got {other:?}"),
        }
    }

    #[test]
    fn test_property_in_else_branch_makes_a_mixin() {
        let function = first_function("m(a)\n  if a\n    return 1\n  else\n    color red");
        assert!(sets_property(&function.block));
    }

    #[test]
    fn test_nested_definition_does_not_count() {
        let function = first_function("outer()\n  inner()\n    color red\n  return 1");
        assert!(!sets_property(&function.block));
    }

    #[test]
    fn test_rest_param() {
        assert_eq!(
            scss("shadow(args...)\n  box-shadow args"),
            "@mixin shadow($args...) {\n  box-shadow: $args;\n}"
        );
    }

    #[test]
    fn test_flags_restored_after_definition() {
        assert_eq!(
            scss("half(n)\n  return n / 2\nfoo(1)"),
            "@function half($n) {\n  @return $n / 2;\n}\n@include foo(1);"
        );
    }

    #[test]
    fn test_implicit_return() {
        assert_eq!(
            scss("add(a, b)\n  a + b"),
            "@function add($a, $b) {\n  @return $a + $b;\n}"
        );
    }

    #[test]
    fn test_return_inside_conditional() {
        assert_eq!(
            scss("sign(n)\n  if n < 0\n    return -1\n  return 1"),
            "@function sign($n) {\n  @if $n < 0 {\n    @return -1;\n  }\n  @return 1;\n}"
        );
    }
}
