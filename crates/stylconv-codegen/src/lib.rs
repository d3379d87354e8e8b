//! Stylus to SCSS Code Generator
//!
//! Walks a Stylus syntax tree and prints the equivalent SCSS. The walk is a
//! single pass from the root to the leaves; everything it needs to remember
//! (line position, indentation, variables in scope, property aliases) lives in
//! one `Emitter` created per conversion.
//!
//! ```text
//! source → Parser::parse() → Stylesheet → Emitter → SCSS text
//! ```
//!
//! ```
//! use stylconv_codegen::{convert, ConvertOptions};
//!
//! let scss = convert("a\n  color red", &ConvertOptions::default()).unwrap();
//! assert_eq!(scss, "a {\n  color: red;\n}");
//! ```

mod block;
mod control;
mod emitter;
mod expr;
mod function;
mod scope;

use std::fmt;
use std::str::FromStr;

use emitter::Emitter;
use stylconv_parser::{ParseError, Parser, Stylesheet};

/// Conversion error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    /// The source could not be parsed; nothing was emitted.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A construct with no SCSS rendering, under the strict policy.
    #[error("Unsupported construct `{kind}` at line {line}")]
    Unsupported { kind: String, line: usize },

    /// A tree that breaks the shape the emitter relies on.
    #[error("Malformed tree at line {line}: {message}")]
    Malformed { message: String, line: usize },

    #[error("Unknown target dialect '{0}' (expected 'scss')")]
    UnknownDialect(String),
}

/// Target dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    #[default]
    Scss,
}

impl Dialect {
    /// File extension for converted output.
    pub fn extension(&self) -> &'static str {
        match self {
            Dialect::Scss => "scss",
        }
    }
}

impl FromStr for Dialect {
    type Err = ConvertError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "scss" => Ok(Dialect::Scss),
            _ => Err(ConvertError::UnknownDialect(name.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// What to do with constructs that have no SCSS rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnsupportedPolicy {
    /// Fail the conversion, naming the construct and its line.
    #[default]
    Error,
    /// Drop the construct and log a warning.
    Skip,
}

/// Conversion settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub dialect: Dialect,
    pub unsupported: UnsupportedPolicy,
}

impl ConvertOptions {
    /// Options that drop unsupported constructs instead of failing.
    pub fn lenient() -> Self {
        Self {
            unsupported: UnsupportedPolicy::Skip,
            ..Self::default()
        }
    }
}

/// Convert Stylus source text.
pub fn convert(source: &str, options: &ConvertOptions) -> Result<String, ConvertError> {
    let sheet = Parser::parse(source)?;
    log::debug!("Parsed {} top-level statements", sheet.nodes.len());
    convert_stylesheet(&sheet, options)
}

/// Convert an already-parsed stylesheet.
pub fn convert_stylesheet(
    sheet: &Stylesheet,
    options: &ConvertOptions,
) -> Result<String, ConvertError> {
    let mut emitter = Emitter::new(options);
    let output = emitter.stylesheet(sheet)?;
    log::debug!("Emitted {} bytes of {}", output.len(), options.dialect);
    Ok(output)
}

/// Format a number, removing `.0` for integers.
pub fn format_number(n: f64) -> String {
    // `-0` prints as `0`
    if n == 0.0 {
        return "0".to_string();
    }
    format!("{n}")
}

pub(crate) fn malformed(message: impl Into<String>, line: usize) -> ConvertError {
    ConvertError::Malformed {
        message: message.into(),
        line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stylconv_parser::ast::*;

    fn scss(source: &str) -> String {
        convert(source, &ConvertOptions::default()).unwrap()
    }

    fn scss_err(source: &str) -> ConvertError {
        convert(source, &ConvertOptions::default()).unwrap_err()
    }

    fn tree(nodes: Vec<Node>) -> Stylesheet {
        Stylesheet { nodes }
    }

    fn expr(nodes: Vec<Node>, lineno: usize) -> Expression {
        Expression::new(nodes, lineno)
    }

    fn property(name: &str, value: Vec<Node>, lineno: usize) -> Node {
        Node::Property(Property {
            segments: vec![Node::Literal(Literal::new(name, lineno))],
            value: expr(value, lineno),
            lineno,
        })
    }

    fn selector(text: &str, lineno: usize) -> Selector {
        Selector {
            segments: vec![Node::Literal(Literal::new(text, lineno))],
            lineno,
        }
    }

    // =========================================================================
    // Literal scenarios
    // =========================================================================

    #[test]
    fn test_import() {
        assert_eq!(scss("@import \"foo\""), "@import \"foo\";");
    }

    #[test]
    fn test_property_self_reference_shorthand() {
        assert_eq!(scss("color: red = #fff"), "$red: #fff;\ncolor: $red;");
    }

    #[test]
    fn test_if_with_logical_operator() {
        assert_eq!(
            scss("if a && b\n  color red"),
            "@if a and b {\n  color: red;\n}"
        );
    }

    #[test]
    fn test_range_loop() {
        assert_eq!(
            scss("for i in 1..5\n  width i"),
            "@for $i from 1 through 5 {\n  width: $i;\n}"
        );
    }

    #[test]
    fn test_function_with_return() {
        assert_eq!(
            scss("double(n)\n  return n * 2"),
            "@function double($n) {\n  @return $n * 2;\n}"
        );
    }

    // =========================================================================
    // Layout
    // =========================================================================

    #[test]
    fn test_empty_source() {
        assert_eq!(scss(""), "");
    }

    #[test]
    fn test_statements_in_order() {
        let output = scss("$a = 1\n$b = 2\n@import 'c'");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines, vec!["$a: 1;", "$b: 2;", "@import 'c';"]);
    }

    #[test]
    fn test_blank_lines_preserved() {
        assert_eq!(scss("$a = 1\n\n\n$b = 2"), "$a: 1;\n\n\n$b: 2;");
    }

    #[test]
    fn test_blank_lines_after_block() {
        assert_eq!(
            scss("a\n  color red\n\nb\n  color blue"),
            "a {\n  color: red;\n}\n\nb {\n  color: blue;\n}"
        );
    }

    #[test]
    fn test_nested_blocks_indent() {
        assert_eq!(
            scss(".a\n  .b\n    color red\n  margin 0"),
            ".a {\n  .b {\n    color: red;\n  }\n  margin: 0;\n}"
        );
    }

    #[test]
    fn test_braces_balance() {
        let source = "\
$size = 10px
rounded(r)
  border-radius r
.nav-{kind}
  a, b
    rounded(2px)
    if $size > 5px
      width $size
    else
      width 0
  for i in 1..3
    margin i";
        let output = scss(source);
        let opens = output.matches('{').count();
        let closes = output.matches('}').count();
        assert_eq!(opens, closes);

        // every closing brace lines up with the line that opened it
        let mut stack = Vec::new();
        for line in output.lines() {
            let indent = line.len() - line.trim_start().len();
            if line.trim_start().starts_with('}') {
                assert_eq!(stack.pop(), Some(indent), "misaligned close in {output}");
            }
            if line.trim_end().ends_with('{') {
                stack.push(indent);
            }
        }
        assert!(stack.is_empty());
    }

    // =========================================================================
    // Selectors
    // =========================================================================

    #[test]
    fn test_selectors_same_line() {
        assert_eq!(scss("h1, h2\n  margin 0"), "h1, h2 {\n  margin: 0;\n}");
    }

    #[test]
    fn test_selectors_on_separate_lines() {
        assert_eq!(scss("h1,\nh2\n  margin 0"), "h1,\nh2 {\n  margin: 0;\n}");
    }

    #[test]
    fn test_interpolated_selector_and_property() {
        assert_eq!(
            scss(".icon-{name}\n  border-{side}: 0"),
            ".icon-#{$name} {\n  border-#{$side}: 0;\n}"
        );
    }

    #[test]
    fn test_group_without_selectors() {
        let sheet = tree(vec![Node::Group(Group {
            selectors: vec![],
            block: Block::default(),
        })]);
        let err = convert_stylesheet(&sheet, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::Malformed { .. }));
    }

    // =========================================================================
    // Variables and scope
    // =========================================================================

    #[test]
    fn test_conditional_assignment() {
        assert_eq!(scss("$size ?= 10px"), "$size: 10px !default;");
    }

    #[test]
    fn test_variable_visible_after_declaration() {
        assert_eq!(
            scss("a\n  x = 1\nb\n  width x"),
            "a {\n  $x: 1;\n}\nb {\n  width: $x;\n}"
        );
    }

    #[test]
    fn test_undeclared_name_stays_bare() {
        assert_eq!(scss("a\n  width x"), "a {\n  width: x;\n}");
    }

    #[test]
    fn test_property_lookup() {
        assert_eq!(
            scss("a\n  width 10px\n  height @width"),
            "a {\n  width: 10px;\n  height: 10px;\n}"
        );
    }

    #[test]
    fn test_fresh_state_per_call() {
        assert_eq!(scss("x = 1"), "$x: 1;");
        assert_eq!(scss("a\n  width x"), "a {\n  width: x;\n}");
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    #[test]
    fn test_if_else_chain() {
        assert_eq!(
            scss("if a\n  color red\nelse if b\n  color blue\nelse\n  color green"),
            "@if a {\n  color: red;\n} @else if b {\n  color: blue;\n} @else {\n  color: green;\n}"
        );
    }

    #[test]
    fn test_unless() {
        assert_eq!(
            scss("unless hidden\n  display block"),
            "@if not hidden {\n  display: block;\n}"
        );
    }

    #[test]
    fn test_comparison_operators() {
        assert_eq!(
            scss("if a is b or c isnt d\n  x y"),
            "@if a == b or c != d {\n  x: y;\n}"
        );
    }

    #[test]
    fn test_exclusive_range() {
        assert_eq!(
            scss("for i in 1...3\n  w i"),
            "@for $i from 1 to 3 {\n  w: $i;\n}"
        );
    }

    #[test]
    fn test_each_over_list() {
        assert_eq!(
            scss("for c in red blue\n  color c"),
            "@each $c in $red, $blue {\n  color: $c;\n}"
        );
    }

    #[test]
    fn test_each_with_key() {
        assert_eq!(
            scss("for v, k in a b\n  x v k"),
            "@each $v, $k in $a, $b {\n  x: $v $k;\n}"
        );
    }

    #[test]
    fn test_else_branch_must_be_if_or_block() {
        let sheet = tree(vec![Node::If(If {
            cond: Box::new(Node::Boolean(Boolean {
                val: true,
                lineno: 1,
            })),
            block: Block::default(),
            elses: vec![Node::Literal(Literal::new("oops", 2))],
            lineno: 1,
        })]);
        let err = convert_stylesheet(&sheet, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::Malformed { line: 2, .. }));
    }

    // =========================================================================
    // Functions and mixins
    // =========================================================================

    #[test]
    fn test_mixin_and_include() {
        assert_eq!(
            scss("rounded(r)\n  border-radius r\n.btn\n  rounded(4px)"),
            "@mixin rounded($r) {\n  border-radius: $r;\n}\n.btn {\n  @include rounded(4px);\n}"
        );
    }

    #[test]
    fn test_mixin_detected_through_nested_blocks() {
        assert_eq!(
            scss("toggle(on)\n  if on\n    display block"),
            "@mixin toggle($on) {\n  @if $on {\n    display: block;\n  }\n}"
        );
    }

    #[test]
    fn test_function_default_params() {
        assert_eq!(
            scss("scale(n, factor = 2)\n  return n * factor"),
            "@function scale($n, $factor: 2) {\n  @return $n * $factor;\n}"
        );
    }

    #[test]
    fn test_function_call_arguments_become_variables() {
        assert_eq!(
            scss("tint(c)\n  return mix(white, c)"),
            "@function tint($c) {\n  @return mix($white, $c);\n}"
        );
    }

    #[test]
    fn test_discriminator_is_stable() {
        let sheet = Parser::parse("pad(n)\n  padding n\nhalf(n)\n  return n / 2").unwrap();
        let options = ConvertOptions::default();
        let first = convert_stylesheet(&sheet, &options).unwrap();
        let second = convert_stylesheet(&sheet, &options).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("@mixin pad($n)"));
        assert!(first.contains("@function half($n)"));
    }

    // =========================================================================
    // Values
    // =========================================================================

    #[test]
    fn test_value_kinds() {
        assert_eq!(
            scss("a\n  font 12px/1.5 'Helvetica', sans-serif !important"),
            "a {\n  font: 12px / 1.5 'Helvetica', sans-serif !important;\n}"
        );
    }

    #[test]
    fn test_parenthesized_and_unary() {
        assert_eq!(
            scss("a\n  margin -(x + 1px) (2 * 3)"),
            "a {\n  margin: -(x + 1px) (2 * 3);\n}"
        );
    }

    #[test]
    fn test_value_call_keeps_plain_arguments() {
        assert_eq!(
            scss("a\n  color darken(#fff, 10%)"),
            "a {\n  color: darken(#fff, 10%);\n}"
        );
    }

    #[test]
    fn test_statement_in_value_position() {
        let sheet = tree(vec![property(
            "color",
            vec![Node::Group(Group {
                selectors: vec![selector("a", 1)],
                block: Block::default(),
            })],
            1,
        )]);
        let err = convert_stylesheet(&sheet, &ConvertOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ConvertError::Malformed {
                message: "`Group` cannot appear inside an expression".into(),
                line: 1,
            }
        );
    }

    // =========================================================================
    // Unsupported constructs
    // =========================================================================

    #[test]
    fn test_unsupported_is_an_error_by_default() {
        assert_eq!(
            scss_err("@media print\n  body\n    color black"),
            ConvertError::Unsupported {
                kind: "@media".into(),
                line: 1,
            }
        );
    }

    #[test]
    fn test_unsupported_is_skipped_when_lenient() {
        let output = convert(
            "@media print\n  body\n    color black\na\n  color red",
            &ConvertOptions::lenient(),
        )
        .unwrap();
        assert!(!output.contains("@media"));
        assert!(output.ends_with("a {\n  color: red;\n}"));
    }

    #[test]
    fn test_parse_error_surfaces() {
        assert!(matches!(scss_err("a\n    b c\n  d e"), ConvertError::Parse(_)));
    }

    // =========================================================================
    // Options
    // =========================================================================

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("scss".parse::<Dialect>(), Ok(Dialect::Scss));
        assert_eq!(" SCSS ".parse::<Dialect>(), Ok(Dialect::Scss));
        assert_eq!(
            "less".parse::<Dialect>(),
            Err(ConvertError::UnknownDialect("less".into()))
        );
        assert_eq!(Dialect::Scss.to_string(), "scss");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-2.0), "-2");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e20), "100000000000000000000");
    }

    #[test]
    fn test_whole_number_beyond_i64() {
        assert_eq!(
            scss("a\n  width 99999999999999999999px"),
            "a {\n  width: 100000000000000000000px;\n}"
        );
    }

    // =========================================================================
    // Trees handed over as JSON
    // =========================================================================

    #[test]
    fn test_convert_json_tree() {
        let sheet: Stylesheet = serde_json::from_str(JSON_TREE).unwrap();
        assert_eq!(
            convert_stylesheet(&sheet, &ConvertOptions::default()).unwrap(),
            "@import 'base';\n\n\
             .nav-#{$x} {\n  color: #fff;\n  $w: 2px;\n  width: $w;\n  height: $w;\n  font-family: a, b;\n}\n\n\
             @function half($n) {\n  @return -($n / 2);\n}"
        );
    }

    const JSON_TREE: &str = r##"{
  "nodes": [
    { "__type": "Import", "path": [{ "val": "base", "quote": "'" }], "lineno": 1 },
    {
      "__type": "Group",
      "nodes": [
        {
          "segments": [
            { "__type": "Literal", "val": ".nav-" },
            { "__type": "Ident", "name": "x", "mixin": true }
          ],
          "lineno": 3
        }
      ],
      "block": {
        "nodes": [
          {
            "__type": "Property",
            "segments": [{ "__type": "Literal", "val": "color" }],
            "expr": { "nodes": [{ "__type": "RGBA", "raw": "#fff" }] },
            "lineno": 4
          },
          {
            "__type": "Property",
            "segments": [{ "__type": "Literal", "val": "width" }],
            "expr": {
              "nodes": [
                {
                  "__type": "Ident",
                  "name": "w",
                  "val": {
                    "__type": "Expression",
                    "nodes": [{ "__type": "Unit", "val": 2, "type": "px" }]
                  }
                }
              ]
            },
            "lineno": 5
          },
          {
            "__type": "Property",
            "segments": [{ "__type": "Literal", "val": "height" }],
            "expr": { "nodes": [{ "__type": "Ident", "name": "width", "property": true }] },
            "lineno": 6
          },
          {
            "__type": "Property",
            "segments": [{ "__type": "Literal", "val": "font-family" }],
            "expr": {
              "nodes": [
                { "__type": "Literal", "val": "a" },
                { "__type": "Literal", "val": "b" }
              ],
              "isList": true
            },
            "lineno": 7
          }
        ],
        "lineno": 3
      }
    },
    {
      "__type": "Function",
      "name": "half",
      "params": { "nodes": [{ "__type": "Ident", "name": "n" }] },
      "block": {
        "nodes": [
          {
            "__type": "Expression",
            "nodes": [
              {
                "__type": "UnaryOp",
                "op": "-",
                "expr": {
                  "__type": "BinOp",
                  "op": "/",
                  "left": { "__type": "Ident", "name": "n" },
                  "right": { "__type": "Unit", "val": 2 }
                }
              }
            ],
            "lineno": 10
          }
        ]
      },
      "lineno": 9
    }
  ]
}"##;
}
