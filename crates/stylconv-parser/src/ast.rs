//! Abstract Syntax Tree for Stylus.
//!
//! One closed enum of node kinds, each wrapping a struct that carries the
//! source line number (`lineno`) and its kind-specific children.
//!
//! Trees serialize with a `__type` tag per node, so a tree produced elsewhere
//! (for example by a JavaScript tool) can be handed to the converter as JSON.

use serde::{Deserialize, Serialize};

/// A complete stylesheet: the root statement list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
}

/// Every node kind the converter understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__type")]
pub enum Node {
    /// `@import "path"`
    Import(Import),

    /// One or more selectors sharing a block.
    Group(Group),

    /// A single selector (normally found inside a `Group`).
    Selector(Selector),

    /// An indented body.
    Block(Block),

    /// `name: value`
    Property(Property),

    /// A name: variable reference, assignment, or function definition.
    Ident(Ident),

    /// A space- or comma-separated sequence of values.
    Expression(Expression),

    /// `name(args)`
    Call(Call),

    /// Call arguments.
    Arguments(Arguments),

    /// Function parameters.
    Params(Arguments),

    /// `left op right`
    BinOp(BinOp),

    /// `op operand`
    UnaryOp(UnaryOp),

    /// `if` / `unless` with its `else if` / `else` alternatives.
    If(If),

    /// `for val[, key] in expr`
    Each(Each),

    /// Raw text, optionally quoted.
    Literal(Literal),

    /// A number with an optional unit.
    Unit(Unit),

    Boolean(Boolean),

    /// A color literal such as `#fff`.
    #[serde(rename = "RGBA")]
    Rgba(Rgba),

    /// A mixin or function definition.
    Function(Function),

    /// A construct the front end recognised but that has no SCSS rendering
    /// (`@media`, `@keyframes`, `@extend` ...).
    Unsupported(Unsupported),
}

impl Node {
    /// The kind name, as used in the serialized `__type` tag and in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Import(_) => "Import",
            Node::Group(_) => "Group",
            Node::Selector(_) => "Selector",
            Node::Block(_) => "Block",
            Node::Property(_) => "Property",
            Node::Ident(_) => "Ident",
            Node::Expression(_) => "Expression",
            Node::Call(_) => "Call",
            Node::Arguments(_) => "Arguments",
            Node::Params(_) => "Params",
            Node::BinOp(_) => "BinOp",
            Node::UnaryOp(_) => "UnaryOp",
            Node::If(_) => "If",
            Node::Each(_) => "Each",
            Node::Literal(_) => "Literal",
            Node::Unit(_) => "Unit",
            Node::Boolean(_) => "Boolean",
            Node::Rgba(_) => "RGBA",
            Node::Function(_) => "Function",
            Node::Unsupported(_) => "Unsupported",
        }
    }

    /// Source line the node starts on (0 for synthetic nodes).
    pub fn lineno(&self) -> usize {
        match self {
            Node::Import(n) => n.lineno,
            Node::Group(n) => n.selectors.first().map_or(0, |s| s.lineno),
            Node::Selector(n) => n.lineno,
            Node::Block(n) => n.lineno,
            Node::Property(n) => n.lineno,
            Node::Ident(n) => n.lineno,
            Node::Expression(n) => n.lineno,
            Node::Call(n) => n.lineno,
            Node::Arguments(n) | Node::Params(n) => n.lineno,
            Node::BinOp(n) => n.lineno,
            Node::UnaryOp(n) => n.lineno,
            Node::If(n) => n.lineno,
            Node::Each(n) => n.lineno,
            Node::Literal(n) => n.lineno,
            Node::Unit(n) => n.lineno,
            Node::Boolean(n) => n.lineno,
            Node::Rgba(n) => n.lineno,
            Node::Function(n) => n.lineno,
            Node::Unsupported(n) => n.lineno,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Import {
    /// Path segments; their text is concatenated.
    pub path: Vec<Literal>,
    #[serde(default)]
    pub lineno: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "nodes")]
    pub selectors: Vec<Selector>,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selector {
    /// Literal text and interpolated identifiers.
    pub segments: Vec<Node>,
    #[serde(default)]
    pub lineno: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub lineno: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub segments: Vec<Node>,
    #[serde(rename = "expr")]
    pub value: Expression,
    #[serde(default)]
    pub lineno: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    /// Assigned expression, or a function definition.
    #[serde(rename = "val", default)]
    pub value: Option<Box<Node>>,
    /// `{name}` inside a selector or property name.
    #[serde(rename = "mixin", default)]
    pub interpolated: bool,
    /// `@name`: the value of the nearest property called `name`.
    #[serde(rename = "property", default)]
    pub lookup: bool,
    #[serde(default)]
    pub lineno: usize,
}

impl Ident {
    /// A plain identifier with no value and no markers.
    pub fn new(name: impl Into<String>, lineno: usize) -> Self {
        Self {
            name: name.into(),
            value: None,
            interpolated: false,
            lookup: false,
            lineno,
        }
    }

    /// Whether this identifier is a bare name (no value, no markers).
    pub fn is_plain(&self) -> bool {
        self.value.is_none() && !self.interpolated && !self.lookup
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub nodes: Vec<Node>,
    /// Comma-separated (`a, b`) rather than space-separated (`a b`).
    #[serde(rename = "isList", default)]
    pub is_list: bool,
    /// Written inside parentheses.
    #[serde(default)]
    pub parenthesized: bool,
    #[serde(default)]
    pub lineno: usize,
}

impl Expression {
    pub fn new(nodes: Vec<Node>, lineno: usize) -> Self {
        Self {
            nodes,
            is_list: false,
            parenthesized: false,
            lineno,
        }
    }

    /// The only node of a one-node expression.
    pub fn single(&self) -> Option<&Node> {
        match self.nodes.as_slice() {
            [node] => Some(node),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub name: String,
    pub args: Arguments,
    #[serde(default)]
    pub lineno: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Arguments {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub lineno: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinOp {
    pub op: String,
    pub left: Box<Node>,
    pub right: Box<Node>,
    #[serde(default)]
    pub lineno: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryOp {
    pub op: String,
    #[serde(rename = "expr")]
    pub operand: Box<Node>,
    #[serde(default)]
    pub lineno: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct If {
    pub cond: Box<Node>,
    pub block: Block,
    /// Further `If` nodes (`else if`) or bare `Block`s (`else`).
    #[serde(default)]
    pub elses: Vec<Node>,
    #[serde(default)]
    pub lineno: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Each {
    /// Bound variable name.
    pub val: String,
    #[serde(default)]
    pub key: Option<String>,
    pub expr: Expression,
    pub block: Block,
    #[serde(default)]
    pub lineno: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub val: String,
    /// The quote character of a string literal.
    #[serde(default)]
    pub quote: Option<char>,
    #[serde(default)]
    pub lineno: usize,
}

impl Literal {
    pub fn new(val: impl Into<String>, lineno: usize) -> Self {
        Self {
            val: val.into(),
            quote: None,
            lineno,
        }
    }

    pub fn quoted(val: impl Into<String>, quote: char, lineno: usize) -> Self {
        Self {
            val: val.into(),
            quote: Some(quote),
            lineno,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub val: f64,
    #[serde(rename = "type", default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub lineno: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boolean {
    pub val: bool,
    #[serde(default)]
    pub lineno: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// The color as written, e.g. `#fff`.
    pub raw: String,
    #[serde(default)]
    pub lineno: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub params: Arguments,
    pub block: Block,
    #[serde(default)]
    pub lineno: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unsupported {
    /// What was found, e.g. `@media`.
    pub kind: String,
    #[serde(default)]
    pub lineno: usize,
}
