//! The expression-tree slice the builtin compiler operates on.
//!
//! Nodes are built by the parser and owned by the surrounding expression
//! tree; this crate only reads them and fills in their annotation slot.

use std::fmt;

use crate::abi::Reg;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Semantic type of a computed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Str,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Int => write!(f, "int"),
            ValueType::Str => write!(f, "string"),
        }
    }
}

/// Where a computed value lives after code generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loc {
    Reg(Reg),
    /// Byte offset from the frame base register (negative, grows down).
    Stack(i16),
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loc::Reg(reg) => write!(f, "{reg}"),
            Loc::Stack(off) => write!(f, "stack[{off}]"),
        }
    }
}

/// Per-node record written by the annotate pass and extended by codegen.
///
/// `loc` stays unset until the node's generator has run; each field is
/// written by exactly one pass and never reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annot {
    pub ty: ValueType,
    /// Byte width for `Int`, declared capacity for `Str`.
    pub size: u16,
    pub loc: Option<Loc>,
}

impl Annot {
    pub fn new(ty: ValueType, size: u16) -> Self {
        Self {
            ty,
            size,
            loc: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// Builtin call, e.g. `pid()` or `trace("opened %s", path)`.
    Call { name: String, args: Vec<Expr> },
    /// String literal; its length is known at compile time.
    Str(String),
    /// Integer literal.
    Int(i64),
}

/// One node of the expression tree handed over by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub annot: Option<Annot>,
}

impl Expr {
    pub fn call(name: impl Into<String>, args: Vec<Expr>, span: Span) -> Self {
        Self {
            kind: ExprKind::Call {
                name: name.into(),
                args,
            },
            span,
            annot: None,
        }
    }

    pub fn str_lit(value: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ExprKind::Str(value.into()),
            span,
            annot: None,
        }
    }

    pub fn int_lit(value: i64, span: Span) -> Self {
        Self {
            kind: ExprKind::Int(value),
            span,
            annot: None,
        }
    }

    /// Annotation attached by the annotate pass.
    ///
    /// Panics if the node was never annotated; reaching codegen with an
    /// unannotated node is a pass-ordering bug in the caller, not a
    /// recoverable condition.
    pub fn annot(&self) -> &Annot {
        self.annot.as_ref().expect("node annotated before codegen")
    }

    pub fn annot_mut(&mut self) -> &mut Annot {
        self.annot.as_mut().expect("node annotated before codegen")
    }
}
