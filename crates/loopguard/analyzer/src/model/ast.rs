// Loopguard
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Arena-backed abstract syntax tree
//!
//! Every node, declaration, signature and function lives in one [`Ast`] and is
//! addressed by a small copyable handle. Handles are compared by value, so two
//! variables that share a name (shadowing) never compare equal. The arena is
//! read-only once built; all analyzers borrow it.
//!
//! ## Traversal
//!
//! The tree answers the structural queries the check is written in terms of:
//! - [`Ast::children`] in source order
//! - [`Ast::descendants`] pre-order, crossing into lambda bodies
//! - [`Ast::ancestors`] up to the root
//! - [`Ast::find_all`] for predicate search restricted to a subtree

use super::types::QualType;
use loopguard_common::SourceLocation;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn new(index: usize) -> Self {
                Self(index as u32)
            }

            /// Position in the owning arena
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

handle!(
    /// Handle to a statement or expression node
    NodeId
);
handle!(
    /// Handle to a declaration
    DeclId
);
handle!(
    /// Handle to a callee signature
    SignatureId
);
handle!(
    /// Handle to a function definition
    FunctionId
);

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    PreInc,
    PostInc,
    PreDec,
    PostDec,
    AddrOf,
    Deref,
    Minus,
    Not,
    LogicalNot,
}

impl UnaryOp {
    pub fn is_increment_or_decrement(self) -> bool {
        matches!(self, UnaryOp::PreInc | UnaryOp::PostInc | UnaryOp::PreDec | UnaryOp::PostDec)
    }
}

/// Binary operators, including simple and compound assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitOr,
    BitXor,
    LogicalAnd,
    LogicalOr,
    Comma,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
}

impl BinaryOp {
    /// `=` and every compound assignment
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            BinaryOp::Assign
                | BinaryOp::AddAssign
                | BinaryOp::SubAssign
                | BinaryOp::MulAssign
                | BinaryOp::DivAssign
                | BinaryOp::RemAssign
                | BinaryOp::AndAssign
                | BinaryOp::OrAssign
                | BinaryOp::XorAssign
                | BinaryOp::ShlAssign
                | BinaryOp::ShrAssign
        )
    }

    pub fn spelling(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::Comma => ",",
            BinaryOp::Assign => "=",
            BinaryOp::AddAssign => "+=",
            BinaryOp::SubAssign => "-=",
            BinaryOp::MulAssign => "*=",
            BinaryOp::DivAssign => "/=",
            BinaryOp::RemAssign => "%=",
            BinaryOp::AndAssign => "&=",
            BinaryOp::OrAssign => "|=",
            BinaryOp::XorAssign => "^=",
            BinaryOp::ShlAssign => "<<=",
            BinaryOp::ShrAssign => ">>=",
        }
    }
}

/// Kind tag and child handles of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Compound(Vec<NodeId>),
    DeclStmt(Vec<DeclId>),
    If { cond: NodeId, then_branch: NodeId, else_branch: Option<NodeId> },
    While { cond: NodeId, body: NodeId },
    DoWhile { body: NodeId, cond: NodeId },
    For { init: Option<NodeId>, cond: Option<NodeId>, inc: Option<NodeId>, body: NodeId },
    Switch { cond: NodeId, body: NodeId },
    Case { value: NodeId, body: NodeId },
    Default { body: NodeId },
    Label { name: String, body: NodeId },
    Goto(String),
    Break,
    Continue,
    Return(Option<NodeId>),
    Null,
    IntegerLiteral(i64),
    DeclRef(DeclId),
    Unresolved(String),
    Unary { op: UnaryOp, operand: NodeId },
    Binary { op: BinaryOp, lhs: NodeId, rhs: NodeId },
    Conditional { cond: NodeId, then_expr: NodeId, else_expr: NodeId },
    Call { callee: SignatureId, args: Vec<NodeId> },
    ImplicitCast(NodeId),
    Paren(NodeId),
    InitList(Vec<NodeId>),
    BindTemporary(NodeId),
    Throw(Option<NodeId>),
    Lambda { params: Vec<DeclId>, body: NodeId },
}

impl NodeKind {
    pub fn is_loop(&self) -> bool {
        matches!(self, NodeKind::While { .. } | NodeKind::DoWhile { .. } | NodeKind::For { .. })
    }

    /// Statements that leave the enclosing loop independently of its condition
    pub fn is_loop_exit(&self) -> bool {
        matches!(self, NodeKind::Break | NodeKind::Return(_) | NodeKind::Goto(_) | NodeKind::Throw(_))
    }
}

/// A node in the arena
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub location: SourceLocation,
}

/// Where a declaration lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
    Local,
    Parameter,
    Global,
}

/// What a declaration names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Variable,
    EnumConstant,
}

/// A named declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub name: String,
    pub ty: QualType,
    pub kind: DeclKind,
    pub storage: Storage,
    pub location: SourceLocation,
    /// Initializer expression, if any
    pub init: Option<NodeId>,
    /// Declaration statement that introduced it
    pub declared_by: Option<NodeId>,
}

impl Decl {
    pub fn is_variable(&self) -> bool {
        self.kind == DeclKind::Variable
    }
}

/// Callee signature, arguments pair with parameters by position
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub name: String,
    pub params: Vec<QualType>,
    pub variadic: bool,
}

impl Signature {
    /// Type of the parameter bound to argument `position`
    pub fn param(&self, position: usize) -> Option<&QualType> {
        self.params.get(position)
    }
}

/// A function definition
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<DeclId>,
    pub body: NodeId,
    pub location: SourceLocation,
}

/// The abstract syntax tree of one translation unit
#[derive(Debug, Clone, Default)]
pub struct Ast {
    pub(crate) nodes: Vec<Node>,
    pub(crate) parents: Vec<Option<NodeId>>,
    pub(crate) decls: Vec<Decl>,
    pub(crate) signatures: Vec<Signature>,
    pub(crate) functions: Vec<Function>,
}

impl Ast {
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn location(&self, id: NodeId) -> SourceLocation {
        self.node(id).location
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    pub fn signature(&self, id: SignatureId) -> &Signature {
        &self.signatures[id.index()]
    }

    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.index()]
    }

    pub fn function_ids(&self) -> impl Iterator<Item = FunctionId> {
        (0..self.functions.len()).map(FunctionId::new)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents[id.index()]
    }

    /// Direct children in source order
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.kind(id) {
            NodeKind::Compound(stmts) => stmts.clone(),
            NodeKind::DeclStmt(decls) => decls.iter().filter_map(|&d| self.decl(d).init).collect(),
            NodeKind::If { cond, then_branch, else_branch } => {
                let mut children = vec![*cond, *then_branch];
                children.extend(*else_branch);
                children
            }
            NodeKind::While { cond, body } => vec![*cond, *body],
            NodeKind::DoWhile { body, cond } => vec![*body, *cond],
            NodeKind::For { init, cond, inc, body } => init.iter().chain(cond).chain(inc).copied().chain(std::iter::once(*body)).collect(),
            NodeKind::Switch { cond, body } => vec![*cond, *body],
            NodeKind::Case { value, body } => vec![*value, *body],
            NodeKind::Default { body } | NodeKind::Label { body, .. } => vec![*body],
            NodeKind::Return(value) | NodeKind::Throw(value) => value.iter().copied().collect(),
            NodeKind::Unary { operand, .. } => vec![*operand],
            NodeKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            NodeKind::Conditional { cond, then_expr, else_expr } => vec![*cond, *then_expr, *else_expr],
            NodeKind::Call { args, .. } => args.clone(),
            NodeKind::ImplicitCast(inner) | NodeKind::Paren(inner) | NodeKind::BindTemporary(inner) => vec![*inner],
            NodeKind::InitList(elements) => elements.clone(),
            NodeKind::Lambda { body, .. } => vec![*body],
            NodeKind::Goto(_)
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Null
            | NodeKind::IntegerLiteral(_)
            | NodeKind::DeclRef(_)
            | NodeKind::Unresolved(_) => Vec::new(),
        }
    }

    /// Pre-order walk of `root` and everything below it
    pub fn descendants_inclusive(&self, root: NodeId) -> Descendants<'_> {
        Descendants { ast: self, stack: vec![root] }
    }

    /// Pre-order walk below `root`, excluding it
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        let mut stack = self.children(root);
        stack.reverse();
        Descendants { ast: self, stack }
    }

    /// Parents of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Whether `id` lies strictly below `root`
    pub fn is_descendant_of(&self, id: NodeId, root: NodeId) -> bool {
        self.ancestors(id).any(|ancestor| ancestor == root)
    }

    /// Nodes in `root`'s subtree (root included) satisfying `predicate`
    pub fn find_all<'a, P>(&'a self, root: NodeId, mut predicate: P) -> impl Iterator<Item = NodeId> + 'a
    where
        P: FnMut(&'a Ast, NodeId) -> bool + 'a,
    {
        self.descendants_inclusive(root).filter(move |&id| predicate(self, id))
    }

    /// Strip parentheses and implicit conversions
    pub fn ignore_paren_imp_casts(&self, mut id: NodeId) -> NodeId {
        while let NodeKind::ImplicitCast(inner) | NodeKind::Paren(inner) = self.kind(id) {
            id = *inner;
        }
        id
    }

    /// Declaration referenced by `id` once parentheses and conversions are stripped
    pub fn referenced_decl(&self, id: NodeId) -> Option<DeclId> {
        match self.kind(self.ignore_paren_imp_casts(id)) {
            NodeKind::DeclRef(decl) => Some(*decl),
            _ => None,
        }
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    ast: &'a Ast,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let children = self.ast.children(id);
        self.stack.extend(children.into_iter().rev());
        Some(id)
    }
}
