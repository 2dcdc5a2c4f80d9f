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

//! Owned syntax tree handed over by the front-end
//!
//! The front-end describes each function body with [`Stmt`] and [`Expr`]
//! values. Declarations and call signatures are registered up front with the
//! [`AstBuilder`](super::builder::AstBuilder), so the tree only carries their
//! handles. Lowering turns the tree into the arena-backed [`Ast`](super::ast::Ast).

use super::ast::{BinaryOp, DeclId, SignatureId, UnaryOp};
use loopguard_common::SourceLocation;

/// A statement together with its starting location
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Compound(Vec<Stmt>),
    /// One or more declarations, each with an optional initializer
    Decl(Vec<(DeclId, Option<Expr>)>),
    Expr(Expr),
    If { cond: Expr, then_branch: Box<Stmt>, else_branch: Option<Box<Stmt>> },
    While { cond: Expr, body: Box<Stmt> },
    DoWhile { body: Box<Stmt>, cond: Expr },
    For { init: Option<Box<Stmt>>, cond: Option<Expr>, inc: Option<Expr>, body: Box<Stmt> },
    Switch { cond: Expr, body: Box<Stmt> },
    Case { value: Expr, body: Box<Stmt> },
    Default(Box<Stmt>),
    Label { name: String, body: Box<Stmt> },
    Goto(String),
    Break,
    Continue,
    Return(Option<Expr>),
    Null,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Self { kind, location: SourceLocation::unknown() }
    }

    /// Attach a source location
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.location = SourceLocation::new(line, column);
        self
    }

    pub fn block(stmts: impl IntoIterator<Item = Stmt>) -> Self {
        Self::new(StmtKind::Compound(stmts.into_iter().collect()))
    }

    pub fn decl(decls: impl IntoIterator<Item = (DeclId, Option<Expr>)>) -> Self {
        Self::new(StmtKind::Decl(decls.into_iter().collect()))
    }

    /// Declaration of a single variable initialized with `init`
    pub fn declare(decl: DeclId, init: Expr) -> Self {
        Self::decl([(decl, Some(init))])
    }

    pub fn expr(expr: Expr) -> Self {
        Self::new(StmtKind::Expr(expr))
    }

    pub fn if_then(cond: Expr, then_branch: Stmt) -> Self {
        Self::new(StmtKind::If { cond, then_branch: Box::new(then_branch), else_branch: None })
    }

    pub fn if_else(cond: Expr, then_branch: Stmt, else_branch: Stmt) -> Self {
        Self::new(StmtKind::If {
            cond,
            then_branch: Box::new(then_branch),
            else_branch: Some(Box::new(else_branch)),
        })
    }

    pub fn while_loop(cond: Expr, body: Stmt) -> Self {
        Self::new(StmtKind::While { cond, body: Box::new(body) })
    }

    pub fn do_while(body: Stmt, cond: Expr) -> Self {
        Self::new(StmtKind::DoWhile { body: Box::new(body), cond })
    }

    pub fn for_loop(init: Option<Stmt>, cond: Option<Expr>, inc: Option<Expr>, body: Stmt) -> Self {
        Self::new(StmtKind::For {
            init: init.map(Box::new),
            cond,
            inc,
            body: Box::new(body),
        })
    }

    pub fn switch(cond: Expr, body: Stmt) -> Self {
        Self::new(StmtKind::Switch { cond, body: Box::new(body) })
    }

    pub fn case(value: Expr, body: Stmt) -> Self {
        Self::new(StmtKind::Case { value, body: Box::new(body) })
    }

    pub fn default_case(body: Stmt) -> Self {
        Self::new(StmtKind::Default(Box::new(body)))
    }

    pub fn label(name: &str, body: Stmt) -> Self {
        Self::new(StmtKind::Label { name: name.to_string(), body: Box::new(body) })
    }

    pub fn goto(name: &str) -> Self {
        Self::new(StmtKind::Goto(name.to_string()))
    }

    pub fn break_stmt() -> Self {
        Self::new(StmtKind::Break)
    }

    pub fn continue_stmt() -> Self {
        Self::new(StmtKind::Continue)
    }

    pub fn return_stmt(value: Option<Expr>) -> Self {
        Self::new(StmtKind::Return(value))
    }

    pub fn null() -> Self {
        Self::new(StmtKind::Null)
    }
}

/// An expression, located at its statement unless given a location
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntegerLiteral(i64),
    DeclRef(DeclId),
    /// Name the front-end could not bind to a declaration
    Unresolved(String),
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr> },
    Conditional { cond: Box<Expr>, then_expr: Box<Expr>, else_expr: Box<Expr> },
    Call { callee: SignatureId, args: Vec<Expr> },
    ImplicitCast(Box<Expr>),
    Paren(Box<Expr>),
    InitList(Vec<Expr>),
    /// Temporary object whose destructor runs at the end of the full expression
    BindTemporary(Box<Expr>),
    Throw(Option<Box<Expr>>),
    Lambda { params: Vec<DeclId>, body: Box<Stmt> },
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self { kind, location: None }
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.location = Some(SourceLocation::new(line, column));
        self
    }

    pub fn int(value: i64) -> Self {
        Self::new(ExprKind::IntegerLiteral(value))
    }

    /// Reference to a declaration used as an lvalue
    pub fn var(decl: DeclId) -> Self {
        Self::new(ExprKind::DeclRef(decl))
    }

    /// Reference read through an implicit lvalue-to-rvalue conversion
    pub fn read(decl: DeclId) -> Self {
        Self::implicit_cast(Self::var(decl))
    }

    pub fn unresolved(name: &str) -> Self {
        Self::new(ExprKind::Unresolved(name.to_string()))
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Self::new(ExprKind::Unary { op, operand: Box::new(operand) })
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Self::new(ExprKind::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) })
    }

    pub fn assign(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Assign, lhs, rhs)
    }

    pub fn lt(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Lt, lhs, rhs)
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Add, lhs, rhs)
    }

    pub fn pre_inc(operand: Expr) -> Self {
        Self::unary(UnaryOp::PreInc, operand)
    }

    pub fn post_inc(operand: Expr) -> Self {
        Self::unary(UnaryOp::PostInc, operand)
    }

    pub fn pre_dec(operand: Expr) -> Self {
        Self::unary(UnaryOp::PreDec, operand)
    }

    pub fn post_dec(operand: Expr) -> Self {
        Self::unary(UnaryOp::PostDec, operand)
    }

    pub fn addr_of(operand: Expr) -> Self {
        Self::unary(UnaryOp::AddrOf, operand)
    }

    pub fn deref(operand: Expr) -> Self {
        Self::unary(UnaryOp::Deref, operand)
    }

    pub fn conditional(cond: Expr, then_expr: Expr, else_expr: Expr) -> Self {
        Self::new(ExprKind::Conditional {
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    pub fn call(callee: SignatureId, args: impl IntoIterator<Item = Expr>) -> Self {
        Self::new(ExprKind::Call { callee, args: args.into_iter().collect() })
    }

    pub fn implicit_cast(inner: Expr) -> Self {
        Self::new(ExprKind::ImplicitCast(Box::new(inner)))
    }

    pub fn paren(inner: Expr) -> Self {
        Self::new(ExprKind::Paren(Box::new(inner)))
    }

    pub fn init_list(elements: impl IntoIterator<Item = Expr>) -> Self {
        Self::new(ExprKind::InitList(elements.into_iter().collect()))
    }

    pub fn temporary(inner: Expr) -> Self {
        Self::new(ExprKind::BindTemporary(Box::new(inner)))
    }

    pub fn throw(value: Option<Expr>) -> Self {
        Self::new(ExprKind::Throw(value.map(Box::new)))
    }

    pub fn lambda(params: impl IntoIterator<Item = DeclId>, body: Stmt) -> Self {
        Self::new(ExprKind::Lambda {
            params: params.into_iter().collect(),
            body: Box::new(body),
        })
    }
}
