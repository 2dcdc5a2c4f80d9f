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

//! Lowers front-end syntax trees into the [`Ast`] arena

use super::ast::{Ast, Decl, DeclId, DeclKind, Function, FunctionId, Node, NodeId, NodeKind, Signature, SignatureId, Storage};
use super::syntax::{Expr, ExprKind, Stmt, StmtKind};
use super::types::QualType;
use crate::error::{AstError, AstResult};
use loopguard_common::SourceLocation;

/// Builds one translation unit
///
/// Declarations and signatures are registered first so syntax trees can
/// refer to them by handle. [`AstBuilder::function`] then lowers a body and
/// records the definition.
#[derive(Debug, Default)]
pub struct AstBuilder {
    ast: Ast,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_decl(&mut self, name: &str, ty: QualType, kind: DeclKind, storage: Storage) -> DeclId {
        let id = DeclId::new(self.ast.decls.len());
        self.ast.decls.push(Decl {
            name: name.to_string(),
            ty,
            kind,
            storage,
            location: SourceLocation::unknown(),
            init: None,
            declared_by: None,
        });
        id
    }

    /// Register a block-scope variable, introduced later by a declaration statement
    pub fn local(&mut self, name: &str, ty: QualType) -> DeclId {
        self.add_decl(name, ty, DeclKind::Variable, Storage::Local)
    }

    /// Register a function or lambda parameter
    pub fn parameter(&mut self, name: &str, ty: QualType) -> DeclId {
        self.add_decl(name, ty, DeclKind::Variable, Storage::Parameter)
    }

    /// Register a variable declared at namespace scope
    pub fn global(&mut self, name: &str, ty: QualType) -> DeclId {
        self.add_decl(name, ty, DeclKind::Variable, Storage::Global)
    }

    /// Register an enumerator of an unscoped enum
    pub fn enum_constant(&mut self, name: &str, ty: QualType) -> DeclId {
        self.add_decl(name, ty, DeclKind::EnumConstant, Storage::Global)
    }

    /// Set where a declaration was written
    pub fn locate(&mut self, decl: DeclId, line: usize, column: usize) {
        if let Some(entry) = self.ast.decls.get_mut(decl.index()) {
            entry.location = SourceLocation::new(line, column);
        }
    }

    pub fn signature(&mut self, name: &str, params: impl IntoIterator<Item = QualType>) -> SignatureId {
        self.add_signature(name, params.into_iter().collect(), false)
    }

    pub fn variadic_signature(&mut self, name: &str, params: impl IntoIterator<Item = QualType>) -> SignatureId {
        self.add_signature(name, params.into_iter().collect(), true)
    }

    fn add_signature(&mut self, name: &str, params: Vec<QualType>, variadic: bool) -> SignatureId {
        let id = SignatureId::new(self.ast.signatures.len());
        self.ast.signatures.push(Signature {
            name: name.to_string(),
            params,
            variadic,
        });
        id
    }

    /// Lower `body` and record it as the definition of `name`
    pub fn function(&mut self, name: &str, params: impl IntoIterator<Item = DeclId>, body: Stmt) -> AstResult<FunctionId> {
        let location = body.location;
        let params = self.check_params(params.into_iter().collect())?;
        let body = self.lower_stmt(body)?;
        let id = FunctionId::new(self.ast.functions.len());
        self.ast.functions.push(Function {
            name: name.to_string(),
            params,
            body,
            location,
        });
        Ok(id)
    }

    /// Finish the translation unit
    pub fn finish(self) -> Ast {
        self.ast
    }

    fn check_params(&self, params: Vec<DeclId>) -> AstResult<Vec<DeclId>> {
        for &param in &params {
            let decl = self.decl(param)?;
            if decl.storage != Storage::Parameter {
                return Err(AstError::MisplacedDeclaration(decl.name.clone()));
            }
        }
        Ok(params)
    }

    fn decl(&self, id: DeclId) -> AstResult<&Decl> {
        self.ast.decls.get(id.index()).ok_or(AstError::UnknownDeclaration(id.index()))
    }

    fn push(&mut self, kind: NodeKind, location: SourceLocation) -> NodeId {
        let id = NodeId::new(self.ast.nodes.len());
        self.ast.nodes.push(Node { kind, location });
        self.ast.parents.push(None);
        for child in self.ast.children(id) {
            self.ast.parents[child.index()] = Some(id);
        }
        id
    }

    fn lower_boxed(&mut self, stmt: Option<Box<Stmt>>) -> AstResult<Option<NodeId>> {
        stmt.map(|stmt| self.lower_stmt(*stmt)).transpose()
    }

    fn lower_stmt(&mut self, stmt: Stmt) -> AstResult<NodeId> {
        let location = stmt.location;
        let kind = match stmt.kind {
            StmtKind::Compound(stmts) => {
                let children = stmts.into_iter().map(|s| self.lower_stmt(s)).collect::<AstResult<Vec<_>>>()?;
                NodeKind::Compound(children)
            }
            StmtKind::Decl(decls) => return self.lower_decl_stmt(decls, location),
            StmtKind::Expr(expr) => return self.lower_expr(expr, location),
            StmtKind::If { cond, then_branch, else_branch } => NodeKind::If {
                cond: self.lower_expr(cond, location)?,
                then_branch: self.lower_stmt(*then_branch)?,
                else_branch: self.lower_boxed(else_branch)?,
            },
            StmtKind::While { cond, body } => NodeKind::While {
                cond: self.lower_expr(cond, location)?,
                body: self.lower_stmt(*body)?,
            },
            StmtKind::DoWhile { body, cond } => {
                let body = self.lower_stmt(*body)?;
                NodeKind::DoWhile {
                    body,
                    cond: self.lower_expr(cond, location)?,
                }
            }
            StmtKind::For { init, cond, inc, body } => NodeKind::For {
                init: self.lower_boxed(init)?,
                cond: cond.map(|c| self.lower_expr(c, location)).transpose()?,
                inc: inc.map(|i| self.lower_expr(i, location)).transpose()?,
                body: self.lower_stmt(*body)?,
            },
            StmtKind::Switch { cond, body } => NodeKind::Switch {
                cond: self.lower_expr(cond, location)?,
                body: self.lower_stmt(*body)?,
            },
            StmtKind::Case { value, body } => NodeKind::Case {
                value: self.lower_expr(value, location)?,
                body: self.lower_stmt(*body)?,
            },
            StmtKind::Default(body) => NodeKind::Default { body: self.lower_stmt(*body)? },
            StmtKind::Label { name, body } => NodeKind::Label {
                name,
                body: self.lower_stmt(*body)?,
            },
            StmtKind::Goto(name) => NodeKind::Goto(name),
            StmtKind::Break => NodeKind::Break,
            StmtKind::Continue => NodeKind::Continue,
            StmtKind::Return(value) => NodeKind::Return(value.map(|v| self.lower_expr(v, location)).transpose()?),
            StmtKind::Null => NodeKind::Null,
        };
        Ok(self.push(kind, location))
    }

    fn lower_decl_stmt(&mut self, decls: Vec<(DeclId, Option<Expr>)>, location: SourceLocation) -> AstResult<NodeId> {
        let mut ids = Vec::with_capacity(decls.len());
        for (id, init) in decls {
            let decl = self.decl(id)?;
            if decl.storage != Storage::Local || !decl.is_variable() {
                return Err(AstError::MisplacedDeclaration(decl.name.clone()));
            }
            if decl.declared_by.is_some() || ids.contains(&id) {
                return Err(AstError::DuplicateDeclaration(decl.name.clone()));
            }
            let init = init.map(|e| self.lower_expr(e, location)).transpose()?;
            let entry = &mut self.ast.decls[id.index()];
            entry.init = init;
            if !entry.location.is_valid() {
                entry.location = location;
            }
            ids.push(id);
        }

        let stmt = self.push(NodeKind::DeclStmt(ids.clone()), location);
        for id in ids {
            self.ast.decls[id.index()].declared_by = Some(stmt);
        }
        Ok(stmt)
    }

    fn lower_expr(&mut self, expr: Expr, inherited: SourceLocation) -> AstResult<NodeId> {
        let location = expr.location.unwrap_or(inherited);
        let kind = match expr.kind {
            ExprKind::IntegerLiteral(value) => NodeKind::IntegerLiteral(value),
            ExprKind::DeclRef(decl) => {
                self.decl(decl)?;
                NodeKind::DeclRef(decl)
            }
            ExprKind::Unresolved(name) => NodeKind::Unresolved(name),
            ExprKind::Unary { op, operand } => NodeKind::Unary {
                op,
                operand: self.lower_expr(*operand, location)?,
            },
            ExprKind::Binary { op, lhs, rhs } => NodeKind::Binary {
                op,
                lhs: self.lower_expr(*lhs, location)?,
                rhs: self.lower_expr(*rhs, location)?,
            },
            ExprKind::Conditional { cond, then_expr, else_expr } => NodeKind::Conditional {
                cond: self.lower_expr(*cond, location)?,
                then_expr: self.lower_expr(*then_expr, location)?,
                else_expr: self.lower_expr(*else_expr, location)?,
            },
            ExprKind::Call { callee, args } => {
                if callee.index() >= self.ast.signatures.len() {
                    return Err(AstError::UnknownSignature(callee.index()));
                }
                let args = args.into_iter().map(|a| self.lower_expr(a, location)).collect::<AstResult<Vec<_>>>()?;
                NodeKind::Call { callee, args }
            }
            ExprKind::ImplicitCast(inner) => NodeKind::ImplicitCast(self.lower_expr(*inner, location)?),
            ExprKind::Paren(inner) => NodeKind::Paren(self.lower_expr(*inner, location)?),
            ExprKind::InitList(elements) => {
                let elements = elements.into_iter().map(|e| self.lower_expr(e, location)).collect::<AstResult<Vec<_>>>()?;
                NodeKind::InitList(elements)
            }
            ExprKind::BindTemporary(inner) => NodeKind::BindTemporary(self.lower_expr(*inner, location)?),
            ExprKind::Throw(value) => NodeKind::Throw(value.map(|v| self.lower_expr(*v, location)).transpose()?),
            ExprKind::Lambda { params, body } => {
                let params = self.check_params(params)?;
                NodeKind::Lambda {
                    params,
                    body: self.lower_stmt(*body)?,
                }
            }
        };
        Ok(self.push(kind, location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ast::UnaryOp;

    fn counting_loop() -> (Ast, FunctionId, DeclId) {
        let mut builder = AstBuilder::new();
        let i = builder.local("i", QualType::int());
        let body = Stmt::block([
            Stmt::declare(i, Expr::int(0)).at(2, 3),
            Stmt::while_loop(Expr::lt(Expr::read(i), Expr::int(10)), Stmt::block([Stmt::expr(Expr::post_inc(Expr::var(i)))])).at(3, 3),
        ]);
        let function = builder.function("count", [], body).unwrap();
        (builder.finish(), function, i)
    }

    #[test]
    fn test_lowering_records_declaration_site() {
        let (ast, function, i) = counting_loop();
        let body = ast.function(function).body;
        let decl = ast.decl(i);
        let stmt = decl.declared_by.expect("declared by a statement");

        assert!(matches!(ast.kind(stmt), NodeKind::DeclStmt(ids) if ids == &vec![i]));
        assert!(ast.is_descendant_of(stmt, body));
        assert_eq!(decl.location, SourceLocation::new(2, 3));
        assert!(matches!(ast.kind(decl.init.unwrap()), NodeKind::IntegerLiteral(0)));
    }

    #[test]
    fn test_parent_links_and_descendants() {
        let (ast, function, i) = counting_loop();
        let body = ast.function(function).body;

        let loop_stmt = ast.descendants(body).find(|&id| ast.kind(id).is_loop()).unwrap();
        assert_eq!(ast.parent(loop_stmt), Some(body));
        assert_eq!(ast.location(loop_stmt), SourceLocation::new(3, 3));

        let increments: Vec<_> = ast
            .find_all(loop_stmt, |ast, id| matches!(ast.kind(id), NodeKind::Unary { op: UnaryOp::PostInc, .. }))
            .collect();
        assert_eq!(increments.len(), 1);
        assert_eq!(ast.referenced_decl(increments[0]), None);

        let refs: Vec<_> = ast.find_all(loop_stmt, |ast, id| matches!(ast.kind(id), NodeKind::DeclRef(d) if *d == i)).collect();
        assert_eq!(refs.len(), 2);
        assert!(refs.iter().all(|&r| ast.ancestors(r).any(|a| a == body)));
    }

    #[test]
    fn test_descendants_are_pre_order() {
        let (ast, function, _) = counting_loop();
        let body = ast.function(function).body;
        let order: Vec<_> = ast.descendants_inclusive(body).collect();
        assert_eq!(order[0], body);
        assert!(matches!(ast.kind(order[1]), NodeKind::DeclStmt(_)));
        assert!(matches!(ast.kind(order[2]), NodeKind::IntegerLiteral(0)));
        assert!(ast.kind(order[3]).is_loop());
        assert!(!ast.descendants(body).any(|id| id == body));
    }

    #[test]
    fn test_strip_paren_and_casts() {
        let mut builder = AstBuilder::new();
        let x = builder.local("x", QualType::int());
        let body = Stmt::block([Stmt::decl([(x, None)]), Stmt::expr(Expr::paren(Expr::read(x)))]);
        let function = builder.function("f", [], body).unwrap();
        let ast = builder.finish();

        let stmt = ast.children(ast.function(function).body)[1];
        assert!(matches!(ast.kind(stmt), NodeKind::Paren(_)));
        assert_eq!(ast.referenced_decl(stmt), Some(x));
    }

    #[test]
    fn test_duplicate_declaration_rejected() {
        let mut builder = AstBuilder::new();
        let x = builder.local("x", QualType::int());
        let body = Stmt::block([Stmt::decl([(x, None)]), Stmt::decl([(x, None)])]);
        assert!(matches!(builder.function("f", [], body), Err(AstError::DuplicateDeclaration(name)) if name == "x"));
    }

    #[test]
    fn test_misplaced_declarations_rejected() {
        let mut builder = AstBuilder::new();
        let glob = builder.global("glob", QualType::int());
        let local = builder.local("local", QualType::int());

        let result = builder.function("f", [], Stmt::decl([(glob, None)]));
        assert!(matches!(result, Err(AstError::MisplacedDeclaration(_))));

        let result = builder.function("g", [local], Stmt::block([]));
        assert!(matches!(result, Err(AstError::MisplacedDeclaration(_))));
    }

    #[test]
    fn test_expression_location_inherits_statement() {
        let mut builder = AstBuilder::new();
        let x = builder.local("x", QualType::int());
        let body = Stmt::block([Stmt::decl([(x, Some(Expr::int(1).at(9, 12)))]).at(9, 3), Stmt::expr(Expr::pre_inc(Expr::var(x))).at(10, 3)]);
        let function = builder.function("f", [], body).unwrap();
        let ast = builder.finish();

        assert_eq!(ast.location(ast.decl(x).init.unwrap()), SourceLocation::new(9, 12));
        let inc = ast.children(ast.function(function).body)[1];
        assert_eq!(ast.location(ast.children(inc)[0]), SourceLocation::new(10, 3));
    }
}
