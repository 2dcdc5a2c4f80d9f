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

//! Selection of candidate loops

use crate::model::ast::{Ast, FunctionId, NodeId, NodeKind};

/// Syntactic kind of a loop statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopKind {
    While,
    DoWhile,
    For,
}

/// A loop eligible for condition-variable analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopCandidate {
    pub stmt: NodeId,
    pub kind: LoopKind,
    pub cond: NodeId,
    pub body: NodeId,
    /// Increment clause of a `for` loop
    pub inc: Option<NodeId>,
    /// Body of the nearest enclosing lambda, else of the function
    pub context: NodeId,
}

impl LoopCandidate {
    /// Regions searched for changes to a condition variable, in order
    pub fn change_regions(&self) -> Vec<NodeId> {
        match self.kind {
            LoopKind::While | LoopKind::DoWhile => vec![self.stmt],
            LoopKind::For => self.inc.into_iter().chain(std::iter::once(self.body)).collect(),
        }
    }
}

/// Finds candidate loops in function bodies
#[derive(Debug, Clone, Copy)]
pub struct LoopSelector<'a> {
    ast: &'a Ast,
}

impl<'a> LoopSelector<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        Self { ast }
    }

    /// Candidate loops of `function` in pre-order, lambda bodies included
    pub fn candidates(&self, function: FunctionId) -> impl Iterator<Item = LoopCandidate> + 'a {
        let ast = self.ast;
        let root = ast.function(function).body;
        let selector = *self;
        ast.descendants(root).filter_map(move |id| selector.candidate(id, root))
    }

    /// `stmt` as a candidate inside the function body `root`
    pub fn candidate(&self, stmt: NodeId, root: NodeId) -> Option<LoopCandidate> {
        let (kind, cond, body, inc) = match self.ast.kind(stmt) {
            NodeKind::While { cond, body } => (LoopKind::While, *cond, *body, None),
            NodeKind::DoWhile { body, cond } => (LoopKind::DoWhile, *cond, *body, None),
            NodeKind::For { cond: Some(cond), inc, body, .. } => (LoopKind::For, *cond, *body, *inc),
            _ => return None,
        };
        if self.has_explicit_exit(body) {
            return None;
        }
        let context = self.context_of(stmt, root)?;
        Some(LoopCandidate {
            stmt,
            kind,
            cond,
            body,
            inc,
            context,
        })
    }

    /// Whether `body` contains a statement leaving the loop regardless of its condition
    pub fn has_explicit_exit(&self, body: NodeId) -> bool {
        self.ast.descendants_inclusive(body).any(|id| self.ast.kind(id).is_loop_exit())
    }

    fn context_of(&self, stmt: NodeId, root: NodeId) -> Option<NodeId> {
        for ancestor in self.ast.ancestors(stmt) {
            if let NodeKind::Lambda { body, .. } = self.ast.kind(ancestor) {
                return Some(*body);
            }
            if ancestor == root {
                return Some(root);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::builder::AstBuilder;
    use crate::model::syntax::{Expr, Stmt};
    use crate::model::types::QualType;

    fn select(builder: AstBuilder, body: Stmt) -> (Ast, Vec<LoopCandidate>, NodeId) {
        let mut builder = builder;
        let function = builder.function("f", [], body).unwrap();
        let ast = builder.finish();
        let candidates = LoopSelector::new(&ast).candidates(function).collect();
        let root = ast.function(function).body;
        (ast, candidates, root)
    }

    #[test]
    fn test_selects_all_loop_kinds() {
        let mut builder = AstBuilder::new();
        let i = builder.local("i", QualType::int());
        let cond = || Expr::lt(Expr::read(i), Expr::int(10));
        let body = Stmt::block([
            Stmt::declare(i, Expr::int(0)),
            Stmt::while_loop(cond(), Stmt::block([])),
            Stmt::do_while(Stmt::block([]), cond()),
            Stmt::for_loop(None, Some(cond()), Some(Expr::pre_inc(Expr::var(i))), Stmt::block([])),
        ]);
        let (ast, candidates, root) = select(builder, body);

        let kinds: Vec<LoopKind> = candidates.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![LoopKind::While, LoopKind::DoWhile, LoopKind::For]);
        assert!(candidates.iter().all(|c| c.context == root));
        assert_eq!(candidates[2].change_regions(), vec![candidates[2].inc.unwrap(), candidates[2].body]);
        assert_eq!(candidates[0].change_regions(), vec![candidates[0].stmt]);
        assert!(matches!(ast.kind(candidates[1].cond), NodeKind::Binary { .. }));
    }

    #[test]
    fn test_for_without_condition_is_skipped() {
        let builder = AstBuilder::new();
        let body = Stmt::block([Stmt::for_loop(None, None, None, Stmt::block([]))]);
        let (_, candidates, _) = select(builder, body);
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_explicit_exits_disqualify() {
        let mut builder = AstBuilder::new();
        let i = builder.local("i", QualType::int());
        let cond = || Expr::lt(Expr::read(i), Expr::int(10));
        let body = Stmt::block([
            Stmt::declare(i, Expr::int(0)),
            Stmt::while_loop(cond(), Stmt::block([Stmt::if_then(Expr::read(i), Stmt::break_stmt())])),
            Stmt::while_loop(cond(), Stmt::block([Stmt::return_stmt(None)])),
            Stmt::while_loop(cond(), Stmt::block([Stmt::expr(Expr::throw(None))])),
            Stmt::label("out", Stmt::while_loop(cond(), Stmt::goto("out"))),
            Stmt::while_loop(cond(), Stmt::block([Stmt::continue_stmt()])),
        ]);
        let (ast, candidates, _) = select(builder, body);

        assert_eq!(candidates.len(), 1);
        let body = candidates[0].body;
        assert!(ast.descendants(body).any(|id| matches!(ast.kind(id), NodeKind::Continue)));
    }

    #[test]
    fn test_nearest_lambda_is_the_context() {
        let mut builder = AstBuilder::new();
        let i = builder.local("i", QualType::int());
        let lambda_body = Stmt::block([Stmt::declare(i, Expr::int(0)), Stmt::while_loop(Expr::read(i), Stmt::block([]))]);
        let body = Stmt::block([Stmt::expr(Expr::lambda([], lambda_body))]);
        let (ast, candidates, root) = select(builder, body);

        assert_eq!(candidates.len(), 1);
        let context = candidates[0].context;
        assert_ne!(context, root);
        assert!(matches!(ast.kind(ast.parent(context).unwrap()), NodeKind::Lambda { .. }));
    }
}
