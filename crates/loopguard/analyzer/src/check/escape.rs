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

//! Ways a variable can become reachable through an alias
//!
//! An escape is one of:
//! - `&v`
//! - `v` passed where the callee takes a non-const reference
//! - a reference declared with `v`, or `{.., v, ..}`, as initializer
//!
//! Parentheses and implicit conversions around `v` are ignored in all three.

use super::{Effect, UseMatcher};
use crate::model::ast::{Ast, DeclId, NodeId, NodeKind, UnaryOp};

/// Which pattern exposed the variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeKind {
    AddressOf,
    /// Argument at `position` bound to a non-const reference parameter
    ByReferenceArgument { position: usize },
    /// Reference declaration bound to the variable
    ReferenceBinding(DeclId),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EscapeAnalyzer;

impl EscapeAnalyzer {
    /// Every escape of `var` in `root`'s subtree, in pre-order
    pub fn escapes_in<'a>(&self, ast: &'a Ast, root: NodeId, var: DeclId) -> impl Iterator<Item = (NodeId, EscapeKind)> + 'a {
        let analyzer = *self;
        ast.descendants_inclusive(root).filter_map(move |id| analyzer.escape_at(ast, id, var).map(|kind| (id, kind)))
    }

    /// Escape performed by `node` itself
    pub fn escape_at(&self, ast: &Ast, node: NodeId, var: DeclId) -> Option<EscapeKind> {
        let refers = |id: NodeId| ast.referenced_decl(id) == Some(var);
        match ast.kind(node) {
            NodeKind::Unary { op: UnaryOp::AddrOf, operand } if refers(*operand) => Some(EscapeKind::AddressOf),
            NodeKind::Call { callee, args } => {
                let signature = ast.signature(*callee);
                args.iter()
                    .enumerate()
                    .find(|&(position, &arg)| refers(arg) && signature.param(position).is_some_and(|ty| ty.is_non_const_reference()))
                    .map(|(position, _)| EscapeKind::ByReferenceArgument { position })
            }
            NodeKind::DeclStmt(decls) => decls
                .iter()
                .copied()
                .find(|&decl| {
                    let decl = ast.decl(decl);
                    decl.ty.is_reference() && decl.init.is_some_and(|init| self.binds(ast, init, var))
                })
                .map(EscapeKind::ReferenceBinding),
            _ => None,
        }
    }

    /// Initializer `init` is `var` or a brace list holding it directly
    fn binds(&self, ast: &Ast, init: NodeId, var: DeclId) -> bool {
        if ast.referenced_decl(init) == Some(var) {
            return true;
        }
        match ast.kind(ast.ignore_paren_imp_casts(init)) {
            NodeKind::InitList(elements) => elements.iter().any(|&e| ast.referenced_decl(e) == Some(var)),
            _ => false,
        }
    }
}

impl UseMatcher for EscapeAnalyzer {
    fn classify(&self, ast: &Ast, node: NodeId, var: DeclId) -> Option<Effect> {
        self.escape_at(ast, node, var).map(Effect::Escape)
    }
}
