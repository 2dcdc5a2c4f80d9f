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

//! Direct writes to a variable

use super::{Effect, UseMatcher};
use crate::model::ast::{Ast, BinaryOp, DeclId, NodeId, NodeKind, UnaryOp};

/// Operator that writes the variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Increment,
    Decrement,
    Assignment(BinaryOp),
}

/// Matches `++`, `--` and every assignment operator applied to a variable
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationAnalyzer;

impl MutationAnalyzer {
    /// Whether `root`'s subtree writes `var` directly
    pub fn is_mutated_in(&self, ast: &Ast, root: NodeId, var: DeclId) -> bool {
        self.find_in(ast, root, var).is_some()
    }
}

impl UseMatcher for MutationAnalyzer {
    fn classify(&self, ast: &Ast, node: NodeId, var: DeclId) -> Option<Effect> {
        let kind = match ast.kind(node) {
            NodeKind::Unary { op, operand } if op.is_increment_or_decrement() && ast.referenced_decl(*operand) == Some(var) => {
                match op {
                    UnaryOp::PreInc | UnaryOp::PostInc => MutationKind::Increment,
                    _ => MutationKind::Decrement,
                }
            }
            NodeKind::Binary { op, lhs, .. } if op.is_assignment() && ast.referenced_decl(*lhs) == Some(var) => MutationKind::Assignment(*op),
            _ => return None,
        };
        Some(Effect::Mutation(kind))
    }
}
