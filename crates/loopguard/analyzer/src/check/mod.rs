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

//! The infinite loop check
//!
//! Loops are selected syntactically, then each condition variable goes
//! through the type, mutation, scope and escape checks in that order. The
//! first variable that fails a check silences the whole loop.

pub mod condition_vars;
pub mod diagnoser;
pub mod escape;
pub mod loop_selector;
pub mod mutation;
pub mod scope;

use crate::model::ast::{Ast, DeclId, NodeId};
use escape::EscapeKind;
use mutation::MutationKind;

pub use diagnoser::{InfiniteLoopCheck, Suppression};
pub use loop_selector::{LoopCandidate, LoopKind, LoopSelector};

/// How a node may change a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Mutation(MutationKind),
    Escape(EscapeKind),
}

/// Recognizes nodes that may change a variable
pub trait UseMatcher {
    /// Effect of `node` itself on `var`, without looking at descendants
    fn classify(&self, ast: &Ast, node: NodeId, var: DeclId) -> Option<Effect>;

    /// First match in `root`'s subtree, root included, in pre-order
    fn find_in(&self, ast: &Ast, root: NodeId, var: DeclId) -> Option<(NodeId, Effect)> {
        ast.descendants_inclusive(root)
            .find_map(|id| self.classify(ast, id, var).map(|effect| (id, effect)))
    }
}

impl<A: UseMatcher, B: UseMatcher> UseMatcher for (A, B) {
    fn classify(&self, ast: &Ast, node: NodeId, var: DeclId) -> Option<Effect> {
        self.0.classify(ast, node, var).or_else(|| self.1.classify(ast, node, var))
    }
}
