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

//! Where a condition variable was declared, relative to the analyzed body

use crate::model::ast::{Ast, DeclId, NodeId, Storage};

/// Origin of a variable as seen from a function or lambda body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Declared by a statement inside the body
    Local,
    Parameter,
    Global,
    /// Local of an enclosing function, captured by a lambda
    Enclosing,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeValidator;

impl ScopeValidator {
    pub fn provenance(&self, ast: &Ast, var: DeclId, context: NodeId) -> Provenance {
        let decl = ast.decl(var);
        match decl.storage {
            Storage::Parameter => Provenance::Parameter,
            Storage::Global => Provenance::Global,
            Storage::Local => match decl.declared_by {
                Some(stmt) if ast.is_descendant_of(stmt, context) => Provenance::Local,
                _ => Provenance::Enclosing,
            },
        }
    }

    /// Whether `var` is declared inside `context`
    pub fn is_local(&self, ast: &Ast, var: DeclId, context: NodeId) -> bool {
        self.provenance(ast, var, context) == Provenance::Local
    }
}
