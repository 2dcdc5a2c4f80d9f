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

//! Extraction of the variables a loop condition reads

use crate::model::ast::{Ast, DeclId, NodeId, NodeKind};

/// Collects the distinct variables referenced by a condition
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableExtractor;

impl VariableExtractor {
    /// Variables referenced in `cond`, in order of first appearance
    ///
    /// Enumerators and unresolved names are not variables and are left out.
    pub fn extract(&self, ast: &Ast, cond: NodeId) -> Vec<DeclId> {
        let mut variables: Vec<DeclId> = Vec::new();
        for id in ast.descendants_inclusive(cond) {
            if let NodeKind::DeclRef(decl) = ast.kind(id) {
                if ast.decl(*decl).is_variable() && !variables.contains(decl) {
                    variables.push(*decl);
                }
            }
        }
        variables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::builder::AstBuilder;
    use crate::model::syntax::{Expr, Stmt};
    use crate::model::types::QualType;

    fn condition_of(builder: AstBuilder, decls: Vec<DeclId>, cond: Expr) -> (Ast, NodeId) {
        let mut builder = builder;
        let mut stmts: Vec<Stmt> = decls.into_iter().map(|d| Stmt::decl([(d, None)])).collect();
        stmts.push(Stmt::while_loop(cond, Stmt::block([])));
        let function = builder.function("f", [], Stmt::block(stmts)).unwrap();
        let ast = builder.finish();
        let body = ast.function(function).body;
        let cond = ast
            .descendants(body)
            .find_map(|id| match ast.kind(id) {
                NodeKind::While { cond, .. } => Some(*cond),
                _ => None,
            })
            .unwrap();
        (ast, cond)
    }

    #[test]
    fn test_first_appearance_order_without_duplicates() {
        let mut builder = AstBuilder::new();
        let i = builder.local("i", QualType::int());
        let limit = builder.local("Limit", QualType::int());
        let cond = Expr::binary(
            crate::model::ast::BinaryOp::LogicalAnd,
            Expr::lt(Expr::read(i), Expr::read(limit)),
            Expr::lt(Expr::read(limit), Expr::add(Expr::read(i), Expr::int(1))),
        );
        let (ast, cond) = condition_of(builder, vec![i, limit], cond);
        assert_eq!(VariableExtractor.extract(&ast, cond), vec![i, limit]);
    }

    #[test]
    fn test_constant_condition_has_no_variables() {
        let builder = AstBuilder::new();
        let (ast, cond) = condition_of(builder, vec![], Expr::int(1));
        assert!(VariableExtractor.extract(&ast, cond).is_empty());
    }

    #[test]
    fn test_enumerators_and_unresolved_names_are_dropped() {
        let mut builder = AstBuilder::new();
        let color = QualType::enumeration("Color", false);
        let red = builder.enum_constant("Red", color.clone());
        let c = builder.local("c", color);
        let cond = Expr::binary(
            crate::model::ast::BinaryOp::Ne,
            Expr::read(c),
            Expr::add(Expr::var(red), Expr::unresolved("T::value")),
        );
        let (ast, cond) = condition_of(builder, vec![c], cond);
        assert_eq!(VariableExtractor.extract(&ast, cond), vec![c]);
    }

    #[test]
    fn test_shadowed_names_stay_distinct() {
        let mut builder = AstBuilder::new();
        let outer = builder.local("i", QualType::int());
        let inner = builder.local("i", QualType::int());
        let cond = Expr::lt(Expr::read(outer), Expr::read(inner));
        let (ast, cond) = condition_of(builder, vec![outer, inner], cond);
        assert_eq!(VariableExtractor.extract(&ast, cond), vec![outer, inner]);
    }
}
