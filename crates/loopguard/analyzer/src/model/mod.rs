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

//! Read-only program model: syntax hand-off, AST arena, CFG and ordering

pub mod ast;
pub mod builder;
pub mod cfg;
pub mod sequence;
pub mod syntax;
pub mod types;

pub use ast::{Ast, BinaryOp, Decl, DeclId, DeclKind, FunctionId, NodeId, NodeKind, SignatureId, Storage, UnaryOp};
pub use builder::AstBuilder;
pub use cfg::{BasicBlock, BlockId, Cfg, CfgBuildOptions, CfgElement, EdgeKind};
pub use sequence::SequenceOracle;
pub use syntax::{Expr, ExprKind, Stmt, StmtKind};
pub use types::{IntegerKind, QualType, TypeClass, TypeKind};
