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

//! Detection of likely-infinite loops
//!
//! A `while`, `do-while` or `for` loop is reported when none of the integer
//! variables in its condition can change while it runs: no direct write in
//! the loop, no alias created before or during it, and every variable is a
//! local of the analyzed body. Loops with a `break`, `return`, `goto` or
//! `throw` in their body are never reported.
//!
//! The front-end describes function bodies with [`Stmt`]/[`Expr`] trees and
//! lowers them with [`AstBuilder`]:
//!
//! ```
//! use loopguard_analyzer::{analyze, AstBuilder, Expr, QualType, Stmt};
//!
//! let mut builder = AstBuilder::new();
//! let i = builder.local("i", QualType::int());
//! let j = builder.local("j", QualType::int());
//! let body = Stmt::block([
//!     Stmt::decl([(i, Some(Expr::int(0))), (j, Some(Expr::int(0)))]).at(2, 3),
//!     Stmt::while_loop(
//!         Expr::lt(Expr::read(i), Expr::int(10)),
//!         Stmt::block([Stmt::expr(Expr::post_inc(Expr::var(j)))]),
//!     )
//!     .at(3, 3),
//! ]);
//! let function = builder.function("spin", [], body).unwrap();
//! let ast = builder.finish();
//!
//! let findings = analyze(&ast, function);
//! assert_eq!(
//!     findings[0].render(),
//!     "3:3: warning: The condition variable (i) is not updated in the loop body [misc-infinite-loop]"
//! );
//! ```

pub mod check;
pub mod config;
pub mod error;
pub mod model;

pub use check::{InfiniteLoopCheck, LoopCandidate, LoopKind, Suppression};
pub use config::AnalyzerConfig;
pub use error::{AnalyzerError, AnalyzerResult, AstError, CfgError};
pub use loopguard_common::{Finding, SourceLocation};
pub use model::{Ast, AstBuilder, Cfg, CfgBuildOptions, DeclId, Expr, FunctionId, QualType, SequenceOracle, Stmt};

/// Analyze one function with the default configuration
pub fn analyze(ast: &Ast, function: FunctionId) -> Vec<Finding> {
    InfiniteLoopCheck::default().analyze_function(ast, function)
}
