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

//! Shared builders for the integration tests

#![allow(dead_code)]

use loopguard_analyzer::model::BinaryOp;
use loopguard_analyzer::{AstBuilder, DeclId, Expr, Finding, InfiniteLoopCheck, LoopKind, Stmt, analyze};

/// Loop statement of the given kind, `for` loops get no init and no increment
pub fn loop_of(kind: LoopKind, cond: Expr, body: Stmt) -> Stmt {
    match kind {
        LoopKind::While => Stmt::while_loop(cond, body),
        LoopKind::DoWhile => Stmt::do_while(body, cond),
        LoopKind::For => Stmt::for_loop(None, Some(cond), None, body),
    }
}

/// `v < limit` for every variable, joined with `&&`
pub fn all_below(vars: &[DeclId], limit: i64) -> Expr {
    vars.iter()
        .map(|&v| Expr::lt(Expr::read(v), Expr::int(limit)))
        .reduce(|acc, next| Expr::binary(BinaryOp::LogicalAnd, acc, next))
        .unwrap_or_else(|| Expr::int(1))
}

/// Analyze `body` as the only function of a unit
pub fn findings_for(builder: AstBuilder, body: Stmt) -> Vec<Finding> {
    let mut builder = builder;
    let function = builder.function("f", [], body).expect("body lowers");
    let ast = builder.finish();
    analyze(&ast, function)
}

/// Same as [`findings_for`] with a custom check
pub fn findings_with(check: &InfiniteLoopCheck, builder: AstBuilder, body: Stmt) -> Vec<Finding> {
    let mut builder = builder;
    let function = builder.function("f", [], body).expect("body lowers");
    let ast = builder.finish();
    check.analyze_function(&ast, function)
}

/// Route check logs to the test harness output
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_max_level(tracing::Level::TRACE).with_test_writer().try_init();
}

pub fn rendered(findings: &[Finding]) -> Vec<String> {
    findings.iter().map(Finding::render).collect()
}
