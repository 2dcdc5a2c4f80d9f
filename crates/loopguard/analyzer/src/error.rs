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

//! Error types
//!
//! The check itself never fails: every under-analyzable situation ends in
//! silence. These errors belong to the surrounding plumbing (lowering the
//! front-end tree, building a CFG, loading configuration).

use thiserror::Error;

/// Errors raised while lowering a syntax tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AstError {
    #[error("Declaration `{0}` introduced more than once")]
    DuplicateDeclaration(String),
    #[error("Declaration `{0}` cannot be introduced here")]
    MisplacedDeclaration(String),
    #[error("Unknown declaration handle {0}")]
    UnknownDeclaration(usize),
    #[error("Unknown signature handle {0}")]
    UnknownSignature(usize),
}

/// Errors raised while building a control-flow graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CfgError {
    #[error("No label named `{0}` in the function")]
    UnresolvedLabel(String),
    #[error("Label `{0}` defined more than once")]
    DuplicateLabel(String),
    #[error("`{0}` outside of any enclosing loop or switch")]
    StrayJump(&'static str),
    #[error("`{0}` label outside of a switch")]
    StrayCase(&'static str),
}

/// Errors surfaced to the host
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Syntax tree error: {0}")]
    Ast(#[from] AstError),
    #[error("Control flow graph error: {0}")]
    Cfg(#[from] CfgError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

pub type AstResult<T> = Result<T, AstError>;
pub type CfgResult<T> = Result<T, CfgError>;
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;
