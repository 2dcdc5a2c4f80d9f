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

//! Per-loop decision and the check entry points

use super::condition_vars::VariableExtractor;
use super::escape::{EscapeAnalyzer, EscapeKind};
use super::loop_selector::{LoopCandidate, LoopSelector};
use super::mutation::MutationAnalyzer;
use super::scope::{Provenance, ScopeValidator};
use super::{Effect, UseMatcher};
use crate::config::AnalyzerConfig;
use crate::model::ast::{Ast, DeclId, FunctionId, NodeId};
use crate::model::cfg::{Cfg, CfgBuildOptions};
use crate::model::sequence::SequenceOracle;
use loopguard_common::Finding;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info, instrument, trace};

/// Why a candidate loop was not reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    NoConditionVariables,
    NonInteger(DeclId),
    ChangedInLoop { variable: DeclId, site: NodeId, effect: Effect },
    NotLocal { variable: DeclId, provenance: Provenance },
    NoControlFlowGraph,
    EscapesBeforeLoop { variable: DeclId, site: NodeId, escape: EscapeKind },
}

impl Suppression {
    pub fn reason(&self) -> &'static str {
        match self {
            Suppression::NoConditionVariables => "no condition variables",
            Suppression::NonInteger(_) => "non-integer condition variable",
            Suppression::ChangedInLoop { .. } => "condition variable changed in the loop",
            Suppression::NotLocal { .. } => "condition variable not declared in the body",
            Suppression::NoControlFlowGraph => "control flow graph unavailable",
            Suppression::EscapesBeforeLoop { .. } => "condition variable may be aliased before the loop",
        }
    }
}

/// Outcome for one candidate loop
#[derive(Debug, Clone, PartialEq)]
pub struct LoopVerdict {
    pub candidate: LoopCandidate,
    pub outcome: Result<Finding, Suppression>,
}

/// Control flow graphs of the bodies met in one pass, built on first use
struct CfgCache<'a> {
    ast: &'a Ast,
    options: CfgBuildOptions,
    dump: bool,
    graphs: HashMap<NodeId, Option<Cfg>>,
}

impl<'a> CfgCache<'a> {
    fn new(ast: &'a Ast, config: &AnalyzerConfig) -> Self {
        Self {
            ast,
            options: config.cfg,
            dump: config.is_verbose(),
            graphs: HashMap::new(),
        }
    }

    fn get(&mut self, context: NodeId) -> Option<&Cfg> {
        let (ast, options, dump) = (self.ast, self.options, self.dump);
        self.graphs
            .entry(context)
            .or_insert_with(|| match Cfg::build(ast, context, options) {
                Ok(cfg) => {
                    trace!(?context, blocks = cfg.block_count(), "built control flow graph");
                    if dump {
                        trace!(dot = %cfg.to_dot(), "control flow graph");
                    }
                    Some(cfg)
                }
                Err(error) => {
                    debug!(?context, %error, "cannot build control flow graph, skipping body");
                    None
                }
            })
            .as_ref()
    }
}

/// Flags loops whose condition variables are never updated
#[derive(Debug, Clone, Default)]
pub struct InfiniteLoopCheck {
    config: AnalyzerConfig,
}

impl InfiniteLoopCheck {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Findings for one function, in the order its loops appear
    #[instrument(level = "debug", skip(self, ast), fields(function = %ast.function(function).name))]
    pub fn analyze_function(&self, ast: &Ast, function: FunctionId) -> Vec<Finding> {
        self.evaluate_function(ast, function)
            .into_iter()
            .filter_map(|verdict| verdict.outcome.ok())
            .collect()
    }

    /// Decision for every candidate loop of `function`, reported or not
    pub fn evaluate_function(&self, ast: &Ast, function: FunctionId) -> Vec<LoopVerdict> {
        if !self.config.enabled {
            return Vec::new();
        }
        let mut graphs = CfgCache::new(ast, &self.config);
        LoopSelector::new(ast)
            .candidates(function)
            .map(|candidate| {
                let outcome = self.diagnose(ast, &candidate, &mut graphs);
                match &outcome {
                    Ok(finding) => debug!(stmt = ?candidate.stmt, variables = %finding.variable_list(), "loop reported"),
                    Err(suppression) => debug!(stmt = ?candidate.stmt, reason = suppression.reason(), ?suppression, "loop not reported"),
                }
                LoopVerdict { candidate, outcome }
            })
            .collect()
    }

    /// Findings for every function of the unit, in function order
    pub fn analyze_unit(&self, ast: &Ast) -> Vec<Finding> {
        let findings: Vec<Finding> = ast.function_ids().flat_map(|function| self.analyze_function(ast, function)).collect();
        info!(functions = ast.function_ids().count(), findings = findings.len(), "unit analyzed");
        findings
    }

    /// Same as [`analyze_unit`](Self::analyze_unit), one rayon task per function
    pub fn analyze_unit_parallel(&self, ast: &Ast) -> Vec<Finding> {
        let functions: Vec<FunctionId> = ast.function_ids().collect();
        let per_function: Vec<Vec<Finding>> = functions.par_iter().map(|&function| self.analyze_function(ast, function)).collect();
        let findings: Vec<Finding> = per_function.into_iter().flatten().collect();
        info!(functions = functions.len(), findings = findings.len(), "unit analyzed in parallel");
        findings
    }

    fn diagnose(&self, ast: &Ast, candidate: &LoopCandidate, graphs: &mut CfgCache<'_>) -> Result<Finding, Suppression> {
        let variables = VariableExtractor.extract(ast, candidate.cond);
        if variables.is_empty() {
            return Err(Suppression::NoConditionVariables);
        }

        let changes = (MutationAnalyzer, EscapeAnalyzer);
        for &variable in &variables {
            if !ast.decl(variable).ty.is_integer() {
                return Err(Suppression::NonInteger(variable));
            }

            for region in candidate.change_regions() {
                if let Some((site, effect)) = changes.find_in(ast, region, variable) {
                    return Err(Suppression::ChangedInLoop { variable, site, effect });
                }
            }

            let provenance = ScopeValidator.provenance(ast, variable, candidate.context);
            if provenance != Provenance::Local {
                return Err(Suppression::NotLocal { variable, provenance });
            }

            let cfg = graphs.get(candidate.context).ok_or(Suppression::NoControlFlowGraph)?;
            let oracle = SequenceOracle::new(cfg).with_conservative_on_goto(self.config.conservative_on_goto);
            let preceding = EscapeAnalyzer
                .escapes_in(ast, candidate.context, variable)
                .find(|&(site, _)| oracle.potentially_after(candidate.stmt, site));
            if let Some((site, escape)) = preceding {
                return Err(Suppression::EscapesBeforeLoop { variable, site, escape });
            }
        }

        let names = variables.iter().map(|&variable| ast.decl(variable).name.clone()).collect();
        Ok(Finding::new(ast.location(candidate.stmt), names))
    }
}
