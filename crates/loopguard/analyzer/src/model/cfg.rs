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

//! Control Flow Graph built from a function body
//!
//! Blocks hold their elements in execution order. Branching statements
//! (`if`, loops, `switch`, jumps) become block terminators, so a loop
//! statement can be located through the block that evaluates its condition.
//! Every AST node that is part of an element is mapped to the position of
//! that element, which is what the sequencing oracle queries.

use super::ast::{Ast, DeclId, NodeId, NodeKind};
use crate::error::{CfgError, CfgResult};
use petgraph::algo::has_path_connecting;
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Block identifier
pub type BlockId = NodeIndex;

/// Options controlling which lifetime-related elements are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CfgBuildOptions {
    /// Destructor calls for locals leaving their scope
    pub add_implicit_dtors: bool,
    /// Destructor calls for temporaries at the end of their full expression
    pub add_temporary_dtors: bool,
}

impl Default for CfgBuildOptions {
    fn default() -> Self {
        Self {
            add_implicit_dtors: true,
            add_temporary_dtors: true,
        }
    }
}

/// An element of a basic block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CfgElement {
    /// Statement or full expression
    Statement(NodeId),
    /// Destructor of a local at the end of its scope
    ImplicitDtor(DeclId),
    /// Destructor of the temporary bound at this node
    TemporaryDtor(NodeId),
}

/// Basic block in the control flow graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicBlock {
    /// Elements in execution order
    pub elements: Vec<CfgElement>,
    /// Statement that decides where control goes next
    pub terminator: Option<NodeId>,
}

/// Types of control flow edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Fallthrough,
    True,
    False,
    LoopBack,
    Jump,
    Case,
}

/// Where an element sits in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementPosition {
    pub block: BlockId,
    pub index: usize,
}

/// Control flow graph of one function or lambda body
#[derive(Debug, Clone)]
pub struct Cfg {
    graph: DiGraph<BasicBlock, EdgeKind>,
    entry: BlockId,
    exit: BlockId,
    positions: HashMap<NodeId, ElementPosition>,
    terminators: HashMap<NodeId, BlockId>,
    has_goto: bool,
}

impl Cfg {
    /// Build the CFG of `body`
    pub fn build(ast: &Ast, body: NodeId, options: CfgBuildOptions) -> CfgResult<Self> {
        CfgBuilder::new(ast, options).build(body)
    }

    pub fn graph(&self) -> &DiGraph<BasicBlock, EdgeKind> {
        &self.graph
    }

    pub fn entry(&self) -> BlockId {
        self.entry
    }

    pub fn exit(&self) -> BlockId {
        self.exit
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.graph[id]
    }

    pub fn block_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Outgoing edges of a block
    pub fn successors(&self, id: BlockId) -> impl Iterator<Item = (BlockId, EdgeKind)> + '_ {
        self.graph.edges(id).map(|edge| (edge.target(), *edge.weight()))
    }

    /// Position of the element that evaluates `node`
    pub fn position_of(&self, node: NodeId) -> Option<ElementPosition> {
        self.positions.get(&node).copied()
    }

    /// Block whose terminator is the branching statement `stmt`
    pub fn terminator_block(&self, stmt: NodeId) -> Option<BlockId> {
        self.terminators.get(&stmt).copied()
    }

    /// Whether the body contains `goto` jumps
    pub fn has_goto(&self) -> bool {
        self.has_goto
    }

    /// Whether some path leads from `from` to `to`, trivially true when equal
    pub fn reaches(&self, from: BlockId, to: BlockId) -> bool {
        has_path_connecting(&self.graph, from, to, None)
    }

    /// Whether control can leave `block` and come back to it
    pub fn is_on_cycle(&self, block: BlockId) -> bool {
        self.graph.neighbors(block).any(|successor| self.reaches(successor, block))
    }

    /// Graphviz rendering for debugging
    pub fn to_dot(&self) -> String {
        format!("{:?}", Dot::new(&self.graph))
    }
}

struct SwitchScope {
    block: BlockId,
    has_default: bool,
}

/// Builds a CFG by walking the statement tree forwards
struct CfgBuilder<'a> {
    ast: &'a Ast,
    options: CfgBuildOptions,
    graph: DiGraph<BasicBlock, EdgeKind>,
    current: BlockId,
    exit: BlockId,
    break_targets: Vec<BlockId>,
    continue_targets: Vec<BlockId>,
    switches: Vec<SwitchScope>,
    labels: HashMap<String, BlockId>,
    pending_gotos: Vec<(BlockId, String)>,
    scopes: Vec<Vec<DeclId>>,
    positions: HashMap<NodeId, ElementPosition>,
    terminators: HashMap<NodeId, BlockId>,
    has_goto: bool,
}

impl<'a> CfgBuilder<'a> {
    fn new(ast: &'a Ast, options: CfgBuildOptions) -> Self {
        let mut graph = DiGraph::new();
        let entry = graph.add_node(BasicBlock::default());
        let exit = graph.add_node(BasicBlock::default());
        Self {
            ast,
            options,
            graph,
            current: entry,
            exit,
            break_targets: Vec::new(),
            continue_targets: Vec::new(),
            switches: Vec::new(),
            labels: HashMap::new(),
            pending_gotos: Vec::new(),
            scopes: Vec::new(),
            positions: HashMap::new(),
            terminators: HashMap::new(),
            has_goto: false,
        }
    }

    fn build(mut self, body: NodeId) -> CfgResult<Cfg> {
        let entry = self.current;
        self.scopes.push(Vec::new());
        self.visit_stmt(body)?;
        self.pop_scope();
        self.add_edge(self.current, self.exit, EdgeKind::Fallthrough);

        for (block, name) in std::mem::take(&mut self.pending_gotos) {
            let target = *self.labels.get(&name).ok_or_else(|| CfgError::UnresolvedLabel(name.clone()))?;
            self.add_edge(block, target, EdgeKind::Jump);
        }

        Ok(Cfg {
            graph: self.graph,
            entry,
            exit: self.exit,
            positions: self.positions,
            terminators: self.terminators,
            has_goto: self.has_goto,
        })
    }

    fn new_block(&mut self) -> BlockId {
        self.graph.add_node(BasicBlock::default())
    }

    fn add_edge(&mut self, from: BlockId, to: BlockId, kind: EdgeKind) {
        self.graph.add_edge(from, to, kind);
    }

    /// Continue in a fresh block reached from the current one
    fn start_block(&mut self) -> BlockId {
        let next = self.new_block();
        self.add_edge(self.current, next, EdgeKind::Fallthrough);
        self.current = next;
        next
    }

    /// Continue in a fresh block with no predecessors, after a jump
    fn detach(&mut self) {
        self.current = self.new_block();
    }

    fn append(&mut self, element: CfgElement) -> usize {
        let block = &mut self.graph[self.current];
        block.elements.push(element);
        block.elements.len() - 1
    }

    fn set_terminator(&mut self, stmt: NodeId) {
        self.graph[self.current].terminator = Some(stmt);
        self.terminators.insert(stmt, self.current);
    }

    /// Add a statement or full expression as one element
    fn add_full_expression(&mut self, node: NodeId) {
        let index = self.append(CfgElement::Statement(node));
        let position = ElementPosition { block: self.current, index };
        let ast = self.ast;
        for id in ast.descendants_inclusive(node) {
            self.positions.entry(id).or_insert(position);
        }

        if self.options.add_temporary_dtors {
            let temporaries = self.temporaries(node);
            for temporary in temporaries.into_iter().rev() {
                self.append(CfgElement::TemporaryDtor(temporary));
            }
        }
    }

    /// Temporaries created by a full expression, in creation order
    fn temporaries(&self, node: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            match self.ast.kind(id) {
                // A lambda body runs later, its temporaries are not ours
                NodeKind::Lambda { .. } => continue,
                NodeKind::BindTemporary(_) => found.push(id),
                _ => {}
            }
            stack.extend(self.ast.children(id).into_iter().rev());
        }
        found
    }

    fn pop_scope(&mut self) {
        let Some(decls) = self.scopes.pop() else {
            return;
        };
        if !self.options.add_implicit_dtors {
            return;
        }
        for decl in decls.into_iter().rev() {
            if self.ast.decl(decl).ty.has_destructor() {
                self.append(CfgElement::ImplicitDtor(decl));
            }
        }
    }

    /// Value of a condition that is an integer literal
    fn literal_truth(&self, cond: NodeId) -> Option<bool> {
        match self.ast.kind(self.ast.ignore_paren_imp_casts(cond)) {
            NodeKind::IntegerLiteral(value) => Some(*value != 0),
            _ => None,
        }
    }

    /// Wire the true and false successors of a branch, pruning impossible ones
    fn add_branch(&mut self, from: BlockId, on_true: BlockId, true_kind: EdgeKind, on_false: BlockId, truth: Option<bool>) {
        if truth != Some(false) {
            self.add_edge(from, on_true, true_kind);
        }
        if truth != Some(true) {
            self.add_edge(from, on_false, EdgeKind::False);
        }
    }

    fn visit_stmt(&mut self, node: NodeId) -> CfgResult<()> {
        let ast = self.ast;
        match ast.kind(node) {
            NodeKind::Compound(stmts) => {
                self.scopes.push(Vec::new());
                for &stmt in stmts {
                    self.visit_stmt(stmt)?;
                }
                self.pop_scope();
            }
            NodeKind::DeclStmt(decls) => {
                self.add_full_expression(node);
                if let Some(scope) = self.scopes.last_mut() {
                    scope.extend(decls.iter().copied());
                }
            }
            NodeKind::If { cond, then_branch, else_branch } => {
                self.add_full_expression(*cond);
                self.set_terminator(node);
                let branch = self.current;
                let truth = self.literal_truth(*cond);

                let then_block = self.new_block();
                let join = self.new_block();
                let else_block = match else_branch {
                    Some(_) => self.new_block(),
                    None => join,
                };
                self.add_branch(branch, then_block, EdgeKind::True, else_block, truth);

                self.current = then_block;
                self.visit_stmt(*then_branch)?;
                self.add_edge(self.current, join, EdgeKind::Fallthrough);

                if let Some(else_branch) = else_branch {
                    self.current = else_block;
                    self.visit_stmt(*else_branch)?;
                    self.add_edge(self.current, join, EdgeKind::Fallthrough);
                }
                self.current = join;
            }
            NodeKind::While { cond, body } => {
                let header = self.start_block();
                self.add_full_expression(*cond);
                self.set_terminator(node);

                let body_block = self.new_block();
                let exit_block = self.new_block();
                self.add_branch(header, body_block, EdgeKind::True, exit_block, self.literal_truth(*cond));

                self.break_targets.push(exit_block);
                self.continue_targets.push(header);
                self.current = body_block;
                self.visit_stmt(*body)?;
                self.add_edge(self.current, header, EdgeKind::LoopBack);
                self.break_targets.pop();
                self.continue_targets.pop();

                self.current = exit_block;
            }
            NodeKind::DoWhile { body, cond } => {
                let body_block = self.start_block();
                let cond_block = self.new_block();
                let exit_block = self.new_block();

                self.break_targets.push(exit_block);
                self.continue_targets.push(cond_block);
                self.visit_stmt(*body)?;
                self.add_edge(self.current, cond_block, EdgeKind::Fallthrough);
                self.break_targets.pop();
                self.continue_targets.pop();

                self.current = cond_block;
                self.add_full_expression(*cond);
                self.set_terminator(node);
                self.add_branch(cond_block, body_block, EdgeKind::LoopBack, exit_block, self.literal_truth(*cond));

                self.current = exit_block;
            }
            NodeKind::For { init, cond, inc, body } => {
                self.scopes.push(Vec::new());
                if let Some(init) = init {
                    self.visit_stmt(*init)?;
                }

                let header = self.start_block();
                if let Some(cond) = cond {
                    self.add_full_expression(*cond);
                }
                self.set_terminator(node);

                let body_block = self.new_block();
                let inc_block = self.new_block();
                let exit_block = self.new_block();
                let truth = match cond {
                    Some(cond) => self.literal_truth(*cond),
                    None => Some(true),
                };
                self.add_branch(header, body_block, EdgeKind::True, exit_block, truth);

                self.break_targets.push(exit_block);
                self.continue_targets.push(inc_block);
                self.current = body_block;
                self.visit_stmt(*body)?;
                self.add_edge(self.current, inc_block, EdgeKind::Fallthrough);
                self.break_targets.pop();
                self.continue_targets.pop();

                self.current = inc_block;
                if let Some(inc) = inc {
                    self.add_full_expression(*inc);
                }
                self.add_edge(inc_block, header, EdgeKind::LoopBack);

                self.current = exit_block;
                self.pop_scope();
            }
            NodeKind::Switch { cond, body } => {
                self.add_full_expression(*cond);
                self.set_terminator(node);
                let switch_block = self.current;
                let exit_block = self.new_block();

                self.switches.push(SwitchScope {
                    block: switch_block,
                    has_default: false,
                });
                self.break_targets.push(exit_block);
                self.detach();
                self.visit_stmt(*body)?;
                self.add_edge(self.current, exit_block, EdgeKind::Fallthrough);
                self.break_targets.pop();

                if let Some(scope) = self.switches.pop() {
                    if !scope.has_default {
                        self.add_edge(switch_block, exit_block, EdgeKind::False);
                    }
                }
                self.current = exit_block;
            }
            NodeKind::Case { body, .. } | NodeKind::Default { body } => {
                let is_default = matches!(ast.kind(node), NodeKind::Default { .. });
                let Some(scope) = self.switches.last_mut() else {
                    return Err(CfgError::StrayCase(if is_default { "default" } else { "case" }));
                };
                scope.has_default |= is_default;
                let switch_block = scope.block;

                let block = self.start_block();
                self.add_edge(switch_block, block, EdgeKind::Case);
                self.visit_stmt(*body)?;
            }
            NodeKind::Label { name, body } => {
                let block = self.start_block();
                if self.labels.insert(name.clone(), block).is_some() {
                    return Err(CfgError::DuplicateLabel(name.clone()));
                }
                self.visit_stmt(*body)?;
            }
            NodeKind::Goto(name) => {
                self.set_terminator(node);
                self.pending_gotos.push((self.current, name.clone()));
                self.has_goto = true;
                self.detach();
            }
            NodeKind::Break => {
                let target = *self.break_targets.last().ok_or(CfgError::StrayJump("break"))?;
                self.set_terminator(node);
                self.add_edge(self.current, target, EdgeKind::Jump);
                self.detach();
            }
            NodeKind::Continue => {
                let target = *self.continue_targets.last().ok_or(CfgError::StrayJump("continue"))?;
                self.set_terminator(node);
                self.add_edge(self.current, target, EdgeKind::Jump);
                self.detach();
            }
            NodeKind::Return(_) | NodeKind::Throw(_) => {
                self.add_full_expression(node);
                self.add_edge(self.current, self.exit, EdgeKind::Jump);
                self.detach();
            }
            NodeKind::Null => {}
            _ => self.add_full_expression(node),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::builder::AstBuilder;
    use crate::model::syntax::{Expr, Stmt};
    use crate::model::types::QualType;

    fn build(builder: AstBuilder, body: Stmt) -> (Ast, Cfg, NodeId) {
        let mut builder = builder;
        let function = builder.function("f", [], body).unwrap();
        let ast = builder.finish();
        let body = ast.function(function).body;
        let cfg = Cfg::build(&ast, body, CfgBuildOptions::default()).unwrap();
        (ast, cfg, body)
    }

    fn find(ast: &Ast, root: NodeId, predicate: impl Fn(&NodeKind) -> bool) -> NodeId {
        ast.descendants_inclusive(root).find(|&id| predicate(ast.kind(id))).unwrap()
    }

    #[test]
    fn test_while_loop_shape() {
        let mut builder = AstBuilder::new();
        let i = builder.local("i", QualType::int());
        let body = Stmt::block([
            Stmt::declare(i, Expr::int(0)),
            Stmt::while_loop(Expr::lt(Expr::read(i), Expr::int(10)), Stmt::block([Stmt::expr(Expr::post_inc(Expr::var(i)))])),
        ]);
        let (ast, cfg, body) = build(builder, body);

        let loop_stmt = find(&ast, body, NodeKind::is_loop);
        let header = cfg.terminator_block(loop_stmt).unwrap();
        assert!(cfg.is_on_cycle(header));

        let kinds: Vec<EdgeKind> = cfg.successors(header).map(|(_, kind)| kind).collect();
        assert!(kinds.contains(&EdgeKind::True));
        assert!(kinds.contains(&EdgeKind::False));

        let decl = ast.decl(i).declared_by.unwrap();
        let decl_block = cfg.position_of(decl).unwrap().block;
        assert!(cfg.reaches(decl_block, header));
        assert!(!cfg.is_on_cycle(decl_block));
        assert!(cfg.reaches(header, cfg.exit()));
    }

    #[test]
    fn test_code_after_loop_cannot_reach_header() {
        let mut builder = AstBuilder::new();
        let i = builder.local("i", QualType::int());
        let p = builder.local("p", QualType::int().pointer_to());
        let body = Stmt::block([
            Stmt::declare(i, Expr::int(0)),
            Stmt::while_loop(Expr::lt(Expr::read(i), Expr::int(10)), Stmt::block([])),
            Stmt::declare(p, Expr::addr_of(Expr::var(i))),
        ]);
        let (ast, cfg, body) = build(builder, body);

        let loop_stmt = find(&ast, body, NodeKind::is_loop);
        let header = cfg.terminator_block(loop_stmt).unwrap();
        let escape = find(&ast, body, |kind| matches!(kind, NodeKind::Unary { op: crate::model::ast::UnaryOp::AddrOf, .. }));
        let escape_block = cfg.position_of(escape).unwrap().block;

        assert!(cfg.reaches(header, escape_block));
        assert!(!cfg.reaches(escape_block, header));
    }

    #[test]
    fn test_constant_condition_prunes_exit_edge() {
        let builder = AstBuilder::new();
        let body = Stmt::block([Stmt::while_loop(Expr::int(1), Stmt::block([]))]);
        let (ast, cfg, body) = build(builder, body);

        let header = cfg.terminator_block(find(&ast, body, NodeKind::is_loop)).unwrap();
        assert!(cfg.successors(header).all(|(_, kind)| kind == EdgeKind::True));
        assert!(!cfg.reaches(header, cfg.exit()));
    }

    #[test]
    fn test_do_while_and_for_shapes() {
        let mut builder = AstBuilder::new();
        let i = builder.local("i", QualType::int());
        let body = Stmt::block([
            Stmt::declare(i, Expr::int(0)),
            Stmt::do_while(Stmt::block([]), Expr::lt(Expr::read(i), Expr::int(3))),
            Stmt::for_loop(None, None, Some(Expr::pre_inc(Expr::var(i))), Stmt::block([])),
        ]);
        let (ast, cfg, body) = build(builder, body);

        let loops: Vec<NodeId> = ast.descendants(body).filter(|&id| ast.kind(id).is_loop()).collect();
        let do_block = cfg.terminator_block(loops[0]).unwrap();
        let for_header = cfg.terminator_block(loops[1]).unwrap();

        assert!(cfg.successors(do_block).any(|(_, kind)| kind == EdgeKind::LoopBack));
        assert!(cfg.block(for_header).elements.is_empty());
        assert!(cfg.successors(for_header).all(|(_, kind)| kind == EdgeKind::True));
        assert!(cfg.reaches(do_block, for_header));
        assert!(!cfg.reaches(for_header, do_block));
    }

    #[test]
    fn test_break_and_continue_edges() {
        let mut builder = AstBuilder::new();
        let i = builder.local("i", QualType::int());
        let body = Stmt::block([
            Stmt::declare(i, Expr::int(0)),
            Stmt::while_loop(
                Expr::int(1),
                Stmt::block([Stmt::if_else(Expr::read(i), Stmt::break_stmt(), Stmt::continue_stmt())]),
            ),
        ]);
        let (ast, cfg, body) = build(builder, body);

        let header = cfg.terminator_block(find(&ast, body, NodeKind::is_loop)).unwrap();
        let break_block = cfg.terminator_block(find(&ast, body, |k| matches!(k, NodeKind::Break))).unwrap();
        let continue_block = cfg.terminator_block(find(&ast, body, |k| matches!(k, NodeKind::Continue))).unwrap();

        assert!(cfg.reaches(break_block, cfg.exit()));
        assert!(!cfg.reaches(break_block, header));
        assert!(cfg.successors(continue_block).any(|(target, _)| target == header));
    }

    #[test]
    fn test_switch_cases() {
        let mut builder = AstBuilder::new();
        let x = builder.local("x", QualType::int());
        let body = Stmt::block([
            Stmt::declare(x, Expr::int(0)),
            Stmt::switch(
                Expr::read(x),
                Stmt::block([
                    Stmt::case(Expr::int(0), Stmt::expr(Expr::post_inc(Expr::var(x)))),
                    Stmt::break_stmt(),
                    Stmt::default_case(Stmt::null()),
                ]),
            ),
        ]);
        let (ast, cfg, body) = build(builder, body);

        let switch_block = cfg.terminator_block(find(&ast, body, |k| matches!(k, NodeKind::Switch { .. }))).unwrap();
        let case_edges = cfg.successors(switch_block).filter(|(_, kind)| *kind == EdgeKind::Case).count();
        assert_eq!(case_edges, 2);
        assert!(cfg.successors(switch_block).all(|(_, kind)| kind != EdgeKind::False));
    }

    #[test]
    fn test_goto_resolution() {
        let mut builder = AstBuilder::new();
        let i = builder.local("i", QualType::int());
        let body = Stmt::block([
            Stmt::declare(i, Expr::int(0)),
            Stmt::label("again", Stmt::expr(Expr::post_inc(Expr::var(i)))),
            Stmt::if_then(Expr::lt(Expr::read(i), Expr::int(5)), Stmt::goto("again")),
        ]);
        let (ast, cfg, body) = build(builder, body);

        assert!(cfg.has_goto());
        let goto_block = cfg.terminator_block(find(&ast, body, |k| matches!(k, NodeKind::Goto(_)))).unwrap();
        assert!(cfg.is_on_cycle(goto_block));
    }

    #[test]
    fn test_construction_errors() {
        let ast_with = |body: Stmt| {
            let mut builder = AstBuilder::new();
            let function = builder.function("f", [], body).unwrap();
            let ast = builder.finish();
            let body = ast.function(function).body;
            Cfg::build(&ast, body, CfgBuildOptions::default()).err()
        };

        assert_eq!(ast_with(Stmt::block([Stmt::goto("nowhere")])), Some(CfgError::UnresolvedLabel("nowhere".to_string())));
        assert_eq!(ast_with(Stmt::block([Stmt::break_stmt()])), Some(CfgError::StrayJump("break")));
        assert_eq!(ast_with(Stmt::block([Stmt::case(Expr::int(1), Stmt::null())])), Some(CfgError::StrayCase("case")));
        assert_eq!(
            ast_with(Stmt::block([Stmt::label("l", Stmt::null()), Stmt::label("l", Stmt::null())])),
            Some(CfgError::DuplicateLabel("l".to_string()))
        );
    }

    #[test]
    fn test_destructor_elements_in_block_order() {
        let mut builder = AstBuilder::new();
        let first = builder.local("first", QualType::record("Guard", true));
        let plain = builder.local("plain", QualType::int());
        let second = builder.local("second", QualType::record("Guard", true));
        let make = builder.signature("make", []);
        let body = Stmt::block([
            Stmt::block([Stmt::decl([(first, None)]), Stmt::decl([(plain, None)]), Stmt::decl([(second, None)])]),
            Stmt::expr(Expr::temporary(Expr::call(make, []))),
        ]);
        let (ast, cfg, body) = build(builder, body);

        let elements = &cfg.block(cfg.entry()).elements;
        let dtors: Vec<CfgElement> = elements.iter().copied().filter(|e| !matches!(e, CfgElement::Statement(_))).collect();
        let temporary = find(&ast, body, |k| matches!(k, NodeKind::BindTemporary(_)));
        assert_eq!(dtors, vec![CfgElement::ImplicitDtor(second), CfgElement::ImplicitDtor(first), CfgElement::TemporaryDtor(temporary)]);
        assert_eq!(elements.last(), Some(&CfgElement::TemporaryDtor(temporary)));
    }

    #[test]
    fn test_destructors_can_be_disabled() {
        let mut builder = AstBuilder::new();
        let guard = builder.local("guard", QualType::record("Guard", true));
        let function = builder.function("f", [], Stmt::block([Stmt::decl([(guard, None)])])).unwrap();
        let ast = builder.finish();
        let options = CfgBuildOptions {
            add_implicit_dtors: false,
            add_temporary_dtors: false,
        };
        let cfg = Cfg::build(&ast, ast.function(function).body, options).unwrap();
        assert_eq!(cfg.block(cfg.entry()).elements.len(), 1);
        assert!(cfg.to_dot().contains("digraph"));
    }

    #[test]
    fn test_lambda_body_maps_to_creation_point() {
        let mut builder = AstBuilder::new();
        let i = builder.local("i", QualType::int());
        let p = builder.local("p", QualType::int().pointer_to());
        let lambda = Expr::lambda([], Stmt::block([Stmt::declare(p, Expr::addr_of(Expr::var(i)))]));
        let body = Stmt::block([Stmt::declare(i, Expr::int(0)), Stmt::expr(lambda)]);
        let (ast, cfg, body) = build(builder, body);

        let lambda = find(&ast, body, |k| matches!(k, NodeKind::Lambda { .. }));
        let inner = ast.decl(p).declared_by.unwrap();
        assert_eq!(cfg.position_of(inner), cfg.position_of(lambda));
    }
}
