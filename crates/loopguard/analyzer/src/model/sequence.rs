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

//! Ordering queries over a control flow graph

use super::ast::NodeId;
use super::cfg::{Cfg, ElementPosition};
use tracing::trace;

/// Answers whether one program point can execute after another
///
/// Queries are answered lazily with a path search over the block graph.
/// Whenever a node cannot be placed in the graph the answer is `true`.
#[derive(Debug, Clone, Copy)]
pub struct SequenceOracle<'a> {
    cfg: &'a Cfg,
    conservative_on_goto: bool,
}

impl<'a> SequenceOracle<'a> {
    pub fn new(cfg: &'a Cfg) -> Self {
        Self {
            cfg,
            conservative_on_goto: true,
        }
    }

    pub fn with_conservative_on_goto(mut self, conservative: bool) -> Self {
        self.conservative_on_goto = conservative;
        self
    }

    /// Whether `later` can execute once `earlier` has executed
    pub fn potentially_after(&self, later: NodeId, earlier: NodeId) -> bool {
        if self.conservative_on_goto && self.cfg.has_goto() {
            return true;
        }
        let (Some(anchor), Some(site)) = (self.anchor(later), self.cfg.position_of(earlier)) else {
            return true;
        };

        let answer = if anchor.block == site.block {
            site.index < anchor.index || self.cfg.is_on_cycle(anchor.block)
        } else {
            self.cfg.reaches(site.block, anchor.block)
        };
        trace!(?later, ?earlier, answer, "sequence query");
        answer
    }

    /// Branching statements are placed after every element of their block
    fn anchor(&self, node: NodeId) -> Option<ElementPosition> {
        match self.cfg.terminator_block(node) {
            Some(block) => Some(ElementPosition {
                block,
                index: self.cfg.block(block).elements.len(),
            }),
            None => self.cfg.position_of(node),
        }
    }
}
