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

//! Configuration for the infinite loop check

use crate::error::AnalyzerResult;
use crate::model::cfg::CfgBuildOptions;
use serde::{Deserialize, Serialize};

/// Check configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// When false the check reports nothing
    pub enabled: bool,
    /// Verbosity level: 0 = quiet, 1 = normal, 2 = verbose
    pub verbosity: u8,
    /// How control-flow graphs are built
    pub cfg: CfgBuildOptions,
    /// Treat every escape as preceding the loop when the function uses `goto`
    pub conservative_on_goto: bool,
}

impl AnalyzerConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self {
            enabled: true,
            verbosity: 1,
            cfg: CfgBuildOptions::default(),
            conservative_on_goto: true,
        }
    }

    /// Parse a JSON document, missing fields keep their defaults
    pub fn from_json_str(input: &str) -> AnalyzerResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_cfg_options(mut self, cfg: CfgBuildOptions) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn with_conservative_on_goto(mut self, conservative: bool) -> Self {
        self.conservative_on_goto = conservative;
        self
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbosity > 1
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::new()
    }
}
