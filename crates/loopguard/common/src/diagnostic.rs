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

//! Findings handed to the reporting host
//!
//! A [`Finding`] is the only positive output of the loop check. It carries the
//! loop's starting location and the display names of every condition variable,
//! in the order they first appear in the condition. The host decides how to
//! print it; [`Finding::render`] produces the conventional one-line form.

use crate::location::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name under which the check reports
pub const CHECK_NAME: &str = "misc-infinite-loop";

/// A loop whose condition variables are never updated inside it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
    /// Start of the loop statement
    pub location: SourceLocation,
    /// Condition variable names in first-seen order
    pub variables: Vec<String>,
}

impl Finding {
    /// Create a new finding
    pub fn new(location: SourceLocation, variables: Vec<String>) -> Self {
        Self { location, variables }
    }

    /// Number of condition variables, selects the message variant
    pub fn count(&self) -> usize {
        self.variables.len()
    }

    /// Whether the plural message template applies
    pub fn is_plural(&self) -> bool {
        self.count() != 1
    }

    /// Comma separated variable list
    pub fn variable_list(&self) -> String {
        self.variables.join(", ")
    }

    /// Human readable message
    pub fn message(&self) -> String {
        if self.is_plural() {
            format!("None of the condition variables ({}) are updated in the loop body", self.variable_list())
        } else {
            format!("The condition variable ({}) is not updated in the loop body", self.variable_list())
        }
    }

    /// Render as `<line>:<col>: warning: <message> [misc-infinite-loop]`
    pub fn render(&self) -> String {
        format!("{}: warning: {} [{}]", self.location, self.message(), CHECK_NAME)
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
