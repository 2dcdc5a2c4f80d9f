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

use tracing::Level;
use tracing::info;

/// Map a verbosity level (0 = quiet, 1 = normal, 2 = verbose, 3+ = trace) to a tracing level
pub fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install a formatting subscriber for the given verbosity.
///
/// Returns false when a global subscriber was already installed.
pub fn init_logging(verbosity: u8) -> bool {
    let installed = tracing_subscriber::fmt().with_max_level(level_for_verbosity(verbosity)).with_target(true).try_init().is_ok();
    if installed {
        info!(verbosity, "Logging initialized.");
    }
    installed
}
