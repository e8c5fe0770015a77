// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Read progress reporting.
//!
//! Progress lines go to the tracing log, never to stdout. When the total size
//! is known a line is emitted each time another `step_percent` of it has been
//! read; when unknown, each time another MiB has been read.

use tracing::info;

const UNKNOWN_SIZE_STEP: u64 = 1024 * 1024;

#[derive(Debug)]
pub struct Progress {
    total: Option<u64>,
    read: u64,
    step: u64,
    next_report: u64,
}

impl Progress {
    pub fn new(total: Option<u64>, step_percent: u8) -> Self {
        let step = match total {
            Some(total) if total > 0 => {
                percent_of(total, u64::from(step_percent.clamp(1, 100)))
            }
            _ => UNKNOWN_SIZE_STEP,
        };
        Self {
            total: total.filter(|t| *t > 0),
            read: 0,
            step,
            next_report: step,
        }
    }

    /// Record `n` more bytes read. Returns the line that was logged, if any.
    pub fn advance(&mut self, n: u64) -> Option<String> {
        self.read = self.read.saturating_add(n);
        if self.read < self.next_report {
            return None;
        }
        while self.next_report <= self.read && self.next_report < u64::MAX {
            self.next_report = self.next_report.saturating_add(self.step);
        }
        let line = self.render();
        info!("{}", line);
        Some(line)
    }

    pub fn bytes_read(&self) -> u64 {
        self.read
    }

    pub fn render(&self) -> String {
        match self.total {
            Some(total) => format!(
                "Fetching: {} of {} ({}%)",
                format_bytes(self.read),
                format_bytes(total),
                u128::from(self.read.min(total)) * 100 / u128::from(total)
            ),
            None => format!("Fetching: {}", format_bytes(self.read)),
        }
    }
}

/// `percent`% of `total`, at least 1. Computed in `u128` since `total` can
/// come straight from a server's `Content-Length`.
fn percent_of(total: u64, percent: u64) -> u64 {
    let value = u128::from(total) * u128::from(percent) / 100;
    u64::try_from(value).unwrap_or(u64::MAX).max(1)
}

/// Human-readable byte count using binary units
pub fn format_bytes(n: u64) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];
    if n < 1024 {
        return format!("{} B", n);
    }
    let mut value = n as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
