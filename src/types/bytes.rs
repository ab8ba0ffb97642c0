// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Human-readable byte counts.

use std::fmt;

/// A byte count rendered with decimal (SI) units.
///
/// Kilobytes are shown without decimals, megabytes with one and larger
/// units with two; trailing zeros are dropped. A value that rounds up to
/// 1000 is shown in the next unit.
///
/// # Examples
///
/// ```
/// use perisync_lib::types::ByteCount;
///
/// assert_eq!(ByteCount(0).to_string(), "Zero KB");
/// assert_eq!(ByteCount(100).to_string(), "100 bytes");
/// assert_eq!(ByteCount(12_000).to_string(), "12 KB");
/// assert_eq!(ByteCount(1_500_000).to_string(), "1.5 MB");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ByteCount(pub u64);

const KB: u64 = 1_000;
const MB: u64 = 1_000_000;
const GB: u64 = 1_000_000_000;
const TB: u64 = 1_000_000_000_000;

/// Units with the number of decimals shown for each, smallest first.
const UNITS: [(u64, &str, usize); 4] = [
    (KB, "KB", 0),
    (MB, "MB", 1),
    (GB, "GB", 2),
    (TB, "TB", 2),
];

impl fmt::Display for ByteCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0;
        match bytes {
            0 => write!(f, "Zero KB"),
            1 => write!(f, "1 byte"),
            2..KB => write!(f, "{bytes} bytes"),
            _ => {
                let mut index = UNITS
                    .iter()
                    .rposition(|&(unit, _, _)| bytes >= unit)
                    .unwrap_or(0);

                // Rounding may carry into the next unit (999.96 MB is 1 GB).
                loop {
                    let (unit, label, precision) = UNITS[index];
                    let text = scaled(bytes, unit, precision);
                    if integer_digits(&text) > 3 && index + 1 < UNITS.len() {
                        index += 1;
                        continue;
                    }
                    return write!(f, "{text} {label}");
                }
            }
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn scaled(bytes: u64, unit: u64, precision: usize) -> String {
    let value = bytes as f64 / unit as f64;
    let text = format!("{value:.precision$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

fn integer_digits(text: &str) -> usize {
    text.split('.').next().map_or(0, str::len)
}

impl From<u64> for ByteCount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
