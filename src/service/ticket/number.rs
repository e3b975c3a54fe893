//! Ticket numbers: `TKT-<YYYYMMDD>-<NNNN>`, sequence restarting every day.
//!
//! Numbers are derived by reading the day's last number and adding one. The
//! read and the following insert are not atomic, so two concurrent creations
//! can compute the same number; the unique index on `tickets.ticket_number`
//! turns that into a conflict. A per-day atomic counter would be needed to
//! make the sequence gap- and collision-free.

use chrono::NaiveDate;
use tracing::warn;

pub const TICKET_PREFIX: &str = "TKT";
const SEQUENCE_WIDTH: usize = 4;

/// `TKT-20260115-`
pub fn day_prefix(date: NaiveDate) -> String {
    format!("{}-{}-", TICKET_PREFIX, date.format("%Y%m%d"))
}

/// Sequence part of `number` when it belongs to the day of `prefix`.
pub fn parse_sequence(number: &str, prefix: &str) -> Option<u32> {
    let tail = number.strip_prefix(prefix)?;
    if tail.len() < SEQUENCE_WIDTH || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tail.parse().ok()
}

/// Next number for `date` given the lexicographically last number of that day.
pub fn next_ticket_number(date: NaiveDate, last: Option<&str>) -> String {
    let prefix = day_prefix(date);

    let sequence = match last {
        None => 1,
        Some(last) => match parse_sequence(last, &prefix).and_then(|seq| seq.checked_add(1)) {
            Some(next) => next,
            None => {
                // restarting at 1 hides the bad row; the unique index catches a clash
                warn!(last_number = %last, "Malformed or exhausted ticket number, restarting sequence at 1");
                1
            }
        },
    };

    format!("{}{:0width$}", prefix, sequence, width = SEQUENCE_WIDTH)
}
