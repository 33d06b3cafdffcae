//! Duration literals for timer values.
//!
//! A duration literal is a compound of days, hours, minutes, seconds and
//! milliseconds, optionally signed, such as `T#1D2H3M4S5MS`. Internally a
//! duration is always a millisecond count.
use core::fmt;

use s7gen_problems::Problem;
use time::Duration;

use crate::core::SourceSpan;
use crate::diagnostic::{Diagnostic, Label};

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// The units of a compound duration literal, largest first.
const UNITS: [(&str, i64); 5] = [
    ("D", MILLIS_PER_DAY),
    ("H", MILLIS_PER_HOUR),
    ("M", MILLIS_PER_MINUTE),
    ("S", MILLIS_PER_SECOND),
    ("MS", 1),
];

#[derive(Debug, PartialEq, Clone)]
pub struct TimeLiteral {
    pub span: SourceSpan,
    pub interval: Duration,
}

impl TimeLiteral {
    /// Create a new `TimeLiteral` with the given number of milliseconds.
    pub fn from_milliseconds(millis: i64, span: SourceSpan) -> Self {
        Self {
            span,
            interval: Duration::milliseconds(millis),
        }
    }

    /// The whole number of milliseconds in the duration.
    pub fn milliseconds(&self) -> i64 {
        self.interval.whole_milliseconds() as i64
    }

    /// Parses a compound duration literal into a millisecond count.
    ///
    /// Accepts an optional `T#` or `TIME#` prefix, an optional sign, and
    /// unit parts in descending order with each unit at most once.
    /// Underscores between parts are allowed.
    pub fn parse(input: &str, span: SourceSpan) -> Result<Self, Diagnostic> {
        let invalid = || {
            Diagnostic::problem(
                Problem::InvalidTimeLiteral,
                Label::span(span.clone(), "duration literal"),
            )
            .with_context("value", input)
        };

        let mut text: String = input.trim().to_uppercase();
        for prefix in ["TIME#", "T#"] {
            if let Some(stripped) = text.strip_prefix(prefix) {
                text = stripped.to_string();
                break;
            }
        }

        let negative = text.starts_with('-');
        if negative {
            text = text[1..].to_string();
        }
        let text: String = text.chars().filter(|c| *c != '_').collect();
        if text.is_empty() {
            return Err(invalid());
        }

        let mut millis: i64 = 0;
        let mut next_unit = 0;
        let mut rest = text.as_str();
        while !rest.is_empty() {
            let digits_end = rest
                .find(|c: char| !c.is_ascii_digit())
                .ok_or_else(invalid)?;
            if digits_end == 0 {
                return Err(invalid());
            }
            let value = rest[..digits_end].parse::<i64>().map_err(|_e| invalid())?;
            rest = &rest[digits_end..];

            // Units must appear largest-first and at most once. MS must be
            // matched before M.
            let unit_end = rest
                .find(|c: char| c.is_ascii_digit())
                .unwrap_or(rest.len());
            let unit = &rest[..unit_end];
            rest = &rest[unit_end..];

            let position = UNITS[next_unit..]
                .iter()
                .position(|(name, _)| *name == unit)
                .ok_or_else(invalid)?;
            let (_, unit_millis) = UNITS[next_unit + position];
            next_unit += position + 1;

            millis = value
                .checked_mul(unit_millis)
                .and_then(|part| millis.checked_add(part))
                .ok_or_else(|| {
                    Diagnostic::problem(
                        Problem::ValueOutOfRange,
                        Label::span(span.clone(), "duration literal"),
                    )
                    .with_context("value", input)
                })?;
        }

        if negative {
            millis = -millis;
        }
        Ok(Self::from_milliseconds(millis, span))
    }
}

impl fmt::Display for TimeLiteral {
    /// Formats the millisecond count back into the largest-unit-first
    /// compound literal, omitting zero parts. A zero duration is `T#0MS`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut millis = self.milliseconds();
        f.write_str("T#")?;
        if millis < 0 {
            f.write_str("-")?;
            millis = -millis;
        }
        if millis == 0 {
            return f.write_str("0MS");
        }
        for (name, unit_millis) in UNITS {
            let value = millis / unit_millis;
            if value != 0 {
                write!(f, "{}{}", value, name)?;
                millis -= value * unit_millis;
            }
        }
        Ok(())
    }
}
