//! Wall-clock label formatting for date/time overlays.
//!
//! Callers hand in strftime-style format strings (`"%H:%M:%S"`); these are
//! expanded once into `time` format items. Specifiers without a mapping are
//! kept as literal text and logged as a warning — a cosmetic defect, never a
//! fatal one.

use time::OffsetDateTime;
use time::format_description::OwnedFormatItem;
use tracing::warn;

use crate::foundation::error::{VosdError, VosdResult};

/// A parsed date/time format, ready to expand against the wall clock.
#[derive(Debug)]
pub(crate) struct TimestampFormat {
    raw: String,
    items: OwnedFormatItem,
}

impl TimestampFormat {
    pub(crate) fn parse(fmt: &str) -> VosdResult<Self> {
        let translated = translate_strftime(fmt);
        let items = time::format_description::parse_owned::<2>(&translated).map_err(|e| {
            VosdError::configuration(format!("date/time format '{fmt}' is invalid: {e}"))
        })?;
        Ok(Self {
            raw: fmt.to_string(),
            items,
        })
    }

    pub(crate) fn raw(&self) -> &str {
        &self.raw
    }

    /// Format the current wall-clock time. Falls back to UTC when the local
    /// offset cannot be determined (multi-threaded processes on some libcs).
    pub(crate) fn now(&self) -> VosdResult<String> {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        now.format(&self.items)
            .map_err(|e| VosdError::internal(format!("format timestamp '{}': {e}", self.raw)))
    }
}

/// Expand the supported strftime specifiers into `time` format-description
/// syntax. Unknown specifiers survive as literals and are reported once per
/// parse via `tracing::warn!`.
fn translate_strftime(fmt: &str) -> String {
    let mut out = String::with_capacity(fmt.len() * 2);
    let mut unconsumed = Vec::new();
    let mut chars = fmt.chars();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            push_literal(&mut out, ch);
            continue;
        }
        let Some(spec) = chars.next() else {
            push_literal(&mut out, '%');
            break;
        };
        match spec {
            'H' => out.push_str("[hour]"),
            'I' => out.push_str("[hour repr:12]"),
            'M' => out.push_str("[minute]"),
            'S' => out.push_str("[second]"),
            'Y' => out.push_str("[year]"),
            'y' => out.push_str("[year repr:last_two]"),
            'm' => out.push_str("[month]"),
            'd' => out.push_str("[day]"),
            'j' => out.push_str("[ordinal]"),
            'p' => out.push_str("[period]"),
            'a' => out.push_str("[weekday repr:short]"),
            'A' => out.push_str("[weekday]"),
            'b' | 'h' => out.push_str("[month repr:short]"),
            'B' => out.push_str("[month repr:long]"),
            '%' => push_literal(&mut out, '%'),
            other => {
                unconsumed.push(other);
                push_literal(&mut out, '%');
                push_literal(&mut out, other);
            }
        }
    }

    if !unconsumed.is_empty() {
        warn!(
            format = fmt,
            specifiers = ?unconsumed,
            "date/time format contains unconsumed specifiers; kept as literal text"
        );
    }
    out
}

fn push_literal(out: &mut String, ch: char) {
    // '[' opens a component in format-description syntax; '\[' is the escape.
    if ch == '[' {
        out.push_str("\\[");
    } else {
        out.push(ch);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/timestamp.rs"]
mod tests;
