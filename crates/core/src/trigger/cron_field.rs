// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron field grammar
//!
//! Each field accepts a comma separated list of parts:
//! `*`, `*/step`, `n`, `a-b`, `a-b/step`, `n/step`, plus month names
//! (`jan`..`dec`), weekday names (`mon`..`sun`, Monday is 0) and `last`
//! for the day of month.

use crate::error::SchedulerError;
use serde::{Deserialize, Serialize};
use std::fmt;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const WEEKDAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// One of the cron calendar fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CronField {
    Year,
    Month,
    Week,
    Day,
    DayOfWeek,
    Hour,
    Minute,
    Second,
}

impl CronField {
    /// Fields from most to least significant
    pub const ALL: [CronField; 8] = [
        CronField::Year,
        CronField::Month,
        CronField::Day,
        CronField::Week,
        CronField::DayOfWeek,
        CronField::Hour,
        CronField::Minute,
        CronField::Second,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CronField::Year => "year",
            CronField::Month => "month",
            CronField::Week => "week",
            CronField::Day => "day",
            CronField::DayOfWeek => "day_of_week",
            CronField::Hour => "hour",
            CronField::Minute => "minute",
            CronField::Second => "second",
        }
    }

    /// Inclusive value range
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            CronField::Year => (1970, 9999),
            CronField::Month => (1, 12),
            CronField::Week => (1, 53),
            CronField::Day => (1, 31),
            CronField::DayOfWeek => (0, 6),
            CronField::Hour => (0, 23),
            CronField::Minute | CronField::Second => (0, 59),
        }
    }

    /// Value used for an unset field below the least significant explicit one
    pub fn default_expr(&self) -> &'static str {
        match self {
            CronField::Year | CronField::Week | CronField::DayOfWeek => "*",
            CronField::Month | CronField::Day => "1",
            CronField::Hour | CronField::Minute | CronField::Second => "0",
        }
    }

    fn names(&self) -> &'static [&'static str] {
        match self {
            CronField::Month => &MONTHS,
            CronField::DayOfWeek => &WEEKDAYS,
            _ => &[],
        }
    }

    fn parse_value(&self, raw: &str) -> Result<u32, SchedulerError> {
        let lower = raw.trim().to_ascii_lowercase();
        let (min, max) = self.bounds();
        let value = if let Some(pos) = self.names().iter().position(|n| *n == lower) {
            // month names are 1-based, weekday names 0-based
            let offset = if *self == CronField::Month { 1 } else { 0 };
            pos as u32 + offset
        } else {
            lower.parse::<u32>().map_err(|_| {
                SchedulerError::InvalidTrigger(format!(
                    "invalid value '{}' for field '{}'",
                    raw, self
                ))
            })?
        };
        if value < min || value > max {
            return Err(SchedulerError::InvalidTrigger(format!(
                "value {} is out of range for field '{}' ({}-{})",
                value, self, min, max
            )));
        }
        Ok(value)
    }
}

impl fmt::Display for CronField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One comma separated part of a field expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CronPart {
    /// `*` or `*/step`
    All { step: u32 },
    /// `n`, `a-b`, `a-b/step` or `n/step`
    Range { start: u32, end: u32, step: u32 },
    /// `last`: last day of the month
    Last,
}

/// A validated field expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpr {
    pub field: CronField,
    pub parts: Vec<CronPart>,
}

impl CronExpr {
    pub fn parse(field: CronField, expr: &str) -> Result<Self, SchedulerError> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(SchedulerError::InvalidTrigger(format!(
                "empty expression for field '{}'",
                field
            )));
        }

        let parts = expr
            .split(',')
            .map(|part| parse_part(field, part.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { field, parts })
    }

    /// Whether `value` satisfies the expression. `last_day` is the number of
    /// days in the month being matched and is only used by `last`.
    pub fn matches(&self, value: u32, last_day: u32) -> bool {
        let (min, _) = self.field.bounds();
        self.parts.iter().any(|part| match part {
            CronPart::All { step } => value >= min && (value - min) % step == 0,
            CronPart::Range { start, end, step } => {
                value >= *start && value <= *end && (value - start) % step == 0
            }
            CronPart::Last => value == last_day,
        })
    }

    /// Whether the expression places no restriction on its field
    pub fn is_wildcard(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, CronPart::All { step: 1 }))
    }
}

fn parse_part(field: CronField, part: &str) -> Result<CronPart, SchedulerError> {
    let invalid = |reason: &str| {
        SchedulerError::InvalidTrigger(format!(
            "invalid expression '{}' for field '{}': {}",
            part, field, reason
        ))
    };

    if part.is_empty() {
        return Err(invalid("empty list element"));
    }
    if part.eq_ignore_ascii_case("last") {
        return match field {
            CronField::Day => Ok(CronPart::Last),
            _ => Err(invalid("'last' is only valid for the day field")),
        };
    }

    let (body, step) = match part.split_once('/') {
        Some((body, step)) => {
            let step = step
                .trim()
                .parse::<u32>()
                .map_err(|_| invalid("step is not a number"))?;
            if step == 0 {
                return Err(invalid("step must be higher than 0"));
            }
            (body.trim(), Some(step))
        }
        None => (part, None),
    };

    let (min, max) = field.bounds();
    if body == "*" {
        let step = step.unwrap_or(1);
        if step > max - min + 1 {
            return Err(invalid("step is higher than the field range"));
        }
        return Ok(CronPart::All { step });
    }

    let (start, end) = match body.split_once('-') {
        Some((start, end)) => (field.parse_value(start)?, field.parse_value(end)?),
        None => {
            let value = field.parse_value(body)?;
            // `n/step` runs from n to the end of the range
            let end = if step.is_some() { max } else { value };
            (value, end)
        }
    };
    if start > end {
        return Err(invalid("range start is after range end"));
    }
    let step = step.unwrap_or(1);
    if step > 1 && step > end - start {
        return Err(invalid("step is higher than the total range"));
    }
    Ok(CronPart::Range { start, end, step })
}
