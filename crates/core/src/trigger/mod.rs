// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trigger model: the rules deciding when a job fires
//!
//! This module provides:
//! - **Trigger**: tagged union over the Cron, Date and Interval variants
//! - **CronExpr**: the cron field grammar used to validate and match fields
//! - **TriggerSpec**: the flat, user-editable field-set and its translation
//!   to and from [`Trigger`]

mod cron_field;
mod spec;



pub use cron_field::{CronExpr, CronField, CronPart};
pub use spec::{BuildContext, TriggerSpec};

use crate::error::SchedulerError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest interval period honoured, 1000 years
const MAX_PERIOD_SECS: u64 = 1_000 * 366 * 86_400;

/// Discriminant of a [`Trigger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerKind {
    Cron,
    Date,
    Interval,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::Cron => write!(f, "Cron"),
            TriggerKind::Date => write!(f, "Date"),
            TriggerKind::Interval => write!(f, "Interval"),
        }
    }
}

impl FromStr for TriggerKind {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cron" | "crontrigger" => Ok(TriggerKind::Cron),
            "date" | "datetrigger" => Ok(TriggerKind::Date),
            "interval" | "intervaltrigger" => Ok(TriggerKind::Interval),
            _ => Err(SchedulerError::InvalidTrigger(format!(
                "unknown trigger kind '{}'",
                s
            ))),
        }
    }
}

/// Calendar-field pattern trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronTrigger {
    pub year: String,
    pub month: String,
    pub week: String,
    pub day: String,
    pub day_of_week: String,
    pub hour: String,
    pub minute: String,
    pub second: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl CronTrigger {
    /// The raw expression of one field
    pub fn field(&self, field: CronField) -> &str {
        match field {
            CronField::Year => &self.year,
            CronField::Month => &self.month,
            CronField::Week => &self.week,
            CronField::Day => &self.day,
            CronField::DayOfWeek => &self.day_of_week,
            CronField::Hour => &self.hour,
            CronField::Minute => &self.minute,
            CronField::Second => &self.second,
        }
    }

    fn field_mut(&mut self, field: CronField) -> &mut String {
        match field {
            CronField::Year => &mut self.year,
            CronField::Month => &mut self.month,
            CronField::Week => &mut self.week,
            CronField::Day => &mut self.day,
            CronField::DayOfWeek => &mut self.day_of_week,
            CronField::Hour => &mut self.hour,
            CronField::Minute => &mut self.minute,
            CronField::Second => &mut self.second,
        }
    }

    /// Parse every field, in [`CronField::ALL`] order
    pub fn exprs(&self) -> Result<Vec<CronExpr>, SchedulerError> {
        CronField::ALL
            .iter()
            .map(|field| CronExpr::parse(*field, self.field(*field)))
            .collect()
    }
}

/// One-shot trigger firing at an absolute time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTrigger {
    pub run_date: DateTime<Utc>,
}

/// Fixed-period trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalTrigger {
    pub weeks: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl IntervalTrigger {
    /// Total period. A zero interval is treated as one second.
    pub fn period(&self) -> Duration {
        let secs = self
            .seconds
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.hours.saturating_mul(3_600))
            .saturating_add(self.days.saturating_mul(86_400))
            .saturating_add(self.weeks.saturating_mul(604_800));
        let secs = secs.clamp(1, MAX_PERIOD_SECS);
        Duration::seconds(secs as i64)
    }
}

/// The rule that decides when a job fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Trigger {
    Cron(CronTrigger),
    Date(DateTrigger),
    Interval(IntervalTrigger),
}

impl Trigger {
    pub fn kind(&self) -> TriggerKind {
        match self {
            Trigger::Cron(_) => TriggerKind::Cron,
            Trigger::Date(_) => TriggerKind::Date,
            Trigger::Interval(_) => TriggerKind::Interval,
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Cron(cron) => {
                let fields: Vec<String> = CronField::ALL
                    .iter()
                    .filter(|field| cron.field(**field) != "*")
                    .map(|field| format!("{}='{}'", field, cron.field(*field)))
                    .collect();
                write!(f, "cron[{}]", fields.join(", "))
            }
            Trigger::Date(date) => {
                write!(f, "date[{}]", date.run_date.format("%Y-%m-%d %H:%M:%S %Z"))
            }
            Trigger::Interval(interval) => {
                let secs = interval.period().num_seconds();
                write!(
                    f,
                    "interval[{}:{:02}:{:02}]",
                    secs / 3_600,
                    (secs % 3_600) / 60,
                    secs % 60
                )
            }
        }
    }
}
