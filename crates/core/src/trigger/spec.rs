// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flat trigger field-set and its translation to and from [`Trigger`]

use super::{CronExpr, CronField, CronTrigger, DateTrigger, IntervalTrigger, Trigger, TriggerKind};
use crate::error::SchedulerError;
use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// User-editable trigger fields.
///
/// Which fields apply depends on the trigger kind:
///
/// | field                      | Cron | Date | Interval |
/// |----------------------------|------|------|----------|
/// | year, month                | yes  | yes  |          |
/// | week                       | yes  |      | yes      |
/// | day, hour, minute, second  | yes  | yes  | yes      |
/// | day_of_week                | yes  |      |          |
/// | start_date, end_date       | yes  |      | yes      |
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

/// Extra inputs for [`TriggerSpec::build`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildContext {
    /// Source of Date components the caller left unset, usually the job's
    /// current next run time
    pub fallback: Option<DateTime<Utc>>,
}

impl BuildContext {
    pub fn with_fallback(fallback: Option<DateTime<Utc>>) -> Self {
        Self { fallback }
    }
}

impl TriggerSpec {
    /// Extract the fields meaningful to the trigger's variant
    pub fn parse(trigger: &Trigger) -> Self {
        match trigger {
            Trigger::Cron(cron) => Self {
                year: Some(cron.year.clone()),
                month: Some(cron.month.clone()),
                week: Some(cron.week.clone()),
                day: Some(cron.day.clone()),
                day_of_week: Some(cron.day_of_week.clone()),
                hour: Some(cron.hour.clone()),
                minute: Some(cron.minute.clone()),
                second: Some(cron.second.clone()),
                start_date: cron.start_date,
                end_date: cron.end_date,
            },
            Trigger::Date(date) => {
                let run = date.run_date;
                Self {
                    year: Some(run.year().to_string()),
                    month: Some(run.month().to_string()),
                    day: Some(run.day().to_string()),
                    hour: Some(run.hour().to_string()),
                    minute: Some(run.minute().to_string()),
                    second: Some(run.second().to_string()),
                    ..Self::default()
                }
            }
            Trigger::Interval(interval) => Self {
                week: Some(interval.weeks.to_string()),
                day: Some(interval.days.to_string()),
                hour: Some(interval.hours.to_string()),
                minute: Some(interval.minutes.to_string()),
                second: Some(interval.seconds.to_string()),
                start_date: interval.start_date,
                end_date: interval.end_date,
                ..Self::default()
            },
        }
    }

    /// True when no field carries a value. Empty strings count as unset.
    pub fn is_empty(&self) -> bool {
        CronField::ALL.iter().all(|f| self.get(*f).is_none())
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    /// The trimmed, non-empty value of a field
    pub fn get(&self, field: CronField) -> Option<&str> {
        let raw = match field {
            CronField::Year => &self.year,
            CronField::Month => &self.month,
            CronField::Week => &self.week,
            CronField::Day => &self.day,
            CronField::DayOfWeek => &self.day_of_week,
            CronField::Hour => &self.hour,
            CronField::Minute => &self.minute,
            CronField::Second => &self.second,
        };
        raw.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    /// Build a trigger of `kind`. An empty field-set means "no change" and
    /// yields `Ok(None)`.
    pub fn build(
        &self,
        kind: TriggerKind,
        ctx: &BuildContext,
    ) -> Result<Option<Trigger>, SchedulerError> {
        if self.is_empty() {
            return Ok(None);
        }
        let trigger = match kind {
            TriggerKind::Cron => Trigger::Cron(self.build_cron()?),
            TriggerKind::Date => Trigger::Date(self.build_date(ctx)?),
            TriggerKind::Interval => Trigger::Interval(self.build_interval()?),
        };
        Ok(Some(trigger))
    }

    /// Like [`build`](Self::build), but an empty field-set is an error
    pub fn build_required(
        &self,
        kind: TriggerKind,
        ctx: &BuildContext,
    ) -> Result<Trigger, SchedulerError> {
        self.build(kind, ctx)?.ok_or_else(|| {
            SchedulerError::InvalidTrigger(format!("{} trigger requires at least one field", kind))
        })
    }

    fn build_cron(&self) -> Result<CronTrigger, SchedulerError> {
        let mut cron = CronTrigger {
            year: String::new(),
            month: String::new(),
            week: String::new(),
            day: String::new(),
            day_of_week: String::new(),
            hour: String::new(),
            minute: String::new(),
            second: String::new(),
            start_date: self.start_date,
            end_date: self.end_date,
        };

        // Unset fields above the least significant explicit field match
        // anything, unset fields below it take their minimum.
        let last_explicit = CronField::ALL
            .iter()
            .rposition(|field| self.get(*field).is_some());
        for (idx, field) in CronField::ALL.iter().enumerate() {
            let expr = match self.get(*field) {
                Some(value) => value,
                None if last_explicit.is_some_and(|last| idx > last) => field.default_expr(),
                None => "*",
            };
            CronExpr::parse(*field, expr)?;
            *cron.field_mut(*field) = expr.to_string();
        }

        if let (Some(start), Some(end)) = (cron.start_date, cron.end_date) {
            if end < start {
                return Err(SchedulerError::InvalidTrigger(
                    "end_date is before start_date".to_string(),
                ));
            }
        }
        Ok(cron)
    }

    fn build_date(&self, ctx: &BuildContext) -> Result<DateTrigger, SchedulerError> {
        self.reject_fields(
            TriggerKind::Date,
            &[CronField::Week, CronField::DayOfWeek],
            true,
        )?;

        // Explicit value, then the fallback's component, then a default
        let component = |field: CronField,
                         from_fallback: fn(&DateTime<Utc>) -> u32,
                         default: Option<u32>|
         -> Result<u32, SchedulerError> {
            if let Some(raw) = self.get(field) {
                return raw.parse::<u32>().map_err(|_| {
                    SchedulerError::InvalidTrigger(format!(
                        "{} must be a non-negative integer, got '{}'",
                        field, raw
                    ))
                });
            }
            if let Some(fallback) = &ctx.fallback {
                return Ok(from_fallback(fallback));
            }
            default.ok_or_else(|| {
                SchedulerError::InvalidTrigger(format!("Date trigger requires {}", field))
            })
        };

        let year = component(CronField::Year, |d| d.year() as u32, None)?;
        let month = component(CronField::Month, |d| d.month(), None)?;
        let day = component(CronField::Day, |d| d.day(), None)?;
        let hour = component(CronField::Hour, |d| d.hour(), Some(0))?;
        let minute = component(CronField::Minute, |d| d.minute(), Some(0))?;
        let second = component(CronField::Second, |d| d.second(), Some(0))?;

        let year = i32::try_from(year)
            .map_err(|_| SchedulerError::InvalidTrigger(format!("year {} out of range", year)))?;
        let run_date = Utc
            .with_ymd_and_hms(year, month, day, hour, minute, second)
            .single()
            .ok_or_else(|| {
                SchedulerError::InvalidTrigger(format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02} is not a valid date",
                    year, month, day, hour, minute, second
                ))
            })?;
        Ok(DateTrigger { run_date })
    }

    fn build_interval(&self) -> Result<IntervalTrigger, SchedulerError> {
        self.reject_fields(
            TriggerKind::Interval,
            &[CronField::Year, CronField::Month, CronField::DayOfWeek],
            false,
        )?;

        let count = |field: CronField| -> Result<u64, SchedulerError> {
            let Some(raw) = self.get(field) else {
                return Ok(0);
            };
            let value = raw.parse::<i64>().map_err(|_| {
                SchedulerError::InvalidTrigger(format!(
                    "{} must be an integer, got '{}'",
                    field, raw
                ))
            })?;
            u64::try_from(value).map_err(|_| {
                SchedulerError::InvalidTrigger(format!("{} must not be negative", field))
            })
        };

        let interval = IntervalTrigger {
            weeks: count(CronField::Week)?,
            days: count(CronField::Day)?,
            hours: count(CronField::Hour)?,
            minutes: count(CronField::Minute)?,
            seconds: count(CronField::Second)?,
            start_date: self.start_date,
            end_date: self.end_date,
        };
        if let (Some(start), Some(end)) = (interval.start_date, interval.end_date) {
            if end < start {
                return Err(SchedulerError::InvalidTrigger(
                    "end_date is before start_date".to_string(),
                ));
            }
        }
        Ok(interval)
    }

    fn reject_fields(
        &self,
        kind: TriggerKind,
        fields: &[CronField],
        reject_bounds: bool,
    ) -> Result<(), SchedulerError> {
        if let Some(field) = fields.iter().find(|f| self.get(**f).is_some()) {
            return Err(SchedulerError::InvalidTrigger(format!(
                "{} is not available for {} trigger",
                field, kind
            )));
        }
        if reject_bounds && (self.start_date.is_some() || self.end_date.is_some()) {
            return Err(SchedulerError::InvalidTrigger(format!(
                "start_date/end_date are not available for {} trigger",
                kind
            )));
        }
        Ok(())
    }
}
