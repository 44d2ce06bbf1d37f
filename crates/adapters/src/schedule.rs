// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fire time computation
//!
//! All calendar arithmetic is done in UTC at whole-second resolution.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use jd_core::{CronExpr, CronField, CronTrigger, IntervalTrigger, Trigger};

/// Years searched ahead before a cron trigger is considered exhausted
const CRON_HORIZON_YEARS: i32 = 100;

/// Next time `trigger` fires, given the previous fire time (if any) and now.
///
/// `None` means the trigger will never fire again.
pub fn next_fire_time(
    trigger: &Trigger,
    previous: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match trigger {
        Trigger::Date(date) => match previous {
            None => Some(date.run_date),
            Some(_) => None,
        },
        Trigger::Interval(interval) => next_interval(interval, previous, now),
        Trigger::Cron(cron) => next_cron(cron, previous, now),
    }
}

fn next_interval(
    interval: &IntervalTrigger,
    previous: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let period = interval.period();
    let next = match (previous, interval.start_date) {
        (Some(previous), _) => previous + period,
        (None, Some(start)) if start >= now => start,
        (None, Some(start)) => {
            // First multiple of the period at or after now
            let elapsed = (now - start).num_seconds();
            let step = period.num_seconds();
            let periods = (elapsed + step - 1) / step;
            start + Duration::seconds(periods.saturating_mul(step))
        }
        (None, None) => now + period,
    };
    match interval.end_date {
        Some(end) if next > end => None,
        _ => Some(next),
    }
}

fn next_cron(
    cron: &CronTrigger,
    previous: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    // Triggers are validated on build, so a parse failure here means a
    // record from elsewhere; treat it as exhausted.
    let exprs = cron.exprs().ok()?;
    let matcher = CronMatcher::new(&exprs)?;

    let mut start = match previous {
        // Catch up from the previous fire time, but never repeat it
        Some(previous) => (previous + Duration::seconds(1))
            .min(now)
            .max(previous + Duration::nanoseconds(1)),
        None => now,
    };
    if let Some(start_date) = cron.start_date {
        start = start.max(start_date);
    }
    let start = ceil_to_second(start);

    let next = matcher.search(start)?;
    match cron.end_date {
        Some(end) if next > end => None,
        _ => Some(next),
    }
}

fn ceil_to_second(time: DateTime<Utc>) -> DateTime<Utc> {
    if time.nanosecond() == 0 {
        time
    } else {
        time.with_nanosecond(0).unwrap_or(time) + Duration::seconds(1)
    }
}

struct CronMatcher<'a> {
    year: &'a CronExpr,
    month: &'a CronExpr,
    day: &'a CronExpr,
    week: &'a CronExpr,
    day_of_week: &'a CronExpr,
    hour: &'a CronExpr,
    minute: &'a CronExpr,
    second: &'a CronExpr,
}

impl<'a> CronMatcher<'a> {
    fn new(exprs: &'a [CronExpr]) -> Option<Self> {
        let find = |field: CronField| exprs.iter().find(|e| e.field == field);
        Some(Self {
            year: find(CronField::Year)?,
            month: find(CronField::Month)?,
            day: find(CronField::Day)?,
            week: find(CronField::Week)?,
            day_of_week: find(CronField::DayOfWeek)?,
            hour: find(CronField::Hour)?,
            minute: find(CronField::Minute)?,
            second: find(CronField::Second)?,
        })
    }

    fn search(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let horizon = start.year().saturating_add(CRON_HORIZON_YEARS);
        let mut date = start.date_naive();
        let mut floor = Some(start.time());

        while date.year() <= horizon {
            if !self.year.matches(date.year() as u32, 0) {
                date = NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)?;
                floor = None;
                continue;
            }
            if !self.month.matches(date.month(), 0) {
                date = first_of_next_month(date)?;
                floor = None;
                continue;
            }
            if self.day_matches(date) {
                if let Some(time) = self.first_time(floor) {
                    return Some(Utc.from_utc_datetime(&date.and_time(time)));
                }
            }
            date = date.succ_opt()?;
            floor = None;
        }
        None
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        let last_day = days_in_month(date);
        self.day.matches(date.day(), last_day)
            && self.week.matches(date.iso_week().week(), last_day)
            && self
                .day_of_week
                .matches(date.weekday().num_days_from_monday(), last_day)
    }

    /// Earliest matching time of day at or after `floor`
    fn first_time(&self, floor: Option<NaiveTime>) -> Option<NaiveTime> {
        let (fh, fm, fs) = floor
            .map(|t| (t.hour(), t.minute(), t.second()))
            .unwrap_or((0, 0, 0));
        for hour in fh..24 {
            if !self.hour.matches(hour, 0) {
                continue;
            }
            let min_floor = if hour == fh { fm } else { 0 };
            for minute in min_floor..60 {
                if !self.minute.matches(minute, 0) {
                    continue;
                }
                let sec_floor = if hour == fh && minute == fm { fs } else { 0 };
                for second in sec_floor..60 {
                    if self.second.matches(second, 0) {
                        return NaiveTime::from_hms_opt(hour, minute, second);
                    }
                }
            }
        }
        None
    }
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
}

fn days_in_month(date: NaiveDate) -> u32 {
    first_of_next_month(date)
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
