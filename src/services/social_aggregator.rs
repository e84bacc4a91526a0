//! Social feed aggregation
//!
//! Classifies social posts by title keyword, collapses them to one row per
//! calendar day and adds exponentially decayed rolling means so that the
//! influence of an announcement fades over the following days.

use crate::models::indicators::calculate_weighted_ma;
use crate::models::{SocialPost, UpdateFlags, UpdateKind};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Default decay windows in days
pub const DEFAULT_DECAY_WINDOWS: [usize; 3] = [7, 14, 30];

/// Exponential window time constant
const DECAY_TAU: f64 = 1.0;

/// Aggregated social flags for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySocialRow {
    pub date: NaiveDate,
    pub flags: UpdateFlags,
    /// Decayed means aligned with `SocialTable::decay_columns`
    pub decayed: Vec<f64>,
}

/// Daily social features over a contiguous date range
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SocialTable {
    /// `{kind}_{window}_ma`, grouped by window then kind
    pub decay_columns: Vec<String>,
    pub rows: Vec<DailySocialRow>,
}

impl SocialTable {
    /// Build the table from raw posts, covering every day of both the posts
    /// and the given price dates
    pub fn build(posts: &[SocialPost], price_dates: &[NaiveDate], windows: &[usize]) -> Self {
        let mut table = Self {
            decay_columns: Vec::new(),
            rows: daily_flags(posts, price_dates),
        };
        for window in windows.iter().copied().filter(|w| *w > 0) {
            table.add_decay_window(window);
        }
        table
    }

    /// Append decayed means for one window to every row
    pub fn add_decay_window(&mut self, window: usize) {
        for kind in UpdateKind::ALL {
            let values: Vec<f64> = self
                .rows
                .iter()
                .map(|r| if r.flags.get(kind) { 1.0 } else { 0.0 })
                .collect();
            let decayed = calculate_weighted_ma(&values, window, DECAY_TAU);
            for (row, value) in self.rows.iter_mut().zip(decayed) {
                row.decayed.push(value.unwrap_or(0.0));
            }
            self.decay_columns.push(format!("{}_{}_ma", kind.column(), window));
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailySocialRow> {
        self.rows
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| &self.rows[i])
    }
}

/// One row per day from the earliest to the latest of posts and price dates
///
/// A day's flags are the OR of every post published that day.
pub fn daily_flags(posts: &[SocialPost], price_dates: &[NaiveDate]) -> Vec<DailySocialRow> {
    let mut by_date: BTreeMap<NaiveDate, UpdateFlags> = BTreeMap::new();
    for post in posts {
        by_date
            .entry(post.date())
            .or_default()
            .merge(UpdateFlags::from_title(post.title.as_deref()));
    }

    let bounds = by_date
        .keys()
        .copied()
        .chain(price_dates.iter().copied())
        .fold(None, |acc: Option<(NaiveDate, NaiveDate)>, d| match acc {
            None => Some((d, d)),
            Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
        });

    let Some((start, end)) = bounds else {
        return Vec::new();
    };

    info!(
        "Aggregating {} social posts over {} days ({} to {})",
        posts.len(),
        (end - start).num_days() + 1,
        start,
        end
    );

    start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| DailySocialRow {
            date,
            flags: by_date.get(&date).copied().unwrap_or_default(),
            decayed: Vec::new(),
        })
        .collect()
}
