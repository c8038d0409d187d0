//! Delivery speed versus review score

use crate::store::{DeliveryReview, Store};
use crate::{PortalError, Result};
use serde::Serialize;

/// Delivery windows as (label, exclusive lower bound, inclusive upper bound) in days
pub const DELIVERY_WINDOWS: [(&str, f64, f64); 4] = [
    ("Under 1 Week", 0.0, 7.0),
    ("1-2 Weeks", 7.0, 14.0),
    ("2-3 Weeks", 14.0, 21.0),
    ("Over 3 Weeks", 21.0, 30.0),
];

pub const MAX_DELIVERY_DAYS: f64 = 30.0;
pub const FAST_DELIVERY_DAYS: f64 = 7.0;
pub const LATE_DELIVERY_DAYS: f64 = 21.0;
pub const IDEAL_SCORE: f64 = 5.0;

/// Reviews with one score inside one delivery window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreCount {
    pub window: &'static str,
    pub score: u8,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperiencePanel {
    /// Every window × score 1..=5 cell, zero counts included
    pub counts: Vec<ScoreCount>,
    /// Pairs kept after the 0..=30 day filter
    pub sample_size: usize,
    pub fast_rating: Option<f64>,
    pub late_rating: Option<f64>,
    /// Late rating minus the ideal score
    pub late_gap: Option<f64>,
    pub goal_note: Option<String>,
    pub insight: String,
}

impl ExperiencePanel {
    pub fn window_total(&self, window: &str) -> usize {
        self.counts
            .iter()
            .filter(|c| c.window == window)
            .map(|c| c.count)
            .sum()
    }
}

/// Window label for a delivery time, `None` outside (0, 30]
pub fn delivery_window(days: f64) -> Option<&'static str> {
    DELIVERY_WINDOWS
        .iter()
        .find(|(_, lower, upper)| days > *lower && days <= *upper)
        .map(|(label, _, _)| *label)
}

pub fn summarise(pairs: &[DeliveryReview]) -> ExperiencePanel {
    let kept: Vec<&DeliveryReview> = pairs
        .iter()
        .filter(|p| p.delivery_days.is_finite() && p.review_score.is_finite())
        .filter(|p| (0.0..=MAX_DELIVERY_DAYS).contains(&p.delivery_days))
        .collect();

    let mut counts: Vec<ScoreCount> = DELIVERY_WINDOWS
        .iter()
        .flat_map(|&(window, _, _)| {
            (1..=5u8).map(move |score| ScoreCount {
                window,
                score,
                count: 0,
            })
        })
        .collect();

    for pair in &kept {
        let Some(window) = delivery_window(pair.delivery_days) else {
            continue;
        };
        let score = pair.review_score.round();
        if let Some(cell) = counts
            .iter_mut()
            .find(|c| c.window == window && f64::from(c.score) == score)
        {
            cell.count += 1;
        }
    }

    let fast_rating = mean_score(
        kept.iter()
            .filter(|p| p.delivery_days <= FAST_DELIVERY_DAYS)
            .map(|p| p.review_score),
    );
    let late_rating = mean_score(
        kept.iter()
            .filter(|p| p.delivery_days > LATE_DELIVERY_DAYS)
            .map(|p| p.review_score),
    );

    let first_window = DELIVERY_WINDOWS[0].0;
    let first_total: usize = counts
        .iter()
        .filter(|c| c.window == first_window)
        .map(|c| c.count)
        .sum();
    let goal_note = (first_total == 0)
        .then(|| format!("Operational Goal: 0 orders delivered {}", first_window.to_lowercase()));

    ExperiencePanel {
        sample_size: kept.len(),
        late_gap: late_rating.map(|late| late - IDEAL_SCORE),
        insight: insight(fast_rating, late_rating),
        counts,
        fast_rating,
        late_rating,
        goal_note,
    }
}

fn mean_score<I: IntoIterator<Item = f64>>(scores: I) -> Option<f64> {
    let (sum, n) = scores
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), score| (sum + score, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn insight(fast: Option<f64>, late: Option<f64>) -> String {
    match (fast, late) {
        (Some(fast), Some(late)) => format!(
            "Deliveries within a week average {fast:.2} stars, while deliveries over three weeks drop to {late:.2} stars."
        ),
        (Some(fast), None) => format!(
            "Deliveries within a week average {fast:.2} stars; no deliveries took over three weeks."
        ),
        (None, Some(late)) => format!(
            "No deliveries arrived within a week; deliveries over three weeks average {late:.2} stars."
        ),
        (None, None) => "Not enough delivered orders to compare delivery speed with ratings.".to_string(),
    }
}

pub fn build(store: &Store) -> Result<ExperiencePanel> {
    if store.review_count()? == 0 {
        return Err(PortalError::EmptyResult(
            "The reviews table is empty. Re-run the ingestion with the review export present.".to_string(),
        ));
    }

    let pairs = store.delivery_reviews()?;
    if pairs.is_empty() {
        return Err(PortalError::EmptyResult(
            "No delivered orders found to correlate with reviews.".to_string(),
        ));
    }
    Ok(summarise(&pairs))
}
