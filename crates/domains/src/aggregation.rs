//! Rating aggregate math.
//!
//! The store computes these figures in SQL; the same definitions live here so
//! that services, tests and alternative stores agree on them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::ProjectId;

/// The derived `average_rating` / `rating_count` pair stored on a project.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RatingAggregate {
    pub average_rating: f64,
    pub rating_count: i64,
}

impl RatingAggregate {
    /// Arithmetic mean and count; an empty set averages to 0.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        let (sum, count) = values
            .into_iter()
            .fold((0i64, 0i64), |(sum, count), v| (sum + i64::from(v), count + 1));
        Self::from_sum(sum, count)
    }

    fn from_sum(sum: i64, count: i64) -> Self {
        if count == 0 {
            return Self::default();
        }
        Self {
            average_rating: sum as f64 / count as f64,
            rating_count: count,
        }
    }
}

/// Aggregate plus a value → count histogram over every bucket 1..=5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingStats {
    pub project_id: ProjectId,
    pub average_rating: f64,
    pub total_ratings: i64,
    pub distribution: BTreeMap<i32, i64>,
}

impl RatingStats {
    /// Builds stats from `(value, count)` rows as produced by a GROUP BY.
    /// Buckets missing from the input are reported as zero; values outside
    /// 1..=5 are ignored.
    pub fn from_counts<I>(project_id: ProjectId, counts: I) -> Self
    where
        I: IntoIterator<Item = (i32, i64)>,
    {
        let mut distribution: BTreeMap<i32, i64> = (1..=5).map(|v| (v, 0)).collect();
        for (value, count) in counts {
            if let Some(bucket) = distribution.get_mut(&value) {
                *bucket += count;
            }
        }

        let total: i64 = distribution.values().sum();
        let sum: i64 = distribution
            .iter()
            .map(|(value, count)| i64::from(*value) * count)
            .sum();
        let aggregate = RatingAggregate::from_sum(sum, total);

        Self {
            project_id,
            average_rating: aggregate.average_rating,
            total_ratings: aggregate.rating_count,
            distribution,
        }
    }
}
