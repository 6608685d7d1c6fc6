//! Tour Review Model

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::locale::{self, Language};
use crate::util::round2;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Review {
    pub id: i64,
    pub tour_id: i64,
    pub user_id: i64,
    /// 1..=5 stars
    pub rating: i32,
    pub comment: String,
    pub comment_th: Option<String>,
    pub comment_zh: Option<String>,
    pub created_at: i64,

    /// Reviewer display name (joined from users)
    #[cfg_attr(feature = "db", sqlx(default))]
    #[serde(default)]
    pub user_name: Option<String>,
}

impl Review {
    pub fn localize(&self, lang: Language) -> ReviewView {
        ReviewView {
            id: self.id,
            tour_id: self.tour_id,
            user_name: self.user_name.clone().unwrap_or_default(),
            rating: self.rating,
            comment: locale::pick(
                lang,
                &self.comment,
                self.comment_th.as_deref(),
                self.comment_zh.as_deref(),
            )
            .to_string(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewView {
    pub id: i64,
    pub tour_id: i64,
    pub user_name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewCreate {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(min = 1, max = 2000))]
    pub comment: String,
    #[validate(length(max = 2000))]
    pub comment_th: Option<String>,
    #[validate(length(max = 2000))]
    pub comment_zh: Option<String>,
}

/// Aggregate shown above a tour's reviews
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub count: u64,
    /// Mean rating, 2 dp (0 when there are no reviews)
    pub average: f64,
    /// `distribution[i]` = number of `i + 1` star reviews
    pub distribution: [u64; 5],
}

impl ReviewSummary {
    pub fn from_ratings(ratings: impl IntoIterator<Item = i32>) -> Self {
        let mut summary = Self::default();
        let mut sum = 0i64;
        for rating in ratings {
            if !(1..=5).contains(&rating) {
                continue;
            }
            summary.count += 1;
            summary.distribution[(rating - 1) as usize] += 1;
            sum += i64::from(rating);
        }
        if summary.count > 0 {
            summary.average = round2(sum as f64 / summary.count as f64);
        }
        summary
    }
}

/// Reviews of one tour plus their summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourReviews {
    pub summary: ReviewSummary,
    pub reviews: Vec<ReviewView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let summary = ReviewSummary::from_ratings([5, 4, 4, 1]);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.average, 3.5);
        assert_eq!(summary.distribution, [1, 0, 0, 2, 1]);

        let summary = ReviewSummary::from_ratings([5, 4, 4]);
        assert_eq!(summary.average, 4.33);
    }

    #[test]
    fn test_summary_empty() {
        let summary = ReviewSummary::from_ratings(Vec::new());
        assert_eq!(summary, ReviewSummary::default());
    }

    #[test]
    fn test_rating_bounds() {
        let mut create = ReviewCreate {
            rating: 5,
            comment: "Great guide".into(),
            comment_th: None,
            comment_zh: None,
        };
        assert!(create.validate().is_ok());
        create.rating = 6;
        assert!(create.validate().is_err());
        create.rating = 0;
        assert!(create.validate().is_err());
    }
}
