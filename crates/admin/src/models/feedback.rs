//! Feedback board grouping and statistics.

use rust_decimal::Decimal;

use halwa_core::{Feedback, Sentiment};

/// Totals shown above the feedback board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedbackSummary {
    pub total: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub contact: usize,
    /// Mean rating of reviews to one decimal place; `None` with no reviews.
    pub average_rating: Option<Decimal>,
}

/// Reviews split by sentiment plus unrated contact messages, each keeping
/// the input order.
#[derive(Debug, Clone, Default)]
pub struct FeedbackGroups {
    pub positive: Vec<Feedback>,
    pub neutral: Vec<Feedback>,
    pub negative: Vec<Feedback>,
    pub contact: Vec<Feedback>,
}

impl FeedbackGroups {
    /// Split a newest-first listing into the four groups.
    #[must_use]
    pub fn split(feedbacks: Vec<Feedback>) -> Self {
        let mut groups = Self::default();
        for feedback in feedbacks {
            match feedback.sentiment() {
                Some(Sentiment::Positive) => groups.positive.push(feedback),
                Some(Sentiment::Neutral) => groups.neutral.push(feedback),
                Some(Sentiment::Negative) => groups.negative.push(feedback),
                None => groups.contact.push(feedback),
            }
        }
        groups
    }

    /// Counts across all groups; the average covers rated reviews only.
    #[must_use]
    pub fn summary(&self) -> FeedbackSummary {
        let rated = self.positive.len() + self.neutral.len() + self.negative.len();
        let rating_sum: u32 = self
            .positive
            .iter()
            .chain(&self.neutral)
            .chain(&self.negative)
            .filter_map(|f| f.rating)
            .map(|r| u32::from(r.value()))
            .sum();

        let average_rating = u32::try_from(rated)
            .ok()
            .filter(|&n| n > 0)
            .map(|n| (Decimal::from(rating_sum) / Decimal::from(n)).round_dp(1));

        FeedbackSummary {
            total: rated + self.contact.len(),
            positive: self.positive.len(),
            neutral: self.neutral.len(),
            negative: self.negative.len(),
            contact: self.contact.len(),
            average_rating,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use halwa_core::{FeedbackId, FeedbackSource, FeedbackStatus, Rating};

    use super::*;

    fn feedback(id: i32, rating: i32) -> Feedback {
        Feedback {
            id: FeedbackId::new(id),
            rating: Some(Rating::new(rating).unwrap()),
            message: format!("message {id}"),
            name: None,
            email: None,
            phone: None,
            source: FeedbackSource::Review,
            status: FeedbackStatus::New,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_split_keeps_order_within_group() {
        let groups = FeedbackGroups::split(vec![
            feedback(5, 5),
            feedback(4, 1),
            feedback(3, 4),
            feedback(2, 3),
            feedback(1, 2),
        ]);

        let ids = |list: &[Feedback]| list.iter().map(|f| f.id.as_i32()).collect::<Vec<_>>();
        assert_eq!(ids(&groups.positive), vec![5, 3]);
        assert_eq!(ids(&groups.neutral), vec![2]);
        assert_eq!(ids(&groups.negative), vec![4, 1]);
    }

    #[test]
    fn test_summary_average_rounds_to_one_place() {
        let groups = FeedbackGroups::split(vec![feedback(1, 5), feedback(2, 4), feedback(3, 4)]);
        let summary = groups.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.positive, 3);
        assert_eq!(summary.average_rating.unwrap().to_string(), "4.3");
    }

    fn contact(id: i32) -> Feedback {
        Feedback {
            rating: None,
            email: Some("asha@example.com".to_string()),
            source: FeedbackSource::Contact,
            ..feedback(id, 1)
        }
    }

    #[test]
    fn test_contact_messages_stay_out_of_ratings() {
        let groups = FeedbackGroups::split(vec![feedback(1, 5), contact(2)]);
        assert_eq!(groups.contact.len(), 1);
        assert!(groups.neutral.is_empty());

        let summary = groups.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.positive, 1);
        assert_eq!(summary.neutral, 0);
        assert_eq!(summary.contact, 1);
        assert_eq!(summary.average_rating.unwrap().to_string(), "5");
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = FeedbackGroups::default().summary();
        assert_eq!(summary, FeedbackSummary::default());
        assert!(summary.average_rating.is_none());
    }
}
