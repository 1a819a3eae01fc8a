use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatingCriterion {
    General,
    Punctuality,
    Comfort,
    Cleanliness,
    Communication,
    Driving,
}

impl RatingCriterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingCriterion::General => "GENERAL",
            RatingCriterion::Punctuality => "PUNCTUALITY",
            RatingCriterion::Comfort => "COMFORT",
            RatingCriterion::Cleanliness => "CLEANLINESS",
            RatingCriterion::Communication => "COMMUNICATION",
            RatingCriterion::Driving => "DRIVING",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GENERAL" => Some(RatingCriterion::General),
            "PUNCTUALITY" => Some(RatingCriterion::Punctuality),
            "COMFORT" => Some(RatingCriterion::Comfort),
            "CLEANLINESS" => Some(RatingCriterion::Cleanliness),
            "COMMUNICATION" => Some(RatingCriterion::Communication),
            "DRIVING" => Some(RatingCriterion::Driving),
            _ => None,
        }
    }
}

/// A per-criterion score one participant gives another for a ride.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub ride_id: Uuid,
    pub criterion: RatingCriterion,
    pub score: i32,
    pub comment: Option<String>,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        from_user_id: Uuid,
        to_user_id: Uuid,
        ride_id: Uuid,
        criterion: RatingCriterion,
        score: i32,
        comment: Option<String>,
        is_anonymous: bool,
    ) -> Result<Self, RatingError> {
        if !(1..=5).contains(&score) {
            return Err(RatingError::InvalidScore(score));
        }
        if from_user_id == to_user_id {
            return Err(RatingError::SelfRating);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            from_user_id,
            to_user_id,
            ride_id,
            criterion,
            score,
            comment,
            is_anonymous,
            created_at: Utc::now(),
        })
    }

    /// Uniqueness key: one score per rater/ratee/ride/criterion.
    pub fn key(&self) -> (Uuid, Uuid, Uuid, RatingCriterion) {
        (self.from_user_id, self.to_user_id, self.ride_id, self.criterion)
    }
}

/// The profile-level aggregate recomputed whenever a rating lands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingAggregate {
    pub average: f64,
    pub count: i32,
}

/// Average over every rating a user has received, across all criteria.
pub fn aggregate(scores: &[i32]) -> RatingAggregate {
    if scores.is_empty() {
        return RatingAggregate {
            average: 0.0,
            count: 0,
        };
    }
    let sum: i64 = scores.iter().map(|s| *s as i64).sum();
    RatingAggregate {
        average: sum as f64 / scores.len() as f64,
        count: scores.len() as i32,
    }
}

/// In-memory rating set enforcing the uniqueness invariant; the store mirrors
/// it with a composite unique index.
pub struct RatingBook {
    ratings: Vec<Rating>,
    keys: HashSet<(Uuid, Uuid, Uuid, RatingCriterion)>,
}

impl RatingBook {
    pub fn new() -> Self {
        Self {
            ratings: Vec::new(),
            keys: HashSet::new(),
        }
    }

    pub fn add(&mut self, rating: Rating) -> Result<RatingAggregate, RatingError> {
        if !self.keys.insert(rating.key()) {
            return Err(RatingError::Duplicate {
                criterion: rating.criterion.as_str().to_string(),
            });
        }
        let to_user = rating.to_user_id;
        self.ratings.push(rating);
        Ok(self.aggregate_for(to_user))
    }

    pub fn aggregate_for(&self, user_id: Uuid) -> RatingAggregate {
        let scores: Vec<i32> = self
            .ratings
            .iter()
            .filter(|r| r.to_user_id == user_id)
            .map(|r| r.score)
            .collect();
        aggregate(&scores)
    }

    pub fn received_by(&self, user_id: Uuid) -> Vec<&Rating> {
        self.ratings
            .iter()
            .filter(|r| r.to_user_id == user_id)
            .collect()
    }
}

impl Default for RatingBook {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RatingError {
    #[error("Score must be between 1 and 5, got {0}")]
    InvalidScore(i32),

    #[error("Users cannot rate themselves")]
    SelfRating,

    #[error("Already rated this criterion ({criterion}) for this ride")]
    Duplicate { criterion: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(from: Uuid, to: Uuid, ride: Uuid, criterion: RatingCriterion, score: i32) -> Rating {
        Rating::new(from, to, ride, criterion, score, None, false).unwrap()
    }

    #[test]
    fn test_score_bounds() {
        let (a, b, ride) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        assert!(Rating::new(a, b, ride, RatingCriterion::General, 0, None, false).is_err());
        assert!(Rating::new(a, b, ride, RatingCriterion::General, 6, None, false).is_err());
        assert!(Rating::new(a, b, ride, RatingCriterion::General, 5, None, false).is_ok());
    }

    #[test]
    fn test_self_rating_rejected() {
        let a = Uuid::new_v4();
        let err =
            Rating::new(a, a, Uuid::new_v4(), RatingCriterion::General, 4, None, false).unwrap_err();
        assert!(matches!(err, RatingError::SelfRating));
    }

    #[test]
    fn test_duplicate_criterion_rejected() {
        let (a, b, ride) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut book = RatingBook::new();

        book.add(rating(a, b, ride, RatingCriterion::Driving, 5)).unwrap();
        let err = book
            .add(rating(a, b, ride, RatingCriterion::Driving, 3))
            .unwrap_err();
        assert!(matches!(err, RatingError::Duplicate { .. }));

        // Different criterion on the same ride is fine.
        book.add(rating(a, b, ride, RatingCriterion::Comfort, 4)).unwrap();
        // Same criterion from the other direction is fine too.
        book.add(rating(b, a, ride, RatingCriterion::Driving, 5)).unwrap();
    }

    #[test]
    fn test_aggregate_recomputed_on_add() {
        let (a, c, ride) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let b = Uuid::new_v4();
        let mut book = RatingBook::new();

        let agg = book.add(rating(a, b, ride, RatingCriterion::General, 5)).unwrap();
        assert_eq!(agg.count, 1);
        assert!((agg.average - 5.0).abs() < f64::EPSILON);

        let agg = book.add(rating(c, b, ride, RatingCriterion::General, 2)).unwrap();
        assert_eq!(agg.count, 2);
        assert!((agg.average - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_aggregate() {
        let agg = aggregate(&[]);
        assert_eq!(agg.count, 0);
        assert_eq!(agg.average, 0.0);
    }
}
