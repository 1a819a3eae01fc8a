use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use triq_rides::Ride;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Passenger-facing ride search parameters. City filters are
/// case-insensitive substring matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RideFilter {
    pub departure: Option<String>,
    pub arrival: Option<String>,
    pub date: Option<NaiveDate>,
    pub page: Option<u32>,
}

impl RideFilter {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn offset(&self) -> i64 {
        ((self.page() - 1) * DEFAULT_PAGE_SIZE) as i64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RidePage {
    pub rides: Vec<Ride>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let filter = RideFilter::default();
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.offset(), 0);
    }

    #[test]
    fn test_offset_math() {
        let filter = RideFilter {
            page: Some(3),
            ..RideFilter::default()
        };
        assert_eq!(filter.offset(), 20);

        let zero = RideFilter {
            page: Some(0),
            ..RideFilter::default()
        };
        assert_eq!(zero.page(), 1);
    }
}
