use serde::{Deserialize, Serialize};

use crate::cities;

/// Marketplace pricing parameters. Amounts are integer cents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Base fare per kilometre.
    pub price_per_km_cents: i32,

    /// Floor applied to every ride.
    pub min_price_cents: i32,

    /// Share of the total that goes to the driver.
    pub driver_share_percent: i32,

    /// Share of the total kept by the platform.
    pub platform_share_percent: i32,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            price_per_km_cents: 50,
            min_price_cents: 2000,
            driver_share_percent: 80,
            platform_share_percent: 20,
        }
    }
}

impl PricingSettings {
    /// The two shares must cover the whole price, nothing more.
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.price_per_km_cents <= 0 || self.min_price_cents <= 0 {
            return Err(PricingError::InvalidSettings(
                "prices must be positive".to_string(),
            ));
        }
        if self.driver_share_percent < 1 || self.platform_share_percent < 1 {
            return Err(PricingError::InvalidSettings(
                "shares must be at least 1%".to_string(),
            ));
        }
        if self.driver_share_percent + self.platform_share_percent != 100 {
            return Err(PricingError::InvalidSplit {
                driver: self.driver_share_percent,
                platform: self.platform_share_percent,
            });
        }
        Ok(())
    }
}

/// A priced route: total fare plus its driver/platform split.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quote {
    pub distance_km: i32,
    pub price_cents: i32,
    pub driver_share_cents: i32,
    pub platform_share_cents: i32,
}

pub struct PricingEngine {
    settings: PricingSettings,
}

impl PricingEngine {
    pub fn new(settings: PricingSettings) -> Result<Self, PricingError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &PricingSettings {
        &self.settings
    }

    /// Price a known distance: per-km fare with a floor, then the split.
    /// The driver share rounds half-up; the platform takes the remainder so
    /// the two always sum to the total.
    pub fn quote_distance(&self, distance_km: i32) -> Result<Quote, PricingError> {
        if distance_km <= 0 {
            return Err(PricingError::InvalidDistance(distance_km));
        }

        let base = (distance_km as i64) * (self.settings.price_per_km_cents as i64);
        let price = base.max(self.settings.min_price_cents as i64);

        let driver = (price * (self.settings.driver_share_percent as i64) + 50) / 100;
        let platform = price - driver;

        Ok(Quote {
            distance_km,
            price_cents: price as i32,
            driver_share_cents: driver as i32,
            platform_share_cents: platform as i32,
        })
    }

    /// Price a city pair from the distance table.
    pub fn quote_route(&self, departure: &str, arrival: &str) -> Result<Quote, PricingError> {
        let distance = cities::distance_km(departure, arrival).ok_or_else(|| {
            PricingError::UnknownRoute {
                departure: departure.trim().to_string(),
                arrival: arrival.trim().to_string(),
            }
        })?;
        self.quote_distance(distance)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("No distance on record for {departure} -> {arrival}")]
    UnknownRoute { departure: String, arrival: String },

    #[error("Invalid distance: {0} km")]
    InvalidDistance(i32),

    #[error("Profit split must sum to 100% (driver {driver}%, platform {platform}%)")]
    InvalidSplit { driver: i32, platform: i32 },

    #[error("Invalid pricing settings: {0}")]
    InvalidSettings(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> PricingEngine {
        PricingEngine::new(PricingSettings::default()).unwrap()
    }

    #[test]
    fn test_per_km_pricing() {
        // Casablanca -> Rabat: 87 km * 50 = 4350 cents
        let quote = engine().quote_route("Casablanca", "Rabat").unwrap();
        assert_eq!(quote.distance_km, 87);
        assert_eq!(quote.price_cents, 4350);
        assert_eq!(quote.driver_share_cents, 3480);
        assert_eq!(quote.platform_share_cents, 870);
    }

    #[test]
    fn test_minimum_price_floor() {
        // Casablanca -> Mohammedia: 25 km * 50 = 1250, below the 2000 floor
        let quote = engine().quote_route("Casablanca", "Mohammedia").unwrap();
        assert_eq!(quote.price_cents, 2000);
        assert_eq!(quote.driver_share_cents, 1600);
        assert_eq!(quote.platform_share_cents, 400);
    }

    #[test]
    fn test_split_always_sums_to_total() {
        let settings = PricingSettings {
            driver_share_percent: 67,
            platform_share_percent: 33,
            ..PricingSettings::default()
        };
        let engine = PricingEngine::new(settings).unwrap();
        for km in [1, 7, 87, 337, 460] {
            let q = engine.quote_distance(km).unwrap();
            assert_eq!(q.driver_share_cents + q.platform_share_cents, q.price_cents);
        }
    }

    #[test]
    fn test_unknown_route_rejected() {
        let err = engine().quote_route("Casablanca", "Narnia").unwrap_err();
        assert!(matches!(err, PricingError::UnknownRoute { .. }));
    }

    #[test]
    fn test_split_must_sum_to_100() {
        let settings = PricingSettings {
            driver_share_percent: 80,
            platform_share_percent: 30,
            ..PricingSettings::default()
        };
        assert!(PricingEngine::new(settings).is_err());
    }
}
