/// Cities the marketplace serves. Route distances are a fixed lookup table,
/// not a geospatial computation.
pub const CITIES: &[&str] = &[
    "Casablanca",
    "Rabat",
    "Fès",
    "Tanger",
    "Marrakech",
    "Agadir",
    "Meknès",
    "Oujda",
    "Kénitra",
    "Tétouan",
    "El Jadida",
    "Safi",
    "Mohammedia",
    "Khouribga",
    "Béni Mellal",
    "Nador",
    "Taza",
    "Settat",
    "Berrechid",
    "Khémisset",
    "Larache",
    "Ksar El Kébir",
    "Essaouira",
    "Ouarzazate",
    "Chefchaouen",
];

/// Road distances in km between served city pairs. Stored one direction,
/// looked up symmetrically.
const DISTANCES_KM: &[(&str, &str, i32)] = &[
    ("Casablanca", "Rabat", 87),
    ("Casablanca", "Marrakech", 238),
    ("Casablanca", "Agadir", 460),
    ("Casablanca", "Fès", 295),
    ("Casablanca", "Tanger", 337),
    ("Rabat", "Fès", 207),
    ("Rabat", "Tanger", 250),
    ("Marrakech", "Agadir", 256),
    ("Fès", "Meknès", 65),
    ("Tanger", "Tétouan", 60),
    ("Casablanca", "El Jadida", 96),
    ("Rabat", "Kénitra", 40),
    ("Casablanca", "Mohammedia", 25),
    ("Fès", "Taza", 120),
    ("Marrakech", "Essaouira", 177),
    ("Casablanca", "Settat", 72),
    ("Agadir", "Essaouira", 173),
    ("Fès", "Oujda", 360),
    ("Rabat", "Meknès", 148),
    ("Marrakech", "Ouarzazate", 195),
];

fn city_eq(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Distance between two cities, in km. `None` when the pair is not served.
pub fn distance_km(departure: &str, arrival: &str) -> Option<i32> {
    DISTANCES_KM.iter().find_map(|(a, b, km)| {
        if (city_eq(a, departure) && city_eq(b, arrival))
            || (city_eq(a, arrival) && city_eq(b, departure))
        {
            Some(*km)
        } else {
            None
        }
    })
}

pub fn is_served(city: &str) -> bool {
    CITIES.iter().any(|c| city_eq(c, city))
}

/// Autocomplete helper: cities whose name contains `query`, case-insensitively.
pub fn matching_cities(query: &str) -> Vec<&'static str> {
    let needle = query.trim().to_lowercase();
    CITIES
        .iter()
        .copied()
        .filter(|c| c.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_symmetric() {
        assert_eq!(distance_km("Casablanca", "Rabat"), Some(87));
        assert_eq!(distance_km("Rabat", "Casablanca"), Some(87));
    }

    #[test]
    fn test_lookup_ignores_case_and_whitespace() {
        assert_eq!(distance_km(" casablanca ", "MARRAKECH"), Some(238));
    }

    #[test]
    fn test_unknown_pair() {
        assert_eq!(distance_km("Casablanca", "Chefchaouen"), None);
        assert_eq!(distance_km("Casablanca", "Atlantis"), None);
    }

    #[test]
    fn test_matching_cities() {
        let hits = matching_cities("ra");
        assert!(hits.contains(&"Rabat"));
        assert!(hits.contains(&"Marrakech"));
        assert!(!hits.contains(&"Fès"));
    }
}
