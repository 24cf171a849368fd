// Connection quotes - estimates the one-time hookup cost for a new
// consumer from the straight-line distance to the nearest center.

use serde::Serialize;

use crate::centers::EnergyCenter;

/// Approximate coordinates for the cities the demo grid operates in.
/// Anything else falls back to a central default so a quote is always
/// producible.
const CITY_COORDS: [(&str, (f64, f64)); 4] = [
    ("Delhi", (28.7, 77.1)),
    ("Kolkata", (22.5, 88.3)),
    ("Chennai", (13.0, 80.2)),
    ("Mumbai", (19.0, 72.8)),
];

const DEFAULT_COORD: (f64, f64) = (20.0, 78.0);

/// One degree of latitude or longitude, in kilometres.
const KM_PER_DEGREE: f64 = 111.0;

const BASE_COST_HOUSEHOLD: f64 = 5_000.0;
const BASE_COST_INDUSTRY: f64 = 15_000.0;
const COST_PER_KM: f64 = 120.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionQuote {
    pub cost: f64,
    pub center_id: String,
    pub center_name: String,
    pub distance_km: f64,
}

fn city_coord(city: &str) -> (f64, f64) {
    CITY_COORDS
        .iter()
        .find(|(name, _)| *name == city)
        .map(|(_, coord)| *coord)
        .unwrap_or(DEFAULT_COORD)
}

/// Straight-line distance between two cities, rounded to whole kilometres.
/// Flat-plane approximation; close enough at demo-grid scale.
pub fn distance_km(city_a: &str, city_b: &str) -> f64 {
    let (lat_a, lon_a) = city_coord(city_a);
    let (lat_b, lon_b) = city_coord(city_b);
    let dy = (lat_a - lat_b) * KM_PER_DEGREE;
    let dx = (lon_a - lon_b) * KM_PER_DEGREE;
    (dy * dy + dx * dx).sqrt().round()
}

/// Quotes a connection for the given consumer type and city against the
/// nearest center. Industry connections carry a higher base charge; both
/// pay per kilometre on top. Returns `None` when no centers exist.
pub fn connection_quote(
    consumer_type: &str,
    city: &str,
    centers: &[EnergyCenter],
) -> Option<ConnectionQuote> {
    // Equidistant centers resolve to the later one in listing order.
    let nearest = centers.iter().reduce(|a, b| {
        if distance_km(city, &a.city) < distance_km(city, &b.city) {
            a
        } else {
            b
        }
    })?;

    let dist = distance_km(city, &nearest.city);
    let base = if consumer_type == "Industry" {
        BASE_COST_INDUSTRY
    } else {
        BASE_COST_HOUSEHOLD
    };

    Some(ConnectionQuote {
        cost: base + dist * COST_PER_KM,
        center_id: nearest.id.clone(),
        center_name: nearest.name.clone(),
        distance_km: dist,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center(id: &str, name: &str, city: &str) -> EnergyCenter {
        EnergyCenter {
            id: id.to_string(),
            name: name.to_string(),
            city: city.to_string(),
            stored: 1000.0,
            capacity: 2000.0,
        }
    }

    fn demo_centers() -> Vec<EnergyCenter> {
        vec![
            center("EC001", "SolarHub North", "Delhi"),
            center("EC002", "WindCore East", "Kolkata"),
            center("EC003", "BioGreen South", "Chennai"),
            center("EC004", "HydroBase West", "Mumbai"),
        ]
    }

    #[test]
    fn same_city_quote_is_the_base_cost() {
        let quote = connection_quote("Industry", "Delhi", &demo_centers()).unwrap();
        assert_eq!(quote.center_id, "EC001");
        assert_eq!(quote.distance_km, 0.0);
        assert_eq!(quote.cost, 15_000.0);

        let quote = connection_quote("Household", "Delhi", &demo_centers()).unwrap();
        assert_eq!(quote.cost, 5_000.0);
    }

    #[test]
    fn unknown_consumer_type_gets_the_household_base() {
        let quote = connection_quote("Farm", "Delhi", &demo_centers()).unwrap();
        assert_eq!(quote.cost, 5_000.0);
    }

    #[test]
    fn nearest_center_wins() {
        // Kolkata is its own center city; distance zero beats the rest.
        let quote = connection_quote("Household", "Kolkata", &demo_centers()).unwrap();
        assert_eq!(quote.center_id, "EC002");
        assert_eq!(quote.distance_km, 0.0);
    }

    #[test]
    fn unknown_city_uses_the_fallback_coordinate() {
        // From (20, 78): Mumbai at (19.0, 72.8) is the closest of the four,
        // sqrt((1.0 * 111)^2 + (5.2 * 111)^2) ~= 587.8 km.
        let quote = connection_quote("Household", "Bangalore", &demo_centers()).unwrap();
        assert_eq!(quote.center_id, "EC004");
        assert_eq!(quote.distance_km, 588.0);
        assert_eq!(quote.cost, 5_000.0 + 588.0 * 120.0);
    }

    #[test]
    fn distance_is_symmetric_and_rounded() {
        let there = distance_km("Delhi", "Mumbai");
        let back = distance_km("Mumbai", "Delhi");
        assert_eq!(there, back);
        assert_eq!(there.fract(), 0.0);
        // (9.7 * 111)^2 + (4.3 * 111)^2, square root rounded.
        assert_eq!(there, 1178.0);
    }

    #[test]
    fn tie_between_centers_picks_the_later_one() {
        let twins = vec![
            center("ECA", "Twin A", "Delhi"),
            center("ECB", "Twin B", "Delhi"),
        ];
        let quote = connection_quote("Household", "Delhi", &twins).unwrap();
        assert_eq!(quote.center_id, "ECB");
    }

    #[test]
    fn no_centers_means_no_quote() {
        assert!(connection_quote("Household", "Delhi", &[]).is_none());
    }
}
