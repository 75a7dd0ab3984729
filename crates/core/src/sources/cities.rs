//! Major US cities for the regional map.
//!
//! The regional map labels readings by the city they stand for rather than by
//! airport or station name. Targets are the largest cities within a radius of
//! the configured point; each one takes the nearest station reading.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::feed::StationReading;

/// Mean earth radius in miles.
const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Population floors tried in turn until some city falls inside the radius.
const POPULATION_CUTOFFS: [u32; 6] = [150_000, 100_000, 50_000, 25_000, 10_000, 0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MajorCity {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub population: u32,
}

const fn city(name: &'static str, latitude: f64, longitude: f64, population: u32) -> MajorCity {
    MajorCity {
        name,
        latitude,
        longitude,
        population,
    }
}

/// Sorted by population, largest first.
pub static MAJOR_CITIES: &[MajorCity] = &[
    city("New York", 40.7128, -74.0060, 8_336_817),
    city("Los Angeles", 34.0522, -118.2437, 3_979_576),
    city("Chicago", 41.8781, -87.6298, 2_693_976),
    city("Houston", 29.7604, -95.3698, 2_320_268),
    city("Phoenix", 33.4484, -112.0740, 1_680_992),
    city("Philadelphia", 39.9526, -75.1652, 1_584_064),
    city("San Antonio", 29.4241, -98.4936, 1_547_253),
    city("San Diego", 32.7157, -117.1611, 1_423_851),
    city("Dallas", 32.7767, -96.7970, 1_343_573),
    city("San Jose", 37.3382, -121.8863, 1_021_795),
    city("Austin", 30.2672, -97.7431, 978_908),
    city("Jacksonville", 30.3322, -81.6557, 911_507),
    city("Fort Worth", 32.7555, -97.3308, 909_585),
    city("Columbus", 39.9612, -82.9988, 898_553),
    city("Charlotte", 35.2271, -80.8431, 885_708),
    city("San Francisco", 37.7749, -122.4194, 881_549),
    city("Indianapolis", 39.7684, -86.1581, 876_384),
    city("Seattle", 47.6062, -122.3321, 753_675),
    city("Denver", 39.7392, -104.9903, 727_211),
    city("Washington", 38.9072, -77.0369, 705_749),
    city("Boston", 42.3601, -71.0589, 692_600),
    city("El Paso", 31.7619, -106.4850, 681_728),
    city("Nashville", 36.1627, -86.7816, 670_820),
    city("Detroit", 42.3314, -83.0458, 670_031),
    city("Oklahoma City", 35.4676, -97.5164, 655_057),
    city("Portland", 45.5152, -122.6784, 654_741),
    city("Las Vegas", 36.1699, -115.1398, 651_319),
    city("Memphis", 35.1495, -90.0490, 651_073),
    city("Louisville", 38.2527, -85.7585, 617_638),
    city("Baltimore", 39.2904, -76.6122, 593_490),
    city("Milwaukee", 43.0389, -87.9065, 590_157),
    city("Albuquerque", 35.0844, -106.6504, 560_513),
    city("Tucson", 32.2226, -110.9747, 548_073),
    city("Fresno", 36.7378, -119.7871, 531_576),
    city("Sacramento", 38.5816, -121.4944, 513_624),
    city("Atlanta", 33.7490, -84.3880, 506_811),
    city("Kansas City", 39.0997, -94.5786, 495_327),
    city("Omaha", 41.2565, -95.9345, 478_192),
    city("Raleigh", 35.7796, -78.6382, 474_069),
    city("Miami", 25.7617, -80.1918, 467_963),
    city("Minneapolis", 44.9778, -93.2650, 429_606),
    city("Tulsa", 36.1540, -95.9928, 401_190),
    city("Tampa", 27.9506, -82.4572, 399_700),
    city("New Orleans", 29.9511, -90.0715, 390_144),
    city("Wichita", 37.6872, -97.3301, 389_938),
    city("Cleveland", 41.4993, -81.6944, 381_009),
    city("Honolulu", 21.3069, -157.8583, 345_064),
    city("Corpus Christi", 27.8006, -97.3964, 326_586),
    city("Cincinnati", 39.1031, -84.5120, 303_940),
    city("St. Louis", 38.6270, -90.1994, 300_576),
    city("Pittsburgh", 40.4406, -79.9959, 300_286),
    city("Anchorage", 61.2181, -149.9003, 288_000),
    city("Orlando", 28.5383, -81.3792, 287_442),
    city("Lubbock", 33.5779, -101.8552, 255_885),
    city("Buffalo", 42.8864, -78.8784, 255_284),
    city("Laredo", 27.5306, -99.4803, 255_205),
    city("Richmond", 37.5407, -77.4360, 230_436),
    city("Boise", 43.6150, -116.2023, 228_959),
    city("Spokane", 47.6588, -117.4260, 222_081),
    city("Baton Rouge", 30.4515, -91.1871, 220_236),
    city("Des Moines", 41.5868, -93.6250, 214_237),
    city("Birmingham", 33.5186, -86.8104, 209_403),
    city("Salt Lake City", 40.7608, -111.8910, 200_567),
    city("Amarillo", 35.2220, -101.8313, 199_371),
    city("Little Rock", 34.7465, -92.2896, 197_312),
    city("Tallahassee", 30.4383, -84.2807, 196_169),
    city("Sioux Falls", 43.5446, -96.7311, 192_517),
    city("Shreveport", 32.5252, -93.7502, 187_593),
    city("Mobile", 30.6954, -88.0399, 187_041),
    city("Brownsville", 25.9017, -97.4975, 182_781),
    city("Jackson", 32.2988, -90.1848, 160_628),
    city("Charleston", 32.7765, -79.9311, 150_227),
    city("Waco", 31.5493, -97.1467, 138_486),
    city("Fargo", 46.8772, -96.7898, 124_662),
    city("Beaumont", 30.0802, -94.1266, 118_296),
    city("Billings", 45.7833, -108.5007, 109_577),
    city("Lake Charles", 30.2266, -93.2174, 84_872),
    city("Victoria", 28.8053, -97.0036, 65_534),
    city("Galveston", 29.3013, -94.7977, 53_695),
];

/// Station-name keywords that belong to a city without containing its name.
const ALIASES: &[(&str, &str)] = &[
    ("INTERCONTINENTAL", "Houston"),
    ("ELLINGTON", "Houston"),
    ("HOBBY", "Houston"),
    ("CORPUS", "Corpus Christi"),
];

/// Uppercase keyword to canonical name, longest keyword first so
/// "JACKSONVILLE" wins over "JACKSON".
static KEYWORDS: Lazy<Vec<(String, &'static str)>> = Lazy::new(|| {
    let mut keywords: Vec<(String, &'static str)> = ALIASES
        .iter()
        .map(|(keyword, name)| (keyword.to_string(), *name))
        .chain(MAJOR_CITIES.iter().map(|c| (c.name.to_uppercase(), c.name)))
        .collect();
    keywords.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    keywords
});

/// A city the regional map wants a reading for.
#[derive(Debug, Clone, PartialEq)]
pub struct CityTarget {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    /// Farthest a station may be from the city and still stand for it.
    pub max_reading_distance_miles: f64,
}

/// Great-circle distance in miles.
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * a.sqrt().atan2((1.0 - a).sqrt())
}

/// City a station name belongs to, e.g. "Houston, William P. Hobby Airport"
/// becomes "Houston". Unknown names keep their part before the first comma.
pub fn canonical_city_name(raw: &str) -> String {
    let upper = raw.to_uppercase();
    if upper.trim().is_empty() {
        return "Station".to_string();
    }
    if let Some((_, name)) = KEYWORDS.iter().find(|(keyword, _)| upper.contains(keyword.as_str())) {
        return name.to_string();
    }
    match raw.split(',').next().map(str::trim) {
        Some(head) if !head.is_empty() => head.to_string(),
        _ => "Station".to_string(),
    }
}

/// The largest cities within `max_distance_miles`, nearest first. The
/// population floor drops until something is in range; with nothing in range
/// at all the nearest of the largest cities are used.
pub fn major_cities_near(
    latitude: f64,
    longitude: f64,
    max_distance_miles: f64,
    max_results: usize,
) -> Vec<CityTarget> {
    let distance = |c: &MajorCity| haversine_miles(latitude, longitude, c.latitude, c.longitude);

    let mut selected: Vec<(f64, &MajorCity)> = POPULATION_CUTOFFS
        .iter()
        .map(|&floor| {
            MAJOR_CITIES
                .iter()
                .filter(|c| c.population >= floor)
                .map(|c| (distance(c), c))
                .filter(|(d, _)| *d <= max_distance_miles)
                .collect::<Vec<_>>()
        })
        .find(|candidates| !candidates.is_empty())
        .unwrap_or_else(|| {
            MAJOR_CITIES
                .iter()
                .take(max_results * 5)
                .map(|c| (distance(c), c))
                .collect()
        });

    selected.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then_with(|| b.1.population.cmp(&a.1.population))
    });

    selected
        .into_iter()
        .take(max_results)
        .map(|(d, c)| CityTarget {
            name: c.name,
            latitude: c.latitude,
            longitude: c.longitude,
            max_reading_distance_miles: (d * 0.75 + 35.0).clamp(60.0, 120.0),
        })
        .collect()
}

/// Pick regional map readings.
///
/// Readings without coordinates are dropped and the rest are renamed to their
/// canonical city, keeping the first reading per city. Each target then takes
/// the nearest reading within its range and is plotted at the city's own
/// position. When no target finds a reading, the renamed readings are used
/// as they are.
pub fn regional_readings(
    readings: Vec<StationReading>,
    targets: &[CityTarget],
    max_points: usize,
) -> Vec<StationReading> {
    let mut seen = HashSet::new();
    let inventory: Vec<StationReading> = readings
        .into_iter()
        .filter(|r| r.latitude.is_some() && r.longitude.is_some())
        .filter_map(|r| {
            let name = canonical_city_name(&r.name);
            seen.insert(name.to_uppercase())
                .then_some(StationReading { name, ..r })
        })
        .collect();

    let matched: Vec<StationReading> = targets
        .iter()
        .filter_map(|target| {
            inventory
                .iter()
                .filter_map(|r| {
                    let d = haversine_miles(
                        r.latitude?,
                        r.longitude?,
                        target.latitude,
                        target.longitude,
                    );
                    Some((d, r))
                })
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .filter(|(d, _)| *d <= target.max_reading_distance_miles)
                .map(|(_, r)| StationReading {
                    name: target.name.to_string(),
                    latitude: Some(target.latitude),
                    longitude: Some(target.longitude),
                    ..r.clone()
                })
        })
        .take(max_points)
        .collect();

    if matched.is_empty() {
        inventory.into_iter().take(max_points).collect()
    } else {
        matched
    }
}
