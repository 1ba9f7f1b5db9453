//! Built-in vehicle classes.
//!
//! A small fixed catalog of cargo volumes, keyed by display name. Usable
//! floor and height dimensions, not body exterior. Custom vehicles can
//! still be supplied per request; this catalog only covers the common
//! dispatch choices.

use crate::model::VehicleSpec;

/// name, length, width, height (cm), max payload (kg)
const CATALOG: &[(&str, f64, f64, f64, f64)] = &[
    ("BUS", 450.0, 150.0, 245.0, 1100.0),
    ("SOLO", 720.0, 245.0, 240.0, 12000.0),
    ("TRAILER", 1360.0, 245.0, 265.0, 24000.0),
];

/// Returns the full built-in catalog.
pub fn builtin_vehicles() -> Vec<VehicleSpec> {
    CATALOG
        .iter()
        .map(|&(name, length, width, height, max_weight)| VehicleSpec {
            name: name.to_string(),
            length,
            width,
            height,
            max_weight,
        })
        .collect()
}

/// Looks up a built-in vehicle by name, case-insensitively.
pub fn find_vehicle(name: &str) -> Option<VehicleSpec> {
    let wanted = name.trim();
    builtin_vehicles()
        .into_iter()
        .find(|v| v.name.eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_entries_are_valid_specs() {
        for vehicle in builtin_vehicles() {
            assert!(
                VehicleSpec::new(
                    vehicle.name.clone(),
                    vehicle.length,
                    vehicle.width,
                    vehicle.height,
                    vehicle.max_weight
                )
                .is_ok(),
                "catalog entry '{}' fails validation",
                vehicle.name
            );
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(find_vehicle("bus").is_some());
        assert!(find_vehicle(" Trailer ").is_some());
        assert!(find_vehicle("rickshaw").is_none());
    }

    #[test]
    fn bus_matches_the_dispatch_sheet() {
        let bus = find_vehicle("BUS").unwrap();
        assert_eq!(bus.length, 450.0);
        assert_eq!(bus.width, 150.0);
        assert_eq!(bus.height, 245.0);
        assert_eq!(bus.max_weight, 1100.0);
    }
}
