//! Derived load statistics for the presentation layers.
//!
//! Everything here is re-derived from the fleet plan on demand; nothing is
//! cached and nothing mutates the plan. Floor area counts each stack's
//! footprint once regardless of how many cases share it, volume counts
//! every placed case.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::model::{FleetPlan, VehicleLoad, VehicleSpec};

/// Reference europallet footprint, 120 cm x 80 cm.
pub const PALLET_FOOTPRINT_CM2: f64 = 120.0 * 80.0;

/// Total weight of all cases in a load.
pub fn total_weight(load: &VehicleLoad) -> f64 {
    load.cases().map(|p| p.case.weight).sum()
}

/// Floor area claimed by the load, one footprint per stack.
pub fn floor_area_cm2(load: &VehicleLoad) -> f64 {
    load.stacks.iter().map(|s| s.footprint()).sum()
}

/// Volume of all placed cases.
pub fn volume_cm3(load: &VehicleLoad) -> f64 {
    load.cases().map(|p| p.case.volume()).sum()
}

/// Floor area consumed, expressed in europallet footprints.
pub fn pallet_equivalent(load: &VehicleLoad) -> f64 {
    floor_area_cm2(load) / PALLET_FOOTPRINT_CM2
}

/// Share of the vehicle floor the load occupies, 0.0 to 100.0.
pub fn floor_utilization_percent(load: &VehicleLoad, vehicle: &VehicleSpec) -> f64 {
    let floor = vehicle.floor_area();
    if floor <= 0.0 {
        return 0.0;
    }
    (floor_area_cm2(load) / floor) * 100.0
}

/// Share of the vehicle weight limit the load consumes, 0.0 to 100.0.
pub fn weight_utilization_percent(load: &VehicleLoad, vehicle: &VehicleSpec) -> f64 {
    if vehicle.max_weight <= 0.0 {
        return 0.0;
    }
    (total_weight(load) / vehicle.max_weight) * 100.0
}

/// Item counts per product name, for the reporting layer.
///
/// Sums `actual_items`, not case counts, so partially filled cases report
/// the items they really carry. BTreeMap keeps the output deterministic.
pub fn product_totals(load: &VehicleLoad) -> BTreeMap<String, u32> {
    let mut totals = BTreeMap::new();
    for placed in load.cases() {
        *totals.entry(placed.case.product.clone()).or_insert(0) += placed.case.actual_items;
    }
    totals
}

/// Item counts per product name across the whole fleet.
pub fn fleet_product_totals(plan: &FleetPlan) -> BTreeMap<String, u32> {
    let mut totals = BTreeMap::new();
    for load in &plan.loads {
        for (name, count) in product_totals(load) {
            *totals.entry(name).or_insert(0) += count;
        }
    }
    totals
}

/// Summary of one vehicle load, bundled for the response layer.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct LoadMetrics {
    pub total_weight: f64,
    pub floor_area_cm2: f64,
    pub volume_cm3: f64,
    pub pallet_equivalent: f64,
    pub floor_utilization_percent: f64,
    pub weight_utilization_percent: f64,
}

impl LoadMetrics {
    /// Derives all metrics for one load against its vehicle.
    pub fn derive(load: &VehicleLoad, vehicle: &VehicleSpec) -> Self {
        Self {
            total_weight: total_weight(load),
            floor_area_cm2: floor_area_cm2(load),
            volume_cm3: volume_cm3(load),
            pallet_equivalent: pallet_equivalent(load),
            floor_utilization_percent: floor_utilization_percent(load, vehicle),
            weight_utilization_percent: weight_utilization_percent(load, vehicle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Case, Stack};

    fn case(product: &str, w: f64, l: f64, h: f64, weight: f64, items: u32) -> Case {
        Case {
            product: product.to_string(),
            width: w,
            length: l,
            height: h,
            weight,
            can_stack: true,
            actual_items: items,
        }
    }

    fn sample_load() -> VehicleLoad {
        // One two-case stack plus a single-case stack.
        let mut tall = Stack::open(0.0, 0.0, case("A", 80.0, 60.0, 20.0, 25.0, 4), false);
        tall.push(case("A", 80.0, 60.0, 20.0, 25.0, 2), false);
        let flat = Stack::open(0.0, 60.0, case("B", 100.0, 50.0, 30.0, 40.0, 1), false);

        VehicleLoad {
            total_weight: 90.0,
            stacks: vec![tall, flat],
        }
    }

    fn vehicle() -> VehicleSpec {
        VehicleSpec::new("BUS", 450.0, 150.0, 245.0, 1100.0).unwrap()
    }

    #[test]
    fn weight_sums_all_cases() {
        assert!((total_weight(&sample_load()) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn floor_area_counts_each_stack_once() {
        // 80x60 footprint counted once despite two cases on it.
        let expected = 80.0 * 60.0 + 100.0 * 50.0;
        assert!((floor_area_cm2(&sample_load()) - expected).abs() < 1e-9);
    }

    #[test]
    fn volume_counts_each_case() {
        let expected = 2.0 * (80.0 * 60.0 * 20.0) + 100.0 * 50.0 * 30.0;
        assert!((volume_cm3(&sample_load()) - expected).abs() < 1e-9);
    }

    #[test]
    fn pallet_equivalent_uses_europallet_footprint() {
        let load = VehicleLoad {
            total_weight: 25.0,
            stacks: vec![Stack::open(
                0.0,
                0.0,
                case("A", 120.0, 80.0, 20.0, 25.0, 1),
                false,
            )],
        };
        assert!((pallet_equivalent(&load) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn utilization_relates_to_vehicle_limits() {
        let load = sample_load();
        let vehicle = vehicle();

        let floor = floor_utilization_percent(&load, &vehicle);
        assert!((floor - (9800.0 / 67500.0) * 100.0).abs() < 1e-9);

        let weight = weight_utilization_percent(&load, &vehicle);
        assert!((weight - (90.0 / 1100.0) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn product_totals_sum_actual_items() {
        let totals = product_totals(&sample_load());
        assert_eq!(totals.get("A"), Some(&6));
        assert_eq!(totals.get("B"), Some(&1));
    }

    #[test]
    fn fleet_totals_aggregate_across_loads() {
        let plan = FleetPlan {
            vehicle: vehicle(),
            loads: vec![sample_load(), sample_load()],
        };
        let totals = fleet_product_totals(&plan);
        assert_eq!(totals.get("A"), Some(&12));
        assert_eq!(totals.get("B"), Some(&2));
    }
}
