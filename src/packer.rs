//! Greedy load planning for one or more vehicles.
//!
//! The packer places cases onto the vehicle floor in shelf order: rows run
//! along the vehicle width (y), rows advance along the vehicle length (x)
//! by the widest case of the finished row. Cases with an exactly matching
//! footprint are stacked vertically instead of claiming new floor space.
//! The fleet allocator repeats the single-vehicle pass over the residue
//! until every case is loaded or one case proves unloadable even into an
//! empty vehicle.
//!
//! The algorithm is a deliberate heuristic: deterministic, single pass, no
//! backtracking. It trades packing density for an explainable plan.

use std::cmp::Ordering;

use serde::Serialize;

use crate::expander::expand_shipment;
use crate::geometry::footprints_intersect;
use crate::model::{Case, FleetPlan, ShipmentLine, Stack, VehicleLoad, VehicleSpec};

/// Policy knobs for the packing pass.
///
/// `allow_rotation` enables the single width/length swap fallback, tried
/// only after the un-rotated orientation fails. `dimension_epsilon` is the
/// tolerance for footprint matching and limit checks.
#[derive(Copy, Clone, Debug)]
pub struct PackingPolicy {
    pub allow_rotation: bool,
    pub dimension_epsilon: f64,
}

impl PackingPolicy {
    pub const DEFAULT_ALLOW_ROTATION: bool = false;
    pub const DEFAULT_DIMENSION_EPSILON: f64 = crate::model::EPSILON_DIMENSION;
}

impl Default for PackingPolicy {
    fn default() -> Self {
        Self {
            allow_rotation: Self::DEFAULT_ALLOW_ROTATION,
            dimension_epsilon: Self::DEFAULT_DIMENSION_EPSILON,
        }
    }
}

/// Result of packing one vehicle.
///
/// `residue` preserves the relative order of the cases that did not fit;
/// the fleet allocator feeds it into the next vehicle unchanged.
#[derive(Clone, Debug)]
pub struct PackOutcome {
    pub stacks: Vec<Stack>,
    pub total_weight: f64,
    pub residue: Vec<Case>,
}

/// Why a case cannot be loaded into an empty vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OversizeReason {
    ExceedsWeightLimit,
    ExceedsDimensions,
}

impl OversizeReason {
    pub fn code(&self) -> &'static str {
        match self {
            OversizeReason::ExceedsWeightLimit => "exceeds_weight_limit",
            OversizeReason::ExceedsDimensions => "exceeds_dimensions",
        }
    }
}

impl std::fmt::Display for OversizeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OversizeReason::ExceedsWeightLimit => {
                write!(f, "Case weight exceeds the vehicle weight limit")
            }
            OversizeReason::ExceedsDimensions => {
                write!(f, "Case does not fit the vehicle floor in any tried orientation")
            }
        }
    }
}

/// Fatal planning failure.
///
/// Raised when a case cannot be placed into an otherwise-empty vehicle.
/// The vehicle loads completed before the failure are still valid and are
/// carried inside the error.
#[derive(Clone, Debug)]
pub enum PlanError {
    OversizeItem {
        case: Case,
        vehicle: VehicleSpec,
        reason: OversizeReason,
        completed: Vec<VehicleLoad>,
    },
}

impl std::fmt::Display for PlanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanError::OversizeItem {
                case,
                vehicle,
                reason,
                ..
            } => write!(
                f,
                "Case of '{}' ({}x{}x{} cm, {} kg) cannot be loaded into vehicle '{}': {}",
                case.product,
                case.width,
                case.length,
                case.height,
                case.weight,
                vehicle.name,
                reason
            ),
        }
    }
}

impl std::error::Error for PlanError {}

/// Events emitted while planning, suitable for live visualization.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum PlanEvent {
    /// A new vehicle of the fleet has been filled.
    VehicleOpened {
        index: usize,
        name: String,
        length: f64,
        width: f64,
        height: f64,
        max_weight: f64,
    },
    /// A case has received its position.
    CasePlaced {
        vehicle: usize,
        stack: usize,
        product: String,
        x: f64,
        y: f64,
        z_offset: f64,
        width: f64,
        length: f64,
        height: f64,
        weight: f64,
        rotated: bool,
    },
    /// A case cannot be loaded at all; planning stops after this.
    CaseRejected {
        product: String,
        width: f64,
        length: f64,
        height: f64,
        weight: f64,
        reason_code: String,
        reason: String,
    },
    /// Planning finished.
    Finished { vehicles: usize, cases: usize },
}

/// Shelf cursor over the vehicle floor.
///
/// `y` walks along the vehicle width within the current row; `x` is the
/// row's start along the vehicle length; `row_max_width` is the widest
/// case seen in the row and becomes the row advance on wrap.
#[derive(Clone, Copy, Debug, Default)]
struct ShelfCursor {
    x: f64,
    y: f64,
    row_max_width: f64,
}

impl ShelfCursor {
    fn wrap(&mut self) {
        self.x += self.row_max_width;
        self.y = 0.0;
        self.row_max_width = 0.0;
    }
}

/// Checks whether a case's footprint matches a stack's base.
///
/// Returns the orientation that matches (`false` = as-is, `true` =
/// width/length swapped), or `None`. The swapped match is only tried when
/// rotation is enabled and the as-is orientation does not match.
fn footprint_match(stack: &Stack, case: &Case, policy: &PackingPolicy) -> Option<bool> {
    let eps = policy.dimension_epsilon;
    if (stack.width - case.width).abs() <= eps && (stack.length - case.length).abs() <= eps {
        return Some(false);
    }
    if policy.allow_rotation
        && (stack.width - case.length).abs() <= eps
        && (stack.length - case.width).abs() <= eps
    {
        return Some(true);
    }
    None
}

/// Packs an ordered list of cases into one vehicle.
///
/// Precondition: the input is already sorted by descending floor footprint
/// (ties in insertion order); fleet-level sorting happens once over the
/// whole shipment, not per vehicle. Each case is tried in order: weight
/// gate, then the first open stack with a matching footprint and enough
/// remaining height, then a new floor position in shelf order. A case
/// rejected from the floor is never retried against stacks formed later.
pub fn pack_vehicle(cases: Vec<Case>, vehicle: &VehicleSpec, policy: &PackingPolicy) -> PackOutcome {
    let eps = policy.dimension_epsilon;
    let mut stacks: Vec<Stack> = Vec::new();
    let mut residue: Vec<Case> = Vec::new();
    let mut running_weight = 0.0;
    let mut cursor = ShelfCursor::default();

    for case in cases {
        // Weight gate comes before any geometric attempt.
        if running_weight + case.weight > vehicle.max_weight + eps {
            residue.push(case);
            continue;
        }

        // Top up an existing stack first: first match in creation order wins.
        if case.can_stack {
            let mut target: Option<(usize, bool)> = None;
            for (index, stack) in stacks.iter().enumerate() {
                if !stack.can_stack_base {
                    continue;
                }
                if stack.current_height + case.height > vehicle.height + eps {
                    continue;
                }
                if let Some(rotated) = footprint_match(stack, &case, policy) {
                    target = Some((index, rotated));
                    break;
                }
            }
            if let Some((index, rotated)) = target {
                running_weight += case.weight;
                stacks[index].push(case, rotated);
                continue;
            }
        }

        // Claim a new floor position, wrapping the shelf row when full.
        // The wrap persists even if the case then fails the length check.
        let mut orientations = vec![(case.width, case.length, false)];
        if policy.allow_rotation && (case.width - case.length).abs() > eps {
            orientations.push((case.length, case.width, true));
        }

        let mut slot: Option<(f64, f64, bool)> = None;
        for (width, length, rotated) in orientations {
            if cursor.y + length > vehicle.width + eps {
                cursor.wrap();
            }
            if cursor.x + width <= vehicle.length + eps && cursor.y + length <= vehicle.width + eps
            {
                slot = Some((width, length, rotated));
                break;
            }
        }

        match slot {
            Some((width, length, rotated)) => {
                running_weight += case.weight;
                let stack = Stack::open(cursor.x, cursor.y, case, rotated);
                debug_assert!(stacks.iter().all(|s| !footprints_intersect(s, &stack)));
                stacks.push(stack);
                cursor.y += length;
                cursor.row_max_width = cursor.row_max_width.max(width);
            }
            None => residue.push(case),
        }
    }

    PackOutcome {
        stacks,
        total_weight: running_weight,
        residue,
    }
}

/// Sorts cases by descending floor footprint, stable on ties.
pub fn sort_cases_by_footprint(cases: &mut [Case]) {
    cases.sort_by(|a, b| {
        b.footprint()
            .partial_cmp(&a.footprint())
            .unwrap_or(Ordering::Equal)
    });
}

fn oversize_reason(case: &Case, vehicle: &VehicleSpec, policy: &PackingPolicy) -> OversizeReason {
    if case.weight > vehicle.max_weight + policy.dimension_epsilon {
        OversizeReason::ExceedsWeightLimit
    } else {
        OversizeReason::ExceedsDimensions
    }
}

/// Allocates a fleet of identical vehicles for a sorted case list.
///
/// See [`allocate_fleet_with_progress`].
pub fn allocate_fleet(
    cases: Vec<Case>,
    vehicle: &VehicleSpec,
    policy: &PackingPolicy,
) -> Result<FleetPlan, PlanError> {
    allocate_fleet_with_progress(cases, vehicle, policy, |_| {})
}

/// Allocates a fleet, reporting progress to a callback.
///
/// Repeatedly packs the residue into fresh vehicles. Every round either
/// places at least one case or proves that the first leftover case cannot
/// be loaded into an empty vehicle, so the loop terminates after at most
/// one round per case. On failure the completed loads travel inside the
/// error and remain valid.
pub fn allocate_fleet_with_progress(
    cases: Vec<Case>,
    vehicle: &VehicleSpec,
    policy: &PackingPolicy,
    mut on_event: impl FnMut(&PlanEvent),
) -> Result<FleetPlan, PlanError> {
    let mut loads: Vec<VehicleLoad> = Vec::new();
    let mut placed_total = 0usize;
    let mut remaining = cases;

    while !remaining.is_empty() {
        let outcome = pack_vehicle(remaining, vehicle, policy);

        if outcome.stacks.is_empty() {
            // Zero-progress round: the residue equals the input, so its
            // first case is the one an empty vehicle cannot take.
            let case = outcome
                .residue
                .into_iter()
                .next()
                .expect("empty pack round must return its input as residue");
            let reason = oversize_reason(&case, vehicle, policy);
            on_event(&PlanEvent::CaseRejected {
                product: case.product.clone(),
                width: case.width,
                length: case.length,
                height: case.height,
                weight: case.weight,
                reason_code: reason.code().to_string(),
                reason: reason.to_string(),
            });
            on_event(&PlanEvent::Finished {
                vehicles: loads.len(),
                cases: placed_total,
            });
            return Err(PlanError::OversizeItem {
                case,
                vehicle: vehicle.clone(),
                reason,
                completed: loads,
            });
        }

        let load = VehicleLoad {
            stacks: outcome.stacks,
            total_weight: outcome.total_weight,
        };
        let index = loads.len() + 1;
        on_event(&PlanEvent::VehicleOpened {
            index,
            name: vehicle.name.clone(),
            length: vehicle.length,
            width: vehicle.width,
            height: vehicle.height,
            max_weight: vehicle.max_weight,
        });
        for (stack_index, stack) in load.stacks.iter().enumerate() {
            for placed in &stack.cases {
                on_event(&PlanEvent::CasePlaced {
                    vehicle: index,
                    stack: stack_index,
                    product: placed.case.product.clone(),
                    x: stack.x,
                    y: stack.y,
                    z_offset: placed.z_offset,
                    width: placed.case.width,
                    length: placed.case.length,
                    height: placed.case.height,
                    weight: placed.case.weight,
                    rotated: placed.rotated,
                });
            }
        }

        placed_total += load.case_count();
        loads.push(load);
        remaining = outcome.residue;
    }

    on_event(&PlanEvent::Finished {
        vehicles: loads.len(),
        cases: placed_total,
    });
    Ok(FleetPlan {
        vehicle: vehicle.clone(),
        loads,
    })
}

/// Plans a whole shipment: expand, sort once, allocate.
///
/// This is the entry point the HTTP layer uses. Quantities are expanded
/// into cases, the case list is sorted by descending footprint exactly
/// once, and the fleet allocator does the rest.
pub fn plan_shipment(
    lines: &[ShipmentLine],
    vehicle: &VehicleSpec,
    policy: &PackingPolicy,
) -> Result<FleetPlan, PlanError> {
    plan_shipment_with_progress(lines, vehicle, policy, |_| {})
}

/// Plans a whole shipment with a progress callback.
pub fn plan_shipment_with_progress(
    lines: &[ShipmentLine],
    vehicle: &VehicleSpec,
    policy: &PackingPolicy,
    on_event: impl FnMut(&PlanEvent),
) -> Result<FleetPlan, PlanError> {
    let mut cases = expand_shipment(lines);
    sort_cases_by_footprint(&mut cases);
    allocate_fleet_with_progress(cases, vehicle, policy, on_event)
}
