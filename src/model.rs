//! Data models for transport load planning.
//!
//! This module defines the fundamental data structures of the planner:
//! - `ProductSpec`: a catalog entry describing one product type
//! - `Case`: a concrete packable unit derived from a product spec
//! - `Stack`: a vertical column of cases on one floor footprint
//! - `VehicleSpec`: a cargo volume with floor, height and weight limits
//! - `VehicleLoad` / `FleetPlan`: the result of a planning run
//!
//! All dimensions are centimeters, all weights kilograms. Value types are
//! validated once at the collaborator boundary; the packer assumes they
//! hold.

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToSchema;

/// Global numerical tolerance for dimension and weight comparisons.
pub const EPSILON_DIMENSION: f64 = 1e-6;

/// Validation error for catalog and request data.
#[derive(Debug, Clone)]
pub enum ValidationError {
    InvalidDimension(String),
    InvalidWeight(String),
    InvalidName(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidDimension(msg) => write!(f, "Invalid dimension: {}", msg),
            ValidationError::InvalidWeight(msg) => write!(f, "Invalid weight: {}", msg),
            ValidationError::InvalidName(msg) => write!(f, "Invalid name: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Helper function to validate a single dimension.
fn validate_dimension(value: f64, name: &str) -> Result<(), ValidationError> {
    if value <= 0.0 || value.is_nan() || value.is_infinite() {
        return Err(ValidationError::InvalidDimension(format!(
            "{} must be positive, got: {}",
            name, value
        )));
    }
    Ok(())
}

/// Helper function to validate a weight value.
fn validate_weight_value(value: f64) -> Result<(), ValidationError> {
    if value <= 0.0 || value.is_nan() || value.is_infinite() {
        return Err(ValidationError::InvalidWeight(format!(
            "Weight must be positive, got: {}",
            value
        )));
    }
    Ok(())
}

/// Validates the footprint dimensions, height and weight of a packable unit.
fn validate_unit_params(
    width: f64,
    length: f64,
    height: f64,
    weight: f64,
) -> Result<(), ValidationError> {
    validate_dimension(width, "Width")?;
    validate_dimension(length, "Length")?;
    validate_dimension(height, "Height")?;
    validate_weight_value(weight)?;
    Ok(())
}

fn default_items_per_case() -> u32 {
    1
}

fn default_can_stack() -> bool {
    true
}

/// A product type as supplied by the external catalog.
///
/// The `name` is the unique key the reporting layer aggregates by.
/// `items_per_case` is the number of product items bundled into one
/// physical case; missing or zero values are treated as 1.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductSpec {
    pub name: String,
    #[schema(example = 80.0)]
    pub width: f64,
    #[schema(example = 60.0)]
    pub length: f64,
    #[schema(example = 40.0)]
    pub height: f64,
    #[schema(example = 20.0)]
    pub weight: f64,
    #[serde(default = "default_items_per_case")]
    #[schema(default = 1, minimum = 1)]
    pub items_per_case: u32,
    #[serde(default = "default_can_stack")]
    #[schema(default = true)]
    pub can_stack: bool,
}

impl ProductSpec {
    /// Creates a new product spec with validation.
    ///
    /// An `items_per_case` of 0 is normalized to 1 rather than rejected.
    ///
    /// # Examples
    /// ```
    /// use loadplan::model::ProductSpec;
    ///
    /// let ok = ProductSpec::new("Crate", 80.0, 60.0, 40.0, 20.0, 4, true);
    /// assert!(ok.is_ok());
    ///
    /// let bad = ProductSpec::new("Crate", -80.0, 60.0, 40.0, 20.0, 4, true);
    /// assert!(bad.is_err());
    /// ```
    pub fn new(
        name: impl Into<String>,
        width: f64,
        length: f64,
        height: f64,
        weight: f64,
        items_per_case: u32,
        can_stack: bool,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::InvalidName(
                "Product name must not be empty".to_string(),
            ));
        }
        validate_unit_params(width, length, height, weight)?;
        Ok(Self {
            name,
            width,
            length,
            height,
            weight,
            items_per_case: items_per_case.max(1),
            can_stack,
        })
    }

    /// Floor footprint of one case of this product.
    #[allow(dead_code)]
    pub fn footprint(&self) -> f64 {
        self.width * self.length
    }
}

/// One requested catalog position: a product and how many items of it.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ShipmentLine {
    pub product: ProductSpec,
    #[schema(example = 12, minimum = 0)]
    pub quantity: u32,
}

/// A concrete packable unit derived from a `ProductSpec`.
///
/// `actual_items` is the number of underlying product items this case
/// represents; it equals `items_per_case` except possibly for the last
/// case of a requested quantity.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Case {
    pub product: String,
    pub width: f64,
    pub length: f64,
    pub height: f64,
    pub weight: f64,
    pub can_stack: bool,
    pub actual_items: u32,
}

impl Case {
    /// Floor footprint area (width × length).
    pub fn footprint(&self) -> f64 {
        self.width * self.length
    }

    /// Volume of the case.
    pub fn volume(&self) -> f64 {
        self.width * self.length * self.height
    }
}

/// A case that has received its position within a stack.
///
/// `rotated` marks the single width/length swap fallback; `width` and
/// `length` of the embedded case are already swapped in that event, so
/// consumers can draw the cuboid without re-deriving the orientation.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct PlacedCase {
    #[serde(flatten)]
    pub case: Case,
    pub z_offset: f64,
    pub rotated: bool,
}

/// A vertical column of cases sharing one exact floor footprint.
///
/// Opened when a case claims a new floor position; grows monotonically in
/// height. `can_stack_base` is taken from the founding case and gates all
/// later stacking attempts.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct Stack {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub length: f64,
    pub can_stack_base: bool,
    pub current_height: f64,
    pub cases: Vec<PlacedCase>,
}

impl Stack {
    /// Opens a new stack at a floor position with its founding case.
    pub fn open(x: f64, y: f64, mut case: Case, rotated: bool) -> Self {
        if rotated {
            std::mem::swap(&mut case.width, &mut case.length);
        }
        Self {
            x,
            y,
            width: case.width,
            length: case.length,
            can_stack_base: case.can_stack,
            current_height: case.height,
            cases: vec![PlacedCase {
                case,
                z_offset: 0.0,
                rotated,
            }],
        }
    }

    /// Places a case on top of this stack.
    ///
    /// The caller has already verified footprint match and the height
    /// limit; the z-offset is the height accumulated so far.
    pub fn push(&mut self, mut case: Case, rotated: bool) {
        if rotated {
            std::mem::swap(&mut case.width, &mut case.length);
        }
        let z_offset = self.current_height;
        self.current_height += case.height;
        self.cases.push(PlacedCase {
            case,
            z_offset,
            rotated,
        });
    }

    /// Floor footprint area claimed by this stack.
    pub fn footprint(&self) -> f64 {
        self.width * self.length
    }

    /// Total weight of all cases in this stack.
    #[allow(dead_code)]
    pub fn total_weight(&self) -> f64 {
        self.cases.iter().map(|p| p.case.weight).sum()
    }
}

/// A vehicle cargo volume, read-only for the planner.
///
/// `length` is the long axis of the cargo floor; case widths run along it.
/// `width` is the short axis; case lengths run along it.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct VehicleSpec {
    pub name: String,
    #[schema(example = 450.0)]
    pub length: f64,
    #[schema(example = 150.0)]
    pub width: f64,
    #[schema(example = 245.0)]
    pub height: f64,
    #[schema(example = 1100.0)]
    pub max_weight: f64,
}

impl VehicleSpec {
    /// Creates a new vehicle spec with validation.
    pub fn new(
        name: impl Into<String>,
        length: f64,
        width: f64,
        height: f64,
        max_weight: f64,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::InvalidName(
                "Vehicle name must not be empty".to_string(),
            ));
        }
        validate_dimension(length, "Vehicle length")?;
        validate_dimension(width, "Vehicle width")?;
        validate_dimension(height, "Vehicle height")?;
        validate_weight_value(max_weight)?;
        Ok(Self {
            name,
            length,
            width,
            height,
            max_weight,
        })
    }

    /// Floor area of the cargo volume.
    pub fn floor_area(&self) -> f64 {
        self.length * self.width
    }
}

/// One vehicle's worth of placed stacks.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct VehicleLoad {
    pub stacks: Vec<Stack>,
    pub total_weight: f64,
}

impl VehicleLoad {
    /// Number of cases placed in this load.
    pub fn case_count(&self) -> usize {
        self.stacks.iter().map(|s| s.cases.len()).sum()
    }

    /// Iterates over all placed cases across all stacks.
    pub fn cases(&self) -> impl Iterator<Item = &PlacedCase> {
        self.stacks.iter().flat_map(|s| s.cases.iter())
    }
}

/// The ordered sequence of vehicle loads covering a whole shipment.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct FleetPlan {
    pub vehicle: VehicleSpec,
    pub loads: Vec<VehicleLoad>,
}

impl FleetPlan {
    /// Number of vehicles the shipment requires.
    pub fn vehicle_count(&self) -> usize {
        self.loads.len()
    }

    /// Total number of cases placed across the fleet.
    pub fn case_count(&self) -> usize {
        self.loads.iter().map(|l| l.case_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(w: f64, l: f64, h: f64) -> Case {
        Case {
            product: "Test".to_string(),
            width: w,
            length: l,
            height: h,
            weight: 10.0,
            can_stack: true,
            actual_items: 1,
        }
    }

    #[test]
    fn product_spec_rejects_nonpositive_dimensions() {
        assert!(ProductSpec::new("A", 0.0, 60.0, 40.0, 20.0, 1, true).is_err());
        assert!(ProductSpec::new("A", 80.0, -1.0, 40.0, 20.0, 1, true).is_err());
        assert!(ProductSpec::new("A", 80.0, 60.0, f64::NAN, 20.0, 1, true).is_err());
        assert!(ProductSpec::new("A", 80.0, 60.0, 40.0, f64::INFINITY, 1, true).is_err());
    }

    #[test]
    fn product_spec_rejects_empty_name() {
        assert!(ProductSpec::new("  ", 80.0, 60.0, 40.0, 20.0, 1, true).is_err());
    }

    #[test]
    fn product_spec_normalizes_zero_items_per_case() {
        let spec = ProductSpec::new("A", 80.0, 60.0, 40.0, 20.0, 0, true).unwrap();
        assert_eq!(spec.items_per_case, 1);
    }

    #[test]
    fn product_spec_deserializes_with_defaults() {
        let spec: ProductSpec = serde_json::from_str(
            r#"{"name": "Crate", "width": 80.0, "length": 60.0, "height": 40.0, "weight": 20.0}"#,
        )
        .expect("Should parse valid JSON");
        assert_eq!(spec.items_per_case, 1);
        assert!(spec.can_stack);
    }

    #[test]
    fn vehicle_spec_rejects_invalid_limits() {
        assert!(VehicleSpec::new("BUS", 450.0, 150.0, 245.0, 0.0).is_err());
        assert!(VehicleSpec::new("BUS", 450.0, 150.0, -245.0, 1100.0).is_err());
        assert!(VehicleSpec::new("", 450.0, 150.0, 245.0, 1100.0).is_err());
    }

    #[test]
    fn stack_grows_with_z_offsets() {
        let mut stack = Stack::open(0.0, 0.0, case(80.0, 60.0, 20.0), false);
        stack.push(case(80.0, 60.0, 30.0), false);
        stack.push(case(80.0, 60.0, 10.0), false);

        assert_eq!(stack.cases.len(), 3);
        assert!((stack.current_height - 60.0).abs() < EPSILON_DIMENSION);
        let offsets: Vec<f64> = stack.cases.iter().map(|p| p.z_offset).collect();
        assert_eq!(offsets, vec![0.0, 20.0, 50.0]);
    }

    #[test]
    fn rotated_case_swaps_footprint_on_open() {
        let stack = Stack::open(0.0, 0.0, case(80.0, 60.0, 20.0), true);
        assert!((stack.width - 60.0).abs() < EPSILON_DIMENSION);
        assert!((stack.length - 80.0).abs() < EPSILON_DIMENSION);
        assert!(stack.cases[0].rotated);
    }

    #[test]
    fn stack_base_inherits_can_stack_flag() {
        let mut rigid = case(80.0, 60.0, 20.0);
        rigid.can_stack = false;
        let stack = Stack::open(0.0, 0.0, rigid, false);
        assert!(!stack.can_stack_base);
    }
}
