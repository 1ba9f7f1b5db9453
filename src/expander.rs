//! Expansion of requested product quantities into packable cases.
//!
//! The catalog bundles product items into cases (`items_per_case`); the
//! packer only ever sees whole cases. A requested quantity of N items
//! therefore becomes `ceil(N / items_per_case)` cases, with the last case
//! carrying the remainder when the quantity does not divide evenly.

use crate::model::{Case, ProductSpec, ShipmentLine};

/// Expands one requested quantity into its sequence of cases.
///
/// Pure function, no side effects. A zero quantity yields no cases. An
/// `items_per_case` of 0 is treated as 1, which also guards the division.
///
/// # Examples
/// ```
/// use loadplan::expander::expand_cases;
/// use loadplan::model::ProductSpec;
///
/// let spec = ProductSpec::new("Crate", 80.0, 60.0, 40.0, 20.0, 4, true).unwrap();
/// let cases = expand_cases(&spec, 10);
/// assert_eq!(cases.len(), 3);
/// assert_eq!(cases[2].actual_items, 2);
/// ```
pub fn expand_cases(product: &ProductSpec, requested_qty: u32) -> Vec<Case> {
    if requested_qty == 0 {
        return Vec::new();
    }

    let items_per_case = product.items_per_case.max(1);
    let case_count = requested_qty.div_ceil(items_per_case);
    let remainder = requested_qty % items_per_case;

    (0..case_count)
        .map(|i| {
            let is_last = i == case_count - 1;
            Case {
                product: product.name.clone(),
                width: product.width,
                length: product.length,
                height: product.height,
                weight: product.weight,
                can_stack: product.can_stack,
                actual_items: if is_last && remainder != 0 {
                    remainder
                } else {
                    items_per_case
                },
            }
        })
        .collect()
}

/// Expands a whole shipment, preserving line order.
pub fn expand_shipment(lines: &[ShipmentLine]) -> Vec<Case> {
    lines
        .iter()
        .flat_map(|line| expand_cases(&line.product, line.quantity))
        .collect()
}
