use super::types::{PressureRow, PressureTable, PsiRange, RideCondition, WeightBracket};

const BASE_PSI: f64 = 38.0;
const BASE_WIDTH_MM: f64 = 40.0;
const PSI_PER_MM: f64 = 0.5;
const BASE_TECHNICAL_RATING: f64 = 2.0;
const PSI_PER_TECH_STEP: f64 = 1.5;

/// Offsets from the bracket pressure for the low and high end of a range.
fn condition_offsets(condition: RideCondition) -> (f64, f64) {
    match condition {
        RideCondition::Dry => (0.0, 4.0),
        RideCondition::Mixed => (-3.0, 1.0),
        RideCondition::Wet => (-5.0, -1.0),
    }
}

/// Lowest psi ever recommended at the low end of a range.
pub fn pressure_floor(condition: RideCondition) -> i32 {
    match condition {
        RideCondition::Dry => 22,
        RideCondition::Mixed => 20,
        RideCondition::Wet => 18,
    }
}

/// Base pressure for a width and technical rating, before the rider offset.
pub fn base_pressure(technical_rating: u8, width_mm: u16) -> f64 {
    BASE_PSI
        - (f64::from(width_mm) - BASE_WIDTH_MM) * PSI_PER_MM
        - (f64::from(technical_rating) - BASE_TECHNICAL_RATING) * PSI_PER_TECH_STEP
}

// Rounds half away from zero: 35.5 -> 36, 32.5 -> 33.
fn psi_range(bracket_psi: f64, condition: RideCondition) -> PsiRange {
    let (low_offset, high_offset) = condition_offsets(condition);
    let floor = pressure_floor(condition);
    let low = ((bracket_psi + low_offset).round() as i32).max(floor);
    let high = ((bracket_psi + high_offset).round() as i32).max(floor + 4);
    PsiRange { low, high }
}

/// Rider-weight by condition pressure table for the recommended width.
pub fn compute_pressure_table(technical_rating: u8, width_mm: u16) -> PressureTable {
    let base_psi = base_pressure(technical_rating, width_mm);
    let rows = WeightBracket::ALL
        .iter()
        .map(|bracket| {
            let bracket_psi = base_psi + bracket.offset_psi();
            PressureRow {
                weight_bracket: *bracket,
                dry: psi_range(bracket_psi, RideCondition::Dry),
                mixed: psi_range(bracket_psi, RideCondition::Mixed),
                wet: psi_range(bracket_psi, RideCondition::Wet),
            }
        })
        .collect();

    PressureTable { technical_rating, width_mm, base_psi, rows }
}
