use super::types::{SetupStrategy, TubelessStrength};

const BREAK_IN: &str = "Mount tires 2-3 days before race day. Ride at least 30 minutes to seat \
the bead, check for sealant leaks, and verify tire pressure holds overnight.";

pub fn sealant_volume(width_mm: u16) -> &'static str {
    if width_mm >= 45 {
        "90-120ml"
    } else if width_mm >= 40 {
        "60-90ml"
    } else {
        "50-70ml"
    }
}

/// Tubeless, sealant, spare-kit and break-in advice for the race.
pub fn build_setup_strategy(
    technical_rating: u8,
    width_mm: u16,
    puncture_risk: bool,
) -> SetupStrategy {
    let sealant_note = if puncture_risk {
        "Use the higher end of the range. Sharp surfaces demand extra sealant."
    } else {
        "Standard amount should work fine for this course."
    };

    let (tubeless, tubeless_note) = if technical_rating >= 3 || puncture_risk {
        (
            TubelessStrength::StronglyRecommended,
            "Technical terrain and sharp surfaces make tubeless essential. Self-sealing \
             capability is critical.",
        )
    } else {
        (
            TubelessStrength::Recommended,
            "Tubeless provides better comfort and puncture protection, even on smoother courses.",
        )
    };

    let spare_kit = if puncture_risk {
        "Carry a tube, tire plugs, AND a tire boot. Sharp surfaces can cause cuts too large for \
         sealant alone."
    } else if technical_rating >= 3 {
        "Carry a tube and tire plugs. Technical terrain increases the chance of a sidewall cut."
    } else {
        "Carry a tube and tire plugs. Standard repair kit should handle most issues."
    };

    SetupStrategy {
        tubeless,
        tubeless_note: tubeless_note.to_string(),
        sealant_volume: sealant_volume(width_mm).to_string(),
        sealant_note: sealant_note.to_string(),
        spare_kit: spare_kit.to_string(),
        break_in: BREAK_IN.to_string(),
    }
}
