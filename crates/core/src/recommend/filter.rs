use crate::domain::race::RaceProfile;
use crate::domain::tire::{MudClearance, TireRecord, TreadType, WetTraction};
use crate::terrain::PRECIP_SURFACE_WET_THRESHOLD;

/// Technical rating at which file treads become unsafe.
const FILE_TREAD_MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome<'a> {
    pub candidates: Vec<&'a TireRecord>,
    /// True when every tire was rejected and the unfiltered catalog was kept.
    pub fallback: bool,
    pub rejected: usize,
}

/// Why a tire is unsafe for the race, if it is.
pub fn rejection_reason(tire: &TireRecord, profile: &RaceProfile) -> Option<&'static str> {
    if profile.needs_mud && tire.mud_clearance == MudClearance::None {
        return Some("no mud clearance on a muddy course");
    }
    if profile.needs_wet
        && profile.precip_pct >= PRECIP_SURFACE_WET_THRESHOLD
        && tire.wet_traction == WetTraction::Poor
    {
        return Some("poor wet traction with rain likely");
    }
    if profile.technical_rating >= FILE_TREAD_MAX_RATING && tire.tread_type == TreadType::File {
        return Some("file tread on extreme terrain");
    }
    None
}

/// Tires passing every hard rule, in catalog order.
pub fn filter_tires<'a>(tires: &'a [TireRecord], profile: &RaceProfile) -> Vec<&'a TireRecord> {
    tires.iter().filter(|tire| rejection_reason(tire, profile).is_none()).collect()
}

/// Like [`filter_tires`], but never empties a non-empty catalog.
pub fn filter_with_fallback<'a>(
    tires: &'a [TireRecord],
    profile: &RaceProfile,
) -> FilterOutcome<'a> {
    let candidates = filter_tires(tires, profile);
    let rejected = tires.len() - candidates.len();

    if candidates.is_empty() && !tires.is_empty() {
        tracing::warn!(
            event_name = "recommend.filter.fallback",
            catalog_size = tires.len(),
            surface_category = %profile.surface_category,
            "every tire failed the hard filters; ranking the unfiltered catalog"
        );
        return FilterOutcome { candidates: tires.iter().collect(), fallback: true, rejected };
    }

    tracing::debug!(
        event_name = "recommend.filter.applied",
        kept = candidates.len(),
        rejected,
        "hard filters applied"
    );
    FilterOutcome { candidates, fallback: false, rejected }
}
