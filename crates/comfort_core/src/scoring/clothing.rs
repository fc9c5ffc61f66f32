//! crates/comfort_core/src/scoring/clothing.rs
//!
//! Clothing insulation (CLO) and metabolic rate (MET) estimation.
//!
//! The survey offers three ways to report clothing: an itemized garment
//! checklist, a coarse band, and a continuous slider. `resolve_clo` picks the
//! final value by precedence: itemized sum > band midpoint > slider > default.

/// Multiplier applied to the itemized sum when the accessory flag
/// (scarf / cap) is set.
pub const ACCESSORY_FACTOR: f64 = 1.05;

/// Fallback when the respondent reported nothing at all.
pub const DEFAULT_CLO: f64 = 1.0;

/// Fallback metabolic rate: seated light work.
pub const DEFAULT_MET: f64 = 1.2;

//=========================================================================================
// Garment checklist
//=========================================================================================

/// The fixed garment checklist. Per-garment insulation values follow the
/// ASHRAE 55 garment table. The set is closed; an unknown garment cannot be
/// represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Garment {
    TShirt,
    ShortSleeveShirt,
    LongSleeveShirt,
    ThinSweater,
    ThickSweater,
    Jacket,
    WinterCoat,
    ThinTrousers,
    ThickTrousers,
    Shorts,
    Skirt,
    Sweatpants,
    Socks,
    Shoes,
    Boots,
}

impl Garment {
    /// Intrinsic insulation of the single garment, in clo.
    pub fn clo(self) -> f64 {
        match self {
            Garment::TShirt => 0.08,
            Garment::ShortSleeveShirt => 0.19,
            Garment::LongSleeveShirt => 0.25,
            Garment::ThinSweater => 0.25,
            Garment::ThickSweater => 0.36,
            Garment::Jacket => 0.36,
            Garment::WinterCoat => 0.60,
            Garment::ThinTrousers => 0.15,
            Garment::ThickTrousers => 0.24,
            Garment::Shorts => 0.08,
            Garment::Skirt => 0.14,
            Garment::Sweatpants => 0.28,
            Garment::Socks => 0.02,
            Garment::Shoes => 0.02,
            Garment::Boots => 0.10,
        }
    }

    /// Stable form/wire key for the garment.
    pub fn key(self) -> &'static str {
        match self {
            Garment::TShirt => "t_shirt",
            Garment::ShortSleeveShirt => "short_sleeve_shirt",
            Garment::LongSleeveShirt => "long_sleeve_shirt",
            Garment::ThinSweater => "thin_sweater",
            Garment::ThickSweater => "thick_sweater",
            Garment::Jacket => "jacket",
            Garment::WinterCoat => "winter_coat",
            Garment::ThinTrousers => "thin_trousers",
            Garment::ThickTrousers => "thick_trousers",
            Garment::Shorts => "shorts",
            Garment::Skirt => "skirt",
            Garment::Sweatpants => "sweatpants",
            Garment::Socks => "socks",
            Garment::Shoes => "shoes",
            Garment::Boots => "boots",
        }
    }

    /// Human label shown next to the checkbox.
    pub fn label(self) -> &'static str {
        match self {
            Garment::TShirt => "T-shirt",
            Garment::ShortSleeveShirt => "Short-sleeve shirt",
            Garment::LongSleeveShirt => "Long-sleeve shirt",
            Garment::ThinSweater => "Thin sweater",
            Garment::ThickSweater => "Thick sweater",
            Garment::Jacket => "Jacket",
            Garment::WinterCoat => "Winter coat",
            Garment::ThinTrousers => "Thin trousers",
            Garment::ThickTrousers => "Thick trousers",
            Garment::Shorts => "Shorts",
            Garment::Skirt => "Skirt",
            Garment::Sweatpants => "Sweatpants",
            Garment::Socks => "Socks",
            Garment::Shoes => "Shoes",
            Garment::Boots => "Boots",
        }
    }

    /// Parses a form/wire key. Unknown keys mean the form markup and this
    /// table have drifted apart, which is a program defect; callers skip them.
    pub fn from_key(key: &str) -> Option<Garment> {
        Garment::ALL.iter().copied().find(|g| g.key() == key)
    }

    pub const ALL: [Garment; 15] = [
        Garment::TShirt,
        Garment::ShortSleeveShirt,
        Garment::LongSleeveShirt,
        Garment::ThinSweater,
        Garment::ThickSweater,
        Garment::Jacket,
        Garment::WinterCoat,
        Garment::ThinTrousers,
        Garment::ThickTrousers,
        Garment::Shorts,
        Garment::Skirt,
        Garment::Sweatpants,
        Garment::Socks,
        Garment::Shoes,
        Garment::Boots,
    ];
}

//=========================================================================================
// Bands and resolution
//=========================================================================================

/// Coarse single-choice clothing band; resolves to the band midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloBand {
    /// 0.0 - 0.6 clo (summer indoor clothing).
    Light,
    /// 0.6 - 1.2 clo (typical indoor ensemble).
    Medium,
    /// 1.2 - 1.8 clo (heavy winter clothing).
    Heavy,
}

impl CloBand {
    pub fn midpoint(self) -> f64 {
        match self {
            CloBand::Light => 0.30,
            CloBand::Medium => 0.90,
            CloBand::Heavy => 1.50,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            CloBand::Light => "light",
            CloBand::Medium => "medium",
            CloBand::Heavy => "heavy",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CloBand::Light => "Light (0.0\u{2013}0.6 clo)",
            CloBand::Medium => "Medium (0.6\u{2013}1.2 clo)",
            CloBand::Heavy => "Heavy (1.2\u{2013}1.8 clo)",
        }
    }

    pub fn from_key(key: &str) -> Option<CloBand> {
        CloBand::ALL.iter().copied().find(|b| b.key() == key)
    }

    pub const ALL: [CloBand; 3] = [CloBand::Light, CloBand::Medium, CloBand::Heavy];
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Sums the insulation of the selected garments and applies the accessory
/// multiplier, rounded to two decimals.
pub fn ensemble_clo(garments: &[Garment], accessory: bool) -> f64 {
    let sum: f64 = garments.iter().map(|g| g.clo()).sum();
    let factor = if accessory { ACCESSORY_FACTOR } else { 1.0 };
    round2(sum * factor)
}

/// Picks the final clo value.
///
/// Precedence: itemized garment sum (if any item is selected) > band
/// midpoint > continuous slider value > `DEFAULT_CLO`.
pub fn resolve_clo(
    garments: &[Garment],
    accessory: bool,
    band: Option<CloBand>,
    slider: Option<f64>,
) -> f64 {
    if !garments.is_empty() {
        return ensemble_clo(garments, accessory);
    }
    if let Some(band) = band {
        return band.midpoint();
    }
    slider.unwrap_or(DEFAULT_CLO)
}

//=========================================================================================
// Activity / metabolic rate
//=========================================================================================

/// Fixed activity checklist with per-activity metabolic rates (MET).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    SeatedQuiet,
    SeatedTyping,
    StandingRelaxed,
    WalkingAbout,
    LightExercise,
}

impl Activity {
    pub fn met(self) -> f64 {
        match self {
            Activity::SeatedQuiet => 1.0,
            Activity::SeatedTyping => 1.1,
            Activity::StandingRelaxed => 1.2,
            Activity::WalkingAbout => 1.7,
            Activity::LightExercise => 3.0,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Activity::SeatedQuiet => "seated_quiet",
            Activity::SeatedTyping => "seated_typing",
            Activity::StandingRelaxed => "standing_relaxed",
            Activity::WalkingAbout => "walking_about",
            Activity::LightExercise => "light_exercise",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Activity::SeatedQuiet => "Seated, quiet",
            Activity::SeatedTyping => "Seated, typing or writing",
            Activity::StandingRelaxed => "Standing, relaxed",
            Activity::WalkingAbout => "Walking about the room",
            Activity::LightExercise => "Light exercise",
        }
    }

    pub fn from_key(key: &str) -> Option<Activity> {
        Activity::ALL.iter().copied().find(|a| a.key() == key)
    }

    pub const ALL: [Activity; 5] = [
        Activity::SeatedQuiet,
        Activity::SeatedTyping,
        Activity::StandingRelaxed,
        Activity::WalkingAbout,
        Activity::LightExercise,
    ];
}

/// Resolves the metabolic rate from the selected activity, falling back to
/// seated light work.
pub fn resolve_met(activity: Option<Activity>) -> f64 {
    activity.map(Activity::met).unwrap_or(DEFAULT_MET)
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn itemized_sum_without_accessory() {
        let items = [Garment::TShirt, Garment::ThinTrousers, Garment::Shoes];
        // 0.08 + 0.15 + 0.02
        assert_eq!(ensemble_clo(&items, false), 0.25);
    }

    #[test]
    fn accessory_applies_five_percent() {
        let items = [Garment::ThickSweater, Garment::ThickTrousers];
        // (0.36 + 0.24) * 1.05 = 0.63
        assert_eq!(ensemble_clo(&items, true), 0.63);
    }

    #[test]
    fn ensemble_rounds_to_two_decimals() {
        let items = [Garment::LongSleeveShirt, Garment::Socks, Garment::Shoes];
        // (0.25 + 0.02 + 0.02) * 1.05 = 0.3045 -> 0.30
        assert_eq!(ensemble_clo(&items, true), 0.30);
    }

    #[test]
    fn medium_band_resolves_to_midpoint() {
        assert_eq!(resolve_clo(&[], false, Some(CloBand::Medium), None), 0.90);
    }

    #[test]
    fn itemized_beats_band_and_slider() {
        let items = [Garment::TShirt];
        let v = resolve_clo(&items, false, Some(CloBand::Heavy), Some(1.8));
        assert_eq!(v, 0.08);
    }

    #[test]
    fn band_beats_slider() {
        assert_eq!(resolve_clo(&[], false, Some(CloBand::Light), Some(1.8)), 0.30);
    }

    #[test]
    fn slider_used_when_nothing_else() {
        assert_eq!(resolve_clo(&[], false, None, Some(0.75)), 0.75);
    }

    #[test]
    fn default_when_nothing_reported() {
        assert_eq!(resolve_clo(&[], true, None, None), DEFAULT_CLO);
    }

    #[test]
    fn garment_keys_round_trip() {
        for g in Garment::ALL {
            assert_eq!(Garment::from_key(g.key()), Some(g));
        }
        assert_eq!(Garment::from_key("cape"), None);
    }

    #[test]
    fn met_falls_back_to_seated_light_work() {
        assert_eq!(resolve_met(None), 1.2);
        assert_eq!(resolve_met(Some(Activity::WalkingAbout)), 1.7);
    }
}
