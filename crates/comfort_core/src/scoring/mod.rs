//! crates/comfort_core/src/scoring/mod.rs
//!
//! The domain computations behind the survey: clothing insulation (CLO) and
//! metabolic rate (MET) estimation, WHO-5 well-being scoring, and the
//! thermal-comfort indicator derived from them.

pub mod clothing;
pub mod indicator;
pub mod who5;

pub use clothing::{ensemble_clo, resolve_clo, resolve_met, Activity, CloBand, Garment};
pub use indicator::{comfort_indicator, ComfortIndicator, ThermalBand};
pub use who5::{score as who5_score, WellBeing};
