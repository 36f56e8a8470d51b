//! Directional freight-flow analysis between two regions.

use serde::{Deserialize, Serialize};

use super::regions::Region;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    Headhaul,
    Balanced,
    Backhaul,
}

impl FlowDirection {
    /// Truck-to-load ratio band shown for this direction.
    pub fn ratio_band(&self) -> (f64, f64) {
        match self {
            Self::Headhaul => (1.2, 1.8),
            Self::Balanced => (1.8, 2.6),
            Self::Backhaul => (3.0, 5.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketTemperature {
    Hot,
    Warm,
    Balanced,
    Cool,
    Cold,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlowAnalysis {
    pub origin_region: Option<Region>,
    pub destination_region: Option<Region>,
    pub imbalance: f64,
    pub direction: FlowDirection,
    pub multiplier: f64,
    pub truck_to_load_ratio: f64,
    pub temperature: MarketTemperature,
}

/// `(originOutbound + destInbound) / 2 - originTruckPopulation`. Positive
/// means more freight than trucks leaving the origin.
pub fn imbalance_score(origin: Region, destination: Region) -> f64 {
    let origin_profile = origin.profile();
    let destination_profile = destination.profile();
    (origin_profile.outbound_strength + destination_profile.inbound_strength) / 2.0
        - origin_profile.truck_population
}

pub fn analyze_flow(origin: Option<Region>, destination: Option<Region>) -> FlowAnalysis {
    // Unresolved endpoints carry no flow signal.
    let imbalance = match (origin, destination) {
        (Some(origin), Some(destination)) => imbalance_score(origin, destination),
        _ => 0.0,
    };

    let (direction, multiplier) = classify(imbalance);

    FlowAnalysis {
        origin_region: origin,
        destination_region: destination,
        imbalance,
        direction,
        multiplier,
        truck_to_load_ratio: truck_to_load_ratio(direction, imbalance),
        temperature: temperature(imbalance),
    }
}

fn classify(imbalance: f64) -> (FlowDirection, f64) {
    if imbalance > 2.0 {
        let multiplier = if imbalance > 4.0 { 1.08 + 0.07 } else { 1.08 };
        (FlowDirection::Headhaul, multiplier)
    } else if imbalance < -2.0 {
        let multiplier = if imbalance < -4.0 { 0.88 - 0.05 } else { 0.88 };
        (FlowDirection::Backhaul, multiplier)
    } else {
        (FlowDirection::Balanced, 1.0)
    }
}

/// Display-only estimate of trucks competing per posted load. Monotone in
/// the imbalance and always inside the direction's band; it is a
/// presentation heuristic, not a measured quantity.
pub fn truck_to_load_ratio(direction: FlowDirection, imbalance: f64) -> f64 {
    let (low, high) = direction.ratio_band();
    // Position within the band: 0.0 = tightest capacity, 1.0 = loosest.
    let position = match direction {
        FlowDirection::Headhaul => 1.0 - ((imbalance - 2.0) / 4.0).clamp(0.0, 1.0),
        FlowDirection::Balanced => ((2.0 - imbalance) / 4.0).clamp(0.0, 1.0),
        FlowDirection::Backhaul => ((-imbalance - 2.0) / 4.0).clamp(0.0, 1.0),
    };
    let ratio = low + (high - low) * position;
    (ratio * 10.0).round() / 10.0
}

fn temperature(imbalance: f64) -> MarketTemperature {
    if imbalance > 4.0 {
        MarketTemperature::Hot
    } else if imbalance > 2.0 {
        MarketTemperature::Warm
    } else if imbalance >= -2.0 {
        MarketTemperature::Balanced
    } else if imbalance >= -4.0 {
        MarketTemperature::Cool
    } else {
        MarketTemperature::Cold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn west_coast_outbound_is_strong_headhaul() {
        // (9 + 7) / 2 - 3 = 5
        let flow = analyze_flow(Some(Region::WestCoast), Some(Region::Southwest));
        assert_eq!(flow.imbalance, 5.0);
        assert_eq!(flow.direction, FlowDirection::Headhaul);
        assert!((flow.multiplier - 1.15).abs() < 1e-9);
        assert_eq!(flow.temperature, MarketTemperature::Hot);
    }

    #[test]
    fn mountain_outbound_is_deep_backhaul() {
        // (3 + 9) / 2 - 8 = -2 (balanced edge); to the west coast: (3 + 8) / 2 - 8 = -2.5
        let edge = analyze_flow(Some(Region::Mountain), Some(Region::Northeast));
        assert_eq!(edge.imbalance, -2.0);
        assert_eq!(edge.direction, FlowDirection::Balanced);

        let flow = analyze_flow(Some(Region::Mountain), Some(Region::WestCoast));
        assert_eq!(flow.direction, FlowDirection::Backhaul);
        assert_eq!(flow.multiplier, 0.88);
        assert_eq!(flow.temperature, MarketTemperature::Cool);
    }

    #[test]
    fn unresolved_region_is_balanced() {
        let flow = analyze_flow(None, Some(Region::Midwest));
        assert_eq!(flow.direction, FlowDirection::Balanced);
        assert_eq!(flow.multiplier, 1.0);
        assert_eq!(flow.truck_to_load_ratio, 2.2);
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(classify(2.0).0, FlowDirection::Balanced);
        assert_eq!(classify(2.01).1, 1.08);
        assert_eq!(classify(4.0).1, 1.08);
        assert_eq!(classify(-4.0).1, 0.88);
        assert!((classify(-4.5).1 - 0.83).abs() < 1e-9);
    }

    #[test]
    fn ratio_stays_inside_direction_band() {
        for step in -40..=40 {
            let imbalance = step as f64 * 0.25;
            let (direction, _) = classify(imbalance);
            let (low, high) = direction.ratio_band();
            let ratio = truck_to_load_ratio(direction, imbalance);
            assert!(ratio >= low && ratio <= high, "{imbalance} -> {ratio}");
        }
    }
}
