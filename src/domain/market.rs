//! Independent market-rate triangulation for a lane.
//!
//! - Looks up the lane benchmark for the origin/destination regions.
//! - Scales it by distance, equipment, season and freight-flow factors.
//! - Scores how much the estimate can be trusted and how easy a reload is.

use serde::{Deserialize, Serialize};
use time::Date;

use super::entities::{round_cents, FreightClass, Season, VehicleClass};
use super::flow::{analyze_flow, FlowAnalysis, FlowDirection, MarketTemperature};
use super::regions::{
    distance_band, distance_multiplier, equipment_multiplier, lane_benchmark, region_for_state,
    return_load_profile, seasonal_factor, Region,
};

pub const CONFIDENCE_MIN: i32 = 40;
pub const CONFIDENCE_MAX: i32 = 95;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarketQuery {
    pub origin_state: String,
    pub destination_state: String,
    pub total_miles: f64,
    pub vehicle_class: VehicleClass,
    pub freight_class: FreightClass,
    pub pickup_date: Option<Date>,
    /// Only consulted when there is no pickup date.
    pub season: Option<Season>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn from_score(score: i32) -> Self {
        if score >= 75 {
            Self::High
        } else if score >= 55 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketFactor {
    pub name: String,
    pub multiplier: f64,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupplyDemand {
    pub origin_region: Option<Region>,
    pub destination_region: Option<Region>,
    pub flow_direction: FlowDirection,
    pub imbalance: f64,
    pub truck_to_load_ratio: f64,
    pub market_temperature: MarketTemperature,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReturnLoadPotential {
    pub score: u8,
    pub rating: String,
    pub avg_daily_loads: u32,
    /// Expected per-mile rate for a reload out of the destination.
    pub estimated_return_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketEstimate {
    pub low_rate_per_mile: f64,
    pub mid_rate_per_mile: f64,
    pub high_rate_per_mile: f64,
    pub low_total: f64,
    pub mid_total: f64,
    pub high_total: f64,
    pub total_miles: f64,
    pub confidence: i32,
    pub confidence_level: ConfidenceLevel,
    pub lane_benchmarked: bool,
    pub factors: Vec<MarketFactor>,
    pub supply_demand: SupplyDemand,
    pub return_load: ReturnLoadPotential,
}

pub fn estimate_market(query: &MarketQuery) -> MarketEstimate {
    let miles = if query.total_miles.is_finite() && query.total_miles > 0.0 {
        query.total_miles
    } else {
        0.0
    };
    let origin = region_for_state(&query.origin_state);
    let destination = region_for_state(&query.destination_state);

    let (benchmark, lane_benchmarked) = lane_benchmark(origin, destination);
    let flow = analyze_flow(origin, destination);
    let factors = market_factors(query, miles, &flow);
    let combined: f64 = factors.iter().map(|factor| factor.multiplier).product();

    let low_rate_per_mile = round_cents(benchmark.low * combined);
    let mid_rate_per_mile = round_cents(benchmark.mid * combined);
    let high_rate_per_mile = round_cents(benchmark.high * combined);

    let confidence = confidence_score(origin, destination, miles);

    MarketEstimate {
        low_rate_per_mile,
        mid_rate_per_mile,
        high_rate_per_mile,
        low_total: (low_rate_per_mile * miles).round(),
        mid_total: (mid_rate_per_mile * miles).round(),
        high_total: (high_rate_per_mile * miles).round(),
        total_miles: miles,
        confidence,
        confidence_level: ConfidenceLevel::from_score(confidence),
        lane_benchmarked,
        factors,
        supply_demand: SupplyDemand {
            origin_region: origin,
            destination_region: destination,
            flow_direction: flow.direction,
            imbalance: flow.imbalance,
            truck_to_load_ratio: flow.truck_to_load_ratio,
            market_temperature: flow.temperature,
        },
        return_load: return_load_potential(destination, mid_rate_per_mile),
    }
}

fn market_factors(query: &MarketQuery, miles: f64, flow: &FlowAnalysis) -> Vec<MarketFactor> {
    let distance = distance_multiplier(miles);
    let equipment = equipment_multiplier(query.vehicle_class, query.freight_class);
    let (seasonal, seasonal_description) = seasonal_factor(query.pickup_date, query.season);

    let flow_description = match flow.direction {
        FlowDirection::Headhaul => "Headhaul lane: freight outpaces trucks at origin",
        FlowDirection::Balanced => "Balanced lane: capacity roughly matches freight",
        FlowDirection::Backhaul => "Backhaul lane: trucks outnumber outbound freight",
    };

    vec![
        MarketFactor {
            name: "distance".to_string(),
            multiplier: distance,
            description: format!("{} ({miles:.0} mi)", distance_band(miles)),
        },
        MarketFactor {
            name: "equipment".to_string(),
            multiplier: equipment,
            description: format!(
                "{} hauling {:?}",
                query.vehicle_class.label(),
                query.freight_class
            ),
        },
        MarketFactor {
            name: "seasonal".to_string(),
            multiplier: seasonal,
            description: seasonal_description,
        },
        MarketFactor {
            name: "flow".to_string(),
            multiplier: flow.multiplier,
            description: flow_description.to_string(),
        },
    ]
}

/// Starts at 70, rewards resolved and major regions and well-benchmarked
/// distances, then clamps to [40, 95].
pub fn confidence_score(origin: Option<Region>, destination: Option<Region>, miles: f64) -> i32 {
    let mut score = 70;

    match (origin, destination) {
        (Some(_), Some(_)) => score += 15,
        _ => {
            let unresolved = [origin, destination].iter().filter(|r| r.is_none()).count() as i32;
            score -= 15 * unresolved;
        }
    }

    for region in [origin, destination].into_iter().flatten() {
        if region.is_major() {
            score += 5;
        }
    }

    if (400.0..=1500.0).contains(&miles) {
        score += 5;
    } else if !(200.0..=2500.0).contains(&miles) {
        score -= 10;
    }

    score.clamp(CONFIDENCE_MIN, CONFIDENCE_MAX)
}

fn return_load_potential(destination: Option<Region>, market_mid: f64) -> ReturnLoadPotential {
    let profile = return_load_profile(destination);
    let outbound_strength = destination
        .map(|region| region.profile().outbound_strength)
        .unwrap_or(5.0);

    ReturnLoadPotential {
        score: profile.score,
        rating: profile.rating.to_string(),
        avg_daily_loads: profile.avg_daily_loads,
        estimated_return_rate: round_cents(market_mid * (0.70 + outbound_strength / 10.0 * 0.25)),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketPosition {
    BelowMarket,
    AtMarket,
    AboveMarket,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketComparison {
    pub position: MarketPosition,
    pub percentile: u8,
    pub rate_per_mile: f64,
    pub difference_from_mid: f64,
    pub difference_percent: f64,
    pub message: String,
}

/// Places an arbitrary trip rate against the estimate's low/high band. A
/// rate exactly on either edge counts as at market.
pub fn compare_to_market(rate: f64, miles: f64, estimate: &MarketEstimate) -> MarketComparison {
    let rate_per_mile = if miles > 0.0 { rate / miles } else { 0.0 };
    let low = estimate.low_rate_per_mile;
    let mid = estimate.mid_rate_per_mile;
    let high = estimate.high_rate_per_mile;

    let (position, percentile) = if rate_per_mile < low {
        let percentile = if low > 0.0 {
            (rate_per_mile / low * 25.0).round().max(1.0)
        } else {
            1.0
        };
        (MarketPosition::BelowMarket, percentile)
    } else if rate_per_mile > high {
        let spread = high - mid;
        let overage = if spread > 0.0 {
            (rate_per_mile - high) / spread
        } else {
            1.0
        };
        (
            MarketPosition::AboveMarket,
            (75.0 + (overage * 25.0).round()).min(99.0),
        )
    } else {
        let band = high - low;
        let percentile = if band > 0.0 {
            25.0 + (rate_per_mile - low) / band * 50.0
        } else {
            50.0
        };
        (MarketPosition::AtMarket, percentile.round())
    };

    let difference_from_mid = rate_per_mile - mid;
    let difference_percent = if mid > 0.0 {
        difference_from_mid / mid * 100.0
    } else {
        0.0
    };

    let message = match position {
        MarketPosition::BelowMarket => format!(
            "${rate_per_mile:.2}/mi is below the ${low:.2}-${high:.2} market band; consider negotiating up"
        ),
        MarketPosition::AtMarket => format!(
            "${rate_per_mile:.2}/mi is within the ${low:.2}-${high:.2} market band"
        ),
        MarketPosition::AboveMarket => format!(
            "${rate_per_mile:.2}/mi is above the ${low:.2}-${high:.2} market band; expect pushback"
        ),
    };

    MarketComparison {
        position,
        percentile: percentile.clamp(1.0, 99.0) as u8,
        rate_per_mile: round_cents(rate_per_mile),
        difference_from_mid: round_cents(difference_from_mid),
        difference_percent: (difference_percent * 10.0).round() / 10.0,
        message,
    }
}
