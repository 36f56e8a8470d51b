//! Cost-plus pricing with multiplicative surcharges.

use serde::{Deserialize, Serialize};

use super::cost::CostBreakdown;
use super::entities::{
    round_cents, FreightClass, LoadType, RateRequest, ResolvedCostSettings, ServiceFlags,
    VehicleClass, WeatherCondition,
};

/// Quoted band around the recommended rate.
pub const MIN_RATE_FACTOR: f64 = 0.85;
pub const MAX_RATE_FACTOR: f64 = 1.20;

pub fn weather_multiplier(weather: WeatherCondition) -> f64 {
    match weather {
        WeatherCondition::Normal => 1.00,
        WeatherCondition::Rain => 1.05,
        WeatherCondition::Fog => 1.08,
        WeatherCondition::HighWind => 1.10,
        WeatherCondition::Snow => 1.20,
        WeatherCondition::Ice => 1.35,
        WeatherCondition::SevereStorm => 1.50,
    }
}

pub fn load_type_multiplier(load_type: LoadType) -> f64 {
    match load_type {
        LoadType::FullTruckload => 1.00,
        LoadType::Partial => 0.85,
        LoadType::Ltl => 0.75,
    }
}

pub fn freight_class_multiplier(freight_class: FreightClass) -> f64 {
    match freight_class {
        FreightClass::DryVan => 1.00,
        FreightClass::Flatbed => 1.15,
        FreightClass::Fragile => 1.20,
        FreightClass::Refrigerated => 1.25,
        FreightClass::Oversized => 1.40,
        FreightClass::Hazmat => 1.50,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyTier {
    SameDay,
    Rush,
    Expedite,
}

/// Urgency tiers in priority order. Tiers never stack: the first flagged
/// tier sets the multiplier.
pub fn urgency_tiers(
    flags: &ServiceFlags,
    settings: &ResolvedCostSettings,
) -> [(UrgencyTier, bool, f64); 3] {
    [
        (UrgencyTier::SameDay, flags.is_same_day, settings.same_day_multiplier),
        (UrgencyTier::Rush, flags.is_rush, settings.rush_multiplier),
        (UrgencyTier::Expedite, flags.is_expedite, settings.expedite_multiplier),
    ]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceMultiplier {
    pub urgency: Option<UrgencyTier>,
    pub urgency_multiplier: f64,
    pub team: bool,
    pub team_multiplier: f64,
    pub combined: f64,
}

/// Urgency tier (same-day > rush > expedite) times the team multiplier
/// when team driving is requested.
pub fn service_multiplier(flags: &ServiceFlags, settings: &ResolvedCostSettings) -> ServiceMultiplier {
    let (urgency, urgency_multiplier) = urgency_tiers(flags, settings)
        .into_iter()
        .find(|(_, enabled, _)| *enabled)
        .map(|(tier, _, multiplier)| (Some(tier), multiplier))
        .unwrap_or((None, 1.0));

    let team_multiplier = if flags.is_team {
        settings.team_multiplier
    } else {
        1.0
    };

    ServiceMultiplier {
        urgency,
        urgency_multiplier,
        team: flags.is_team,
        team_multiplier,
        combined: urgency_multiplier * team_multiplier,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppliedMultipliers {
    pub weather: f64,
    pub load_type: f64,
    pub freight_class: f64,
    pub service: ServiceMultiplier,
    pub total: f64,
}

pub fn applied_multipliers(request: &RateRequest, settings: &ResolvedCostSettings) -> AppliedMultipliers {
    let weather = weather_multiplier(request.weather());
    let load_type = load_type_multiplier(request.load.load_type);
    let freight_class = freight_class_multiplier(request.load.freight_class);
    let service = service_multiplier(&request.services, settings);
    let total = weather * load_type * freight_class * service.combined;

    AppliedMultipliers {
        weather,
        load_type,
        freight_class,
        service,
        total,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateResult {
    pub recommended_rate: f64,
    pub min_rate: f64,
    pub max_rate: f64,
    pub price_per_mile: f64,
    pub cost_per_mile: f64,
    pub total_cost: f64,
    pub multipliers: AppliedMultipliers,
    pub target_margin: f64,
    /// Realised margin; above target when the class floor was applied.
    pub profit_margin: f64,
    pub estimated_profit: f64,
    pub profit_per_mile: f64,
    pub base_rate_per_mile: f64,
    pub floor_applied: bool,
    pub factoring_fee: f64,
    pub net_after_factoring: f64,
}

pub fn compute_rate(
    cost: &CostBreakdown,
    settings: &ResolvedCostSettings,
    request: &RateRequest,
    vehicle_class: VehicleClass,
) -> RateResult {
    let miles = request.route.miles();
    let multipliers = applied_multipliers(request, settings);
    let base_rate_per_mile = vehicle_class.defaults().base_rate_per_mile;

    if miles <= 0.0 {
        return RateResult {
            recommended_rate: 0.0,
            min_rate: 0.0,
            max_rate: 0.0,
            price_per_mile: 0.0,
            cost_per_mile: 0.0,
            total_cost: cost.total_cost,
            multipliers,
            target_margin: settings.profit_margin,
            profit_margin: 0.0,
            estimated_profit: round_cents(-cost.total_cost),
            profit_per_mile: 0.0,
            base_rate_per_mile,
            floor_applied: false,
            factoring_fee: 0.0,
            net_after_factoring: 0.0,
        };
    }

    let cost_per_mile = cost.total_cost / miles;

    let target_price_per_mile = cost_per_mile / (1.0 - settings.profit_margin) * multipliers.total;
    let floor_price_per_mile = base_rate_per_mile * multipliers.total;
    let floor_applied = floor_price_per_mile > target_price_per_mile;
    let price_per_mile = target_price_per_mile.max(floor_price_per_mile);

    let recommended_rate = (price_per_mile * miles).round();
    let min_rate = (recommended_rate * MIN_RATE_FACTOR).round();
    let max_rate = (recommended_rate * MAX_RATE_FACTOR).round();

    let estimated_profit = recommended_rate - cost.total_cost;
    let profit_margin = if recommended_rate > 0.0 {
        estimated_profit / recommended_rate
    } else {
        0.0
    };
    let profit_per_mile = estimated_profit / miles;
    let factoring_fee = recommended_rate * settings.factoring_rate;

    RateResult {
        recommended_rate,
        min_rate,
        max_rate,
        price_per_mile: round_cents(price_per_mile),
        cost_per_mile: round_cents(cost_per_mile),
        total_cost: cost.total_cost,
        multipliers,
        target_margin: settings.profit_margin,
        profit_margin: (profit_margin * 10_000.0).round() / 10_000.0,
        estimated_profit: round_cents(estimated_profit),
        profit_per_mile: round_cents(profit_per_mile),
        base_rate_per_mile,
        floor_applied,
        factoring_fee: round_cents(factoring_fee),
        net_after_factoring: round_cents(recommended_rate - factoring_fee),
    }
}
