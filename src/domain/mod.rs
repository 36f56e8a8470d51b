//! Pricing, market and counterparty-risk logic. Everything here is pure
//! except the lookups behind the traits in [`ports`].

pub mod cost;
pub mod entities;
pub mod flow;
pub mod market;
pub mod ports;
pub mod quote;
pub mod rate;
pub mod regions;
pub mod risk;

pub use cost::{compute_cost, CostBreakdown, ServiceFee, ServiceFeeKind};
pub use entities::{
    Conditions, CostSettings, FreightClass, FuelType, LoadDetails, LoadType, RateRequest,
    ResolvedCostSettings, RouteInfo, Season, ServiceFlags, Stop, VehicleClass, VehicleProfile,
    WeatherCondition,
};
pub use flow::{analyze_flow, FlowAnalysis, FlowDirection, MarketTemperature};
pub use market::{
    compare_to_market, estimate_market, ConfidenceLevel, MarketComparison, MarketEstimate,
    MarketPosition, MarketQuery,
};
pub use ports::{
    CarrierRegistry, CostSettingsProvider, FuelPriceSource, NoFuelPrices, RegistryError,
    VehicleRegistry,
};
pub use quote::{
    resolve_vehicle, FuelPriceOrigin, Quote, QuoteEngine, QuoteInput, RouteEnrichment,
};
pub use rate::{compute_rate, RateResult, UrgencyTier};
pub use regions::{region_for_state, Region};
pub use risk::{
    assess_risk, classify_query, verify_carrier, CarrierMatch, CarrierVerification, RegistryRecord,
    RiskAssessment, RiskLevel,
};
