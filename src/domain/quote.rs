//! Assembles a full quote: cost, recommended rate, market estimate and the
//! comparison between them.

use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

use super::cost::{compute_cost, CostBreakdown};
use super::entities::{CostSettings, RateRequest, VehicleClass, VehicleProfile, WeatherCondition};
use super::market::{compare_to_market, estimate_market, MarketComparison, MarketEstimate, MarketQuery};
use super::ports::{CostSettingsProvider, FuelPriceSource, VehicleRegistry};
use super::rate::{compute_rate, RateResult};

/// Route data looked up by the caller (distance and forecast services).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteEnrichment {
    /// Used when the request itself carries no weather.
    pub weather: Option<WeatherCondition>,
    /// Used when the request carries no usable mileage.
    pub miles: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct QuoteInput {
    pub request: RateRequest,
    pub vehicle: Option<VehicleProfile>,
    pub settings: Option<CostSettings>,
    pub enrichment: Option<RouteEnrichment>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelPriceOrigin {
    Override,
    Cached,
    NationalDefault,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    /// RFC 3339, UTC.
    pub created_at: String,
    pub vehicle: VehicleProfile,
    pub fuel_price_source: FuelPriceOrigin,
    pub cost: CostBreakdown,
    pub rate: RateResult,
    pub market: MarketEstimate,
    pub comparison: MarketComparison,
}

pub struct QuoteEngine<F> {
    fuel_prices: F,
}

impl<F: FuelPriceSource> QuoteEngine<F> {
    pub fn new(fuel_prices: F) -> Self {
        Self { fuel_prices }
    }

    pub fn fuel_prices(&self) -> &F {
        &self.fuel_prices
    }

    pub async fn quote(&self, input: QuoteInput) -> Quote {
        let QuoteInput {
            mut request,
            vehicle,
            settings,
            enrichment,
        } = input;

        if let Some(enrichment) = enrichment {
            apply_enrichment(&mut request, enrichment);
        }

        let vehicle = vehicle.unwrap_or_default();
        let settings = settings.unwrap_or_default().resolve();
        let (fuel_price, fuel_price_source) = self.resolve_fuel_price(&request, &vehicle).await;

        let cost = compute_cost(&vehicle, &settings, &request, fuel_price);
        let rate = compute_rate(&cost, &settings, &request, vehicle.class);

        let market = estimate_market(&market_query(&request, &vehicle));
        let comparison = compare_to_market(rate.recommended_rate, request.route.miles(), &market);

        Quote {
            id: Uuid::new_v4(),
            created_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
            vehicle,
            fuel_price_source,
            cost,
            rate,
            market,
            comparison,
        }
    }

    /// Quotes with the user's stored settings and, if given, one of their
    /// vehicles. An unknown user gets default settings; a missing or unknown
    /// vehicle falls back to `fallback_class`, then to a semi.
    pub async fn quote_for_user<P, V>(
        &self,
        user_id: &str,
        vehicle_id: Option<&str>,
        fallback_class: Option<VehicleClass>,
        request: RateRequest,
        settings: &P,
        vehicles: &V,
    ) -> Quote
    where
        P: CostSettingsProvider,
        V: VehicleRegistry,
    {
        let user_settings = settings.cost_settings(user_id);
        let vehicle = resolve_vehicle(vehicle_id, fallback_class, vehicles);

        self.quote(QuoteInput {
            request,
            vehicle,
            settings: user_settings,
            enrichment: None,
        })
        .await
    }

    /// Override, then the cached regional price for the origin state, then
    /// the national default for the vehicle's fuel.
    async fn resolve_fuel_price(
        &self,
        request: &RateRequest,
        vehicle: &VehicleProfile,
    ) -> (f64, FuelPriceOrigin) {
        if let Some(price) = request.fuel_price_override() {
            return (price, FuelPriceOrigin::Override);
        }

        let fuel = vehicle.class.fuel_type();
        let state = request.route.origin.state.trim().to_ascii_uppercase();
        match self.fuel_prices.cached_price(&state, fuel).await {
            Some(price) if price.is_finite() && price > 0.0 => (price, FuelPriceOrigin::Cached),
            _ => (fuel.national_default_price(), FuelPriceOrigin::NationalDefault),
        }
    }
}

/// The stored vehicle if it exists, else the defaults for `fallback_class`.
pub fn resolve_vehicle<V: VehicleRegistry>(
    vehicle_id: Option<&str>,
    fallback_class: Option<VehicleClass>,
    vehicles: &V,
) -> Option<VehicleProfile> {
    let stored = vehicle_id.and_then(|id| {
        let found = vehicles.vehicle(id);
        if found.is_none() {
            eprintln!("[quote] vehicle {id} not found; using class defaults");
        }
        found
    });
    stored.or_else(|| fallback_class.map(VehicleProfile::for_class))
}

fn apply_enrichment(request: &mut RateRequest, enrichment: RouteEnrichment) {
    if request.conditions.weather.is_none() {
        request.conditions.weather = enrichment.weather;
    }
    if request.route.miles() <= 0.0 {
        if let Some(miles) = enrichment.miles.filter(|m| m.is_finite() && *m > 0.0) {
            request.route.total_miles = miles;
        }
    }
}

/// A season hint only counts when no pickup date was given; otherwise the
/// pickup date (or today) drives the seasonal factor.
fn market_query(request: &RateRequest, vehicle: &VehicleProfile) -> MarketQuery {
    let pickup = request.pickup();
    let season = request.conditions.season;
    let pickup_date = match (pickup, season) {
        (Some(date), _) => Some(date),
        (None, Some(_)) => None,
        (None, None) => Some(OffsetDateTime::now_utc().date()),
    };

    MarketQuery {
        origin_state: request.route.origin.state.clone(),
        destination_state: request.route.destination.state.clone(),
        total_miles: request.route.miles(),
        vehicle_class: vehicle.class,
        freight_class: request.load.freight_class,
        pickup_date,
        season,
    }
}
