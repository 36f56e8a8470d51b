//! Input records shared by the cost, rate and market calculators.

use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date};

/// National fallback diesel price (USD per gallon) when neither an override
/// nor a cached regional price is available.
pub const DEFAULT_DIESEL_PRICE: f64 = 4.00;
pub const DEFAULT_GASOLINE_PRICE: f64 = 3.50;

pub const DEFAULT_ANNUAL_INSURANCE: f64 = 12_000.0;
pub const DEFAULT_MONTHLY_VEHICLE_PAYMENT: f64 = 1_500.0;
pub const DEFAULT_ANNUAL_LICENSING: f64 = 2_500.0;
pub const DEFAULT_MONTHLY_OVERHEAD: f64 = 500.0;
pub const DEFAULT_ANNUAL_MILES: f64 = 100_000.0;
pub const DEFAULT_MAINTENANCE_CPM: f64 = 0.35;
pub const DEFAULT_TIRE_CPM: f64 = 0.05;
pub const DEFAULT_LIFTGATE_FEE: f64 = 75.0;
pub const DEFAULT_PALLET_JACK_FEE: f64 = 50.0;
pub const DEFAULT_DRIVER_ASSIST_FEE: f64 = 100.0;
pub const DEFAULT_WHITE_GLOVE_FEE: f64 = 250.0;
pub const DEFAULT_TRACKING_FEE: f64 = 25.0;
pub const DEFAULT_REEFER_FUEL_PER_HOUR: f64 = 4.00;
pub const DEFAULT_REEFER_MAINTENANCE_PER_HOUR: f64 = 1.50;
pub const DEFAULT_PROFIT_MARGIN: f64 = 0.15;
pub const DEFAULT_FACTORING_RATE: f64 = 0.03;
pub const DEFAULT_EXPEDITE_MULTIPLIER: f64 = 1.25;
pub const DEFAULT_RUSH_MULTIPLIER: f64 = 1.50;
pub const DEFAULT_SAME_DAY_MULTIPLIER: f64 = 2.00;
pub const DEFAULT_TEAM_MULTIPLIER: f64 = 1.50;

/// Rounds a currency amount to cents.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    #[default]
    Semi,
    BoxTruck,
    CargoVan,
    Sprinter,
    Reefer,
}

/// Industry figures used when a vehicle record leaves a value blank.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleDefaults {
    pub mpg: f64,
    pub maintenance_cpm: f64,
    pub tire_cpm: f64,
    /// Per-mile floor the rate calculator never quotes below.
    pub base_rate_per_mile: f64,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 5] = [
        VehicleClass::Semi,
        VehicleClass::BoxTruck,
        VehicleClass::CargoVan,
        VehicleClass::Sprinter,
        VehicleClass::Reefer,
    ];

    pub fn defaults(self) -> VehicleDefaults {
        match self {
            Self::Semi => VehicleDefaults {
                mpg: 6.5,
                maintenance_cpm: 0.35,
                tire_cpm: 0.05,
                base_rate_per_mile: 2.50,
            },
            Self::Reefer => VehicleDefaults {
                mpg: 6.0,
                maintenance_cpm: 0.40,
                tire_cpm: 0.06,
                base_rate_per_mile: 2.85,
            },
            Self::BoxTruck => VehicleDefaults {
                mpg: 10.0,
                maintenance_cpm: 0.20,
                tire_cpm: 0.03,
                base_rate_per_mile: 2.00,
            },
            Self::Sprinter => VehicleDefaults {
                mpg: 18.0,
                maintenance_cpm: 0.12,
                tire_cpm: 0.02,
                base_rate_per_mile: 1.75,
            },
            Self::CargoVan => VehicleDefaults {
                mpg: 20.0,
                maintenance_cpm: 0.10,
                tire_cpm: 0.02,
                base_rate_per_mile: 1.50,
            },
        }
    }

    pub fn fuel_type(self) -> FuelType {
        match self {
            Self::CargoVan => FuelType::Gasoline,
            _ => FuelType::Diesel,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Semi => "Semi",
            Self::BoxTruck => "Box truck",
            Self::CargoVan => "Cargo van",
            Self::Sprinter => "Sprinter",
            Self::Reefer => "Reefer",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Diesel,
    Gasoline,
}

impl FuelType {
    pub fn national_default_price(self) -> f64 {
        match self {
            Self::Diesel => DEFAULT_DIESEL_PRICE,
            Self::Gasoline => DEFAULT_GASOLINE_PRICE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diesel => "diesel",
            Self::Gasoline => "gasoline",
        }
    }
}

/// A vehicle as stored in the caller's registry. Blank economics fall back
/// to the class defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub class: VehicleClass,
    #[serde(default)]
    pub mpg: Option<f64>,
    #[serde(default)]
    pub maintenance_cpm: Option<f64>,
    #[serde(default)]
    pub tire_cpm: Option<f64>,
}

impl VehicleProfile {
    pub fn for_class(class: VehicleClass) -> Self {
        Self {
            class,
            ..Self::default()
        }
    }

    /// Fuel economy, ignoring non-positive or non-finite values.
    pub fn effective_mpg(&self) -> f64 {
        self.mpg
            .filter(|mpg| mpg.is_finite() && *mpg > 0.0)
            .unwrap_or_else(|| self.class.defaults().mpg)
    }
}

/// Per-user cost configuration. Every field is optional; [`CostSettings::resolve`]
/// fills the blanks with industry defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostSettings {
    pub annual_insurance: Option<f64>,
    pub monthly_vehicle_payment: Option<f64>,
    pub annual_licensing: Option<f64>,
    pub monthly_overhead: Option<f64>,
    pub annual_miles: Option<f64>,
    pub maintenance_cpm: Option<f64>,
    pub tire_cpm: Option<f64>,
    pub liftgate_fee: Option<f64>,
    pub pallet_jack_fee: Option<f64>,
    pub driver_assist_fee: Option<f64>,
    pub white_glove_fee: Option<f64>,
    pub tracking_fee: Option<f64>,
    pub reefer_fuel_per_hour: Option<f64>,
    pub reefer_maintenance_per_hour: Option<f64>,
    pub profit_margin: Option<f64>,
    pub factoring_rate: Option<f64>,
    pub expedite_multiplier: Option<f64>,
    pub rush_multiplier: Option<f64>,
    pub same_day_multiplier: Option<f64>,
    pub team_multiplier: Option<f64>,
}

/// [`CostSettings`] with every default applied.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedCostSettings {
    pub annual_insurance: f64,
    pub monthly_vehicle_payment: f64,
    pub annual_licensing: f64,
    pub monthly_overhead: f64,
    pub annual_miles: f64,
    /// `None` when the user left it blank, so the vehicle class can decide.
    pub maintenance_cpm: Option<f64>,
    pub tire_cpm: Option<f64>,
    pub liftgate_fee: f64,
    pub pallet_jack_fee: f64,
    pub driver_assist_fee: f64,
    pub white_glove_fee: f64,
    pub tracking_fee: f64,
    pub reefer_fuel_per_hour: f64,
    pub reefer_maintenance_per_hour: f64,
    pub profit_margin: f64,
    pub factoring_rate: f64,
    pub expedite_multiplier: f64,
    pub rush_multiplier: f64,
    pub same_day_multiplier: f64,
    pub team_multiplier: f64,
}

impl CostSettings {
    pub fn resolve(&self) -> ResolvedCostSettings {
        let non_negative = |value: Option<f64>, default: f64| {
            value
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(default)
        };
        let multiplier = |value: Option<f64>, default: f64| {
            value
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(default)
        };

        ResolvedCostSettings {
            annual_insurance: non_negative(self.annual_insurance, DEFAULT_ANNUAL_INSURANCE),
            monthly_vehicle_payment: non_negative(
                self.monthly_vehicle_payment,
                DEFAULT_MONTHLY_VEHICLE_PAYMENT,
            ),
            annual_licensing: non_negative(self.annual_licensing, DEFAULT_ANNUAL_LICENSING),
            monthly_overhead: non_negative(self.monthly_overhead, DEFAULT_MONTHLY_OVERHEAD),
            // Zero annual miles would divide by zero in the fixed-cost allocation.
            annual_miles: self
                .annual_miles
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(DEFAULT_ANNUAL_MILES),
            maintenance_cpm: self
                .maintenance_cpm
                .filter(|v| v.is_finite() && *v >= 0.0),
            tire_cpm: self.tire_cpm.filter(|v| v.is_finite() && *v >= 0.0),
            liftgate_fee: non_negative(self.liftgate_fee, DEFAULT_LIFTGATE_FEE),
            pallet_jack_fee: non_negative(self.pallet_jack_fee, DEFAULT_PALLET_JACK_FEE),
            driver_assist_fee: non_negative(self.driver_assist_fee, DEFAULT_DRIVER_ASSIST_FEE),
            white_glove_fee: non_negative(self.white_glove_fee, DEFAULT_WHITE_GLOVE_FEE),
            tracking_fee: non_negative(self.tracking_fee, DEFAULT_TRACKING_FEE),
            reefer_fuel_per_hour: non_negative(
                self.reefer_fuel_per_hour,
                DEFAULT_REEFER_FUEL_PER_HOUR,
            ),
            reefer_maintenance_per_hour: non_negative(
                self.reefer_maintenance_per_hour,
                DEFAULT_REEFER_MAINTENANCE_PER_HOUR,
            ),
            profit_margin: self
                .profit_margin
                .filter(|v| v.is_finite())
                .unwrap_or(DEFAULT_PROFIT_MARGIN)
                .clamp(0.0, 0.95),
            factoring_rate: non_negative(self.factoring_rate, DEFAULT_FACTORING_RATE),
            expedite_multiplier: multiplier(self.expedite_multiplier, DEFAULT_EXPEDITE_MULTIPLIER),
            rush_multiplier: multiplier(self.rush_multiplier, DEFAULT_RUSH_MULTIPLIER),
            same_day_multiplier: multiplier(self.same_day_multiplier, DEFAULT_SAME_DAY_MULTIPLIER),
            team_multiplier: multiplier(self.team_multiplier, DEFAULT_TEAM_MULTIPLIER),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Normal,
    Rain,
    Fog,
    HighWind,
    Snow,
    Ice,
    SevereStorm,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadType {
    #[default]
    FullTruckload,
    Partial,
    Ltl,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreightClass {
    #[default]
    DryVan,
    Flatbed,
    Fragile,
    Refrigerated,
    Oversized,
    Hazmat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    #[serde(default)]
    pub city: Option<String>,
    /// Two-letter state code. Unknown codes are tolerated downstream.
    pub state: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub origin: Stop,
    pub destination: Stop,
    pub total_miles: f64,
    #[serde(default)]
    pub deadhead_miles: f64,
    #[serde(default)]
    pub states_crossed: Vec<String>,
}

impl RouteInfo {
    /// Paid miles, never negative or NaN.
    pub fn miles(&self) -> f64 {
        if self.total_miles.is_finite() && self.total_miles > 0.0 {
            self.total_miles
        } else {
            0.0
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadDetails {
    pub weight_lbs: Option<f64>,
    pub load_type: LoadType,
    pub freight_class: FreightClass,
    pub commodity: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceFlags {
    pub is_expedite: bool,
    pub is_team: bool,
    pub is_rush: bool,
    pub is_same_day: bool,
    pub is_reefer: bool,
    pub needs_liftgate: bool,
    pub needs_pallet_jack: bool,
    pub needs_driver_assist: bool,
    pub needs_white_glove: bool,
    pub needs_tracking: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conditions {
    /// Left unset when the caller expects route enrichment to supply it.
    pub weather: Option<WeatherCondition>,
    pub season: Option<Season>,
    pub fuel_price_override: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RateRequest {
    pub route: RouteInfo,
    #[serde(default)]
    pub load: LoadDetails,
    #[serde(default)]
    pub services: ServiceFlags,
    #[serde(default)]
    pub conditions: Conditions,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub pickup_date: Option<String>,
    #[serde(default)]
    pub delivery_date: Option<String>,
}

impl RateRequest {
    pub fn weather(&self) -> WeatherCondition {
        self.conditions.weather.unwrap_or_default()
    }

    /// Parsed pickup date; malformed dates are treated as absent.
    pub fn pickup(&self) -> Option<Date> {
        parse_date(self.pickup_date.as_deref())
    }

    pub fn delivery(&self) -> Option<Date> {
        parse_date(self.delivery_date.as_deref())
    }

    /// A usable fuel price override, if the caller supplied one.
    pub fn fuel_price_override(&self) -> Option<f64> {
        self.conditions
            .fuel_price_override
            .filter(|price| price.is_finite() && *price > 0.0)
    }
}

pub fn parse_date(raw: Option<&str>) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    raw.and_then(|value| Date::parse(value.trim(), format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_settings_resolve_to_industry_defaults() {
        let resolved = CostSettings::default().resolve();
        assert_eq!(resolved.annual_insurance, 12_000.0);
        assert_eq!(resolved.monthly_vehicle_payment, 1_500.0);
        assert_eq!(resolved.annual_miles, 100_000.0);
        assert_eq!(resolved.profit_margin, 0.15);
        assert_eq!(resolved.same_day_multiplier, 2.00);
        assert_eq!(resolved.team_multiplier, 1.50);
        assert!(resolved.maintenance_cpm.is_none());
    }

    #[test]
    fn zero_annual_miles_falls_back_to_default() {
        let settings = CostSettings {
            annual_miles: Some(0.0),
            ..CostSettings::default()
        };
        assert_eq!(settings.resolve().annual_miles, DEFAULT_ANNUAL_MILES);
    }

    #[test]
    fn margin_is_clamped_below_one() {
        let settings = CostSettings {
            profit_margin: Some(1.5),
            ..CostSettings::default()
        };
        assert_eq!(settings.resolve().profit_margin, 0.95);
    }

    #[test]
    fn vehicle_without_mpg_uses_class_default() {
        let mut vehicle = VehicleProfile::for_class(VehicleClass::BoxTruck);
        assert_eq!(vehicle.effective_mpg(), 10.0);
        vehicle.mpg = Some(-3.0);
        assert_eq!(vehicle.effective_mpg(), 10.0);
        vehicle.mpg = Some(12.5);
        assert_eq!(vehicle.effective_mpg(), 12.5);
    }

    #[test]
    fn request_parses_minimal_json() {
        let json = r#"{
            "route": {
                "origin": { "state": "TX" },
                "destination": { "state": "IL" },
                "total_miles": 1000
            },
            "pickup_date": "2025-11-03"
        }"#;
        let request: RateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.weather(), WeatherCondition::Normal);
        assert_eq!(request.load.freight_class, FreightClass::DryVan);
        assert_eq!(request.pickup().map(|d| d.month()), Some(time::Month::November));
        assert!(request.delivery().is_none());
    }

    #[test]
    fn malformed_date_is_ignored() {
        assert!(parse_date(Some("next tuesday")).is_none());
    }
}
