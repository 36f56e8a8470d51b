//! Carrier operating cost for a single trip.

use serde::{Deserialize, Serialize};

use super::entities::{round_cents, RateRequest, ResolvedCostSettings, VehicleProfile};

/// Average speed used to turn miles into reefer unit run-time.
pub const REEFER_AVERAGE_MPH: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceFeeKind {
    Liftgate,
    PalletJack,
    DriverAssist,
    WhiteGlove,
    Tracking,
    Reefer,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceFee {
    pub kind: ServiceFeeKind,
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub fuel_cost: f64,
    pub maintenance_cost: f64,
    pub tire_cost: f64,
    pub fixed_cost_allocation: f64,
    pub service_fees: f64,
    pub total_cost: f64,
    pub cost_per_mile: f64,
    pub fuel_price: f64,
    pub gallons: f64,
    pub annual_fixed_costs: f64,
    pub fixed_cost_per_mile: f64,
    pub fees: Vec<ServiceFee>,
}

/// Annual fixed costs: insurance + 12 × payment + licensing + 12 × overhead.
pub fn annual_fixed_costs(settings: &ResolvedCostSettings) -> f64 {
    settings.annual_insurance
        + 12.0 * settings.monthly_vehicle_payment
        + settings.annual_licensing
        + 12.0 * settings.monthly_overhead
}

/// Fixed cost carried by each mile, amortised over the configured annual
/// mileage. Vehicles that run few miles a year carry a larger share per mile.
pub fn fixed_cost_per_mile(settings: &ResolvedCostSettings) -> f64 {
    annual_fixed_costs(settings) / settings.annual_miles
}

/// Itemised service fees for the flags set on the request.
pub fn service_fees(settings: &ResolvedCostSettings, request: &RateRequest) -> Vec<ServiceFee> {
    let flags = &request.services;
    let flat = [
        (flags.needs_liftgate, ServiceFeeKind::Liftgate, settings.liftgate_fee),
        (flags.needs_pallet_jack, ServiceFeeKind::PalletJack, settings.pallet_jack_fee),
        (flags.needs_driver_assist, ServiceFeeKind::DriverAssist, settings.driver_assist_fee),
        (flags.needs_white_glove, ServiceFeeKind::WhiteGlove, settings.white_glove_fee),
        (flags.needs_tracking, ServiceFeeKind::Tracking, settings.tracking_fee),
    ];

    let mut fees: Vec<ServiceFee> = flat
        .into_iter()
        .filter(|(enabled, _, _)| *enabled)
        .map(|(_, kind, amount)| ServiceFee { kind, amount })
        .collect();

    if flags.is_reefer {
        let hours = request.route.miles() / REEFER_AVERAGE_MPH;
        let hourly = settings.reefer_fuel_per_hour + settings.reefer_maintenance_per_hour;
        fees.push(ServiceFee {
            kind: ServiceFeeKind::Reefer,
            amount: round_cents(hourly * hours),
        });
    }

    fees
}

/// Computes the trip's operating cost. `fuel_price` is the already
/// resolved price per gallon (override, cached regional price, or the
/// national default).
pub fn compute_cost(
    vehicle: &VehicleProfile,
    settings: &ResolvedCostSettings,
    request: &RateRequest,
    fuel_price: f64,
) -> CostBreakdown {
    let miles = request.route.miles();
    let class_defaults = vehicle.class.defaults();

    let mpg = vehicle.effective_mpg();
    let maintenance_cpm = vehicle
        .maintenance_cpm
        .filter(|v| v.is_finite() && *v >= 0.0)
        .or(settings.maintenance_cpm)
        .unwrap_or(class_defaults.maintenance_cpm);
    let tire_cpm = vehicle
        .tire_cpm
        .filter(|v| v.is_finite() && *v >= 0.0)
        .or(settings.tire_cpm)
        .unwrap_or(class_defaults.tire_cpm);
    let fuel_price = if fuel_price.is_finite() && fuel_price > 0.0 {
        fuel_price
    } else {
        vehicle.class.fuel_type().national_default_price()
    };

    let gallons = miles / mpg;
    let fuel_cost = fuel_price / mpg * miles;
    let maintenance_cost = maintenance_cpm * miles;
    let tire_cost = tire_cpm * miles;

    let annual = annual_fixed_costs(settings);
    let per_mile_fixed = fixed_cost_per_mile(settings);
    let fixed_cost_allocation = per_mile_fixed * miles;

    let fees = service_fees(settings, request);
    let service_total: f64 = fees.iter().map(|fee| fee.amount).sum();

    let total_cost =
        fuel_cost + maintenance_cost + tire_cost + fixed_cost_allocation + service_total;
    let cost_per_mile = if miles > 0.0 { total_cost / miles } else { 0.0 };

    CostBreakdown {
        fuel_cost: round_cents(fuel_cost),
        maintenance_cost: round_cents(maintenance_cost),
        tire_cost: round_cents(tire_cost),
        fixed_cost_allocation: round_cents(fixed_cost_allocation),
        service_fees: round_cents(service_total),
        total_cost: round_cents(total_cost),
        cost_per_mile: round_cents(cost_per_mile),
        fuel_price,
        gallons: round_cents(gallons),
        annual_fixed_costs: round_cents(annual),
        fixed_cost_per_mile: (per_mile_fixed * 1000.0).round() / 1000.0,
        fees,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CostSettings, RouteInfo, Stop, VehicleClass};

    fn request(miles: f64) -> RateRequest {
        RateRequest {
            route: RouteInfo {
                origin: Stop {
                    city: None,
                    state: "TX".into(),
                },
                destination: Stop {
                    city: None,
                    state: "IL".into(),
                },
                total_miles: miles,
                ..RouteInfo::default()
            },
            ..RateRequest::default()
        }
    }

    #[test]
    fn semi_thousand_miles_with_defaults() {
        let vehicle = VehicleProfile::for_class(VehicleClass::Semi);
        let settings = CostSettings::default().resolve();
        let cost = compute_cost(&vehicle, &settings, &request(1000.0), 4.00);

        assert_eq!(cost.fuel_cost, 615.38);
        assert_eq!(cost.maintenance_cost, 350.0);
        assert_eq!(cost.tire_cost, 50.0);
        assert_eq!(cost.annual_fixed_costs, 38_500.0);
        assert_eq!(cost.fixed_cost_per_mile, 0.385);
        assert_eq!(cost.fixed_cost_allocation, 385.0);
        assert_eq!(cost.service_fees, 0.0);
        assert_eq!(cost.total_cost, 1400.38);
        assert_eq!(cost.cost_per_mile, 1.4);
    }

    #[test]
    fn low_annual_miles_raise_fixed_cost_per_mile() {
        let vehicle = VehicleProfile::for_class(VehicleClass::CargoVan);
        let settings = CostSettings {
            annual_miles: Some(25_000.0),
            ..CostSettings::default()
        }
        .resolve();
        let cost = compute_cost(&vehicle, &settings, &request(100.0), 3.50);
        assert_eq!(cost.fixed_cost_per_mile, 1.54);
        assert_eq!(cost.fixed_cost_allocation, 154.0);
    }

    #[test]
    fn flat_fees_apply_only_when_flagged() {
        let settings = CostSettings {
            liftgate_fee: Some(90.0),
            ..CostSettings::default()
        }
        .resolve();
        let mut req = request(200.0);
        req.services.needs_liftgate = true;
        req.services.needs_tracking = true;

        let fees = service_fees(&settings, &req);
        assert_eq!(
            fees,
            vec![
                ServiceFee {
                    kind: ServiceFeeKind::Liftgate,
                    amount: 90.0
                },
                ServiceFee {
                    kind: ServiceFeeKind::Tracking,
                    amount: 25.0
                },
            ]
        );
    }

    #[test]
    fn reefer_fee_uses_fifty_mph_run_time() {
        let settings = CostSettings::default().resolve();
        let mut req = request(500.0);
        req.services.is_reefer = true;

        let fees = service_fees(&settings, &req);
        // 500 mi / 50 mph = 10 h at (4.00 + 1.50) per hour
        assert_eq!(fees.len(), 1);
        assert_eq!(fees[0].kind, ServiceFeeKind::Reefer);
        assert_eq!(fees[0].amount, 55.0);
    }

    #[test]
    fn vehicle_rates_override_settings_and_class() {
        let vehicle = VehicleProfile {
            maintenance_cpm: Some(0.50),
            ..VehicleProfile::for_class(VehicleClass::Semi)
        };
        let settings = CostSettings {
            maintenance_cpm: Some(0.20),
            tire_cpm: Some(0.10),
            ..CostSettings::default()
        }
        .resolve();
        let cost = compute_cost(&vehicle, &settings, &request(100.0), 4.00);
        assert_eq!(cost.maintenance_cost, 50.0);
        assert_eq!(cost.tire_cost, 10.0);
    }

    #[test]
    fn zero_miles_never_divides_by_zero() {
        let vehicle = VehicleProfile::for_class(VehicleClass::Sprinter);
        let settings = CostSettings::default().resolve();
        let cost = compute_cost(&vehicle, &settings, &request(0.0), f64::NAN);
        assert_eq!(cost.total_cost, 0.0);
        assert_eq!(cost.cost_per_mile, 0.0);
        assert_eq!(cost.fuel_price, 4.00);
    }
}
