//! Static reference data for market estimation: state-to-region map,
//! regional freight characteristics, lane benchmarks and the multiplier
//! curves applied on top of them.

use serde::{Deserialize, Serialize};
use time::{Date, Month};

use super::entities::{FreightClass, Season, VehicleClass};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Northeast,
    Southeast,
    Midwest,
    SouthCentral,
    Mountain,
    Southwest,
    WestCoast,
    Northwest,
}

impl Region {
    pub const ALL: [Region; 8] = [
        Region::Northeast,
        Region::Southeast,
        Region::Midwest,
        Region::SouthCentral,
        Region::Mountain,
        Region::Southwest,
        Region::WestCoast,
        Region::Northwest,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Northeast => "Northeast",
            Self::Southeast => "Southeast",
            Self::Midwest => "Midwest",
            Self::SouthCentral => "South Central",
            Self::Mountain => "Mountain",
            Self::Southwest => "Southwest",
            Self::WestCoast => "West Coast",
            Self::Northwest => "Northwest",
        }
    }

    /// High-volume freight markets with dense benchmark data.
    pub fn is_major(&self) -> bool {
        matches!(
            self,
            Self::Midwest | Self::Southeast | Self::SouthCentral | Self::WestCoast
        )
    }

    pub fn profile(&self) -> RegionProfile {
        match self {
            Self::Northeast => RegionProfile {
                outbound_strength: 4.0,
                inbound_strength: 9.0,
                truck_population: 6.0,
            },
            Self::Southeast => RegionProfile {
                outbound_strength: 6.0,
                inbound_strength: 7.0,
                truck_population: 5.0,
            },
            Self::Midwest => RegionProfile {
                outbound_strength: 8.0,
                inbound_strength: 7.0,
                truck_population: 5.0,
            },
            Self::SouthCentral => RegionProfile {
                outbound_strength: 9.0,
                inbound_strength: 6.0,
                truck_population: 4.0,
            },
            Self::Mountain => RegionProfile {
                outbound_strength: 3.0,
                inbound_strength: 5.0,
                truck_population: 8.0,
            },
            Self::Southwest => RegionProfile {
                outbound_strength: 4.0,
                inbound_strength: 7.0,
                truck_population: 7.0,
            },
            Self::WestCoast => RegionProfile {
                outbound_strength: 9.0,
                inbound_strength: 8.0,
                truck_population: 3.0,
            },
            Self::Northwest => RegionProfile {
                outbound_strength: 5.0,
                inbound_strength: 5.0,
                truck_population: 5.0,
            },
        }
    }
}

/// Supply/demand characteristics on a 1-10 scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionProfile {
    pub outbound_strength: f64,
    pub inbound_strength: f64,
    pub truck_population: f64,
}

/// Resolves a two-letter state code (any case, surrounding whitespace
/// ignored). Unknown codes resolve to `None`.
pub fn region_for_state(state: &str) -> Option<Region> {
    let code = state.trim().to_ascii_uppercase();
    let region = match code.as_str() {
        "ME" | "NH" | "VT" | "MA" | "RI" | "CT" | "NY" | "NJ" | "PA" | "DE" | "MD" | "DC" => {
            Region::Northeast
        }
        "VA" | "WV" | "NC" | "SC" | "GA" | "FL" | "AL" | "MS" | "TN" | "KY" => Region::Southeast,
        "OH" | "MI" | "IN" | "IL" | "WI" | "MN" | "IA" | "MO" | "ND" | "SD" | "NE" | "KS" => {
            Region::Midwest
        }
        "TX" | "OK" | "AR" | "LA" => Region::SouthCentral,
        "CO" | "UT" | "WY" | "MT" | "ID" => Region::Mountain,
        "AZ" | "NM" | "NV" => Region::Southwest,
        "CA" | "HI" => Region::WestCoast,
        "WA" | "OR" | "AK" => Region::Northwest,
        _ => return None,
    };
    Some(region)
}

/// Low/mid/high market rate per mile for a lane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneBenchmark {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

/// Used for any lane missing from [`LANE_BENCHMARKS`].
pub const DEFAULT_BENCHMARK: LaneBenchmark = LaneBenchmark {
    low: 1.95,
    mid: 2.35,
    high: 2.85,
};

const fn lane(low: f64, mid: f64, high: f64) -> LaneBenchmark {
    LaneBenchmark { low, mid, high }
}

pub const LANE_BENCHMARKS: &[(Region, Region, LaneBenchmark)] = &[
    (Region::Northeast, Region::Northeast, lane(2.40, 2.95, 3.55)),
    (Region::Northeast, Region::Southeast, lane(1.85, 2.25, 2.70)),
    (Region::Northeast, Region::Midwest, lane(1.80, 2.20, 2.65)),
    (Region::Southeast, Region::Northeast, lane(2.20, 2.70, 3.25)),
    (Region::Southeast, Region::Southeast, lane(2.05, 2.50, 3.00)),
    (Region::Southeast, Region::Midwest, lane(1.95, 2.35, 2.85)),
    (Region::Southeast, Region::SouthCentral, lane(1.80, 2.20, 2.65)),
    (Region::Midwest, Region::Northeast, lane(2.25, 2.75, 3.30)),
    (Region::Midwest, Region::Southeast, lane(2.05, 2.50, 3.00)),
    (Region::Midwest, Region::Midwest, lane(2.15, 2.60, 3.10)),
    (Region::Midwest, Region::SouthCentral, lane(1.90, 2.30, 2.80)),
    (Region::Midwest, Region::WestCoast, lane(1.75, 2.15, 2.60)),
    (Region::SouthCentral, Region::Midwest, lane(2.10, 2.55, 3.05)),
    (Region::SouthCentral, Region::Southeast, lane(2.05, 2.45, 2.95)),
    (Region::SouthCentral, Region::SouthCentral, lane(2.00, 2.45, 2.95)),
    (Region::SouthCentral, Region::WestCoast, lane(1.85, 2.25, 2.70)),
    (Region::Mountain, Region::WestCoast, lane(1.60, 1.95, 2.35)),
    (Region::Mountain, Region::Midwest, lane(1.55, 1.90, 2.30)),
    (Region::Southwest, Region::WestCoast, lane(1.75, 2.10, 2.55)),
    (Region::Southwest, Region::SouthCentral, lane(1.70, 2.05, 2.50)),
    (Region::WestCoast, Region::Southwest, lane(2.35, 2.85, 3.40)),
    (Region::WestCoast, Region::Mountain, lane(2.30, 2.80, 3.35)),
    (Region::WestCoast, Region::Midwest, lane(2.20, 2.70, 3.25)),
    (Region::WestCoast, Region::SouthCentral, lane(2.15, 2.60, 3.15)),
    (Region::WestCoast, Region::Northwest, lane(2.10, 2.55, 3.05)),
    (Region::WestCoast, Region::WestCoast, lane(2.45, 3.00, 3.60)),
    (Region::Northwest, Region::WestCoast, lane(1.85, 2.25, 2.70)),
    (Region::Northwest, Region::Northwest, lane(2.10, 2.55, 3.05)),
];

/// Lane benchmark for a region pair, with a flag telling whether the
/// lane was in the table or the default row was used.
pub fn lane_benchmark(origin: Option<Region>, destination: Option<Region>) -> (LaneBenchmark, bool) {
    let (Some(origin), Some(destination)) = (origin, destination) else {
        return (DEFAULT_BENCHMARK, false);
    };

    LANE_BENCHMARKS
        .iter()
        .find(|(from, to, _)| *from == origin && *to == destination)
        .map(|(_, _, benchmark)| (*benchmark, true))
        .unwrap_or((DEFAULT_BENCHMARK, false))
}

/// Per-mile adjustment by haul length. Long hauls spread fixed costs thin;
/// short hauls carry a premium.
pub fn distance_multiplier(miles: f64) -> f64 {
    match miles {
        m if m < 100.0 => 1.35,
        m if m < 250.0 => 1.20,
        m if m < 500.0 => 1.05,
        m if m < 1000.0 => 1.00,
        m if m < 1500.0 => 0.95,
        m if m < 2500.0 => 0.90,
        _ => 0.87,
    }
}

pub fn distance_band(miles: f64) -> &'static str {
    match miles {
        m if m < 100.0 => "local",
        m if m < 250.0 => "short haul",
        m if m < 500.0 => "regional",
        m if m < 1000.0 => "mid-range",
        m if m < 1500.0 => "long haul",
        m if m < 2500.0 => "extended long haul",
        _ => "transcontinental",
    }
}

/// Combined equipment premium: vehicle size discount times the freight
/// handling premium over dry van.
pub fn equipment_multiplier(vehicle: VehicleClass, freight: FreightClass) -> f64 {
    let vehicle_factor = match vehicle {
        VehicleClass::Semi | VehicleClass::Reefer => 1.00,
        VehicleClass::BoxTruck => 0.80,
        VehicleClass::Sprinter => 0.65,
        VehicleClass::CargoVan => 0.60,
    };

    let freight_factor = match freight {
        FreightClass::DryVan if vehicle == VehicleClass::Reefer => 1.05,
        FreightClass::DryVan => 1.00,
        FreightClass::Refrigerated => 1.18,
        FreightClass::Flatbed => 1.12,
        FreightClass::Fragile => 1.08,
        FreightClass::Oversized => 1.35,
        FreightClass::Hazmat => 1.30,
    };

    vehicle_factor * freight_factor
}

pub fn month_multiplier(month: Month) -> f64 {
    match month {
        Month::January => 0.92,
        Month::February => 0.94,
        Month::March => 1.00,
        Month::April => 1.02,
        Month::May => 1.05,
        Month::June => 1.08,
        Month::July => 1.03,
        Month::August => 1.00,
        Month::September => 1.02,
        Month::October => 1.06,
        Month::November => 1.10,
        Month::December => 1.04,
    }
}

pub fn season_multiplier(season: Season) -> f64 {
    match season {
        Season::Winter => 0.95,
        Season::Spring => 1.02,
        Season::Summer => 1.05,
        Season::Fall => 1.06,
    }
}

/// Seasonal factor and its description. The pickup date wins over a
/// season hint; with neither the factor is neutral.
pub fn seasonal_factor(pickup: Option<Date>, season: Option<Season>) -> (f64, String) {
    if let Some(date) = pickup {
        let month = date.month();
        let multiplier = month_multiplier(month);
        return (multiplier, format!("{month} pickup demand"));
    }
    if let Some(season) = season {
        return (
            season_multiplier(season),
            format!("{season:?} seasonal demand"),
        );
    }
    (1.0, "No pickup date; seasonal demand neutral".to_string())
}

/// Backhaul prospects out of a destination region.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ReturnLoadProfile {
    pub score: u8,
    pub rating: &'static str,
    pub avg_daily_loads: u32,
}

pub const DEFAULT_RETURN_LOAD: ReturnLoadProfile = ReturnLoadProfile {
    score: 5,
    rating: "fair",
    avg_daily_loads: 150,
};

pub fn return_load_profile(region: Option<Region>) -> ReturnLoadProfile {
    let Some(region) = region else {
        return DEFAULT_RETURN_LOAD;
    };
    match region {
        Region::SouthCentral => ReturnLoadProfile {
            score: 9,
            rating: "excellent",
            avg_daily_loads: 820,
        },
        Region::Midwest => ReturnLoadProfile {
            score: 9,
            rating: "excellent",
            avg_daily_loads: 900,
        },
        Region::WestCoast => ReturnLoadProfile {
            score: 8,
            rating: "excellent",
            avg_daily_loads: 760,
        },
        Region::Southeast => ReturnLoadProfile {
            score: 7,
            rating: "good",
            avg_daily_loads: 540,
        },
        Region::Northwest => ReturnLoadProfile {
            score: 5,
            rating: "fair",
            avg_daily_loads: 210,
        },
        Region::Northeast => ReturnLoadProfile {
            score: 4,
            rating: "fair",
            avg_daily_loads: 380,
        },
        Region::Southwest => ReturnLoadProfile {
            score: 4,
            rating: "fair",
            avg_daily_loads: 160,
        },
        Region::Mountain => ReturnLoadProfile {
            score: 2,
            rating: "poor",
            avg_daily_loads: 90,
        },
    }
}
