use freight_rate_engine::domain::entities::{
    CostSettings, FreightClass, RateRequest, ServiceFlags, VehicleClass, VehicleProfile,
    WeatherCondition,
};
use freight_rate_engine::domain::market::MarketPosition;
use freight_rate_engine::domain::ports::NoFuelPrices;
use freight_rate_engine::domain::quote::{FuelPriceOrigin, QuoteEngine, QuoteInput};

fn texas_to_illinois() -> RateRequest {
    serde_json::from_str(
        r#"{
            "route": {
                "origin": { "city": "Dallas", "state": "TX" },
                "destination": { "city": "Chicago", "state": "IL" },
                "total_miles": 1000
            },
            "pickup_date": "2025-04-15"
        }"#,
    )
    .expect("deserialize request")
}

#[tokio::test]
async fn test_semi_thousand_miles_hits_class_floor() {
    let engine = QuoteEngine::new(NoFuelPrices);
    let quote = engine
        .quote(QuoteInput {
            request: texas_to_illinois(),
            vehicle: Some(VehicleProfile::for_class(VehicleClass::Semi)),
            settings: Some(CostSettings::default()),
            enrichment: None,
        })
        .await;

    assert_eq!(quote.fuel_price_source, FuelPriceOrigin::NationalDefault);
    assert_eq!(quote.cost.total_cost, 1400.38);
    assert_eq!(quote.rate.recommended_rate, 2500.0);
    assert_eq!(quote.rate.min_rate, 2125.0);
    assert_eq!(quote.rate.max_rate, 3000.0);
    assert!(quote.rate.floor_applied);
    assert_eq!(quote.rate.price_per_mile, 2.5);
    assert!(quote.rate.profit_margin > quote.rate.target_margin);
}

#[tokio::test]
async fn test_same_day_team_multiplies_floor() {
    let mut request = texas_to_illinois();
    request.services = ServiceFlags {
        is_same_day: true,
        is_rush: true,
        is_team: true,
        ..ServiceFlags::default()
    };

    let quote = QuoteEngine::new(NoFuelPrices)
        .quote(QuoteInput {
            request,
            ..QuoteInput::default()
        })
        .await;

    assert_eq!(quote.rate.multipliers.service.combined, 3.0);
    assert_eq!(quote.rate.recommended_rate, 7500.0);
    assert_eq!(quote.rate.min_rate, 6375.0);
    assert_eq!(quote.rate.max_rate, 9000.0);
    assert_eq!(quote.comparison.position, MarketPosition::AboveMarket);
}

#[tokio::test]
async fn test_rate_band_brackets_recommendation_for_every_class() {
    let engine = QuoteEngine::new(NoFuelPrices);
    for class in VehicleClass::ALL {
        let quote = engine
            .quote(QuoteInput {
                request: texas_to_illinois(),
                vehicle: Some(VehicleProfile::for_class(class)),
                ..QuoteInput::default()
            })
            .await;
        let rate = &quote.rate;
        assert!(rate.min_rate <= rate.recommended_rate, "{class:?}");
        assert!(rate.recommended_rate <= rate.max_rate, "{class:?}");
        assert!(
            rate.price_per_mile >= class.defaults().base_rate_per_mile,
            "{class:?}"
        );
    }
}

fn urgency(index: usize) -> ServiceFlags {
    match index {
        1 => ServiceFlags {
            is_expedite: true,
            ..ServiceFlags::default()
        },
        2 => ServiceFlags {
            is_rush: true,
            is_team: true,
            ..ServiceFlags::default()
        },
        3 => ServiceFlags {
            is_same_day: true,
            needs_liftgate: true,
            ..ServiceFlags::default()
        },
        _ => ServiceFlags::default(),
    }
}

#[tokio::test]
async fn test_rate_band_is_exact_across_conditions() {
    let engine = QuoteEngine::new(NoFuelPrices);
    let weathers = [
        WeatherCondition::Normal,
        WeatherCondition::Snow,
        WeatherCondition::SevereStorm,
    ];
    let freights = [
        FreightClass::DryVan,
        FreightClass::Refrigerated,
        FreightClass::Hazmat,
    ];

    for class in VehicleClass::ALL {
        for weather in weathers {
            for freight in freights {
                for tier in 0..4 {
                    let mut request = texas_to_illinois();
                    request.conditions.weather = Some(weather);
                    request.load.freight_class = freight;
                    request.services = urgency(tier);

                    let quote = engine
                        .quote(QuoteInput {
                            request,
                            vehicle: Some(VehicleProfile::for_class(class)),
                            ..QuoteInput::default()
                        })
                        .await;
                    let rate = &quote.rate;
                    let case = format!("{class:?} {weather:?} {freight:?} tier {tier}");
                    assert!(rate.recommended_rate > 0.0, "{case}");
                    assert_eq!(rate.recommended_rate, rate.recommended_rate.round(), "{case}");
                    assert_eq!(rate.min_rate, (rate.recommended_rate * 0.85).round(), "{case}");
                    assert_eq!(rate.max_rate, (rate.recommended_rate * 1.20).round(), "{case}");
                }
            }
        }
    }
}

#[tokio::test]
async fn test_quotes_get_distinct_ids_and_serialize() {
    let engine = QuoteEngine::new(NoFuelPrices);
    let first = engine
        .quote(QuoteInput {
            request: texas_to_illinois(),
            ..QuoteInput::default()
        })
        .await;
    let second = engine
        .quote(QuoteInput {
            request: texas_to_illinois(),
            ..QuoteInput::default()
        })
        .await;

    assert_ne!(first.id, second.id);
    assert!(!first.created_at.is_empty());

    let json = serde_json::to_value(&first).expect("serialize quote");
    assert_eq!(json["rate"]["recommended_rate"], 2500.0);
    assert_eq!(json["fuel_price_source"], "national_default");
    assert_eq!(json["market"]["supply_demand"]["flow_direction"], "headhaul");
}
