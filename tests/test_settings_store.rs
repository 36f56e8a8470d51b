use freight_rate_engine::domain::entities::{CostSettings, RateRequest, VehicleClass, VehicleProfile};
use freight_rate_engine::domain::ports::{CostSettingsProvider, NoFuelPrices, VehicleRegistry};
use freight_rate_engine::domain::quote::QuoteEngine;
use freight_rate_engine::util::persistence::SettingsStore;

fn short_haul() -> RateRequest {
    serde_json::from_str(
        r#"{
            "route": {
                "origin": { "state": "OH" },
                "destination": { "state": "PA" },
                "total_miles": 200
            },
            "conditions": { "fuel_price_override": 3.60 }
        }"#,
    )
    .expect("deserialize request")
}

#[test]
fn test_store_round_trips_through_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config").join("settings.json");

    let mut store = SettingsStore::open(&path).expect("open empty store");
    store.set_cost_settings(
        "dana",
        CostSettings {
            profit_margin: Some(0.25),
            annual_miles: Some(60_000.0),
            ..CostSettings::default()
        },
    );
    store.upsert_vehicle(
        "box-1",
        VehicleProfile {
            mpg: Some(11.0),
            ..VehicleProfile::for_class(VehicleClass::BoxTruck)
        },
    );
    store.save().expect("save store");

    let reopened = SettingsStore::open(&path).expect("reopen store");
    assert_eq!(
        reopened.cost_settings("dana").and_then(|s| s.profit_margin),
        Some(0.25)
    );
    let vehicle = reopened.vehicle("box-1").expect("vehicle saved");
    assert_eq!(vehicle.class, VehicleClass::BoxTruck);
    assert_eq!(vehicle.effective_mpg(), 11.0);
}

#[tokio::test]
async fn test_quote_for_user_uses_stored_settings_and_vehicle() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = SettingsStore::open(dir.path().join("settings.json")).expect("open store");
    store.set_cost_settings(
        "dana",
        CostSettings {
            profit_margin: Some(0.25),
            ..CostSettings::default()
        },
    );
    store.upsert_vehicle("van-2", VehicleProfile::for_class(VehicleClass::CargoVan));

    let engine = QuoteEngine::new(NoFuelPrices);
    let quote = engine
        .quote_for_user("dana", Some("van-2"), None, short_haul(), &store, &store)
        .await;
    assert_eq!(quote.vehicle.class, VehicleClass::CargoVan);
    assert_eq!(quote.vehicle.id.as_deref(), Some("van-2"));
    assert_eq!(quote.rate.target_margin, 0.25);
    assert_eq!(quote.cost.fuel_price, 3.60);

    let unknown = engine
        .quote_for_user("nobody", Some("missing"), None, short_haul(), &store, &store)
        .await;
    assert_eq!(unknown.vehicle.class, VehicleClass::Semi);
    assert_eq!(unknown.rate.target_margin, 0.15);
}

#[tokio::test]
async fn test_quote_for_user_falls_back_to_requested_class() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = SettingsStore::open(dir.path().join("settings.json")).expect("open store");
    store.set_cost_settings(
        "dana",
        CostSettings {
            profit_margin: Some(0.25),
            ..CostSettings::default()
        },
    );
    store.upsert_vehicle("van-2", VehicleProfile::for_class(VehicleClass::CargoVan));
    let engine = QuoteEngine::new(NoFuelPrices);

    let no_vehicle = engine
        .quote_for_user("dana", None, Some(VehicleClass::Reefer), short_haul(), &store, &store)
        .await;
    assert_eq!(no_vehicle.vehicle.class, VehicleClass::Reefer);
    assert_eq!(
        no_vehicle.rate.base_rate_per_mile,
        VehicleClass::Reefer.defaults().base_rate_per_mile
    );
    assert_eq!(no_vehicle.rate.target_margin, 0.25);

    let unknown_vehicle = engine
        .quote_for_user(
            "dana",
            Some("missing"),
            Some(VehicleClass::BoxTruck),
            short_haul(),
            &store,
            &store,
        )
        .await;
    assert_eq!(unknown_vehicle.vehicle.class, VehicleClass::BoxTruck);

    let stored = engine
        .quote_for_user(
            "dana",
            Some("van-2"),
            Some(VehicleClass::Reefer),
            short_haul(),
            &store,
            &store,
        )
        .await;
    assert_eq!(stored.vehicle.class, VehicleClass::CargoVan);
}
