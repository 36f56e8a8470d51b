use std::sync::Mutex;

use freight_rate_engine::domain::ports::{CarrierRegistry, RegistryError};
use freight_rate_engine::domain::risk::{
    verify_carrier, AuthorityKind, AuthorityRecord, AuthorityStatus, CarrierIdentity, CarrierMatch,
    EntityType, InsuranceSummary, LookupKind, RegistryRecord, RiskLevel,
};

#[derive(Default)]
struct FakeRegistry {
    dot: Option<RegistryRecord>,
    mc: Option<RegistryRecord>,
    names: Vec<CarrierMatch>,
    unavailable: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeRegistry {
    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, record: &Option<RegistryRecord>, key: &str) -> Result<RegistryRecord, RegistryError> {
        if self.unavailable {
            return Err(RegistryError::Unavailable("connection refused".into()));
        }
        record
            .clone()
            .ok_or_else(|| RegistryError::NotFound(key.to_string()))
    }
}

impl CarrierRegistry for FakeRegistry {
    async fn lookup_dot(&self, dot_number: &str) -> Result<RegistryRecord, RegistryError> {
        self.log(format!("dot:{dot_number}"));
        self.answer(&self.dot, dot_number)
    }

    async fn lookup_mc(&self, mc_number: &str) -> Result<RegistryRecord, RegistryError> {
        self.log(format!("mc:{mc_number}"));
        self.answer(&self.mc, mc_number)
    }

    async fn search_name(&self, name: &str) -> Result<Vec<CarrierMatch>, RegistryError> {
        self.log(format!("name:{name}"));
        if self.unavailable {
            return Err(RegistryError::Unavailable("connection refused".into()));
        }
        Ok(self.names.clone())
    }
}

fn active_carrier() -> RegistryRecord {
    RegistryRecord {
        identity: CarrierIdentity {
            dot_number: "2233445".into(),
            legal_name: "Blue Ridge Haulers Inc".into(),
            entity_type: EntityType::Carrier,
            operating_status: "ACTIVE".into(),
            ..CarrierIdentity::default()
        },
        allowed_to_operate: true,
        authorities: vec![AuthorityRecord {
            kind: AuthorityKind::Common,
            status: AuthorityStatus::Active,
            docket_number: Some("MC44556".into()),
        }],
        insurance: Some(InsuranceSummary {
            liability_on_file: Some(1_000_000.0),
            ..InsuranceSummary::default()
        }),
        ..RegistryRecord::default()
    }
}

#[tokio::test]
async fn test_dot_lookup_scores_clean_carrier() {
    let registry = FakeRegistry {
        dot: Some(active_carrier()),
        ..FakeRegistry::default()
    };
    let result = verify_carrier("USDOT 2233445", &registry).await;

    assert!(result.found);
    assert_eq!(result.lookup, Some(LookupKind::Dot));
    assert_eq!(result.risk.score, 100);
    assert_eq!(result.risk.level, RiskLevel::Low);
    assert_eq!(registry.calls(), vec!["dot:2233445"]);
}

#[tokio::test]
async fn test_short_number_tries_mc_then_dot() {
    let registry = FakeRegistry {
        dot: Some(active_carrier()),
        ..FakeRegistry::default()
    };
    let result = verify_carrier("44556", &registry).await;

    assert!(result.found);
    assert_eq!(result.lookup, Some(LookupKind::Dot));
    assert_eq!(registry.calls(), vec!["mc:44556", "dot:44556"]);
}

#[tokio::test]
async fn test_name_search_resolves_first_match() {
    let registry = FakeRegistry {
        dot: Some(active_carrier()),
        names: vec![
            CarrierMatch {
                dot_number: "2233445".into(),
                legal_name: "Blue Ridge Haulers Inc".into(),
            },
            CarrierMatch {
                dot_number: "9".into(),
                legal_name: "Blue Ridge Logistics".into(),
            },
        ],
        ..FakeRegistry::default()
    };
    let result = verify_carrier("Blue Ridge", &registry).await;

    assert!(result.found);
    assert_eq!(result.lookup, Some(LookupKind::Name));
    assert_eq!(
        result.carrier.map(|c| c.legal_name),
        Some("Blue Ridge Haulers Inc".to_string())
    );
    assert_eq!(registry.calls(), vec!["name:Blue Ridge", "dot:2233445"]);
}

#[tokio::test]
async fn test_every_failed_path_is_not_found_and_critical() {
    let empty = FakeRegistry::default();
    let down = FakeRegistry {
        unavailable: true,
        ..FakeRegistry::default()
    };

    for query in ["DOT 1234567", "MC-123456", "1234567", "12345", "Nobody Freight", ""] {
        for registry in [&empty, &down] {
            let result = verify_carrier(query, registry).await;
            assert!(!result.found, "{query:?}");
            assert_eq!(result.risk.score, 0, "{query:?}");
            assert_eq!(result.risk.level, RiskLevel::Critical, "{query:?}");
            assert_eq!(result.risk.factors.len(), 1, "{query:?}");
            assert!(result.carrier.is_none());
        }
    }
}

#[tokio::test]
async fn test_broker_with_thin_bond_is_medium_risk() {
    let mut record = active_carrier();
    record.identity.entity_type = EntityType::Broker;
    record.authorities[0].kind = AuthorityKind::Broker;
    record.insurance = Some(InsuranceSummary {
        bond_on_file: Some(30_000.0),
        ..InsuranceSummary::default()
    });
    let registry = FakeRegistry {
        mc: Some(record),
        ..FakeRegistry::default()
    };

    let result = verify_carrier("MC 44556", &registry).await;
    assert_eq!(result.lookup, Some(LookupKind::Mc));
    assert_eq!(result.risk.score, 75);
    assert_eq!(result.risk.level, RiskLevel::Medium);
}
