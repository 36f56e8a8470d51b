//! Counterparty verification and risk scoring.

use serde::{Deserialize, Serialize};

use super::ports::{CarrierRegistry, RegistryError};

pub const BROKER_BOND_MINIMUM: f64 = 75_000.0;
pub const CARRIER_LIABILITY_MINIMUM: f64 = 750_000.0;
/// Out-of-service inspection rate (percent) above which a penalty applies.
pub const OOS_RATE_LIMIT: f64 = 30.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Carrier,
    Broker,
    CarrierBroker,
    #[default]
    Unknown,
}

impl EntityType {
    pub fn from_authority(carrier: bool, broker: bool) -> Self {
        match (carrier, broker) {
            (true, true) => Self::CarrierBroker,
            (true, false) => Self::Carrier,
            (false, true) => Self::Broker,
            (false, false) => Self::Unknown,
        }
    }

    fn needs_bond(&self) -> bool {
        matches!(self, Self::Broker | Self::CarrierBroker)
    }

    fn needs_liability(&self) -> bool {
        !matches!(self, Self::Broker)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CarrierIdentity {
    pub dot_number: String,
    pub mc_number: Option<String>,
    pub legal_name: String,
    pub dba_name: Option<String>,
    pub entity_type: EntityType,
    pub operating_status: String,
    pub address: Option<Address>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityKind {
    Common,
    Contract,
    Broker,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityStatus {
    Active,
    Inactive,
    Pending,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthorityRecord {
    pub kind: AuthorityKind,
    pub status: AuthorityStatus,
    pub docket_number: Option<String>,
}

/// Coverage amounts in dollars.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InsuranceSummary {
    pub liability_on_file: Option<f64>,
    pub liability_required: Option<f64>,
    pub bond_on_file: Option<f64>,
    pub bond_required: Option<f64>,
    pub cargo_on_file: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyRating {
    Satisfactory,
    Conditional,
    Unsatisfactory,
    #[default]
    NotRated,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetySummary {
    pub rating: SafetyRating,
    pub rating_date: Option<String>,
    pub driver_inspections: u32,
    /// Percent of driver inspections ending out of service.
    pub driver_oos_rate: f64,
    pub vehicle_inspections: u32,
    pub vehicle_oos_rate: f64,
    pub total_crashes: u32,
    pub fatal_crashes: u32,
    pub injury_crashes: u32,
    pub tow_crashes: u32,
}

/// Everything the registry knows about one counterparty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryRecord {
    pub identity: CarrierIdentity,
    pub allowed_to_operate: bool,
    pub out_of_service_date: Option<String>,
    pub authorities: Vec<AuthorityRecord>,
    pub insurance: Option<InsuranceSummary>,
    pub safety: Option<SafetySummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarrierMatch {
    pub dot_number: String,
    pub legal_name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => Self::Low,
            60..=79 => Self::Medium,
            40..=59 => Self::High,
            _ => Self::Critical,
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Low => "Low risk: safe to book on standard payment terms.",
            Self::Medium => {
                "Moderate risk: confirm the insurance certificate and prefer quick-pay or factoring."
            }
            Self::High => {
                "High risk: require payment up front or a factoring guarantee before hauling."
            }
            Self::Critical => "Critical risk: do not book loads with this counterparty.",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u8,
    pub level: RiskLevel,
    pub factors: Vec<String>,
    pub recommendation: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Dot,
    Mc,
    Name,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarrierVerification {
    pub query: String,
    pub found: bool,
    pub lookup: Option<LookupKind>,
    pub carrier: Option<CarrierIdentity>,
    pub authorities: Vec<AuthorityRecord>,
    pub insurance: Option<InsuranceSummary>,
    pub safety: Option<SafetySummary>,
    pub risk: RiskAssessment,
}

/// How a free-form counterparty identifier will be looked up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CarrierQuery {
    Dot(String),
    Mc(String),
    /// Fewer than six bare digits: tried as MC first, then as DOT.
    ShortNumber(String),
    Name(String),
}

pub fn classify_query(raw: &str) -> Option<CarrierQuery> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let upper = trimmed.to_ascii_uppercase();
    for (prefix, is_dot) in [("USDOT", true), ("DOT", true), ("MC", false)] {
        if let Some(rest) = upper.strip_prefix(prefix) {
            let digits = rest.trim_start_matches(|c: char| c.is_whitespace() || "-#:.".contains(c));
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                let number = digits.to_string();
                return Some(if is_dot {
                    CarrierQuery::Dot(number)
                } else {
                    CarrierQuery::Mc(number)
                });
            }
        }
    }

    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Some(if trimmed.len() >= 6 {
            CarrierQuery::Dot(trimmed.to_string())
        } else {
            CarrierQuery::ShortNumber(trimmed.to_string())
        });
    }

    Some(CarrierQuery::Name(trimmed.to_string()))
}

/// Scores a registry record. Starts at 100 and subtracts a fixed penalty
/// for each problem found.
pub fn assess_risk(record: &RegistryRecord) -> RiskAssessment {
    let mut score: i32 = 100;
    let mut factors = Vec::new();
    let mut penalize = |points: i32, factor: String| {
        score -= points;
        factors.push(factor);
    };

    if !record.allowed_to_operate {
        penalize(50, "Not authorized to operate".to_string());
    }
    if let Some(date) = &record.out_of_service_date {
        penalize(40, format!("Out-of-service order dated {date}"));
    }
    if !record
        .authorities
        .iter()
        .any(|authority| authority.status == AuthorityStatus::Active)
    {
        penalize(30, "No active operating authority".to_string());
    }

    let entity_type = record.identity.entity_type;
    match &record.insurance {
        None => penalize(15, "No insurance data on file".to_string()),
        Some(insurance) => {
            if entity_type.needs_bond() {
                let bond = insurance.bond_on_file.unwrap_or(0.0);
                if bond < BROKER_BOND_MINIMUM {
                    penalize(
                        25,
                        format!(
                            "Broker bond {} below the {} minimum",
                            format_usd(bond),
                            format_usd(BROKER_BOND_MINIMUM)
                        ),
                    );
                }
            }
            if entity_type.needs_liability() {
                let liability = insurance.liability_on_file.unwrap_or(0.0);
                if liability < CARRIER_LIABILITY_MINIMUM {
                    penalize(
                        20,
                        format!(
                            "Liability coverage {} below the {} minimum",
                            format_usd(liability),
                            format_usd(CARRIER_LIABILITY_MINIMUM)
                        ),
                    );
                }
            }
        }
    }

    if let Some(safety) = &record.safety {
        match safety.rating {
            SafetyRating::Unsatisfactory => {
                penalize(35, "Unsatisfactory safety rating".to_string())
            }
            SafetyRating::Conditional => penalize(15, "Conditional safety rating".to_string()),
            SafetyRating::Satisfactory | SafetyRating::NotRated => {}
        }
        if safety.driver_oos_rate > OOS_RATE_LIMIT {
            penalize(
                15,
                format!(
                    "Driver out-of-service rate {:.1}% exceeds {OOS_RATE_LIMIT:.0}%",
                    safety.driver_oos_rate
                ),
            );
        }
        if safety.vehicle_oos_rate > OOS_RATE_LIMIT {
            penalize(
                15,
                format!(
                    "Vehicle out-of-service rate {:.1}% exceeds {OOS_RATE_LIMIT:.0}%",
                    safety.vehicle_oos_rate
                ),
            );
        }
        if safety.fatal_crashes > 0 {
            penalize(
                10,
                format!("{} fatal crash(es) on record", safety.fatal_crashes),
            );
        }
        if safety.total_crashes > 5 {
            penalize(5, format!("{} crashes on record", safety.total_crashes));
        }
    }

    let score = score.clamp(0, 100) as u8;
    if factors.is_empty() {
        factors = vec![
            "Authority verified and active".to_string(),
            "Insurance on file".to_string(),
        ];
    }
    let level = RiskLevel::from_score(score);

    RiskAssessment {
        score,
        level,
        factors,
        recommendation: level.recommendation().to_string(),
    }
}

/// Verifies a counterparty by DOT number, MC number or name. Lookup
/// failures of any kind produce a not-found, critical-risk result.
pub async fn verify_carrier<R: CarrierRegistry>(query: &str, registry: &R) -> CarrierVerification {
    let Some(classified) = classify_query(query) else {
        return not_found(query, None, "Empty carrier query".to_string());
    };

    let (kind, outcome) = match classified {
        CarrierQuery::Dot(dot) => (LookupKind::Dot, registry.lookup_dot(&dot).await),
        CarrierQuery::Mc(mc) => (LookupKind::Mc, registry.lookup_mc(&mc).await),
        CarrierQuery::ShortNumber(number) => match registry.lookup_mc(&number).await {
            Ok(record) => (LookupKind::Mc, Ok(record)),
            Err(error) => {
                eprintln!("[risk] MC lookup for {number} failed ({error}); trying as DOT");
                (LookupKind::Dot, registry.lookup_dot(&number).await)
            }
        },
        CarrierQuery::Name(name) => (LookupKind::Name, lookup_by_name(&name, registry).await),
    };

    match outcome {
        Ok(record) => found(query, kind, record),
        Err(error) => {
            eprintln!("[risk] verification of {query:?} failed: {error}");
            let reason = match error {
                RegistryError::NotFound(_) => {
                    format!("No registry record found for \"{}\"", query.trim())
                }
                other => format!("Registry lookup failed: {other}"),
            };
            not_found(query, Some(kind), reason)
        }
    }
}

async fn lookup_by_name<R: CarrierRegistry>(
    name: &str,
    registry: &R,
) -> Result<RegistryRecord, RegistryError> {
    let matches = registry.search_name(name).await?;
    let first = matches
        .into_iter()
        .next()
        .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
    registry.lookup_dot(&first.dot_number).await
}

fn found(query: &str, kind: LookupKind, record: RegistryRecord) -> CarrierVerification {
    let risk = assess_risk(&record);
    CarrierVerification {
        query: query.trim().to_string(),
        found: true,
        lookup: Some(kind),
        carrier: Some(record.identity),
        authorities: record.authorities,
        insurance: record.insurance,
        safety: record.safety,
        risk,
    }
}

fn not_found(query: &str, kind: Option<LookupKind>, reason: String) -> CarrierVerification {
    CarrierVerification {
        query: query.trim().to_string(),
        found: false,
        lookup: kind,
        carrier: None,
        authorities: Vec::new(),
        insurance: None,
        safety: None,
        risk: RiskAssessment {
            score: 0,
            level: RiskLevel::Critical,
            factors: vec![reason],
            recommendation: RiskLevel::Critical.recommendation().to_string(),
        },
    }
}

fn format_usd(amount: f64) -> String {
    let whole = amount.max(0.0).round() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${grouped}")
}
