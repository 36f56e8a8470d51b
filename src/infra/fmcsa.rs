//! Asynchronous client for the FMCSA QCMobile carrier registry.
//!
//! - Looks carriers up by USDOT number, MC docket number or legal name.
//! - Joins the carrier snapshot with its authority records.
//! - Tolerates the API's habit of sending numbers as strings.

use reqwest::{Client, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

use crate::domain::ports::{CarrierRegistry, RegistryError};
use crate::domain::risk::{
    Address, AuthorityKind, AuthorityRecord, AuthorityStatus, CarrierIdentity, CarrierMatch,
    EntityType, InsuranceSummary, RegistryRecord, SafetyRating, SafetySummary,
};
use crate::util::version::user_agent;

pub const DEFAULT_BASE_URL: &str = "https://mobile.fmcsa.dot.gov/qc/services/";

/// QCMobile reports insurance in thousands of dollars.
const INSURANCE_UNIT: f64 = 1_000.0;

#[derive(Debug, Error)]
pub enum FmcsaError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("base URL cannot carry path segments: {0}")]
    BaseUrl(String),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no carrier found for {0}")]
    NotFound(String),
    #[error("no FMCSA web key configured")]
    MissingWebKey,
}

impl From<FmcsaError> for RegistryError {
    fn from(error: FmcsaError) -> Self {
        match error {
            FmcsaError::NotFound(query) => RegistryError::NotFound(query),
            FmcsaError::Http(err) if err.status() == Some(StatusCode::NOT_FOUND) => {
                RegistryError::NotFound(err.to_string())
            }
            FmcsaError::Http(err) if err.is_decode() => RegistryError::Malformed(err.to_string()),
            other => RegistryError::Unavailable(other.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct FmcsaClient {
    http: Client,
    base_url: Url,
    web_key: String,
}

impl FmcsaClient {
    pub fn new(web_key: impl Into<String>) -> Result<Self, FmcsaError> {
        Self::with_base_url(DEFAULT_BASE_URL, web_key)
    }

    pub fn with_base_url(base: &str, web_key: impl Into<String>) -> Result<Self, FmcsaError> {
        let web_key = web_key.into();
        if web_key.trim().is_empty() {
            return Err(FmcsaError::MissingWebKey);
        }
        let base_url = Url::parse(base)?;
        if base_url.cannot_be_a_base() {
            return Err(FmcsaError::BaseUrl(base.to_string()));
        }
        let http = Client::builder().user_agent(user_agent()).build()?;
        Ok(Self {
            http,
            base_url,
            web_key,
        })
    }

    pub async fn carrier_by_dot(&self, dot_number: &str) -> Result<RegistryRecord, FmcsaError> {
        let url = self.url(&["carriers", dot_number])?;
        let content: CarrierContent = self.fetch_content(url, dot_number).await?;
        self.with_authority(content.carrier).await
    }

    pub async fn carrier_by_mc(&self, mc_number: &str) -> Result<RegistryRecord, FmcsaError> {
        let url = self.url(&["carriers", "docket-number", mc_number])?;
        let content: Vec<CarrierContent> = self.fetch_content(url, mc_number).await?;
        let carrier = content
            .into_iter()
            .next()
            .map(|entry| entry.carrier)
            .ok_or_else(|| FmcsaError::NotFound(format!("MC {mc_number}")))?;
        self.with_authority(carrier).await
    }

    pub async fn carriers_by_name(&self, name: &str) -> Result<Vec<CarrierMatch>, FmcsaError> {
        let url = self.url(&["carriers", "name", name])?;
        let content: Vec<CarrierContent> = self.fetch_content(url, name).await?;
        let matches = content
            .into_iter()
            .filter_map(|entry| {
                let dot_number = entry.carrier.dot_number?;
                Some(CarrierMatch {
                    dot_number,
                    legal_name: entry.carrier.legal_name.unwrap_or_default(),
                })
            })
            .collect::<Vec<_>>();
        eprintln!("[fmcsa] name search {name:?} matched {} carrier(s)", matches.len());
        Ok(matches)
    }

    async fn with_authority(&self, carrier: CarrierDto) -> Result<RegistryRecord, FmcsaError> {
        let Some(dot_number) = carrier.dot_number.clone() else {
            return Err(FmcsaError::NotFound("carrier without a DOT number".to_string()));
        };

        let url = self.url(&["carriers", &dot_number, "authority"])?;
        let authority = match self
            .fetch_content::<Vec<AuthorityContent>>(url, &dot_number)
            .await
        {
            Ok(entries) => entries.into_iter().map(|entry| entry.carrier_authority).collect(),
            Err(FmcsaError::NotFound(_)) => {
                eprintln!("[fmcsa] no authority records for DOT {dot_number}");
                Vec::new()
            }
            Err(error) => return Err(error),
        };

        Ok(registry_record(carrier, authority))
    }

    async fn fetch_content<T>(&self, url: Url, query: &str) -> Result<T, FmcsaError>
    where
        T: DeserializeOwned,
    {
        eprintln!("[fmcsa] GET {}", redact(&url));
        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(FmcsaError::NotFound(query.to_string()));
        }
        let envelope: Envelope<T> = response.error_for_status()?.json().await?;
        envelope
            .content
            .ok_or_else(|| FmcsaError::NotFound(query.to_string()))
    }

    fn url(&self, segments: &[&str]) -> Result<Url, FmcsaError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FmcsaError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments.iter().map(|segment| segment.trim()));
        url.query_pairs_mut().append_pair("webKey", &self.web_key);
        Ok(url)
    }
}

impl CarrierRegistry for FmcsaClient {
    async fn lookup_dot(&self, dot_number: &str) -> Result<RegistryRecord, RegistryError> {
        Ok(self.carrier_by_dot(dot_number).await?)
    }

    async fn lookup_mc(&self, mc_number: &str) -> Result<RegistryRecord, RegistryError> {
        Ok(self.carrier_by_mc(mc_number).await?)
    }

    async fn search_name(&self, name: &str) -> Result<Vec<CarrierMatch>, RegistryError> {
        Ok(self.carriers_by_name(name).await?)
    }
}

fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    content: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CarrierContent {
    carrier: CarrierDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorityContent {
    carrier_authority: AuthorityDto,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CarrierDto {
    #[serde(deserialize_with = "lenient_string")]
    dot_number: Option<String>,
    legal_name: Option<String>,
    dba_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    allowed_to_operate: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    status_code: Option<String>,
    oos_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    bipd_insurance_on_file: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    bipd_required_amount: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    bond_insurance_on_file: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    bond_insurance_required: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    cargo_insurance_on_file: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    safety_rating: Option<String>,
    safety_rating_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    driver_insp: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    driver_oos_rate: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    vehicle_insp: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    vehicle_oos_rate: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    crash_total: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    fatal_crash: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    inj_crash: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    towaway_crash: Option<String>,
    phy_street: Option<String>,
    phy_city: Option<String>,
    phy_state: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    phy_zipcode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AuthorityDto {
    common_authority_status: Option<String>,
    contract_authority_status: Option<String>,
    broker_authority_status: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    docket_number: Option<String>,
    prefix: Option<String>,
}

impl AuthorityDto {
    fn docket(&self) -> Option<String> {
        self.docket_number.as_ref().map(|number| match &self.prefix {
            Some(prefix) => format!("{prefix}{number}"),
            None => number.clone(),
        })
    }

    fn records(&self) -> Vec<AuthorityRecord> {
        [
            (AuthorityKind::Common, &self.common_authority_status),
            (AuthorityKind::Contract, &self.contract_authority_status),
            (AuthorityKind::Broker, &self.broker_authority_status),
        ]
        .into_iter()
        .filter_map(|(kind, status)| {
            let status = match status.as_deref().map(str::trim) {
                Some("A") => AuthorityStatus::Active,
                Some("I") => AuthorityStatus::Inactive,
                Some("P") => AuthorityStatus::Pending,
                _ => return None,
            };
            Some(AuthorityRecord {
                kind,
                status,
                docket_number: self.docket(),
            })
        })
        .collect()
    }
}

fn registry_record(carrier: CarrierDto, authority: Vec<AuthorityDto>) -> RegistryRecord {
    let authorities: Vec<AuthorityRecord> =
        authority.iter().flat_map(AuthorityDto::records).collect();
    let active = |kinds: &[AuthorityKind]| {
        authorities
            .iter()
            .any(|record| record.status == AuthorityStatus::Active && kinds.contains(&record.kind))
    };
    let entity_type = EntityType::from_authority(
        active(&[AuthorityKind::Common, AuthorityKind::Contract]),
        active(&[AuthorityKind::Broker]),
    );
    let mc_number = authority
        .iter()
        .find_map(|entry| entry.docket_number.clone());

    let insurance = insurance_summary(&carrier);
    let safety = safety_summary(&carrier);
    let address = if carrier.phy_city.is_some() || carrier.phy_state.is_some() {
        Some(Address {
            street: carrier.phy_street,
            city: carrier.phy_city,
            state: carrier.phy_state,
            zip: carrier.phy_zipcode,
        })
    } else {
        None
    };

    RegistryRecord {
        identity: CarrierIdentity {
            dot_number: carrier.dot_number.unwrap_or_default(),
            mc_number,
            legal_name: carrier.legal_name.unwrap_or_default(),
            dba_name: carrier.dba_name.filter(|name| !name.trim().is_empty()),
            entity_type,
            operating_status: match carrier.status_code.as_deref() {
                Some("A") => "ACTIVE".to_string(),
                Some("I") => "INACTIVE".to_string(),
                Some(other) => other.to_string(),
                None => "UNKNOWN".to_string(),
            },
            address,
        },
        allowed_to_operate: carrier
            .allowed_to_operate
            .as_deref()
            .is_some_and(|flag| flag.eq_ignore_ascii_case("Y")),
        out_of_service_date: carrier.oos_date.filter(|date| !date.trim().is_empty()),
        authorities,
        insurance,
        safety,
    }
}

fn insurance_summary(carrier: &CarrierDto) -> Option<InsuranceSummary> {
    let thousands = |raw: &Option<String>| number(raw).map(|value| value * INSURANCE_UNIT);
    let summary = InsuranceSummary {
        liability_on_file: thousands(&carrier.bipd_insurance_on_file),
        liability_required: thousands(&carrier.bipd_required_amount),
        bond_on_file: thousands(&carrier.bond_insurance_on_file),
        bond_required: match carrier.bond_insurance_required.as_deref() {
            Some("Y") => Some(crate::domain::risk::BROKER_BOND_MINIMUM),
            _ => None,
        },
        cargo_on_file: thousands(&carrier.cargo_insurance_on_file),
    };
    // A reported zero is data: it means no coverage, not an unknown amount.
    let reported = [
        summary.liability_on_file,
        summary.liability_required,
        summary.bond_on_file,
        summary.cargo_on_file,
    ]
    .iter()
    .any(Option::is_some);
    reported.then_some(summary)
}

fn safety_summary(carrier: &CarrierDto) -> Option<SafetySummary> {
    let count = |raw: &Option<String>| number(raw).map(|value| value.max(0.0) as u32).unwrap_or(0);
    let rating = match carrier.safety_rating.as_deref().map(str::trim) {
        Some("S") => SafetyRating::Satisfactory,
        Some("C") => SafetyRating::Conditional,
        Some("U") => SafetyRating::Unsatisfactory,
        _ => SafetyRating::NotRated,
    };
    let summary = SafetySummary {
        rating,
        rating_date: carrier.safety_rating_date.clone(),
        driver_inspections: count(&carrier.driver_insp),
        driver_oos_rate: number(&carrier.driver_oos_rate).unwrap_or(0.0),
        vehicle_inspections: count(&carrier.vehicle_insp),
        vehicle_oos_rate: number(&carrier.vehicle_oos_rate).unwrap_or(0.0),
        total_crashes: count(&carrier.crash_total),
        fatal_crashes: count(&carrier.fatal_crash),
        injury_crashes: count(&carrier.inj_crash),
        tow_crashes: count(&carrier.towaway_crash),
    };
    let has_history = summary.rating != SafetyRating::NotRated
        || summary.driver_inspections > 0
        || summary.vehicle_inspections > 0
        || summary.total_crashes > 0;
    has_history.then_some(summary)
}

fn number(raw: &Option<String>) -> Option<f64> {
    raw.as_deref()
        .and_then(|value| value.trim().replace(',', "").parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct StringOrNumber;

    impl<'de> serde::de::Visitor<'de> for StringOrNumber {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string, number or null")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(if value { "Y" } else { "N" }.to_string()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}
