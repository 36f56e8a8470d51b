//! Freight rate engine: carrier cost, recommended rate, lane market
//! estimate and counterparty risk for truckload quotes.

pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;
pub mod util;

pub use domain::{
    compare_to_market, estimate_market, verify_carrier, CarrierVerification, MarketEstimate, Quote,
    QuoteEngine, QuoteInput, RateRequest,
};
