//! HealthGuard triage bot: severity classification, disease inference,
//! medicine lookup and response composition behind console and HTTP channels.

pub mod comms;
pub mod config;
pub mod error;
pub mod inference;
pub mod logger;
pub mod medicine;
pub mod provider;
pub mod retry;
pub mod triage;
