//! Changan - Tang-era historical roleplay core
//!
//! Pick a period of the Tang dynasty and a persona, chat with that persona
//! through a language model, and request a period "bulletin" (邸报) as a
//! structured short article. Model failures always degrade to fixed
//! in-world fallback text.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
