//! Portfolio state: fixed roster, valuation, event reducer, and the
//! read-side helpers built on top of the derived state

pub mod display;
pub mod filters;
pub mod roster;
pub mod service;
pub mod store;
pub mod types;
pub mod valuation;
