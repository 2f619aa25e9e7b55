//! Agrichain
//!
//! Transaction lifecycle for a farmer/buyer agricultural marketplace: one
//! state machine for commodity sales, from the buyer's request through price
//! negotiation and delivery to completion or cancellation.

pub mod fixtures;
pub mod ids;
pub mod lifecycle;
pub mod logging;
pub mod prelude;
pub mod pricing;
pub mod report;
pub mod service;
pub mod status;
pub mod transactions;
