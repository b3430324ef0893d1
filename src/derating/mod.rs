//! Derating and stress-conversion analyses.
//!
//! # Modules
//!
//! - [`overstressed`]: derating-rule check with accumulated reasons
//! - [`dormant_hazard_rate`]: active-to-dormant conversion by part class
//! - [`similar_hazard_rate`]: quality, environment and temperature
//!   conversion for a similar item
//!
//! # References
//!
//! - Reliability Analysis Center (1993). *Reliability Toolkit: Commercial
//!   Practices Edition*, sections 6.3.3 and 6.3.4.

mod dormant;
mod overstress;
mod similar;

pub use dormant::{dormant_factor, dormant_hazard_rate, DormantClass};
pub use overstress::{overstressed, Overstress};
pub use similar::{similar_hazard_rate, SimilarEnvironment, SimilarQuality, SimilarTarget};
