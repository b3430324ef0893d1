//! # u-reliability
//!
//! MIL-HDBK-217F hazard-rate prediction, hardware and software roll-ups,
//! FMECA criticality, survival statistics, and reliability growth.
//!
//! The crate is a numerical core: it reads part and assembly attributes
//! through [`attributes::AttributeProvider`] and returns owned result
//! records. Storage, presentation and plotting belong to the caller.
//!
//! ## Modules
//!
//! - [`prediction`]: part hazard-rate models (parts count and parts stress)
//! - [`rollup`]: hardware, function, revision and software roll-ups
//! - [`derating`]: overstress checks, dormant and similar-item hazard rates
//! - [`fmeca`]: mode and item criticality, risk priority numbers
//! - [`survival`]: Kaplan-Meier, MCF, parametric fits, bathtub search
//! - [`growth`]: Crow-AMSAA and Duane models, bounds, goodness of fit,
//!   RG test planning
//! - [`regression`]: least-squares lines for probability plots and growth
//! - [`expression`]: evaluator for hazard-rate equations
//! - [`environment`]: the fourteen MIL-HDBK-217F operating environments
//! - [`config`], [`error`], [`guard`]: settings, error types, guarded division
//!
//! ## Design Philosophy
//!
//! - **Named records**: every calculation reads and returns typed fields
//! - **Pure functions**: inputs are borrowed, never mutated
//! - **Distinct failures**: insufficient data, non-convergence and bad
//!   input are separate errors; guarded divisions log and yield 0.0
//! - **Numerical stability**: special functions come from `u-numflow`

pub mod attributes;
pub mod config;
pub mod derating;
pub mod environment;
pub mod error;
pub mod expression;
pub mod fmeca;
pub mod growth;
pub mod guard;
pub mod prediction;
pub mod regression;
pub mod rollup;
pub mod survival;
