//! Payroll engine for gross-to-net and net-to-gross salary calculations.
//!
//! This crate computes a worker's take-home pay from a contractual gross pay
//! under a country's payroll regime (progressive income tax, capped pension,
//! health and unemployment contributions, a statutory bonus) and inverts the
//! calculation: given a target net pay, it searches for the gross pay that
//! produces it and rounds that gross up to the country's rounding unit.
//!
//! Country regimes are plain data. Each is a [`config::ParameterSet`] loaded
//! from YAML by [`config::ConfigLoader`].

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
