//! Pazar
//!
//! Pazar is the pricing and catalogue engine behind a multi-tenant commerce
//! platform: cart total recalculation, cargo-zone shipping resolution,
//! variant combination generation and discount reshaping.
//!
//! Everything in this crate is pure, synchronous computation. Persistence
//! and transport live in the application crate.

pub mod carts;
pub mod discounts;
pub mod shipping;
pub mod variants;
