//! p2p-recorder: Binance P2P quote sampler and recorder
//!
//! This library provides the core components for:
//! - Periodic buy/sell quote refresh from the P2P search endpoint
//! - Operator-armed recording of representative price pairs
//! - Pluggable sample stores (HTTP, JSON Lines, in-memory) and a store server
//! - A provenance-tracked view cache with an optional on-disk shadow
//! - Named, cancellable periodic tasks
//! - Structured logging and Prometheus metrics

pub mod cache;
pub mod cli;
pub mod config;
pub mod controller;
pub mod quote;
pub mod scheduler;
pub mod store;
pub mod telemetry;
