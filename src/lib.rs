// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet Gateway - data API for the desktop wallet
//!
//! This crate serves externally sourced wallet data (release versions, token
//! prices, fiat rates, explorer/app/proxy/network directories and language
//! packs) from in-memory mirrors that are refreshed on a timer and backed by a
//! durable document store, so clients keep getting answers while upstream
//! sources are down.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `config` - Environment configuration
//! - `datasets` - The watched datasets and their shaping rules
//! - `http` - Outbound JSON client for upstream sources
//! - `store` - Durable document store (redb)
//! - `telemetry` - Logging setup
//! - `watch` - Generic watched cache: bounded fetch, refresh cycle, timer

pub mod api;
pub mod config;
pub mod datasets;
pub mod error;
pub mod http;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod watch;
