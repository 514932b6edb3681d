// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST token-service client for the Turngate sign-in library.
//!
//! Implements [`turngate_core::TokenClient`] against a hosted token
//! service: sign-in link issuance, silent token lookup, magic-code
//! redemption, on-behalf-of exchange, and sign-out.

pub mod client;
pub mod types;

pub use client::RestTokenClient;
