// SPDX-FileCopyrightText: 2026 Turngate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Turngate integration tests.
//!
//! Mock implementations of the boundary traits with injectable responses
//! and captured outputs, plus a manually advanced clock for exercising
//! lazy expiry without sleeping.

pub mod clock;
pub mod mock_tokens;
pub mod mock_transport;

pub use clock::ManualClock;
pub use mock_tokens::MockTokenClient;
pub use mock_transport::MockTransport;

/// A fresh unique activity id for test turns.
pub fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
