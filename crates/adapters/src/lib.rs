// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: printers and the ejector arm

pub mod device;
pub mod ejector;
pub mod moonraker;
pub mod traced;

pub use device::{
    build_session, link_for, CleanupHook, DeviceError, DeviceLink, DeviceSession, LinkError,
    PrinterProfile, PrinterSession, RawStatus,
};
pub use ejector::{
    ArmState, DispatchAck, EjectorClient, EjectorError, EjectorTransport, MoonrakerTransport,
    TransportError,
};
pub use traced::{TracedDeviceSession, TracedEjectorTransport};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use device::{DeviceCall, FakeDeviceLink, FakeDeviceSession, FakeOutcome, LinkCall};
#[cfg(any(test, feature = "test-support"))]
pub use ejector::{FakeEjectorTransport, TransportCall};
