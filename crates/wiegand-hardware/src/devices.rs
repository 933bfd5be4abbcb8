//! Enum wrappers for hardware device dispatch.
//!
//! Native `async fn` in traits (RPITIT, Edition 2024) is not object-safe, so
//! `Box<dyn EdgeSource>` is not available. These enums provide concrete type
//! dispatch instead, which also lets the reader move devices into spawned
//! tokio tasks (the compiler can see that every future is `Send`).
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use wiegand_hardware::clock::ManualClock;
//! use wiegand_hardware::devices::{AnyEdgeSource, AnyServiceCaller};
//! use wiegand_hardware::mock::{MockServiceCaller, MockWiegandLines};
//!
//! let (lines, _handle) = MockWiegandLines::new(Arc::new(ManualClock::new()));
//! let source = AnyEdgeSource::Mock(lines);
//!
//! let (caller, _calls) = MockServiceCaller::new();
//! let sink = AnyServiceCaller::Mock(caller);
//! ```

use wiegand_core::ServiceCall;

use crate::console::ConsoleServiceCaller;
use crate::mock::{MockServiceCaller, MockWiegandLines};
use crate::traits::{EdgeSource, ServiceCaller};
use crate::{DeviceInfo, EdgeEvent, Result};

/// Enum wrapper for edge source dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyEdgeSource {
    /// Mock lines for development and testing.
    Mock(MockWiegandLines),
    // TODO: add a `Gpio` variant behind the `hardware-gpio` feature once a
    // GPIO character-device backend exists.
}

impl EdgeSource for AnyEdgeSource {
    async fn next_edge(&mut self) -> Result<EdgeEvent> {
        match self {
            Self::Mock(device) => device.next_edge().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

impl From<MockWiegandLines> for AnyEdgeSource {
    fn from(device: MockWiegandLines) -> Self {
        Self::Mock(device)
    }
}

/// Enum wrapper for service consumer dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyServiceCaller {
    /// Recording consumer for tests.
    Mock(MockServiceCaller),

    /// JSON lines on stdout (or another writer).
    Console(ConsoleServiceCaller),
}

impl ServiceCaller for AnyServiceCaller {
    async fn call_service(&mut self, call: &ServiceCall) -> Result<()> {
        match self {
            Self::Mock(caller) => caller.call_service(call).await,
            Self::Console(caller) => caller.call_service(call).await,
        }
    }
}

impl From<MockServiceCaller> for AnyServiceCaller {
    fn from(caller: MockServiceCaller) -> Self {
        Self::Mock(caller)
    }
}

impl From<ConsoleServiceCaller> for AnyServiceCaller {
    fn from(caller: ConsoleServiceCaller) -> Self {
        Self::Console(caller)
    }
}
