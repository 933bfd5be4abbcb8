//! Hardware device trait definitions.
//!
//! These traits are the contract between the decoder and the outside world:
//! where edges come from ([`EdgeSource`]), where entered codes go
//! ([`ServiceCaller`]) and what time it is ([`Clock`]). Mock and real
//! implementations are interchangeable behind them.
//!
//! The async traits use native `async fn` methods (Rust 1.90 + Edition 2024
//! RPITIT), eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use std::fmt;
use std::sync::Arc;

use wiegand_core::ServiceCall;

use crate::error::Result;
use crate::types::{DeviceInfo, EdgeEvent};

/// Source of falling-edge events on the two Wiegand data lines.
///
/// On a microcontroller this is the pair of pin interrupts; on a host it can
/// be a GPIO character device or a simulation. Each event carries the line
/// and a monotonic millisecond timestamp.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`, which is an opaque type that cannot be used in trait objects
/// (Edition 2024 RPITIT). You cannot use `Box<dyn EdgeSource>`.
///
/// Use generic type parameters, or the enum wrapper
/// [`AnyEdgeSource`](crate::devices::AnyEdgeSource) when the source has to be
/// moved into a spawned task.
///
/// # Examples
///
/// ```no_run
/// use wiegand_hardware::traits::EdgeSource;
/// use wiegand_hardware::error::Result;
///
/// async fn count_edges<E: EdgeSource>(source: &mut E, n: usize) -> Result<u64> {
///     let mut last = 0;
///     for _ in 0..n {
///         last = source.next_edge().await?.at_ms;
///     }
///     Ok(last)
/// }
/// ```
pub trait EdgeSource: Send + Sync {
    /// Wait for the next falling edge on either line.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The device is disconnected
    /// - A communication error occurs
    async fn next_edge(&mut self) -> Result<EdgeEvent>;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs while querying
    /// device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// Consumer of entered codes.
///
/// A call is fire-and-forget from the reader's point of view: the reader
/// logs a failure and moves on, it never retries.
///
/// # Examples
///
/// ```no_run
/// use wiegand_core::ServiceCall;
/// use wiegand_hardware::traits::ServiceCaller;
/// use wiegand_hardware::error::Result;
///
/// async fn open_door<S: ServiceCaller>(sink: &mut S, code: &str) -> Result<()> {
///     sink.call_service(&ServiceCall::new("esphome.door_code", code)).await
/// }
/// ```
pub trait ServiceCaller: Send + Sync {
    /// Invoke the external action.
    ///
    /// # Errors
    ///
    /// Returns an error if the call could not be delivered.
    async fn call_service(&mut self, call: &ServiceCall) -> Result<()>;
}

/// Monotonic millisecond clock.
///
/// Edge timestamps and the polling loop must agree on the time base, so both
/// read the same clock.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Milliseconds since an arbitrary, fixed origin.
    fn now_ms(&self) -> u64;
}

/// Clock shared between the edge producer and the polling loop.
pub type SharedClock = Arc<dyn Clock>;

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
