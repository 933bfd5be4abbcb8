//! Hardware abstraction layer for the Wiegand keypad reader.
//!
//! This crate defines the seams between the decoder and the physical world:
//! the two data lines delivering falling edges, the consumer that receives
//! entered codes, and the millisecond clock both sides agree on. Mock
//! implementations make the whole pipeline drivable without hardware.
//!
//! # Design Philosophy
//!
//! - **Async-first**: device I/O uses native `async fn` in traits
//!   (Rust 1.90 + Edition 2024 RPITIT).
//! - **Enum dispatch**: [`AnyEdgeSource`] and [`AnyServiceCaller`] replace
//!   trait objects so devices can be moved into tokio tasks.
//! - **Thread-safe**: all traits require `Send + Sync`.
//! - **Error-aware**: all operations return [`Result<T>`][error::Result].
//!
//! # Edge Sources
//!
//! ```no_run
//! use wiegand_hardware::traits::EdgeSource;
//! use wiegand_hardware::error::Result;
//!
//! async fn first_line<E: EdgeSource>(source: &mut E) -> Result<String> {
//!     let edge = source.next_edge().await?;
//!     Ok(edge.line.to_string())
//! }
//! ```
//!
//! # Service Consumers
//!
//! ```no_run
//! use wiegand_core::ServiceCall;
//! use wiegand_hardware::traits::ServiceCaller;
//! use wiegand_hardware::error::Result;
//!
//! async fn send<S: ServiceCaller>(sink: &mut S, code: &str) -> Result<()> {
//!     sink.call_service(&ServiceCall::new("esphome.keypad", code)).await
//! }
//! ```
//!
//! [`AnyEdgeSource`]: devices::AnyEdgeSource
//! [`AnyServiceCaller`]: devices::AnyServiceCaller

pub mod clock;
pub mod console;
pub mod devices;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use clock::{ManualClock, MonotonicClock};
pub use console::ConsoleServiceCaller;
pub use devices::{AnyEdgeSource, AnyServiceCaller};
pub use error::{HardwareError, Result};
pub use traits::{Clock, EdgeSource, ServiceCaller, SharedClock};
pub use types::{DeviceInfo, EdgeEvent, LinePins};
