//! Mock service consumer for testing and development.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use wiegand_core::ServiceCall;

use crate::{Result, traits::ServiceCaller};

/// Mock service consumer that records every call.
///
/// # Examples
///
/// ```
/// use wiegand_core::ServiceCall;
/// use wiegand_hardware::mock::MockServiceCaller;
/// use wiegand_hardware::traits::ServiceCaller;
///
/// #[tokio::main]
/// async fn main() -> wiegand_hardware::Result<()> {
///     let (mut caller, handle) = MockServiceCaller::new();
///
///     caller.call_service(&ServiceCall::new("esphome.door", "1234")).await?;
///
///     assert_eq!(handle.codes(), vec!["1234".to_string()]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockServiceCaller {
    calls: Arc<Mutex<Vec<ServiceCall>>>,
    failing: Arc<AtomicBool>,
}

impl MockServiceCaller {
    /// Create a new mock consumer and the handle used to inspect it.
    pub fn new() -> (Self, MockServiceCallerHandle) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let failing = Arc::new(AtomicBool::new(false));

        let caller = Self {
            calls: Arc::clone(&calls),
            failing: Arc::clone(&failing),
        };

        (caller, MockServiceCallerHandle { calls, failing })
    }
}

impl Default for MockServiceCaller {
    fn default() -> Self {
        Self::new().0
    }
}

impl ServiceCaller for MockServiceCaller {
    async fn call_service(&mut self, call: &ServiceCall) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(crate::HardwareError::service_call(
                call.service.clone(),
                "mock consumer unavailable",
            ));
        }
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call.clone());
        Ok(())
    }
}

/// Handle for inspecting and steering a [`MockServiceCaller`].
#[derive(Debug, Clone)]
pub struct MockServiceCallerHandle {
    calls: Arc<Mutex<Vec<ServiceCall>>>,
    failing: Arc<AtomicBool>,
}

impl MockServiceCallerHandle {
    /// Every call delivered so far, oldest first.
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The `code` payload of every call delivered so far.
    pub fn codes(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.data.code).collect()
    }

    /// Number of calls delivered so far.
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Make subsequent calls fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}
