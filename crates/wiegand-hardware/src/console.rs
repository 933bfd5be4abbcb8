//! Service consumer that writes calls as JSON lines.
//!
//! Stands in for the home-automation API when the reader runs on a host:
//! every call becomes one line of JSON on the configured writer (stdout by
//! default) and an `info` log record.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;
use wiegand_core::ServiceCall;

use crate::{Result, traits::ServiceCaller};

type SharedWriter = Arc<Mutex<dyn Write + Send>>;

/// Writes each service call as a JSON line.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use wiegand_core::ServiceCall;
/// use wiegand_hardware::console::ConsoleServiceCaller;
/// use wiegand_hardware::traits::ServiceCaller;
///
/// #[tokio::main]
/// async fn main() -> wiegand_hardware::Result<()> {
///     let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
///     let mut caller = ConsoleServiceCaller::with_writer(buffer.clone());
///
///     caller.call_service(&ServiceCall::new("esphome.door", "42")).await?;
///
///     let out = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
///     assert_eq!(out, "{\"service\":\"esphome.door\",\"data\":{\"code\":\"42\"}}\n");
///     Ok(())
/// }
/// ```
pub struct ConsoleServiceCaller {
    writer: SharedWriter,
}

impl ConsoleServiceCaller {
    /// Write calls to stdout.
    pub fn stdout() -> Self {
        Self {
            writer: Arc::new(Mutex::new(io::stdout())),
        }
    }

    /// Write calls to any shared writer.
    pub fn with_writer<W: Write + Send + 'static>(writer: Arc<Mutex<W>>) -> Self {
        Self { writer }
    }
}

impl std::fmt::Debug for ConsoleServiceCaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleServiceCaller").finish_non_exhaustive()
    }
}

impl Default for ConsoleServiceCaller {
    fn default() -> Self {
        Self::stdout()
    }
}

impl ServiceCaller for ConsoleServiceCaller {
    async fn call_service(&mut self, call: &ServiceCall) -> Result<()> {
        let line = serde_json::to_string(call)
            .map_err(|e| crate::HardwareError::service_call(call.service.clone(), e.to_string()))?;

        info!(service = %call.service, code = %call.code(), "Calling service");

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}
