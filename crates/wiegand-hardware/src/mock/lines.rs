//! Mock Wiegand data lines for testing and development.
//!
//! The mock turns frames into edge events on an internal channel, stamped
//! with a shared clock, exactly as two pin interrupts would deliver them.

use crate::{
    Result,
    traits::{Clock, EdgeSource, SharedClock},
    types::{DeviceInfo, EdgeEvent, LinePins},
};
use tokio::sync::mpsc;
use wiegand_core::{DataLine, KeyInput, WiegandFormat, WiegandFrame};

/// Capacity of the edge channel; holds a few complete 34-bit frames.
const EDGE_CHANNEL_CAPACITY: usize = 256;

/// Mock pair of Wiegand data lines.
///
/// Edges are injected through a [`MockWiegandLinesHandle`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use wiegand_core::{DataLine, KeyInput, WiegandFormat};
/// use wiegand_hardware::clock::ManualClock;
/// use wiegand_hardware::mock::MockWiegandLines;
/// use wiegand_hardware::traits::EdgeSource;
///
/// #[tokio::main]
/// async fn main() -> wiegand_hardware::Result<()> {
///     let clock = ManualClock::starting_at(10);
///     let (mut lines, handle) = MockWiegandLines::new(Arc::new(clock));
///
///     handle.send_key(KeyInput::Digit(1), WiegandFormat::Keypad4).await?;
///
///     // 0001
///     let first = lines.next_edge().await?;
///     assert_eq!(first.line, DataLine::Zero);
///     assert_eq!(first.at_ms, 10);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockWiegandLines {
    /// Channel receiver for simulated edges
    edge_rx: mpsc::Receiver<EdgeEvent>,

    /// Device name
    name: String,

    /// Pins reported in device info
    pins: LinePins,
}

impl MockWiegandLines {
    /// Create new mock lines with the default name.
    ///
    /// Returns the lines and a handle that injects edges into them.
    pub fn new(clock: SharedClock) -> (Self, MockWiegandLinesHandle) {
        Self::with_name("Mock Wiegand Lines".to_string(), clock)
    }

    /// Create new mock lines with a custom name.
    pub fn with_name(name: String, clock: SharedClock) -> (Self, MockWiegandLinesHandle) {
        let (edge_tx, edge_rx) = mpsc::channel(EDGE_CHANNEL_CAPACITY);
        let pins = LinePins::new(
            wiegand_core::constants::DEFAULT_D0_PIN,
            wiegand_core::constants::DEFAULT_D1_PIN,
        );

        let lines = Self {
            edge_rx,
            name: name.clone(),
            pins,
        };

        let handle = MockWiegandLinesHandle {
            edge_tx,
            clock,
            name,
        };

        (lines, handle)
    }

    /// Report different pins in the device info.
    pub fn set_pins(&mut self, pins: LinePins) {
        self.pins = pins;
    }
}

impl EdgeSource for MockWiegandLines {
    async fn next_edge(&mut self) -> Result<EdgeEvent> {
        self.edge_rx
            .recv()
            .await
            .ok_or_else(|| crate::HardwareError::disconnected("Wiegand edge channel closed"))
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Wiegand Lines v1.0")
            .with_pins(self.pins)
            .with_firmware_version("1.0.0"))
    }
}

/// Handle for driving mock Wiegand lines.
///
/// Every edge is stamped with the handle's clock at the moment it is sent.
/// A frame only becomes visible to the decoder after the lines stay quiet
/// for the silence threshold, so consecutive frames need time to pass
/// between them.
#[derive(Debug, Clone)]
pub struct MockWiegandLinesHandle {
    /// Channel sender for simulated edges
    edge_tx: mpsc::Sender<EdgeEvent>,

    /// Clock used to stamp edges
    clock: SharedClock,

    /// Device name
    name: String,
}

impl MockWiegandLinesHandle {
    /// Pulse one line once.
    ///
    /// # Errors
    ///
    /// Returns an error if the lines have been dropped.
    pub async fn pulse(&self, line: DataLine) -> Result<()> {
        let event = EdgeEvent::new(line, self.clock.now_ms());
        self.edge_tx
            .send(event)
            .await
            .map_err(|_| crate::HardwareError::disconnected("Wiegand edge channel closed"))
    }

    /// Send every bit of a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the lines have been dropped.
    pub async fn send_frame(&self, frame: &WiegandFrame) -> Result<()> {
        for line in frame.lines() {
            self.pulse(line).await?;
        }
        Ok(())
    }

    /// Send a bit string such as `"1110 0001"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a bit sequence or the lines
    /// have been dropped.
    pub async fn send_bits(&self, bits: &str) -> Result<()> {
        let frame = WiegandFrame::from_bit_str(bits)?;
        self.send_frame(&frame).await
    }

    /// Send one key press as a 4- or 8-bit keypad frame.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `format` is not a keypad format
    /// - The key code does not fit in a nibble
    /// - The lines have been dropped
    pub async fn send_key(&self, key: KeyInput, format: WiegandFormat) -> Result<()> {
        let frame = match format {
            WiegandFormat::Keypad4 => WiegandFrame::keypad4(key)?,
            WiegandFormat::Keypad8 => WiegandFrame::keypad8(key)?,
            other => {
                return Err(crate::HardwareError::unsupported(format!(
                    "send_key({})",
                    other
                )));
            }
        };
        self.send_frame(&frame).await
    }

    /// Send a 26-bit card frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the id needs more than 24 bits or the lines have
    /// been dropped.
    pub async fn send_card26(&self, id: u32) -> Result<()> {
        self.send_frame(&WiegandFrame::card26(id)?).await
    }

    /// Send a 34-bit card frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the lines have been dropped.
    pub async fn send_card34(&self, id: u32) -> Result<()> {
        self.send_frame(&WiegandFrame::card34(id)).await
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Arc;

    fn lines() -> (MockWiegandLines, MockWiegandLinesHandle, ManualClock) {
        let clock = ManualClock::new();
        let (lines, handle) = MockWiegandLines::new(Arc::new(clock.clone()));
        (lines, handle, clock)
    }

    async fn drain(lines: &mut MockWiegandLines, n: usize) -> Vec<EdgeEvent> {
        let mut events = Vec::with_capacity(n);
        for _ in 0..n {
            events.push(lines.next_edge().await.unwrap());
        }
        events
    }

    #[tokio::test]
    async fn test_pulse_stamps_clock() {
        let (mut lines, handle, clock) = lines();

        clock.set(42);
        handle.pulse(DataLine::One).await.unwrap();

        let event = lines.next_edge().await.unwrap();
        assert_eq!(event, EdgeEvent::new(DataLine::One, 42));
    }

    #[tokio::test]
    async fn test_send_key_keypad8() {
        let (mut lines, handle, _clock) = lines();

        handle
            .send_key(KeyInput::Hash, WiegandFormat::Keypad8)
            .await
            .unwrap();

        let bits: String = drain(&mut lines, 8)
            .await
            .iter()
            .map(|e| if e.line.bit() { '1' } else { '0' })
            .collect();
        assert_eq!(bits, "01001011");
    }

    #[tokio::test]
    async fn test_send_key_rejects_card_format() {
        let (_lines, handle, _clock) = lines();

        let result = handle
            .send_key(KeyInput::Digit(1), WiegandFormat::Card26)
            .await;
        assert!(matches!(
            result,
            Err(crate::HardwareError::Unsupported { .. })
        ));
    }

    #[tokio::test]
    async fn test_send_card34_sends_34_edges() {
        let (mut lines, handle, _clock) = lines();

        handle.send_card34(0xDEAD_BEEF).await.unwrap();

        let events = drain(&mut lines, 34).await;
        assert_eq!(events.len(), 34);
    }

    #[tokio::test]
    async fn test_send_bits_invalid() {
        let (_lines, handle, _clock) = lines();
        assert!(handle.send_bits("01a").await.is_err());
    }

    #[tokio::test]
    async fn test_get_info() {
        let clock = ManualClock::new();
        let (mut lines, _handle) =
            MockWiegandLines::with_name("Gate keypad".to_string(), Arc::new(clock));
        lines.set_pins(LinePins::new(16, 17));

        let info = lines.get_info().await.unwrap();
        assert_eq!(info.name, "Gate keypad");
        assert_eq!(info.pins, Some(LinePins::new(16, 17)));
    }

    #[tokio::test]
    async fn test_closed_channel() {
        let (mut lines, handle, _clock) = lines();

        drop(handle);

        let result = lines.next_edge().await;
        assert!(result.is_err());
    }
}
