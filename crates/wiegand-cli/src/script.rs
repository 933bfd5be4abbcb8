//! Keypad simulation scripts.
//!
//! One step per line, `#` starts a comment:
//!
//! ```text
//! key 1          # 8-bit keypad frame
//! key 2 4        # 4-bit keypad frame
//! key #
//! card26 0x010001
//! card34 305419896
//! bits 1010_0101
//! wait 2500      # milliseconds
//! ```

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tracing::debug;
use wiegand_core::{KeyInput, WiegandFormat, WiegandFrame};
use wiegand_hardware::mock::MockWiegandLinesHandle;

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Press a key on a 4- or 8-bit keypad.
    Key { key: KeyInput, format: WiegandFormat },
    /// Swipe a 26-bit card.
    Card26(u32),
    /// Swipe a 34-bit card.
    Card34(u32),
    /// Put arbitrary bits on the lines.
    Bits(WiegandFrame),
    /// Do nothing for a while.
    Wait(Duration),
}

impl Step {
    /// Whether this step puts a frame on the lines.
    pub fn is_frame(&self) -> bool {
        !matches!(self, Step::Wait(_))
    }
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let command = words.next().ok_or_else(|| anyhow!("empty step"))?;
        let args: Vec<&str> = words.collect();

        let step = match (command, args.as_slice()) {
            ("key", [key]) => Step::Key {
                key: key.parse()?,
                format: WiegandFormat::Keypad8,
            },
            ("key", [key, width]) => Step::Key {
                key: key.parse()?,
                format: keypad_format(width)?,
            },
            ("card26", [id]) => {
                let id = parse_id(id)?;
                // reject oversized ids while parsing rather than mid-run
                WiegandFrame::card26(id)?;
                Step::Card26(id)
            }
            ("card34", [id]) => Step::Card34(parse_id(id)?),
            ("bits", groups) if !groups.is_empty() => {
                Step::Bits(WiegandFrame::from_bit_str(&groups.concat())?)
            }
            ("wait", [ms]) => {
                let ms: u64 = ms
                    .parse()
                    .with_context(|| format!("invalid wait duration {:?}", ms))?;
                Step::Wait(Duration::from_millis(ms))
            }
            ("key" | "card26" | "card34" | "bits" | "wait", _) => {
                bail!("wrong number of arguments for {:?}", command)
            }
            (other, _) => bail!("unknown command {:?}", other),
        };

        Ok(step)
    }
}

fn keypad_format(width: &str) -> Result<WiegandFormat> {
    match width {
        "4" => Ok(WiegandFormat::Keypad4),
        "8" => Ok(WiegandFormat::Keypad8),
        other => bail!("keypad frames are 4 or 8 bits, not {:?}", other),
    }
}

/// Decimal or `0x`-prefixed hexadecimal card id.
fn parse_id(text: &str) -> Result<u32> {
    let parsed = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.with_context(|| format!("invalid card id {:?}", text))
}

/// Parse a whole script.
///
/// Blank lines and comments are skipped. `#` only starts a comment at the
/// beginning of a line or after whitespace, so `key #` still presses hash.
pub fn parse(text: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }
        let step = line
            .parse::<Step>()
            .with_context(|| format!("line {}: {:?}", index + 1, raw.trim()))?;
        steps.push(step);
    }

    Ok(steps)
}

fn strip_comment(line: &str) -> &str {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return "";
    }
    match trimmed.find(" #") {
        // "key #" and "key # comment": the first hash is the key
        Some(pos) if trimmed[..pos].trim() == "key" => match trimmed[pos + 2..].find(" #") {
            Some(rest) => &trimmed[..pos + 2 + rest],
            None => trimmed,
        },
        Some(pos) => &trimmed[..pos],
        None => trimmed,
    }
}

/// Play the steps on the mock lines.
///
/// Every frame is followed by `frame_gap` so the reader sees it on its own
/// before the next one starts.
pub async fn run(
    steps: &[Step],
    keypad: &MockWiegandLinesHandle,
    frame_gap: Duration,
) -> Result<()> {
    for step in steps {
        debug!(?step, "Script step");

        match step {
            Step::Key { key, format } => keypad.send_key(*key, *format).await?,
            Step::Card26(id) => keypad.send_card26(*id).await?,
            Step::Card34(id) => keypad.send_card34(*id).await?,
            Step::Bits(frame) => keypad.send_frame(frame).await?,
            Step::Wait(duration) => tokio::time::sleep(*duration).await,
        }

        if step.is_frame() {
            tokio::time::sleep(frame_gap).await;
        }
    }
    Ok(())
}
