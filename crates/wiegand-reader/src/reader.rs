//! Reader runtime.
//!
//! The [`WiegandReader`] ties the pieces together: edge sources feed the
//! shared [`WiegandBus`], a polling loop classifies whatever has accumulated
//! and hands decoded values to the [`KeyAssembler`], and finished codes go to
//! the service consumer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  record_edge  ┌─────────────┐  classify  ┌────────────┐
//! │ Edge     │──────────────►│ WiegandBus  │◄───────────│ Poll task  │──► ServiceCaller
//! │ task(s)  │               │ (RawBits)   │  every     │ (interval) │
//! └──────────┘               └─────────────┘  200 ms    └─────┬──────┘
//!                                                             │
//!                                                             ▼
//!                                                      ReaderEvent channel
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use wiegand_hardware::{ConsoleServiceCaller, MonotonicClock, SharedClock};
//! use wiegand_hardware::mock::MockWiegandLines;
//! use wiegand_reader::{ReaderConfig, ReaderEvent, WiegandReader};
//!
//! #[tokio::main]
//! async fn main() -> wiegand_reader::Result<()> {
//!     let clock: SharedClock = Arc::new(MonotonicClock::new());
//!     let mut reader = WiegandReader::new(
//!         ReaderConfig::default(),
//!         ConsoleServiceCaller::stdout(),
//!         clock.clone(),
//!     )?;
//!
//!     let (lines, _keypad) = MockWiegandLines::new(clock);
//!     reader.register_edge_source(lines);
//!
//!     let mut handle = reader.start();
//!     while let Some(event) = handle.recv().await {
//!         if let ReaderEvent::CodeSent { call, .. } = event {
//!             println!("entered {}", call.code());
//!         }
//!     }
//!     handle.shutdown().await
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};
use wiegand_core::{DecodedFrame, DiscardReason, ServiceCall, WiegandFormat};
use wiegand_hardware::traits::{Clock, EdgeSource, ServiceCaller};
use wiegand_hardware::{AnyEdgeSource, AnyServiceCaller, SharedClock};

use crate::accumulator::WiegandBus;
use crate::assembler::{FlushTrigger, KeyAssembler};
use crate::classifier::{Classification, FrameClassifier};
use crate::config::ReaderConfig;
use crate::error::Result;

/// Something the reader did, published on the handle's event stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ReaderEvent {
    /// A valid frame was decoded.
    FrameDecoded { frame: DecodedFrame },

    /// Accumulated bits were dropped.
    FrameDiscarded { reason: DiscardReason },

    /// A code was delivered to the service consumer.
    CodeSent {
        call: ServiceCall,
        trigger: FlushTrigger,
        at: DateTime<Utc>,
    },

    /// The service consumer rejected a code. It is not retried.
    SendFailed {
        call: ServiceCall,
        trigger: FlushTrigger,
        error: String,
    },

    /// An edge source failed; its task has ended.
    SourceError { source: String, error: String },
}

/// A code handed to the service consumer during a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    /// The call as sent.
    pub call: ServiceCall,

    /// Why the code was sent.
    pub trigger: FlushTrigger,

    /// Consumer error, if the call failed.
    pub error: Option<String>,
}

impl Emission {
    #[must_use]
    pub fn delivered(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of one polling cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// What the classifier made of the accumulated bits.
    pub classification: Classification,

    /// Code sent during this cycle, if any.
    pub emission: Option<Emission>,
}

impl PollOutcome {
    /// Events describing this cycle, in the order they happened.
    pub fn into_events(self, at: DateTime<Utc>) -> Vec<ReaderEvent> {
        let mut events = Vec::with_capacity(2);

        match self.classification {
            Classification::Frame(frame) => events.push(ReaderEvent::FrameDecoded { frame }),
            Classification::Discarded(reason) => {
                events.push(ReaderEvent::FrameDiscarded { reason })
            }
            Classification::Pending | Classification::Idle => {}
        }

        if let Some(emission) = self.emission {
            events.push(match emission.error {
                None => ReaderEvent::CodeSent {
                    call: emission.call,
                    trigger: emission.trigger,
                    at,
                },
                Some(error) => ReaderEvent::SendFailed {
                    call: emission.call,
                    trigger: emission.trigger,
                    error,
                },
            });
        }

        events
    }
}

/// Counters kept by a running reader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReaderStats {
    /// Edges recorded by the edge tasks.
    pub edges_received: u64,

    /// Valid frames decoded.
    pub frames_decoded: u64,

    /// Noise bursts and parity failures dropped.
    pub frames_discarded: u64,

    /// Codes delivered to the service consumer.
    pub codes_sent: u64,

    /// Codes the service consumer rejected.
    pub send_failures: u64,
}

#[derive(Debug, Default)]
struct StatsCounters {
    edges_received: AtomicU64,
    frames_decoded: AtomicU64,
    frames_discarded: AtomicU64,
    codes_sent: AtomicU64,
    send_failures: AtomicU64,
}

impl StatsCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ReaderStats {
        ReaderStats {
            edges_received: self.edges_received.load(Ordering::Relaxed),
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            frames_discarded: self.frames_discarded.load(Ordering::Relaxed),
            codes_sent: self.codes_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
        }
    }
}

/// Handle to a started reader.
///
/// Dropping the handle aborts every reader task.
pub struct ReaderHandle {
    event_rx: mpsc::Receiver<ReaderEvent>,
    tasks: JoinSet<Result<()>>,
    stats: Arc<StatsCounters>,
}

impl ReaderHandle {
    /// Receive the next reader event.
    ///
    /// Returns `None` once every task has ended and the channel is drained.
    pub async fn recv(&mut self) -> Option<ReaderEvent> {
        self.event_rx.recv().await
    }

    /// Receive an event if one is already queued.
    pub fn try_recv(&mut self) -> Option<ReaderEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> ReaderStats {
        self.stats.snapshot()
    }

    /// Stop all reader tasks and wait for them to finish.
    ///
    /// Tasks that failed or panicked are counted and logged; they do not fail
    /// the shutdown.
    pub async fn shutdown(mut self) -> Result<()> {
        self.tasks.abort_all();

        let mut error_count = 0;
        let mut panic_count = 0;

        while let Some(result) = self.tasks.join_next().await {
            match Self::classify_task_result(result) {
                TaskTermination::Success | TaskTermination::Cancelled => {}
                TaskTermination::Error => error_count += 1,
                TaskTermination::Panic => panic_count += 1,
            }
        }

        if error_count + panic_count > 0 {
            warn!(
                errors = error_count,
                panics = panic_count,
                "Reader tasks ended abnormally"
            );
        }
        info!(stats = ?self.stats.snapshot(), "Reader stopped");

        Ok(())
    }

    fn classify_task_result(
        result: std::result::Result<Result<()>, tokio::task::JoinError>,
    ) -> TaskTermination {
        match result {
            Ok(Ok(())) => TaskTermination::Success,
            Ok(Err(_)) => TaskTermination::Error,
            Err(e) if e.is_cancelled() => TaskTermination::Cancelled,
            Err(_) => TaskTermination::Panic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskTermination {
    Success,
    Error,
    Cancelled,
    Panic,
}

/// Wiegand keypad reader.
///
/// # Lifecycle
///
/// 1. Create the reader with a configuration, a service consumer and a clock
/// 2. Register edge sources
/// 3. Either call [`poll`](Self::poll) from your own loop, or call
///    [`start`](Self::start) to spawn the edge and polling tasks
///
/// The clock must be the one the edge sources stamp their edges with.
pub struct WiegandReader {
    config: ReaderConfig,
    bus: WiegandBus,
    classifier: FrameClassifier,
    assembler: KeyAssembler,
    sink: AnyServiceCaller,
    clock: SharedClock,
    sources: Vec<AnyEdgeSource>,
    stats: Arc<StatsCounters>,
}

impl WiegandReader {
    /// Create a reader.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::InvalidConfig`](crate::ReaderError::InvalidConfig)
    /// if the configuration does not validate.
    pub fn new(
        config: ReaderConfig,
        sink: impl Into<AnyServiceCaller>,
        clock: SharedClock,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            bus: WiegandBus::new(),
            classifier: FrameClassifier::new(),
            assembler: KeyAssembler::new(),
            sink: sink.into(),
            clock,
            sources: Vec::new(),
            stats: Arc::new(StatsCounters::default()),
        })
    }

    /// Add a source of edges. Takes effect on [`start`](Self::start).
    pub fn register_edge_source(&mut self, source: impl Into<AnyEdgeSource>) {
        self.sources.push(source.into());
    }

    /// Number of registered edge sources.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// The accumulator edges are recorded into.
    ///
    /// Platform interrupt handlers can record into a clone directly instead
    /// of going through an [`EdgeSource`].
    #[must_use]
    pub fn bus(&self) -> &WiegandBus {
        &self.bus
    }

    #[must_use]
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Digits entered but not yet sent.
    #[must_use]
    pub fn pending(&self) -> &str {
        self.assembler.pending()
    }

    /// Format of the most recent frame with an accepted length.
    #[must_use]
    pub fn last_format(&self) -> Option<WiegandFormat> {
        self.classifier.last_format()
    }

    #[must_use]
    pub fn stats(&self) -> ReaderStats {
        self.stats.snapshot()
    }

    /// Run one polling cycle.
    ///
    /// The bus is locked only while the classifier reads and resets it.
    /// When a frame was decoded its value goes to the assembler; otherwise
    /// the assembler checks its idle timeout. A resulting code is sent to
    /// the service consumer once; failures are logged and dropped.
    pub async fn poll(&mut self) -> PollOutcome {
        let now = self.clock.now_ms();
        let classification = self
            .bus
            .with_bits(|bits| self.classifier.classify(bits, now));

        let flush = match &classification {
            Classification::Frame(frame) => {
                debug!(
                    format = %frame.format,
                    bits = frame.bit_count,
                    value = frame.value,
                    "Frame decoded"
                );
                StatsCounters::bump(&self.stats.frames_decoded);
                self.assembler.on_key(frame.key_input(), now)
            }
            Classification::Discarded(reason) => {
                debug!(%reason, "Frame discarded");
                StatsCounters::bump(&self.stats.frames_discarded);
                self.idle_flush(now)
            }
            Classification::Pending | Classification::Idle => self.idle_flush(now),
        };

        let emission = match flush {
            Some((code, trigger)) => Some(self.emit(code, trigger).await),
            None => None,
        };

        PollOutcome {
            classification,
            emission,
        }
    }

    /// Spawn the edge tasks and the polling task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(mut self) -> ReaderHandle {
        let (event_tx, event_rx) = mpsc::channel(self.config.event_buffer);
        let mut tasks = JoinSet::new();

        info!(
            service = %self.config.service,
            d0 = self.config.d0_pin,
            d1 = self.config.d1_pin,
            sources = self.sources.len(),
            "Starting Wiegand reader"
        );

        for source in std::mem::take(&mut self.sources) {
            tasks.spawn(Self::edge_task(
                source,
                self.bus.clone(),
                Arc::clone(&self.stats),
                event_tx.clone(),
            ));
        }

        let stats = Arc::clone(&self.stats);
        tasks.spawn(self.poll_task(event_tx));

        ReaderHandle {
            event_rx,
            tasks,
            stats,
        }
    }

    fn idle_flush(&mut self, now_ms: u64) -> Option<(String, FlushTrigger)> {
        self.assembler
            .on_idle(now_ms)
            .map(|code| (code, FlushTrigger::IdleTimeout))
    }

    async fn emit(&mut self, code: String, trigger: FlushTrigger) -> Emission {
        let call = ServiceCall::new(self.config.service.clone(), code);

        match self.sink.call_service(&call).await {
            Ok(()) => {
                info!(service = %call.service, %trigger, "Code sent");
                StatsCounters::bump(&self.stats.codes_sent);
                Emission {
                    call,
                    trigger,
                    error: None,
                }
            }
            Err(e) => {
                warn!(service = %call.service, %trigger, error = %e, "Service call failed");
                StatsCounters::bump(&self.stats.send_failures);
                Emission {
                    call,
                    trigger,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn poll_task(mut self, tx: mpsc::Sender<ReaderEvent>) -> Result<()> {
        let mut interval = tokio::time::interval(self.config.poll_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let outcome = self.poll().await;
            for event in outcome.into_events(Utc::now()) {
                Self::publish(&tx, event);
            }
        }
    }

    /// Queue an event without waiting; decoding never stalls on a slow
    /// consumer of the event stream.
    fn publish(tx: &mpsc::Sender<ReaderEvent>, event: ReaderEvent) {
        match tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                debug!(?event, "Reader event buffer full, dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }

    async fn edge_task(
        mut source: AnyEdgeSource,
        bus: WiegandBus,
        stats: Arc<StatsCounters>,
        tx: mpsc::Sender<ReaderEvent>,
    ) -> Result<()> {
        let name = match source.get_info().await {
            Ok(info) => info.name,
            Err(_) => "edge source".to_string(),
        };
        debug!(source = %name, "Edge source started");

        loop {
            match source.next_edge().await {
                Ok(edge) => {
                    trace!(line = %edge.line, at_ms = edge.at_ms, "Edge");
                    bus.record_edge(edge.line, edge.at_ms);
                    StatsCounters::bump(&stats.edges_received);
                }
                Err(e) => {
                    warn!(source = %name, error = %e, "Edge source failed");
                    let _ = tx
                        .send(ReaderEvent::SourceError {
                            source: name,
                            error: e.to_string(),
                        })
                        .await;
                    return Err(e.into());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiegand_core::{KeyInput, WiegandFrame};
    use wiegand_hardware::clock::ManualClock;
    use wiegand_hardware::mock::{MockServiceCaller, MockServiceCallerHandle};

    const QUIET_MS: u64 = 30;

    struct Fixture {
        reader: WiegandReader,
        clock: ManualClock,
        calls: MockServiceCallerHandle,
    }

    impl Fixture {
        fn new() -> Self {
            let clock = ManualClock::starting_at(1_000);
            let (caller, calls) = MockServiceCaller::new();
            let reader =
                WiegandReader::new(ReaderConfig::default(), caller, Arc::new(clock.clone()))
                    .unwrap();
            Self {
                reader,
                clock,
                calls,
            }
        }

        fn feed(&self, frame: &WiegandFrame) {
            let at = self.clock.now_ms();
            for line in frame.lines() {
                self.reader.bus().record_edge(line, at);
            }
        }

        async fn key(&mut self, key: KeyInput) -> PollOutcome {
            self.feed(&WiegandFrame::keypad8(key).unwrap());
            self.clock.advance(QUIET_MS);
            self.reader.poll().await
        }
    }

    #[tokio::test]
    async fn test_digits_and_terminator_send_one_code() {
        let mut fx = Fixture::new();

        for digit in [1, 2, 3] {
            let outcome = fx.key(KeyInput::Digit(digit)).await;
            assert!(outcome.classification.is_frame());
            assert_eq!(outcome.emission, None);
        }
        assert_eq!(fx.reader.pending(), "123");

        let outcome = fx.key(KeyInput::Hash).await;
        let emission = outcome.emission.unwrap();
        assert_eq!(emission.call, ServiceCall::new("esphome.wiegand_code", "123"));
        assert_eq!(emission.trigger, FlushTrigger::Terminator);
        assert!(emission.delivered());

        assert_eq!(fx.calls.codes(), vec!["123".to_string()]);
        assert!(fx.reader.pending().is_empty());
    }

    #[tokio::test]
    async fn test_idle_timeout_sends_once() {
        let mut fx = Fixture::new();
        fx.key(KeyInput::Digit(5)).await;

        fx.clock.advance(2_000);
        assert_eq!(fx.reader.poll().await.emission, None);

        fx.clock.advance(1);
        let emission = fx.reader.poll().await.emission.unwrap();
        assert_eq!(emission.call.code(), "5");
        assert_eq!(emission.trigger, FlushTrigger::IdleTimeout);

        fx.clock.advance(5_000);
        assert_eq!(fx.reader.poll().await.emission, None);
        assert_eq!(fx.calls.call_count(), 1);
    }

    #[tokio::test]
    async fn test_star_discards_pending_and_sends_star() {
        let mut fx = Fixture::new();
        fx.key(KeyInput::Digit(4)).await;
        fx.key(KeyInput::Digit(2)).await;

        let emission = fx.key(KeyInput::Star).await.emission.unwrap();
        assert_eq!(emission.call.code(), "*");
        assert_eq!(emission.trigger, FlushTrigger::Clear);

        fx.clock.advance(10_000);
        fx.reader.poll().await;
        assert_eq!(fx.calls.codes(), vec!["*".to_string()]);
    }

    #[tokio::test]
    async fn test_pending_frame_is_not_classified() {
        let mut fx = Fixture::new();
        fx.feed(&WiegandFrame::card26(77).unwrap());

        fx.clock.advance(10);
        let outcome = fx.reader.poll().await;
        assert_eq!(outcome.classification, Classification::Pending);
        assert_eq!(fx.reader.bus().snapshot().bit_count(), 26);

        fx.clock.advance(QUIET_MS);
        let outcome = fx.reader.poll().await;
        assert_eq!(outcome.classification.frame().map(|f| f.value), Some(77));
        assert_eq!(fx.reader.last_format(), Some(WiegandFormat::Card26));
    }

    #[tokio::test]
    async fn test_failed_send_is_not_retried() {
        let mut fx = Fixture::new();
        fx.calls.set_failing(true);

        fx.key(KeyInput::Digit(9)).await;
        let emission = fx.key(KeyInput::Hash).await.emission.unwrap();
        assert!(!emission.delivered());
        assert!(emission.error.is_some());

        fx.calls.set_failing(false);
        fx.clock.advance(10_000);
        assert_eq!(fx.reader.poll().await.emission, None);
        assert_eq!(fx.calls.call_count(), 0);

        let stats = fx.reader.stats();
        assert_eq!(stats.send_failures, 1);
        assert_eq!(stats.codes_sent, 0);
    }

    #[tokio::test]
    async fn test_discarded_frame_counts_and_checks_idle() {
        let mut fx = Fixture::new();
        fx.key(KeyInput::Digit(8)).await;

        fx.clock.advance(2_500);
        fx.feed(&WiegandFrame::from_bit_str("1111_0001").unwrap());
        fx.clock.advance(QUIET_MS);

        let outcome = fx.reader.poll().await;
        assert!(matches!(
            outcome.classification,
            Classification::Discarded(DiscardReason::ParityMismatch { .. })
        ));
        // the mismatch is not a frame, so the stale "8" goes out
        assert_eq!(outcome.emission.unwrap().call.code(), "8");
        assert_eq!(fx.reader.stats().frames_discarded, 1);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let (caller, _) = MockServiceCaller::new();
        let config = ReaderConfig {
            service: String::new(),
            ..ReaderConfig::default()
        };
        let result = WiegandReader::new(config, caller, Arc::new(ManualClock::new()));
        assert!(matches!(
            result,
            Err(crate::ReaderError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_outcome_events() {
        let frame = DecodedFrame::new(11, WiegandFormat::Keypad8, 8);
        let outcome = PollOutcome {
            classification: Classification::Frame(frame),
            emission: Some(Emission {
                call: ServiceCall::new("svc", "12"),
                trigger: FlushTrigger::Terminator,
                error: None,
            }),
        };
        let at = Utc::now();

        let events = outcome.into_events(at);

        assert_eq!(
            events,
            vec![
                ReaderEvent::FrameDecoded { frame },
                ReaderEvent::CodeSent {
                    call: ServiceCall::new("svc", "12"),
                    trigger: FlushTrigger::Terminator,
                    at,
                },
            ]
        );
    }

    #[test]
    fn test_idle_outcome_has_no_events() {
        let outcome = PollOutcome {
            classification: Classification::Idle,
            emission: None,
        };
        assert!(outcome.into_events(Utc::now()).is_empty());
    }
}
