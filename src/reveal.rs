//! Timed reveal choreography for recipe cards and the detail page.
//!
//! A [`RevealSequencer`] emits `containerVisible`, then `imageVisible`, then
//! `textVisible` for one item, each after a fixed delay. Grid cards are
//! additionally staggered by their position. Every sequence carries a
//! generation token; restarting or cancelling the sequencer bumps the
//! generation so timers left over from a previous item never reach the view.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::model::RecipeSummary;

/// Receiving end of the reveal events consumed by the rendering layer
pub type RevealStream = mpsc::UnboundedReceiver<RevealEvent>;

/// Create the channel reveal events flow through
pub fn reveal_channel() -> (mpsc::UnboundedSender<RevealEvent>, RevealStream) {
    mpsc::unbounded_channel()
}

/// Visual stage of an item entrance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevealSignal {
    ContainerVisible,
    ImageVisible,
    TextVisible,
}

impl RevealSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevealSignal::ContainerVisible => "containerVisible",
            RevealSignal::ImageVisible => "imageVisible",
            RevealSignal::TextVisible => "textVisible",
        }
    }
}

impl fmt::Display for RevealSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reveal signal for one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealEvent {
    pub item_id: String,
    pub position: usize,
    pub generation: u64,
    pub signal: RevealSignal,
    /// How long the transition driven by this signal should run
    pub duration: Duration,
}

/// Delays and transition durations for a reveal sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTiming {
    /// Extra delay per grid position
    pub stagger_unit: Duration,
    /// Delay of the image signal after the container signal
    pub image_delay: Duration,
    /// Delay of the text signal after the container signal
    pub text_delay: Duration,
    pub container_duration: Duration,
    pub image_duration: Duration,
    pub text_duration: Duration,
}

impl RevealTiming {
    /// Cascading card entrance for the catalog grid
    pub fn catalog_card() -> Self {
        RevealTiming {
            stagger_unit: Duration::from_millis(150),
            image_delay: Duration::from_millis(200),
            text_delay: Duration::from_millis(400),
            container_duration: Duration::from_millis(600),
            image_duration: Duration::from_millis(400),
            text_duration: Duration::from_millis(400),
        }
    }

    /// Hero image, then title overlay, then content for the detail page
    pub fn detail_page() -> Self {
        RevealTiming {
            stagger_unit: Duration::ZERO,
            image_delay: Duration::from_millis(300),
            text_delay: Duration::from_millis(600),
            container_duration: Duration::from_millis(800),
            image_duration: Duration::from_millis(600),
            text_duration: Duration::from_millis(600),
        }
    }

    /// Single 800 ms fade and slide of the grid header
    pub fn catalog_header() -> Self {
        RevealTiming {
            stagger_unit: Duration::ZERO,
            image_delay: Duration::ZERO,
            text_delay: Duration::ZERO,
            container_duration: Duration::from_millis(800),
            image_duration: Duration::from_millis(800),
            text_duration: Duration::from_millis(800),
        }
    }

    /// Offset of the container signal for an item at `position`
    pub fn start_offset(&self, position: usize) -> Duration {
        self.stagger_unit
            .saturating_mul(u32::try_from(position).unwrap_or(u32::MAX))
    }

    /// Signals in emission order with their offset from the container signal.
    /// A text delay shorter than the image delay is pushed back so the order
    /// container, image, text always holds.
    fn steps(&self) -> [(RevealSignal, Duration, Duration); 3] {
        let image_at = self.image_delay;
        let text_at = self.text_delay.max(image_at);
        [
            (RevealSignal::ContainerVisible, Duration::ZERO, self.container_duration),
            (RevealSignal::ImageVisible, image_at, self.image_duration),
            (RevealSignal::TextVisible, text_at, self.text_duration),
        ]
    }
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self::catalog_card()
    }
}

/// Drives the reveal sequence of a single item at a time
pub struct RevealSequencer {
    timing: RevealTiming,
    generation: Arc<AtomicU64>,
    events: mpsc::UnboundedSender<RevealEvent>,
    task: Option<JoinHandle<()>>,
}

impl RevealSequencer {
    pub fn new(timing: RevealTiming, events: mpsc::UnboundedSender<RevealEvent>) -> Self {
        RevealSequencer {
            timing,
            generation: Arc::new(AtomicU64::new(0)),
            events,
            task: None,
        }
    }

    /// Current generation token. Events carrying an older token are stale.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start the sequence for `item_id` at grid `position`, superseding any
    /// sequence still pending. Must be called from within a tokio runtime.
    pub fn start(&mut self, item_id: &str, position: usize) -> u64 {
        self.abort_task();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let current = Arc::clone(&self.generation);
        let events = self.events.clone();
        let timing = self.timing;
        let item_id = item_id.to_string();
        debug!(
            "Starting reveal for '{}' at position {} (generation {})",
            item_id, position, generation
        );

        self.task = Some(tokio::spawn(async move {
            sleep(timing.start_offset(position)).await;

            let mut elapsed = Duration::ZERO;
            for (signal, at, duration) in timing.steps() {
                if at > elapsed {
                    sleep(at - elapsed).await;
                    elapsed = at;
                }
                if current.load(Ordering::SeqCst) != generation {
                    trace!("Dropping stale {} for '{}'", signal, item_id);
                    return;
                }
                let event = RevealEvent {
                    item_id: item_id.clone(),
                    position,
                    generation,
                    signal,
                    duration,
                };
                if events.send(event).is_err() {
                    // Nobody is rendering anymore
                    return;
                }
            }
        }));

        generation
    }

    /// Invalidate the pending sequence, if any
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.abort_task();
    }

    /// Whether `event` belongs to the sequence currently running
    pub fn is_current(&self, event: &RevealEvent) -> bool {
        event.generation == self.generation()
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for RevealSequencer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// One sequencer per card in the catalog grid, indexed by grid position.
/// Ids are not unique keys: the service may omit them.
pub struct RevealBoard {
    timing: RevealTiming,
    events: mpsc::UnboundedSender<RevealEvent>,
    sequencers: Vec<RevealSequencer>,
}

impl RevealBoard {
    pub fn new(timing: RevealTiming, events: mpsc::UnboundedSender<RevealEvent>) -> Self {
        RevealBoard {
            timing,
            events,
            sequencers: Vec::new(),
        }
    }

    /// Start every card's sequence, staggered by its position in `items`.
    /// Positions past the end of `items` lose their sequencer.
    pub fn reveal(&mut self, items: &[RecipeSummary]) {
        self.sequencers.truncate(items.len());
        while self.sequencers.len() < items.len() {
            self.sequencers
                .push(RevealSequencer::new(self.timing, self.events.clone()));
        }

        for (position, (item, sequencer)) in
            items.iter().zip(self.sequencers.iter_mut()).enumerate()
        {
            sequencer.start(&item.id, position);
        }
    }

    pub fn cancel_all(&mut self) {
        for sequencer in &mut self.sequencers {
            sequencer.cancel();
        }
    }

    pub fn sequencer(&self, position: usize) -> Option<&RevealSequencer> {
        self.sequencers.get(position)
    }

    pub fn len(&self) -> usize {
        self.sequencers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequencers.is_empty()
    }
}
