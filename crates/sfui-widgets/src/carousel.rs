#![forbid(unsafe_code)]

//! Timed promo carousel with hover pause and wrap-around navigation.
//!
//! # State Machine
//!
//! ```text
//!              start / resume
//!   Stopped ─────────────────▶ Running ──┐ every interval: index += 1
//!      ▲        Paused ◀─pause─┘   ▲     │
//!      │          │                └─────┘
//!      └── drop ──┴──resume──▶ Running
//! ```
//!
//! `next`, `previous` and `go_to` change the index in every state and
//! never touch the timer. `resume` starts a fresh full interval; elapsed
//! time before the pause is not carried over.
//!
//! # Invariants
//!
//! 1. `index < slide_count` at all times.
//! 2. At most one timer per carousel; none while paused or stopped.
//! 3. Dropping the carousel cancels its timer.
//!
//! # Panics
//!
//! [`PromoCarousel::go_to`] panics when `index >= slide_count`. Callers are
//! expected to pass indices they got from the slide list.

use std::cell::Cell;
use std::fmt;
use std::num::NonZeroUsize;
use std::rc::Rc;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use sfui_runtime::{TimerGuard, TimerScheduler};

/// Auto-advance period.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

// ---------------------------------------------------------------------------
// Configuration and data
// ---------------------------------------------------------------------------

/// Carousel timing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CarouselConfig {
    /// Auto-advance period in milliseconds (default: 5000).
    pub interval_ms: u64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL.as_millis() as u64,
        }
    }
}

impl CarouselConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Index and pause flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CarouselState {
    pub index: usize,
    pub paused: bool,
}

/// One promotional slide.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PromoSlide {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub cta_text: String,
    pub cta_link: String,
    pub badge: Option<String>,
}

impl PromoSlide {
    /// The guest catalog's standing promotions.
    #[must_use]
    pub fn weekly_defaults() -> Vec<Self> {
        vec![
            Self {
                id: "promo-antigripales".into(),
                title: "Semana del Resfriado".into(),
                subtitle: "Hasta -20% en antigripales y vitamina C".into(),
                cta_text: "Ver selección".into(),
                cta_link: "/pharmacy/catalog?promo=resfriado".into(),
                badge: Some("Oferta".into()),
            },
            Self {
                id: "promo-cuidado-personal".into(),
                title: "Cuidado Personal".into(),
                subtitle: "Gel antibacterial y mascarillas con descuentos".into(),
                cta_text: "Explorar".into(),
                cta_link: "/pharmacy/catalog?promo=cuidado".into(),
                badge: Some("Especial".into()),
            },
            Self {
                id: "promo-alergias".into(),
                title: "Temporada de Alergias".into(),
                subtitle: "Aprovecha -15% en antihistamínicos".into(),
                cta_text: "Comprar ahora".into(),
                cta_link: "/pharmacy/catalog?promo=alergias".into(),
                badge: Some("Top ventas".into()),
            },
        ]
    }
}

// ---------------------------------------------------------------------------
// PromoCarousel
// ---------------------------------------------------------------------------

/// Auto-advancing slide index.
pub struct PromoCarousel {
    slide_count: NonZeroUsize,
    slides: Vec<PromoSlide>,
    config: CarouselConfig,
    state: Rc<Cell<CarouselState>>,
    scheduler: TimerScheduler,
    timer: Option<TimerGuard>,
}

impl fmt::Debug for PromoCarousel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromoCarousel")
            .field("slide_count", &self.slide_count)
            .field("state", &self.state.get())
            .field("running", &self.timer.is_some())
            .finish()
    }
}

impl PromoCarousel {
    /// Carousel over `slide_count` anonymous slides.
    #[must_use]
    pub fn new(slide_count: NonZeroUsize, config: CarouselConfig, scheduler: TimerScheduler) -> Self {
        Self {
            slide_count,
            slides: Vec::new(),
            config,
            state: Rc::new(Cell::new(CarouselState::default())),
            scheduler,
            timer: None,
        }
    }

    /// Carousel over `slides`. `None` when `slides` is empty.
    #[must_use]
    pub fn with_slides(
        slides: Vec<PromoSlide>,
        config: CarouselConfig,
        scheduler: TimerScheduler,
    ) -> Option<Self> {
        let count = NonZeroUsize::new(slides.len())?;
        let mut carousel = Self::new(count, config, scheduler);
        carousel.slides = slides;
        Some(carousel)
    }

    #[must_use]
    pub fn slide_count(&self) -> NonZeroUsize {
        self.slide_count
    }

    #[must_use]
    pub fn state(&self) -> CarouselState {
        self.state.get()
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.state.get().index
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state.get().paused
    }

    /// Whether the auto-advance timer is armed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    #[must_use]
    pub fn slides(&self) -> &[PromoSlide] {
        &self.slides
    }

    /// Slide at the current index, if the carousel holds slide data.
    #[must_use]
    pub fn current_slide(&self) -> Option<&PromoSlide> {
        self.slides.get(self.index())
    }

    #[must_use]
    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    /// Begin auto-advancing. No-op when already running.
    pub fn start(&mut self) {
        if self.timer.is_some() {
            return;
        }
        self.set_paused(false);
        self.arm();
    }

    /// Stop auto-advancing, keeping the index.
    pub fn pause(&mut self) {
        self.timer = None;
        self.set_paused(true);
        tracing::debug!(target: "sfui.carousel", index = self.index(), "carousel paused");
    }

    /// Restart auto-advance from a fresh full interval. No-op unless paused.
    pub fn resume(&mut self) {
        if !self.is_paused() {
            return;
        }
        self.set_paused(false);
        self.arm();
        tracing::debug!(target: "sfui.carousel", index = self.index(), "carousel resumed");
    }

    pub fn next(&mut self) {
        self.set_index(advance(self.index(), self.slide_count));
    }

    pub fn previous(&mut self) {
        let n = self.slide_count.get();
        self.set_index((self.index() + n - 1) % n);
    }

    /// Jump to `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= slide_count`.
    pub fn go_to(&mut self, index: usize) {
        assert!(
            index < self.slide_count.get(),
            "carousel index {index} out of range (slide_count = {})",
            self.slide_count
        );
        self.set_index(index);
    }

    /// Pointer entered the carousel.
    pub fn pointer_enter(&mut self) {
        self.pause();
    }

    /// Pointer left the carousel.
    pub fn pointer_leave(&mut self) {
        self.resume();
    }

    fn set_index(&self, index: usize) {
        let mut state = self.state.get();
        state.index = index;
        self.state.set(state);
    }

    fn set_paused(&self, paused: bool) {
        let mut state = self.state.get();
        state.paused = paused;
        self.state.set(state);
    }

    fn arm(&mut self) {
        let state = Rc::clone(&self.state);
        let count = self.slide_count;
        self.timer = Some(self.scheduler.every(self.config.interval(), move || {
            let mut s = state.get();
            s.index = advance(s.index, count);
            state.set(s);
            tracing::trace!(target: "sfui.carousel", index = s.index, "auto-advance");
        }));
    }
}

fn advance(index: usize, count: NonZeroUsize) -> usize {
    (index + 1) % count.get()
}
