//! Interactive region selection as an explicit state machine
//!
//! The selector is driven by abstract input events, so any windowing
//! toolkit can feed it and tests can replay synthetic gestures.
//!
//! ```text
//! Idle --PointerDown--> Tracking --PointerUp (>= 10x10)--> Resolved
//!   |                      |  \--PointerUp (< 10x10)----> Cancelled
//!   \--CancelKey/Lost------+-----CancelKey/Lost---------> Cancelled
//! ```

use crate::{
    desktop::VirtualDesktop,
    error::CaptureError,
    geometry::{self, LogicalPoint, LogicalRect, OverlayWindow},
    types::CaptureRect,
};

/// Smallest accepted selection edge, in physical pixels
pub const MIN_SELECTION_SIZE: i64 = 10;

/// Input delivered to the overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectorEvent {
    PointerDown(LogicalPoint),
    PointerMove(LogicalPoint),
    PointerUp(LogicalPoint),
    /// Escape key
    CancelKey,
    /// The overlay lost its session at the OS message level
    SessionLost,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectorState {
    Idle,
    Tracking {
        anchor: LogicalPoint,
        current: LogicalPoint,
    },
    Resolved(CaptureRect),
    Cancelled,
}

impl SelectorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SelectorState::Resolved(_) | SelectorState::Cancelled)
    }
}

/// Result reported to the caller once the session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub has_selection: bool,
    pub rect: Option<CaptureRect>,
}

impl SelectionOutcome {
    pub fn none() -> Self {
        Self {
            has_selection: false,
            rect: None,
        }
    }

    pub fn selected(rect: CaptureRect) -> Self {
        Self {
            has_selection: true,
            rect: Some(rect),
        }
    }
}

/// One region-selection session over a freshly sampled virtual desktop
#[derive(Debug, Clone)]
pub struct RegionSelector {
    overlay: OverlayWindow,
    state: SelectorState,
    pointer_captured: bool,
}

impl RegionSelector {
    /// Start a session with an overlay spanning the whole virtual desktop
    pub fn begin(desktop: VirtualDesktop) -> Self {
        log::debug!(
            "region selection over {}x{} at ({}, {})",
            desktop.bounds.width,
            desktop.bounds.height,
            desktop.bounds.left,
            desktop.bounds.top
        );
        Self {
            overlay: OverlayWindow::new(desktop.bounds, desktop.monitors),
            state: SelectorState::Idle,
            pointer_captured: false,
        }
    }

    /// The overlay now has a device context; coordinates can be resolved
    pub fn on_presented(&mut self) {
        self.overlay.mark_presented();
    }

    pub fn overlay(&self) -> &OverlayWindow {
        &self.overlay
    }

    pub fn state(&self) -> &SelectorState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// Whether the overlay currently holds pointer capture
    pub fn pointer_captured(&self) -> bool {
        self.pointer_captured
    }

    /// Candidate rectangle to render, in overlay-local logical coordinates
    pub fn live_rect(&self) -> Option<LogicalRect> {
        match self.state {
            SelectorState::Tracking { anchor, current } => {
                Some(LogicalRect::spanning(anchor, current))
            }
            _ => None,
        }
    }

    /// Feed one input event. Events after a terminal state are ignored.
    pub fn handle(&mut self, event: SelectorEvent) -> &SelectorState {
        if self.state.is_terminal() {
            return &self.state;
        }

        match (self.state, event) {
            (SelectorState::Idle, SelectorEvent::PointerDown(point)) => self.start_tracking(point),
            (SelectorState::Tracking { anchor, .. }, SelectorEvent::PointerMove(point)) => {
                self.state = SelectorState::Tracking {
                    anchor,
                    current: point,
                };
            }
            (SelectorState::Tracking { anchor, .. }, SelectorEvent::PointerUp(point)) => {
                self.resolve(anchor, point)
            }
            (_, SelectorEvent::CancelKey) | (_, SelectorEvent::SessionLost) => {
                log::debug!("region selection cancelled by {:?}", event);
                self.cancel();
            }
            // Moves before a press, a second press, or a release without a press
            _ => {}
        }

        &self.state
    }

    /// Replay events until the session ends.
    ///
    /// A session whose event stream ends before a terminal state is treated
    /// as lost.
    pub fn run<I>(mut self, events: I) -> SelectionOutcome
    where
        I: IntoIterator<Item = SelectorEvent>,
    {
        for event in events {
            if self.handle(event).is_terminal() {
                break;
            }
        }
        if !self.is_finished() {
            self.handle(SelectorEvent::SessionLost);
        }
        self.outcome().unwrap_or_else(SelectionOutcome::none)
    }

    /// Selection result, available once the session has ended
    pub fn outcome(&self) -> Option<SelectionOutcome> {
        match self.state {
            SelectorState::Resolved(rect) => Some(SelectionOutcome::selected(rect)),
            SelectorState::Cancelled => Some(SelectionOutcome::none()),
            _ => None,
        }
    }

    fn start_tracking(&mut self, anchor: LogicalPoint) {
        // Validates that the overlay can resolve device coordinates at all;
        // without a transform the session aborts instead of guessing 1.0.
        match geometry::to_absolute_pixels(anchor, &self.overlay) {
            Ok(pixel) => {
                log::debug!("selection anchored at ({}, {})", pixel.x, pixel.y);
                self.pointer_captured = true;
                self.state = SelectorState::Tracking {
                    anchor,
                    current: anchor,
                };
            }
            Err(err) => self.abort(err),
        }
    }

    fn resolve(&mut self, anchor: LogicalPoint, release: LogicalPoint) {
        self.pointer_captured = false;

        let rect = match geometry::to_absolute_rect(anchor, release, &self.overlay) {
            Ok(rect) => rect,
            Err(err) => return self.abort(err),
        };

        if rect.width() < MIN_SELECTION_SIZE || rect.height() < MIN_SELECTION_SIZE {
            log::debug!(
                "selection {}x{} below minimum size, treated as a click",
                rect.width(),
                rect.height()
            );
            self.state = SelectorState::Cancelled;
            return;
        }

        match rect.to_capture_rect() {
            Ok(capture) => {
                log::debug!("selection resolved to {}", capture);
                self.state = SelectorState::Resolved(capture);
            }
            Err(err) => self.abort(err),
        }
    }

    /// End the session on an error. Either way nothing is selected; only
    /// session-fatal errors mean the overlay itself is unusable.
    fn abort(&mut self, err: CaptureError) {
        if err.is_session_fatal() {
            log::warn!("region selection aborted: {}", err);
        } else {
            log::warn!("selection could not be resolved: {}", err);
        }
        self.cancel();
    }

    fn cancel(&mut self) {
        self.pointer_captured = false;
        self.state = SelectorState::Cancelled;
    }
}
