//! Page-flip navigation engine for paginated magazines.
//!
//! Host independent: input arrives as [`ViewerKey`]s and [`GestureEvent`]s,
//! time as explicit [`std::time::Instant`]s, and everything environmental
//! (fullscreen, durable flags, listener registration) goes through
//! [`ViewerHost`].

mod export;
mod gesture;
mod host;
mod navigator;
mod reading_mode;
mod shell;
mod state;
mod timer;
mod zoom;

pub use export::{DocumentExporter, ExportButton, ExportError};
pub use gesture::{
    GestureEvent, GestureOutcome, Point, PointerSource, SwipeIntent, pinch_scale, swipe_intent,
};
pub use host::{HostError, ListenerId, ListenerKind, ListenerSet, SWIPE_HINT_KEY, ViewerHost};
pub use reading_mode::{
    ContinuousScroll, ContinuousTransport, Navigation, PageTransport, PagedTransport, ReadingMode,
};
pub use shell::{InputResponse, Panel, Panels, Viewer, ViewerAction, ViewerKey};
pub use state::{
    DEFAULT_HINT_DURATION, DEFAULT_MIN_SWIPE_DISTANCE, DEFAULT_SETTLE_DELAY, Direction,
    Interaction, PageTurn, ViewerConfig, ViewerError, ViewerState,
};
pub use timer::{TimerId, TimerKind, TimerQueue};
pub use zoom::{
    DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP, ZoomController, ZoomPolicy, ZoomPolicyError,
};
