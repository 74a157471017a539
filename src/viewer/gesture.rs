//! Turns raw pointer and touch input into swipes, pinches and pans.
//!
//! Swipe distance is measured as `start.x - end.x`: dragging content to the
//! left (a positive distance) moves forward. Touch and mouse drags share the
//! threshold and are both ignored for navigation while the page is zoomed.

use std::time::Instant;

use log::debug;

use super::reading_mode::Navigation;
use super::state::{Interaction, ViewerState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Touch,
    Mouse,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    TouchStart(Vec<Point>),
    TouchMove(Vec<Point>),
    /// A finger lifted at `point`; `remaining` fingers are still down.
    TouchEnd {
        point: Point,
        remaining: usize,
    },
    MouseDown(Point),
    MouseMove(Point),
    MouseUp(Point),
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeIntent {
    Next,
    Prev,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    None,
    /// Released under the threshold.
    Tap,
    Navigated(Navigation),
    /// A qualifying swipe that did not navigate (zoomed, in flight, or at an edge).
    Suppressed(SwipeIntent),
    Zoomed(u16),
    Panned,
}

pub fn swipe_intent(start_x: f32, end_x: f32, threshold: f32) -> Option<SwipeIntent> {
    let distance = start_x - end_x;
    if !distance.is_finite() {
        return None;
    }
    if distance > threshold {
        Some(SwipeIntent::Next)
    } else if distance < -threshold {
        Some(SwipeIntent::Prev)
    } else {
        None
    }
}

/// Ratio between the current and initial finger spread. A degenerate initial
/// spread gives no scale at all rather than an infinite one.
pub fn pinch_scale(initial_distance: f32, current_distance: f32) -> Option<f32> {
    if !initial_distance.is_finite() || initial_distance <= f32::EPSILON {
        return None;
    }
    let scale = current_distance / initial_distance;
    if scale.is_finite() && scale > 0.0 {
        Some(scale)
    } else {
        None
    }
}

fn two_finger_distance(points: &[Point]) -> Option<f32> {
    match points {
        [a, b, ..] => Some(a.distance_to(*b)),
        _ => None,
    }
}

impl ViewerState {
    pub fn handle_gesture(&mut self, event: GestureEvent, now: Instant) -> GestureOutcome {
        match event {
            GestureEvent::TouchStart(points) => self.touch_start(&points),
            GestureEvent::TouchMove(points) => self.touch_move(&points),
            GestureEvent::TouchEnd { point, remaining } => self.touch_end(point, remaining, now),
            GestureEvent::MouseDown(point) => self.begin_drag(point, PointerSource::Mouse),
            GestureEvent::MouseMove(point) => self.drag_to(point),
            GestureEvent::MouseUp(point) => self.release(point, PointerSource::Mouse, now),
            GestureEvent::Cancel => {
                if matches!(
                    self.interaction,
                    Interaction::Dragging { .. } | Interaction::Pinching { .. }
                ) {
                    self.interaction = Interaction::Idle;
                }
                GestureOutcome::None
            }
        }
    }

    fn touch_start(&mut self, points: &[Point]) -> GestureOutcome {
        if self.is_transitioning() {
            return GestureOutcome::None;
        }

        if let Some(initial_distance) = two_finger_distance(points) {
            // Pinch wins over any single-finger drag already being tracked.
            self.interaction = Interaction::Pinching {
                initial_distance,
                base_zoom: self.zoom.level(),
            };
            debug!("Pinch started at spread {initial_distance:.1}");
            return GestureOutcome::None;
        }

        match points.first() {
            Some(point) => self.begin_drag(*point, PointerSource::Touch),
            None => GestureOutcome::None,
        }
    }

    fn touch_move(&mut self, points: &[Point]) -> GestureOutcome {
        match self.interaction {
            Interaction::Pinching {
                initial_distance,
                base_zoom,
            } => {
                let Some(current) = two_finger_distance(points) else {
                    return GestureOutcome::None;
                };
                let Some(scale) = pinch_scale(initial_distance, current) else {
                    return GestureOutcome::None;
                };
                if self.zoom.set_from_pinch(scale, base_zoom) {
                    GestureOutcome::Zoomed(self.zoom.level())
                } else {
                    GestureOutcome::None
                }
            }
            Interaction::Dragging {
                source: PointerSource::Touch,
                ..
            } => match points.first() {
                Some(point) => self.drag_to(*point),
                None => GestureOutcome::None,
            },
            _ => GestureOutcome::None,
        }
    }

    fn touch_end(&mut self, point: Point, remaining: usize, now: Instant) -> GestureOutcome {
        match self.interaction {
            Interaction::Pinching { .. } => {
                // The finger left behind must not turn into a swipe.
                if remaining < 2 {
                    self.interaction = Interaction::Idle;
                }
                GestureOutcome::None
            }
            _ => self.release(point, PointerSource::Touch, now),
        }
    }

    fn begin_drag(&mut self, point: Point, source: PointerSource) -> GestureOutcome {
        if self.is_transitioning() || matches!(self.interaction, Interaction::Pinching { .. }) {
            return GestureOutcome::None;
        }
        self.interaction = Interaction::Dragging {
            anchor: point,
            last: point,
            source,
        };
        GestureOutcome::None
    }

    fn drag_to(&mut self, point: Point) -> GestureOutcome {
        let Interaction::Dragging {
            anchor,
            last,
            source,
        } = self.interaction
        else {
            return GestureOutcome::None;
        };

        self.interaction = Interaction::Dragging {
            anchor,
            last: point,
            source,
        };

        if self.zoom.is_default() {
            return GestureOutcome::None;
        }

        let viewport = self.viewport;
        if self
            .zoom
            .pan_by(point.x - last.x, point.y - last.y, viewport)
        {
            GestureOutcome::Panned
        } else {
            GestureOutcome::None
        }
    }

    fn release(&mut self, point: Point, source: PointerSource, now: Instant) -> GestureOutcome {
        let Interaction::Dragging {
            anchor,
            source: drag_source,
            ..
        } = self.interaction
        else {
            return GestureOutcome::None;
        };
        if drag_source != source {
            return GestureOutcome::None;
        }
        self.interaction = Interaction::Idle;

        let Some(intent) = swipe_intent(anchor.x, point.x, self.config.min_swipe_distance) else {
            return GestureOutcome::Tap;
        };

        if !self.zoom.is_default() {
            debug!(
                "Swipe {intent:?} swallowed at zoom {}%",
                self.zoom.level()
            );
            return GestureOutcome::Suppressed(intent);
        }

        match self.step(intent, now) {
            Some(navigation) => GestureOutcome::Navigated(navigation),
            None => GestureOutcome::Suppressed(intent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::state::ViewerConfig;
    use crate::viewer::timer::TimerKind;
    use std::time::Duration;

    fn state(pages: usize) -> ViewerState {
        ViewerState::new(pages, ViewerConfig::default()).unwrap()
    }

    fn swipe(state: &mut ViewerState, from_x: f32, to_x: f32, now: Instant) -> GestureOutcome {
        state.handle_gesture(GestureEvent::TouchStart(vec![Point::new(from_x, 100.0)]), now);
        state.handle_gesture(GestureEvent::TouchMove(vec![Point::new(to_x, 100.0)]), now);
        state.handle_gesture(
            GestureEvent::TouchEnd {
                point: Point::new(to_x, 100.0),
                remaining: 0,
            },
            now,
        )
    }

    #[test]
    fn threshold_is_strict() {
        assert_eq!(swipe_intent(100.0, 51.0, 50.0), None);
        assert_eq!(swipe_intent(100.0, 50.0, 50.0), None);
        assert_eq!(swipe_intent(100.0, 49.0, 50.0), Some(SwipeIntent::Next));
        assert_eq!(swipe_intent(0.0, 51.0, 50.0), Some(SwipeIntent::Prev));
    }

    #[test]
    fn short_drag_is_a_tap() {
        let now = Instant::now();
        let mut state = state(3);
        assert_eq!(swipe(&mut state, 200.0, 151.0, now), GestureOutcome::Tap);
        assert!(!state.is_transitioning());
    }

    #[test]
    fn long_drag_left_turns_forward() {
        let now = Instant::now();
        let mut state = state(3);
        let outcome = swipe(&mut state, 200.0, 149.0, now);
        assert!(matches!(outcome, GestureOutcome::Navigated(Navigation::Animated(t)) if t.to == 1));
    }

    #[test]
    fn swipe_is_swallowed_while_zoomed() {
        let now = Instant::now();
        let mut state = state(3);
        state.zoom_mut().zoom_in();
        assert_eq!(state.zoom_level(), 125);

        let outcome = swipe(&mut state, 300.0, 100.0, now);
        assert_eq!(outcome, GestureOutcome::Suppressed(SwipeIntent::Next));
        assert!(!state.is_transitioning());
    }

    #[test]
    fn mouse_drag_is_gated_by_zoom_too() {
        let now = Instant::now();
        let mut state = state(3);
        state.zoom_mut().zoom_out();

        state.handle_gesture(GestureEvent::MouseDown(Point::new(300.0, 0.0)), now);
        let outcome = state.handle_gesture(GestureEvent::MouseUp(Point::new(100.0, 0.0)), now);
        assert_eq!(outcome, GestureOutcome::Suppressed(SwipeIntent::Next));

        state.zoom_mut().reset();
        state.handle_gesture(GestureEvent::MouseDown(Point::new(100.0, 0.0)), now);
        let outcome = state.handle_gesture(GestureEvent::MouseUp(Point::new(300.0, 0.0)), now);
        // Already on the first page.
        assert_eq!(outcome, GestureOutcome::Suppressed(SwipeIntent::Prev));
    }

    #[test]
    fn pinch_scales_from_base_zoom() {
        let now = Instant::now();
        let mut state = state(3);
        state.handle_gesture(
            GestureEvent::TouchStart(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]),
            now,
        );
        let outcome = state.handle_gesture(
            GestureEvent::TouchMove(vec![Point::new(0.0, 0.0), Point::new(150.0, 0.0)]),
            now,
        );
        assert_eq!(outcome, GestureOutcome::Zoomed(150));

        // Lifting both fingers never produces a swipe.
        state.handle_gesture(
            GestureEvent::TouchEnd {
                point: Point::new(150.0, 0.0),
                remaining: 1,
            },
            now,
        );
        let outcome = state.handle_gesture(
            GestureEvent::TouchEnd {
                point: Point::new(0.0, 0.0),
                remaining: 0,
            },
            now,
        );
        assert_eq!(outcome, GestureOutcome::None);
        assert_eq!(state.interaction(), Interaction::Idle);
        assert_eq!(state.zoom_level(), 150);
    }

    #[test]
    fn zero_spread_pinch_keeps_zoom() {
        let now = Instant::now();
        let mut state = state(3);
        let p = Point::new(10.0, 10.0);
        state.handle_gesture(GestureEvent::TouchStart(vec![p, p]), now);
        let outcome = state.handle_gesture(
            GestureEvent::TouchMove(vec![p, Point::new(80.0, 10.0)]),
            now,
        );
        assert_eq!(outcome, GestureOutcome::None);
        assert_eq!(state.zoom_level(), 100);
        assert_eq!(pinch_scale(0.0, 10.0), None);
    }

    #[test]
    fn second_finger_turns_drag_into_pinch() {
        let now = Instant::now();
        let mut state = state(3);
        state.handle_gesture(GestureEvent::TouchStart(vec![Point::new(300.0, 0.0)]), now);
        state.handle_gesture(
            GestureEvent::TouchStart(vec![Point::new(300.0, 0.0), Point::new(200.0, 0.0)]),
            now,
        );
        assert!(matches!(state.interaction(), Interaction::Pinching { .. }));
    }

    #[test]
    fn drag_pans_when_zoomed() {
        let now = Instant::now();
        let mut state = state(3);
        state.set_viewport(800.0, 600.0);
        state.zoom_mut().set_from_pinch(2.0, 100);

        state.handle_gesture(GestureEvent::MouseDown(Point::new(400.0, 300.0)), now);
        let outcome = state.handle_gesture(GestureEvent::MouseMove(Point::new(380.0, 290.0)), now);
        assert_eq!(outcome, GestureOutcome::Panned);
        assert_eq!(state.zoom().pan(), (-20.0, -10.0));
    }

    #[test]
    fn touches_during_turn_are_dropped() {
        let start = Instant::now();
        let mut state = state(3);
        swipe(&mut state, 300.0, 220.0, start);
        assert!(state.is_transitioning());

        let outcome = swipe(&mut state, 300.0, 220.0, start + Duration::from_millis(50));
        assert_eq!(outcome, GestureOutcome::None);

        for (id, kind) in state.pop_due_timers(start + Duration::from_secs(1)) {
            if kind == TimerKind::Settle {
                state.settle(id);
            }
        }
        assert_eq!(state.current_page(), 1);
    }
}
