// Gesture - Tap vs. vertical drag classification on the time display
// A press either toggles the run state (tap) or dials the duration (drag)

use super::countdown::CountdownTimer;

/// Vertical travel in pixels before a press is reclassified as a drag
pub const DRAG_THRESHOLD_PX: f32 = 5.0;

/// Vertical travel in pixels per minute of duration change
pub const PX_PER_MINUTE: f32 = 5.0;

/// What a completed gesture meant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// No gesture was in progress
    None,
    /// Press and release without crossing the drag threshold: toggle the timer
    Tap,
    /// The drag threshold was crossed: the duration edit stands
    Drag,
}

/// Gesture state
/// The threshold is sticky: once `Dragging`, the gesture stays a drag for its
/// whole lifetime even if the pointer returns to the anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
enum GestureState {
    Idle,
    Armed {
        anchor_y: f32,
        anchor_minutes: u32,
    },
    Dragging {
        anchor_y: f32,
        anchor_minutes: u32,
        last_minutes: u32,
    },
}

/// Classifies pointer interactions on the time display
///
/// Fed from window-wide pointer state (only the press is hit-tested against
/// the display), so a fast drag that leaves the display is still resolved on
/// release. Every method is total: out-of-protocol events are no-ops.
#[derive(Debug, Clone, Copy)]
pub struct GestureInterpreter {
    state: GestureState,
}

impl GestureInterpreter {
    /// Create an interpreter with no gesture in progress
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
        }
    }

    /// Pointer pressed on the display at vertical position `y`
    /// While the timer runs the whole gesture is disabled, including the
    /// eventual release — editing is locked out, and the press must not
    /// read as a tap either.
    pub fn pointer_down(&mut self, y: f32, current_minutes: u32, running: bool) {
        if running {
            self.state = GestureState::Idle;
            return;
        }

        self.state = GestureState::Armed {
            anchor_y: y,
            anchor_minutes: current_minutes,
        };
    }

    /// Pointer moved to vertical position `y`
    /// Returns the new duration in minutes when the drag produced one; the
    /// caller applies it via [`CountdownTimer::set_duration`] and renders
    /// immediately. Below the threshold nothing is emitted, so pointer jitter
    /// during a tap never edits the duration.
    pub fn pointer_move(&mut self, y: f32) -> Option<u32> {
        match self.state {
            GestureState::Idle => None,
            GestureState::Armed {
                anchor_y,
                anchor_minutes,
            } => {
                let delta = anchor_y - y;
                if delta.abs() > DRAG_THRESHOLD_PX {
                    self.state = GestureState::Dragging {
                        anchor_y,
                        anchor_minutes,
                        last_minutes: anchor_minutes,
                    };
                    // The crossing event itself already carries an edit
                    self.apply_drag(y)
                } else {
                    None
                }
            }
            GestureState::Dragging { .. } => self.apply_drag(y),
        }
    }

    /// Pointer released; classifies the gesture and clears it
    pub fn pointer_up(&mut self) -> GestureOutcome {
        let outcome = match self.state {
            GestureState::Idle => GestureOutcome::None,
            GestureState::Armed { .. } => GestureOutcome::Tap,
            GestureState::Dragging { .. } => GestureOutcome::Drag,
        };
        self.state = GestureState::Idle;
        outcome
    }

    /// Check if a gesture is in progress (pressed, not yet released)
    pub fn is_active(&self) -> bool {
        !matches!(self.state, GestureState::Idle)
    }

    /// Check if the current gesture has committed to a drag
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. })
    }

    /// Compute and emit the dragged duration, deduplicating repeats
    fn apply_drag(&mut self, y: f32) -> Option<u32> {
        let GestureState::Dragging {
            anchor_y,
            anchor_minutes,
            ref mut last_minutes,
        } = self.state
        else {
            return None;
        };

        // Screen-up is positive: dragging up lengthens the session
        let delta = anchor_y - y;
        let delta_minutes = (delta / PX_PER_MINUTE).floor() as i64;
        let target = (anchor_minutes as i64 + delta_minutes).clamp(
            CountdownTimer::MIN_MINUTES as i64,
            CountdownTimer::MAX_MINUTES as i64,
        ) as u32;

        if target != *last_minutes {
            *last_minutes = target;
            Some(target)
        } else {
            None
        }
    }
}

impl Default for GestureInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tap_within_threshold() {
        let mut gesture = GestureInterpreter::new();
        gesture.pointer_down(100.0, 25, false);

        // Jitter up to exactly the threshold never edits (strict comparison)
        assert_eq!(gesture.pointer_move(103.0), None);
        assert_eq!(gesture.pointer_move(95.0), None);
        assert_eq!(gesture.pointer_move(105.0), None);

        assert_eq!(gesture.pointer_up(), GestureOutcome::Tap);
        assert!(!gesture.is_active());
    }

    #[test]
    fn test_drag_down_17px_from_25_minutes() {
        let mut gesture = GestureInterpreter::new();
        gesture.pointer_down(100.0, 25, false);

        // 17 px downward: delta = -17, floor(-17 / 5) = -4
        assert_eq!(gesture.pointer_move(117.0), Some(21));
        assert_eq!(gesture.pointer_up(), GestureOutcome::Drag);
    }

    #[test]
    fn test_drag_up_lengthens() {
        let mut gesture = GestureInterpreter::new();
        gesture.pointer_down(300.0, 25, false);

        // 50 px upward = +10 minutes
        assert_eq!(gesture.pointer_move(250.0), Some(35));
    }

    #[test]
    fn test_drag_clamps_to_floor() {
        let mut gesture = GestureInterpreter::new();
        gesture.pointer_down(0.0, 5, false);

        // 1000 px downward would be -200 minutes; clamps to 1, never below
        assert_eq!(gesture.pointer_move(1000.0), Some(1));
        assert_eq!(gesture.pointer_move(2000.0), None); // still 1, deduplicated
    }

    #[test]
    fn test_drag_clamps_to_ceiling() {
        let mut gesture = GestureInterpreter::new();
        gesture.pointer_down(1000.0, 100, false);

        assert_eq!(gesture.pointer_move(400.0), Some(120));
        assert_eq!(gesture.pointer_move(0.0), None);
    }

    #[test]
    fn test_threshold_is_sticky() {
        let mut gesture = GestureInterpreter::new();
        gesture.pointer_down(100.0, 25, false);

        // Cross the threshold, then return to the anchor
        assert_eq!(gesture.pointer_move(130.0), Some(19));
        assert_eq!(gesture.pointer_move(100.0), Some(25));

        // Net displacement is zero but the gesture stays a drag
        assert_eq!(gesture.pointer_up(), GestureOutcome::Drag);
    }

    #[test]
    fn test_repeated_position_not_reemitted() {
        let mut gesture = GestureInterpreter::new();
        gesture.pointer_down(100.0, 25, false);

        assert_eq!(gesture.pointer_move(120.0), Some(21));
        // Same 5 px bucket: no duplicate emission
        assert_eq!(gesture.pointer_move(121.0), None);
        assert_eq!(gesture.pointer_move(122.0), None);
        // Next bucket
        assert_eq!(gesture.pointer_move(125.0), Some(20));
    }

    #[test]
    fn test_move_without_press_is_noop() {
        let mut gesture = GestureInterpreter::new();
        assert_eq!(gesture.pointer_move(50.0), None);
        assert_eq!(gesture.pointer_up(), GestureOutcome::None);
    }

    #[test]
    fn test_press_while_running_consumes_gesture() {
        let mut gesture = GestureInterpreter::new();
        gesture.pointer_down(100.0, 25, true);

        assert!(!gesture.is_active());
        assert_eq!(gesture.pointer_move(200.0), None);
        // The release of a locked-out press must not toggle
        assert_eq!(gesture.pointer_up(), GestureOutcome::None);
    }

    #[test]
    fn test_gesture_rearms_after_release() {
        let mut gesture = GestureInterpreter::new();

        gesture.pointer_down(100.0, 25, false);
        assert_eq!(gesture.pointer_up(), GestureOutcome::Tap);

        gesture.pointer_down(200.0, 25, false);
        assert_eq!(gesture.pointer_move(230.0), Some(19));
        assert!(gesture.is_dragging());
        assert_eq!(gesture.pointer_up(), GestureOutcome::Drag);
    }

    #[test]
    fn test_threshold_crossing_applies_floor_rounding() {
        let mut gesture = GestureInterpreter::new();
        gesture.pointer_down(100.0, 25, false);

        // delta = -6: floor(-6 / 5) = -2 (floor, not truncation)
        assert_eq!(gesture.pointer_move(106.0), Some(23));

        let mut gesture_up = GestureInterpreter::new();
        gesture_up.pointer_down(100.0, 25, false);

        // delta = +6: floor(6 / 5) = +1
        assert_eq!(gesture_up.pointer_move(94.0), Some(26));
    }

    #[test]
    fn test_interleaved_timer_respects_lockout() {
        let mut timer = CountdownTimer::new();
        let mut gesture = GestureInterpreter::new();

        // Idle: a drag edits the timer
        gesture.pointer_down(100.0, timer.minutes(), timer.is_running());
        if let Some(minutes) = gesture.pointer_move(150.0) {
            timer.set_duration(minutes);
        }
        assert_eq!(gesture.pointer_up(), GestureOutcome::Drag);
        assert_eq!(timer.remaining(), (35, 0));

        // Running: the same motion leaves the timer untouched
        timer.start();
        gesture.pointer_down(100.0, timer.minutes(), timer.is_running());
        assert_eq!(gesture.pointer_move(150.0), None);
        assert_eq!(gesture.pointer_up(), GestureOutcome::None);
        assert_eq!(timer.remaining(), (35, 0));
    }
}
