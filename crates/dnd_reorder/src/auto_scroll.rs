use std::time::{Duration, Instant};

pub const ACCELERATION_LIMIT: Duration = Duration::from_millis(1500);

/// Smallest auto-scroll step while the dragged item is out of bounds.
pub const MIN_SCROLL: f32 = 1.;

pub fn ease_out_quart(t: f32) -> f32 {
    let t = 1. - t;
    1. - t * t * t * t
}

pub fn ease_in_quint(t: f32) -> f32 {
    t * t * t * t * t
}

/// Scroll speed for an item that sticks `out_of_bounds` pixels past a viewport edge.
///
/// The speed grows with how much of the item is outside (relative to `view_size`) and
/// ramps up over `acceleration_limit`. A non-zero overshoot always yields at least one
/// pixel per frame, so the list keeps creeping instead of stalling.
pub fn interpolate_out_of_bounds_scroll(
    view_size: f32,
    out_of_bounds: f32,
    elapsed: Duration,
    max_scroll: f32,
    acceleration_limit: Duration,
) -> f32 {
    if out_of_bounds == 0. {
        return 0.;
    }

    let out_of_bounds_ratio = (out_of_bounds.abs() / view_size).min(1.);
    let capped = out_of_bounds.signum() * max_scroll * ease_out_quart(out_of_bounds_ratio);
    let time_ratio = if elapsed >= acceleration_limit {
        1.
    } else {
        elapsed.as_secs_f32() / acceleration_limit.as_secs_f32()
    };

    let scroll = capped * ease_in_quint(time_ratio);
    if scroll.abs() < MIN_SCROLL {
        out_of_bounds.signum() * MIN_SCROLL
    } else {
        scroll
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AutoScrollId(u64);

#[derive(Debug)]
struct AutoScrollJob {
    id: AutoScrollId,
    initial_velocity: f32,
    started_at: Option<Instant>,
}

/// The single auto-scroll loop of a drag session.
///
/// Starting while a job is active is a no-op; `cancel` drops the job and its token.
#[derive(Debug, Default)]
pub struct AutoScroller {
    next_id: u64,
    job: Option<AutoScrollJob>,
}

/// What the scroller wants for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AutoScrollFrame {
    /// First frame of the job, scroll by the velocity that started it.
    Start(f32),
    /// A later frame, recompute with this much time since the first frame.
    Continue(Duration),
}

impl AutoScroller {
    pub fn active_id(&self) -> Option<AutoScrollId> {
        self.job.as_ref().map(|job| job.id)
    }

    /// Returns the id of the newly started job, or `None` if one is already running or
    /// `velocity` is zero.
    pub fn start(&mut self, velocity: f32) -> Option<AutoScrollId> {
        if velocity == 0. || self.job.is_some() {
            return None;
        }
        let id = AutoScrollId(self.next_id);
        self.next_id += 1;
        self.job = Some(AutoScrollJob {
            id,
            initial_velocity: velocity,
            started_at: None,
        });
        Some(id)
    }

    pub fn cancel(&mut self) -> Option<AutoScrollId> {
        self.job.take().map(|job| job.id)
    }

    pub fn frame(&mut self, now: Instant) -> Option<AutoScrollFrame> {
        let job = self.job.as_mut()?;
        match job.started_at {
            None => {
                job.started_at = Some(now);
                Some(AutoScrollFrame::Start(job.initial_velocity))
            }
            Some(started_at) => Some(AutoScrollFrame::Continue(
                now.saturating_duration_since(started_at),
            )),
        }
    }
}
