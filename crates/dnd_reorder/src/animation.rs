use std::time::Instant;

use gpui::{Point, point};

use crate::config::SpringConfig;
use crate::item::ItemPosition;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationStatus {
    Running,
    Finished,
}

/// Animation played when a dragged item is released, bringing it back to its slot.
///
/// The animation is frame driven: `play` only records where to start from, and each
/// `tick` advances it to the given frame time. The first tick after `play` anchors the
/// start time.
pub trait DragCancelledAnimation {
    /// Starts animating `position` from `offset` towards zero, replacing any animation
    /// that is still running.
    fn play(&mut self, position: ItemPosition, offset: Point<f32>);

    fn tick(&mut self, now: Instant) -> AnimationStatus;

    /// The item being animated, `None` once the animation has settled.
    fn position(&self) -> Option<&ItemPosition>;

    fn offset(&self) -> Point<f32>;

    fn is_running(&self) -> bool {
        self.position().is_some()
    }
}

/// Critically damped spring with unit mass, one per axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CriticalSpring {
    omega: f32,
}

impl CriticalSpring {
    pub fn new(stiffness: f32) -> Self {
        Self {
            omega: stiffness.max(f32::EPSILON).sqrt(),
        }
    }

    /// Displacement and velocity after `t` seconds, released from rest at `x0`.
    pub fn sample(&self, x0: f32, t: f32) -> (f32, f32) {
        let decay = (-self.omega * t).exp();
        let displacement = x0 * (1. + self.omega * t) * decay;
        let velocity = -x0 * self.omega * self.omega * t * decay;
        (displacement, velocity)
    }
}

struct Cancellation {
    position: ItemPosition,
    from: Point<f32>,
    started_at: Option<Instant>,
}

/// Springs the released item back to offset zero.
pub struct SpringDragCancelledAnimation {
    spring: CriticalSpring,
    threshold: f32,
    current: Option<Cancellation>,
    offset: Point<f32>,
}

impl Default for SpringDragCancelledAnimation {
    fn default() -> Self {
        Self::new(SpringConfig::default())
    }
}

impl SpringDragCancelledAnimation {
    pub fn new(config: SpringConfig) -> Self {
        Self {
            spring: CriticalSpring::new(config.stiffness),
            threshold: config.visibility_threshold,
            current: None,
            offset: Point::default(),
        }
    }

    fn settled(&self, displacement: f32, velocity: f32) -> bool {
        displacement.abs() < self.threshold && velocity.abs() < self.threshold
    }
}

impl DragCancelledAnimation for SpringDragCancelledAnimation {
    fn play(&mut self, position: ItemPosition, offset: Point<f32>) {
        if let Some(previous) = self.current.as_ref() {
            log::debug!(
                "cancel animation for index {} superseded by index {}",
                previous.position.index,
                position.index
            );
        }
        self.offset = offset;
        self.current = Some(Cancellation {
            position,
            from: offset,
            started_at: None,
        });
    }

    fn tick(&mut self, now: Instant) -> AnimationStatus {
        let Some(current) = self.current.as_mut() else {
            return AnimationStatus::Finished;
        };

        let started_at = *current.started_at.get_or_insert(now);
        let from = current.from;
        let t = now.saturating_duration_since(started_at).as_secs_f32();

        let (x, vx) = self.spring.sample(from.x, t);
        let (y, vy) = self.spring.sample(from.y, t);

        if self.settled(x, vx) && self.settled(y, vy) {
            self.current = None;
            self.offset = Point::default();
            return AnimationStatus::Finished;
        }

        self.offset = point(x, y);
        AnimationStatus::Running
    }

    fn position(&self) -> Option<&ItemPosition> {
        self.current.as_ref().map(|current| &current.position)
    }

    fn offset(&self) -> Point<f32> {
        self.offset
    }
}
