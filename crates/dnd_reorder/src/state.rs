use std::rc::Rc;
use std::time::{Duration, Instant};

use gpui::{Axis, ElementId, Point, point};

use crate::animation::{AnimationStatus, DragCancelledAnimation, SpringDragCancelledAnimation};
use crate::auto_scroll::{AutoScrollFrame, AutoScroller, interpolate_out_of_bounds_scroll};
use crate::config::DraggableConfig;
use crate::error::{Error, Result};
use crate::item::{DragLayout, ItemBounds, ItemInfo, ItemPosition};

/// Changes of a [`DraggableState`], delivered to subscribers in the order they happen.
#[derive(Clone, Debug, PartialEq)]
pub enum DragEvent {
    Started {
        index: usize,
        key: Option<ElementId>,
    },
    /// The reorder callback accepted a move and the dragged item now sits at `to`.
    Moved {
        from: ItemPosition,
        to: ItemPosition,
    },
    Ended {
        start_index: usize,
        end_index: usize,
    },
    CancelAnimationStarted(ItemPosition),
    CancelAnimationFinished,
}

/// Outcome of [`DraggableState::on_drag_canceled`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragEnd {
    pub start_index: usize,
    pub end_index: usize,
    pub animated: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A visible item that the dragged item currently overlaps.
#[derive(Clone, Copy, Debug)]
pub struct DropCandidate<'a, I> {
    pub item: &'a I,
    /// Squared distance between the centers of the item and the dragged item.
    pub distance: f32,
}

struct DraggableCallbacks {
    on_move: Rc<dyn Fn(&ItemPosition, &ItemPosition) -> bool>,
    can_drag_over: Option<Rc<dyn Fn(&ItemPosition) -> bool>>,
    on_drag_end: Option<Rc<dyn Fn(usize, usize)>>,
}

/// Drag state of one reorderable list.
///
/// Layout is passed into every call instead of being stored: the caller queries its
/// rendering layer and hands over a fresh [`DragLayout`] each time.
pub struct DraggableState<I> {
    config: DraggableConfig,
    callbacks: DraggableCallbacks,
    ignore_animation_indices: Vec<usize>,
    cancel_animation: Box<dyn DragCancelledAnimation>,
    selected: Option<I>,
    dragging_index: Option<usize>,
    delta: Point<f32>,
    auto_scroller: AutoScroller,
    listeners: Vec<(ListenerId, Box<dyn FnMut(&DragEvent)>)>,
    next_listener_id: u64,
}

impl<I: ItemInfo + Clone> DraggableState<I> {
    /// `on_move` receives the dragged slot and the proposed target slot and returns
    /// `true` when the move turned out to be a no-op.
    pub fn new(on_move: impl Fn(&ItemPosition, &ItemPosition) -> bool + 'static) -> Self {
        let config = DraggableConfig::default();
        Self {
            cancel_animation: Box::new(SpringDragCancelledAnimation::new(config.spring)),
            config,
            callbacks: DraggableCallbacks {
                on_move: Rc::new(on_move),
                can_drag_over: None,
                on_drag_end: None,
            },
            ignore_animation_indices: Vec::new(),
            selected: None,
            dragging_index: None,
            delta: Point::default(),
            auto_scroller: AutoScroller::default(),
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Also rebuilds the default spring animation from `config.spring`.
    pub fn config(mut self, config: DraggableConfig) -> Self {
        self.cancel_animation = Box::new(SpringDragCancelledAnimation::new(config.spring));
        self.config = config;
        self
    }

    /// Restrict which slots the dragged item may be moved onto.
    pub fn can_drag_over(
        mut self,
        can_drag_over: impl Fn(&ItemPosition) -> bool + 'static,
    ) -> Self {
        self.callbacks.can_drag_over = Some(Rc::new(can_drag_over));
        self
    }

    /// Called with the start and end index once per finished drag.
    pub fn on_drag_end(mut self, on_drag_end: impl Fn(usize, usize) + 'static) -> Self {
        self.callbacks.on_drag_end = Some(Rc::new(on_drag_end));
        self
    }

    /// Items released at one of these indices snap back without animating.
    pub fn ignore_animation_indices(mut self, indices: impl Into<Vec<usize>>) -> Self {
        self.ignore_animation_indices = indices.into();
        self
    }

    pub fn cancel_animation(mut self, animation: impl DragCancelledAnimation + 'static) -> Self {
        self.cancel_animation = Box::new(animation);
        self
    }

    pub fn set_ignore_animation_indices(&mut self, indices: impl Into<Vec<usize>>) {
        self.ignore_animation_indices = indices.into();
    }

    pub fn settings(&self) -> &DraggableConfig {
        &self.config
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&DragEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: DragEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging_index.is_some()
    }

    pub fn dragging_item_index(&self) -> Option<usize> {
        self.dragging_index
    }

    pub fn dragging_item_key(&self) -> Option<&ElementId> {
        self.selected.as_ref().and_then(|item| item.key())
    }

    /// The item captured when the drag started, with its geometry at that time.
    pub fn selected(&self) -> Option<&I> {
        self.selected.as_ref()
    }

    /// Total pointer travel since the drag started.
    pub fn delta(&self) -> Point<f32> {
        self.delta
    }

    pub fn is_auto_scrolling(&self) -> bool {
        self.auto_scroller.active_id().is_some()
    }

    pub fn cancel_animation_state(&self) -> &dyn DragCancelledAnimation {
        self.cancel_animation.as_ref()
    }

    fn dragging_layout_item<'a, L>(&self, layout: &'a L) -> Option<&'a I>
    where
        L: DragLayout<Item = I>,
    {
        self.dragging_index.and_then(|ix| layout.item_at_index(ix))
    }

    /// Horizontal translation that keeps the dragged item under the pointer, relative
    /// to the slot it is currently laid out in.
    pub fn dragging_item_left<L: DragLayout<Item = I>>(&self, layout: &L) -> f32 {
        match (self.dragging_layout_item(layout), self.selected.as_ref()) {
            (Some(item), Some(selected)) => selected.left() + self.delta.x - item.left(),
            _ => 0.,
        }
    }

    pub fn dragging_item_top<L: DragLayout<Item = I>>(&self, layout: &L) -> f32 {
        match (self.dragging_layout_item(layout), self.selected.as_ref()) {
            (Some(item), Some(selected)) => selected.top() + self.delta.y - item.top(),
            _ => 0.,
        }
    }

    pub fn dragging_item_bottom<L: DragLayout<Item = I>>(&self, layout: &L) -> f32 {
        match (self.dragging_layout_item(layout), self.selected.as_ref()) {
            (Some(item), Some(selected)) => selected.bottom() + self.delta.y - item.bottom(),
            _ => 0.,
        }
    }

    /// Captures the first visible item containing `(x, y)`.
    ///
    /// Returns `false` when nothing was captured, in which case the caller must not
    /// report movement for this gesture.
    pub fn on_drag_start<L: DragLayout<Item = I>>(&mut self, layout: &L, x: f32, y: f32) -> bool {
        if self.is_dragging() {
            log::warn!("drag start ignored, a drag is already in progress");
            return false;
        }

        let at = layout.constrain(point(x, y));
        let Some(item) = layout
            .visible_items()
            .iter()
            .find(|item| item.contains(at))
        else {
            return false;
        };

        let index = item.index();
        let key = item.key().cloned();
        self.selected = Some(item.clone());
        self.dragging_index = Some(index);
        self.delta = Point::default();

        log::debug!("drag started at index {index}");
        self.emit(DragEvent::Started { index, key });
        true
    }

    pub fn on_drag<L: DragLayout<Item = I>>(&mut self, layout: &L, dx: f32, dy: f32) -> Result<()> {
        let Some(selected) = self.selected.clone() else {
            return Err(Error::NoActiveDrag);
        };
        self.delta = point(self.delta.x + dx, self.delta.y + dy);

        let Some(dragging) = self.dragging_layout_item(layout) else {
            return Ok(());
        };
        let from = dragging.position();
        let current = layout.constrain(point(
            selected.left() + self.delta.x,
            selected.top() + self.delta.y,
        ));

        let target = {
            let candidates = self.find_targets(layout, layout.constrain(self.delta), &selected);
            self.choose_drop_item(Some(dragging), &candidates, current)
                .map(|item| item.position())
        };

        if let Some(to) = target {
            let no_op = (self.callbacks.on_move)(&from, &to);
            if !no_op {
                log::debug!("dragged item moved from {} to {}", from.index, to.index);
                self.dragging_index = Some(to.index);
                self.emit(DragEvent::Moved { from, to });
            }
        }

        let velocity = self.calc_auto_scroll_offset(layout, Duration::ZERO);
        if velocity != 0. {
            if let Some(id) = self.auto_scroller.start(velocity) {
                log::debug!("auto-scroll {id:?} started at {velocity}");
            }
        }

        Ok(())
    }

    /// Ends the drag, whether it was released or interrupted.
    pub fn on_drag_canceled<L: DragLayout<Item = I>>(&mut self, layout: &L) -> Result<DragEnd> {
        let (Some(end_index), Some(selected)) = (self.dragging_index, self.selected.as_ref())
        else {
            return Err(Error::NoActiveDrag);
        };
        let start_index = selected.index();
        let position = ItemPosition::new(end_index, selected.key().cloned());
        let offset = point(
            self.dragging_item_left(layout),
            self.dragging_item_top(layout),
        );

        let animated = !self.ignore_animation_indices.contains(&position.index);
        if animated {
            self.cancel_animation.play(position.clone(), offset);
        }

        self.selected = None;
        self.delta = Point::default();
        self.dragging_index = None;
        if let Some(id) = self.auto_scroller.cancel() {
            log::debug!("auto-scroll {id:?} stopped");
        }

        if let Some(on_drag_end) = self.callbacks.on_drag_end.as_ref() {
            on_drag_end(start_index, end_index);
        }

        log::debug!("drag ended, {start_index} -> {end_index}");
        if animated {
            self.emit(DragEvent::CancelAnimationStarted(position));
        }
        self.emit(DragEvent::Ended {
            start_index,
            end_index,
        });

        Ok(DragEnd {
            start_index,
            end_index,
            animated,
        })
    }

    /// Visible items overlapping the dragged item moved by `delta`, nearest first.
    ///
    /// The dragged slot itself and slots rejected by `can_drag_over` are skipped.
    /// Equally distant items keep their layout order.
    pub fn find_targets<'a, L>(
        &self,
        layout: &'a L,
        delta: Point<f32>,
        selected: &I,
    ) -> Vec<DropCandidate<'a, I>>
    where
        L: DragLayout<Item = I>,
    {
        let projected = ItemBounds::of(selected).translated(delta);
        let center = projected.center();

        let mut targets: Vec<DropCandidate<'a, I>> = Vec::new();
        for item in layout.visible_items() {
            if Some(item.index()) == self.dragging_index || !projected.overlaps(item) {
                continue;
            }

            let allowed = self
                .callbacks
                .can_drag_over
                .as_ref()
                .map(|f| f(&item.position()))
                .unwrap_or(true);
            if !allowed {
                continue;
            }

            let other = item.center();
            let dx = center.x - other.x;
            let dy = center.y - other.y;
            let distance = dx * dx + dy * dy;

            let at = targets.partition_point(|target| target.distance <= distance);
            targets.insert(at, DropCandidate { item, distance });
        }
        targets
    }

    /// Picks the candidate the dragged item has pushed furthest past.
    ///
    /// `current` is the dragged item's leading corner, `dragged` the slot it is laid out
    /// in. Only the directions the item moved in are considered.
    pub fn choose_drop_item<'a>(
        &self,
        dragged: Option<&I>,
        candidates: &[DropCandidate<'a, I>],
        current: Point<f32>,
    ) -> Option<&'a I> {
        let Some(dragged) = dragged else {
            return if self.is_dragging() {
                candidates.last().map(|candidate| candidate.item)
            } else {
                None
            };
        };

        let right = current.x + dragged.width();
        let bottom = current.y + dragged.height();
        let dx = current.x - dragged.left();
        let dy = current.y - dragged.top();

        let mut best: Option<(f32, &'a I)> = None;
        let mut consider = |score: f32, item: &'a I| {
            if best.is_none_or(|(high, _)| score > high) {
                best = Some((score, item));
            }
        };

        for candidate in candidates {
            let item = candidate.item;
            if dx > 0. {
                let diff = item.right() - right;
                if diff < 0. && item.right() > dragged.right() {
                    consider(diff.abs(), item);
                }
            }
            if dx < 0. {
                let diff = item.left() - current.x;
                if diff > 0. && item.left() < dragged.left() {
                    consider(diff.abs(), item);
                }
            }
            if dy < 0. {
                let diff = item.top() - current.y;
                if diff > 0. && item.top() < dragged.top() {
                    consider(diff.abs(), item);
                }
            }
            if dy > 0. {
                let diff = item.bottom() - bottom;
                if diff < 0. && item.bottom() > dragged.bottom() {
                    consider(diff.abs(), item);
                }
            }
        }

        best.map(|(_, item)| item)
    }

    /// Auto-scroll velocity for the current drag, `elapsed` after auto-scroll began.
    ///
    /// Zero unless the dragged item sticks out of the viewport on the side it is being
    /// dragged towards.
    pub fn calc_auto_scroll_offset<L: DragLayout<Item = I>>(
        &self,
        layout: &L,
        elapsed: Duration,
    ) -> f32 {
        let (Some(item), Some(selected)) =
            (self.dragging_layout_item(layout), self.selected.as_ref())
        else {
            return 0.;
        };

        let (start, size, delta) = match layout.orientation() {
            Axis::Vertical => (selected.top() + self.delta.y, item.height(), self.delta.y),
            Axis::Horizontal => (selected.left() + self.delta.x, item.width(), self.delta.x),
        };
        let end = start + size;

        let out_of_bounds = if delta > 0. {
            (end - layout.viewport_end()).max(0.)
        } else if delta < 0. {
            (start - layout.viewport_start()).min(0.)
        } else {
            0.
        };

        interpolate_out_of_bounds_scroll(
            size,
            out_of_bounds,
            elapsed,
            self.config.max_scroll_per_frame,
            self.config.acceleration_limit(),
        )
    }

    /// Advances the auto-scroll loop by one frame and returns how far to scroll.
    ///
    /// `None` means no loop is running. A frame that computes zero velocity ends the
    /// loop.
    pub fn auto_scroll_frame<L: DragLayout<Item = I>>(
        &mut self,
        layout: &L,
        now: Instant,
    ) -> Option<f32> {
        let velocity = match self.auto_scroller.frame(now)? {
            AutoScrollFrame::Start(velocity) => velocity,
            AutoScrollFrame::Continue(elapsed) => self.calc_auto_scroll_offset(layout, elapsed),
        };

        if velocity == 0. {
            if let Some(id) = self.auto_scroller.cancel() {
                log::debug!("auto-scroll {id:?} settled");
            }
            return None;
        }

        log::trace!("auto-scroll by {velocity}");
        Some(velocity)
    }

    pub fn tick_animation(&mut self, now: Instant) -> AnimationStatus {
        if !self.cancel_animation.is_running() {
            return AnimationStatus::Finished;
        }

        let status = self.cancel_animation.tick(now);
        if status == AnimationStatus::Finished {
            self.emit(DragEvent::CancelAnimationFinished);
        }
        status
    }
}
