use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Instant;

use gpui::{
    App, Axis, Context, ElementId, Entity, EventEmitter, FocusHandle, InteractiveElement as _,
    IntoElement, MouseButton, MouseDownEvent, MouseMoveEvent, MouseUpEvent, ParentElement as _,
    Pixels, Point, Render, RenderOnce, ScrollHandle, SharedString, Size,
    StatefulInteractiveElement as _, StyleRefinement, Styled, Task, Window, deferred, div, point,
    prelude::FluentBuilder as _, px, size,
};
use gpui_component::{ActiveTheme as _, StyledExt as _};
use gpui_component::list::ListItem;

use crate::config::DraggableConfig;
use crate::geometry::{LazyListItemInfo, LazyListLayout, LazyListLayoutInfo};
use crate::item::{DragLayout, ItemBounds, ItemInfo, ItemPosition};
use crate::presentation::item_presentation;
use crate::scroll::{ScrollDriver, native_to_position, position_to_native, scroll_direction};
use crate::state::{DragEvent, DraggableState};

const CONTEXT: &str = "DraggableList";
const DEFAULT_ITEM_SIZE: Pixels = px(48.);

type RenderItem<T> = Rc<
    dyn Fn(usize, &DraggableListItem<T>, DraggableListRowState, &mut Window, &mut App) -> ListItem,
>;

/// Create a [`DraggableList`].
pub fn draggable_list<T, R>(
    state: &Entity<DraggableListState<T>>,
    render_item: R,
) -> DraggableList<T>
where
    T: 'static,
    R: Fn(usize, &DraggableListItem<T>, DraggableListRowState, &mut Window, &mut App) -> ListItem
        + 'static,
{
    DraggableList::new(state, render_item)
}

/// A single item in a [`DraggableListState`].
#[derive(Clone)]
pub struct DraggableListItem<T> {
    pub id: SharedString,
    pub label: SharedString,
    pub data: T,
    size: Pixels,
    locked: bool,
}

impl<T> DraggableListItem<T> {
    pub fn new(id: impl Into<SharedString>, label: impl Into<SharedString>, data: T) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            data,
            size: DEFAULT_ITEM_SIZE,
            locked: false,
        }
    }

    /// Size along the list's main axis.
    pub fn size(mut self, size: Pixels) -> Self {
        self.size = size;
        self
    }

    pub fn item_size(&self) -> Pixels {
        self.size
    }

    /// Locked items cannot be picked up, and nothing can be dropped onto their slot.
    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    fn key(&self) -> ElementId {
        ElementId::Name(self.id.clone())
    }

    fn main_axis_size(&self) -> f32 {
        let size: f32 = self.size.into();
        if !size.is_finite() || size <= 0.0 {
            1.
        } else {
            size
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DraggableListRowState {
    pub dragging: bool,
    /// Springing back into its slot after a release.
    pub settling: bool,
    pub locked: bool,
}

#[derive(Clone, Debug)]
pub struct DraggableListReorder {
    pub item_id: SharedString,
    pub from: usize,
    pub to: usize,
}

/// Moves `from` to `to` (both clamped to the list) and returns `true` when that was a
/// no-op.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    let Some(last) = items.len().checked_sub(1) else {
        return true;
    };
    let (from, to) = (from.min(last), to.min(last));
    if from == to {
        return true;
    }
    let item = items.remove(from);
    items.insert(to, item);
    false
}

/// Visible items of a list scrolled to `scroll`, with offsets relative to the viewport
/// start.
pub(crate) fn lay_out_visible(
    sizes: impl IntoIterator<Item = (ElementId, f32)>,
    scroll: f32,
    viewport: f32,
) -> Vec<LazyListItemInfo> {
    let mut offset = -scroll;
    let mut visible = Vec::new();
    for (index, (key, size)) in sizes.into_iter().enumerate() {
        if offset >= viewport {
            break;
        }
        if offset + size > 0. {
            visible.push(LazyListItemInfo {
                index,
                key: Some(key),
                offset,
                size,
            });
        }
        offset += size;
    }
    visible
}

/// Re-resolves targets when scrolling changed which items are on screen, as if the
/// pointer had moved by zero.
pub(crate) fn refresh_on_window_change(
    scroll: &mut ScrollDriver,
    drag: &mut DraggableState<ItemBounds>,
    layout: &LazyListLayout,
) -> bool {
    if !scroll.observe(layout.visible_window()) {
        return false;
    }
    if let Err(err) = drag.on_drag(layout, 0., 0.) {
        log::warn!("failed to refresh drag targets: {err}");
    }
    true
}

struct PendingPress {
    origin: Point<Pixels>,
    _timer: Task<()>,
}

type OnReorder<T> = Rc<dyn Fn(&DraggableListReorder, &[DraggableListItem<T>])>;

/// State for a long-press reorderable list with auto-scroll.
pub struct DraggableListState<T> {
    focus_handle: FocusHandle,
    items: Rc<RefCell<Vec<DraggableListItem<T>>>>,
    config: DraggableConfig,
    orientation: Axis,
    reverse_layout: bool,
    rtl: bool,
    scroll_handle: ScrollHandle,
    scroll: ScrollDriver,
    scroll_initialized: bool,
    drag: DraggableState<ItemBounds>,
    events: Rc<RefCell<Vec<DragEvent>>>,
    press: Option<PendingPress>,
    last_pointer: Option<Point<Pixels>>,
    on_reorder: Option<OnReorder<T>>,
    render_item: RenderItem<T>,
}

impl<T: 'static> EventEmitter<DragEvent> for DraggableListState<T> {}

impl<T: 'static> DraggableListState<T> {
    pub fn new(cx: &mut App) -> Self {
        let items: Rc<RefCell<Vec<DraggableListItem<T>>>> = Rc::new(RefCell::new(Vec::new()));
        let events = Rc::new(RefCell::new(Vec::new()));

        let mut drag = DraggableState::new({
            let items = items.clone();
            move |from: &ItemPosition, to: &ItemPosition| {
                move_item(&mut items.borrow_mut(), from.index, to.index)
            }
        })
        .can_drag_over({
            let items = items.clone();
            move |position: &ItemPosition| {
                items
                    .borrow()
                    .get(position.index)
                    .is_none_or(|item| !item.locked)
            }
        });
        drag.subscribe({
            let events = events.clone();
            move |event| events.borrow_mut().push(event.clone())
        });

        Self {
            focus_handle: cx.focus_handle(),
            items,
            config: DraggableConfig::default(),
            orientation: Axis::Vertical,
            reverse_layout: false,
            rtl: false,
            scroll_handle: ScrollHandle::new(),
            scroll: ScrollDriver::default(),
            scroll_initialized: false,
            drag,
            events,
            press: None,
            last_pointer: None,
            on_reorder: None,
            render_item: Rc::new(|ix, _, _, _, _| ListItem::new(ix)),
        }
    }

    pub fn items(self, items: impl Into<Vec<DraggableListItem<T>>>) -> Self {
        *self.items.borrow_mut() = items.into();
        self
    }

    pub fn config(mut self, config: DraggableConfig) -> Self {
        self.drag = self.drag.config(config.clone());
        self.config = config;
        self
    }

    pub fn orientation(mut self, orientation: Axis) -> Self {
        self.orientation = orientation;
        self
    }

    /// Lay items out from the end of the viewport, item 0 last.
    pub fn reverse_layout(mut self, reverse: bool) -> Self {
        self.reverse_layout = reverse;
        self
    }

    /// Right-to-left reading order; horizontal lists start on the right.
    pub fn rtl(mut self, rtl: bool) -> Self {
        self.rtl = rtl;
        self
    }

    /// Items released at these indices snap back without the spring animation.
    pub fn ignore_animation_indices(mut self, indices: impl Into<Vec<usize>>) -> Self {
        self.drag = self.drag.ignore_animation_indices(indices);
        self
    }

    pub fn on_drag_end(mut self, on_drag_end: impl Fn(usize, usize) + 'static) -> Self {
        self.drag = self.drag.on_drag_end(on_drag_end);
        self
    }

    /// Provide a callback invoked after every accepted move during a drag.
    pub fn on_reorder(
        mut self,
        on_reorder: impl Fn(&DraggableListReorder, &[DraggableListItem<T>]) + 'static,
    ) -> Self {
        self.on_reorder = Some(Rc::new(on_reorder));
        self
    }

    pub fn set_items(
        &mut self,
        items: impl Into<Vec<DraggableListItem<T>>>,
        cx: &mut Context<Self>,
    ) {
        if self.drag.is_dragging() {
            self.end_drag(cx);
        }
        *self.items.borrow_mut() = items.into();
        cx.notify();
    }

    pub fn items_ref(&self) -> Ref<'_, [DraggableListItem<T>]> {
        Ref::map(self.items.borrow(), |items| items.as_slice())
    }

    pub fn dragging_index(&self) -> Option<usize> {
        self.drag.dragging_item_index()
    }

    pub fn drag_state(&self) -> &DraggableState<ItemBounds> {
        &self.drag
    }

    /// Items are laid out from the far end: either a reversed layout, or a horizontal
    /// list read right to left.
    fn mirrored(&self) -> bool {
        self.reverse_layout != (self.rtl && self.orientation == Axis::Horizontal)
    }

    fn main_axis(&self, at: Point<Pixels>) -> f32 {
        match self.orientation {
            Axis::Vertical => at.y.into(),
            Axis::Horizontal => at.x.into(),
        }
    }

    fn viewport_size(&self) -> Size<f32> {
        let bounds = self.scroll_handle.bounds();
        size(bounds.size.width.into(), bounds.size.height.into())
    }

    fn layout_info(&self) -> LazyListLayoutInfo {
        let viewport = self.viewport_size();
        let main = match self.orientation {
            Axis::Vertical => viewport.height,
            Axis::Horizontal => viewport.width,
        };
        let items = self.items.borrow();
        let visible = lay_out_visible(
            items.iter().map(|item| (item.key(), item.main_axis_size())),
            self.scroll.position(),
            main,
        );
        LazyListLayoutInfo::new(self.orientation, viewport)
            .reverse_layout(self.mirrored())
            .items(visible)
    }

    fn layout(&self) -> LazyListLayout {
        self.layout_info().layout()
    }

    /// Pointer position relative to the list's viewport.
    fn local_point(&self, position: Point<Pixels>) -> Point<f32> {
        let origin = self.scroll_handle.bounds().origin;
        point((position.x - origin.x).into(), (position.y - origin.y).into())
    }

    fn sync_scroll(&mut self) {
        let viewport = self.viewport_size();
        let main = match self.orientation {
            Axis::Vertical => viewport.height,
            Axis::Horizontal => viewport.width,
        };
        let content: f32 = self
            .items
            .borrow()
            .iter()
            .map(|item| item.main_axis_size())
            .sum();
        self.scroll.set_extent(content, main);

        let mirrored = self.mirrored();
        if !self.scroll_initialized && main > 0. {
            self.scroll_initialized = true;
            self.scroll.sync_position(0.);
            self.apply_scroll();
            return;
        }

        let native = self.main_axis(self.scroll_handle.offset());
        self.scroll
            .sync_position(native_to_position(native, self.scroll.max_position(), mirrored));
    }

    fn apply_scroll(&self) {
        let native = position_to_native(
            self.scroll.position(),
            self.scroll.max_position(),
            self.mirrored(),
        );
        let offset = match self.orientation {
            Axis::Vertical => point(px(0.), px(native)),
            Axis::Horizontal => point(px(native), px(0.)),
        };
        self.scroll_handle.set_offset(offset);
    }

    fn flush_events(&mut self, cx: &mut Context<Self>) {
        let events = std::mem::take(&mut *self.events.borrow_mut());
        for event in events {
            if let (DragEvent::Moved { from, to }, Some(on_reorder)) = (&event, &self.on_reorder) {
                let items = self.items.borrow();
                if let Some(item) = items.get(to.index) {
                    let reorder = DraggableListReorder {
                        item_id: item.id.clone(),
                        from: from.index,
                        to: to.index,
                    };
                    on_reorder(&reorder, &items);
                }
            }
            cx.emit(event);
        }
    }

    fn refresh_if_window_changed(&mut self, layout: &LazyListLayout) -> bool {
        refresh_on_window_change(&mut self.scroll, &mut self.drag, layout)
    }

    fn step_frame(&mut self, now: Instant, cx: &mut Context<Self>) {
        self.sync_scroll();

        if self.drag.is_dragging() {
            let layout = self.layout();
            self.refresh_if_window_changed(&layout);

            let layout = self.layout();
            if let Some(velocity) = self.drag.auto_scroll_frame(&layout, now) {
                let direction = scroll_direction(self.reverse_layout, self.orientation, self.rtl);
                if self.scroll.scroll_by(velocity * direction) != 0. {
                    self.apply_scroll();
                    let layout = self.layout();
                    self.refresh_if_window_changed(&layout);
                }
            }
        }

        self.drag.tick_animation(now);
        self.flush_events(cx);
    }

    fn on_mouse_down(
        &mut self,
        event: &MouseDownEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if self.drag.is_dragging() {
            return;
        }

        let delay = self.config.long_press();
        let timer = cx.spawn(async move |this, cx| {
            cx.background_executor().timer(delay).await;
            this.update(cx, |this, cx| this.on_long_press(cx)).ok();
        });
        self.press = Some(PendingPress {
            origin: event.position,
            _timer: timer,
        });
    }

    fn on_long_press(&mut self, cx: &mut Context<Self>) {
        let Some(press) = self.press.take() else {
            return;
        };

        let layout = self.layout();
        let at = self.local_point(press.origin);
        let hit = layout
            .visible_items()
            .iter()
            .find(|item| item.contains(layout.constrain(at)))
            .map(|item| item.index());
        let locked = hit.is_some_and(|ix| {
            self.items
                .borrow()
                .get(ix)
                .is_some_and(|item| item.locked)
        });
        if locked {
            return;
        }

        if self.drag.on_drag_start(&layout, at.x, at.y) {
            self.last_pointer = Some(press.origin);
            self.scroll.reset_observation();
            self.scroll.observe(layout.visible_window());
            self.flush_events(cx);
            cx.notify();
        }
    }

    fn on_mouse_move(
        &mut self,
        event: &MouseMoveEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if let Some(press) = self.press.as_ref() {
            let dx: f32 = (event.position.x - press.origin.x).into();
            let dy: f32 = (event.position.y - press.origin.y).into();
            if (dx * dx + dy * dy).sqrt() > self.config.touch_slop {
                self.press = None;
            }
            return;
        }

        let Some(last) = self.last_pointer else {
            return;
        };
        if !self.drag.is_dragging() {
            self.last_pointer = None;
            return;
        }

        let dx: f32 = (event.position.x - last.x).into();
        let dy: f32 = (event.position.y - last.y).into();
        self.last_pointer = Some(event.position);

        let layout = self.layout();
        if let Err(err) = self.drag.on_drag(&layout, dx, dy) {
            log::warn!("pointer move outside of a drag: {err}");
        }
        self.flush_events(cx);
        cx.notify();
    }

    fn on_mouse_up(
        &mut self,
        _event: &MouseUpEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self.press = None;
        if self.drag.is_dragging() {
            self.end_drag(cx);
        }
    }

    fn end_drag(&mut self, cx: &mut Context<Self>) {
        let layout = self.layout();
        match self.drag.on_drag_canceled(&layout) {
            Ok(end) => log::debug!("drag released: {end:?}"),
            Err(err) => log::warn!("release outside of a drag: {err}"),
        }
        self.last_pointer = None;
        self.scroll.reset_observation();
        self.flush_events(cx);
        cx.notify();
    }
}

impl<T: 'static> Render for DraggableListState<T> {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.step_frame(Instant::now(), cx);
        if self.drag.is_dragging() || self.drag.cancel_animation_state().is_running() {
            window.request_animation_frame();
        }

        let render_item = Rc::clone(&self.render_item);
        let layout = self.layout();
        let vertical = self.orientation == Axis::Vertical;
        let orientation_locked = self.config.orientation_locked;
        let drag_border = cx.theme().drag_border;
        let background = cx.theme().background;

        let items = self.items.clone();
        let items = items.borrow();
        let order: Vec<usize> = if self.mirrored() {
            (0..items.len()).rev().collect()
        } else {
            (0..items.len()).collect()
        };

        let mut rows = Vec::with_capacity(items.len());
        for ix in order {
            let item = &items[ix];
            let key = item.key();
            let presentation =
                item_presentation(&self.drag, &layout, ix, Some(&key), orientation_locked);
            let row_state = DraggableListRowState {
                dragging: presentation.dragging,
                settling: presentation.elevated && !presentation.dragging,
                locked: item.locked,
            };

            let list_item = (render_item)(ix, item, row_state, window, cx);
            let body = div()
                .id(key)
                .relative()
                .size_full()
                .left(px(presentation.translation.x))
                .top(px(presentation.translation.y))
                .when(presentation.dragging, |this| {
                    this.bg(background)
                        .border_1()
                        .border_color(drag_border)
                        .shadow_md()
                })
                .child(list_item.disabled(item.locked));

            let slot = div()
                .flex_shrink_0()
                .when(vertical, |this| this.w_full().h(item.size))
                .when(!vertical, |this| this.h_full().w(item.size));
            let slot = if presentation.elevated {
                slot.child(deferred(body).with_priority(1))
            } else {
                slot.child(body)
            };
            rows.push(slot);
        }

        let mirrored = self.mirrored();
        div()
            .id("draggable-list")
            .size_full()
            .track_scroll(&self.scroll_handle)
            .when(vertical, |this| this.overflow_y_scroll())
            .when(!vertical, |this| this.overflow_x_scroll())
            .on_mouse_down(MouseButton::Left, cx.listener(Self::on_mouse_down))
            .on_mouse_move(cx.listener(Self::on_mouse_move))
            .on_mouse_up(MouseButton::Left, cx.listener(Self::on_mouse_up))
            .on_mouse_up_out(MouseButton::Left, cx.listener(Self::on_mouse_up))
            .child(
                div()
                    .flex()
                    .when(vertical, |this| this.flex_col().w_full().min_h_full())
                    .when(!vertical, |this| this.flex_row().h_full().min_w_full())
                    .when(mirrored, |this| this.justify_end())
                    .children(rows),
            )
    }
}

/// A reorderable list element: long-press an item to drag it.
#[derive(IntoElement)]
pub struct DraggableList<T: 'static> {
    id: ElementId,
    state: Entity<DraggableListState<T>>,
    style: StyleRefinement,
    render_item: RenderItem<T>,
}

impl<T: 'static> DraggableList<T> {
    pub fn new<R>(state: &Entity<DraggableListState<T>>, render_item: R) -> Self
    where
        R: Fn(
                usize,
                &DraggableListItem<T>,
                DraggableListRowState,
                &mut Window,
                &mut App,
            ) -> ListItem
            + 'static,
    {
        Self {
            id: ElementId::Name(format!("draggable-list-{}", state.entity_id()).into()),
            state: state.clone(),
            style: StyleRefinement::default(),
            render_item: Rc::new(render_item),
        }
    }
}

impl<T: 'static> Styled for DraggableList<T> {
    fn style(&mut self) -> &mut StyleRefinement {
        &mut self.style
    }
}

impl<T: 'static> RenderOnce for DraggableList<T> {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let focus_handle = self.state.read(cx).focus_handle.clone();
        self.state
            .update(cx, |state, _| state.render_item = self.render_item);

        div()
            .id(self.id)
            .key_context(CONTEXT)
            .track_focus(&focus_handle)
            .size_full()
            .child(self.state)
            .refine_style(&self.style)
    }
}
