use gpui::{Axis, ElementId, Point, Size, point};

use crate::item::{DragLayout, ItemBounds};

/// A visible item as a lazy list reports it: position along the main axis only.
#[derive(Clone, Debug, PartialEq)]
pub struct LazyListItemInfo {
    pub index: usize,
    pub key: Option<ElementId>,
    /// Distance from the start of the viewport to the item's leading edge.
    pub offset: f32,
    pub size: f32,
}

/// Layout info of a single-column (or single-row) list for one layout pass.
#[derive(Clone, Debug)]
pub struct LazyListLayoutInfo {
    pub orientation: Axis,
    pub reverse_layout: bool,
    pub viewport_size: Size<f32>,
    pub viewport_start_offset: f32,
    pub viewport_end_offset: f32,
    pub visible_items: Vec<LazyListItemInfo>,
}

impl LazyListLayoutInfo {
    pub fn new(orientation: Axis, viewport_size: Size<f32>) -> Self {
        let main = match orientation {
            Axis::Vertical => viewport_size.height,
            Axis::Horizontal => viewport_size.width,
        };
        Self {
            orientation,
            reverse_layout: false,
            viewport_size,
            viewport_start_offset: 0.,
            viewport_end_offset: main,
            visible_items: Vec::new(),
        }
    }

    pub fn reverse_layout(mut self, reverse: bool) -> Self {
        self.reverse_layout = reverse;
        self
    }

    pub fn items(mut self, items: impl Into<Vec<LazyListItemInfo>>) -> Self {
        self.visible_items = items.into();
        self
    }

    fn main_axis_size(&self) -> f32 {
        match self.orientation {
            Axis::Vertical => self.viewport_size.height,
            Axis::Horizontal => self.viewport_size.width,
        }
    }

    /// Leading and trailing edge on the main axis, in screen space.
    fn main_axis_span(&self, offset: f32, size: f32) -> (f32, f32) {
        if self.reverse_layout {
            let viewport = self.main_axis_size();
            (viewport - offset - size, viewport - offset)
        } else {
            (offset, offset + size)
        }
    }

    pub fn bounds_of(&self, item: &LazyListItemInfo) -> ItemBounds {
        let (start, end) = self.main_axis_span(item.offset, item.size);
        let bounds = ItemBounds::new(item.index, item.key.clone());
        match self.orientation {
            Axis::Vertical => bounds.with_rect(0., start, 0., end),
            Axis::Horizontal => bounds.with_rect(start, 0., end, 0.),
        }
    }

    /// Materializes the adapter for the drag core.
    pub fn layout(&self) -> LazyListLayout {
        let items = self
            .visible_items
            .iter()
            .map(|item| self.bounds_of(item))
            .collect::<Vec<_>>();

        let (viewport_start, viewport_end) = if self.reverse_layout {
            let viewport = self.main_axis_size();
            (
                viewport - self.viewport_end_offset,
                viewport - self.viewport_start_offset,
            )
        } else {
            (self.viewport_start_offset, self.viewport_end_offset)
        };

        LazyListLayout {
            orientation: self.orientation,
            viewport_start,
            viewport_end,
            items,
        }
    }
}

/// Visible item bounds of a lazy list, normalized for the drag core.
#[derive(Clone, Debug)]
pub struct LazyListLayout {
    orientation: Axis,
    viewport_start: f32,
    viewport_end: f32,
    items: Vec<ItemBounds>,
}

impl DragLayout for LazyListLayout {
    type Item = ItemBounds;

    fn visible_items(&self) -> &[ItemBounds] {
        &self.items
    }

    fn viewport_start(&self) -> f32 {
        self.viewport_start
    }

    fn viewport_end(&self) -> f32 {
        self.viewport_end
    }

    fn orientation(&self) -> Axis {
        self.orientation
    }

    /// The cross axis is collapsed to zero width, so pointer input is projected onto it.
    fn constrain(&self, at: Point<f32>) -> Point<f32> {
        match self.orientation {
            Axis::Vertical => point(0., at.y),
            Axis::Horizontal => point(at.x, 0.),
        }
    }
}
