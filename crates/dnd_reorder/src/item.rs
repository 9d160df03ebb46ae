use gpui::{Axis, ElementId, Point, point};

/// A list slot at one point in time.
///
/// Indices move when items are reordered; keys stay with the item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemPosition {
    pub index: usize,
    pub key: Option<ElementId>,
}

impl ItemPosition {
    pub fn new(index: usize, key: Option<ElementId>) -> Self {
        Self { index, key }
    }

    pub fn is_same_slot(&self, other: &ItemPosition) -> bool {
        self.index == other.index
    }

    /// Both keys must be present; a missing key never matches.
    pub fn is_same_item(&self, other: &ItemPosition) -> bool {
        self.key.is_some() && self.key == other.key
    }
}

/// Geometry of one visible item, in a top-left origin space.
///
/// This is the only view of layout the drag core relies on.
pub trait ItemInfo {
    fn index(&self) -> usize;
    fn key(&self) -> Option<&ElementId>;
    fn left(&self) -> f32;
    fn top(&self) -> f32;
    fn right(&self) -> f32;
    fn bottom(&self) -> f32;

    fn width(&self) -> f32 {
        self.right() - self.left()
    }

    fn height(&self) -> f32 {
        self.bottom() - self.top()
    }

    fn center(&self) -> Point<f32> {
        point(
            (self.left() + self.right()) / 2.,
            (self.top() + self.bottom()) / 2.,
        )
    }

    /// Inclusive on every edge, so zero-width bounds still contain points on their line.
    fn contains(&self, at: Point<f32>) -> bool {
        at.x >= self.left() && at.x <= self.right() && at.y >= self.top() && at.y <= self.bottom()
    }

    fn overlaps(&self, other: &impl ItemInfo) -> bool {
        !(other.bottom() < self.top()
            || other.top() > self.bottom()
            || other.right() < self.left()
            || other.left() > self.right())
    }

    fn position(&self) -> ItemPosition {
        ItemPosition::new(self.index(), self.key().cloned())
    }
}

/// Normalized bounds of a visible item.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemBounds {
    pub index: usize,
    pub key: Option<ElementId>,
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl ItemBounds {
    pub fn new(index: usize, key: Option<ElementId>) -> Self {
        Self {
            index,
            key,
            left: 0.,
            top: 0.,
            right: 0.,
            bottom: 0.,
        }
    }

    /// Snapshot of any item's geometry.
    pub fn of(item: &impl ItemInfo) -> Self {
        Self::new(item.index(), item.key().cloned()).with_rect(
            item.left(),
            item.top(),
            item.right(),
            item.bottom(),
        )
    }

    pub fn with_rect(mut self, left: f32, top: f32, right: f32, bottom: f32) -> Self {
        self.left = left;
        self.top = top;
        self.right = right;
        self.bottom = bottom;
        self
    }

    /// Bounds translated by `delta`.
    pub fn translated(&self, delta: Point<f32>) -> Self {
        Self {
            index: self.index,
            key: self.key.clone(),
            left: self.left + delta.x,
            top: self.top + delta.y,
            right: self.right + delta.x,
            bottom: self.bottom + delta.y,
        }
    }
}

impl ItemInfo for ItemBounds {
    fn index(&self) -> usize {
        self.index
    }

    fn key(&self) -> Option<&ElementId> {
        self.key.as_ref()
    }

    fn left(&self) -> f32 {
        self.left
    }

    fn top(&self) -> f32 {
        self.top
    }

    fn right(&self) -> f32 {
        self.right
    }

    fn bottom(&self) -> f32 {
        self.bottom
    }
}

/// First visible index and number of visible items.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisibleWindow {
    pub first_index: Option<usize>,
    pub count: usize,
}

/// A snapshot of one layout pass.
///
/// Implementations are rebuilt after every layout, the drag core never keeps one
/// past a single call.
pub trait DragLayout {
    type Item: ItemInfo + Clone;

    fn visible_items(&self) -> &[Self::Item];

    /// Start of the viewport along the main axis.
    fn viewport_start(&self) -> f32;

    /// End of the viewport along the main axis.
    fn viewport_end(&self) -> f32;

    fn orientation(&self) -> Axis {
        Axis::Vertical
    }

    /// Maps a pointer position into the space items are hit-tested in.
    fn constrain(&self, at: Point<f32>) -> Point<f32> {
        at
    }

    fn visible_window(&self) -> VisibleWindow {
        let items = self.visible_items();
        VisibleWindow {
            first_index: items.first().map(|item| item.index()),
            count: items.len(),
        }
    }

    fn item_at_index(&self, index: usize) -> Option<&Self::Item> {
        self.visible_items().iter().find(|item| item.index() == index)
    }
}
