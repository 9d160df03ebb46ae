use gpui::{Axis, ElementId, Point, point};

use crate::item::{DragLayout, ItemInfo, ItemPosition};
use crate::state::DraggableState;

/// How a single row should be drawn this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ItemPresentation {
    pub dragging: bool,
    pub translation: Point<f32>,
    /// Painted above its siblings.
    pub elevated: bool,
}

/// Presentation of the row at `index` (with `key`, if the list has keys).
///
/// Rows are matched by key when one is given, since keys follow the item across
/// reorders; otherwise by index. With `orientation_locked` the row only moves along
/// the list's main axis.
pub fn item_presentation<I, L>(
    state: &DraggableState<I>,
    layout: &L,
    index: usize,
    key: Option<&ElementId>,
    orientation_locked: bool,
) -> ItemPresentation
where
    I: ItemInfo + Clone,
    L: DragLayout<Item = I>,
{
    let row = ItemPosition::new(index, key.cloned());
    let is_row = |position: &ItemPosition| {
        if row.key.is_some() {
            position.is_same_item(&row)
        } else {
            position.is_same_slot(&row)
        }
    };

    let dragging = state.dragging_item_index().is_some_and(|dragging_index| {
        is_row(&ItemPosition::new(
            dragging_index,
            state.dragging_item_key().cloned(),
        ))
    });
    let lock = |translation: Point<f32>| match (orientation_locked, layout.orientation()) {
        (false, _) => translation,
        (true, Axis::Vertical) => point(0., translation.y),
        (true, Axis::Horizontal) => point(translation.x, 0.),
    };

    if dragging {
        return ItemPresentation {
            dragging: true,
            translation: lock(point(
                state.dragging_item_left(layout),
                state.dragging_item_top(layout),
            )),
            elevated: true,
        };
    }

    let animation = state.cancel_animation_state();
    let animating = animation.position().is_some_and(is_row);
    if animating {
        return ItemPresentation {
            dragging: false,
            translation: lock(animation.offset()),
            elevated: true,
        };
    }

    ItemPresentation::default()
}
