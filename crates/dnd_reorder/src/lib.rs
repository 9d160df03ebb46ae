mod animation;
mod auto_scroll;
mod config;
mod error;
mod geometry;
mod item;
mod list;
mod presentation;
mod scroll;
mod state;

pub use animation::{
    AnimationStatus, CriticalSpring, DragCancelledAnimation, SpringDragCancelledAnimation,
};
pub use auto_scroll::{
    ACCELERATION_LIMIT, AutoScrollFrame, AutoScrollId, AutoScroller, MIN_SCROLL, ease_in_quint,
    ease_out_quart, interpolate_out_of_bounds_scroll,
};
pub use config::{DraggableConfig, SpringConfig};
pub use error::{Error, Result};
pub use geometry::{LazyListItemInfo, LazyListLayout, LazyListLayoutInfo};
pub use item::{DragLayout, ItemBounds, ItemInfo, ItemPosition, VisibleWindow};
pub use list::{
    DraggableList, DraggableListItem, DraggableListReorder, DraggableListRowState,
    DraggableListState, draggable_list, move_item,
};
pub use presentation::{ItemPresentation, item_presentation};
pub use scroll::{ScrollDriver, native_to_position, position_to_native, scroll_direction};
pub use state::{DragEnd, DragEvent, DraggableState, DropCandidate, ListenerId};
