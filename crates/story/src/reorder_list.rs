use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::ActiveTheme as _;
use gpui_component::list::ListItem;
use gpui_component::{Icon, IconName, Sizable as _, h_flex, v_flex};
use gpui_dnd_reorder::{
    DragEvent, DraggableConfig, DraggableListItem, DraggableListRowState, DraggableListState,
    draggable_list,
};

const CONFIG: &str = r#"{ "long_press_ms": 300, "spring": { "stiffness": 400 } }"#;

pub struct ReorderListExample {
    list: Entity<DraggableListState<usize>>,
    last_event: Option<String>,
    _subscriptions: Vec<Subscription>,
}

impl ReorderListExample {
    pub fn view(_window: &mut Window, cx: &mut App) -> Entity<Self> {
        let config = DraggableConfig::from_json(CONFIG).unwrap_or_else(|err| {
            log::warn!("falling back to the default drag config: {err}");
            DraggableConfig::default()
        });

        let list = cx.new(|cx| {
            DraggableListState::new(cx)
                .items(demo_items())
                .config(config)
                .on_reorder(|reorder, _items| {
                    log::info!("{} moved {} -> {}", reorder.item_id, reorder.from, reorder.to);
                })
        });

        cx.new(|cx| {
            let subscriptions = vec![cx.subscribe(
                &list,
                |this: &mut Self, _, event: &DragEvent, cx| {
                    this.last_event = Some(describe(event));
                    cx.notify();
                },
            )];
            Self {
                list,
                last_event: None,
                _subscriptions: subscriptions,
            }
        })
    }
}

impl Render for ReorderListExample {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let dump = self
            .list
            .read(cx)
            .items_ref()
            .iter()
            .enumerate()
            .map(|(ix, item)| format!("{ix:02}  {}", item.id))
            .collect::<Vec<_>>()
            .join("\n");
        let last_event = self
            .last_event
            .clone()
            .unwrap_or_else(|| "<none>".to_string());
        let theme = cx.theme();

        v_flex()
            .size_full()
            .p(px(16.))
            .gap_y_3()
            .child(
                v_flex()
                    .gap_y_1()
                    .child(
                        div()
                            .text_xl()
                            .font_weight(FontWeight::BOLD)
                            .child("Reorder List"),
                    )
                    .child(div().text_sm().text_color(theme.muted_foreground).child(
                        "Press and hold a row to pick it up, then drag. Dragging near an edge scrolls the list. Locked rows stay in place.",
                    ))
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child(format!("Last event: {last_event}")),
                    ),
            )
            .child(
                h_flex()
                    .flex_1()
                    .min_h(px(0.))
                    .gap_x_3()
                    .child(
                        div()
                            .w(px(420.))
                            .h_full()
                            .rounded(px(12.))
                            .border_1()
                            .border_color(theme.border)
                            .bg(theme.background)
                            .overflow_hidden()
                            .child(draggable_list(
                                &self.list,
                                move |ix, item, row_state, _window, cx| {
                                    render_row(ix, item, row_state, cx)
                                },
                            )),
                    )
                    .child(
                        div()
                            .flex_1()
                            .min_w(px(0.))
                            .h_full()
                            .rounded(px(12.))
                            .border_1()
                            .border_color(theme.border)
                            .bg(theme.background)
                            .p(px(12.))
                            .child(render_dump(dump)),
                    ),
            )
    }
}

fn render_row(
    ix: usize,
    item: &DraggableListItem<usize>,
    row_state: DraggableListRowState,
    cx: &mut App,
) -> ListItem {
    let theme = cx.theme();
    let icon = if row_state.locked {
        IconName::Minus
    } else {
        IconName::Menu
    };

    ListItem::new(ix)
        .when(row_state.settling, |this| this.opacity(0.8))
        .child(
            h_flex()
                .gap_x_2()
                .items_center()
                .child(Icon::from(icon).small().text_color(theme.muted_foreground))
                .child(item.label.clone())
                .child(
                    div()
                        .text_xs()
                        .text_color(theme.muted_foreground)
                        .child(format!("#{}", item.data)),
                ),
        )
}

fn render_dump(text: String) -> impl IntoElement {
    let lines = text
        .lines()
        .map(|line| div().text_sm().child(line.to_string()));
    v_flex().gap_y_0p5().children(lines)
}

fn describe(event: &DragEvent) -> String {
    match event {
        DragEvent::Started { index, .. } => format!("picked up row {index}"),
        DragEvent::Moved { from, to } => format!("moved {} -> {}", from.index, to.index),
        DragEvent::Ended {
            start_index,
            end_index,
        } => format!("dropped, {start_index} -> {end_index}"),
        DragEvent::CancelAnimationStarted(position) => {
            format!("settling row {}", position.index)
        }
        DragEvent::CancelAnimationFinished => "settled".to_string(),
    }
}

fn demo_items() -> Vec<DraggableListItem<usize>> {
    (0..30)
        .map(|ix| {
            let item = DraggableListItem::new(format!("row/{ix:02}"), format!("Row {ix}"), ix)
                .size(px(if ix % 7 == 3 { 64. } else { 44. }));
            item.locked(ix == 0 || ix % 10 == 5)
        })
        .collect()
}
