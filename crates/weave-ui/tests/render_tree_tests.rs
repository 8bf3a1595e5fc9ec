use std::cell::{Cell, RefCell};
use std::rc::Rc;

use weave_core::{with_transaction, Animation, RuntimeConfig, StateCell, Transaction};
use weave_graphics::Color;
use weave_layout::{Alignment, Anchor, ConstraintTarget, Relation};
use weave_testing::{run_test_tree, LogEntry, WeaveTestRule};
use weave_ui::{
    steps, ContainerKind, DiffStep, LeafKind, ViewDescription, WidgetError, WidgetHost,
};

fn menu(items: &StateCell<Vec<String>>) -> ViewDescription {
    let source = items.clone();
    ViewDescription::component("Menu", move |_| {
        ViewDescription::list(source.with(|names| {
            names
                .iter()
                .map(|name| ViewDescription::text(name.as_str()).with_key(name.as_str()))
                .collect()
        }))
    })
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

/// The list widget rendered by `menu`.
fn list_of(rule: &WeaveTestRule) -> usize {
    let host = rule.content_id().expect("menu mounted");
    rule.children_of(host)[0]
}

#[test]
fn appending_a_bowl_updates_the_first_row_and_inserts_the_second() {
    let items = StateCell::new(names(&["Shoyu"]));
    let mut rule = WeaveTestRule::new();
    rule.set_content(menu(&items)).expect("mount");

    let list = list_of(&rule);
    let shoyu = rule.children_of(list)[0];
    rule.tree().record_diffs(true);
    rule.clear_log();

    items.update(|names| names.push("Tonkotsu".to_owned()));
    assert_eq!(rule.frames_requested(), 1);
    assert_eq!(rule.pump_until_idle(), Ok(1));

    let diffs = rule.tree().take_recorded_diffs();
    let list_diff = diffs
        .iter()
        .find(|diff| diff.parent == list)
        .expect("list children diffed");
    assert_eq!(
        steps(&list_diff.operations),
        vec![DiffStep::Update(0), DiffStep::Insert(1)]
    );

    let rows = rule.children_of(list);
    assert_eq!(rows[0], shoyu);
    assert_eq!(rule.texts_under(list), names(&["Shoyu", "Tonkotsu"]));
    assert_eq!(
        rule.log(),
        vec![
            LogEntry::Updated {
                widget: shoyu,
                kind: LeafKind::Text
            },
            LogEntry::Created {
                widget: rows[1],
                kind: LeafKind::Text
            },
        ]
    );
}

#[test]
fn removing_the_middle_row_keeps_its_neighbours() {
    let items = StateCell::new(names(&["a", "b", "c"]));
    let mut rule = WeaveTestRule::new();
    rule.set_content(menu(&items)).expect("mount");

    let list = list_of(&rule);
    let before = rule.children_of(list);
    rule.clear_log();

    items.set(names(&["a", "c"]));
    rule.pump_until_idle().expect("render pass");

    assert_eq!(rule.children_of(list), vec![before[0], before[2]]);
    assert!(!rule.tree().contains(before[1]));
    assert!(!rule.host().contains(before[1]));
    assert!(rule
        .log()
        .iter()
        .all(|entry| matches!(entry, LogEntry::Updated { .. })));
}

#[test]
fn rotating_keyed_rows_moves_every_handle() {
    let items = StateCell::new(names(&["a", "b", "c"]));
    let mut rule = WeaveTestRule::new();
    rule.set_content(menu(&items)).expect("mount");

    let list = list_of(&rule);
    let before = rule.children_of(list);
    items.set(names(&["b", "c", "a"]));
    rule.pump_until_idle().expect("render pass");

    assert_eq!(rule.children_of(list), vec![before[1], before[2], before[0]]);
    assert_eq!(rule.texts_under(list), names(&["b", "c", "a"]));
}

#[test]
fn rerendering_unchanged_output_only_updates() {
    let tick = StateCell::new(0u32);
    let source = tick.clone();
    let mut rule = WeaveTestRule::new();
    rule.set_content(ViewDescription::component("Static", move |_| {
        let _ = source.get();
        ViewDescription::vstack(vec![
            ViewDescription::text("Miso"),
            ViewDescription::leaf(LeafKind::Toggle).prop("on", true),
        ])
    }))
    .expect("mount");

    let dump = rule.dump();
    rule.clear_log();
    tick.set(1);
    rule.pump_until_idle().expect("render pass");

    assert_eq!(rule.dump(), dump);
    assert_eq!(rule.log().len(), 2);
    assert!(rule
        .log()
        .iter()
        .all(|entry| matches!(entry, LogEntry::Updated { .. })));
}

#[test]
fn lazy_containers_build_breadth_first() {
    run_test_tree(|rule| {
        let content = ViewDescription::vstack(vec![
            ViewDescription::vstack(vec![
                ViewDescription::vstack(vec![ViewDescription::text("deep")]).lazy()
            ])
            .lazy(),
            ViewDescription::vstack(vec![ViewDescription::text("shallow")]).lazy(),
        ]);
        rule.set_content(content).expect("mount");

        let stack = rule.content_id().expect("mounted");
        let outer = rule.children_of(stack);
        let inner = rule.children_of(outer[0]);
        let deep = rule.children_of(inner[0])[0];
        assert!(rule.leaf(deep).is_ok());
        let shallow = rule.children_of(outer[1])[0];

        assert_eq!(rule.texts_under(inner[0]), vec!["deep".to_owned()]);
        assert!(shallow < deep, "second level finishes before the third");
    });
}

#[test]
fn appear_and_disappear_fire_once_per_widget() {
    let appeared = Rc::new(Cell::new(0));
    let disappeared = Rc::new(Cell::new(0));
    let shown = StateCell::new(true);

    let content = {
        let appeared = Rc::clone(&appeared);
        let disappeared = Rc::clone(&disappeared);
        let shown = shown.clone();
        ViewDescription::component("Banner", move |_| {
            let mut children = Vec::new();
            if shown.get() {
                let appeared = Rc::clone(&appeared);
                let disappeared = Rc::clone(&disappeared);
                children.push(
                    ViewDescription::text("Today only: Tantanmen")
                        .on_appear(move || appeared.set(appeared.get() + 1))
                        .on_disappear(move || disappeared.set(disappeared.get() + 1)),
                );
            }
            ViewDescription::vstack(children)
        })
    };

    let mut rule = WeaveTestRule::new();
    rule.set_content(content).expect("mount");
    assert_eq!((appeared.get(), disappeared.get()), (1, 0));

    shown.set(false);
    rule.pump_until_idle().expect("render pass");
    assert_eq!((appeared.get(), disappeared.get()), (1, 1));
    assert_eq!(rule.tree().screen().callback_count(), 0);
}

#[test]
fn constraints_follow_widget_lifetime() {
    let shown = StateCell::new(true);
    let source = shown.clone();
    let mut rule = WeaveTestRule::new();
    rule.set_content(ViewDescription::component("Overlay", move |_| {
        let mut layers = vec![ViewDescription::leaf(LeafKind::Image)];
        if source.get() {
            layers.push(ViewDescription::text("Sold out").alignment(Alignment::TOP_TRAILING));
        }
        ViewDescription::zstack(layers)
    }))
    .expect("mount");

    assert_eq!(rule.tree().screen().pending_constraints(), 0);
    let host = rule.content_id().expect("mounted");
    let zstack = rule.children_of(host)[0];
    let badge = rule.children_of(zstack)[1];

    let badge_constraints = rule.tree().registry().constraints_for(badge);
    let pinned = |anchor: Anchor| {
        badge_constraints.iter().any(|c| {
            c.anchor == anchor && c.relation == Relation::Equal && c.target.widget() == Some(zstack)
        })
    };
    assert!(pinned(Anchor::Top));
    assert!(pinned(Anchor::Trailing));
    assert!(!pinned(Anchor::CenterX));

    let screen_bound = rule.tree().registry().constraints_for(host);
    assert!(screen_bound
        .iter()
        .any(|c| c.target == ConstraintTarget::Window));

    shown.set(false);
    rule.pump_until_idle().expect("render pass");
    assert!(rule.tree().registry().constraints_for(badge).is_empty());
    assert!(!rule.tree().registry().constraints_for(zstack).is_empty());
}

#[test]
fn self_invalidating_render_stops_at_the_round_limit() {
    let counter = StateCell::new(0u32);
    let source = counter.clone();
    let mut rule = WeaveTestRule::with_config(RuntimeConfig::default().with_max_drain_rounds(4));
    rule.set_content(ViewDescription::component("Runaway", move |_| {
        let next = source.get() + 1;
        source.set(next);
        ViewDescription::vstack(Vec::new())
    }))
    .expect("mount");

    assert_eq!(rule.pump_until_idle(), Err(WidgetError::RenderLoop { rounds: 4 }));
    assert!(!rule.tree().needs_render());
}

#[test]
fn transactions_reach_the_render_context() {
    let seen: Rc<RefCell<Vec<Option<Transaction>>>> = Rc::new(RefCell::new(Vec::new()));
    let count = StateCell::new(0);

    let content = {
        let seen = Rc::clone(&seen);
        let count = count.clone();
        ViewDescription::component("Parent", move |scope| {
            let _ = count.get();
            seen.borrow_mut().push(scope.transaction());
            let seen = Rc::clone(&seen);
            ViewDescription::vstack(vec![ViewDescription::component("Child", move |scope| {
                seen.borrow_mut().push(scope.transaction());
                ViewDescription::text("Chashu")
            })])
        })
    };

    let mut rule = WeaveTestRule::new();
    rule.set_content(content).expect("mount");
    assert_eq!(*seen.borrow(), vec![None, None]);
    seen.borrow_mut().clear();

    let animated = Transaction::animated(Animation::ease_in_out(250));
    with_transaction(animated, || count.set(1));
    rule.pump_until_idle().expect("render pass");
    assert_eq!(*seen.borrow(), vec![Some(animated), Some(animated)]);
    seen.borrow_mut().clear();

    count.set(2);
    rule.pump_until_idle().expect("render pass");
    assert_eq!(*seen.borrow(), vec![None, None]);
}

#[test]
fn inherited_attributes_cascade_through_components() {
    let mut rule = WeaveTestRule::new();
    rule.set_content(
        ViewDescription::vstack(vec![ViewDescription::component("Price", |_| {
            ViewDescription::text("¥980").accent_color(Color::GREEN)
        })])
        .foreground_color(Color::RED)
        .accent_color(Color::BLUE)
        .disabled(true),
    )
    .expect("mount");

    let stack = rule.content_id().expect("mounted");
    let host = rule.children_of(stack)[0];
    let price = rule.children_of(host)[0];
    let leaf = rule.leaf(price).expect("price is a leaf");
    assert_eq!(leaf.foreground, Some(Color::RED));
    assert_eq!(leaf.accent, Some(Color::GREEN));
    assert!(leaf.disabled);
}

#[test]
fn fragment_bodies_are_wrapped_in_a_stack() {
    let mut rule = WeaveTestRule::new();
    rule.set_content(ViewDescription::component("Pair", |_| {
        ViewDescription::fragment(vec![
            ViewDescription::text("Gyoza"),
            ViewDescription::text("Karaage"),
        ])
    }))
    .expect("mount");

    let host = rule.content_id().expect("mounted");
    let wrapper = rule.children_of(host)[0];
    assert_eq!(
        rule.container(wrapper).map(|container| container.kind),
        Ok(ContainerKind::VStack)
    );
    assert_eq!(rule.texts_under(wrapper), names(&["Gyoza", "Karaage"]));
}

#[test]
fn unregistered_leaf_kinds_fail_the_mount() {
    let mut rule = WeaveTestRule::new();
    let result = rule.set_content(ViewDescription::leaf(LeafKind::Custom("chart")));
    assert!(matches!(result, Err(WidgetError::Unregistered { .. })));
}

#[test]
fn failed_mounts_leave_nothing_behind() {
    let flavour = StateCell::new(0u32);
    let content = {
        let flavour = flavour.clone();
        ViewDescription::component("Chart", move |_| {
            flavour.get();
            ViewDescription::leaf(LeafKind::Custom("chart"))
        })
    };

    let mut rule = WeaveTestRule::new();
    let result = rule.set_content(content);
    assert!(matches!(result, Err(WidgetError::Unregistered { .. })));
    assert_eq!(rule.tree().root(), None);
    assert!(rule.host().is_empty());
    assert_eq!(rule.tree().screen().callback_count(), 0);

    flavour.set(1);
    assert!(!rule.tree().needs_render());
    assert_eq!(rule.pump_until_idle(), Ok(0));
}

#[test]
fn failed_inserts_are_torn_down() {
    let broken = StateCell::new(false);
    let content = {
        let broken = broken.clone();
        ViewDescription::component("Specials", move |_| {
            let mut rows = vec![ViewDescription::text("Miso")];
            if broken.get() {
                rows.push(ViewDescription::vstack(vec![
                    ViewDescription::text("Nori"),
                    ViewDescription::leaf(LeafKind::Custom("carousel")),
                ]));
            }
            ViewDescription::vstack(rows)
        })
    };

    let mut rule = WeaveTestRule::new();
    rule.set_content(content).expect("mount");
    let live = rule.host().len();

    broken.set(true);
    assert!(matches!(
        rule.pump_until_idle(),
        Err(WidgetError::Unregistered { .. })
    ));
    assert_eq!(rule.host().len(), live);
    let stack = rule.children_of(rule.content_id().expect("mounted"))[0];
    assert_eq!(rule.texts_under(stack), names(&["Miso"]));
}

#[test]
fn appear_callbacks_may_write_their_components_state() {
    let content = ViewDescription::component("Loader", |scope| {
        let loaded = scope.state(|| false);
        let writer = loaded.clone();
        let label = if loaded.get() { "Ready" } else { "Loading" };
        ViewDescription::text(label).on_appear(move || {
            writer.set(true);
        })
    });

    let mut rule = WeaveTestRule::new();
    rule.set_content(content).expect("mount");
    assert!(rule.tree().needs_render());
    rule.pump_until_idle().expect("render pass");
    let host = rule.content_id().expect("mounted");
    assert_eq!(rule.texts_under(host), names(&["Ready"]));
}

#[test]
fn disappear_callbacks_may_write_their_components_state() {
    let shown = StateCell::new(true);
    let content = {
        let shown = shown.clone();
        ViewDescription::component("Order", move |scope| {
            let dismissed = scope.state(|| 0u32);
            let mut rows = vec![ViewDescription::text(format!("dismissed {}", dismissed.get()))];
            if shown.get() {
                let dismissed = dismissed.clone();
                rows.push(ViewDescription::text("Extra chashu").on_disappear(move || {
                    dismissed.set(dismissed.get() + 1);
                }));
            }
            ViewDescription::vstack(rows)
        })
    };

    let mut rule = WeaveTestRule::new();
    rule.set_content(content).expect("mount");

    shown.set(false);
    assert_eq!(rule.pump_until_idle(), Ok(2));
    let stack = rule.children_of(rule.content_id().expect("mounted"))[0];
    assert_eq!(rule.texts_under(stack), names(&["dismissed 1"]));
}

#[test]
fn removed_components_stop_rendering() {
    let shown = StateCell::new(true);
    let child_state: Rc<RefCell<Option<StateCell<u32>>>> = Rc::new(RefCell::new(None));

    let content = {
        let shown = shown.clone();
        let child_state = Rc::clone(&child_state);
        ViewDescription::component("Parent", move |_| {
            let mut children = Vec::new();
            if shown.get() {
                let child_state = Rc::clone(&child_state);
                children.push(ViewDescription::component("Timer", move |scope| {
                    let ticks = scope.state(|| 0u32);
                    child_state.borrow_mut().replace(ticks.clone());
                    ViewDescription::text(format!("{} s", ticks.get()))
                }));
            }
            ViewDescription::vstack(children)
        })
    };

    let mut rule = WeaveTestRule::new();
    rule.set_content(content).expect("mount");
    let ticks = child_state.borrow().clone().expect("timer rendered");

    shown.set(false);
    rule.pump_until_idle().expect("render pass");
    ticks.set(5);
    assert!(!rule.tree().needs_render());
}
