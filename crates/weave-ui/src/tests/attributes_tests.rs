use super::*;
use proptest::prelude::*;

fn parent() -> Attributes {
    Attributes {
        inherited: InheritedAttributes {
            foreground_color: Some(Color::RED),
            accent_color: Some(Color::BLUE),
            font: Some(Font::HEADLINE),
            layout_direction: Some(LayoutDirection::RightToLeft),
            disabled: Some(true),
            on_submit: Some(HandlerChain::new(|| {})),
        },
        local: LocalAttributes {
            background: Some(Color::GRAY),
            padding: Some(EdgeInsets::uniform(8.0)),
            navigation_title: Some("Menu".into()),
            ..LocalAttributes::default()
        },
    }
}

#[test]
fn unset_child_takes_every_inherited_field_from_the_parent() {
    let merged = Attributes::default().merge(&parent());
    assert_eq!(merged.inherited, parent().inherited);
}

#[test]
fn shallow_merge_never_forwards_local_attributes() {
    let merged = Attributes::default().merge(&parent());
    assert_eq!(merged.local, LocalAttributes::default());
}

#[test]
fn child_values_win_in_both_merges() {
    let mut child = Attributes::default();
    child.inherited.foreground_color = Some(Color::GREEN);
    child.inherited.disabled = Some(false);
    child.local.background = Some(Color::WHITE);

    let shallow = child.merge(&parent());
    assert_eq!(shallow.inherited.foreground_color, Some(Color::GREEN));
    assert_eq!(shallow.inherited.disabled, Some(false));
    assert_eq!(shallow.inherited.accent_color, Some(Color::BLUE));
    assert_eq!(shallow.local.background, Some(Color::WHITE));
    assert_eq!(shallow.local.padding, None);

    let complete = child.complete_merge(&parent());
    assert_eq!(complete.local.background, Some(Color::WHITE));
    assert_eq!(complete.local.padding, Some(EdgeInsets::uniform(8.0)));
    assert_eq!(complete.local.navigation_title.as_deref(), Some("Menu"));
}

#[test]
fn handler_chains_compare_by_identity() {
    let chain = HandlerChain::new(|| {});
    assert_eq!(chain, chain.clone());
    assert_ne!(chain, HandlerChain::new(|| {}));
    assert_eq!(chain.then(|| {}).len(), 2);
}

fn any_color() -> impl Strategy<Value = Option<Color>> {
    proptest::option::of((0u8..=255).prop_map(|v| Color::rgb(f32::from(v) / 255.0, 0.0, 0.0)))
}

fn any_attributes() -> impl Strategy<Value = Attributes> {
    (
        any_color(),
        any_color(),
        proptest::option::of(any::<bool>()),
        any_color(),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(fg, accent, disabled, background, presented)| Attributes {
            inherited: InheritedAttributes {
                foreground_color: fg,
                accent_color: accent,
                disabled,
                ..InheritedAttributes::default()
            },
            local: LocalAttributes {
                background,
                is_presented: presented,
                ..LocalAttributes::default()
            },
        })
}

proptest! {
    #[test]
    fn merge_prefers_child_and_falls_back_to_parent(
        child in any_attributes(),
        parent in any_attributes(),
    ) {
        let merged = child.merge(&parent);
        prop_assert_eq!(
            merged.inherited.foreground_color,
            child.inherited.foreground_color.or(parent.inherited.foreground_color)
        );
        prop_assert_eq!(
            merged.inherited.accent_color,
            child.inherited.accent_color.or(parent.inherited.accent_color)
        );
        prop_assert_eq!(
            merged.inherited.disabled,
            child.inherited.disabled.or(parent.inherited.disabled)
        );
        prop_assert_eq!(&merged.local, &child.local);

        let complete = child.complete_merge(&parent);
        prop_assert_eq!(&complete.inherited, &merged.inherited);
        prop_assert_eq!(
            complete.local.background,
            child.local.background.or(parent.local.background)
        );
        prop_assert_eq!(
            complete.local.is_presented,
            child.local.is_presented.or(parent.local.is_presented)
        );
    }
}
