//! Style attributes carried by view descriptions and contexts.
//!
//! Attributes come in two groups. Inherited attributes cascade from a parent
//! to every descendant that does not set them. Local attributes describe one
//! node only and are forwarded solely by a complete merge, which is used when
//! the root of a subtree is finalized. In both groups the node's own value
//! wins and an unset field falls back to the ancestor.

use std::fmt;
use std::rc::Rc;

use weave_graphics::{Color, EdgeInsets, Font, LayoutDirection};
use weave_layout::{Alignment, EdgeSet, Expansion};

/// An ordered list of callbacks, compared by identity.
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Rc<dyn Fn()>>,
}

impl HandlerChain {
    pub fn new(handler: impl Fn() + 'static) -> Self {
        Self {
            handlers: vec![Rc::new(handler)],
        }
    }

    /// Returns a chain that runs `self` and then `handler`.
    pub fn then(&self, handler: impl Fn() + 'static) -> Self {
        let mut handlers = self.handlers.clone();
        handlers.push(Rc::new(handler));
        Self { handlers }
    }

    pub fn invoke(&self) {
        for handler in &self.handlers {
            handler();
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl PartialEq for HandlerChain {
    fn eq(&self, other: &Self) -> bool {
        self.handlers.len() == other.handlers.len()
            && self
                .handlers
                .iter()
                .zip(&other.handlers)
                .all(|(a, b)| Rc::ptr_eq(a, b))
    }
}

impl fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerChain").field(&self.len()).finish()
    }
}

macro_rules! merge_fields {
    ($own:expr, $ancestor:expr; $($field:ident),+ $(,)?) => {
        Self {
            $($field: $own.$field.clone().or_else(|| $ancestor.$field.clone()),)+
        }
    };
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InheritedAttributes {
    pub foreground_color: Option<Color>,
    pub accent_color: Option<Color>,
    pub font: Option<Font>,
    pub layout_direction: Option<LayoutDirection>,
    pub disabled: Option<bool>,
    pub on_submit: Option<HandlerChain>,
}

impl InheritedAttributes {
    pub fn merge(&self, ancestor: &InheritedAttributes) -> Self {
        merge_fields!(self, ancestor;
            foreground_color,
            accent_color,
            font,
            layout_direction,
            disabled,
            on_submit,
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocalAttributes {
    pub background: Option<Color>,
    pub padding: Option<EdgeInsets>,
    pub alignment: Option<Alignment>,
    pub expansion: Option<Expansion>,
    pub ignores_safe_area: Option<EdgeSet>,
    pub navigation_title: Option<Rc<str>>,
    pub is_presented: Option<bool>,
    pub on_appear: Option<HandlerChain>,
    pub on_disappear: Option<HandlerChain>,
}

impl LocalAttributes {
    pub fn merge(&self, ancestor: &LocalAttributes) -> Self {
        merge_fields!(self, ancestor;
            background,
            padding,
            alignment,
            expansion,
            ignores_safe_area,
            navigation_title,
            is_presented,
            on_appear,
            on_disappear,
        )
    }

    /// Alignment, expansion and safe-area edges; the inputs of a layout solve.
    pub fn layout_key(&self) -> (Option<Alignment>, Option<Expansion>, Option<EdgeSet>) {
        (self.alignment, self.expansion, self.ignores_safe_area)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
    pub inherited: InheritedAttributes,
    pub local: LocalAttributes,
}

impl Attributes {
    /// Shallow merge: inherited attributes fall back to `ancestor`, local
    /// attributes stay exactly as set on `self`.
    pub fn merge(&self, ancestor: &Attributes) -> Attributes {
        Attributes {
            inherited: self.inherited.merge(&ancestor.inherited),
            local: self.local.clone(),
        }
    }

    /// Merge of both groups under the same own-value-wins rule.
    pub fn complete_merge(&self, ancestor: &Attributes) -> Attributes {
        Attributes {
            inherited: self.inherited.merge(&ancestor.inherited),
            local: self.local.merge(&ancestor.local),
        }
    }

    /// Keeps the inherited group only.
    pub fn inherited_only(&self) -> Attributes {
        Attributes {
            inherited: self.inherited.clone(),
            local: LocalAttributes::default(),
        }
    }
}

#[cfg(test)]
#[path = "tests/attributes_tests.rs"]
mod tests;
