//! Metadata attached to live native widgets.

use std::rc::Rc;

use ahash::RandomState;
use hashbrown::HashMap;

use weave_core::{SubscriberId, WidgetId};

use crate::context::Context;
use crate::renderer::Renderer;
use crate::screen::WidgetToken;
use crate::view::ViewDescription;

pub struct WidgetEntry {
    /// The description that last rendered the widget.
    pub description: ViewDescription,
    /// The widget's resolved context; its children render under it.
    pub context: Context,
    pub parent: Option<WidgetId>,
    pub children: Vec<WidgetId>,
    pub renderer: Option<Renderer>,
    pub token: Rc<WidgetToken>,
    /// False while a lazy container's children wait on the build queue.
    pub children_built: bool,
}

/// Entries keyed by widget identity, removed when the widget is destroyed.
#[derive(Default)]
pub struct WidgetTable {
    entries: HashMap<WidgetId, WidgetEntry, RandomState>,
    owners: HashMap<SubscriberId, WidgetId, RandomState>,
}

impl WidgetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: WidgetId, entry: WidgetEntry) {
        if let Some(renderer) = &entry.renderer {
            self.owners.insert(renderer.id(), id);
        }
        self.entries.insert(id, entry);
    }

    pub fn set_renderer(&mut self, id: WidgetId, renderer: Renderer) {
        if let Some(entry) = self.entries.get_mut(&id) {
            self.owners.insert(renderer.id(), id);
            entry.renderer = Some(renderer);
        }
    }

    pub fn remove(&mut self, id: WidgetId) -> Option<WidgetEntry> {
        let entry = self.entries.remove(&id)?;
        if let Some(renderer) = &entry.renderer {
            self.owners.remove(&renderer.id());
        }
        Some(entry)
    }

    pub fn get(&self, id: WidgetId) -> Option<&WidgetEntry> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut WidgetEntry> {
        self.entries.get_mut(&id)
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.entries.contains_key(&id)
    }

    /// The widget whose renderer is `renderer`.
    pub fn owner_of(&self, renderer: SubscriberId) -> Option<WidgetId> {
        self.owners.get(&renderer).copied()
    }

    pub fn description(&self, id: WidgetId) -> Option<ViewDescription> {
        self.entries.get(&id).map(|entry| entry.description.clone())
    }

    pub fn children(&self, id: WidgetId) -> Vec<WidgetId> {
        self.entries
            .get(&id)
            .map(|entry| entry.children.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
