use std::cell::Ref;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use weave_core::{Runtime, RuntimeConfig, RuntimeScheduler, WidgetId};
use weave_ui::{
    ContainerWidget, LeafKind, MemoryHost, RenderTree, RenderableRegistry, ViewDescription,
    WidgetError,
};

use crate::leaf::{LeafRenderable, LeafWidget, LogEntry, RenderLog};

/// Counts frame requests instead of scheduling anything.
#[derive(Debug, Default)]
pub struct TestScheduler {
    frames: AtomicUsize,
}

impl TestScheduler {
    pub fn frames(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }
}

impl RuntimeScheduler for TestScheduler {
    fn schedule_frame(&self) {
        self.frames.fetch_add(1, Ordering::SeqCst);
    }
}

/// Headless harness for exercising render trees in tests.
///
/// `WeaveTestRule` owns a [`RenderTree`] over a [`MemoryHost`] with every
/// built-in leaf kind mapped to a logging [`LeafRenderable`]. It exposes
/// helpers for driving render passes and inspecting the widgets produced.
pub struct WeaveTestRule {
    tree: RenderTree<MemoryHost>,
    scheduler: Arc<TestScheduler>,
    log: RenderLog,
}

impl WeaveTestRule {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let scheduler = Arc::new(TestScheduler::default());
        let runtime = Runtime::with_config(scheduler.clone(), config);
        let leaves = LeafRenderable::new();
        let log = leaves.log();
        let mut renderables = RenderableRegistry::new();
        renderables.register_leaves(LeafKind::BUILTIN, Rc::new(leaves));
        Self {
            tree: RenderTree::with_runtime(MemoryHost::new(), renderables, runtime),
            scheduler,
            log,
        }
    }

    /// Mounts `content` and performs the initial render.
    pub fn set_content(&mut self, content: ViewDescription) -> Result<WidgetId, WidgetError> {
        self.tree.mount(content)
    }

    /// Processes invalidated renderers until the tree is idle. Returns the
    /// number of render passes.
    pub fn pump_until_idle(&mut self) -> Result<usize, WidgetError> {
        self.tree.process_invalid()
    }

    pub fn tree(&self) -> &RenderTree<MemoryHost> {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut RenderTree<MemoryHost> {
        &mut self.tree
    }

    pub fn runtime(&self) -> &Runtime {
        self.tree.runtime()
    }

    /// Frames requested since the rule was created.
    pub fn frames_requested(&self) -> usize {
        self.scheduler.frames()
    }

    pub fn host(&self) -> Ref<'_, MemoryHost> {
        self.tree.host()
    }

    /// The widget built for the mounted content.
    pub fn content_id(&self) -> Option<WidgetId> {
        self.tree.content()
    }

    pub fn children_of(&self, id: WidgetId) -> Vec<WidgetId> {
        self.tree.children_of(id)
    }

    pub fn leaf(&self, id: WidgetId) -> Result<LeafWidget, WidgetError> {
        self.host().widget::<LeafWidget>(id).cloned()
    }

    pub fn container(&self, id: WidgetId) -> Result<ContainerWidget, WidgetError> {
        self.host().widget::<ContainerWidget>(id).cloned()
    }

    /// Texts of the leaf children of `id`, in native order.
    pub fn texts_under(&self, id: WidgetId) -> Vec<String> {
        let host = self.host();
        let children = match host.widget::<ContainerWidget>(id) {
            Ok(container) => container.child_ids().to_vec(),
            Err(_) => return Vec::new(),
        };
        children
            .into_iter()
            .filter_map(|child| host.widget::<LeafWidget>(child).ok())
            .filter_map(|leaf| leaf.text().map(str::to_owned))
            .collect()
    }

    pub fn log(&self) -> Vec<LogEntry> {
        self.log.borrow().clone()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn dump(&self) -> String {
        self.host().dump_tree(self.tree.root())
    }
}

impl Default for WeaveTestRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `f` with a fresh [`WeaveTestRule`].
pub fn run_test_tree<R>(f: impl FnOnce(&mut WeaveTestRule) -> R) -> R {
    let mut rule = WeaveTestRule::new();
    f(&mut rule)
}
