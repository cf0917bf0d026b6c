use std::future::Future;
use std::sync::{Arc, PoisonError};

use armory_client::{shared_cache, Backend, ResourceError, ResourceManager, SharedCache};
use armory_core::{
    CatalogType, Category, Collection, DeletePolicy, Draft, Entity, EntityId, EntityRef,
    FieldKind, Item, Phase, Rarity, Resource, Screen, Weapon,
};
use crossterm::event::KeyEvent;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::form::{Form, Picker};
use super::input;
use crate::config::Settings;

type Reply<T> = oneshot::Receiver<Result<T, ResourceError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
}

/// What the UI needs to draw one tab.
pub struct TabView<'a> {
    pub resource: Resource,
    pub rows: Vec<String>,
    pub selected: Option<usize>,
    pub query: &'a str,
    pub details: Vec<(&'static str, String)>,
    pub phase: &'static str,
    pub failure: Option<&'a str>,
    pub notice: Option<&'a str>,
    pub dialog: Option<Dialog<'a>>,
    pub picker: Option<PickerView<'a>>,
}

pub enum Dialog<'a> {
    Editor(EditorView<'a>),
    Confirm {
        name: &'a str,
        error: Option<&'a str>,
        busy: bool,
    },
}

pub struct EditorView<'a> {
    pub title: String,
    pub action: &'static str,
    pub fields: Vec<FieldView<'a>>,
    pub focus: usize,
    pub cursor_column: usize,
    pub error: Option<&'a str>,
    pub busy: bool,
}

pub struct FieldView<'a> {
    pub label: &'static str,
    pub value: &'a str,
    /// Name of the referenced entity, for reference fields.
    pub hint: Option<String>,
}

pub struct PickerView<'a> {
    pub title: String,
    pub options: &'a [EntityRef],
    pub selected: usize,
}

/// One resource screen of the panel, with the entity type erased.
pub trait Tab {
    fn resource(&self) -> Resource;
    /// Resources whose collections the editor picks references from.
    fn dependencies(&self) -> Vec<Resource>;
    /// Never loaded, or the last load failed.
    fn needs_load(&self) -> bool;
    fn load(&mut self, force: bool);
    /// Applies the results of finished background requests.
    fn poll(&mut self);
    fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome;
    fn view(&self) -> TabView<'_>;
}

pub struct ResourceTab<E: Entity, B: Backend> {
    pub(super) screen: Screen<E>,
    pub(super) form: Option<Form>,
    pub(super) picker: Option<Picker>,
    manager: ResourceManager<E, B>,
    load_rx: Option<Reply<Arc<Vec<E>>>>,
    submit_rx: Option<Reply<E>>,
    delete_rx: Option<Reply<()>>,
}

impl<E: Entity, B: Backend + 'static> ResourceTab<E, B> {
    pub fn new(manager: ResourceManager<E, B>, policy: DeletePolicy) -> Self {
        Self {
            screen: Screen::new(policy),
            form: None,
            picker: None,
            manager,
            load_rx: None,
            submit_rx: None,
            delete_rx: None,
        }
    }

    fn start_load(&mut self, force: bool) {
        if !self.screen.begin_load() {
            return;
        }
        let manager = self.manager.clone();
        self.load_rx = Some(spawn(async move {
            if force {
                manager.refresh().await
            } else {
                manager.list().await
            }
        }));
    }

    /// Opens the editor on the selection, or an empty one when `create` is set.
    pub(super) fn open_editor(&mut self, create: bool) {
        let target = if create {
            None
        } else {
            match self.screen.selected() {
                Some(selected) => Some(selected.clone()),
                None => return,
            }
        };
        if self.screen.open_editor(target.as_ref()) {
            self.form = self.screen.editor().map(Form::for_editor);
            self.picker = None;
        }
    }

    pub(super) fn open_picker(&mut self) {
        let Some(form) = &self.form else {
            return;
        };
        let Some(resource) = form.focused_reference() else {
            return;
        };
        let current = form.inputs()[form.focus()].text().to_string();

        let (refs, failure) = {
            let cache = self
                .manager
                .cache()
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            (cache.refs(resource), cache.load_failure(resource).map(str::to_string))
        };
        match (refs, failure) {
            (Some(options), _) if !options.is_empty() => {
                self.picker = Some(Picker::new(resource, options, &current));
            }
            (Some(_), _) => self.set_editor_error(format!("There are no {} yet.", resource.path())),
            (None, Some(failure)) => self.set_editor_error(format!(
                "{} could not be loaded: {}. Switch tabs to retry.",
                resource.label(),
                failure
            )),
            (None, None) => self.set_editor_error(format!("{} are still loading.", resource.label())),
        }
    }

    pub(super) fn choose_picked(&mut self) {
        let Some(picker) = self.picker.take() else {
            return;
        };
        if let (Some(chosen), Some(form)) = (picker.chosen(), self.form.as_mut()) {
            form.pick(chosen.id);
        }
    }

    fn set_editor_error(&mut self, message: String) {
        if let Some(editor) = self.screen.editor_mut() {
            editor.error = Some(message);
        }
    }

    pub(super) fn submit(&mut self) {
        let (Some(form), Some(editor)) = (self.form.as_ref(), self.screen.editor_mut()) else {
            return;
        };
        if let Err(e) = form.apply(editor) {
            editor.error = Some(e.to_string());
            return;
        }
        let Some(editor) = self.screen.begin_submit() else {
            return;
        };

        debug!(resource = %E::RESOURCE, target = ?editor.target_id(), "Submitting");
        let manager = self.manager.clone();
        self.submit_rx = Some(spawn(async move { manager.submit(&editor).await }));
    }

    pub(super) fn request_delete(&mut self) {
        let Some(target) = self.screen.selected().cloned() else {
            return;
        };
        if let Some(id) = self.screen.request_delete(&target) {
            self.start_delete(id);
        }
    }

    pub(super) fn confirm_delete(&mut self) {
        if let Some(id) = self.screen.confirm_delete() {
            self.start_delete(id);
        }
    }

    fn start_delete(&mut self, id: EntityId) {
        let manager = self.manager.clone();
        self.delete_rx = Some(spawn(async move { manager.delete(id).await }));
    }

    pub(super) fn cancel(&mut self) {
        if self.screen.cancel() {
            self.form = None;
            self.picker = None;
        }
    }

    /// Shows the collection the last mutation refetched into the cache.
    fn sync_from_cache(&mut self) {
        match self.manager.cached() {
            Some(entities) => self.screen.replace_entities(entities.as_ref().clone()),
            None => self.start_load(false),
        }
    }

    fn editor_view<'a>(&'a self, form: &'a Form, busy: bool) -> Option<EditorView<'a>> {
        let editor = self.screen.editor()?;
        let cache = self
            .manager
            .cache()
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let fields = form
            .fields()
            .iter()
            .zip(form.inputs())
            .map(|(field, input)| {
                let hint = match field.kind {
                    FieldKind::Reference(resource) => input
                        .text()
                        .trim()
                        .parse::<EntityId>()
                        .ok()
                        .filter(|&id| id != 0)
                        .map(|id| {
                            cache
                                .name_of(resource, id)
                                .unwrap_or_else(|| format!("unknown {}", resource.singular().to_lowercase()))
                        }),
                    _ => None,
                };
                FieldView {
                    label: field.label,
                    value: input.text(),
                    hint,
                }
            })
            .collect();

        Some(EditorView {
            title: editor.title(),
            action: editor.action_label(),
            fields,
            focus: form.focus(),
            cursor_column: form.inputs()[form.focus()].cursor_column(),
            error: editor.error.as_deref(),
            busy,
        })
    }
}

impl<E: Entity, B: Backend + 'static> Tab for ResourceTab<E, B> {
    fn resource(&self) -> Resource {
        E::RESOURCE
    }

    fn dependencies(&self) -> Vec<Resource> {
        <E::Draft as Draft>::dependencies()
    }

    fn needs_load(&self) -> bool {
        matches!(self.screen.phase(), Phase::Idle | Phase::Failed(_))
    }

    fn load(&mut self, force: bool) {
        self.start_load(force);
    }

    fn poll(&mut self) {
        if let Some(result) = take_reply(&mut self.load_rx) {
            if let Err(e) = &result {
                warn!(resource = %E::RESOURCE, error = %e, "Load failed");
            }
            self.screen.finish_load(
                result
                    .map(|entities| entities.as_ref().clone())
                    .map_err(|e| e.to_string()),
            );
        }

        if let Some(result) = take_reply(&mut self.submit_rx) {
            match result {
                Ok(entity) => {
                    debug!(resource = %E::RESOURCE, id = entity.id(), "Saved");
                    self.screen.finish_submit(Ok(()));
                    self.form = None;
                    self.sync_from_cache();
                }
                Err(e) => self.screen.finish_submit(Err(e.to_string())),
            }
        }

        if let Some(result) = take_reply(&mut self.delete_rx) {
            let deleted = result.is_ok();
            self.screen.finish_delete(result.map_err(|e| e.to_string()));
            if deleted {
                self.sync_from_cache();
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        input::handle_tab_key(self, key)
    }

    fn view(&self) -> TabView<'_> {
        let visible = self.screen.visible();
        let rows = visible
            .iter()
            .map(|e| format!("#{:<4} {}", e.id(), e.name()))
            .collect::<Vec<_>>();
        let selected_entity = self.screen.selected();

        let mut details = selected_entity.map(|e| e.details()).unwrap_or_default();
        if let Some(path) = selected_entity.and_then(|e| e.photo()) {
            details.push(("Photo", self.manager.backend().photo_url(path)));
        }

        let dialog = match self.screen.phase() {
            Phase::Editing(_) | Phase::Submitting(_) => self.form.as_ref().and_then(|form| {
                let busy = self.screen.phase().is_busy();
                self.editor_view(form, busy).map(Dialog::Editor)
            }),
            Phase::ConfirmingDelete { target, error } => Some(Dialog::Confirm {
                name: target.name(),
                error: error.as_deref(),
                busy: false,
            }),
            Phase::Deleting { target } if self.screen.policy() == DeletePolicy::Confirm => {
                Some(Dialog::Confirm {
                    name: target.name(),
                    error: None,
                    busy: true,
                })
            }
            _ => None,
        };

        let picker = self.picker.as_ref().map(|p| PickerView {
            title: format!("Select {}", p.resource.singular()),
            options: p.options.as_slice(),
            selected: p.selected,
        });

        let failure = match self.screen.phase() {
            Phase::Failed(message) => Some(message.as_str()),
            _ => None,
        };

        TabView {
            resource: E::RESOURCE,
            selected: (!rows.is_empty()).then(|| self.screen.selected_index()),
            rows,
            query: self.screen.query(),
            details,
            phase: self.screen.phase().name(),
            failure,
            notice: self.screen.notice(),
            dialog,
            picker,
        }
    }
}

fn spawn<T, F>(future: F) -> Reply<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T, ResourceError>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = tx.send(future.await);
    });
    rx
}

/// Takes a finished reply off its slot. A dropped sender counts as a failure.
fn take_reply<T>(slot: &mut Option<Reply<T>>) -> Option<Result<T, ResourceError>> {
    let rx = slot.as_mut()?;
    let result = match rx.try_recv() {
        Ok(result) => result,
        Err(oneshot::error::TryRecvError::Empty) => return None,
        Err(oneshot::error::TryRecvError::Closed) => Err(ResourceError::Cancelled),
    };
    *slot = None;
    Some(result)
}

pub struct PanelApp {
    pub tabs: Vec<Box<dyn Tab>>,
    pub current: usize,
    pub should_quit: bool,
    pub base_url: String,
}

impl PanelApp {
    pub fn new<B: Backend + 'static>(backend: Arc<B>, settings: &Settings) -> Self {
        let cache = shared_cache();
        let tabs = Resource::ALL
            .iter()
            .map(|&resource| make_tab(resource, &backend, &cache, settings.delete_policy(resource)))
            .collect();

        let mut app = Self {
            tabs,
            current: 0,
            should_quit: false,
            base_url: settings.base_url.clone(),
        };
        app.activate();
        app
    }

    pub fn current_tab(&self) -> &dyn Tab {
        self.tabs[self.current].as_ref()
    }

    pub fn current_tab_mut(&mut self) -> &mut dyn Tab {
        self.tabs[self.current].as_mut()
    }

    pub fn next_tab(&mut self) {
        self.current = (self.current + 1) % self.tabs.len();
        self.activate();
    }

    pub fn prev_tab(&mut self) {
        self.current = (self.current + self.tabs.len() - 1) % self.tabs.len();
        self.activate();
    }

    /// Loads the current tab and the collections its editor picks from,
    /// retrying any of them whose last load failed.
    fn activate(&mut self) {
        let Some(tab) = self.tabs.get(self.current) else {
            return;
        };
        let mut wanted = vec![tab.resource()];
        wanted.extend(tab.dependencies());

        for tab in self.tabs.iter_mut() {
            if wanted.contains(&tab.resource()) && tab.needs_load() {
                tab.load(false);
            }
        }
    }

    pub fn refresh_current(&mut self) {
        self.current_tab_mut().load(true);
    }

    pub fn poll_responses(&mut self) {
        for tab in self.tabs.iter_mut() {
            tab.poll();
        }
    }
}

fn make_tab<B: Backend + 'static>(
    resource: Resource,
    backend: &Arc<B>,
    cache: &SharedCache,
    policy: DeletePolicy,
) -> Box<dyn Tab> {
    fn tab<E: Entity, B: Backend + 'static>(
        backend: &Arc<B>,
        cache: &SharedCache,
        policy: DeletePolicy,
    ) -> Box<dyn Tab> {
        let manager = ResourceManager::<E, B>::new(Arc::clone(backend), Arc::clone(cache));
        Box::new(ResourceTab::new(manager, policy))
    }

    match resource {
        Resource::Items => tab::<Item, B>(backend, cache, policy),
        Resource::Weapons => tab::<Weapon, B>(backend, cache, policy),
        Resource::Categories => tab::<Category, B>(backend, cache, policy),
        Resource::Collections => tab::<Collection, B>(backend, cache, policy),
        Resource::Rarities => tab::<Rarity, B>(backend, cache, policy),
        Resource::Types => tab::<CatalogType, B>(backend, cache, policy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use armory_client::{ClientError, MemoryBackend, PhotoFile};
    use crossterm::event::{Event, KeyCode, KeyModifiers};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Refuses to list types while `types_offline` is set.
    #[derive(Default)]
    struct FlakyBackend {
        inner: MemoryBackend,
        types_offline: AtomicBool,
    }

    impl Backend for FlakyBackend {
        async fn list(&self, resource: Resource) -> Result<Vec<Value>, ClientError> {
            if resource == Resource::Types && self.types_offline.load(Ordering::SeqCst) {
                return Err(ClientError::Api { status: 503, detail: None });
            }
            self.inner.list(resource).await
        }
        async fn create(&self, resource: Resource, payload: &Value) -> Result<Value, ClientError> {
            self.inner.create(resource, payload).await
        }
        async fn update(
            &self,
            resource: Resource,
            id: EntityId,
            payload: &Value,
        ) -> Result<Value, ClientError> {
            self.inner.update(resource, id, payload).await
        }
        async fn delete(&self, resource: Resource, id: EntityId) -> Result<(), ClientError> {
            self.inner.delete(resource, id).await
        }
        async fn upload(&self, photo: PhotoFile) -> Result<String, ClientError> {
            self.inner.upload(photo).await
        }
    }

    fn settings() -> Settings {
        Settings::resolve(None, None, Config::default())
    }

    fn backend() -> Arc<MemoryBackend> {
        let backend = MemoryBackend::new();
        backend.insert(Resource::Types, json!({ "name": "Sniper Rifle" }));
        backend.insert(Resource::Categories, json!({ "name": "Rifles" }));
        Arc::new(backend)
    }

    async fn settle(app: &mut PanelApp) {
        for _ in 0..20 {
            tokio::task::yield_now().await;
            app.poll_responses();
        }
    }

    fn press(app: &mut PanelApp, code: KeyCode) {
        input::handle_event(app, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn type_text(app: &mut PanelApp, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn select_tab(app: &mut PanelApp, resource: Resource) {
        while app.current_tab().resource() != resource {
            app.next_tab();
        }
    }

    #[tokio::test]
    async fn item_tab_loads_its_dependencies() {
        let mut app = PanelApp::new(backend(), &settings());
        settle(&mut app).await;

        for tab in &app.tabs {
            assert_eq!(tab.view().phase, "ready", "{}", tab.resource());
        }
    }

    #[tokio::test]
    async fn create_category_from_keys() {
        let mut app = PanelApp::new(backend(), &settings());
        select_tab(&mut app, Resource::Categories);
        settle(&mut app).await;

        press(&mut app, KeyCode::F(2));
        assert!(matches!(app.current_tab().view().dialog, Some(Dialog::Editor(_))));
        type_text(&mut app, "Pistols");
        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;

        let view = app.current_tab().view();
        assert!(view.dialog.is_none());
        assert_eq!(view.rows.len(), 2);
        assert!(view.rows.iter().any(|r| r.ends_with("Pistols")));
    }

    #[tokio::test]
    async fn duplicate_name_keeps_editor_open() {
        let mut app = PanelApp::new(backend(), &settings());
        select_tab(&mut app, Resource::Categories);
        settle(&mut app).await;

        press(&mut app, KeyCode::F(2));
        type_text(&mut app, "Rifles");
        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;

        let view = app.current_tab().view();
        let Some(Dialog::Editor(editor)) = view.dialog else {
            panic!("editor closed");
        };
        assert_eq!(editor.error, Some("Category with name 'Rifles' already exists"));
        assert_eq!(editor.fields[0].value, "Rifles");
    }

    #[tokio::test]
    async fn confirmed_delete_of_category() {
        let mut app = PanelApp::new(backend(), &settings());
        select_tab(&mut app, Resource::Categories);
        settle(&mut app).await;

        press(&mut app, KeyCode::Delete);
        assert!(matches!(
            app.current_tab().view().dialog,
            Some(Dialog::Confirm { busy: false, .. })
        ));
        press(&mut app, KeyCode::Char('y'));
        settle(&mut app).await;

        let view = app.current_tab().view();
        assert!(view.dialog.is_none());
        assert!(view.rows.is_empty());
    }

    #[tokio::test]
    async fn type_delete_is_immediate() {
        let mut app = PanelApp::new(backend(), &settings());
        select_tab(&mut app, Resource::Types);
        settle(&mut app).await;

        press(&mut app, KeyCode::Delete);
        settle(&mut app).await;
        assert!(app.current_tab().view().rows.is_empty());
    }

    #[tokio::test]
    async fn picker_fills_reference_field() {
        let mut app = PanelApp::new(backend(), &settings());
        select_tab(&mut app, Resource::Weapons);
        settle(&mut app).await;

        press(&mut app, KeyCode::F(2));
        // The type reference is the first field of the weapon form.
        press(&mut app, KeyCode::Enter);
        assert!(app.current_tab().view().picker.is_some());
        press(&mut app, KeyCode::Enter);

        let view = app.current_tab().view();
        assert!(view.picker.is_none());
        let Some(Dialog::Editor(editor)) = view.dialog else {
            panic!("editor closed");
        };
        assert_eq!(editor.fields[0].value, "1");
        assert_eq!(editor.fields[0].hint.as_deref(), Some("Sniper Rifle"));
    }

    #[tokio::test]
    async fn failed_dependency_is_reported_and_retried() {
        let backend = Arc::new(FlakyBackend::default());
        backend.inner.insert(Resource::Types, json!({ "name": "Sniper Rifle" }));
        backend.types_offline.store(true, Ordering::SeqCst);

        let mut app = PanelApp::new(Arc::clone(&backend), &settings());
        select_tab(&mut app, Resource::Weapons);
        settle(&mut app).await;

        press(&mut app, KeyCode::F(2));
        press(&mut app, KeyCode::Enter);
        let view = app.current_tab().view();
        assert!(view.picker.is_none());
        let Some(Dialog::Editor(editor)) = view.dialog else {
            panic!("editor closed");
        };
        assert_eq!(
            editor.error,
            Some("Types could not be loaded: API error: 503 - no detail. Switch tabs to retry.")
        );

        // Coming back to the weapon tab reloads the failed type collection.
        backend.types_offline.store(false, Ordering::SeqCst);
        app.next_tab();
        app.prev_tab();
        settle(&mut app).await;
        assert_eq!(app.current_tab().resource(), Resource::Weapons);

        press(&mut app, KeyCode::Enter);
        assert!(app.current_tab().view().picker.is_some());
    }

    #[tokio::test]
    async fn search_narrows_rows() {
        let backend = backend();
        backend.insert(Resource::Categories, json!({ "name": "Pistols" }));
        let mut app = PanelApp::new(backend, &settings());
        select_tab(&mut app, Resource::Categories);
        settle(&mut app).await;

        type_text(&mut app, "pis");
        let view = app.current_tab().view();
        assert_eq!(view.query, "pis");
        assert_eq!(view.rows.len(), 1);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.current_tab().view().rows.len(), 2);
        assert!(!app.should_quit);
    }
}
