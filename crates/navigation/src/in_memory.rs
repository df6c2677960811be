//! Scripted in-memory session.
//!
//! Intended for tests and dry runs. Elements are plain text cells keyed by
//! their full address; containers exist implicitly when something lives below
//! them. Reactions of the remote application (a dialog popping up after a
//! button press, a container being renamed after a tab switch) are registered
//! as triggers on recorded actions.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::client::{BridgeError, BridgeResult, ElementRef, NavigationClient, SessionStatus, TreeNode, VKey};
use crate::image::{MatchError, ScreenMatcher, ScreenPoint};

/// Everything the session did, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Write { path: String, value: String },
    Focus(String),
    Caret { path: String, position: usize },
    Key { window: String, code: u8 },
    Press(String),
    Select(String),
    DoubleClick(String),
    SelectNode { tree: String, key: String },
    DoubleClickNode { tree: String, key: String },
    /// Template file name.
    Click(String),
    /// Template file name.
    DoubleClickImage(String),
    History(bool),
    Release,
}

/// Mutable screen content, handed to trigger effects.
#[derive(Debug)]
pub struct ScreenState {
    elements: BTreeMap<String, String>,
    trees: BTreeMap<String, Vec<TreeNode>>,
    templates: BTreeMap<String, ScreenPoint>,
    status: Option<SessionStatus>,
    history_enabled: bool,
    connected: bool,
    probes: usize,
    failing_probes: usize,
    failing_clicks: BTreeSet<String>,
    log: Vec<Action>,
}

impl Default for ScreenState {
    fn default() -> Self {
        Self {
            elements: BTreeMap::new(),
            trees: BTreeMap::new(),
            templates: BTreeMap::new(),
            status: Some(SessionStatus::default()),
            history_enabled: true,
            connected: true,
            probes: 0,
            failing_probes: 0,
            failing_clicks: BTreeSet::new(),
            log: Vec::new(),
        }
    }
}

impl ScreenState {
    pub fn put(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.elements.insert(path.into(), text.into());
    }

    /// Remove an element and everything below it.
    pub fn remove(&mut self, path: &str) {
        let below = format!("{path}/");
        self.elements
            .retain(|key, _| key != path && !key.starts_with(&below));
    }

    pub fn text(&self, path: &str) -> Option<&str> {
        self.elements.get(path).map(String::as_str)
    }

    pub fn set_tree(&mut self, path: impl Into<String>, nodes: Vec<TreeNode>) {
        self.trees.insert(path.into(), nodes);
    }

    /// Make a template visible and return where it sits.
    pub fn show_template(&mut self, name: impl Into<String>) -> ScreenPoint {
        let name = name.into();
        if let Some(point) = self.templates.get(&name) {
            return *point;
        }
        let point = ScreenPoint::new(100 + 40 * self.templates.len() as i32, 100);
        self.templates.insert(name, point);
        point
    }

    pub fn hide_template(&mut self, name: &str) {
        self.templates.remove(name);
    }

    /// Make the next `count` probes fail with a capture error.
    pub fn fail_probes(&mut self, count: usize) {
        self.failing_probes = count;
    }

    /// Refuse mouse input on `template` while it stays visible.
    pub fn fail_clicks(&mut self, template: impl Into<String>) {
        self.failing_clicks.insert(template.into());
    }

    /// Rename a subscreen container of the main window's user area.
    pub fn rename_container(&mut self, from: &str, to: &str) {
        let old_prefix = format!("wnd[0]/usr/sub{from}");
        let new_prefix = format!("wnd[0]/usr/sub{to}");
        let renamed: BTreeMap<String, String> = std::mem::take(&mut self.elements)
            .into_iter()
            .map(|(key, text)| match key.strip_prefix(&old_prefix) {
                Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                    (format!("{new_prefix}{rest}"), text)
                }
                _ => (key, text),
            })
            .collect();
        self.elements = renamed;
    }

    /// Drop the connection from inside a trigger.
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    fn exists(&self, path: &str) -> bool {
        if self.elements.contains_key(path) || self.trees.contains_key(path) {
            return true;
        }
        let below = format!("{path}/");
        self.elements.keys().any(|key| key.starts_with(&below))
    }

    fn children(&self, path: &str) -> Vec<String> {
        let below = format!("{path}/");
        let mut seen = BTreeSet::new();
        let mut names = Vec::new();
        for key in self.elements.keys() {
            let Some(rest) = key.strip_prefix(&below) else {
                continue;
            };
            let segment = rest.split('/').next().unwrap_or(rest);
            // Ids carry a lowercase type prefix (`sub`, `ctxt`, `lbl`); names do not.
            let name = segment.trim_start_matches(|c: char| c.is_ascii_lowercase());
            if seen.insert(name.to_string()) {
                names.push(name.to_string());
            }
        }
        names
    }
}

type Effect = Box<dyn Fn(&mut ScreenState) + Send + Sync>;

struct Trigger {
    on: Action,
    effect: Effect,
}

/// In-memory [`NavigationClient`] and [`ScreenMatcher`].
#[derive(Default)]
pub struct InMemorySession {
    state: Mutex<ScreenState>,
    triggers: Mutex<Vec<Trigger>>,
}

impl core::fmt::Debug for InMemorySession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemorySession")
            .field("state", &*self.state())
            .finish_non_exhaustive()
    }
}

impl InMemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ScreenState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a closure against the screen content.
    pub fn with_screen<R>(&self, f: impl FnOnce(&mut ScreenState) -> R) -> R {
        f(&mut self.state())
    }

    pub fn put(&self, path: impl Into<String>, text: impl Into<String>) {
        self.state().put(path, text);
    }

    pub fn remove(&self, path: &str) {
        self.state().remove(path);
    }

    pub fn text(&self, path: &str) -> Option<String> {
        self.state().text(path).map(str::to_string)
    }

    pub fn set_tree(&self, path: impl Into<String>, nodes: Vec<TreeNode>) {
        self.state().set_tree(path, nodes);
    }

    pub fn show_template(&self, name: impl Into<String>) -> ScreenPoint {
        self.state().show_template(name)
    }

    pub fn rename_container(&self, from: &str, to: &str) {
        self.state().rename_container(from, to);
    }

    /// `None` detaches the session.
    pub fn set_status(&self, status: Option<SessionStatus>) {
        self.state().status = status;
    }

    /// Every later bridge call fails with [`BridgeError::Disconnected`].
    pub fn disconnect(&self) {
        self.state().disconnect();
    }

    /// Apply `effect` every time `on` is recorded.
    pub fn on(&self, on: Action, effect: impl Fn(&mut ScreenState) + Send + Sync + 'static) {
        self.triggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Trigger {
                on,
                effect: Box::new(effect),
            });
    }

    pub fn on_click(&self, template: &str, effect: impl Fn(&mut ScreenState) + Send + Sync + 'static) {
        self.on(Action::Click(template.to_string()), effect);
    }

    pub fn on_press(&self, path: &str, effect: impl Fn(&mut ScreenState) + Send + Sync + 'static) {
        self.on(Action::Press(path.to_string()), effect);
    }

    pub fn on_select(&self, path: &str, effect: impl Fn(&mut ScreenState) + Send + Sync + 'static) {
        self.on(Action::Select(path.to_string()), effect);
    }

    pub fn actions(&self) -> Vec<Action> {
        self.state().log.clone()
    }

    /// Values written to elements whose path contains `fragment`.
    pub fn writes_to(&self, fragment: &str) -> Vec<(String, String)> {
        self.state()
            .log
            .iter()
            .filter_map(|action| match action {
                Action::Write { path, value } if path.contains(fragment) => {
                    Some((path.clone(), value.clone()))
                }
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Action) -> usize {
        self.state().log.iter().filter(|a| *a == wanted).count()
    }

    pub fn history_enabled(&self) -> bool {
        self.state().history_enabled
    }

    pub fn probe_count(&self) -> usize {
        self.state().probes
    }

    fn connected(&self) -> BridgeResult<()> {
        if self.state().connected {
            Ok(())
        } else {
            Err(BridgeError::Disconnected("in-memory session disconnected".into()))
        }
    }

    fn live(&self, element: &ElementRef) -> BridgeResult<()> {
        self.connected()?;
        if self.state().exists(element.path()) {
            Ok(())
        } else {
            Err(BridgeError::Stale(element.path().to_string()))
        }
    }

    fn record(&self, action: Action) {
        self.state().log.push(action.clone());
        let triggers = self.triggers.lock().unwrap_or_else(PoisonError::into_inner);
        for trigger in triggers.iter().filter(|t| t.on == action) {
            (trigger.effect)(&mut self.state());
        }
    }

    fn template_at(&self, at: ScreenPoint) -> Result<String, MatchError> {
        let state = self.state();
        let name = state
            .templates
            .iter()
            .find(|(_, point)| **point == at)
            .map(|(name, _)| name.clone())
            .ok_or_else(|| MatchError::Input(format!("nothing at ({}, {})", at.x, at.y)))?;
        if state.failing_clicks.contains(&name) {
            return Err(MatchError::Input(format!("input refused on {name}")));
        }
        Ok(name)
    }
}

impl NavigationClient for InMemorySession {
    fn resolve_address(&self, path: &str) -> BridgeResult<Option<ElementRef>> {
        self.connected()?;
        Ok(self.state().exists(path).then(|| ElementRef::new(path)))
    }

    fn read_text(&self, element: &ElementRef) -> BridgeResult<String> {
        self.live(element)?;
        Ok(self.state().text(element.path()).unwrap_or_default().to_string())
    }

    fn write_text(&self, element: &ElementRef, value: &str) -> BridgeResult<()> {
        self.live(element)?;
        self.state().put(element.path(), value);
        self.record(Action::Write {
            path: element.path().to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn set_focus(&self, element: &ElementRef) -> BridgeResult<()> {
        self.live(element)?;
        self.record(Action::Focus(element.path().to_string()));
        Ok(())
    }

    fn set_caret(&self, element: &ElementRef, position: usize) -> BridgeResult<()> {
        self.live(element)?;
        self.record(Action::Caret {
            path: element.path().to_string(),
            position,
        });
        Ok(())
    }

    fn send_key(&self, window: &str, key: VKey) -> BridgeResult<()> {
        self.connected()?;
        self.record(Action::Key {
            window: window.to_string(),
            code: key.code(),
        });
        Ok(())
    }

    fn press(&self, element: &ElementRef) -> BridgeResult<()> {
        self.live(element)?;
        self.record(Action::Press(element.path().to_string()));
        Ok(())
    }

    fn select(&self, element: &ElementRef) -> BridgeResult<()> {
        self.live(element)?;
        self.record(Action::Select(element.path().to_string()));
        Ok(())
    }

    fn double_click(&self, element: &ElementRef) -> BridgeResult<()> {
        self.live(element)?;
        self.record(Action::DoubleClick(element.path().to_string()));
        Ok(())
    }

    fn child_names(&self, element: &ElementRef) -> BridgeResult<Vec<String>> {
        self.live(element)?;
        Ok(self.state().children(element.path()))
    }

    fn enumerate_tree_nodes(&self, tree: &ElementRef) -> BridgeResult<Vec<TreeNode>> {
        self.live(tree)?;
        Ok(self.state().trees.get(tree.path()).cloned().unwrap_or_default())
    }

    fn select_tree_node(&self, tree: &ElementRef, key: &str) -> BridgeResult<()> {
        self.live(tree)?;
        self.record(Action::SelectNode {
            tree: tree.path().to_string(),
            key: key.to_string(),
        });
        Ok(())
    }

    fn double_click_tree_node(&self, tree: &ElementRef, key: &str) -> BridgeResult<()> {
        self.live(tree)?;
        self.record(Action::DoubleClickNode {
            tree: tree.path().to_string(),
            key: key.to_string(),
        });
        Ok(())
    }

    fn session_status(&self) -> BridgeResult<Option<SessionStatus>> {
        self.connected()?;
        Ok(self.state().status)
    }

    fn set_history_enabled(&self, enabled: bool) -> BridgeResult<()> {
        self.connected()?;
        self.state().history_enabled = enabled;
        self.record(Action::History(enabled));
        Ok(())
    }

    fn release(&self) {
        self.record(Action::Release);
    }
}

impl ScreenMatcher for InMemorySession {
    fn find(&self, template: &Path, _confidence: f32) -> Result<Option<ScreenPoint>, MatchError> {
        let name = template
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| MatchError::Template(template.display().to_string()))?;
        let mut state = self.state();
        state.probes += 1;
        if state.failing_probes > 0 {
            state.failing_probes -= 1;
            return Err(MatchError::Capture("no screen".into()));
        }
        Ok(state.templates.get(name).copied())
    }

    fn click(&self, at: ScreenPoint) -> Result<(), MatchError> {
        let name = self.template_at(at)?;
        self.record(Action::Click(name));
        Ok(())
    }

    fn double_click(&self, at: ScreenPoint) -> Result<(), MatchError> {
        let name = self.template_at(at)?;
        self.record(Action::DoubleClickImage(name));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containers_exist_implicitly() {
        let session = InMemorySession::new();
        session.put("wnd[0]/usr/subA:B/txtX", "1");
        assert!(session.resolve_address("wnd[0]/usr").unwrap().is_some());
        assert!(session.resolve_address("wnd[0]/usr/subA:B").unwrap().is_some());
        assert!(session.resolve_address("wnd[1]/usr").unwrap().is_none());
    }

    #[test]
    fn child_names_drop_type_prefix() {
        let session = InMemorySession::new();
        session.put("wnd[0]/usr/subSUB0:SAPLMEGUI:0013/txtX", "");
        session.put("wnd[0]/usr/ctxtFIELD", "");
        let usr = session.require_address("wnd[0]/usr").unwrap();
        assert_eq!(
            session.child_names(&usr).unwrap(),
            vec!["FIELD".to_string(), "SUB0:SAPLMEGUI:0013".to_string()]
        );
    }

    #[test]
    fn triggers_fire_on_matching_action() {
        let session = InMemorySession::new();
        session.put("wnd[0]/tbar[0]/btn[11]", "");
        session.on_press("wnd[0]/tbar[0]/btn[11]", |screen| {
            screen.put("wnd[1]/usr/txtSPOP-TEXTLINE1", "popup");
        });

        assert_eq!(session.probe_dialog("wnd[1]/usr/txtSPOP-TEXTLINE1").unwrap(), None);
        let button = session.require_address("wnd[0]/tbar[0]/btn[11]").unwrap();
        session.press(&button).unwrap();
        assert_eq!(
            session.probe_dialog("wnd[1]/usr/txtSPOP-TEXTLINE1").unwrap().as_deref(),
            Some("popup")
        );
    }

    #[test]
    fn disconnected_session_fails_every_call() {
        let session = InMemorySession::new();
        session.put("wnd[0]/usr/txtX", "");
        session.disconnect();
        assert!(matches!(
            session.resolve_address("wnd[0]/usr/txtX"),
            Err(BridgeError::Disconnected(_))
        ));
        assert!(session.session_status().is_err());
    }

    #[test]
    fn remove_drops_subtree() {
        let session = InMemorySession::new();
        session.put("wnd[1]/usr/lbl[7,5]", "msg");
        session.put("wnd[1]/tbar[0]/btn[0]", "");
        session.remove("wnd[1]");
        assert!(session.resolve_address("wnd[1]/usr/lbl[7,5]").unwrap().is_none());
    }
}
