//! Tab selector
//!
//! Tabs are the host's descendants with `slot="tab"`, panels those with
//! `slot="panel"`; both are queried fresh on every operation and paired by
//! position. The selected index is the source of truth for rendering. The
//! host's `selected` attribute is both its initializer and an external
//! control channel:
//! ```text
//! click / key ──> index ──> write `selected` ──> attribute_changed ──> render + notify
//! slot change ─────────────────────────────────────────────────────> render
//! ```

use std::collections::VecDeque;

use generic_dom::{Document, ElementId, KeyboardEvent};

use crate::error::TabsError;
use crate::event::SelectedChanged;
use crate::keymap::{Intent, KeyMap};
use crate::policy::IndexPolicy;
use crate::Result;

pub const TAG_NAME: &str = "generic-tabs";
pub const SELECTED_ATTRIBUTE: &str = "selected";
pub const OBSERVED_ATTRIBUTES: &[&str] = &[SELECTED_ATTRIBUTE];
pub const TAB_SLOT: &str = "tab";
pub const PANEL_SLOT: &str = "panel";
pub const TAB_ID_PREFIX: &str = "generic-tab-";
pub const DEFAULT_LABEL: &str = "tablist";

pub type SelectedListener = Box<dyn FnMut(&SelectedChanged) + Send>;

pub struct TabSelector {
    document: Document,
    /// The `generic-tabs` element this instance is attached to
    host: ElementId,
    /// Internal `role="tablist"` container, not part of the light tree
    tablist: ElementId,
    selected_index: usize,
    /// Trimmed text of the selected tab as of the last render
    value: Option<String>,
    is_attached: bool,
    policy: IndexPolicy,
    default_label: String,
    /// Values this instance wrote into `selected` while rendering, in write
    /// order. The matching attribute records are echoes, not selections.
    reflections: VecDeque<String>,
    listeners: Vec<SelectedListener>,
}

impl TabSelector {
    pub fn new(document: Document, host: ElementId) -> Result<Self> {
        let tablist = document.create_element("div");
        document.set_attribute(tablist, "part", "tablist")?;
        document.set_attribute(tablist, "role", "tablist")?;

        Ok(Self {
            document,
            host,
            tablist,
            selected_index: 0,
            value: None,
            is_attached: false,
            policy: IndexPolicy::default(),
            default_label: DEFAULT_LABEL.to_string(),
            reflections: VecDeque::new(),
            listeners: Vec::new(),
        })
    }

    pub fn with_policy(mut self, policy: IndexPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Label used for the tab list when the host has no `label` attribute
    pub fn with_default_label(mut self, label: impl Into<String>) -> Self {
        self.default_label = label.into();
        self
    }

    pub fn host(&self) -> ElementId {
        self.host
    }

    pub fn tablist(&self) -> ElementId {
        self.tablist
    }

    pub fn selected(&self) -> usize {
        self.selected_index
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is_attached(&self) -> bool {
        self.is_attached
    }

    pub fn tabs(&self) -> Result<Vec<ElementId>> {
        Ok(self.document.query_slot(self.host, TAB_SLOT)?)
    }

    pub fn panels(&self) -> Result<Vec<ElementId>> {
        Ok(self.document.query_slot(self.host, PANEL_SLOT)?)
    }

    pub fn subscribe(&mut self, listener: SelectedListener) {
        self.listeners.push(listener);
    }

    /// Host was inserted into the live document.
    ///
    /// Reads the initial index from `selected` and labels the tab list. The
    /// first render happens on the slot change that follows attachment.
    pub fn connected(&mut self) -> Result<()> {
        self.selected_index = match self.document.get_attribute(self.host, SELECTED_ATTRIBUTE)? {
            Some(raw) => parse_index(&raw).unwrap_or_else(|err| {
                tracing::warn!(host = %self.host, error = %err, "Ignoring initial selected value");
                0
            }),
            None => 0,
        };

        let label = self
            .document
            .get_attribute(self.host, "label")?
            .unwrap_or_else(|| self.default_label.clone());
        self.document.set_attribute(self.tablist, "aria-label", &label)?;

        self.is_attached = true;

        tracing::debug!(host = %self.host, index = self.selected_index, "Tabs connected");

        Ok(())
    }

    /// Host was removed from the live document; input is ignored until it
    /// is connected again.
    pub fn disconnected(&mut self) {
        self.is_attached = false;
        tracing::debug!(host = %self.host, "Tabs disconnected");
    }

    /// Programmatic selection. Goes through the same attribute path as an
    /// external write: `selected()` changes, the render runs and the
    /// notification fires once the attribute record is delivered.
    pub fn set_selected(&mut self, index: usize) -> Result<()> {
        self.document
            .set_attribute(self.host, SELECTED_ATTRIBUTE, &index.to_string())?;
        Ok(())
    }

    /// Reaction to a write of an observed attribute.
    ///
    /// Only a `selected` value that differs from the previous one counts as a
    /// selection change. Echoes of this instance's own render writes are
    /// dropped here, which is what stops the attribute/render loop.
    ///
    /// A rejected render leaves the index at the last rendered value; the
    /// attribute keeps the rejected text until the next write.
    pub fn attribute_changed(
        &mut self,
        name: &str,
        old_value: Option<&str>,
        new_value: Option<&str>,
    ) -> Result<()> {
        if name != SELECTED_ATTRIBUTE {
            return Ok(());
        }

        if self.reflections.front().map(String::as_str) == new_value && new_value.is_some() {
            self.reflections.pop_front();
            return Ok(());
        }

        if old_value == new_value {
            return Ok(());
        }

        let index = match new_value {
            Some(raw) => parse_index(raw)?,
            None => 0,
        };

        tracing::debug!(
            host = %self.host,
            from = self.selected_index,
            to = index,
            "Selected attribute changed"
        );

        let previous = self.selected_index;
        self.selected_index = index;
        self.update_active(true).inspect_err(|_| {
            self.selected_index = previous;
        })
    }

    /// Reaction to tabs or panels being added, removed or reassigned.
    /// Renders without notifying.
    pub fn slot_changed(&mut self) -> Result<()> {
        self.update_active(false)
    }

    /// Pointer activation. Returns whether the click selected a tab.
    pub fn on_click(&mut self, target: ElementId) -> Result<bool> {
        if !self.is_attached {
            return Ok(false);
        }
        if self.document.get_attribute(target, "role")?.as_deref() != Some("tab") {
            return Ok(false);
        }

        let Some(position) = self.tabs()?.iter().position(|&tab| tab == target) else {
            return Ok(false);
        };

        self.selected_index = position;
        self.write_selected()?;
        self.focus_selected()?;
        Ok(true)
    }

    /// Key press with focus inside the tab list. Returns whether the key was
    /// recognized; only previous/next suppress the default action.
    pub fn on_key_down(&mut self, event: &mut KeyboardEvent) -> Result<bool> {
        if !self.is_attached {
            return Ok(false);
        }
        let Some(intent) = KeyMap::lookup(event.key_code) else {
            return Ok(false);
        };

        let count = self.tabs()?.len();
        if count == 0 {
            return Ok(false);
        }

        if matches!(intent, Intent::Previous | Intent::Next) {
            event.prevent_default();
        }

        let from = self.selected_index;
        self.selected_index = navigate(intent, from, count);

        tracing::debug!(
            host = %self.host,
            intent = ?intent,
            from,
            to = self.selected_index,
            "Keyboard navigation"
        );

        self.write_selected()?;
        self.focus_selected()?;
        Ok(true)
    }

    fn write_selected(&self) -> Result<()> {
        self.document.set_attribute(
            self.host,
            SELECTED_ATTRIBUTE,
            &self.selected_index.to_string(),
        )?;
        Ok(())
    }

    fn focus_selected(&self) -> Result<()> {
        if let Some(&tab) = self.tabs()?.get(self.selected_index) {
            self.document.focus(tab)?;
        }
        Ok(())
    }

    /// Mirror the index into the host attribute as part of a render
    fn reflect_selected(&mut self, index: usize) -> Result<()> {
        let value = index.to_string();
        if self
            .document
            .get_attribute(self.host, SELECTED_ATTRIBUTE)?
            .as_deref()
            == Some(value.as_str())
        {
            return Ok(());
        }

        self.reflections.push_back(value.clone());
        self.document
            .set_attribute(self.host, SELECTED_ATTRIBUTE, &value)?;
        Ok(())
    }

    fn resolve_index(&mut self, len: usize) -> Result<usize> {
        if self.selected_index < len {
            return Ok(self.selected_index);
        }

        match self.policy {
            IndexPolicy::Strict => Err(TabsError::IndexOutOfRange {
                index: self.selected_index,
                len,
            }),
            IndexPolicy::Clamp => {
                tracing::warn!(
                    host = %self.host,
                    index = self.selected_index,
                    len,
                    "Clamping selected index"
                );
                self.selected_index = len - 1;
                Ok(self.selected_index)
            }
        }
    }

    /// Full render of per-item state from the selected index.
    fn update_active(&mut self, notify: bool) -> Result<()> {
        let tabs = self.tabs()?;
        let panels = self.panels()?;

        if tabs.is_empty() {
            return Ok(());
        }
        if tabs.len() != panels.len() {
            tracing::debug!(
                host = %self.host,
                tabs = tabs.len(),
                panels = panels.len(),
                "Tab and panel counts differ"
            );
        }

        let selected = self.resolve_index(tabs.len())?;
        let doc = self.document.clone();

        for (i, &tab) in tabs.iter().enumerate() {
            let panel = panels.get(i).copied();

            if i == selected {
                self.reflect_selected(selected)?;
                doc.set_attribute(tab, "selected", "")?;
                doc.set_attribute(tab, "aria-selected", "true")?;
                doc.remove_attribute(tab, "tabindex")?;
                if let Some(panel) = panel {
                    doc.remove_attribute(panel, "hidden")?;
                }
                self.value = Some(doc.text_content(tab)?.trim().to_string());
            } else {
                doc.remove_attribute(tab, "selected")?;
                doc.set_attribute(tab, "aria-selected", "false")?;
                doc.set_attribute(tab, "tabindex", "-1")?;
                if let Some(panel) = panel {
                    doc.set_attribute(panel, "hidden", "")?;
                }
            }

            let tab_id = format!("{TAB_ID_PREFIX}{i}");
            doc.set_attribute(tab, "role", "tab")?;
            doc.set_attribute(tab, "id", &tab_id)?;
            doc.set_attribute(tab, "aria-controls", &tab_id)?;
            if let Some(panel) = panel {
                doc.set_attribute(panel, "role", "tabpanel")?;
                doc.set_attribute(panel, "aria-labelledby", &tab_id)?;
            }
        }

        if notify {
            self.dispatch(SelectedChanged::new(selected));
        }

        Ok(())
    }

    fn dispatch(&mut self, event: SelectedChanged) {
        tracing::debug!(host = %self.host, detail = event.detail, "Dispatching selected-changed");
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

/// Parse a `selected` attribute value. Empty means 0; anything that is not
/// a non-negative integer is rejected.
fn parse_index(raw: &str) -> Result<usize> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse()
        .map_err(|_| TabsError::InvalidSelected(raw.to_string()))
}

/// Index reached from `current` by `intent` in a list of `count` tabs.
/// Previous and next wrap around.
fn navigate(intent: Intent, current: usize, count: usize) -> usize {
    let last = count - 1;
    match intent {
        Intent::Previous => {
            if current == 0 {
                last
            } else {
                (current - 1).min(last)
            }
        }
        Intent::Next => {
            if current >= last {
                0
            } else {
                current + 1
            }
        }
        Intent::First => 0,
        Intent::Last => last,
    }
}
