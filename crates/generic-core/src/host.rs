//! Component host
//!
//! Owns the document and every widget instance attached to it. All
//! reactions run synchronously: each public entry point ends by pumping the
//! mutation queue until it is empty, so a render triggered by one input has
//! finished before the caller gets control back.

use std::collections::{BTreeMap, BTreeSet};

use generic_dom::{Document, ElementId, KeyboardEvent, Mutation};
use generic_tabs::{SelectedListener, TabSelector, TabsError, OBSERVED_ATTRIBUTES, TAG_NAME};

use crate::config::Config;
use crate::error::CoreError;
use crate::Result;

pub struct Host {
    config: Config,
    document: Document,
    /// Widget instances keyed by their host element
    components: BTreeMap<ElementId, TabSelector>,
}

impl Host {
    pub fn new(config: Config) -> Self {
        Self::with_document(config, Document::new())
    }

    pub fn with_document(config: Config, document: Document) -> Self {
        Self {
            config,
            document,
            components: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn component(&self, host: ElementId) -> Option<&TabSelector> {
        self.components.get(&host)
    }

    /// Host elements of every known instance, in document id order
    pub fn components(&self) -> Vec<ElementId> {
        self.components.keys().copied().collect()
    }

    pub fn selected(&self, host: ElementId) -> Option<usize> {
        self.component(host).map(TabSelector::selected)
    }

    pub fn value(&self, host: ElementId) -> Option<String> {
        self.component(host)
            .and_then(|c| c.value().map(str::to_string))
    }

    /// Parse markup under `parent` and run the resulting reactions
    pub fn append_markup(&mut self, parent: ElementId, markup: &str) -> Result<Vec<ElementId>> {
        let inserted = self.document.parse_fragment(parent, markup)?;
        self.pump()?;
        Ok(inserted)
    }

    pub fn subscribe(&mut self, host: ElementId, listener: SelectedListener) -> Result<()> {
        self.components
            .get_mut(&host)
            .ok_or(CoreError::UnknownComponent(host))?
            .subscribe(listener);
        Ok(())
    }

    /// Programmatic selection through the `selected` property.
    ///
    /// Unlike an external attribute write, a value the widget rejects is
    /// returned to the caller; the widget keeps its previous selection.
    pub fn set_selected(&mut self, host: ElementId, index: usize) -> Result<()> {
        self.components
            .get_mut(&host)
            .ok_or(CoreError::UnknownComponent(host))?
            .set_selected(index)?;

        match self.dispatch(Some(host))? {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Pointer activation on `target`, delivered to the nearest enclosing
    /// widget. Returns whether a tab was selected.
    pub fn click(&mut self, target: ElementId) -> Result<bool> {
        let Some(owner) = self.owning_component(target)? else {
            return Ok(false);
        };

        let handled = match self.components.get_mut(&owner) {
            Some(component) => component.on_click(target),
            None => Ok(false),
        };
        let handled = settle(owner, handled)?.unwrap_or(false);

        self.pump()?;
        Ok(handled)
    }

    /// Key press on the focused element. Only widgets whose tab list holds
    /// the focus see it. Returns whether the default action was prevented.
    pub fn key_down(&mut self, key_code: u32) -> Result<bool> {
        let mut event = KeyboardEvent::new(key_code);
        let Some(focused) = self.document.focused() else {
            return Ok(false);
        };
        let Some(owner) = self.owning_component(focused)? else {
            return Ok(false);
        };
        if !self.focus_in_tablist(owner, focused)? {
            return Ok(false);
        }

        let result = match self.components.get_mut(&owner) {
            Some(component) => component.on_key_down(&mut event),
            None => Ok(false),
        };
        settle(owner, result)?;

        self.pump()?;
        Ok(event.default_prevented())
    }

    /// Upgrade new widget elements and deliver every pending mutation.
    pub fn pump(&mut self) -> Result<()> {
        self.dispatch(None).map(|_| ())
    }

    /// Pump loop. The first widget error raised by an attribute record on
    /// `origin` is handed back instead of being logged.
    fn dispatch(&mut self, origin: Option<ElementId>) -> Result<Option<TabsError>> {
        let mut rejected = None;
        loop {
            let mutations = self.document.take_mutations();
            if mutations.is_empty() {
                return Ok(rejected);
            }

            // Records that predate an upgrade were already accounted for by
            // the instance reading its initial state.
            let fresh = self.sync_connections()?;
            let mut slot_changes = BTreeSet::new();

            for mutation in mutations {
                match mutation {
                    Mutation::Attribute {
                        target,
                        name,
                        old_value,
                        new_value,
                    } => {
                        if name == "slot" {
                            if let Some(parent) = self.document.parent(target)? {
                                if let Some(owner) = self.owning_component(parent)? {
                                    slot_changes.insert(owner);
                                }
                            }
                        }

                        if fresh.contains(&target) || !OBSERVED_ATTRIBUTES.contains(&name.as_str())
                        {
                            continue;
                        }
                        if let Some(component) = self.components.get_mut(&target) {
                            let result = component.attribute_changed(
                                &name,
                                old_value.as_deref(),
                                new_value.as_deref(),
                            );
                            match result {
                                Err(err)
                                    if origin == Some(target)
                                        && rejected.is_none()
                                        && !matches!(err, TabsError::Dom(_)) =>
                                {
                                    rejected = Some(err);
                                }
                                result => {
                                    settle(target, result)?;
                                }
                            }
                        }
                    }
                    Mutation::ChildList { parent } => {
                        if let Some(owner) = self.owning_component(parent)? {
                            slot_changes.insert(owner);
                        }
                    }
                }
            }

            for owner in slot_changes {
                if fresh.contains(&owner) {
                    continue;
                }
                if let Some(component) = self.components.get_mut(&owner) {
                    if component.is_attached() {
                        let result = component.slot_changed();
                        settle(owner, result)?;
                    }
                }
            }
        }
    }

    /// Create instances for new `generic-tabs` elements and track
    /// attachment of existing ones. Returns the hosts that were upgraded or
    /// reattached in this pass.
    fn sync_connections(&mut self) -> Result<BTreeSet<ElementId>> {
        let mut fresh = BTreeSet::new();

        for element in self
            .document
            .find_by_tag(self.document.body(), TAG_NAME)?
        {
            if self.components.contains_key(&element) {
                continue;
            }

            let component = TabSelector::new(self.document.clone(), element)?
                .with_policy(self.config.index_policy)
                .with_default_label(self.config.tablist_label.clone());
            self.components.insert(element, component);

            tracing::info!(host = %element, "Upgraded {}", TAG_NAME);
            fresh.insert(element);
        }

        for (&element, component) in self.components.iter_mut() {
            let connected = self.document.is_connected(element)?;
            if connected && (fresh.contains(&element) || !component.is_attached()) {
                let result = component.connected().and_then(|_| component.slot_changed());
                settle(element, result)?;
                fresh.insert(element);
            } else if !connected && component.is_attached() {
                component.disconnected();
            }
        }

        Ok(fresh)
    }

    /// Nearest widget host at or above `node`
    fn owning_component(&self, node: ElementId) -> Result<Option<ElementId>> {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.components.contains_key(&id) {
                return Ok(Some(id));
            }
            current = self.document.parent(id)?;
        }
        Ok(None)
    }

    fn focus_in_tablist(&self, owner: ElementId, focused: ElementId) -> Result<bool> {
        let Some(component) = self.components.get(&owner) else {
            return Ok(false);
        };
        for tab in component.tabs()? {
            if self.document.contains(tab, focused)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Widget-level failures are reported and swallowed so one bad attribute
/// value does not stall the dispatch loop. Document failures propagate.
fn settle<T>(host: ElementId, result: std::result::Result<T, TabsError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(TabsError::Dom(err)) => Err(err.into()),
        Err(err) => {
            tracing::warn!(host = %host, error = %err, "Rejected tab selection");
            Ok(None)
        }
    }
}
