use std::sync::Arc;

use super::selection::{SelectModelEvent, SelectionSubscriber};
use crate::directory::AuditService;
use crate::models::user::user_id_from_dn;
use crate::models::{BindRecord, UserSummary};
use crate::search::{FacetedUserResolver, SearchError};

/// Detail panel for an audit bind record, with the bound user's record.
pub struct BindDetailView {
    audit: Arc<dyn AuditService>,
    resolver: FacetedUserResolver,
    selection: SelectionSubscriber,
    bind: BindRecord,
    user: UserSummary,
    message: Option<String>,
    load_error: Option<SearchError>,
}

impl BindDetailView {
    pub fn new(
        audit: Arc<dyn AuditService>,
        resolver: FacetedUserResolver,
        selection: SelectionSubscriber,
    ) -> Self {
        BindDetailView {
            audit,
            resolver,
            selection,
            bind: BindRecord::default(),
            user: UserSummary::default(),
            message: None,
            load_error: None,
        }
    }

    pub fn bind(&self) -> &BindRecord {
        &self.bind
    }

    pub fn user(&self) -> &UserSummary {
        &self.user
    }

    /// Status line for the selection, e.g. `Bind: uid=jdoe,... has been selected`.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Why the selected bind could not be read, if it could not.
    pub fn load_error(&self) -> Option<&SearchError> {
        self.load_error.as_ref()
    }

    /// Apply a pending selection, if any. Returns whether the view changed.
    pub async fn sync(&mut self) -> bool {
        if !self.selection.has_changed() {
            return false;
        }
        let selected = self.selection.latest();
        self.show(selected).await;
        true
    }

    /// Wait for the next selection and render it. `false` once the master is gone.
    pub async fn next(&mut self) -> bool {
        match self.selection.changed().await {
            Some(selected) => {
                self.show(selected).await;
                true
            }
            None => false,
        }
    }

    /// Render the bind with the given id directly.
    pub async fn show_id(&mut self, id: &str) {
        self.show(Some(SelectModelEvent { key: id.to_string() })).await;
    }

    async fn show(&mut self, selected: Option<SelectModelEvent>) {
        let Some(event) = selected else {
            self.bind = BindRecord::default();
            self.user = UserSummary::default();
            self.message = None;
            self.load_error = None;
            return;
        };

        self.load_error = None;
        self.bind = match self.audit.read_bind(self.resolver.session(), &event.key).await {
            Ok(bind) => bind,
            Err(e) => {
                log::debug!("bind {} not loaded: {e}", event.key);
                self.load_error = Some(SearchError::from(e));
                BindRecord::default()
            }
        };
        log::debug!("bind selected: {}", self.bind.req_dn);
        self.message = Some(format!("Bind: {} has been selected", self.bind.req_dn));
        self.user = self.bound_user().await;
    }

    async fn bound_user(&self) -> UserSummary {
        let Some(user_id) = user_id_from_dn(&self.bind.req_dn) else {
            return UserSummary::default();
        };
        self.resolver.lookup(&user_id).await.unwrap_or_default()
    }
}
