//! Master/detail synchronization.
//!
//! The master list publishes the identity key of the selected row over a
//! `watch` channel; detail views re-fetch the record by that key. Only the
//! latest selection matters, so intermediate selections may be skipped.

use std::cmp::Ordering;

use tokio::sync::watch;

use crate::models::UserSummary;
use crate::models::user::cmp_user_id;
use crate::search::{FacetedUserResolver, ResolvedList};

/// Selection of an entity, identified by its durable key (user id, bind id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectModelEvent {
    pub key: String,
}

pub struct SelectionPublisher {
    tx: watch::Sender<Option<SelectModelEvent>>,
}

pub struct SelectionSubscriber {
    rx: watch::Receiver<Option<SelectModelEvent>>,
}

pub fn selection_channel() -> (SelectionPublisher, SelectionSubscriber) {
    let (tx, rx) = watch::channel(None);
    (SelectionPublisher { tx }, SelectionSubscriber { rx })
}

impl SelectionPublisher {
    pub fn publish(&self, key: &str) {
        self.tx.send_replace(Some(SelectModelEvent {
            key: key.to_string(),
        }));
    }

    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    /// Another detail view listening to the same master.
    pub fn subscribe(&self) -> SelectionSubscriber {
        SelectionSubscriber {
            rx: self.tx.subscribe(),
        }
    }
}

impl SelectionSubscriber {
    /// Latest selection, marking it seen.
    pub fn latest(&mut self) -> Option<SelectModelEvent> {
        self.rx.borrow_and_update().clone()
    }

    /// Whether a selection was published since the last `latest()`.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next selection. `None` once the publisher is gone.
    pub async fn changed(&mut self) -> Option<Option<SelectModelEvent>> {
        self.rx.changed().await.ok()?;
        Some(self.latest())
    }
}

/// Master side: a resolved list plus the key of the selected row.
pub struct MasterList {
    users: ResolvedList,
    selected: Option<String>,
    publisher: SelectionPublisher,
}

impl MasterList {
    pub fn new(users: ResolvedList, publisher: SelectionPublisher) -> Self {
        MasterList {
            users,
            selected: None,
            publisher,
        }
    }

    pub fn users(&self) -> &[UserSummary] {
        &self.users
    }

    pub fn publisher(&self) -> &SelectionPublisher {
        &self.publisher
    }

    /// Select the row at `index` and publish its user id.
    pub fn select(&mut self, index: usize) -> Option<&UserSummary> {
        let user = self.users.get(index)?;
        log::debug!("selected user {}", user.user_id);
        self.publisher.publish(&user.user_id);
        self.selected = Some(user.user_id.clone());
        Some(user)
    }

    pub fn selection(&self) -> Option<&UserSummary> {
        let key = self.selected.as_deref()?;
        self.users
            .iter()
            .find(|u| cmp_user_id(&u.user_id, key) == Ordering::Equal)
    }

    /// Replace the rows. The selection survives only if its key is still listed.
    pub fn refresh(&mut self, users: ResolvedList) {
        self.users = users;
        if self.selected.is_some() && self.selection().is_none() {
            self.selected = None;
            self.publisher.clear();
        }
    }
}

/// Detail side: re-fetches the selected user by key.
pub struct UserDetailView {
    resolver: FacetedUserResolver,
    selection: SelectionSubscriber,
    user: UserSummary,
}

impl UserDetailView {
    pub fn new(resolver: FacetedUserResolver, selection: SelectionSubscriber) -> Self {
        UserDetailView {
            resolver,
            selection,
            user: UserSummary::default(),
        }
    }

    pub fn user(&self) -> &UserSummary {
        &self.user
    }

    /// Re-fetch the currently selected user. A key that no longer resolves
    /// renders the empty record.
    pub async fn refresh(&mut self) -> &UserSummary {
        let selected = self.selection.latest();
        self.user = self.load(selected).await;
        &self.user
    }

    /// Refresh only when a new selection is pending. Returns whether it did.
    pub async fn sync(&mut self) -> bool {
        if !self.selection.has_changed() {
            return false;
        }
        self.refresh().await;
        true
    }

    /// Wait for the next selection and render it. `None` once the master is gone.
    pub async fn next(&mut self) -> Option<&UserSummary> {
        let selected = self.selection.changed().await?;
        self.user = self.load(selected).await;
        Some(&self.user)
    }

    async fn load(&self, selected: Option<SelectModelEvent>) -> UserSummary {
        let Some(event) = selected else {
            return UserSummary::default();
        };
        match self.resolver.lookup(&event.key).await {
            Ok(user) => user,
            Err(e) => {
                log::debug!("detail lookup {} failed: {e}", event.key);
                UserSummary::default()
            }
        }
    }
}
