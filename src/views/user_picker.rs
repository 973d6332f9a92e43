use crate::models::{UserSummary, UserTemplate};
use crate::search::{FacetedUserResolver, ResolvedList, SearchCriterion};

/// Rows per picker page.
pub const PAGE_SIZE: usize = 10;

/// Modal user search: look users up by id prefix, page through the result,
/// pick one. Picking closes the picker.
pub struct UserPicker {
    resolver: FacetedUserResolver,
    search_value: Option<String>,
    users: ResolvedList,
    selection: Option<UserSummary>,
    open: bool,
}

impl UserPicker {
    pub fn new(resolver: FacetedUserResolver) -> Self {
        UserPicker {
            resolver,
            search_value: None,
            users: Vec::new(),
            selection: None,
            open: true,
        }
    }

    pub fn set_search_value(&mut self, value: &str) {
        self.search_value = Some(value.to_string());
    }

    /// Run the search. Clears any previous pick. Failures leave an empty list.
    pub async fn load(&mut self) -> &[UserSummary] {
        self.selection = None;
        self.open = true;
        let prefix = self.search_value.as_deref().unwrap_or("");
        let criterion = SearchCriterion::RawUserTemplate(UserTemplate::with_user_id(prefix));
        self.users = match self.resolver.resolve(&criterion).await {
            Ok(users) => users,
            Err(e) => {
                log::error!("user picker load caught {e}");
                Vec::new()
            }
        };
        &self.users
    }

    pub fn total(&self) -> usize {
        self.users.len()
    }

    pub fn page_count(&self) -> usize {
        self.users.len().div_ceil(PAGE_SIZE)
    }

    /// Rows of a zero-based page; empty past the end.
    pub fn page(&self, page: usize) -> &[UserSummary] {
        let start = page.saturating_mul(PAGE_SIZE).min(self.users.len());
        let end = (start + PAGE_SIZE).min(self.users.len());
        &self.users[start..end]
    }

    /// Pick a row by its index in the full result and close the picker.
    pub fn select(&mut self, index: usize) -> Option<&UserSummary> {
        let user = self.users.get(index)?.clone();
        self.open = false;
        let picked = self.selection.insert(user);
        Some(&*picked)
    }

    pub fn selection(&self) -> Option<&UserSummary> {
        self.selection.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}
