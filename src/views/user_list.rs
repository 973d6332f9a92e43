use crate::search::{FacetedUserResolver, ResolvedList, SearchCriterion, SearchError};

struct Memo {
    generation: u64,
    users: ResolvedList,
}

/// List model behind a user list panel.
///
/// Holds the criterion and bound resolver of one panel instance and memoizes
/// the last resolved list for one render cycle. Any change of session,
/// criterion, or a detach bumps the generation and drops the memo.
pub struct UserListModel {
    resolver: FacetedUserResolver,
    criterion: SearchCriterion,
    generation: u64,
    memo: Option<Memo>,
}

impl UserListModel {
    pub fn new(resolver: FacetedUserResolver, criterion: SearchCriterion) -> Self {
        UserListModel {
            resolver,
            criterion,
            generation: 0,
            memo: None,
        }
    }

    pub fn criterion(&self) -> &SearchCriterion {
        &self.criterion
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loaded(&self) -> bool {
        self.memo.as_ref().is_some_and(|m| m.generation == self.generation)
    }

    /// The list for the current render cycle, resolving on first access.
    /// Failures are returned, not memoized.
    pub async fn object(&mut self) -> Result<&ResolvedList, SearchError> {
        let memo = match self.memo.take() {
            Some(memo) if memo.generation == self.generation => memo,
            _ => {
                let users = self.resolver.resolve(&self.criterion).await?;
                log::debug!(
                    "user list loaded {} users (generation {})",
                    users.len(),
                    self.generation
                );
                Memo {
                    generation: self.generation,
                    users,
                }
            }
        };
        Ok(&self.memo.insert(memo).users)
    }

    /// Replace the list for the current generation, e.g. after an edit panel
    /// saved a user.
    pub fn set_object(&mut self, users: ResolvedList) {
        self.memo = Some(Memo {
            generation: self.generation,
            users,
        });
    }

    pub fn set_criterion(&mut self, criterion: SearchCriterion) {
        if criterion != self.criterion {
            self.criterion = criterion;
            self.invalidate();
        }
    }

    /// Swap in a resolver bound to a different session.
    pub fn rebind(&mut self, resolver: FacetedUserResolver) {
        self.resolver = resolver;
        self.invalidate();
    }

    /// End of render cycle.
    pub fn detach(&mut self) {
        self.invalidate();
    }

    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.memo = None;
    }
}
