//! Faceted user search: criterion classification, dispatch, ordering.

pub mod criterion;
pub mod error;
pub mod resolver;

pub use criterion::{SearchCriterion, SearchQuery, SearchRequest};
pub use error::SearchError;
pub use resolver::{FacetedUserResolver, ResolvedList, sort_by_user_id};
