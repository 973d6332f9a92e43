pub mod audit;
pub mod permission;
pub mod user;

pub use audit::{BindFilter, BindRecord};
pub use permission::{OrgUnitType, Permission};
pub use user::{UserSummary, UserTemplate};
