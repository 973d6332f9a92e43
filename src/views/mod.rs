//! View models for the console panels, independent of any UI toolkit.

pub mod bind_detail;
pub mod selection;
pub mod user_list;
pub mod user_picker;

pub use bind_detail::BindDetailView;
pub use selection::{
    MasterList, SelectModelEvent, SelectionPublisher, SelectionSubscriber, UserDetailView,
    selection_channel,
};
pub use user_list::UserListModel;
pub use user_picker::UserPicker;
