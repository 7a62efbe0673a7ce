pub mod format;

pub use format::{AuthData, CreatorView, DeleteResult, IdentityView, PostView, StatusView};
