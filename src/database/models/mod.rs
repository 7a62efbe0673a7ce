pub mod identity;
pub mod post;

pub use identity::{Identity, DEFAULT_STATUS};
pub use post::{Owner, Post, PostWithOwner};
