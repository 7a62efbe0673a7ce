pub mod account_service;
pub mod post_service;

pub use account_service::{AccountService, LoginInput, RegisterInput};
pub use post_service::{CreatePostInput, PostService, UpdatePostInput};
