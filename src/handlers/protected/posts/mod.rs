// handlers/protected/posts/mod.rs - Post feed and single-post operations

pub mod collection; // GET, POST /api/posts
pub mod record;     // GET, PUT, DELETE /api/posts/:id

pub use collection::{posts_get, posts_post};
pub use record::{post_delete, post_get, post_put};
