mod health;
mod links;
mod shared;

pub use health::health_handler;
pub use links::{
    create_link_handler, delete_link_handler, get_link_handler, list_links_handler,
    revoke_link_handler,
};
pub use shared::{resolve_shared_handler, unavailable_shared_handler};
