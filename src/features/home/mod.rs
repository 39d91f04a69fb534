pub mod handler;

pub use handler::{allow_read_methods, create_home_router, not_found};
