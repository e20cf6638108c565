pub mod handlers;
pub mod middleware;
pub mod render;
pub mod routes;

pub use routes::create_router;
