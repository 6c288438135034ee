pub mod error;
pub mod generate;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use error::ApiError;
pub use routes::create_router;
