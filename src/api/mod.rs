pub mod request;
pub mod response;
pub mod routes;

pub use response::CommonResponse;
pub use routes::{create_router, AppState};
