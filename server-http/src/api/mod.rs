pub mod requests;
pub mod responses;

pub use requests::{FaqRequest, ListQuery};
pub use responses::{ErrorResponse, FaqResponse, HealthResponse, MessageResponse};
