pub mod ai;
pub mod chat;
pub mod history;
pub mod response;
pub mod state;
pub mod voice;

#[cfg(test)]
pub(crate) mod test_support;

pub use response::{ApiError, ApiResponse, ApiResult, api_error};
pub use state::AppState;
