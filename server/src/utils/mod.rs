pub mod error;
pub mod response;
pub mod status;

pub use error::AppError;
