pub mod auth;
pub mod error;
pub mod ids;

pub use auth::CurrentUser;
pub use error::AppError;
pub use ids::EntityId;
