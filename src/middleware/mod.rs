pub mod auth;
pub mod ensure_user;
pub mod response;

pub use auth::{jwt_auth_middleware, Identity};
pub use ensure_user::ensure_user_middleware;
pub use response::{ApiResponse, ApiResult};
