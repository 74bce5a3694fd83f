pub mod auth;
pub mod recovery;
pub mod response;

pub use auth::{AdminIdentity, AuthenticatedIdentity, MaybeIdentity};
pub use response::{ApiResponse, ApiResult};
