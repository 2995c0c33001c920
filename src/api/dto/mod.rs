//! Data Transfer Objects for REST request/response serialization.
//!
//! Request bodies use camelCase field names. Responses serialize the
//! domain records directly, in snake_case.

pub mod common_dto;
pub mod route_dto;
pub mod sample_dto;
pub mod session_dto;
pub mod settings_dto;

pub use common_dto::*;
pub use route_dto::*;
pub use sample_dto::*;
pub use session_dto::*;
pub use settings_dto::*;
