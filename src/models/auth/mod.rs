pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{User, UserRecord};
pub use requests::{LoginRequest, SignupRequest};
pub use responses::{LoginResponse, RefreshTokenResponse, TokenVerificationResponse, UserInfoResponse};
