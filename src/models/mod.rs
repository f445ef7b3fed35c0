pub mod admin_user;
pub mod user_score;

pub use admin_user::*;
pub use user_score::*;
