pub mod cookie;
pub mod extract;
pub mod token;

pub use extract::CurrentUser;
pub use token::{SessionKeys, SessionUser};
