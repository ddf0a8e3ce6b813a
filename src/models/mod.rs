mod auth_user;
mod catalog;
mod notification;
mod profile;
mod receipt;
mod subscription;

pub use auth_user::*;
pub use catalog::*;
pub use notification::*;
pub use profile::*;
pub use receipt::*;
pub use subscription::*;
