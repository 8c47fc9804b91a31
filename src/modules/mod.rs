pub mod auth;
pub mod users;

pub use self::auth::AuthService;
pub use self::users::UserStore;
