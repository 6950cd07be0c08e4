pub mod auth;

pub use auth::RequireAdmin;
