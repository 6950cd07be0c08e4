pub mod auth_gate;
pub mod qr;
pub mod sessions;

pub use auth_gate::{AdminCredential, AuthGate};
pub use sessions::{AdminSession, SessionStore};
