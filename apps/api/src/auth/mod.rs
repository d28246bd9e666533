// Single-password gate for the editor: bcrypt check plus short-lived sessions.

pub mod handlers;
pub mod password;
pub mod session;

pub use password::PasswordGate;
pub use session::SessionStore;
