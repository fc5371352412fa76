//! Session hosting: paced reply delivery and the session registry.

mod manager;
mod paced;

pub use manager::SessionManager;
pub use paced::{PacedSession, Pacing, SessionSnapshot};
