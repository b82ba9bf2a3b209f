// Library surface for headless/integration tests and reuse.
// The terminal front-end lives in main.rs and ui.rs.
pub mod app_dirs;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod input;
pub mod language;
pub mod layout;
pub mod mistakes;
pub mod runtime;
pub mod session;
pub mod store;
pub mod theme;
pub mod util;

pub use engine::{FinishReport, SessionEngine};
pub use session::{Mode, SessionConfig};
