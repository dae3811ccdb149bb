pub mod session;
pub mod state;
mod test_session;

pub use session::ControlSession;
pub use state::SessionState;
