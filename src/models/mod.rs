pub mod point;
pub mod session;

pub use point::{CursorPosition, TrajectoryPoint};
pub use session::{Session, SessionInfo, SessionStatus};
