pub mod controller;
pub mod loop_worker;
pub mod source;
pub mod system;

pub use controller::CaptureController;
pub use loop_worker::capture_loop;
pub use source::{CursorSource, SimulatedCursor};
pub use system::SystemCursor;
