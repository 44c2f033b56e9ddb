pub mod render;

pub use render::{export_png, render_trajectory};
