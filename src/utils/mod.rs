pub mod logging;
pub mod text;

pub use text::{truncate_text, truncate_with_ellipsis};
