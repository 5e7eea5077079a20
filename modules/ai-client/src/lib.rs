pub mod claude;
pub mod error;
pub mod util;

pub use claude::Claude;
pub use error::AiError;
pub use util::{normalize_label, strip_code_blocks, truncate_to_char_boundary};
