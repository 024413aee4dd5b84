pub mod claude;
pub mod error;
pub mod traits;
pub mod util;

pub use claude::Claude;
pub use error::AiError;
pub use traits::ContentGenerator;
pub use util::{extract_json_object, strip_code_blocks};
