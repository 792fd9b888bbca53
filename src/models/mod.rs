pub mod response;
pub mod template;

pub use response::*;
pub use template::*;
