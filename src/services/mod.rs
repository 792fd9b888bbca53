pub mod response_service;
pub mod template_flex;
pub mod template_save;

pub use response_service::*;
pub use template_flex::*;
pub use template_save::*;
