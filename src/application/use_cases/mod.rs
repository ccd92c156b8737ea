mod relay_chat;
mod validate_request;

pub use relay_chat::*;
pub use validate_request::*;
