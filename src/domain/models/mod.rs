mod bot_profile;
mod chat_message;
mod completion;
mod conversation;
mod origin;
mod system_prompt;

pub use bot_profile::*;
pub use chat_message::*;
pub use completion::*;
pub use conversation::*;
pub use origin::*;
pub use system_prompt::*;
