mod groq_client;
mod mock_completion;
mod sse_decoder;

pub use groq_client::*;
pub use mock_completion::*;
pub use sse_decoder::*;
