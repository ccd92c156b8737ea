use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat relay HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Bind to 0.0.0.0 instead of 127.0.0.1, exposing the server on all network interfaces
        #[arg(long)]
        public: bool,

        /// Answer with a scripted in-process provider instead of calling Groq
        #[arg(long)]
        mock_provider: bool,
    },

    /// Print the system prompt sent for a message
    Prompt {
        /// Latest user message, used as the conversation context
        message: String,

        /// Build the minimal prompt without injection hardening
        #[arg(long)]
        unprotected: bool,
    },
}
