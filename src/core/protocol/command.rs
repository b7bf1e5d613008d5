// src/core/protocol/command.rs

//! The two supported operations and how their tokens are decoded.

/// The literal token requesting a file.
pub const GET_TOKEN: &str = "-g";
/// The literal token requesting a directory listing.
pub const LIST_TOKEN: &str = "-l";

/// The largest command token a server will read from a peer.
pub const MAX_COMMAND_LEN: usize = 1024;
/// The largest filename a server will read from a peer.
pub const MAX_FILENAME_LEN: usize = 4096;

/// The first thing a client sends: which operation it wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    List,
    Get,
    /// Anything that is not exactly one of the known tokens, kept for logging.
    Unknown(String),
}

impl Verb {
    /// Decodes a command token. Only an exact, whole-buffer match counts:
    /// prefixes, case variants and trailing bytes are all `Unknown`.
    pub fn decode(bytes: &[u8]) -> Self {
        match bytes {
            b"-l" => Verb::List,
            b"-g" => Verb::Get,
            other => Verb::Unknown(String::from_utf8_lossy(other).into_owned()),
        }
    }

    /// The wire token for this verb.
    pub fn token(&self) -> &str {
        match self {
            Verb::List => LIST_TOKEN,
            Verb::Get => GET_TOKEN,
            Verb::Unknown(token) => token,
        }
    }
}

/// A fully received request, after any filename has arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Get { filename: String },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::List => "list",
            Command::Get { .. } => "get",
        }
    }
}
