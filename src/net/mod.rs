//! Network edges of the app.
//!
//! - `provider` — the outbound multimodal chat-completion call (server side)
//! - `upload`   — the client's multipart POST to the analyze endpoint, with
//!   byte-level progress reporting

pub mod provider;
pub mod upload;
