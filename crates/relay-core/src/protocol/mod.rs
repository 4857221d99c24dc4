//! Wire protocol: command records, stream framing, and discovery datagrams.

pub mod codec;
pub mod discovery;
pub mod messages;
