//! Line-oriented echo chat over TCP.
//!
//! A server accepts one connection at a time. The first line a peer sends
//! is its display name; every line after that is answered with a fixed
//! three-line frame: a preamble, the echoed line prefixed with a tab, and
//! a sentinel marking the end of the response. Each module focuses on a
//! concrete responsibility:
//!
//! - [`cli`] parses the command-line interface for server and client modes.
//! - [`server`] accepts TCP connections sequentially and echoes each line
//!   back inside the response frame.
//! - [`client`] connects, sends the name line, and multiplexes prompts
//!   with response frames for a terminal user.
//! - [`protocol`] holds the wire constants plus helpers for async line
//!   reads and writes.
//!
//! Integration and unit tests use this crate directly to exercise the
//! session loop and wire framing.

pub mod cli;
pub mod client;
pub mod protocol;
pub mod server;
