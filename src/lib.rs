//! # Servlite
//!
//! `servlite` is a **very** small poll-driven HTTP/1.1 server core aimed at
//! `no_std`, `no_alloc` firmware: devices with no OS, no heap, and no
//! threads, where the network stack delivers bytes in arbitrary fragments
//! and accepts outbound data a few bytes at a time.
//!
//! This crate provides:
//!
//! * an incremental byte-stream scanner (character classes, numeric and
//!   string lexers, a generic token classifier) usable for any streamed
//!   input.
//! * a resumable HTTP request accumulator that parses identically no matter
//!   how the request bytes are chunked.
//! * a response head formatter and a fixed-pool connection state machine
//!   driven by plain synchronous calls and byte-count flow control.
//!
//! This crate does **not** provide:
//!
//! * the transport itself (TCP reassembly, retransmission, timers) — the
//!   environment feeds events in through the [`server::Server`] operations.
//! * chunked transfer encoding, TLS, or request pipelining.
//!
//! ## Basic Use
//!
//! Create a [`server::Server`] with an implementation of
//! [`server::Transport`] (the non-blocking outbound side of your network
//! stack) and of [`server::RequestHandler`] (your application).  Report
//! connection events into the server (`on_accept`, `on_received`,
//! `on_sent`, `on_closed`) and call `drive_io()` on every poll tick.  Once
//! a response head is acknowledged the handler's `on_active` fires and the
//! application streams the body with `write_body`, retrying on later ticks
//! whatever did not fit.
//!
//! ## Example
//!
//! ```
//! use servlite::header::ConnType;
//! use servlite::request::Request;
//! use servlite::response::{Response, MIME_TEXT_PLAIN};
//! use servlite::server::{ConnState, RequestHandler, Server, Transport};
//!
//! // Outbound side of the network stack; here a growable capture buffer.
//! struct Loopback(Vec<u8>);
//!
//! impl Transport for Loopback {
//!     type Error = embedded_io::ErrorKind;
//!
//!     fn try_send(&mut self, _index: usize, data: &[u8]) -> Result<usize, Self::Error> {
//!         self.0.extend_from_slice(data);
//!         Ok(data.len())
//!     }
//!
//!     fn close(&mut self, _index: usize) -> Result<(), Self::Error> {
//!         Ok(())
//!     }
//! }
//!
//! struct Hello;
//!
//! impl RequestHandler for Hello {
//!     type Context = ();
//!
//!     fn handle_request(&mut self, req: Request<'_>, resp: &mut Response) -> Option<()> {
//!         if req.uri() != "/hello" {
//!             return None;
//!         }
//!         resp.mime = MIME_TEXT_PLAIN;
//!         resp.content_length = 5;
//!         resp.conn_type = ConnType::Close;
//!         Some(())
//!     }
//! }
//!
//! // two slots, 1024 byte buffers, 512 bytes reserved for the request
//! let mut server: Server<_, _, 2, 1024, 512> = Server::new(Loopback(Vec::new()), Hello);
//!
//! let index = server.on_accept().unwrap();
//! server.on_received(index, b"GET /hello HTTP/1.1\r\n\r\n");
//! assert_eq!(server.state(index), ConnState::WritingResponse);
//!
//! // the environment acknowledges the head; the connection goes active
//! let head = server.transport().0.len();
//! server.on_sent(index, head);
//! server.drive_io();
//! assert_eq!(server.state(index), ConnState::Active);
//!
//! assert_eq!(server.write_body(index, b"hello"), 5);
//! server.on_sent(index, 5);
//! server.drive_io();
//! assert_eq!(server.state(index), ConnState::Closed);
//! assert!(server.transport().0.starts_with(b"HTTP/1.1 200\r\n"));
//! assert!(server.transport().0.ends_with(b"hello"));
//! ```

#![no_std]
#![warn(missing_docs)]

mod ascii;
/// HTTP headers
pub mod header;
/// HTTP requests
pub mod request;
/// HTTP responses
pub mod response;
/// Incremental byte-stream scanning
pub mod scan;
/// HTTP server
pub mod server;
