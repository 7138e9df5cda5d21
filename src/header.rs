//! Recognized request header names.
//!
//! Header dispatch is exact and case-sensitive: `Host` is recognized,
//! `host` is not.  Unrecognized names are ignored by the request
//! accumulator rather than rejected.

/// Host
pub const HDR_HOST: &str = "Host";
/// User-Agent
pub const HDR_USER_AGENT: &str = "User-Agent";
/// Content-Type
pub const HDR_CONTENT_TYPE: &str = "Content-Type";
/// Content-Length
pub const HDR_CONTENT_LENGTH: &str = "Content-Length";
/// Accept
pub const HDR_ACCEPT: &str = "Accept";
/// Accept-Language
pub const HDR_ACCEPT_LANGUAGE: &str = "Accept-Language";
/// Accept-Encoding
pub const HDR_ACCEPT_ENCODING: &str = "Accept-Encoding";
/// Cookie
pub const HDR_COOKIE: &str = "Cookie";
/// Connection
pub const HDR_CONNECTION: &str = "Connection";
/// Keep-Alive
pub const HDR_KEEP_ALIVE: &str = "Keep-Alive";

/// Connection directive, from a request `Connection` header or in a
/// response descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnType {
    /// No directive seen.
    #[default]
    None,
    /// `close`
    Close,
    /// `keep-alive`
    KeepAlive,
}

impl ConnType {
    pub(crate) fn from_bytes(value: &[u8]) -> ConnType {
        match value {
            b"close" => ConnType::Close,
            b"keep-alive" => ConnType::KeepAlive,
            _ => ConnType::None,
        }
    }

    /// Wire form of the directive; `None` is the empty string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnType::None => "",
            ConnType::Close => "close",
            ConnType::KeepAlive => "keep-alive",
        }
    }
}
