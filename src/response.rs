//! HTTP response descriptors and head-line formatting.
//!
//! A [`Response`] only describes the response head; the body is streamed
//! separately through the connection machine.  Formatting follows the
//! truncation contract used throughout the crate: [`emit`](Response::emit)
//! never writes past the destination but always returns the full formatted
//! length, so a caller sizes or rejects by comparing against the space it
//! actually has.

use crate::ascii::Digits;
use crate::header::ConnType;

/// text/html
pub const MIME_TEXT_HTML: &str = "text/html";
/// text/javascript
pub const MIME_TEXT_JS: &str = "text/javascript";
/// text/plain
pub const MIME_TEXT_PLAIN: &str = "text/plain";
/// text/xml
pub const MIME_TEXT_XML: &str = "text/xml";
/// text/css
pub const MIME_TEXT_CSS: &str = "text/css";
/// image/gif
pub const MIME_IMAGE_GIF: &str = "image/gif";
/// image/jpeg
pub const MIME_IMAGE_JPEG: &str = "image/jpeg";
/// image/pjpeg
pub const MIME_IMAGE_PJPEG: &str = "image/pjpeg";
/// image/png
pub const MIME_IMAGE_PNG: &str = "image/png";
/// image/svg+xml
pub const MIME_IMAGE_SVG: &str = "image/svg+xml";
/// image/tiff
pub const MIME_IMAGE_TIFF: &str = "image/tiff";
/// image/vnd.microsoft.icon
pub const MIME_IMAGE_ICON: &str = "image/vnd.microsoft.icon";
/// image/vnd.wap.wbmp
pub const MIME_IMAGE_WBMP: &str = "image/vnd.wap.wbmp";

/// Default `Server` header value.
pub const SERVER_NAME: &str = "servlite";
/// Default content language.
pub const DEFAULT_CONTENT_LANGUAGE: &str = "en";

/// Response head descriptor.  Handlers mutate the prefilled descriptor in
/// place; the connection machine formats and queues it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Response {
    /// Status code, e.g. 200 or 404.
    pub code: u16,
    /// `Server` header value.
    pub server: &'static str,
    /// Content language advertised to the client.
    pub content_language: &'static str,
    /// `Content-Type` header value, typically one of the `MIME_*` constants.
    pub mime: &'static str,
    /// `Content-Length` header value; also bounds the body stream.
    pub content_length: usize,
    /// `Connection` header directive.
    pub conn_type: ConnType,
}

impl Response {
    /// Descriptor with the given status code and the stock defaults:
    /// `text/html`, zero length, `Connection: close`.
    pub fn new(code: u16) -> Response {
        Response {
            code,
            server: SERVER_NAME,
            content_language: DEFAULT_CONTENT_LANGUAGE,
            mime: MIME_TEXT_HTML,
            content_length: 0,
            conn_type: ConnType::Close,
        }
    }

    /// Format the head into `dest`, returning the full formatted length
    /// even when `dest` is too small to hold it.
    pub fn emit(&self, dest: &mut [u8]) -> usize {
        let mut out = Emit { dest, n: 0 };
        out.bytes(b"HTTP/1.1 ");
        out.bytes(Digits::from(u64::from(self.code)).as_bytes());
        out.bytes(b"\r\nServer: ");
        out.bytes(self.server.as_bytes());
        out.bytes(b"\r\nContent-Type: ");
        out.bytes(self.mime.as_bytes());
        out.bytes(b"\r\nContent-Length: ");
        out.bytes(Digits::from(self.content_length as u64).as_bytes());
        out.bytes(b"\r\nConnection: ");
        out.bytes(self.conn_type.as_str().as_bytes());
        out.bytes(b"\r\n\r\n");
        out.n
    }

    /// Length [`emit`](Response::emit) would produce.
    pub fn formatted_len(&self) -> usize {
        self.emit(&mut [])
    }
}

impl Default for Response {
    fn default() -> Response {
        Response::new(200)
    }
}

struct Emit<'a> {
    dest: &'a mut [u8],
    n: usize,
}

impl Emit<'_> {
    fn bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if self.n < self.dest.len() {
                self.dest[self.n] = byte;
            }
            self.n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn test_emit_exact_format() {
        let mut resp = Response::new(200);
        resp.mime = MIME_TEXT_PLAIN;
        resp.content_length = 1203;
        resp.conn_type = ConnType::KeepAlive;

        let mut dest = [0u8; 256];
        let n = resp.emit(&mut dest);
        assert_eq!(
            &dest[..n],
            b"HTTP/1.1 200\r\n\
              Server: servlite\r\n\
              Content-Type: text/plain\r\n\
              Content-Length: 1203\r\n\
              Connection: keep-alive\r\n\
              \r\n" as &[u8],
        );
    }

    #[test]
    fn test_emit_no_connection_directive() {
        let mut resp = Response::new(404);
        resp.conn_type = ConnType::None;
        let mut dest = [0u8; 256];
        let n = resp.emit(&mut dest);
        assert!(dest[..n].ends_with(b"Connection: \r\n\r\n"));
    }

    #[test]
    fn test_formatted_len_matches_emit() {
        let mut resp = Response::new(500);
        resp.content_length = 42;
        let mut dest = [0u8; 256];
        assert_eq!(resp.formatted_len(), resp.emit(&mut dest));
    }

    #[test]
    fn test_emit_truncation_contract() {
        let resp = Response::new(200);
        let full = resp.formatted_len();
        let mut big = std::vec![0u8; full];
        resp.emit(&mut big);
        for cap in 0..full {
            let mut small = std::vec![0u8; cap];
            // the count reports the full length, the prefix is intact
            assert_eq!(resp.emit(&mut small), full);
            assert_eq!(&small[..], &big[..cap]);
        }
    }

    #[test]
    fn test_head_rescan_round_trip() {
        use crate::ascii::{CR, LF};
        use crate::scan::{NumFormat, Scanner};

        let mut resp = Response::new(404);
        resp.mime = MIME_IMAGE_PNG;
        resp.content_length = 9000;
        let mut buf = [0u8; 256];
        let n = resp.emit(&mut buf);

        // re-scan the head with the generic scanner
        let mut sc = Scanner::new(&buf[..n]);
        let mut dest = [0u8; 64];
        let count = sc.read_until(&[b' '], &mut dest);
        assert_eq!(&dest[..count], b"HTTP/1.1");
        assert!(sc.skip_byte(b' '));
        let count = sc.read_number(&mut dest, NumFormat::ALL);
        assert_eq!(&dest[..count], b"404");
        assert!(sc.skip_line());

        let mut mime = std::string::String::new();
        let mut content_length = 0;
        loop {
            if sc.skip_byte(CR) {
                assert!(sc.skip_byte(LF));
                break;
            }
            let count = sc.read_until(&[b':'], &mut dest);
            let name = std::vec::Vec::from(&dest[..count]);
            assert!(sc.skip_byte(b':'));
            sc.skip_inline_whitespace();
            let count = sc.read_until(&[CR, LF], &mut dest);
            match name.as_slice() {
                b"Content-Type" => {
                    mime = std::string::String::from_utf8(dest[..count].into()).unwrap()
                }
                b"Content-Length" => {
                    content_length = crate::ascii::atoi(&dest[..count]).unwrap()
                }
                _ => {}
            }
            assert!(sc.skip_line());
        }
        assert!(sc.is_end());
        assert_eq!(mime, MIME_IMAGE_PNG);
        assert_eq!(content_length, 9000);
    }

    #[test]
    fn test_defaults() {
        let resp = Response::default();
        assert_eq!(resp.code, 200);
        assert_eq!(resp.mime, MIME_TEXT_HTML);
        assert_eq!(resp.content_length, 0);
        assert_eq!(resp.conn_type, ConnType::Close);
        assert_eq!(resp.content_language, DEFAULT_CONTENT_LANGUAGE);
    }
}
