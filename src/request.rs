//! HTTP request accumulation.
//!
//! A [`RequestBuffer`] owns a fixed byte buffer and accumulates request
//! bytes as the transport delivers them.  Parsing is resumable: each
//! [`push`](RequestBuffer::push) continues from the position and sub-state
//! the previous call left behind, never re-scanning committed bytes, so the
//! parsed result is identical no matter how the request was fragmented.
//!
//! Parsed fields are `(start, end)` spans into the owned buffer — no copies
//! are made.  The [`Request`] view resolves spans to string slices on
//! demand.

use heapless::Vec;

use crate::ascii::{COLON, CR, LF, SP, atoi};
use crate::header::{
    ConnType, HDR_ACCEPT, HDR_ACCEPT_ENCODING, HDR_ACCEPT_LANGUAGE, HDR_CONNECTION,
    HDR_CONTENT_LENGTH, HDR_CONTENT_TYPE, HDR_COOKIE, HDR_HOST, HDR_KEEP_ALIVE, HDR_USER_AGENT,
};
use crate::scan::{Charset, Scanner};

/// Maximum number of query parameters stored per request.  Parameters past
/// this count are still parsed, but discarded.
pub const MAX_PARAMS: usize = 16;

/// Bytes allowed in a URI, a query key/value, or a header name.
pub const URI_CHARS: Charset = Charset::EMPTY
    .with_range(b'0', b'9')
    .with_range(b'A', b'Z')
    .with_range(b'a', b'z')
    .with_bytes(b"%-./_");

/// Method such as GET, POST, DELETE etc.  `NONE` marks a token that matched
/// no known method; that alone is not a parse error.
#[allow(missing_docs)]
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Method {
    #[default]
    NONE,
    GET,
    POST,
    HEAD,
    PUT,
    CONNECT,
    OPTIONS,
    DELETE,
    TRACE,
    PATCH,
}

impl Method {
    fn from_bytes(value: &[u8]) -> Method {
        match value {
            b"GET" => Method::GET,
            b"POST" => Method::POST,
            b"HEAD" => Method::HEAD,
            b"PUT" => Method::PUT,
            b"CONNECT" => Method::CONNECT,
            b"OPTIONS" => Method::OPTIONS,
            b"DELETE" => Method::DELETE,
            b"TRACE" => Method::TRACE,
            b"PATCH" => Method::PATCH,
            _ => Method::NONE,
        }
    }
}

/// Public outcome of request accumulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestState {
    /// More bytes are needed.
    Unfinished,
    /// A complete request is available.
    Finished,
    /// The parser hit an unrecognized transition.  Terminal.
    SyntaxError,
    /// The request exceeded the reserved buffer space.  Terminal.
    TooBig,
}

/// Parser sub-state, resumed across `push` calls.
#[derive(Clone, Copy, PartialEq)]
enum Phase {
    Method,
    Uri,
    QueryKey,
    QueryValue,
    Version,
    Headers,
    Failed,
}

/// Half-open byte range into the accumulator's buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Span {
    start: usize,
    end: usize,
}

impl Span {
    fn of(start: usize, end: usize) -> Span {
        Span { start, end }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Param {
    key: Span,
    value: Option<Span>,
}

#[derive(Default)]
struct Fields {
    method: Method,
    uri: Span,
    params: Vec<Param, MAX_PARAMS>,
    num_params: usize,
    version: Span,
    host: Option<Span>,
    user_agent: Option<Span>,
    mime: Option<Span>,
    content_length: usize,
    accept: Option<Span>,
    accept_language: Option<Span>,
    accept_encoding: Option<Span>,
    cookie: Option<Span>,
    conn_type: ConnType,
    keep_alive: usize,
}

impl Fields {
    fn set_header(&mut self, buf: &[u8], name: Span, value: Span) {
        let name = &buf[name.start..name.end];
        let raw = &buf[value.start..value.end];
        match name {
            _ if name == HDR_HOST.as_bytes() => self.host = Some(value),
            _ if name == HDR_USER_AGENT.as_bytes() => self.user_agent = Some(value),
            _ if name == HDR_CONTENT_TYPE.as_bytes() => self.mime = Some(value),
            _ if name == HDR_CONTENT_LENGTH.as_bytes() => {
                self.content_length = atoi(raw).unwrap_or(0)
            }
            _ if name == HDR_ACCEPT.as_bytes() => self.accept = Some(value),
            _ if name == HDR_ACCEPT_LANGUAGE.as_bytes() => self.accept_language = Some(value),
            _ if name == HDR_ACCEPT_ENCODING.as_bytes() => self.accept_encoding = Some(value),
            _ if name == HDR_COOKIE.as_bytes() => self.cookie = Some(value),
            _ if name == HDR_CONNECTION.as_bytes() => self.conn_type = ConnType::from_bytes(raw),
            _ if name == HDR_KEEP_ALIVE.as_bytes() => self.keep_alive = atoi(raw).unwrap_or(0),
            _ => {}
        }
    }
}

/// Fixed-capacity request accumulator.  `N` is the full buffer size owned by
/// the connection slot; the request itself may only use the `limit` prefix
/// passed to [`new`](RequestBuffer::new), leaving the rest for response data.
pub struct RequestBuffer<const N: usize> {
    buf: [u8; N],
    limit: usize,
    len: usize,
    pos: usize,
    phase: Phase,
    state: RequestState,
    fields: Fields,
}

impl<const N: usize> RequestBuffer<N> {
    /// New empty accumulator accepting at most `limit` request bytes
    /// (clamped to `N`).
    pub fn new(limit: usize) -> Self {
        RequestBuffer {
            buf: [0; N],
            limit: limit.min(N),
            len: 0,
            pos: 0,
            phase: Phase::Method,
            state: RequestState::Unfinished,
            fields: Fields::default(),
        }
    }

    /// Current accumulation state.
    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Bytes accumulated so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when nothing has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Request bytes that may still be pushed before [`RequestState::TooBig`].
    pub fn avail(&self) -> usize {
        self.limit - self.len
    }

    /// Return to the freshly-constructed state, keeping the buffer.
    pub fn reset(&mut self) {
        self.len = 0;
        self.pos = 0;
        self.phase = Phase::Method;
        self.state = RequestState::Unfinished;
        self.fields = Fields::default();
    }

    /// The unused portion of the buffer past the accumulated request.
    pub(crate) fn tail(&self) -> &[u8] {
        &self.buf[self.len..]
    }

    /// Mutable unused portion of the buffer past the accumulated request.
    pub(crate) fn tail_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.len..]
    }

    /// Structured view over the parsed fields.  Meaningful once the state
    /// is [`RequestState::Finished`].
    pub fn request(&self) -> Request<'_> {
        Request {
            buf: &self.buf[..self.len],
            fields: &self.fields,
        }
    }

    /// Append `data` and resume parsing.  Returns the resulting state.
    /// Once a terminal state is reached, further pushes are ignored.
    pub fn push(&mut self, data: &[u8]) -> RequestState {
        if self.state != RequestState::Unfinished {
            return self.state;
        }
        if self.len + data.len() > self.limit {
            self.state = RequestState::TooBig;
            return self.state;
        }

        self.buf[self.len..self.len + data.len()].copy_from_slice(data);
        self.len += data.len();

        let buf: &[u8] = &self.buf[..self.len];
        let mut sc = Scanner::new(buf);
        sc.skip_n(self.pos);

        loop {
            if sc.is_end() {
                break;
            }
            match self.phase {
                Phase::Method => {
                    sc.skip_whitespace();
                    let start = sc.total();
                    if !sc.skip_until_byte(SP) {
                        break;
                    }
                    self.fields.method = Method::from_bytes(&buf[start..sc.total()]);
                    sc.skip_n(1);
                    self.pos = sc.total();
                    self.phase = Phase::Uri;
                }
                Phase::Uri => {
                    sc.skip_whitespace();
                    let start = sc.total();
                    sc.skip_while(&URI_CHARS);
                    let Some(next) = sc.peek() else { break };
                    match next {
                        b'?' => self.phase = Phase::QueryKey,
                        SP => self.phase = Phase::Version,
                        _ => {
                            self.phase = Phase::Failed;
                            continue;
                        }
                    }
                    self.fields.uri = Span::of(start, sc.total());
                    sc.skip_n(1);
                    self.pos = sc.total();
                }
                Phase::QueryKey => {
                    let start = sc.total();
                    sc.skip_while(&URI_CHARS);
                    let Some(next) = sc.peek() else { break };
                    match next {
                        b'&' => self.phase = Phase::QueryKey,
                        b'=' => self.phase = Phase::QueryValue,
                        SP => self.phase = Phase::Version,
                        _ => {
                            self.phase = Phase::Failed;
                            continue;
                        }
                    }
                    self.fields.num_params += 1;
                    let _ = self.fields.params.push(Param {
                        key: Span::of(start, sc.total()),
                        value: None,
                    });
                    sc.skip_n(1);
                    self.pos = sc.total();
                }
                Phase::QueryValue => {
                    let start = sc.total();
                    sc.skip_while(&URI_CHARS);
                    let Some(next) = sc.peek() else { break };
                    match next {
                        b'&' => self.phase = Phase::QueryKey,
                        SP => self.phase = Phase::Version,
                        _ => {
                            self.phase = Phase::Failed;
                            continue;
                        }
                    }
                    let value = Span::of(start, sc.total());
                    if self.fields.num_params <= MAX_PARAMS
                        && let Some(last) = self.fields.params.last_mut()
                    {
                        last.value = Some(value);
                    }
                    sc.skip_n(1);
                    self.pos = sc.total();
                }
                Phase::Version => {
                    sc.skip_whitespace();
                    let start = sc.total();
                    if !sc.skip_line() {
                        break;
                    }
                    self.fields.version = Span::of(start, strip_line_end(buf, start, sc.total()));
                    self.pos = sc.total();
                    self.phase = Phase::Headers;
                }
                Phase::Headers => {
                    sc.skip_inline_whitespace();
                    if sc.skip_byte(CR) || sc.skip_byte(LF) {
                        self.state = RequestState::Finished;
                        return self.state;
                    }
                    sc.skip_inline_whitespace();
                    let name_start = sc.total();
                    sc.skip_while(&URI_CHARS);
                    let Some(next) = sc.peek() else { break };
                    if next != COLON {
                        self.phase = Phase::Failed;
                        continue;
                    }
                    let name = Span::of(name_start, sc.total());
                    sc.skip_n(1);
                    sc.skip_inline_whitespace();
                    let value_start = sc.total();
                    if !sc.skip_line() {
                        break;
                    }
                    let value = Span::of(value_start, strip_line_end(buf, value_start, sc.total()));
                    self.fields.set_header(buf, name, value);
                    self.pos = sc.total();
                }
                Phase::Failed => {
                    self.state = RequestState::SyntaxError;
                    return self.state;
                }
            }
        }

        self.state
    }
}

/// End of a consumed line (`line_end` is just past the `\n`), with the
/// trailing CRLF stripped.
fn strip_line_end(buf: &[u8], start: usize, line_end: usize) -> usize {
    let mut end = line_end - 1; // the '\n'
    if end > start && buf[end - 1] == CR {
        end -= 1;
    }
    end
}

/// Zero-copy view of a parsed request.  All slices reference the
/// accumulator's buffer.
pub struct Request<'a> {
    buf: &'a [u8],
    fields: &'a Fields,
}

impl<'a> Request<'a> {
    fn text(&self, span: Span) -> &'a str {
        core::str::from_utf8(&self.buf[span.start..span.end]).unwrap_or("")
    }

    fn opt_text(&self, span: Option<Span>) -> Option<&'a str> {
        span.map(|s| self.text(s))
    }

    /// Request method tag.
    pub fn method(&self) -> Method {
        self.fields.method
    }

    /// URI path, without the query string.
    pub fn uri(&self) -> &'a str {
        self.text(self.fields.uri)
    }

    /// Protocol version, e.g. `HTTP/1.1`.
    pub fn version(&self) -> &'a str {
        self.text(self.fields.version)
    }

    /// `Host` header value, if present.
    pub fn host(&self) -> Option<&'a str> {
        self.opt_text(self.fields.host)
    }

    /// `User-Agent` header value, if present.
    pub fn user_agent(&self) -> Option<&'a str> {
        self.opt_text(self.fields.user_agent)
    }

    /// `Content-Type` header value, if present.
    pub fn content_type(&self) -> Option<&'a str> {
        self.opt_text(self.fields.mime)
    }

    /// `Content-Length` header value, or 0 when absent.
    pub fn content_length(&self) -> usize {
        self.fields.content_length
    }

    /// `Accept` header value, if present.
    pub fn accept(&self) -> Option<&'a str> {
        self.opt_text(self.fields.accept)
    }

    /// `Accept-Language` header value, if present.
    pub fn accept_language(&self) -> Option<&'a str> {
        self.opt_text(self.fields.accept_language)
    }

    /// `Accept-Encoding` header value, if present.
    pub fn accept_encoding(&self) -> Option<&'a str> {
        self.opt_text(self.fields.accept_encoding)
    }

    /// `Cookie` header value, if present.
    pub fn cookie(&self) -> Option<&'a str> {
        self.opt_text(self.fields.cookie)
    }

    /// `Connection` header directive.
    pub fn conn_type(&self) -> ConnType {
        self.fields.conn_type
    }

    /// `Keep-Alive` header value in seconds, or 0 when absent.
    pub fn keep_alive(&self) -> usize {
        self.fields.keep_alive
    }

    /// Number of stored query parameters (at most [`MAX_PARAMS`]).
    pub fn param_count(&self) -> usize {
        self.fields.params.len()
    }

    /// The `index`th stored query parameter as `(key, value)`.  A key
    /// without `=` has a `None` value.
    pub fn param(&self, index: usize) -> Option<(&'a str, Option<&'a str>)> {
        let param = self.fields.params.get(index)?;
        Some((self.text(param.key), self.opt_text(param.value)))
    }

    /// Value of the first stored query parameter named `key`.
    pub fn query(&self, key: &str) -> Option<&'a str> {
        self.fields
            .params
            .iter()
            .find(|p| self.text(p.key) == key)
            .and_then(|p| self.opt_text(p.value))
    }
}
