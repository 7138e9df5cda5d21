//! Incremental byte-stream scanner.
//!
//! A [`Scanner`] is a cursor over either a fixed in-memory slice or a
//! pull-based [`ByteSource`] that is drained through a caller-provided
//! scratch buffer.  All operations are single-pass, allocation free, and
//! keep running totals of consumed bytes, lines and columns.
//!
//! Read operations share one truncation contract: the destination slice is
//! never written past its length, but the returned count is always the full
//! logical length of the matched input.  A caller detects truncation by
//! comparing the returned count against `dest.len()`.

use crate::ascii::{CR, LF};

/// A pull-based producer of input bytes for a streaming [`Scanner`].
pub trait ByteSource {
    /// Fill `dest` with more input, returning the number of bytes written.
    /// Returning zero means the source is exhausted for good.
    fn pull(&mut self, dest: &mut [u8]) -> usize;
}

/// A 256-entry byte membership table.
///
/// Built in const context and shared as `&Charset`.  Callers that need a
/// temporarily wider class (e.g. admitting `.` and `e` while lexing one
/// number) take a [`widened`](Charset::widened) copy scoped to that single
/// read instead of mutating a shared table.
#[derive(Clone)]
pub struct Charset([bool; 256]);

impl Charset {
    /// The empty set.
    pub const EMPTY: Charset = Charset([false; 256]);

    /// Returns a copy of the set with every byte of `bytes` added.
    pub const fn with_bytes(self, bytes: &[u8]) -> Charset {
        let mut table = self.0;
        let mut i = 0;
        while i < bytes.len() {
            table[bytes[i] as usize] = true;
            i += 1;
        }
        Charset(table)
    }

    /// Returns a copy of the set with the inclusive byte range `lo..=hi` added.
    pub const fn with_range(self, lo: u8, hi: u8) -> Charset {
        let mut table = self.0;
        let mut b = lo as usize;
        while b <= hi as usize {
            table[b] = true;
            b += 1;
        }
        Charset(table)
    }

    /// Membership test.
    pub const fn contains(&self, byte: u8) -> bool {
        self.0[byte as usize]
    }

    /// A scoped overlay: a copy of the set widened with `extras`, leaving
    /// the original untouched.
    pub fn widened(&self, extras: &[u8]) -> Charset {
        Charset(self.0).with_bytes(extras)
    }
}

/// Bytes allowed in an identifier (and in a naked string).
pub const IDENT_CHARS: Charset = Charset::EMPTY
    .with_range(b'0', b'9')
    .with_range(b'A', b'Z')
    .with_range(b'a', b'z')
    .with_bytes(b"_");

/// Numeric token format flags for [`Scanner::read_number`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NumFormat(u8);

impl NumFormat {
    /// Accept `0x1A2B` hex literals.
    pub const HEX_0X: NumFormat = NumFormat(1);
    /// Accept `0h1A2B` hex literals.
    pub const HEX_0H: NumFormat = NumFormat(2);
    /// Accept `0b0110` binary literals.
    pub const BINARY: NumFormat = NumFormat(4);
    /// Accept a single `.` fractional part.
    pub const FRACTION: NumFormat = NumFormat(8);
    /// Accept an `e`/`E` exponent with optional sign.
    pub const EXPONENT: NumFormat = NumFormat(16);
    /// Accept a leading `+` or `-`.
    pub const SIGN: NumFormat = NumFormat(32);
    /// All of the above.
    pub const ALL: NumFormat = NumFormat(0x3f);

    /// True if any flag of `other` is enabled in `self`.
    pub const fn has(self, other: NumFormat) -> bool {
        self.0 & other.0 != 0
    }
}

impl core::ops::BitOr for NumFormat {
    type Output = NumFormat;

    fn bitor(self, rhs: NumFormat) -> NumFormat {
        NumFormat(self.0 | rhs.0)
    }
}

/// String token format flags for [`Scanner::read_string`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrFormat(u8);

impl StrFormat {
    /// Accept `"string"`.
    pub const QUOTE: StrFormat = StrFormat(1);
    /// Accept `'string'`.
    pub const APOSTROPHE: StrFormat = StrFormat(2);
    /// Accept an unquoted identifier-charset string.
    pub const NAKED: StrFormat = StrFormat(4);
    /// Process `\r \n \t \b \f \\ \/ \"` escapes; unknown escapes pass
    /// through as the backslash followed by the escaped byte.
    pub const ESCAPE: StrFormat = StrFormat(8);
    /// Process `\uXXXX` escapes, emitted as UTF-8.
    pub const UNICODE: StrFormat = StrFormat(16);
    /// All of the above.
    pub const ALL: StrFormat = StrFormat(0x1f);

    /// True if any flag of `other` is enabled in `self`.
    pub const fn has(self, other: StrFormat) -> bool {
        self.0 & other.0 != 0
    }
}

impl core::ops::BitOr for StrFormat {
    type Output = StrFormat;

    fn bitor(self, rhs: StrFormat) -> StrFormat {
        StrFormat(self.0 | rhs.0)
    }
}

/// Classification of the token produced by [`Scanner::next_lexeme`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lexeme {
    /// End of input.
    End,
    /// A `// ...` line comment (the text after the slashes).
    Comment,
    /// An identifier-charset word.
    Ident,
    /// A single symbol byte.
    Symbol,
    /// A quoted string (the text between the quotes).
    Str,
    /// A numeric value, optionally with a leading `-`.
    Value,
}

enum Window<'a> {
    Fixed(&'a [u8]),
    Scratch(&'a mut [u8]),
}

impl Window<'_> {
    fn get(&self, index: usize) -> u8 {
        match self {
            Window::Fixed(data) => data[index],
            Window::Scratch(data) => data[index],
        }
    }
}

/// Cursor over streamed input.  See the [module docs](self) for the
/// truncation contract shared by the `read_*` operations.
pub struct Scanner<'a> {
    window: Window<'a>,
    pos: usize,
    end: usize,
    total: usize,
    line: usize,
    col: usize,
    source: Option<&'a mut dyn ByteSource>,
}

fn put(dest: &mut [u8], at: usize, byte: u8) {
    if at < dest.len() {
        dest[at] = byte;
    }
}

#[derive(Clone, Copy, PartialEq)]
enum NumState {
    Int,
    Frac,
    ExpSign,
    Exp,
    Hex,
    Bin,
}

impl<'a> Scanner<'a> {
    /// Scanner over a fixed slice.  Exhaustion is permanent end-of-input.
    pub fn new(data: &'a [u8]) -> Self {
        Scanner {
            end: data.len(),
            window: Window::Fixed(data),
            pos: 0,
            total: 0,
            line: 0,
            col: 0,
            source: None,
        }
    }

    /// Scanner that refills `scratch` from `source` whenever the current
    /// window is consumed.  End-of-input is reached once the source returns
    /// zero bytes.
    pub fn from_source(scratch: &'a mut [u8], source: &'a mut dyn ByteSource) -> Self {
        Scanner {
            window: Window::Scratch(scratch),
            pos: 0,
            end: 0,
            total: 0,
            line: 0,
            col: 0,
            source: Some(source),
        }
    }

    /// Total bytes consumed so far.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Lines consumed so far (`\n` delimited, counted from zero).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Column of the cursor within the current line, counted from zero.
    pub fn col(&self) -> usize {
        self.col
    }

    fn refill(&mut self) -> bool {
        if self.pos < self.end {
            return true;
        }
        let Some(source) = self.source.as_mut() else {
            return false;
        };
        let Window::Scratch(scratch) = &mut self.window else {
            return false;
        };
        let n = source.pull(scratch);
        self.pos = 0;
        self.end = n;
        n > 0
    }

    fn bump(&mut self) -> u8 {
        let c = self.window.get(self.pos);
        self.pos += 1;
        self.total += 1;
        self.col += 1;
        if c == LF {
            self.line += 1;
            self.col = 0;
        }
        c
    }

    /// Current byte, or `None` at end-of-input.  Triggers a refill when a
    /// source is attached.
    pub fn peek(&mut self) -> Option<u8> {
        if self.refill() {
            Some(self.window.get(self.pos))
        } else {
            None
        }
    }

    /// True once no more bytes can be obtained.
    pub fn is_end(&mut self) -> bool {
        !self.refill()
    }

    /// Consume every consecutive byte in `set`, returning the count.
    pub fn skip_while(&mut self, set: &Charset) -> usize {
        let mut n = 0;
        while let Some(c) = self.peek() {
            if !set.contains(c) {
                break;
            }
            self.bump();
            n += 1;
        }
        n
    }

    /// Consume up to `n` bytes, returning how many were actually consumed.
    pub fn skip_n(&mut self, n: usize) -> usize {
        for i in 0..n {
            if self.is_end() {
                return i;
            }
            self.bump();
        }
        n
    }

    /// Consume `byte` if it is the current byte.
    pub fn skip_byte(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.bump();
            return true;
        }
        false
    }

    /// Consume whitespace (any byte `<= 0x20`).  True if anything was skipped.
    pub fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while let Some(c) = self.peek() {
            if c > 0x20 {
                break;
            }
            self.bump();
            skipped = true;
        }
        skipped
    }

    /// Consume whitespace without crossing a line end.  True if anything
    /// was skipped.
    pub fn skip_inline_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while let Some(c) = self.peek() {
            if c > 0x20 || c == CR || c == LF {
                break;
            }
            self.bump();
            skipped = true;
        }
        skipped
    }

    /// Consume through the next `\n`.  False if end-of-input came first.
    pub fn skip_line(&mut self) -> bool {
        while let Some(c) = self.peek() {
            self.bump();
            if c == LF {
                return true;
            }
        }
        false
    }

    /// Consume until the cursor rests on `byte` (not consuming it).
    /// False if end-of-input came first.
    pub fn skip_until_byte(&mut self, byte: u8) -> bool {
        while let Some(c) = self.peek() {
            if c == byte {
                return true;
            }
            self.bump();
        }
        false
    }

    /// Like [`skip_while`](Scanner::skip_while), additionally copying the
    /// consumed bytes into `dest` under the truncation contract.
    pub fn read_while(&mut self, set: &Charset, dest: &mut [u8]) -> usize {
        let mut n = 0;
        while let Some(c) = self.peek() {
            if !set.contains(c) {
                break;
            }
            put(dest, n, c);
            self.bump();
            n += 1;
        }
        n
    }

    /// Consume and copy bytes up to (not including) the first byte found in
    /// `delims`, or end-of-input.
    pub fn read_until(&mut self, delims: &[u8], dest: &mut [u8]) -> usize {
        let mut n = 0;
        while let Some(c) = self.peek() {
            if delims.contains(&c) {
                break;
            }
            put(dest, n, c);
            self.bump();
            n += 1;
        }
        n
    }

    /// Consume and copy up to `n` bytes, returning how many were consumed.
    pub fn read_n(&mut self, dest: &mut [u8], n: usize) -> usize {
        let mut got = 0;
        while got < n {
            if self.is_end() {
                break;
            }
            put(dest, got, self.bump());
            got += 1;
        }
        got
    }

    /// Read one numeric token.  The accepted grammar is gated by `fmt`:
    /// optional sign, decimal digits, a single `.` fraction, an `e`/`E`
    /// exponent with optional sign, and `0x`/`0h`/`0b` radix prefixes.
    /// Stops at the first byte that cannot continue any enabled branch.
    pub fn read_number(&mut self, dest: &mut [u8], fmt: NumFormat) -> usize {
        let mut n = 0;
        let mut last = 0u8;
        let mut state = NumState::Int;

        loop {
            let Some(c) = self.peek() else { break };

            match state {
                NumState::ExpSign => {
                    if c == b'+' || c == b'-' {
                        put(dest, n, c);
                        self.bump();
                        n += 1;
                    }
                    state = NumState::Exp;
                    continue;
                }
                NumState::Hex => {
                    if c.is_ascii_hexdigit() {
                        put(dest, n, c);
                        self.bump();
                        n += 1;
                        continue;
                    }
                    break;
                }
                NumState::Bin => {
                    if c == b'0' || c == b'1' {
                        put(dest, n, c);
                        self.bump();
                        n += 1;
                        continue;
                    }
                    break;
                }
                NumState::Int | NumState::Frac | NumState::Exp => {}
            }

            if c.is_ascii_digit() {
                put(dest, n, c);
                last = c;
                self.bump();
                n += 1;
                continue;
            }
            if state == NumState::Int && c == b'.' && fmt.has(NumFormat::FRACTION) {
                put(dest, n, c);
                self.bump();
                n += 1;
                state = NumState::Frac;
                continue;
            }
            if matches!(state, NumState::Int | NumState::Frac)
                && (c == b'e' || c == b'E')
                && fmt.has(NumFormat::EXPONENT)
            {
                put(dest, n, c);
                self.bump();
                n += 1;
                state = NumState::ExpSign;
                continue;
            }
            if state == NumState::Int && last == b'0' && n == 1 {
                let hex = ((c == b'x' || c == b'X') && fmt.has(NumFormat::HEX_0X))
                    || ((c == b'h' || c == b'H') && fmt.has(NumFormat::HEX_0H));
                if hex {
                    put(dest, n, c);
                    self.bump();
                    n += 1;
                    state = NumState::Hex;
                    continue;
                }
                if (c == b'b' || c == b'B') && fmt.has(NumFormat::BINARY) {
                    put(dest, n, c);
                    self.bump();
                    n += 1;
                    state = NumState::Bin;
                    continue;
                }
            }
            if fmt.has(NumFormat::SIGN) && n == 0 && (c == b'+' || c == b'-') {
                put(dest, n, c);
                self.bump();
                n += 1;
                continue;
            }
            break;
        }

        n
    }

    /// Read one string token in the forms gated by `fmt`: double-quoted,
    /// apostrophe-quoted, or naked (identifier charset).  The returned count
    /// and the bytes placed in `dest` are the decoded content, without the
    /// surrounding quotes.
    pub fn read_string(&mut self, dest: &mut [u8], fmt: StrFormat) -> usize {
        let mut n = 0;
        let mut quote: Option<u8> = None;
        let mut opened = false;

        loop {
            let Some(c) = self.peek() else { break };

            if !opened {
                if (c == b'"' && fmt.has(StrFormat::QUOTE))
                    || (c == b'\'' && fmt.has(StrFormat::APOSTROPHE))
                {
                    quote = Some(c);
                    opened = true;
                    self.bump();
                    continue;
                }
                if fmt.has(StrFormat::NAKED) {
                    opened = true;
                    continue;
                }
                break;
            }

            if quote == Some(c) {
                self.bump();
                break;
            }

            if quote.is_none() && IDENT_CHARS.contains(c) {
                put(dest, n, c);
                self.bump();
                n += 1;
                continue;
            }

            if fmt.has(StrFormat::ESCAPE) && c == b'\\' {
                self.bump();
                let Some(escaped) = self.peek() else { break };
                if escaped == b'u' && fmt.has(StrFormat::UNICODE) {
                    self.bump();
                    match self.read_unicode_escape(dest, n) {
                        Some(total) => {
                            n = total;
                            continue;
                        }
                        None => break,
                    }
                }
                let decoded = match escaped {
                    b'r' => b'\r',
                    b'n' => b'\n',
                    b't' => b'\t',
                    b'b' => 0x08,
                    b'f' => 0x0c,
                    b'\\' => b'\\',
                    b'/' => b'/',
                    b'"' => b'"',
                    other => {
                        put(dest, n, b'\\');
                        n += 1;
                        other
                    }
                };
                put(dest, n, decoded);
                self.bump();
                n += 1;
                continue;
            }

            if quote.is_some() {
                put(dest, n, c);
                self.bump();
                n += 1;
                continue;
            }

            // naked string, byte outside the identifier charset
            break;
        }

        n
    }

    fn read_unicode_escape(&mut self, dest: &mut [u8], mut n: usize) -> Option<usize> {
        let mut code: u32 = 0;
        for _ in 0..4 {
            let digit = (self.peek()? as char).to_digit(16)?;
            code = code * 16 + digit;
            self.bump();
        }
        // from_u32 rejects unpaired surrogate halves
        let decoded = char::from_u32(code)?;
        let mut utf8 = [0u8; 4];
        for &byte in decoded.encode_utf8(&mut utf8).as_bytes() {
            put(dest, n, byte);
            n += 1;
        }
        Some(n)
    }

    /// Skip leading whitespace and classify the next token.  Returns the
    /// logical token length and its [`Lexeme`] kind.
    pub fn next_lexeme(&mut self, dest: &mut [u8]) -> (usize, Lexeme) {
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return (0, Lexeme::End);
        };

        if c == b'"' || c == b'\'' {
            self.skip_n(1);
            let n = self.read_until(&[c], dest);
            self.skip_byte(c);
            return (n, Lexeme::Str);
        }

        let minus = c == b'-';
        if minus {
            self.skip_n(1);
        }

        if self.peek().is_some_and(|d| d.is_ascii_digit()) {
            let numeric = IDENT_CHARS.widened(b".eExX-+");
            let n = if minus {
                put(dest, 0, b'-');
                let rest = if dest.is_empty() { dest } else { &mut dest[1..] };
                self.read_while(&numeric, rest) + 1
            } else {
                self.read_while(&numeric, dest)
            };
            return (n, Lexeme::Value);
        }

        if minus {
            put(dest, 0, b'-');
            return (1, Lexeme::Symbol);
        }

        if c == b'/' {
            self.skip_n(1);
            if self.peek() != Some(b'/') {
                put(dest, 0, b'/');
                return (1, Lexeme::Symbol);
            }
            self.skip_n(1);
            let n = self.read_until(&[CR, LF], dest);
            return (n, Lexeme::Comment);
        }

        let n = self.read_while(&IDENT_CHARS, dest);
        if n > 0 {
            return (n, Lexeme::Ident);
        }

        let n = self.read_n(dest, 1);
        (n, Lexeme::Symbol)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn test_charset_membership() {
        assert!(IDENT_CHARS.contains(b'a'));
        assert!(IDENT_CHARS.contains(b'Z'));
        assert!(IDENT_CHARS.contains(b'0'));
        assert!(IDENT_CHARS.contains(b'_'));
        assert!(!IDENT_CHARS.contains(b'-'));
        assert!(!IDENT_CHARS.contains(b' '));

        let widened = IDENT_CHARS.widened(b"-.");
        assert!(widened.contains(b'-'));
        assert!(widened.contains(b'.'));
        // the original is untouched
        assert!(!IDENT_CHARS.contains(b'-'));
    }

    #[test]
    fn test_peek_and_position() {
        let mut sc = Scanner::new(b"ab\ncd");
        assert_eq!(sc.peek(), Some(b'a'));
        assert_eq!(sc.skip_n(5), 5);
        assert_eq!(sc.total(), 5);
        assert_eq!(sc.line(), 1);
        assert_eq!(sc.col(), 2);
        assert!(sc.is_end());
        assert_eq!(sc.peek(), None);
        assert_eq!(sc.skip_n(1), 0);
    }

    #[test]
    fn test_read_while_truncation() {
        // the count reports the full match no matter how small dest is
        for cap in 1..8 {
            let mut sc = Scanner::new(b"hello world");
            let mut dest = std::vec![0u8; cap];
            let n = sc.read_while(&IDENT_CHARS, &mut dest);
            assert_eq!(n, 5);
            let copied = cap.min(5);
            assert_eq!(&dest[..copied], &b"hello"[..copied]);
            // the cursor is past the whole token either way
            assert_eq!(sc.peek(), Some(b' '));
        }
    }

    #[test]
    fn test_read_until() {
        let mut sc = Scanner::new(b"key: value\r\nnext");
        let mut dest = [0u8; 16];
        let n = sc.read_until(&[b':'], &mut dest);
        assert_eq!(&dest[..n], b"key");
        assert!(sc.skip_byte(b':'));
        sc.skip_inline_whitespace();
        let n = sc.read_until(&[CR, LF], &mut dest);
        assert_eq!(&dest[..n], b"value");
        assert!(sc.skip_line());
        assert_eq!(sc.peek(), Some(b'n'));
    }

    #[test]
    fn test_skip_whitespace_variants() {
        let mut sc = Scanner::new(b" \t\r\n x");
        assert!(sc.skip_inline_whitespace());
        assert_eq!(sc.peek(), Some(CR));
        assert!(sc.skip_whitespace());
        assert_eq!(sc.peek(), Some(b'x'));
    }

    #[test]
    fn test_read_number_hex() {
        let mut sc = Scanner::new(b"0x1A ");
        let mut dest = [0u8; 8];
        let n = sc.read_number(&mut dest, NumFormat::HEX_0X);
        assert_eq!(n, 4);
        assert_eq!(&dest[..n], b"0x1A");

        // the prefix branch requires the token so far to be exactly "0"
        let mut sc = Scanner::new(b"10x1A");
        let n = sc.read_number(&mut dest, NumFormat::HEX_0X);
        assert_eq!(&dest[..n], b"10");

        // disabled flag: stops at the 'x'
        let mut sc = Scanner::new(b"0x1A");
        let n = sc.read_number(&mut dest, NumFormat::FRACTION);
        assert_eq!(&dest[..n], b"0");
    }

    #[test]
    fn test_read_number_float_exp_sign() {
        let mut dest = [0u8; 16];

        let mut sc = Scanner::new(b"-3.25e+10;");
        let fmt = NumFormat::FRACTION | NumFormat::EXPONENT | NumFormat::SIGN;
        let n = sc.read_number(&mut dest, fmt);
        assert_eq!(&dest[..n], b"-3.25e+10");
        assert_eq!(sc.peek(), Some(b';'));

        // a second dot cannot continue the token
        let mut sc = Scanner::new(b"1.2.3");
        let n = sc.read_number(&mut dest, NumFormat::FRACTION);
        assert_eq!(&dest[..n], b"1.2");

        let mut sc = Scanner::new(b"0b0110_");
        let n = sc.read_number(&mut dest, NumFormat::BINARY);
        assert_eq!(&dest[..n], b"0b0110");
    }

    #[test]
    fn test_read_string_quoted_escapes() {
        let mut dest = [0u8; 8];
        let mut sc = Scanner::new(b"\"a\\nb\"");
        let n = sc.read_string(&mut dest, StrFormat::QUOTE | StrFormat::ESCAPE);
        assert_eq!(n, 3);
        assert_eq!(&dest[..n], b"a\nb");
        assert!(sc.is_end());
    }

    #[test]
    fn test_read_string_unknown_escape_passthrough() {
        let mut dest = [0u8; 8];
        let mut sc = Scanner::new(b"'a\\qb'");
        let fmt = StrFormat::APOSTROPHE | StrFormat::ESCAPE;
        let n = sc.read_string(&mut dest, fmt);
        assert_eq!(&dest[..n], b"a\\qb");
    }

    #[test]
    fn test_read_string_naked() {
        let mut dest = [0u8; 16];
        let mut sc = Scanner::new(b"hello_9 world");
        let n = sc.read_string(&mut dest, StrFormat::NAKED);
        assert_eq!(&dest[..n], b"hello_9");
        assert_eq!(sc.peek(), Some(b' '));

        // naked form disabled: nothing is consumed
        let mut sc = Scanner::new(b"hello");
        let n = sc.read_string(&mut dest, StrFormat::QUOTE);
        assert_eq!(n, 0);
        assert_eq!(sc.peek(), Some(b'h'));
    }

    #[test]
    fn test_read_string_unicode_escape() {
        let mut dest = [0u8; 16];
        let mut sc = Scanner::new(b"\"x\\u00e9y\"");
        let fmt = StrFormat::QUOTE | StrFormat::ESCAPE | StrFormat::UNICODE;
        let n = sc.read_string(&mut dest, fmt);
        assert_eq!(&dest[..n], "x\u{e9}y".as_bytes());

        // malformed escape stops the read
        let mut sc = Scanner::new(b"\"x\\u12\"");
        let n = sc.read_string(&mut dest, fmt);
        assert_eq!(&dest[..n], b"x");
    }

    #[test]
    fn test_next_lexeme_sequence() {
        let src = b" name = -42 'text' // trailing\n";
        let mut sc = Scanner::new(src);
        let mut dest = [0u8; 32];

        let (n, kind) = sc.next_lexeme(&mut dest);
        assert_eq!((kind, &dest[..n]), (Lexeme::Ident, &b"name"[..]));

        let (n, kind) = sc.next_lexeme(&mut dest);
        assert_eq!((kind, &dest[..n]), (Lexeme::Symbol, &b"="[..]));

        let (n, kind) = sc.next_lexeme(&mut dest);
        assert_eq!((kind, &dest[..n]), (Lexeme::Value, &b"-42"[..]));

        let (n, kind) = sc.next_lexeme(&mut dest);
        assert_eq!((kind, &dest[..n]), (Lexeme::Str, &b"text"[..]));

        let (n, kind) = sc.next_lexeme(&mut dest);
        assert_eq!((kind, &dest[..n]), (Lexeme::Comment, &b" trailing"[..]));

        let (n, kind) = sc.next_lexeme(&mut dest);
        assert_eq!((n, kind), (0, Lexeme::End));
    }

    #[test]
    fn test_next_lexeme_lone_minus_and_slash() {
        let mut sc = Scanner::new(b"- /x");
        let mut dest = [0u8; 8];

        let (n, kind) = sc.next_lexeme(&mut dest);
        assert_eq!((kind, &dest[..n]), (Lexeme::Symbol, &b"-"[..]));

        let (n, kind) = sc.next_lexeme(&mut dest);
        assert_eq!((kind, &dest[..n]), (Lexeme::Symbol, &b"/"[..]));

        let (n, kind) = sc.next_lexeme(&mut dest);
        assert_eq!((kind, &dest[..n]), (Lexeme::Ident, &b"x"[..]));
    }

    struct Chunked {
        data: &'static [u8],
        pos: usize,
        chunk: usize,
    }

    impl ByteSource for Chunked {
        fn pull(&mut self, dest: &mut [u8]) -> usize {
            let n = self
                .chunk
                .min(dest.len())
                .min(self.data.len() - self.pos);
            dest[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            n
        }
    }

    #[test]
    fn test_refill_source() {
        let mut source = Chunked {
            data: b"alpha beta",
            pos: 0,
            chunk: 3,
        };
        let mut scratch = [0u8; 4];
        let mut sc = Scanner::from_source(&mut scratch, &mut source);
        let mut dest = [0u8; 16];

        // tokens come out whole even though the window holds 3 bytes at a time
        let n = sc.read_while(&IDENT_CHARS, &mut dest);
        assert_eq!(&dest[..n], b"alpha");
        assert!(sc.skip_whitespace());
        let n = sc.read_while(&IDENT_CHARS, &mut dest);
        assert_eq!(&dest[..n], b"beta");
        assert!(sc.is_end());
        assert_eq!(sc.total(), 10);
    }
}
