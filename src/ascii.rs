pub(crate) const CR: u8 = 13;
pub(crate) const LF: u8 = 10;
pub(crate) const SP: u8 = 32;
pub(crate) const COLON: u8 = 58;

/// Parse an unsigned decimal number.  Returns `None` for empty input, any
/// non-digit byte, or overflow.
pub(crate) fn atoi(data: &[u8]) -> Option<usize> {
    if data.is_empty() {
        return None;
    }

    let mut val: usize = 0;
    for digit in data {
        if !digit.is_ascii_digit() {
            return None;
        }
        val = val
            .checked_mul(10)?
            .checked_add(usize::from(digit - b'0'))?;
    }

    Some(val)
}

/// Decimal digits of a `u64`, formatted into a fixed buffer.
pub(crate) struct Digits {
    buf: [u8; 20],
    start: usize,
}

impl Digits {
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.buf[self.start..]
    }
}

impl From<u64> for Digits {
    fn from(value: u64) -> Self {
        let mut buf = [0u8; 20];
        let mut start = buf.len();
        let mut rest = value;

        loop {
            start -= 1;
            buf[start] = b'0' + (rest % 10) as u8;
            rest /= 10;
            if rest == 0 {
                break;
            }
        }

        Digits { buf, start }
    }
}
