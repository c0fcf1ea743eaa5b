/// A cursor over query text that tracks position.
///
/// Tracks byte offset, line number, and column number as it advances.
pub struct Cursor<'src> {
    source: &'src str,
    /// Remaining source text (slice starting at current position).
    rest: &'src str,
    offset: u32,
    /// Current line number (1-indexed).
    line: u32,
    /// Current column number (1-indexed, byte-based).
    column: u32,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.rest.is_empty()
    }

    /// Peek at the current character without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    /// Peek at the nth character ahead (0 = current).
    #[inline]
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    #[inline]
    pub fn check(&self, f: impl Fn(char) -> bool) -> bool {
        self.peek().is_some_and(f)
    }

    /// Consume the current character, updating line/column tracking.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.rest.chars().next()?;
        let len = ch.len_utf8();
        self.rest = &self.rest[len..];
        self.offset += len as u32;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += len as u32;
        }
        Some(ch)
    }

    /// Consume if the current character matches.
    #[inline]
    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume characters while the predicate matches, returning the consumed slice.
    pub fn eat_while(&mut self, f: impl Fn(char) -> bool) -> &'src str {
        let start = self.offset;
        while self.check(&f) {
            self.advance();
        }
        self.slice_from(start)
    }

    /// Slice of source from a starting offset to the current position.
    #[inline]
    pub fn slice_from(&self, start: u32) -> &'src str {
        &self.source[start as usize..self.offset as usize]
    }
}

#[inline]
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_lines_and_columns() {
        let mut cursor = Cursor::new("ab\ncd");
        cursor.advance();
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (1, 3));
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (2, 1));
        assert_eq!(cursor.offset(), 3);
    }

    #[test]
    fn eat_while_returns_slice() {
        let mut cursor = Cursor::new("count123 rest");
        assert_eq!(cursor.eat_while(is_ident_continue), "count123");
        assert!(cursor.eat(' '));
        assert_eq!(cursor.peek(), Some('r'));
    }

    #[test]
    fn multibyte_columns_are_byte_based() {
        let mut cursor = Cursor::new("é!");
        cursor.advance();
        assert_eq!(cursor.column(), 3);
        assert_eq!(cursor.peek_nth(0), Some('!'));
        cursor.advance();
        assert!(cursor.is_eof());
    }
}
