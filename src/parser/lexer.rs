/// Cursor over a single IRC line
///
/// Positions are byte offsets into `input` and always sit on a char boundary, so every slice
/// handed back is valid UTF-8 (chat is full of emoji).
#[derive(Debug)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Character under the cursor, without consuming it
    pub fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Consumes and returns the character under the cursor
    pub fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Consumes `expected` if it is under the cursor
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// IRC separates fields with plain spaces only
    pub fn skip_spaces(&mut self) {
        while self.eat(' ') {}
    }

    /// Consumes up to (not including) the next space
    pub fn word(&mut self) -> Option<&'a str> {
        self.until(&[' '])
    }

    /// Consumes up to (not including) the first char in `delims`
    pub fn until(&mut self, delims: &[char]) -> Option<&'a str> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if delims.contains(&ch) {
                break;
            }

            self.bump();
        }

        (start != self.pos).then(|| &self.input[start..self.pos])
    }

    /// Consumes everything left on the line
    pub fn rest(&mut self) -> &'a str {
        let rest = &self.input[self.pos..];
        self.pos = self.input.len();
        rest
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_and_rest() {
        let mut lexer = Lexer::new("PRIVMSG  #chan :hello there");

        assert_eq!(lexer.word(), Some("PRIVMSG"));
        lexer.skip_spaces();
        assert_eq!(lexer.word(), Some("#chan"));
        lexer.skip_spaces();
        assert!(lexer.eat(':'));
        assert_eq!(lexer.rest(), "hello there");
        assert!(lexer.is_eof());
        assert_eq!(lexer.word(), None);
        assert_eq!(lexer.rest(), "");
    }

    #[test]
    fn test_multibyte_input() {
        let mut lexer = Lexer::new("🗣️ 123 🪱 world");

        assert_eq!(lexer.word(), Some("🗣️"));
        lexer.skip_spaces();
        assert_eq!(lexer.word(), Some("123"));
        lexer.skip_spaces();
        assert_eq!(lexer.bump(), Some('🪱'));
        assert_eq!(lexer.rest(), " world");
    }

    #[test]
    fn test_until_delims() {
        let mut lexer = Lexer::new("color=#FFBEDF;mod=0 rest");

        assert_eq!(lexer.until(&['=', ';', ' ']), Some("color"));
        assert!(lexer.eat('='));
        assert_eq!(lexer.until(&[';', ' ']), Some("#FFBEDF"));
        assert!(lexer.eat(';'));
        assert_eq!(lexer.until(&['=', ';', ' ']), Some("mod"));
        assert!(!lexer.eat(';'));
    }
}
