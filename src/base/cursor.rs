//! Lexical cursor over statement arguments and schema node-ids.

use text_size::TextSize;

use crate::error::{Error, Result};

/// A `[prefix:]name` token borrowed from the input it was parsed from.
///
/// The prefix is `None` when the token carried no `prefix:` qualifier, which is
/// legal everywhere a node identifier may appear.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct NameRef<'a> {
    pub prefix: Option<&'a str>,
    pub name: &'a str,
}

impl std::fmt::Debug for NameRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.prefix {
            Some(prefix) => write!(f, "NameRef({prefix}:{})", self.name),
            None => write!(f, "NameRef({})", self.name),
        }
    }
}

impl std::fmt::Display for NameRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.prefix {
            Some(prefix) => write!(f, "{prefix}:{}", self.name),
            None => f.write_str(self.name),
        }
    }
}

/// A forward-only cursor over a borrowed string.
///
/// The cursor tracks a byte offset into the original input so error messages
/// can name the position of the offending character. Parsing methods either
/// consume a whole token and advance, or fail without moving.
#[derive(Clone)]
pub struct Cursor<'a> {
    src: &'a str,
    pos: TextSize,
}

/// First character of an identifier: `ALPHA | "_"`.
#[inline]
const fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

/// Subsequent identifier characters: `ALPHA | DIGIT | "_" | "-" | "."`.
#[inline]
const fn is_ident_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-' | b'.')
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: TextSize::default(),
        }
    }

    /// Current byte offset from the start of the input.
    #[inline]
    pub fn pos(&self) -> TextSize {
        self.pos
    }

    /// The unconsumed remainder of the input.
    #[inline]
    pub fn rest(&self) -> &'a str {
        &self.src[usize::from(self.pos)..]
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.rest().is_empty()
    }

    /// Next unconsumed character, if any.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consumes `expected` if it is the next character; reports whether it did.
    pub fn eat(&mut self, expected: char) -> bool {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += TextSize::of(c);
                true
            }
            _ => false,
        }
    }

    /// Consumes one identifier token and returns it.
    ///
    /// Fails with [`Error::InvalidSyntax`] when the next character cannot start
    /// an identifier; the cursor does not move on failure.
    pub fn identifier(&mut self) -> Result<&'a str> {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        match bytes.first() {
            Some(&b) if is_ident_start(b) => {}
            Some(&b) => {
                return Err(Error::InvalidSyntax(format!(
                    "invalid identifier first character '{}' at offset {}",
                    b as char,
                    u32::from(self.pos),
                )));
            }
            None => {
                return Err(Error::InvalidSyntax(format!(
                    "unexpected end of input at offset {}, expected an identifier",
                    u32::from(self.pos),
                )));
            }
        }
        let len = bytes.iter().take_while(|&&b| is_ident_char(b)).count();
        let token = &rest[..len];
        self.pos += TextSize::of(token);
        Ok(token)
    }

    /// Consumes one `[prefix:]name` token.
    ///
    /// A lone identifier is a name with no prefix. When a `:` follows the first
    /// identifier it is consumed and a second identifier is required.
    pub fn node_id(&mut self) -> Result<NameRef<'a>> {
        let first = self.identifier()?;
        if self.eat(':') {
            let name = self.identifier()?;
            Ok(NameRef {
                prefix: Some(first),
                name,
            })
        } else {
            Ok(NameRef {
                prefix: None,
                name: first,
            })
        }
    }
}
