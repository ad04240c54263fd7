use std::borrow::Cow;

use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// TagParseError

/// An error produced while parsing a canonical type identity string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("error at offset {offset} while parsing `{input}`: {message}")]
pub struct TagParseError {
    /// Byte position in `input` where parsing failed.
    pub offset: usize,
    /// The identity string being parsed.
    pub input: String,
    /// What went wrong.
    pub message: Cow<'static, str>,
}

// -----------------------------------------------------------------------------
// parse

/// Parses a canonical type identity string into a structural [`TypeTag`].
///
/// This is the pure, scope-free half of decoding: it validates the grammar and
/// builds the tag, but does not check that the named types exist anywhere. Use
/// [`TypeRegistry::decode`](crate::registry::TypeRegistry::decode) to resolve
/// an identity against a registered scope.
///
/// The parser is lenient about the single space after a generic-argument
/// comma; the encoder always emits it.
///
/// # Examples
///
/// ```
/// use mirra::tag::parse;
///
/// let tag = parse("alloc::vec::Vec<i32[]>").unwrap();
/// assert_eq!(tag.canonical(), "alloc::vec::Vec<i32[]>");
///
/// assert!(parse("Vec<").is_err());
/// ```
pub fn parse(input: &str) -> Result<TypeTag, TagParseError> {
    let mut parser = Parser { input, pos: 0 };
    let tag = parser.parse_identity()?;
    if parser.pos != input.len() {
        return Err(parser.error("trailing characters after type identity"));
    }
    Ok(tag)
}

// -----------------------------------------------------------------------------
// Parser

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<Cow<'static, str>>) -> TagParseError {
        TagParseError {
            offset: self.pos,
            input: self.input.to_owned(),
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn parse_identity(&mut self) -> Result<TypeTag, TagParseError> {
        let mut tag = self.parse_named()?;

        // Array suffixes: leftmost binds tightest to the element, so each
        // parsed suffix wraps the tag built so far.
        while self.eat(b'[') {
            let mut rank: u8 = 1;
            while self.eat(b',') {
                rank = rank
                    .checked_add(1)
                    .ok_or_else(|| self.error("array rank overflow"))?;
            }
            if !self.eat(b']') {
                return Err(self.error("expected `]` or `,` in array suffix"));
            }
            tag = tag.array(rank);
        }
        Ok(tag)
    }

    fn parse_named(&mut self) -> Result<TypeTag, TagParseError> {
        let mut segments = vec![self.parse_ident()?];
        while self.input[self.pos..].starts_with("::") {
            self.pos += 2;
            segments.push(self.parse_ident()?);
        }

        let ident = segments.pop().unwrap_or_default().to_owned();
        let module = segments.join("::");
        let mut tag = TypeTag::named(module, ident);

        if self.peek() == Some(b'<') {
            tag = tag.with_args(self.parse_args()?);
        }

        // Nested chain: `Outer+Inner+Innermost`, each segment may be generic.
        while self.eat(b'+') {
            let ident = self.parse_ident()?.to_owned();
            tag = tag.nested(ident);
            if self.peek() == Some(b'<') {
                tag = tag.with_args(self.parse_args()?);
            }
        }
        Ok(tag)
    }

    fn parse_args(&mut self) -> Result<Vec<TypeTag>, TagParseError> {
        debug_assert_eq!(self.peek(), Some(b'<'));
        self.bump();

        let mut args = vec![self.parse_identity()?];
        while self.eat(b',') {
            // Canonical form has exactly one space after the comma.
            self.eat(b' ');
            args.push(self.parse_identity()?);
        }
        if !self.eat(b'>') {
            return Err(self.error("expected `>` to close generic arguments"));
        }
        Ok(args)
    }

    fn parse_ident(&mut self) -> Result<&'a str, TagParseError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == b'_' => self.bump(),
            _ => return Err(self.error("expected a type identifier")),
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.bump();
            } else {
                break;
            }
        }
        Ok(&self.input[start..self.pos])
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(identity: &str) {
        let tag = parse(identity).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(tag.canonical(), identity);
    }

    #[test]
    fn round_trips() {
        round_trip("i32");
        round_trip("i32[]");
        round_trip("i32[,]");
        round_trip("i32[,,]");
        round_trip("i32[][,]");
        round_trip("i32[,][]");
        round_trip("alloc::string::String");
        round_trip("alloc::vec::Vec<i32[]>");
        round_trip("alloc::vec::Vec<alloc::vec::Vec<i32>>");
        round_trip("std::collections::HashMap<alloc::string::String, i32>");
        round_trip("demo::Outer+Inner");
        round_trip("demo::Outer+Inner+Innermost");
        round_trip("demo::Outer<i32>+Inner<bool[]>");
    }

    #[test]
    fn array_suffix_shape() {
        use crate::tag::TagKind;

        // `i32[][,]`: rank-2 outer array of `i32[]`.
        let tag = parse("i32[][,]").unwrap();
        let TagKind::Array { elem, rank } = tag.kind() else {
            panic!("expected array");
        };
        assert_eq!(*rank, 2);
        assert_eq!(elem.canonical(), "i32[]");
    }

    #[test]
    fn comma_space_is_optional_on_input() {
        let tight = parse("std::collections::HashMap<alloc::string::String,i32>").unwrap();
        let spaced = parse("std::collections::HashMap<alloc::string::String, i32>").unwrap();
        assert_eq!(tight, spaced);
    }

    #[test]
    fn malformed_inputs() {
        assert!(parse("").is_err());
        assert!(parse("Vec<").is_err());
        assert!(parse("Vec<i32").is_err());
        assert!(parse("i32[").is_err());
        assert!(parse("i32[x]").is_err());
        assert!(parse("::Vec").is_err());
        assert!(parse("demo::Outer+").is_err());
        assert!(parse("i32 extra").is_err());
        assert!(parse("1nvalid").is_err());
    }

    #[test]
    fn error_carries_offset() {
        let err = parse("alloc::vec::Vec<").unwrap_err();
        assert_eq!(err.offset, 16);
    }
}
