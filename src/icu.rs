//! ICU MessageFormat syntax validation.
//!
//! Default messages are ICU MessageFormat patterns. Before a descriptor is
//! emitted, its message is run through this validator, which walks the pattern
//! with a recursive-descent cursor and rejects malformed arguments, bad
//! `plural`/`select` sub-syntax, broken quoting and unbalanced tags. Nothing is
//! built from the pattern; the validator only decides valid/invalid and, on
//! failure, reports what went wrong and where.
//!
//! One invalid message aborts extraction for the whole file, so errors carry
//! the position inside the message for the host to relay.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

/// The kind of ICU syntax violation, named after the FormatJS parser error
/// codes so hosts can match on the same identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcuErrorKind {
    /// Argument is unclosed, e.g. `{name`.
    ExpectArgumentClosingBrace,
    /// Argument is empty, e.g. `{}`.
    EmptyArgument,
    /// Argument is malformed, e.g. `{foo!}`.
    MalformedArgument,
    /// Missing argument type, e.g. `{foo,}`.
    ExpectArgumentType,
    /// Unsupported argument type, e.g. `{foo, foo}`.
    InvalidArgumentType,
    /// Missing argument style, e.g. `{foo, number, }`.
    ExpectArgumentStyle,
    /// Missing skeleton after `::`, e.g. `{foo, number, ::}`.
    ExpectNumberSkeleton,
    /// Unmatched apostrophe in the argument style, e.g. `{foo, number, 'test`.
    UnclosedQuoteInArgumentStyle,
    /// Missing select options, e.g. `{foo, select}`.
    ExpectSelectArgumentOptions,
    /// Missing offset value, e.g. `{foo, plural, offset}`.
    ExpectPluralArgumentOffsetValue,
    /// Bad offset value, e.g. `{foo, plural, offset: x}`.
    InvalidPluralArgumentOffsetValue,
    /// Missing selector in a `select` argument.
    ExpectSelectArgumentSelector,
    /// Missing selector in a `plural`/`selectordinal` argument.
    ExpectPluralArgumentSelector,
    /// Missing fragment after a `select` selector, e.g. `{foo, select, apple}`.
    ExpectSelectArgumentSelectorFragment,
    /// Missing fragment after a plural selector, e.g. `{foo, plural, one}`.
    ExpectPluralArgumentSelectorFragment,
    /// Malformed plural selector, e.g. `{foo, plural, =x {#}}`.
    InvalidPluralArgumentSelector,
    /// Duplicate selector in a `plural`/`selectordinal` argument.
    DuplicatePluralArgumentSelector,
    /// Duplicate selector in a `select` argument.
    DuplicateSelectArgumentSelector,
    /// Malformed tag, e.g. `<bold!>`.
    InvalidTag,
    /// Closing tag without a matching opening tag.
    UnmatchedClosingTag,
    /// Opening tag without a matching closing tag.
    UnclosedTag,
}

impl IcuErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IcuErrorKind::ExpectArgumentClosingBrace => "EXPECT_ARGUMENT_CLOSING_BRACE",
            IcuErrorKind::EmptyArgument => "EMPTY_ARGUMENT",
            IcuErrorKind::MalformedArgument => "MALFORMED_ARGUMENT",
            IcuErrorKind::ExpectArgumentType => "EXPECT_ARGUMENT_TYPE",
            IcuErrorKind::InvalidArgumentType => "INVALID_ARGUMENT_TYPE",
            IcuErrorKind::ExpectArgumentStyle => "EXPECT_ARGUMENT_STYLE",
            IcuErrorKind::ExpectNumberSkeleton => "EXPECT_NUMBER_SKELETON",
            IcuErrorKind::UnclosedQuoteInArgumentStyle => "UNCLOSED_QUOTE_IN_ARGUMENT_STYLE",
            IcuErrorKind::ExpectSelectArgumentOptions => "EXPECT_SELECT_ARGUMENT_OPTIONS",
            IcuErrorKind::ExpectPluralArgumentOffsetValue => "EXPECT_PLURAL_ARGUMENT_OFFSET_VALUE",
            IcuErrorKind::InvalidPluralArgumentOffsetValue => {
                "INVALID_PLURAL_ARGUMENT_OFFSET_VALUE"
            }
            IcuErrorKind::ExpectSelectArgumentSelector => "EXPECT_SELECT_ARGUMENT_SELECTOR",
            IcuErrorKind::ExpectPluralArgumentSelector => "EXPECT_PLURAL_ARGUMENT_SELECTOR",
            IcuErrorKind::ExpectSelectArgumentSelectorFragment => {
                "EXPECT_SELECT_ARGUMENT_SELECTOR_FRAGMENT"
            }
            IcuErrorKind::ExpectPluralArgumentSelectorFragment => {
                "EXPECT_PLURAL_ARGUMENT_SELECTOR_FRAGMENT"
            }
            IcuErrorKind::InvalidPluralArgumentSelector => "INVALID_PLURAL_ARGUMENT_SELECTOR",
            IcuErrorKind::DuplicatePluralArgumentSelector => "DUPLICATE_PLURAL_ARGUMENT_SELECTOR",
            IcuErrorKind::DuplicateSelectArgumentSelector => "DUPLICATE_SELECT_ARGUMENT_SELECTOR",
            IcuErrorKind::InvalidTag => "INVALID_TAG",
            IcuErrorKind::UnmatchedClosingTag => "UNMATCHED_CLOSING_TAG",
            IcuErrorKind::UnclosedTag => "UNCLOSED_TAG",
        }
    }
}

impl fmt::Display for IcuErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A position inside the validated message. `offset` is a byte offset; `line`
/// and `column` are 1-based and counted in Unicode scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcuPosition {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl IcuPosition {
    fn start() -> IcuPosition {
        IcuPosition {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for IcuPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An ICU syntax error: the violation kind plus where it starts in the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {position}")]
pub struct IcuError {
    pub kind: IcuErrorKind,
    pub position: IcuPosition,
}

/// Validate an ICU MessageFormat pattern.
///
/// Returns `Ok(())` when the message parses cleanly, or the first syntax error
/// encountered in a left-to-right scan.
pub fn validate_message(message: &str) -> Result<(), IcuError> {
    let mut validator = Validator {
        message,
        position: IcuPosition::start(),
    };
    validator.validate_fragment(0, "", false)
}

struct Validator<'s> {
    message: &'s str,
    position: IcuPosition,
}

impl<'s> Validator<'s> {
    /// Validate a message fragment until EOF or, when nested, until the
    /// closing delimiter of the enclosing construct.
    fn validate_fragment(
        &mut self,
        nesting_level: usize,
        parent_arg_type: &str,
        expecting_close_tag: bool,
    ) -> Result<(), IcuError> {
        while !self.is_eof() {
            match self.char() {
                '{' => self.validate_argument(nesting_level, expecting_close_tag)?,
                '}' if nesting_level > 0 => break,
                '#' if matches!(parent_arg_type, "plural" | "selectordinal") => self.bump(),
                '<' if self.peek() == Some('/') => {
                    if expecting_close_tag {
                        break;
                    }
                    return Err(self.error(IcuErrorKind::UnmatchedClosingTag, self.position));
                }
                '<' if matches!(self.peek(), Some('a'..='z')) => {
                    self.validate_tag(nesting_level, parent_arg_type)?
                }
                _ => self.consume_literal(nesting_level, parent_arg_type),
            }
        }
        Ok(())
    }

    /// Consume a run of literal text, handling ICU apostrophe quoting.
    fn consume_literal(&mut self, nesting_level: usize, parent_arg_type: &str) {
        loop {
            if self.bump_if("''") {
                // Doubled apostrophe is one literal apostrophe.
                continue;
            }
            if self.try_consume_quoted(parent_arg_type) {
                continue;
            }
            if self.try_consume_unquoted(nesting_level, parent_arg_type) {
                continue;
            }
            if self.try_consume_left_angle() {
                continue;
            }
            break;
        }
    }

    /// An apostrophe starts quoted text only when it immediately precedes a
    /// character that needs quoting (ICU 4.8 "quote only where needed").
    fn try_consume_quoted(&mut self, parent_arg_type: &str) -> bool {
        if self.is_eof() || self.char() != '\'' {
            return false;
        }
        match self.peek() {
            Some('{') | Some('<') | Some('>') | Some('}') => (),
            Some('#') if matches!(parent_arg_type, "plural" | "selectordinal") => (),
            _ => return false,
        }

        self.bump(); // apostrophe
        self.bump(); // the escaped character

        // Quoted span runs until the optional closing apostrophe; a doubled
        // apostrophe inside it stays literal.
        while !self.is_eof() {
            match self.char() {
                '\'' if self.peek() == Some('\'') => {
                    self.bump();
                }
                '\'' => {
                    self.bump();
                    break;
                }
                _ => {}
            }
            self.bump();
        }
        true
    }

    fn try_consume_unquoted(&mut self, nesting_level: usize, parent_arg_type: &str) -> bool {
        if self.is_eof() {
            return false;
        }
        match self.char() {
            '<' | '{' => false,
            '#' if matches!(parent_arg_type, "plural" | "selectordinal") => false,
            '}' if nesting_level > 0 => false,
            _ => {
                self.bump();
                true
            }
        }
    }

    /// A `<` that cannot start a tag is plain text.
    fn try_consume_left_angle(&mut self) -> bool {
        if !self.is_eof()
            && self.char() == '<'
            && !matches!(self.peek(), Some(c) if c.is_ascii_lowercase() || c == '/')
        {
            self.bump();
            true
        } else {
            false
        }
    }

    fn validate_tag(&mut self, nesting_level: usize, parent_arg_type: &str) -> Result<(), IcuError> {
        let start = self.position;
        self.bump(); // '<'

        let tag_name = self.consume_tag_name().to_string();
        self.bump_space();

        if self.bump_if("/>") {
            return Ok(());
        }
        if !self.bump_if(">") {
            return Err(self.error(IcuErrorKind::InvalidTag, start));
        }

        self.validate_fragment(nesting_level + 1, parent_arg_type, true)?;
        let end_tag_start = self.position;

        if !self.bump_if("</") {
            return Err(self.error(IcuErrorKind::UnclosedTag, start));
        }
        if self.is_eof() || !self.char().is_ascii_lowercase() {
            return Err(self.error(IcuErrorKind::InvalidTag, end_tag_start));
        }

        let closing_start = self.position;
        let closing_name = self.consume_tag_name().to_string();
        if tag_name != closing_name {
            return Err(self.error(IcuErrorKind::UnmatchedClosingTag, closing_start));
        }

        self.bump_space();
        if !self.bump_if(">") {
            return Err(self.error(IcuErrorKind::InvalidTag, end_tag_start));
        }
        Ok(())
    }

    fn consume_tag_name(&mut self) -> &'s str {
        let start = self.offset();
        self.bump(); // first tag name character
        while !self.is_eof() && is_potential_element_name_char(self.char()) {
            self.bump();
        }
        &self.message[start..self.offset()]
    }

    fn validate_argument(
        &mut self,
        nesting_level: usize,
        expecting_close_tag: bool,
    ) -> Result<(), IcuError> {
        let opening = self.position;
        self.bump(); // '{'
        self.bump_space();

        if self.is_eof() {
            return Err(self.error(IcuErrorKind::ExpectArgumentClosingBrace, opening));
        }
        if self.char() == '}' {
            self.bump();
            return Err(self.error(IcuErrorKind::EmptyArgument, opening));
        }

        let name = self.consume_identifier();
        if name.is_empty() {
            return Err(self.error(IcuErrorKind::MalformedArgument, opening));
        }

        self.bump_space();
        if self.is_eof() {
            return Err(self.error(IcuErrorKind::ExpectArgumentClosingBrace, opening));
        }

        match self.char() {
            // Simple argument: `{name}`
            '}' => {
                self.bump();
                Ok(())
            }
            // Argument with options: `{name, type, ...}`
            ',' => {
                self.bump();
                self.bump_space();
                if self.is_eof() {
                    return Err(self.error(IcuErrorKind::ExpectArgumentClosingBrace, opening));
                }
                self.validate_argument_options(nesting_level, expecting_close_tag, opening)
            }
            _ => Err(self.error(IcuErrorKind::MalformedArgument, opening)),
        }
    }

    fn validate_argument_options(
        &mut self,
        nesting_level: usize,
        expecting_close_tag: bool,
        opening: IcuPosition,
    ) -> Result<(), IcuError> {
        let type_start = self.position;
        let arg_type = self.consume_identifier().to_string();

        match arg_type.as_str() {
            "" => Err(self.error(IcuErrorKind::ExpectArgumentType, type_start)),

            "number" | "date" | "time" => {
                self.bump_space();
                if self.bump_if(",") {
                    self.bump_space();
                    let style_start = self.position;
                    let style = self.consume_simple_arg_style()?.trim_end();
                    if style.is_empty() {
                        return Err(self.error(IcuErrorKind::ExpectArgumentStyle, style_start));
                    }
                    if let Some(skeleton) = style.strip_prefix("::")
                        && skeleton.trim().is_empty()
                    {
                        return Err(self.error(IcuErrorKind::ExpectNumberSkeleton, style_start));
                    }
                }
                self.expect_argument_close(opening)
            }

            "plural" | "selectordinal" | "select" => {
                let type_end = self.position;
                self.bump_space();
                if !self.bump_if(",") {
                    return Err(self.error(IcuErrorKind::ExpectSelectArgumentOptions, type_end));
                }
                self.bump_space();

                // Optional `offset:N` before the first selector.
                let mut selector = self.consume_identifier().to_string();
                if arg_type != "select" && selector == "offset" {
                    if !self.bump_if(":") {
                        return Err(self.error(
                            IcuErrorKind::ExpectPluralArgumentOffsetValue,
                            self.position,
                        ));
                    }
                    self.bump_space();
                    self.consume_decimal_integer(
                        IcuErrorKind::ExpectPluralArgumentOffsetValue,
                        IcuErrorKind::InvalidPluralArgumentOffsetValue,
                    )?;
                    self.bump_space();
                    selector = self.consume_identifier().to_string();
                }

                self.validate_selector_options(
                    nesting_level,
                    &arg_type,
                    expecting_close_tag,
                    selector,
                )?;
                self.expect_argument_close(opening)
            }

            _ => Err(self.error(IcuErrorKind::InvalidArgumentType, type_start)),
        }
    }

    /// Validate the `selector {fragment}` list of a plural/select argument.
    /// `first_selector` is the identifier the caller already consumed.
    fn validate_selector_options(
        &mut self,
        nesting_level: usize,
        parent_arg_type: &str,
        expecting_close_tag: bool,
        first_selector: String,
    ) -> Result<(), IcuError> {
        let mut selector = first_selector;
        let mut selector_start = self.position;
        let mut seen: HashSet<String> = HashSet::new();

        loop {
            if selector.is_empty() {
                let start = self.position;
                if parent_arg_type != "select" && self.bump_if("=") {
                    // Exact-match selector: `=0`, `=1`, ...
                    self.consume_decimal_integer(
                        IcuErrorKind::ExpectPluralArgumentSelector,
                        IcuErrorKind::InvalidPluralArgumentSelector,
                    )?;
                    selector_start = start;
                    selector = self.message[start.offset..self.offset()].to_string();
                } else {
                    break;
                }
            }

            if seen.contains(&selector) {
                return Err(self.error(
                    if parent_arg_type == "select" {
                        IcuErrorKind::DuplicateSelectArgumentSelector
                    } else {
                        IcuErrorKind::DuplicatePluralArgumentSelector
                    },
                    selector_start,
                ));
            }

            self.bump_space();
            let fragment_opening = self.position;
            if !self.bump_if("{") {
                return Err(self.error(
                    if parent_arg_type == "select" {
                        IcuErrorKind::ExpectSelectArgumentSelectorFragment
                    } else {
                        IcuErrorKind::ExpectPluralArgumentSelectorFragment
                    },
                    self.position,
                ));
            }

            self.validate_fragment(nesting_level + 1, parent_arg_type, expecting_close_tag)?;
            self.expect_argument_close(fragment_opening)?;
            seen.insert(selector);

            self.bump_space();
            selector_start = self.position;
            selector = self.consume_identifier().to_string();
        }

        if seen.is_empty() {
            return Err(self.error(
                if parent_arg_type == "select" {
                    IcuErrorKind::ExpectSelectArgumentSelector
                } else {
                    IcuErrorKind::ExpectPluralArgumentSelector
                },
                self.position,
            ));
        }
        Ok(())
    }

    fn consume_decimal_integer(
        &mut self,
        expect_kind: IcuErrorKind,
        invalid_kind: IcuErrorKind,
    ) -> Result<(), IcuError> {
        let start = self.position;
        if !self.bump_if("+") {
            self.bump_if("-");
        }

        let digits_start = self.offset();
        while !self.is_eof() && self.char().is_ascii_digit() {
            self.bump();
        }
        let digits = &self.message[digits_start..self.offset()];

        if self.is_eof() {
            return Err(self.error(expect_kind, start));
        }
        if digits.is_empty() || digits.parse::<i64>().is_err() {
            return Err(self.error(invalid_kind, start));
        }
        Ok(())
    }

    /// Consume a simple argument style up to the argument's closing brace,
    /// honoring apostrophe quoting and nested braces.
    fn consume_simple_arg_style(&mut self) -> Result<&'s str, IcuError> {
        let mut nested_braces = 0usize;
        let start = self.offset();

        while !self.is_eof() {
            match self.char() {
                '\'' => {
                    self.bump();
                    let apostrophe = self.position;
                    if !self.bump_until('\'') {
                        return Err(
                            self.error(IcuErrorKind::UnclosedQuoteInArgumentStyle, apostrophe)
                        );
                    }
                    self.bump();
                }
                '{' => {
                    nested_braces += 1;
                    self.bump();
                }
                '}' => {
                    if nested_braces > 0 {
                        nested_braces -= 1;
                        self.bump();
                    } else {
                        break;
                    }
                }
                _ => self.bump(),
            }
        }

        Ok(&self.message[start..self.offset()])
    }

    fn expect_argument_close(&mut self, opening: IcuPosition) -> Result<(), IcuError> {
        if self.is_eof() || self.char() != '}' {
            return Err(self.error(IcuErrorKind::ExpectArgumentClosingBrace, opening));
        }
        self.bump();
        Ok(())
    }

    /// Consume an identifier, stopping at whitespace or pattern syntax.
    fn consume_identifier(&mut self) -> &'s str {
        let start = self.offset();
        while !self.is_eof() && !self.char().is_whitespace() && !is_pattern_syntax(self.char()) {
            self.bump();
        }
        &self.message[start..self.offset()]
    }

    fn error(&self, kind: IcuErrorKind, position: IcuPosition) -> IcuError {
        IcuError { kind, position }
    }

    fn offset(&self) -> usize {
        self.position.offset
    }

    fn char(&self) -> char {
        self.message[self.offset()..]
            .chars()
            .next()
            .unwrap_or_else(|| panic!("expected char at offset {}", self.offset()))
    }

    fn bump(&mut self) {
        if self.is_eof() {
            return;
        }
        let ch = self.char();
        if ch == '\n' {
            self.position.line += 1;
            self.position.column = 1;
        } else {
            self.position.column += 1;
        }
        self.position.offset += ch.len_utf8();
    }

    fn bump_if(&mut self, prefix: &str) -> bool {
        if self.message[self.offset()..].starts_with(prefix) {
            for _ in 0..prefix.chars().count() {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    /// Bump until the pattern character is found and return `true`; otherwise
    /// bump to the end of the message and return `false`.
    fn bump_until(&mut self, pattern: char) -> bool {
        match self.message[self.offset()..].find(pattern) {
            Some(delta) => {
                let target = self.offset() + delta;
                while self.offset() < target {
                    self.bump();
                }
                true
            }
            None => {
                while !self.is_eof() {
                    self.bump();
                }
                false
            }
        }
    }

    fn bump_space(&mut self) {
        while !self.is_eof() && self.char().is_whitespace() {
            self.bump();
        }
    }

    fn peek(&self) -> Option<char> {
        if self.is_eof() {
            return None;
        }
        self.message[self.offset() + self.char().len_utf8()..]
            .chars()
            .next()
    }

    fn is_eof(&self) -> bool {
        self.offset() == self.message.len()
    }
}

fn is_potential_element_name_char(ch: char) -> bool {
    matches!(ch, '-'
        | '.'
        | '0'..='9'
        | '_'
        | 'a'..='z'
        | 'A'..='Z'
        | '\u{B7}'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{203F}'..='\u{2040}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

/// Unicode Pattern_Syntax characters terminate identifiers (UTS #35).
fn is_pattern_syntax(ch: char) -> bool {
    matches!(ch,
        '!'..='/'
        | ':'..='@'
        | '['..='^'
        | '`'
        | '{'..='~'
        | '\u{A1}'..='\u{A7}'
        | '\u{A9}'
        | '\u{AB}'
        | '\u{AC}'
        | '\u{AE}'
        | '\u{B0}'
        | '\u{B1}'
        | '\u{B6}'
        | '\u{BB}'
        | '\u{BF}'
        | '\u{D7}'
        | '\u{F7}'
        | '\u{2010}'..='\u{2027}'
        | '\u{2030}'..='\u{203E}'
        | '\u{2041}'..='\u{2053}'
        | '\u{2055}'..='\u{205E}'
        | '\u{2190}'..='\u{245F}'
        | '\u{2500}'..='\u{2775}'
        | '\u{2794}'..='\u{2BFF}'
        | '\u{2E00}'..='\u{2E7F}'
        | '\u{3001}'..='\u{3003}'
        | '\u{3008}'..='\u{3020}'
        | '\u{3030}'
        | '\u{FD3E}'
        | '\u{FD3F}'
        | '\u{FE45}'
        | '\u{FE46}')
}
