use std::fmt::Display;
use std::iter::Peekable;
use std::num::ParseIntError;
use std::str::Chars;

use crate::span::{Position, Span, WithSpan};
use crate::token::Token;

#[derive(Debug, PartialEq)]
pub enum LexError {
    UnexpectedChar(char),
    StringNotClosed,
    InvalidEscape(char),
    /// A `_` with no digit after it, a digit after a run of zeros,
    /// or a letter glued to the end of a number
    InvalidInteger,
    IntegerOutOfRange(ParseIntError),
}

impl Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexError::UnexpectedChar(c) => write!(f, "Unexpected character \"{}\"", c),
            LexError::StringNotClosed => {
                write!(f, "Expected closing \" of string literal but reached EOF")
            }
            LexError::InvalidEscape(c) => write!(f, "Invalid escape sequence \\{}", c),
            LexError::InvalidInteger => write!(f, "Invalid integer lexeme"),
            LexError::IntegerOutOfRange(err) => write!(f, "Invalid integer: {}", err),
        }
    }
}

type LexResult<T> = Result<T, LexError>;

pub struct Lexer<'a> {
    input_iter: Peekable<Chars<'a>>,
    current_position: Position,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            input_iter: input.chars().peekable(),
            current_position: Position::default(),
        }
    }

    /// Consume the next character from the list.
    fn read_char(&mut self) -> Option<char> {
        let next = self.input_iter.next();
        if let Some(c) = next {
            self.current_position = self.current_position.shift(c);
        }
        next
    }

    /// Get the next character from the list without consuming it.
    fn peek_char(&mut self) -> Option<&char> {
        self.input_iter.peek()
    }

    /// Consume whitespace until a non-whitespace character is found.
    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.peek_char() {
            if c.is_whitespace() {
                self.read_char();
            } else {
                break;
            }
        }
    }

    /// Read the next characters as a string literal; the surrounding
    /// quotes are not part of the token's value.
    fn read_string(&mut self) -> LexResult<Token> {
        let mut value = String::new();

        loop {
            match self.read_char() {
                Some('"') => break,
                Some('\\') => match self.read_char() {
                    Some('\'') => value.push('\''),
                    Some('\"') => value.push('\"'),
                    Some('\\') => value.push('\\'),
                    Some('n') => value.push('\n'),
                    Some('r') => value.push('\r'),
                    Some('t') => value.push('\t'),
                    Some('0') => value.push('\0'),
                    Some(ch) => return Err(LexError::InvalidEscape(ch)),
                    None => return Err(LexError::StringNotClosed),
                },
                Some(ch) => value.push(ch),
                None => return Err(LexError::StringNotClosed),
            }
        }

        Ok(Token::String(value))
    }

    /// Read the current and following characters as an integer token.
    ///
    /// Integer      ::= decinteger
    /// decinteger   ::= nonzerodigit (["_"] digit)* | "0"+ (["_"] "0")*
    /// nonzerodigit ::= "1"..."9"
    /// digit        ::= "0"..."9"
    ///
    /// A `_` must be followed by a digit, never doubled or trailing.
    fn read_integer(&mut self, first: char) -> LexResult<Token> {
        let mut s = String::new();
        s.push(first);

        if first != '0' {
            while let Some(&ch) = self.peek_char() {
                if is_digit(ch) {
                    s.push(ch);
                    self.read_char();
                } else if ch == '_' {
                    self.read_char();
                    match self.peek_char() {
                        Some(&next) if is_digit(next) => {
                            s.push(next);
                            self.read_char();
                        }
                        _ => return Err(LexError::InvalidInteger),
                    }
                } else {
                    break;
                }
            }
        } else {
            // A run of zeros collapses to a single `0`; any non-zero
            // digit in the run is malformed (no leading zeros)
            while let Some(&ch) = self.peek_char() {
                if ch == '0' {
                    self.read_char();
                } else if ch == '_' {
                    self.read_char();
                    match self.peek_char() {
                        Some('0') => {
                            self.read_char();
                        }
                        _ => return Err(LexError::InvalidInteger),
                    }
                } else if is_digit(ch) {
                    return Err(LexError::InvalidInteger);
                } else {
                    break;
                }
            }
        }

        // A letter glued to the number is a lexical failure, not two tokens
        if let Some(&ch) = self.peek_char() {
            if is_identifier_char(ch) {
                return Err(LexError::InvalidInteger);
            }
        }

        match s.parse() {
            Ok(value) => Ok(Token::Integer(value)),
            Err(error) => Err(LexError::IntegerOutOfRange(error)),
        }
    }

    /// Read the current and following characters as an identifier or a keyword (if it exists).
    fn read_identifier_or_keyword(&mut self, first: char) -> LexResult<Token> {
        let mut identifier = String::new();
        identifier.push(first);

        while let Some(&ch) = self.peek_char() {
            if is_identifier_char(ch) || is_digit(ch) {
                identifier.push(ch);
                self.read_char();
            } else {
                break;
            }
        }

        if let Some(keyword_token) = Token::lookup_keyword(&identifier) {
            Ok(keyword_token)
        } else {
            Ok(Token::Identifier(identifier))
        }
    }

    /// Read a new token from the characters list.
    pub fn next_token(&mut self) -> LexResult<WithSpan<Token>> {
        self.skip_whitespace();

        let initial_position = self.current_position;

        let token = if let Some(c) = self.read_char() {
            match c {
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,

                '=' => match self.peek_char() {
                    Some('=') => {
                        self.read_char();
                        Token::EqualEqual
                    }
                    _ => Token::Equal,
                },
                '!' => match self.peek_char() {
                    Some('=') => {
                        self.read_char();
                        Token::BangEqual
                    }
                    _ => Token::Bang,
                },
                '<' => Token::LessThan,
                '>' => Token::GreaterThan,

                ',' => Token::Comma,
                ';' => Token::Semicolon,

                '(' => Token::LeftParen,
                ')' => Token::RightParen,
                '{' => Token::LeftBrace,
                '}' => Token::RightBrace,
                '[' => Token::LeftBracket,
                ']' => Token::RightBracket,

                '"' => self.read_string()?,

                c if is_digit(c) => self.read_integer(c)?,
                c if is_identifier_char(c) => self.read_identifier_or_keyword(c)?,

                _ => return Err(LexError::UnexpectedChar(c)),
            }
        } else {
            Token::Eof
        };

        let span = Span::new(initial_position, self.current_position);

        Ok(WithSpan::new(token, span))
    }
}

/// Whether or not the given character is a digit
fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Whether or not the given character can start or continue an identifier
fn is_identifier_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use crate::lexer::{LexError, Lexer};
    use crate::span::{Position, Span};
    use crate::token::Token;

    fn tokens(input: &str) -> Vec<Token> {
        let mut lex = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lex.next_token().unwrap().value;
            if token == Token::Eof {
                break;
            }
            out.push(token);
        }
        out
    }

    #[test]
    fn test_operators() {
        let input = "+-*/=! ==!=<>";
        let mut lex = Lexer::new(input);

        assert_eq!(lex.next_token().unwrap().value, Token::Plus);
        assert_eq!(lex.next_token().unwrap().value, Token::Minus);
        assert_eq!(lex.next_token().unwrap().value, Token::Star);
        assert_eq!(lex.next_token().unwrap().value, Token::Slash);
        assert_eq!(lex.next_token().unwrap().value, Token::Equal);
        assert_eq!(lex.next_token().unwrap().value, Token::Bang);

        assert_eq!(lex.next_token().unwrap().value, Token::EqualEqual);
        assert_eq!(lex.next_token().unwrap().value, Token::BangEqual);
        assert_eq!(lex.next_token().unwrap().value, Token::LessThan);
        assert_eq!(lex.next_token().unwrap().value, Token::GreaterThan);
    }

    #[test]
    fn test_delimiters() {
        let input = ",;(){}[]";
        let mut lex = Lexer::new(input);

        assert_eq!(lex.next_token().unwrap().value, Token::Comma);
        assert_eq!(lex.next_token().unwrap().value, Token::Semicolon);

        assert_eq!(lex.next_token().unwrap().value, Token::LeftParen);
        assert_eq!(lex.next_token().unwrap().value, Token::RightParen);
        assert_eq!(lex.next_token().unwrap().value, Token::LeftBrace);
        assert_eq!(lex.next_token().unwrap().value, Token::RightBrace);
        assert_eq!(lex.next_token().unwrap().value, Token::LeftBracket);
        assert_eq!(lex.next_token().unwrap().value, Token::RightBracket);
    }

    #[test]
    fn test_identifier() {
        let input = "hello _world _hello_world_ x1";
        assert_eq!(
            tokens(input),
            vec![
                Token::Identifier("hello".to_owned()),
                Token::Identifier("_world".to_owned()),
                Token::Identifier("_hello_world_".to_owned()),
                Token::Identifier("x1".to_owned()),
            ]
        );
    }

    #[test]
    fn test_integer() {
        let input = "12312 12_345 190_12 9_123 0 000 0_0";
        assert_eq!(
            tokens(input),
            vec![
                Token::Integer(12312),
                Token::Integer(12345),
                Token::Integer(19012),
                Token::Integer(9123),
                Token::Integer(0),
                Token::Integer(0),
                Token::Integer(0),
            ]
        );
    }

    #[test]
    fn test_invalid_integer() {
        // Trailing `_`, doubled `_`, digit after a zero run,
        // and a letter glued to the digits are all lexical failures
        for input in ["12_", "1__2", "1_+2", "0_1", "01", "12ab", "0x10"] {
            let mut lex = Lexer::new(input);
            assert_eq!(
                lex.next_token(),
                Err(LexError::InvalidInteger),
                "input: {}",
                input
            );
        }
    }

    #[test]
    fn test_string() {
        let input = "\"foobar\" \"foo bar\" \"tab\\there\" \"\"";
        assert_eq!(
            tokens(input),
            vec![
                Token::String("foobar".to_string()),
                Token::String("foo bar".to_string()),
                Token::String("tab\there".to_string()),
                Token::String("".to_string()),
            ]
        );
    }

    #[test]
    fn test_string_not_closed() {
        let mut lex = Lexer::new("\"not closed");
        assert_eq!(lex.next_token(), Err(LexError::StringNotClosed));
    }

    #[test]
    fn test_invalid_escape() {
        let mut lex = Lexer::new("\"bad \\q escape\"");
        assert_eq!(lex.next_token(), Err(LexError::InvalidEscape('q')));
    }

    #[test]
    fn test_keywords() {
        let input = "true false fn let if else return while";
        let mut lex = Lexer::new(input);

        assert_eq!(lex.next_token().unwrap().value, Token::True);
        assert_eq!(lex.next_token().unwrap().value, Token::False);
        assert_eq!(lex.next_token().unwrap().value, Token::Fn);
        assert_eq!(lex.next_token().unwrap().value, Token::Let);
        assert_eq!(lex.next_token().unwrap().value, Token::If);
        assert_eq!(lex.next_token().unwrap().value, Token::Else);
        assert_eq!(lex.next_token().unwrap().value, Token::Return);
        assert_eq!(lex.next_token().unwrap().value, Token::While);
    }

    #[test]
    fn test_unexpected_char() {
        let mut lex = Lexer::new("let a = 5 @");
        for _ in 0..4 {
            lex.next_token().unwrap();
        }
        assert_eq!(lex.next_token(), Err(LexError::UnexpectedChar('@')));
    }

    #[test]
    fn test_eof() {
        let mut lex = Lexer::new("");
        assert_eq!(lex.next_token().unwrap().value, Token::Eof);
        // Stays at Eof once the input is exhausted
        assert_eq!(lex.next_token().unwrap().value, Token::Eof);
    }

    #[test]
    fn test_spans() {
        let input = "abc 12\n+ return";
        let mut lex = Lexer::new(input);

        assert_eq!(
            lex.next_token().unwrap().span,
            Span::new(Position::new(1, 1), Position::new(1, 4))
        );
        assert_eq!(
            lex.next_token().unwrap().span,
            Span::new(Position::new(1, 5), Position::new(1, 7))
        );
        assert_eq!(
            lex.next_token().unwrap().span,
            Span::new(Position::new(2, 1), Position::new(2, 2))
        );
        assert_eq!(
            lex.next_token().unwrap().span,
            Span::new(Position::new(2, 3), Position::new(2, 9))
        );

        // The span no longer changes upon hitting eof
        let final_span = Span::new(Position::new(2, 9), Position::new(2, 9));
        assert_eq!(lex.next_token().unwrap().span, final_span);
        assert_eq!(lex.next_token().unwrap().span, final_span);
    }
}
