use std::fmt::Display;
use std::rc::Rc;

use tracing::trace;

use crate::ast::{
    ArrayLiteral, BlockStatement, CallExpression, Expression, FunctionLiteral, IdentifierLiteral,
    IfExpression, IndexExpression, InfixExpression, PrefixExpression, Program, Statement,
    WhileExpression,
};
use crate::lexer::{LexError, Lexer};
use crate::span::{Span, WithSpan};
use crate::token::Token;

#[derive(Debug, PartialEq)]
pub enum ParseError {
    /// The token source failed; parsing cannot continue
    Lex(LexError),
    /// A token with no prefix rule showed up in expression position
    Unexpected {
        got: WithSpan<Token>,
        after: Option<WithSpan<Token>>,
    },
    /// A structural token (`=`, `)`, `{`, ...) was missing
    Expected {
        expected: String,
        got: WithSpan<Token>,
        after: Option<WithSpan<Token>>,
    },
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::Lex(err)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Lex(err) => write!(f, "{}", err),
            ParseError::Unexpected { got, after } => {
                write!(f, "Unexpected token {}", got.at_str())?;
                if let Some(after) = after {
                    write!(f, " (after {})", after.value)?;
                }
                Ok(())
            }
            ParseError::Expected {
                expected,
                got,
                after,
            } => {
                write!(
                    f,
                    "Expected next token to be {}, but got {} {}",
                    expected,
                    got.value.describe(),
                    got.span.at_str()
                )?;
                if let Some(after) = after {
                    write!(f, " (after {})", after.value)?;
                }
                Ok(())
            }
        }
    }
}

type ParseResult<T> = Result<T, ParseError>;

/// Binding power ladder, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

impl Precedence {
    fn of(token: &Token) -> Precedence {
        match token {
            Token::EqualEqual | Token::BangEqual => Precedence::Equals,
            Token::LessThan | Token::GreaterThan => Precedence::LessGreater,
            Token::Plus | Token::Minus => Precedence::Sum,
            Token::Star | Token::Slash => Precedence::Product,
            Token::LeftParen => Precedence::Call,
            Token::LeftBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,

    current_token: WithSpan<Token>,
    peek_token: WithSpan<Token>,
    /// The token before `current_token`, kept for error context
    previous_token: Option<WithSpan<Token>>,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Parser<'a> {
        Parser {
            lexer,
            current_token: WithSpan::new(Token::Eof, Span::empty()),
            peek_token: WithSpan::new(Token::Eof, Span::empty()),
            previous_token: None,
        }
    }

    /// Parse the whole token stream into a program, aborting on the
    /// first lexical or syntactic failure.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        // Pull the first two tokens into the current/peek pair
        self.next_token()?;
        self.next_token()?;
        self.previous_token = None;

        let mut program = Program::new();

        while self.current_token.value != Token::Eof {
            program.statements.push(self.parse_statement()?);
        }

        Ok(program)
    }

    fn next_token(&mut self) -> ParseResult<()> {
        let next = self.lexer.next_token()?;
        self.previous_token = Some(std::mem::replace(
            &mut self.current_token,
            std::mem::replace(&mut self.peek_token, next),
        ));
        Ok(())
    }

    /// Each statement parser consumes through its optional trailing
    /// semicolon, leaving `current_token` at the start of the next statement.
    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current_token.value {
            Token::Let => self.parse_let_statement(),
            Token::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> ParseResult<Statement> {
        let name = self.expect_peek_identifier()?;
        self.expect_peek(Token::Equal)?;

        self.next_token()?;
        let value = self.parse_expression(Precedence::Lowest)?;
        self.next_token()?;
        self.eat_optional_semicolon()?;

        Ok(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Statement> {
        // Consume the `return` token
        self.next_token()?;

        let value = self.parse_expression(Precedence::Lowest)?;
        self.next_token()?;
        self.eat_optional_semicolon()?;

        Ok(Statement::Return { value })
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.next_token()?;
        self.eat_optional_semicolon()?;

        Ok(Statement::Expression { expression })
    }

    fn eat_optional_semicolon(&mut self) -> ParseResult<()> {
        if self.current_token.value == Token::Semicolon {
            self.next_token()?;
        }
        Ok(())
    }

    /// Pratt expression parsing: dispatch the prefix rule for the current
    /// token, then fold infix rules while the lookahead binds tighter.
    /// Leaves `current_token` on the last token of the expression.
    fn parse_expression(&mut self, precedence: Precedence) -> ParseResult<Expression> {
        trace!(token = %self.current_token.value, "parse expression");

        let mut left = self.parse_prefix()?;

        while self.peek_token.value != Token::Semicolon
            && precedence < Precedence::of(&self.peek_token.value)
        {
            self.next_token()?;
            left = self.parse_infix(left)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expression> {
        match &self.current_token.value {
            Token::Identifier(name) => {
                Ok(Expression::Identifier(IdentifierLiteral::from(name.clone())))
            }
            Token::Integer(value) => Ok(Expression::Integer(*value)),
            Token::String(value) => Ok(Expression::String(value.clone())),
            Token::True => Ok(Expression::Boolean(true)),
            Token::False => Ok(Expression::Boolean(false)),

            Token::Bang | Token::Minus => self.parse_prefix_expression(),
            Token::LeftParen => self.parse_grouped_expression(),
            Token::LeftBracket => self.parse_array_literal(),
            Token::If => self.parse_if_expression(),
            Token::While => self.parse_while_expression(),
            Token::Fn => self.parse_function_literal(),

            _ => Err(ParseError::Unexpected {
                got: self.current_token.clone(),
                after: self.previous_token.clone(),
            }),
        }
    }

    fn parse_infix(&mut self, left: Expression) -> ParseResult<Expression> {
        match self.current_token.value {
            Token::Plus
            | Token::Minus
            | Token::Star
            | Token::Slash
            | Token::EqualEqual
            | Token::BangEqual
            | Token::LessThan
            | Token::GreaterThan => self.parse_infix_expression(left),
            Token::LeftParen => self.parse_call_expression(left),
            Token::LeftBracket => self.parse_index_expression(left),
            // Unreachable while the precedence table and this match agree
            _ => Err(ParseError::Unexpected {
                got: self.current_token.clone(),
                after: self.previous_token.clone(),
            }),
        }
    }

    fn parse_prefix_expression(&mut self) -> ParseResult<Expression> {
        let operator = self.current_token.value.clone();
        self.next_token()?;
        let right = self.parse_expression(Precedence::Prefix)?;

        Ok(Expression::Prefix(Box::new(PrefixExpression {
            operator,
            right,
        })))
    }

    fn parse_infix_expression(&mut self, left: Expression) -> ParseResult<Expression> {
        let operator = self.current_token.value.clone();
        let precedence = Precedence::of(&operator);
        self.next_token()?;
        let right = self.parse_expression(precedence)?;

        Ok(Expression::Infix(Box::new(InfixExpression {
            left,
            operator,
            right,
        })))
    }

    fn parse_grouped_expression(&mut self) -> ParseResult<Expression> {
        self.next_token()?;
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Token::RightParen)?;
        Ok(expression)
    }

    fn parse_array_literal(&mut self) -> ParseResult<Expression> {
        let elements = self.parse_expression_list(Token::RightBracket)?;
        Ok(Expression::Array(Box::new(ArrayLiteral { elements })))
    }

    fn parse_if_expression(&mut self) -> ParseResult<Expression> {
        self.expect_peek(Token::LeftParen)?;
        self.next_token()?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Token::RightParen)?;
        self.expect_peek(Token::LeftBrace)?;

        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek_token.value == Token::Else {
            self.next_token()?;
            self.expect_peek(Token::LeftBrace)?;
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        Ok(Expression::If(Box::new(IfExpression {
            condition,
            consequence,
            alternative,
        })))
    }

    fn parse_while_expression(&mut self) -> ParseResult<Expression> {
        self.expect_peek(Token::LeftParen)?;
        self.next_token()?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Token::RightParen)?;
        self.expect_peek(Token::LeftBrace)?;

        let body = self.parse_block_statement()?;

        Ok(Expression::While(Box::new(WhileExpression {
            condition,
            body,
        })))
    }

    fn parse_function_literal(&mut self) -> ParseResult<Expression> {
        self.expect_peek(Token::LeftParen)?;
        let parameters = self.parse_function_parameters()?;
        self.expect_peek(Token::LeftBrace)?;
        let body = self.parse_block_statement()?;

        Ok(Expression::Function(Box::new(FunctionLiteral {
            parameters,
            body: Rc::new(body),
        })))
    }

    fn parse_function_parameters(&mut self) -> ParseResult<Vec<IdentifierLiteral>> {
        let mut parameters = Vec::new();

        if self.peek_token.value == Token::RightParen {
            self.next_token()?;
            return Ok(parameters);
        }

        parameters.push(IdentifierLiteral::from(self.expect_peek_identifier()?));

        while self.peek_token.value == Token::Comma {
            self.next_token()?;
            parameters.push(IdentifierLiteral::from(self.expect_peek_identifier()?));
        }

        self.expect_peek(Token::RightParen)?;

        Ok(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> ParseResult<Expression> {
        let arguments = self.parse_expression_list(Token::RightParen)?;
        Ok(Expression::Call(Box::new(CallExpression {
            function,
            arguments,
        })))
    }

    fn parse_index_expression(&mut self, left: Expression) -> ParseResult<Expression> {
        self.next_token()?;
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Token::RightBracket)?;

        Ok(Expression::Index(Box::new(IndexExpression { left, index })))
    }

    /// Comma-separated expressions delimited by `end`; `current_token`
    /// sits on the opening delimiter when called.
    fn parse_expression_list(&mut self, end: Token) -> ParseResult<Vec<Expression>> {
        let mut list = Vec::new();

        if self.peek_token.value == end {
            self.next_token()?;
            return Ok(list);
        }

        self.next_token()?;
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token.value == Token::Comma {
            self.next_token()?;
            self.next_token()?;
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;

        Ok(list)
    }

    /// `current_token` sits on the `{` when called; leaves it on the `}`.
    fn parse_block_statement(&mut self) -> ParseResult<BlockStatement> {
        let mut statements = Vec::new();

        self.next_token()?;

        while self.current_token.value != Token::RightBrace {
            if self.current_token.value == Token::Eof {
                return Err(ParseError::Expected {
                    expected: Token::RightBrace.describe(),
                    got: self.current_token.clone(),
                    after: self.previous_token.clone(),
                });
            }
            statements.push(self.parse_statement()?);
        }

        Ok(BlockStatement { statements })
    }

    fn expect_peek(&mut self, token: Token) -> ParseResult<()> {
        if self.peek_token.value == token {
            self.next_token()
        } else {
            Err(ParseError::Expected {
                expected: token.describe(),
                got: self.peek_token.clone(),
                after: Some(self.current_token.clone()),
            })
        }
    }

    fn expect_peek_identifier(&mut self) -> ParseResult<String> {
        let name = match &self.peek_token.value {
            Token::Identifier(name) => name.to_owned(),
            _ => {
                return Err(ParseError::Expected {
                    expected: String::from("identifier"),
                    got: self.peek_token.clone(),
                    after: Some(self.current_token.clone()),
                })
            }
        };

        self.next_token()?;
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Expression, IdentifierLiteral, Program, Statement};
    use crate::lexer::{LexError, Lexer};
    use crate::parser::{ParseError, Parser};

    fn setup(input: &str, stmt_count: usize) -> Program {
        let lexer = Lexer::new(input);
        let mut parser = Parser::new(lexer);

        match parser.parse_program() {
            Ok(prog) => {
                if stmt_count != 0 && prog.statements.len() != stmt_count {
                    panic!(
                        "expected {} statement(s) for '{}' but got {:?}",
                        stmt_count, input, prog.statements
                    )
                }
                prog
            }
            Err(error) => panic!("parser error for '{}': {}", input, error),
        }
    }

    fn parse_error(input: &str) -> ParseError {
        let lexer = Lexer::new(input);
        let mut parser = Parser::new(lexer);

        match parser.parse_program() {
            Ok(prog) => panic!("expected a parse error for '{}' but got '{}'", input, prog),
            Err(error) => error,
        }
    }

    #[test]
    fn test_let_statement() {
        let input = "\
        let x = 5;
        let y = 10;
        let foobar = y;";

        let prog = setup(input, 3);

        let tests = vec![
            ("x", Expression::Integer(5)),
            ("y", Expression::Integer(10)),
            (
                "foobar",
                Expression::Identifier(IdentifierLiteral::from("y")),
            ),
        ];

        for (statement, (name, value)) in prog.statements.into_iter().zip(tests) {
            assert_eq!(
                statement,
                Statement::Let {
                    name: name.to_string(),
                    value
                }
            );
        }
    }

    #[test]
    fn test_return_statement() {
        let input = "\
        return 5;
        return y;";

        let prog = setup(input, 2);

        let tests = vec![
            Expression::Integer(5),
            Expression::Identifier(IdentifierLiteral::from("y")),
        ];

        for (statement, value) in prog.statements.into_iter().zip(tests) {
            assert_eq!(statement, Statement::Return { value });
        }
    }

    #[test]
    fn test_optional_semicolons() {
        // Terminators may be omitted at the end of the program and
        // wherever the next token starts a new statement
        setup("5", 1);
        setup("let x = 5", 1);
        setup("return 5", 1);
        setup("a b", 2);
        setup("if (x) { 1 }", 1);
    }

    #[test]
    fn test_operator_precedence() {
        let tests = vec![
            ("-a * b", "((-a) * b);"),
            ("!!true", "(!(!true));"),
            ("a + b + c", "((a + b) + c);"),
            ("a + b - c", "((a + b) - c);"),
            ("a * b * c", "((a * b) * c);"),
            ("a * b / c", "((a * b) / c);"),
            ("a + b / c", "(a + (b / c));"),
            ("1 + 2 * 3", "(1 + (2 * 3));"),
            ("5 / 2 * 2", "((5 / 2) * 2);"),
            ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f);"),
            ("3 + 4; -5 * 5", "(3 + 4); ((-5) * 5);"),
            ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4));"),
            ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4));"),
            (
                "3 + 4 * 5 == 3 * 1 + 4 * 5",
                "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)));",
            ),
            ("(5 + 5) * 2", "((5 + 5) * 2);"),
            ("2 / (5 + 5)", "(2 / (5 + 5));"),
            ("-(5 + 5)", "(-(5 + 5));"),
            ("!(true == true)", "(!(true == true));"),
            ("a + add(b * c) + d", "((a + add((b * c))) + d);"),
            (
                "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
                "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)));",
            ),
            ("a * [1, 2, 3, 4][b * c] * d", "((a * ([1, 2, 3, 4][(b * c)])) * d);"),
            (
                "add(a * b[2], b[1], 2 * [1, 2][1])",
                "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])));",
            ),
        ];

        for (input, expected) in tests {
            let prog = setup(input, 0);
            assert_eq!(prog.to_string(), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_string_literal() {
        let prog = setup("\"hello world\";", 1);
        assert_eq!(
            prog.statements[0],
            Statement::Expression {
                expression: Expression::String("hello world".to_string())
            }
        );
    }

    #[test]
    fn test_if_expression() {
        let prog = setup("if (x < y) { x }", 1);
        assert_eq!(prog.to_string(), "(if ((x < y)) { x; });");

        let prog = setup("if (x < y) { x } else { y }", 1);
        assert_eq!(prog.to_string(), "(if ((x < y)) { x; } else { y; });");
    }

    #[test]
    fn test_while_expression() {
        let prog = setup("while (a < 5) { let a = a + 1; }", 1);
        assert_eq!(prog.to_string(), "(while ((a < 5)) { let a = (a + 1); });");
    }

    #[test]
    fn test_function_literal() {
        let prog = setup("fn(x, y) { x + y; }", 1);

        match &prog.statements[0] {
            Statement::Expression {
                expression: Expression::Function(func),
            } => {
                assert_eq!(
                    func.parameters,
                    vec![
                        IdentifierLiteral::from("x"),
                        IdentifierLiteral::from("y")
                    ]
                );
                assert_eq!(func.body.to_string(), "{ (x + y); }");
            }
            stmt => panic!("expected a function literal statement but got {}", stmt),
        }
    }

    #[test]
    fn test_function_parameters() {
        let tests = vec![
            ("fn() {};", vec![]),
            ("fn(x) {};", vec!["x"]),
            ("fn(x, y, z) {};", vec!["x", "y", "z"]),
        ];

        for (input, expected) in tests {
            let prog = setup(input, 1);
            match &prog.statements[0] {
                Statement::Expression {
                    expression: Expression::Function(func),
                } => {
                    let names: Vec<String> =
                        func.parameters.iter().map(|p| p.name.clone()).collect();
                    assert_eq!(names, expected, "input: {}", input);
                }
                stmt => panic!("expected a function literal statement but got {}", stmt),
            }
        }
    }

    #[test]
    fn test_call_expression() {
        let prog = setup("add(1, 2 * 3, 4 + 5);", 1);
        assert_eq!(prog.to_string(), "add(1, (2 * 3), (4 + 5));");

        let prog = setup("fn(x) { x; }(5)", 1);
        assert_eq!(prog.to_string(), "(fn(x) { x; })(5);");
    }

    #[test]
    fn test_array_and_index() {
        let prog = setup("[1, 2 * 2, 3 + 3]", 1);
        assert_eq!(prog.to_string(), "[1, (2 * 2), (3 + 3)];");

        let prog = setup("[]", 1);
        assert_eq!(prog.to_string(), "[];");

        let prog = setup("myArray[1 + 1]", 1);
        assert_eq!(prog.to_string(), "(myArray[(1 + 1)]);");
    }

    #[test]
    fn test_expected_token_errors() {
        let tests = vec![
            (
                "let x 5;",
                "Expected next token to be =, but got integer (at 1:7) (after x)",
            ),
            (
                "let = 5;",
                "Expected next token to be identifier, but got = (at 1:5) (after let)",
            ),
            (
                "if x { 1 }",
                "Expected next token to be (, but got identifier (at 1:4) (after if)",
            ),
            (
                "fn(x, 1) { x }",
                "Expected next token to be identifier, but got integer (at 1:7) (after ,)",
            ),
        ];

        for (input, expected) in tests {
            let error = parse_error(input);
            assert_eq!(error.to_string(), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_unexpected_token_error() {
        let error = parse_error("1 + ;");
        match error {
            ParseError::Unexpected { got, .. } => {
                assert_eq!(got.value, crate::token::Token::Semicolon)
            }
            error => panic!("expected an unexpected-token error but got {}", error),
        }
    }

    #[test]
    fn test_unclosed_block() {
        let error = parse_error("if (x) { 1");
        match error {
            ParseError::Expected { expected, .. } => assert_eq!(expected, "}"),
            error => panic!("expected a missing-brace error but got {}", error),
        }
    }

    #[test]
    fn test_lex_error_aborts_parse() {
        let error = parse_error("let x = 12_;");
        assert_eq!(error, ParseError::Lex(LexError::InvalidInteger));
    }

    #[test]
    fn test_round_trip() {
        // Parsing the emitted source again must produce the same tree
        let inputs = vec![
            "let x = 1 + 2 * 3; x;",
            "let adder = fn(x) { fn(y) { x + y } }; adder(5)(3);",
            "if (x < y) { x } else { y }",
            "while (a < 5) { let a = a + 1; puts(a); }",
            "[1, \"two\", [3]][2]",
            "return -x != !y;",
        ];

        for input in inputs {
            let first = setup(input, 0);
            let second = setup(&first.to_string(), 0);
            assert_eq!(
                first.statements, second.statements,
                "input: {} reprinted: {}",
                input, first
            );
        }
    }
}
