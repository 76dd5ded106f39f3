//! Markup tokenizer
//!
//! Converts cleaned markup text into a flat stream of lexical tokens.
//! Five-state machine; malformed input degrades to best-effort token
//! streams and never errors.

use std::collections::VecDeque;

/// One lexical unit of markup.
///
/// There is no distinct kind for tag names, attribute names or
/// attribute values: all three are `Literal`s whose meaning comes from
/// their position in the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `<`
    OpenBracket,
    /// `>`
    CloseBracket,
    /// `/>`
    SelfCloseBracket,
    /// `</`
    OpenCloseBracket,
    /// `=`
    Equals,
    /// Text run, tag name, attribute name or attribute value
    Literal(String),
}

/// Tokenizer state machine states
#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    ReadText,
    ReadStartTag,
    ReadEndTag,
    ReadAttributeName,
    ReadAttributeValue,
}

/// Streaming markup tokenizer
pub struct Tokenizer {
    input: Vec<char>,
    pos: usize,
    state: State,
    tokens: VecDeque<Token>,
}

impl Tokenizer {
    /// Create a new tokenizer for the given input
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            state: State::ReadText,
            tokens: VecDeque::new(),
        }
    }

    /// Tokenize a whole input in one call
    pub fn tokenize(input: &str) -> Vec<Token> {
        let mut tokenizer = Tokenizer::new(input);
        let mut tokens = Vec::new();
        while let Some(token) = tokenizer.next_token() {
            tokens.push(token);
        }
        tokens
    }

    /// Get the next token, or None when input is exhausted
    pub fn next_token(&mut self) -> Option<Token> {
        while self.tokens.is_empty() {
            if self.pos >= self.input.len() {
                return None;
            }
            self.step();
        }
        self.tokens.pop_front()
    }

    /// Peek at the current character without consuming
    fn current_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    /// Check if the input at the cursor starts with `s`
    fn at_str(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(offset, c)| self.input.get(self.pos + offset) == Some(&c))
    }

    fn emit(&mut self, token: Token) {
        self.tokens.push_back(token);
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current_char(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// Consume a run of characters until `stop` matches or input ends
    fn read_run(&mut self, stop: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while matches!(self.current_char(), Some(c) if !stop(c)) {
            self.pos += 1;
        }
        self.input[start..self.pos].iter().collect()
    }

    /// Execute one step of the state machine
    fn step(&mut self) {
        match self.state {
            State::ReadText => self.read_text(),
            State::ReadStartTag => self.read_start_tag(),
            State::ReadEndTag => self.read_end_tag(),
            State::ReadAttributeName => self.read_attribute_name(),
            State::ReadAttributeValue => self.read_attribute_value(),
        }
    }

    fn read_text(&mut self) {
        if self.at_str("</") {
            self.pos += 2;
            self.emit(Token::OpenCloseBracket);
            self.state = State::ReadEndTag;
        } else if self.current_char() == Some('<') {
            self.pos += 1;
            self.emit(Token::OpenBracket);
            self.state = State::ReadStartTag;
        } else {
            let text = self.read_run(|c| c == '<');
            self.emit(Token::Literal(text));
        }
    }

    fn read_start_tag(&mut self) {
        self.skip_whitespace();

        // DOCTYPE/SGML declarations are captured whole, never
        // decomposed into attributes
        if self.current_char() == Some('!') {
            let declaration = self.read_run(|c| c == '>');
            if self.current_char() == Some('>') {
                self.pos += 1;
            }
            self.emit(Token::Literal(declaration));
            self.emit(Token::CloseBracket);
            self.state = State::ReadText;
            return;
        }

        let name = self.read_run(|c| c.is_whitespace() || c == '/' || c == '>');
        self.emit(Token::Literal(name));
        self.skip_whitespace();

        if self.at_str("/>") {
            self.pos += 2;
            self.emit(Token::SelfCloseBracket);
            self.state = State::ReadText;
        } else if self.current_char() == Some('>') {
            self.pos += 1;
            self.emit(Token::CloseBracket);
            self.state = State::ReadText;
        } else {
            self.state = State::ReadAttributeName;
        }
    }

    fn read_end_tag(&mut self) {
        self.skip_whitespace();
        let name = self.read_run(|c| c.is_whitespace() || c == '>');
        self.emit(Token::Literal(name));
        self.skip_whitespace();
        if self.current_char() == Some('>') {
            self.pos += 1;
            self.emit(Token::CloseBracket);
        }
        self.state = State::ReadText;
    }

    fn read_attribute_name(&mut self) {
        self.skip_whitespace();

        if self.at_str("/>") {
            self.pos += 2;
            self.emit(Token::SelfCloseBracket);
            self.state = State::ReadText;
            return;
        }

        match self.current_char() {
            Some('>') => {
                self.pos += 1;
                self.emit(Token::CloseBracket);
                self.state = State::ReadText;
            }
            // Malformed trailing slash not part of '/>': tolerated
            Some('/') => {
                self.pos += 1;
            }
            Some('=') => {
                self.pos += 1;
                self.emit(Token::Equals);
                self.state = State::ReadAttributeValue;
            }
            Some(_) => {
                let name =
                    self.read_run(|c| c.is_whitespace() || c == '/' || c == '>' || c == '=');
                self.emit(Token::Literal(name));
            }
            None => {}
        }
    }

    fn read_attribute_value(&mut self) {
        self.skip_whitespace();

        match self.current_char() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                // Unterminated quote clamps to end of input
                let value = self.read_run(|c| c == quote);
                if self.current_char() == Some(quote) {
                    self.pos += 1;
                }
                self.emit(Token::Literal(value));
                self.state = State::ReadAttributeName;
            }
            Some(_) => {
                let value = self.read_run(|c| c.is_whitespace() || c == '/' || c == '>');
                self.emit(Token::Literal(value));
                self.state = State::ReadAttributeName;
            }
            None => self.state = State::ReadAttributeName,
        }
    }
}
