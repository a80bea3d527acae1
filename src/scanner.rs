use crate::source::SourceSpan;
use derive_new::new;
use strum::Display;

const KEYWORDS: [&str; 15] = [
    "var", "fun", "num", "str", "bool", "void", "print", "if", "else", "while", "continue",
    "break", "return", "try", "catch",
];

// Longer operators first so that `>=` never scans as `>` followed by `=`.
const OPERATORS: [&str; 15] = [
    "&&", "||", ">=", "<=", "==", "!=", ">", "<", "=", "+", "-", "*", "/", "%", "!",
];

const SYMBOLS: [char; 7] = ['{', '}', '(', ')', ';', ':', ','];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum TokenKind {
    Number,
    String,
    Boolean,
    Operator,
    Symbol,
    Keyword,
    Identifier,
    Comment,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, new)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub offset: usize,
}

impl Token {
    pub fn span(&self) -> SourceSpan {
        (self.offset..self.offset + self.lexeme.len()).into()
    }
    pub fn is(&self, kind: TokenKind, lexeme: &str) -> bool {
        self.kind == kind && self.lexeme == lexeme
    }
}

/// Splits source text into tokens, one at a time. Scanning never fails: a
/// character that starts no known token comes out as a one-character
/// [`TokenKind::Invalid`] token and scanning carries on after it.
pub struct Scanner<'a> {
    source: &'a str,
    position: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.position..]
    }

    fn count_while<F: Fn(char) -> bool>(&self, from: usize, check: F) -> usize {
        self.source[from..]
            .char_indices()
            .find(|(_, ch)| !check(*ch))
            .map(|(idx, _)| idx)
            .unwrap_or(self.source.len() - from)
    }

    fn yield_token(&mut self, kind: TokenKind, length: usize) -> Token {
        let start = self.position;
        self.position += length;
        Token::new(kind, self.source[start..self.position].to_string(), start)
    }

    fn scan_comment(&mut self) -> Option<Token> {
        let rest = self.rest();
        if rest.starts_with("//") {
            let length = rest.find('\n').unwrap_or(rest.len());
            Some(self.yield_token(TokenKind::Comment, length))
        } else if rest.starts_with("/*") {
            // An unterminated comment swallows the rest of the input.
            let length = rest[2..]
                .find("*/")
                .map(|idx| idx + 4)
                .unwrap_or(rest.len());
            Some(self.yield_token(TokenKind::Comment, length))
        } else {
            None
        }
    }

    fn scan_number(&mut self) -> Option<Token> {
        let digits = self.count_while(self.position, |ch| ch.is_ascii_digit());
        if digits == 0 {
            return None;
        }
        let after_digits = self.position + digits;
        let mut length = digits;
        if self.source[after_digits..].starts_with('.') {
            let fraction = self.count_while(after_digits + 1, |ch| ch.is_ascii_digit());
            if fraction > 0 {
                length += 1 + fraction;
            }
        }
        Some(self.yield_token(TokenKind::Number, length))
    }

    fn scan_string(&mut self) -> Option<Token> {
        let rest = self.rest();
        if !rest.starts_with('"') {
            return None;
        }
        // No escapes: the next quote always closes the literal. Without one
        // the quote is not a string start at all.
        rest[1..]
            .find('"')
            .map(|idx| self.yield_token(TokenKind::String, idx + 2))
    }

    fn scan_word(&mut self) -> Option<Token> {
        match self.rest().chars().next() {
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {}
            _ => return None,
        }
        let length = self.count_while(self.position, |ch| ch.is_ascii_alphanumeric() || ch == '_');
        let word = &self.rest()[..length];
        let kind = if word == "true" || word == "false" {
            TokenKind::Boolean
        } else if KEYWORDS.contains(&word) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Some(self.yield_token(kind, length))
    }

    fn scan_operator(&mut self) -> Option<Token> {
        let rest = self.rest();
        OPERATORS
            .iter()
            .find(|op| rest.starts_with(*op))
            .map(|op| op.len())
            .map(|length| self.yield_token(TokenKind::Operator, length))
    }

    fn scan_symbol(&mut self) -> Option<Token> {
        match self.rest().chars().next() {
            Some(ch) if SYMBOLS.contains(&ch) => Some(self.yield_token(TokenKind::Symbol, 1)),
            _ => None,
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.position += self.count_while(self.position, char::is_whitespace);

        let first = self.rest().chars().next()?;

        // The order mirrors the token classes' precedence: comments before the
        // `/` operator, booleans before identifiers.
        self.scan_comment()
            .or_else(|| self.scan_number())
            .or_else(|| self.scan_string())
            .or_else(|| self.scan_word())
            .or_else(|| self.scan_operator())
            .or_else(|| self.scan_symbol())
            .or_else(|| Some(self.yield_token(TokenKind::Invalid, first.len_utf8())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scan(source: &str) -> Vec<(TokenKind, String, usize)> {
        Scanner::new(source)
            .map(|token| (token.kind, token.lexeme, token.offset))
            .collect()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::new(source).map(|token| token.kind).collect()
    }

    #[test]
    fn declaration() {
        use TokenKind::*;
        assert_eq!(
            scan("var x: num = 12.5;"),
            vec![
                (Keyword, "var".to_string(), 0),
                (Identifier, "x".to_string(), 4),
                (Symbol, ":".to_string(), 5),
                (Keyword, "num".to_string(), 7),
                (Operator, "=".to_string(), 11),
                (Number, "12.5".to_string(), 13),
                (Symbol, ";".to_string(), 17),
            ]
        );
    }

    #[test]
    fn operators_prefer_longest_match() {
        use TokenKind::*;
        let lexemes: Vec<_> = Scanner::new("a>=b<=c==d!=e&&f||!g%h")
            .filter(|token| token.kind == Operator)
            .map(|token| token.lexeme)
            .collect();
        assert_eq!(lexemes, vec![">=", "<=", "==", "!=", "&&", "||", "!", "%"]);
    }

    #[test]
    fn booleans_are_whole_words() {
        use TokenKind::*;
        assert_eq!(
            scan("true trueish false"),
            vec![
                (Boolean, "true".to_string(), 0),
                (Identifier, "trueish".to_string(), 5),
                (Boolean, "false".to_string(), 13),
            ]
        );
    }

    #[test]
    fn strings_keep_their_quotes_and_no_escapes() {
        use TokenKind::*;
        assert_eq!(
            scan(r#""a\n" x"#),
            vec![
                (String, r#""a\n""#.to_string(), 0),
                (Identifier, "x".to_string(), 6)
            ]
        );
    }

    #[test]
    fn comments_are_tokens() {
        use TokenKind::*;
        assert_eq!(
            scan("1 // one\n/* two */ 2 /* open"),
            vec![
                (Number, "1".to_string(), 0),
                (Comment, "// one".to_string(), 2),
                (Comment, "/* two */".to_string(), 9),
                (Number, "2".to_string(), 19),
                (Comment, "/* open".to_string(), 21),
            ]
        );
    }

    #[test]
    fn division_is_not_a_comment() {
        use TokenKind::*;
        assert_eq!(kinds("6 / 3"), vec![Number, Operator, Number]);
    }

    #[test]
    fn trailing_dot_is_not_part_of_a_number() {
        use TokenKind::*;
        assert_eq!(
            scan("1."),
            vec![(Number, "1".to_string(), 0), (Invalid, ".".to_string(), 1)]
        );
    }

    #[test]
    fn unknown_characters_become_single_invalid_tokens() {
        use TokenKind::*;
        assert_eq!(
            scan("a # é &"),
            vec![
                (Identifier, "a".to_string(), 0),
                (Invalid, "#".to_string(), 2),
                (Invalid, "é".to_string(), 4),
                (Invalid, "&".to_string(), 7),
            ]
        );
    }

    #[test]
    fn unterminated_string_quote_is_invalid() {
        use TokenKind::*;
        assert_eq!(kinds("\"abc"), vec![Invalid, Identifier]);
    }

    #[test]
    fn keywords() {
        let source = super::KEYWORDS.join(" ");
        assert!(Scanner::new(&source).all(|token| token.kind == TokenKind::Keyword));
    }
}
