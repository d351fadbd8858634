// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Driver-side search pattern filtering for catalog functions.

/// Filter items by a SQL LIKE search pattern.
///
/// Patterns use `%` as multi-character wildcard and `_` as single-character
/// wildcard; `\` escapes the next character. If `pattern` is None, empty, or
/// `%`, all items are returned.
pub fn filter_by_pattern<T, F>(items: Vec<T>, pattern: Option<&str>, get_field: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    match pattern {
        None => items,
        Some(p) if p.is_empty() || p == "%" => items,
        Some(p) => items
            .into_iter()
            .filter(|item| like_match(p, get_field(item)))
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Any,
    One,
    Literal(char),
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        let token = match ch {
            '%' => Token::Any,
            '_' => Token::One,
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            ch => Token::Literal(ch),
        };
        tokens.push(token);
    }
    tokens
}

/// Match a string against a SQL LIKE pattern.
pub fn like_match(pattern: &str, text: &str) -> bool {
    let pattern = tokenize(pattern);
    let text: Vec<char> = text.chars().collect();
    like_match_recursive(&pattern, &text, 0, 0)
}

fn like_match_recursive(pattern: &[Token], text: &[char], pi: usize, ti: usize) -> bool {
    if pi == pattern.len() {
        return ti == text.len();
    }

    match pattern[pi] {
        Token::Any => {
            let mut pi = pi;
            while pi < pattern.len() && pattern[pi] == Token::Any {
                pi += 1;
            }
            (ti..=text.len()).any(|ti| like_match_recursive(pattern, text, pi, ti))
        }
        Token::One => ti < text.len() && like_match_recursive(pattern, text, pi + 1, ti + 1),
        Token::Literal(ch) => {
            ti < text.len() && text[ti] == ch && like_match_recursive(pattern, text, pi + 1, ti + 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_match_wildcards() {
        assert!(like_match("%", ""));
        assert!(like_match("tab%", "table"));
        assert!(like_match("t_ble", "table"));
        assert!(like_match("%bl%", "table"));
        assert!(!like_match("t_ble", "tble"));
        assert!(!like_match("tab", "table"));
    }

    #[test]
    fn test_like_match_escape() {
        assert!(like_match("my\\_table", "my_table"));
        assert!(!like_match("my\\_table", "myXtable"));
        assert!(like_match("100\\%", "100%"));
    }

    #[test]
    fn test_filter_by_pattern() {
        let names = vec!["alpha", "beta", "alps"];
        assert_eq!(filter_by_pattern(names.clone(), None, |s| *s).len(), 3);
        assert_eq!(filter_by_pattern(names.clone(), Some(""), |s| *s).len(), 3);
        assert_eq!(
            filter_by_pattern(names, Some("al%"), |s| *s),
            vec!["alpha", "alps"]
        );
    }
}
