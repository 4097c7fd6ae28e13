//! GNU-style tokenization of raw process arguments into an [`ArgMap`].
//!
//! Only flat keys are produced. Values stay strings (or booleans); coercion
//! is left to the option's parser.

use super::source::ArgMap;
use super::value::Value;

/// Key under which positional arguments are collected.
pub const POSITIONAL_KEY: &str = "_";

/// Tokenizes `args` (without the program name).
///
/// - `--key=value` and `--key value` set `key` to `"value"`
/// - `--key` followed by another flag or nothing sets `key` to `true`
/// - `--key true|false` sets a boolean
/// - `--no-key` sets `key` to `false`
/// - `-abc` sets `a`, `b` and `c`; the last one may take the next token as its value
/// - `-k=value` and `-n5` attach the value to the single letter
/// - repeated keys accumulate into a list
/// - everything else, and all tokens after `--`, is positional under `_`
pub fn parse_args<I, S>(args: I) -> ArgMap
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let tokens: Vec<String> = args.into_iter().map(Into::into).collect();
    let mut parsed = Tokenizer::new(&tokens);
    parsed.run();
    parsed.finish()
}

struct Tokenizer<'a> {
    tokens: &'a [String],
    pos: usize,
    map: ArgMap,
    positional: Vec<Value>,
}

impl<'a> Tokenizer<'a> {
    fn new(tokens: &'a [String]) -> Self {
        let mut map = ArgMap::new();
        // reserve the first slot so `_` leads the map
        map.insert(POSITIONAL_KEY.to_string(), Value::List(Vec::new()));
        Self {
            tokens,
            pos: 0,
            map,
            positional: Vec::new(),
        }
    }

    fn run(&mut self) {
        let tokens = self.tokens;
        while let Some(token) = tokens.get(self.pos) {
            self.pos += 1;

            if token == "--" {
                self.positional
                    .extend(tokens[self.pos..].iter().map(|t| Value::from(t.as_str())));
                self.pos = tokens.len();
            } else if let Some(flag) = token.strip_prefix("--") {
                self.long_flag(flag);
            } else if token.len() > 1 && token.starts_with('-') {
                self.short_flags(&token[1..]);
            } else {
                self.positional.push(Value::from(token.as_str()));
            }
        }
    }

    fn long_flag(&mut self, flag: &str) {
        if let Some((key, value)) = flag.split_once('=') {
            self.set(key, Value::from(value));
        } else if let Some(key) = flag.strip_prefix("no-").filter(|k| !k.is_empty()) {
            self.set(key, Value::Bool(false));
        } else {
            let value = self.take_value();
            self.set(flag, value);
        }
    }

    fn short_flags(&mut self, body: &str) {
        let letters: Vec<char> = body.chars().collect();
        let Some((&last, leading)) = letters.split_last() else {
            return;
        };

        for (j, &letter) in leading.iter().enumerate() {
            let rest: String = letters[j + 1..].iter().collect();
            let key = letter.to_string();

            if let Some(value) = rest.strip_prefix('=') {
                self.set(&key, Value::from(value));
                return;
            }
            if letter.is_ascii_alphabetic() && looks_numeric(&rest) {
                self.set(&key, Value::from(rest));
                return;
            }
            let next = letters[j + 1];
            if !(next.is_alphanumeric() || next == '_') {
                self.set(&key, Value::from(rest));
                return;
            }
            self.set(&key, Value::Bool(true));
        }

        if last != '-' {
            let value = self.take_value();
            self.set(&last.to_string(), value);
        }
    }

    /// Consumes the next token as a flag's value if it is not itself a flag.
    fn take_value(&mut self) -> Value {
        let tokens = self.tokens;
        match tokens.get(self.pos) {
            Some(next) if !is_flag(next) => {
                self.pos += 1;
                match next.as_str() {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    other => Value::from(other),
                }
            }
            _ => Value::Bool(true),
        }
    }

    fn set(&mut self, key: &str, value: Value) {
        match self.map.get_mut(key) {
            None | Some(Value::Bool(_)) => {
                self.map.insert(key.to_string(), value);
            }
            Some(Value::List(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::take(existing);
                *existing = Value::List(vec![first, value]);
            }
        }
    }

    fn finish(mut self) -> ArgMap {
        self.map
            .insert(POSITIONAL_KEY.to_string(), Value::List(self.positional));
        self.map
    }
}

fn is_flag(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

fn looks_numeric(s: &str) -> bool {
    !s.is_empty()
        && s.chars().any(|c| c.is_ascii_digit())
        && s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | '-'))
        && s.parse::<f64>().is_ok()
}
