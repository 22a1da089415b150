use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::version::ModuleVersion;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{file}:{line}: {message}")]
    Syntax {
        file: String,
        line: usize,
        message: String,
    },
    #[error("{file}: missing go directive")]
    MissingGoDirective { file: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub path: String,
    pub version: ModuleVersion,
    pub indirect: bool,
}

/// The parts of a `go.mod` file the upgrade loop reasons about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModFile {
    pub module: Option<String>,
    pub go_version: String,
    pub toolchain: Option<String>,
    pub requires: Vec<Requirement>,
}

impl GoModFile {
    pub fn read(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&path.display().to_string(), &text)
    }

    pub fn parse(file_name: &str, text: &str) -> Result<Self, ManifestError> {
        let mut parser = Parser {
            file: file_name,
            module: None,
            go_version: None,
            toolchain: None,
            requires: Vec::new(),
        };

        let mut open_block: Option<(Verb, usize)> = None;
        for (index, raw_line) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = lex_line(raw_line).map_err(|message| parser.error(line_no, message))?;
            if line.tokens.is_empty() {
                continue;
            }

            if let Some((verb, _)) = open_block {
                if line.tokens == [Token::RParen] {
                    open_block = None;
                    continue;
                }
                parser.apply(verb, &line, line_no)?;
                continue;
            }

            let Token::Word(keyword) = &line.tokens[0] else {
                return Err(parser.error(line_no, "unexpected parenthesis".to_string()));
            };
            let verb = Verb::from_keyword(keyword)
                .ok_or_else(|| parser.error(line_no, format!("unknown directive: {keyword}")))?;
            let rest = Line {
                tokens: line.tokens[1..].to_vec(),
                comment: line.comment,
            };

            match rest.tokens.as_slice() {
                [Token::LParen] => {
                    if !verb.allows_block() {
                        let message = format!("{} does not accept a block", verb.keyword());
                        return Err(parser.error(line_no, message));
                    }
                    open_block = Some((verb, line_no));
                }
                [Token::LParen, Token::RParen] if verb.allows_block() => {}
                _ => parser.apply(verb, &rest, line_no)?,
            }
        }

        if let Some((verb, opened_at)) = open_block {
            let message = format!("unterminated {} block", verb.keyword());
            return Err(parser.error(opened_at, message));
        }

        let Some(go_version) = parser.go_version else {
            return Err(ManifestError::MissingGoDirective {
                file: file_name.to_string(),
            });
        };

        Ok(Self {
            module: parser.module,
            go_version,
            toolchain: parser.toolchain,
            requires: parser.requires,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Module,
    Go,
    Toolchain,
    Require,
    Godebug,
    Exclude,
    Replace,
    Retract,
    Tool,
    Ignore,
}

impl Verb {
    fn from_keyword(keyword: &str) -> Option<Self> {
        let verb = match keyword {
            "module" => Self::Module,
            "go" => Self::Go,
            "toolchain" => Self::Toolchain,
            "require" => Self::Require,
            "godebug" => Self::Godebug,
            "exclude" => Self::Exclude,
            "replace" => Self::Replace,
            "retract" => Self::Retract,
            "tool" => Self::Tool,
            "ignore" => Self::Ignore,
            _ => return None,
        };
        Some(verb)
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Go => "go",
            Self::Toolchain => "toolchain",
            Self::Require => "require",
            Self::Godebug => "godebug",
            Self::Exclude => "exclude",
            Self::Replace => "replace",
            Self::Retract => "retract",
            Self::Tool => "tool",
            Self::Ignore => "ignore",
        }
    }

    fn allows_block(self) -> bool {
        !matches!(self, Self::Module | Self::Go | Self::Toolchain)
    }
}

struct Parser<'a> {
    file: &'a str,
    module: Option<String>,
    go_version: Option<String>,
    toolchain: Option<String>,
    requires: Vec<Requirement>,
}

impl Parser<'_> {
    fn error(&self, line: usize, message: String) -> ManifestError {
        ManifestError::Syntax {
            file: self.file.to_string(),
            line,
            message,
        }
    }

    fn apply(&mut self, verb: Verb, line: &Line, line_no: usize) -> Result<(), ManifestError> {
        let words = line
            .words()
            .ok_or_else(|| self.error(line_no, "unexpected parenthesis".to_string()))?;

        match verb {
            Verb::Module => {
                let [path] = words.as_slice() else {
                    return Err(self.error(line_no, "usage: module module/path".to_string()));
                };
                if self.module.is_some() {
                    return Err(self.error(line_no, "repeated module statement".to_string()));
                }
                self.module = Some(path.to_string());
            }
            Verb::Go => {
                let [version] = words.as_slice() else {
                    return Err(self.error(line_no, "usage: go 1.23".to_string()));
                };
                if self.go_version.is_some() {
                    return Err(self.error(line_no, "repeated go statement".to_string()));
                }
                if !is_valid_go_version(version) {
                    return Err(self.error(line_no, format!("invalid go version '{version}'")));
                }
                self.go_version = Some(version.to_string());
            }
            Verb::Toolchain => {
                let [name] = words.as_slice() else {
                    return Err(self.error(line_no, "usage: toolchain go1.23.0".to_string()));
                };
                if self.toolchain.is_some() {
                    return Err(self.error(line_no, "repeated toolchain statement".to_string()));
                }
                self.toolchain = Some(name.to_string());
            }
            Verb::Require => {
                let [path, version] = words.as_slice() else {
                    let usage = "usage: require module/path v1.2.3".to_string();
                    return Err(self.error(line_no, usage));
                };
                if path.is_empty() {
                    return Err(self.error(line_no, "empty module path".to_string()));
                }
                let version = ModuleVersion::parse(version)
                    .map_err(|err| self.error(line_no, err.to_string()))?;
                self.requires.push(Requirement {
                    path: path.to_string(),
                    version,
                    indirect: line.is_indirect(),
                });
            }
            Verb::Godebug
            | Verb::Exclude
            | Verb::Replace
            | Verb::Retract
            | Verb::Tool
            | Verb::Ignore => {
                if words.is_empty() {
                    return Err(self.error(line_no, format!("empty {} statement", verb.keyword())));
                }
            }
        }

        Ok(())
    }
}

fn is_valid_go_version(version: &str) -> bool {
    let numeric_end = version
        .find(|ch: char| ch.is_ascii_lowercase())
        .unwrap_or(version.len());
    let (numeric, suffix) = version.split_at(numeric_end);

    let parts: Vec<&str> = numeric.split('.').collect();
    if !(2..=3).contains(&parts.len()) {
        return false;
    }
    let canonical_number = |part: &str| {
        !part.is_empty()
            && part.chars().all(|ch| ch.is_ascii_digit())
            && (part == "0" || !part.starts_with('0'))
    };
    if !parts.iter().all(|part| canonical_number(part)) || parts[0] == "0" {
        return false;
    }

    if suffix.is_empty() {
        return true;
    }
    let digits_at = suffix
        .find(|ch: char| ch.is_ascii_digit())
        .unwrap_or(suffix.len());
    let (label, number) = suffix.split_at(digits_at);
    !label.is_empty()
        && label.chars().all(|ch| ch.is_ascii_lowercase())
        && !number.is_empty()
        && number.chars().all(|ch| ch.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    LParen,
    RParen,
}

#[derive(Debug)]
struct Line {
    tokens: Vec<Token>,
    comment: Option<String>,
}

impl Line {
    fn words(&self) -> Option<Vec<&str>> {
        self.tokens
            .iter()
            .map(|token| match token {
                Token::Word(word) => Some(word.as_str()),
                Token::LParen | Token::RParen => None,
            })
            .collect()
    }

    fn is_indirect(&self) -> bool {
        self.comment.as_deref().is_some_and(|comment| {
            let comment = comment.trim();
            comment == "indirect" || comment.starts_with("indirect;")
        })
    }
}

fn lex_line(raw: &str) -> Result<Line, String> {
    let mut tokens = Vec::new();
    let mut comment = None;
    let mut chars = raw.char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        match ch {
            _ if ch.is_whitespace() => {
                chars.next();
            }
            '/' if raw[offset..].starts_with("//") => {
                comment = Some(raw[offset + 2..].to_string());
                break;
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '"' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, ch)) = chars.next() {
                    match ch {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some((_, escaped @ ('"' | '\\'))) => value.push(escaped),
                            Some((_, 'n')) => value.push('\n'),
                            Some((_, 't')) => value.push('\t'),
                            Some((_, other)) => {
                                return Err(format!("invalid escape '\\{other}' in quoted string"))
                            }
                            None => break,
                        },
                        _ => value.push(ch),
                    }
                }
                if !closed {
                    return Err("unterminated quoted string".to_string());
                }
                tokens.push(Token::Word(value));
            }
            '`' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                for (_, ch) in chars.by_ref() {
                    if ch == '`' {
                        closed = true;
                        break;
                    }
                    value.push(ch);
                }
                if !closed {
                    return Err("unterminated raw string".to_string());
                }
                tokens.push(Token::Word(value));
            }
            _ => {
                let mut end = raw.len();
                while let Some(&(next_offset, next)) = chars.peek() {
                    if next.is_whitespace()
                        || matches!(next, '(' | ')' | '"' | '`')
                        || raw[next_offset..].starts_with("//")
                    {
                        end = next_offset;
                        break;
                    }
                    chars.next();
                }
                tokens.push(Token::Word(raw[offset..end].to_string()));
            }
        }
    }

    Ok(Line { tokens, comment })
}
