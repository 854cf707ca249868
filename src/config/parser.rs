use crate::config::types::Config;
use crate::error::{GitcfgError, ParseError, ParseErrorKind, Result};
use std::io::BufRead;
use std::path::Path;
use std::str::{Chars, FromStr};
use tracing::{debug, trace};

/// Parse a config file from the given path.
pub fn parse_config_file(path: &Path) -> Result<Config> {
	parse_config_file_with(path, false)
}

/// Parse a config file, optionally in [strict](Parser::strict) mode.
pub fn parse_config_file_with(path: &Path, strict: bool) -> Result<Config> {
	let content = std::fs::read_to_string(path).map_err(|source| {
		if source.kind() == std::io::ErrorKind::NotFound {
			GitcfgError::ConfigNotFound {
				path: path.to_path_buf(),
			}
		} else {
			GitcfgError::ConfigReadError {
				path: path.to_path_buf(),
				source,
			}
		}
	})?;

	Parser::new(content.lines())
		.strict(strict)
		.parse()
		.map_err(|source| GitcfgError::ConfigParseError {
			path: path.to_path_buf(),
			source,
		})
}

/// Parse a config from a string (useful for testing).
pub fn parse_config_str(content: &str) -> std::result::Result<Config, ParseError> {
	parse_lines(content.lines())
}

/// Parse a config from any buffered reader, one line at a time.
///
/// Reading stops at the first grammar error or I/O error, whichever comes
/// first in the stream.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Config> {
	let mut lines = ReaderLines {
		lines: reader.lines(),
		error: None,
	};
	let parsed = Parser::new(&mut lines).parse();

	if let Some(source) = lines.error {
		return Err(GitcfgError::ReadError { source });
	}
	Ok(parsed?)
}

/// Lines of a reader, ending at the first I/O error and keeping it.
struct ReaderLines<R> {
	lines: std::io::Lines<R>,
	error: Option<std::io::Error>,
}

impl<R: BufRead> Iterator for ReaderLines<R> {
	type Item = String;

	fn next(&mut self) -> Option<String> {
		match self.lines.next()? {
			Ok(line) => Some(line),
			Err(e) => {
				self.error = Some(e);
				None
			}
		}
	}
}

/// Parse a config from a sequence of lines with their endings removed.
pub fn parse_lines<I>(lines: I) -> std::result::Result<Config, ParseError>
where
	I: IntoIterator,
	I::Item: AsRef<str>,
{
	Parser::new(lines.into_iter()).parse()
}

impl FromStr for Config {
	type Err = ParseError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		parse_config_str(s)
	}
}

/// Single pass, line driven parser filling a [`Config`].
///
/// The only state carried from one line to the next is the current section
/// and sub-section, and a value being continued with a trailing `\`.
#[derive(Debug)]
pub struct Parser<I> {
	lines: I,
	config: Config,
	line_no: usize,
	section: String,
	sub_section: String,
	strict: bool,
}

impl<I> Parser<I>
where
	I: Iterator,
	I::Item: AsRef<str>,
{
	pub fn new(lines: I) -> Self {
		Self {
			lines,
			config: Config::new(),
			line_no: 0,
			section: String::new(),
			sub_section: String::new(),
			strict: false,
		}
	}

	/// Reject unknown escapes in sub-section names instead of dropping them.
	pub fn strict(mut self, strict: bool) -> Self {
		self.strict = strict;
		self
	}

	/// Consume every line, stopping at the first grammar error.
	pub fn parse(mut self) -> std::result::Result<Config, ParseError> {
		while let Some(line) = self.next_line() {
			let mut scanner = Scanner::new(line.as_ref(), self.line_no);
			self.parse_line(&mut scanner)?;
		}

		debug!(
			lines = self.line_no,
			sections = self.config.sections.len(),
			"parsed config"
		);
		Ok(self.config)
	}

	fn next_line(&mut self) -> Option<I::Item> {
		let line = self.lines.next()?;
		self.line_no += 1;
		Some(line)
	}

	fn parse_line(&mut self, scanner: &mut Scanner<'_>) -> std::result::Result<(), ParseError> {
		scanner.skip_whitespace();
		match scanner.peek() {
			None | Some(';' | '#') => Ok(()),
			Some('[') => {
				self.parse_section(scanner)?;
				self.parse_key_value(scanner)
			}
			Some(_) => self.parse_key_value(scanner),
		}
	}

	/// Read a `[section "sub-section"]` header, leaving the scanner after `]`.
	fn parse_section(&mut self, scanner: &mut Scanner<'_>) -> std::result::Result<(), ParseError> {
		// opening bracket
		scanner.next();

		let mut section = String::new();
		let mut sub_section: Option<String> = None;

		while let Some(c) = scanner.next() {
			match c {
				c if c.is_whitespace() => {}
				';' | '#' => {
					return Err(scanner.error(ParseErrorKind::UnexpectedInSectionName { c, section }));
				}
				'[' => return Err(scanner.error(ParseErrorKind::NestedBracket { section })),
				']' => {
					if section.is_empty() {
						return Err(scanner.error(ParseErrorKind::EmptySectionName));
					}
					let sub_section = sub_section.unwrap_or_default();
					trace!(line = scanner.line_no, %section, %sub_section, "section header");
					self.section = section;
					self.sub_section = sub_section;
					return Ok(());
				}
				'"' if section.is_empty() => {
					return Err(scanner.error(ParseErrorKind::QuoteBeforeSectionName));
				}
				'"' if sub_section.is_some() => {
					return Err(scanner.error(ParseErrorKind::DuplicateSubSection { section }));
				}
				'"' => sub_section = Some(self.parse_sub_section(scanner)?),
				c if sub_section.is_some() => {
					return Err(scanner.error(ParseErrorKind::NameAfterSubSection { c, section }));
				}
				c => section.push(c),
			}
		}

		Err(scanner.error(ParseErrorKind::UnterminatedSection))
	}

	/// Read a quoted sub-section name; the opening quote is already consumed.
	fn parse_sub_section(&self, scanner: &mut Scanner<'_>) -> std::result::Result<String, ParseError> {
		let mut name = String::new();

		while let Some(c) = scanner.next() {
			match c {
				'"' => return Ok(name),
				'\\' => match scanner.next() {
					Some('"') => name.push('"'),
					Some('t') => name.push('\t'),
					Some('n') => name.push('\n'),
					Some('\\') => name.push('\\'),
					Some(c) if self.strict => {
						return Err(scanner.error(ParseErrorKind::InvalidSubSectionEscape { c }));
					}
					// any other escaped character is dropped along with the backslash
					Some(_) => {}
					None => break,
				},
				c => name.push(c),
			}
		}

		Err(scanner.error(ParseErrorKind::UnterminatedSubSection))
	}

	/// Read `key`, `key = value` or nothing from the rest of the line.
	fn parse_key_value(&mut self, scanner: &mut Scanner<'_>) -> std::result::Result<(), ParseError> {
		let key = match scan_key(scanner)? {
			KeyEnd::Nothing => return Ok(()),
			KeyEnd::Flag(key) => {
				self.record(&key, None);
				return Ok(());
			}
			KeyEnd::Assign(key) => key,
		};

		let mut value = ValueState::default();
		let mut end = value.scan(scanner)?;
		while end == ValueEnd::Continued {
			let Some(line) = self.next_line() else {
				break;
			};
			let mut scanner = Scanner::new(line.as_ref(), self.line_no);
			end = value.scan(&mut scanner)?;
		}

		self.record(&key, Some(value.value));
		Ok(())
	}

	fn record(&mut self, key: &str, value: Option<String>) {
		self.config
			.add_key_value(&self.section, &self.sub_section, key, value);
	}
}

/// One physical line, read a character at a time.
struct Scanner<'l> {
	line: &'l str,
	line_no: usize,
	chars: Chars<'l>,
	char_pos: usize,
}

impl<'l> Scanner<'l> {
	fn new(line: &'l str, line_no: usize) -> Self {
		Self {
			line,
			line_no,
			chars: line.chars(),
			char_pos: 0,
		}
	}

	fn next(&mut self) -> Option<char> {
		let c = self.chars.next()?;
		self.char_pos += 1;
		Some(c)
	}

	fn peek(&self) -> Option<char> {
		self.chars.clone().next()
	}

	fn skip_whitespace(&mut self) {
		while self.peek().is_some_and(char::is_whitespace) {
			self.next();
		}
	}

	/// True if only whitespace is left on the line.
	fn at_blank_end(&self) -> bool {
		self.chars.as_str().trim().is_empty()
	}

	fn error(&self, kind: ParseErrorKind) -> ParseError {
		ParseError {
			kind,
			line: self.line.to_string(),
			line_no: self.line_no,
			char_pos: self.char_pos,
		}
	}
}

#[derive(Debug, PartialEq, Eq)]
enum KeyEnd {
	/// Nothing but whitespace or a comment.
	Nothing,
	/// A key with no `=`.
	Flag(String),
	/// A key followed by `=`; the value starts after it.
	Assign(String),
}

fn scan_key(scanner: &mut Scanner<'_>) -> std::result::Result<KeyEnd, ParseError> {
	let mut key = String::new();
	let mut done_key = false;

	while let Some(c) = scanner.next() {
		match c {
			c if c.is_whitespace() => done_key = !key.is_empty(),
			'=' if key.is_empty() => return Err(scanner.error(ParseErrorKind::MissingKey)),
			'=' => return Ok(KeyEnd::Assign(key)),
			// comment after a section header
			';' | '#' if key.is_empty() => return Ok(KeyEnd::Nothing),
			c if done_key => {
				return Err(scanner.error(ParseErrorKind::UnexpectedAfterKey { c, key }));
			}
			c if key.is_empty() && !c.is_ascii_alphabetic() => {
				return Err(scanner.error(ParseErrorKind::InvalidKeyStart { c }));
			}
			c if c.is_ascii_alphanumeric() || c == '-' => key.push(c),
			c => return Err(scanner.error(ParseErrorKind::InvalidKeyChar { c, key })),
		}
	}

	if key.is_empty() {
		Ok(KeyEnd::Nothing)
	} else {
		Ok(KeyEnd::Flag(key))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueEnd {
	Complete,
	/// The line ended in a `\`, the value goes on with the next line.
	Continued,
}

/// A value being read, possibly over several lines.
#[derive(Debug, Default)]
struct ValueState {
	value: String,
	/// Whitespace seen since the last kept character.
	pending_space: String,
	started: bool,
}

impl ValueState {
	fn scan(&mut self, scanner: &mut Scanner<'_>) -> std::result::Result<ValueEnd, ParseError> {
		let mut quoted = false;

		while let Some(c) = scanner.next() {
			match c {
				c if c.is_whitespace() => {
					if self.started {
						self.pending_space.push(c);
					}
				}
				'\\' => {
					let escaped = match scanner.next() {
						Some('"') => '"',
						Some('t') => '\t',
						Some('n') => '\n',
						Some('\\') => '\\',
						// a quote can't be carried over to the next line
						None if quoted => return Err(self.unterminated(scanner)),
						None => return Ok(ValueEnd::Continued),
						Some(c) if c.is_whitespace() && scanner.at_blank_end() => {
							if quoted {
								return Err(self.unterminated(scanner));
							}
							return Ok(ValueEnd::Continued);
						}
						Some(c) => return Err(scanner.error(ParseErrorKind::InvalidEscape { c })),
					};
					self.push(escaped);
				}
				';' | '#' if !quoted => return Ok(ValueEnd::Complete),
				'"' => {
					self.flush_space();
					quoted = !quoted;
				}
				c => self.push(c),
			}
		}

		if quoted {
			return Err(self.unterminated(scanner));
		}
		Ok(ValueEnd::Complete)
	}

	fn unterminated(&self, scanner: &Scanner<'_>) -> ParseError {
		scanner.error(ParseErrorKind::UnterminatedQuote {
			value: self.value.clone(),
		})
	}

	fn flush_space(&mut self) {
		self.started = true;
		self.value.push_str(&self.pending_space);
		self.pending_space.clear();
	}

	fn push(&mut self, c: char) {
		self.flush_space();
		self.value.push(c);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(content: &str) -> Config {
		parse_config_str(content).unwrap()
	}

	fn parse_err(content: &str) -> ParseError {
		parse_config_str(content).unwrap_err()
	}

	fn value(config: &Config, key: &str) -> Option<String> {
		config.get_string(key).map(str::to_string)
	}

	#[test]
	fn test_parse_empty_config() {
		let config = parse("");
		assert!(config.is_empty());

		let config = parse("\n   \n# only comments\n\t; here\n");
		assert!(config.is_empty());
	}

	#[test]
	fn test_parse_comments_and_spacing() {
		let content = r#"# comment line
[foo]
# commented line
; commented line
    c = word ; some comment
    cc = word # some comment
    ccc = word;some comment
    cccc = word#some comment
    q = "word#some comment"
    qq = "word;some comment"
    qqq = "word # some comment"
    qqqq = "word ; some comment"
    x = y
    A = B C
    B =   zz  zz
"#;
		let config = parse(content);

		assert_eq!(value(&config, "foo.c").as_deref(), Some("word"));
		assert_eq!(value(&config, "foo.cc").as_deref(), Some("word"));
		assert_eq!(value(&config, "foo.ccc").as_deref(), Some("word"));
		assert_eq!(value(&config, "foo.cccc").as_deref(), Some("word"));
		assert_eq!(value(&config, "foo.q").as_deref(), Some("word#some comment"));
		assert_eq!(value(&config, "foo.qq").as_deref(), Some("word;some comment"));
		assert_eq!(value(&config, "foo.qqq").as_deref(), Some("word # some comment"));
		assert_eq!(value(&config, "foo.qqqq").as_deref(), Some("word ; some comment"));
		assert_eq!(value(&config, "FOO.X").as_deref(), Some("y"));
		assert_eq!(value(&config, "FOO.A").as_deref(), Some("B C"));
		assert_eq!(value(&config, "foo.B").as_deref(), Some("zz  zz"));
	}

	#[test]
	fn test_trailing_whitespace_dropped() {
		let config = parse("[foo]\n    B =   zz  zz  \t\n    C = x   ; note\n");
		assert_eq!(value(&config, "foo.b").as_deref(), Some("zz  zz"));
		assert_eq!(value(&config, "foo.c").as_deref(), Some("x"));
	}

	#[test]
	fn test_parse_line_continuation() {
		let config = parse("[foo]\n    runOver = B\\\n C\n");
		assert_eq!(value(&config, "FOO.runOver").as_deref(), Some("B C"));

		let config = parse("[foo]\nlong = one\\\n  two\\\n  three\nnext = x\n");
		assert_eq!(value(&config, "foo.long").as_deref(), Some("one  two  three"));
		assert_eq!(value(&config, "foo.next").as_deref(), Some("x"));
	}

	#[test]
	fn test_continuation_at_end_of_input() {
		let config = parse("[foo]\nkey = dangling\\");
		assert_eq!(value(&config, "foo.key").as_deref(), Some("dangling"));
	}

	#[test]
	fn test_continuation_with_trailing_space() {
		let config = parse("[foo]\nkey = a\\   \nb\n");
		assert_eq!(value(&config, "foo.key").as_deref(), Some("ab"));
	}

	#[test]
	fn test_continuation_error_reports_second_line() {
		let error = parse_err("[foo]\nkey = a\\\n \"open\n");
		assert_eq!(error.line_no, 3);
		assert!(matches!(error.kind, ParseErrorKind::UnterminatedQuote { .. }));
	}

	#[test]
	fn test_quote_not_continued() {
		let error = parse_err("[s]\nk = \"abc\\\ndef\n");
		assert_eq!(error.line_no, 2);
		assert!(matches!(error.kind, ParseErrorKind::UnterminatedQuote { ref value } if value == "abc"));

		let error = parse_err("[s]\nk = \"a;b\\\nc;d\"\n");
		assert_eq!(error.line_no, 2);

		let error = parse_err("[s]\nk = \"a \\  \nb\"\n");
		assert!(matches!(error.kind, ParseErrorKind::UnterminatedQuote { .. }));

		// closed before the backslash, so continuing is fine
		let config = parse("[s]\nk = \"a;b\" \\\nc\n");
		assert_eq!(value(&config, "s.k").as_deref(), Some("a;b c"));
	}

	#[test]
	fn test_parse_section_with_inline_value() {
		let config = parse("[some] key = value\n[other] ; just a comment\nflag\n");
		assert_eq!(value(&config, "some.key").as_deref(), Some("value"));
		assert_eq!(
			config.get_raw("other.flag").unwrap().values,
			vec![None::<String>]
		);
	}

	#[test]
	fn test_parse_sub_sections() {
		let content = r#"[something "Somewhere"]
    some-key = some-value
    another-key = another-value
[something "Some\"Quote.and random"]
    a = b
[Spaced "  padded  "]
    k = v
"#;
		let config = parse(content);

		assert_eq!(
			value(&config, "something.Somewhere.some-key").as_deref(),
			Some("some-value")
		);
		assert_eq!(value(&config, "something.somewhere.some-key"), None);
		assert_eq!(
			value(&config, "something.Some\"Quote.and random.a").as_deref(),
			Some("b")
		);
		assert!(config.sub_section("spaced", "  padded  ").is_some());
	}

	#[test]
	fn test_sub_section_escapes() {
		let config = parse("[s \"a\\tb\\\\c\\qd\"]\nk = v\n");
		assert!(config.sub_section("s", "a\tb\\cd").is_some());
	}

	#[test]
	fn test_strict_sub_section_escapes() {
		let error = Parser::new(["[s \"a\\qb\"]"].into_iter())
			.strict(true)
			.parse()
			.unwrap_err();
		assert_eq!(error.kind, ParseErrorKind::InvalidSubSectionEscape { c: 'q' });
	}

	#[test]
	fn test_base_values_and_repeats() {
		let config = parse("top = 1\n[arrays]\n    key1 = a\n    key1 = b\n    key1 = c\n");
		assert_eq!(value(&config, "top").as_deref(), Some("1"));
		assert_eq!(value(&config, "arrays.key1").as_deref(), Some("c"));
		assert_eq!(
			config.get_strings("arrays.key1"),
			Some(vec!["a", "b", "c"])
		);
	}

	#[test]
	fn test_section_resets_sub_section() {
		let config = parse("[a \"sub\"]\nx = 1\n[a]\ny = 2\n");
		assert_eq!(value(&config, "a.sub.x").as_deref(), Some("1"));
		assert_eq!(value(&config, "a.y").as_deref(), Some("2"));
		assert_eq!(value(&config, "a.sub.y"), None);
	}

	#[test]
	fn test_value_escapes_and_quotes() {
		let config = parse(
			"[v]\nesc = a\\tb\\nc\\\\d\\\"e\nmixed = one \"two  three\" four\nempty =\nquoted = \"  padded \"\n",
		);
		assert_eq!(value(&config, "v.esc").as_deref(), Some("a\tb\nc\\d\"e"));
		assert_eq!(value(&config, "v.mixed").as_deref(), Some("one two  three four"));
		assert_eq!(value(&config, "v.empty").as_deref(), Some(""));
		assert_eq!(value(&config, "v.quoted").as_deref(), Some("  padded "));
	}

	#[test]
	fn test_error_positions() {
		let error = parse_err("[ok]\n  bad_key = 1\n");
		assert_eq!(error.line_no, 2);
		assert_eq!(error.char_pos, 6);
		assert_eq!(error.line, "  bad_key = 1");
		assert_eq!(
			error.kind,
			ParseErrorKind::InvalidKeyChar {
				c: '_',
				key: "bad".to_string()
			}
		);
	}

	#[test]
	fn test_key_errors() {
		assert_eq!(
			parse_err("1key = v").kind,
			ParseErrorKind::InvalidKeyStart { c: '1' }
		);
		assert_eq!(
			parse_err("two words = v").kind,
			ParseErrorKind::UnexpectedAfterKey {
				c: 'w',
				key: "two".to_string()
			}
		);
		assert_eq!(parse_err("  = v").kind, ParseErrorKind::MissingKey);
	}

	#[test]
	fn test_value_errors() {
		assert_eq!(
			parse_err("k = a\\qb").kind,
			ParseErrorKind::InvalidEscape { c: 'q' }
		);
		assert_eq!(
			parse_err("k = \"open").kind,
			ParseErrorKind::UnterminatedQuote {
				value: "open".to_string()
			}
		);
	}

	#[test]
	fn test_section_errors() {
		assert_eq!(
			parse_err("[foo").kind,
			ParseErrorKind::UnterminatedSection
		);
		assert_eq!(
			parse_err("[fo;o]").kind,
			ParseErrorKind::UnexpectedInSectionName {
				c: ';',
				section: "fo".to_string()
			}
		);
		assert_eq!(
			parse_err("[a[b]").kind,
			ParseErrorKind::NestedBracket {
				section: "a".to_string()
			}
		);
		assert_eq!(
			parse_err("[\"sub\"]").kind,
			ParseErrorKind::QuoteBeforeSectionName
		);
		assert_eq!(
			parse_err("[a \"b\" \"c\"]").kind,
			ParseErrorKind::DuplicateSubSection {
				section: "a".to_string()
			}
		);
		assert_eq!(
			parse_err("[a \"b\" c]").kind,
			ParseErrorKind::NameAfterSubSection {
				c: 'c',
				section: "a".to_string()
			}
		);
		assert_eq!(parse_err("[ ]").kind, ParseErrorKind::EmptySectionName);
		assert_eq!(
			parse_err("[a \"open]").kind,
			ParseErrorKind::UnterminatedSubSection
		);
	}

	#[test]
	fn test_parse_reader() {
		let reader = std::io::Cursor::new("[core]\r\n\teditor = vim\r\n");
		let config = parse_reader(reader).unwrap();
		assert_eq!(value(&config, "core.editor").as_deref(), Some("vim"));
	}

	#[test]
	fn test_parse_reader_stops_at_grammar_error() {
		use std::io::Read;

		struct FailAfter {
			data: std::io::Cursor<&'static str>,
		}

		impl std::io::Read for FailAfter {
			fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
				match self.data.read(buf)? {
					0 => Err(std::io::Error::other("disk gone")),
					n => Ok(n),
				}
			}
		}

		let reader = std::io::BufReader::new(FailAfter {
			data: std::io::Cursor::new("[core\n\teditor = vim\n"),
		});
		assert!(matches!(
			parse_reader(reader),
			Err(GitcfgError::Parse(ParseError { line_no: 1, .. }))
		));

		let reader = std::io::BufReader::new(FailAfter {
			data: std::io::Cursor::new("[core]\n\teditor = vim\n"),
		});
		assert!(matches!(
			parse_reader(reader),
			Err(GitcfgError::ReadError { .. })
		));
	}

	#[test]
	fn test_parse_config_file_strict() {
		let dir = tempfile::TempDir::new().unwrap();
		let path = dir.path().join("config");
		std::fs::write(&path, "[remote \"or\\igin\"]\n\turl = x\n").unwrap();

		let config = parse_config_file(&path).unwrap();
		assert_eq!(value(&config, "remote.orgin.url").as_deref(), Some("x"));

		let error = parse_config_file_with(&path, true).unwrap_err();
		assert!(matches!(error, GitcfgError::ConfigParseError { ref source, .. }
			if matches!(source.kind, ParseErrorKind::InvalidSubSectionEscape { c: 'i' })));
	}

	#[test]
	fn test_parse_config_file_not_found() {
		let result = parse_config_file(Path::new("/definitely/not/here/.gitconfig"));
		assert!(matches!(result, Err(GitcfgError::ConfigNotFound { .. })));
	}

	#[test]
	fn test_from_str() {
		let config: Config = "[user]\nname = Joe".parse().unwrap();
		assert_eq!(value(&config, "user.name").as_deref(), Some("Joe"));
	}
}
