use super::{CONFIG_ACTIONS, HISTORY_KEYWORD, HISTORY_SUBCOMMANDS, SCAN_TARGETS, SHOW_DIRECTIONS};
use crate::lexer::{split_segments, split_words_lenient};
use crate::profile::{ProfileRegistry, PAYLOAD_TYPE};
use crate::session::SessionConfig;

/// Candidates for the word under the cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// Byte offset where the word being completed starts
    pub start: usize,
    /// Replacement candidates, filtered by prefix
    pub candidates: Vec<String>,
}

impl Completion {
    fn empty(start: usize) -> Self {
        Self {
            start,
            candidates: Vec::new(),
        }
    }

    fn matching<I, S>(start: usize, partial: &str, pool: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut candidates: Vec<String> = Vec::new();
        for item in pool {
            let item = item.as_ref();
            if item.starts_with(partial) && !candidates.iter().any(|c| c == item) {
                candidates.push(item.to_string());
            }
        }
        Self { start, candidates }
    }
}

/// Everything completion needs to know about the running shell
#[derive(Debug, Clone, Copy)]
pub struct CompletionContext<'a> {
    /// Profile schema
    pub registry: &'a ProfileRegistry,
    /// Current session mapping
    pub session: &'a SessionConfig,
    /// Top-level command names
    pub commands: &'a [&'a str],
}

impl<'a> CompletionContext<'a> {
    /// Bundle the completion inputs
    pub fn new(
        registry: &'a ProfileRegistry,
        session: &'a SessionConfig,
        commands: &'a [&'a str],
    ) -> Self {
        Self {
            registry,
            session,
            commands,
        }
    }

    /// Complete the word ending at byte offset `cursor` of `line`
    pub fn complete(&self, line: &str, cursor: usize) -> Completion {
        let mut cursor = cursor.min(line.len());
        while !line.is_char_boundary(cursor) {
            cursor -= 1;
        }
        let before = &line[..cursor];

        let word_start = before
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace() || *c == ',')
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);

        let trimmed = before.trim_start();
        let lead = before.len() - trimmed.len();

        let Some(end) = trimmed.find(char::is_whitespace) else {
            return Completion::matching(lead, trimmed, self.commands.iter());
        };

        let command = trimmed[..end].to_ascii_lowercase();
        let args = &before[lead + end..];

        match command.as_str() {
            "set" => self.complete_set(before, args, word_start),
            "help" => positional(args, word_start, |idx, _| {
                if idx == 0 {
                    let mut pool: Vec<String> = self.commands.iter().map(|c| c.to_string()).collect();
                    pool.extend(self.registry.known_options().iter().map(|o| o.to_string()));
                    pool
                } else {
                    Vec::new()
                }
            }),
            "history" => positional(args, word_start, |idx, words| match idx {
                0 => owned(HISTORY_SUBCOMMANDS),
                1 if words.first().map(String::as_str) == Some("show") => owned(SHOW_DIRECTIONS),
                _ => Vec::new(),
            }),
            "config" => positional(args, word_start, |idx, _| {
                if idx == 0 {
                    owned(CONFIG_ACTIONS)
                } else {
                    Vec::new()
                }
            }),
            "scan" => positional(args, word_start, |idx, _| {
                if idx == 0 {
                    owned(SCAN_TARGETS)
                } else {
                    Vec::new()
                }
            }),
            _ => Completion::empty(word_start),
        }
    }

    fn complete_set(&self, before: &str, args: &str, word_start: usize) -> Completion {
        let segment = split_segments(args)
            .pop()
            .map(|(_, s)| s)
            .unwrap_or_default();
        let tokens = split_words_lenient(segment);
        let trailing = segment.is_empty() || segment.ends_with(char::is_whitespace);

        if tokens.is_empty() || (tokens.len() == 1 && !trailing) {
            let partial = tokens.first().map(String::as_str).unwrap_or("");
            if let Some((key, value)) = partial.split_once('=') {
                let start = before[word_start..]
                    .find('=')
                    .map(|i| word_start + i + 1)
                    .unwrap_or(before.len());
                return Completion::matching(start, value, self.value_candidates(&key.to_ascii_lowercase()));
            }
            return Completion::matching(word_start, partial, self.option_candidates());
        }

        let key = tokens[0].to_ascii_lowercase();
        let partial = match (tokens.len(), trailing) {
            (1, true) => "",
            (2, false) => tokens[1].as_str(),
            _ => return Completion::empty(word_start),
        };
        Completion::matching(word_start, partial, self.value_candidates(&key))
    }

    fn option_candidates(&self) -> Vec<String> {
        match self.session.payload_type() {
            None => vec![PAYLOAD_TYPE.to_string(), HISTORY_KEYWORD.to_string()],
            Some(pt) => self
                .registry
                .get_profile(pt)
                .map(|p| p.options().map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }

    fn value_candidates(&self, key: &str) -> Vec<String> {
        match key {
            PAYLOAD_TYPE => owned(&self.registry.list_profiles()),
            HISTORY_KEYWORD => Vec::new(),
            other => owned(&self.registry.option_spec(other).values()),
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Complete the n-th bare word after a command from a fixed vocabulary
fn positional<F>(args: &str, word_start: usize, vocabulary: F) -> Completion
where
    F: FnOnce(usize, &[String]) -> Vec<String>,
{
    let words = split_words_lenient(args);
    let trailing = args.ends_with(char::is_whitespace);
    let (idx, partial) = match words.last() {
        Some(last) if !trailing => (words.len() - 1, last.as_str()),
        _ => (words.len(), ""),
    };
    Completion::matching(word_start, partial, vocabulary(idx, &words))
}
