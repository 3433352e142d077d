//! Entries, menus and the selection results shared by every provider.
//!
//! A [`Menu`] is built by the caller, handed to the
//! [`Context`](crate::context::Context), and rendered by whichever
//! [`MenuProvider`](crate::traits::MenuProvider) is active.  Providers only
//! ever see a slice of borrowed entries and answer with a [`Choice`] that
//! points back into that slice by position.

use std::borrow::Cow;

/// Advisory marking shown next to an entry by pickers that support it.
///
/// Marks are purely cosmetic: they never change which entry a label maps
/// to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMark {
    /// The entry is in an erroneous state (rofi `-u`).
    Erroneous,
    /// The entry is required but has no value yet (rofi `-a`).
    Missing,
}

/// One selectable option.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    title: String,
    token: String,
    value: T,
    is_group: bool,
    mark: Option<EntryMark>,
}

impl<T> Entry<T> {
    /// Create an entry whose token is the same as its title.
    pub fn new(title: impl Into<String>, value: T) -> Self {
        let title = title.into();
        Self {
            token: title.clone(),
            title,
            value,
            is_group: false,
            mark: None,
        }
    }

    /// Replace the fallback label used when the title is empty.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Flag the entry as opening another menu rather than completing one.
    pub fn group(mut self) -> Self {
        self.is_group = true;
        self
    }

    pub fn with_mark(mut self, mark: EntryMark) -> Self {
        self.mark = Some(mark);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn is_group(&self) -> bool {
        self.is_group
    }

    pub fn mark(&self) -> Option<EntryMark> {
        self.mark
    }

    /// The text a provider displays: the title, or the token when the title
    /// is empty.
    ///
    /// Always a single line: every `\r` or `\n` becomes a space.
    pub fn label(&self) -> Cow<'_, str> {
        let text = if self.title.is_empty() {
            &self.token
        } else {
            &self.title
        };
        if text.contains(['\r', '\n']) {
            Cow::Owned(text.replace(['\r', '\n'], " "))
        } else {
            Cow::Borrowed(text)
        }
    }
}

/// An ordered list of entries plus the prompt shown above them.
#[derive(Debug, Clone, PartialEq)]
pub struct Menu<T> {
    prompt: String,
    entries: Vec<Entry<T>>,
}

impl<T> Menu<T> {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            entries: Vec::new(),
        }
    }

    pub fn with_entries(prompt: impl Into<String>, entries: Vec<Entry<T>>) -> Self {
        Self {
            prompt: prompt.into(),
            entries,
        }
    }

    /// Append an entry, keeping insertion order.
    pub fn push(&mut self, entry: Entry<T>) {
        self.entries.push(entry);
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow every entry, in order, for which `predicate` holds.
    ///
    /// The menu itself is left untouched; a fresh list is produced on every
    /// call.
    pub fn filtered<F>(&self, predicate: F) -> Vec<&Entry<T>>
    where
        F: Fn(&Entry<T>) -> bool,
    {
        self.entries.iter().filter(|e| predicate(e)).collect()
    }
}

/// What a provider answers after one round-trip with the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// Position of the chosen entry in the slice given to
    /// [`select`](crate::traits::MenuProvider::select).
    Entry(usize),
    /// Free text typed by the user (only when no entries were offered).
    Text(String),
}

/// Errors a provider can raise while obtaining a choice.
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    /// The user cancelled, the input stream ended, or the picker exited
    /// with a non-zero status.  Abort the current flow.
    #[error("no input")]
    NoInput,
    /// The input does not correspond to any displayed entry.
    #[error("selection not valid: {0:?}")]
    SelectionNotValid(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The external picker could not be started.
    #[error("failed to run {command:?}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Strip exactly one trailing line terminator, if present.
pub(crate) fn strip_line_terminator(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}
