//! [`MenuProvider`] that delegates to an external dmenu-style picker.
//!
//! The picker protocol is the lowest common denominator of dmenu, rofi and
//! friends: the candidate lines arrive on stdin, the chosen line leaves on
//! stdout, and a non-zero exit status means the user backed out.
//!
//! The two flavours differ only in the arguments they pass:
//!
//! ```text
//! dmenu -p '(wmpick) Workspace: ' -l 3
//! rofi  -p '(wmpick) Workspace: ' -dmenu [-u 0,2] [-a 1]
//! ```

use crate::menu::{strip_line_terminator, Choice, Entry, EntryMark, MenuError};
use crate::traits::MenuProvider;
use log::{debug, info};
use std::io::{self, Write};
use std::process::{Child, Command, Output, Stdio};

/// Builds the flavour-specific part of a picker command line.
pub trait PickerArgs {
    /// Arguments following the program and its configured extra arguments.
    fn args<T>(&self, prompt: &str, entries: &[&Entry<T>]) -> Vec<String>;
}

/// dmenu: shows the entries as a vertical list as tall as the entry count.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dmenu;

/// rofi in dmenu mode: plain list filtering, with rows optionally flagged
/// as urgent (`-u`) or active (`-a`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Rofi;

impl PickerArgs for Dmenu {
    fn args<T>(&self, prompt: &str, entries: &[&Entry<T>]) -> Vec<String> {
        vec![
            "-p".into(),
            prompt.into(),
            "-l".into(),
            entries.len().to_string(),
        ]
    }
}

/// Comma-separated 0-based rows carrying `mark`.
fn marked_rows<T>(entries: &[&Entry<T>], mark: EntryMark) -> String {
    entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.mark() == Some(mark))
        .map(|(row, _)| row.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

impl PickerArgs for Rofi {
    fn args<T>(&self, prompt: &str, entries: &[&Entry<T>]) -> Vec<String> {
        let mut args = vec!["-p".into(), prompt.into(), "-dmenu".into()];
        let errors = marked_rows(entries, EntryMark::Erroneous);
        if !errors.is_empty() {
            args.push("-u".into());
            args.push(errors);
        }
        let missing = marked_rows(entries, EntryMark::Missing);
        if !missing.is_empty() {
            args.push("-a".into());
            args.push(missing);
        }
        args
    }
}

/// Quote `s` for a POSIX shell, leaving simple words untouched.
pub fn shell_quote(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }
    if s.chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '=' | '/' | '.' | ':' | ','))
    {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// The lines handed to the picker: `"<n>: <label>"` with `n` counting from 1.
///
/// The index prefix keeps labels unique even when titles repeat, so the
/// label-to-entry mapping is one-to-one.
pub fn picker_labels<T>(entries: &[&Entry<T>]) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| format!("{}: {}", i + 1, e.label()))
        .collect()
}

/// Owns a spawned child and kills + reaps it unless it was handed off.
struct ChildGuard(Option<Child>);

impl ChildGuard {
    fn child(&mut self) -> Option<&mut Child> {
        self.0.as_mut()
    }

    /// Close stdin, collect stdout/stderr and wait for exit.
    fn wait_with_output(mut self) -> io::Result<Output> {
        match self.0.take() {
            Some(child) => child.wait_with_output(),
            None => Err(io::Error::other("picker already reaped")),
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.0.take() {
            debug!("killing picker pid {}", child.id());
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Run `command` through `sh -c`, feed it `input`, and return its stdout.
///
/// A non-zero exit status is reported as [`MenuError::NoInput`].
///
/// All of `input` is written before stdout and stderr are drained, so the
/// picker must read its whole input (or close stdin) before writing more
/// than a pipe buffer to either stream. dmenu and rofi both do.
pub fn run_picker(command: &str, input: &str) -> Result<String, MenuError> {
    let child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| MenuError::Spawn {
            command: command.to_string(),
            source,
        })?;
    let mut guard = ChildGuard(Some(child));

    if let Some(mut stdin) = guard.child().and_then(|c| c.stdin.take()) {
        match stdin.write_all(input.as_bytes()) {
            Ok(()) => {}
            // The picker is free to exit without reading everything.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!("picker closed stdin early");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let output = guard.wait_with_output()?;
    if !output.stderr.is_empty() {
        debug!("picker stderr: {}", String::from_utf8_lossy(&output.stderr).trim_end());
    }
    if !output.status.success() {
        debug!("picker exited with {}", output.status);
        return Err(MenuError::NoInput);
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// A [`MenuProvider`] backed by an external picker program.
#[derive(Debug, Clone)]
pub struct ExternalMenuProvider<A> {
    program: String,
    extra_args: Vec<String>,
    title: String,
    flavour: A,
}

pub type DmenuMenuProvider = ExternalMenuProvider<Dmenu>;
pub type RofiMenuProvider = ExternalMenuProvider<Rofi>;

impl<A: PickerArgs> ExternalMenuProvider<A> {
    /// `program` is inserted into the shell command line verbatim, so it may
    /// carry its own arguments.
    pub fn new(program: impl Into<String>, flavour: A, title: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
            title: title.into(),
            flavour,
        }
    }

    /// Arguments placed between the program and the flavour's own arguments.
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The full shell command line for one selection.
    pub fn command_line<T>(&self, prompt: &str, entries: &[&Entry<T>]) -> String {
        let prompt = format!("({}) {}: ", self.title, prompt);
        std::iter::once(self.program.clone())
            .chain(
                self.extra_args
                    .iter()
                    .cloned()
                    .chain(self.flavour.args(&prompt, entries))
                    .map(|a| shell_quote(&a)),
            )
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<A: PickerArgs> MenuProvider for ExternalMenuProvider<A> {
    fn select<T>(&self, entries: &[&Entry<T>], prompt: &str) -> Result<Choice, MenuError> {
        let labels = picker_labels(entries);
        let cmd = self.command_line(prompt, entries);
        info!("display menu: cmd={:?} options={}", cmd, labels.len());

        let output = run_picker(&cmd, &labels.join("\n"))?;
        let text = strip_line_terminator(&output).to_string();
        if entries.is_empty() {
            return Ok(Choice::Text(text));
        }
        labels
            .iter()
            .position(|label| *label == text)
            .map(Choice::Entry)
            .ok_or(MenuError::SelectionNotValid(text))
    }
}
