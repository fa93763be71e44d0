// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Operator decisions.
//!
//! The sequencer never reads the terminal directly; it asks a [`Prompter`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use tokio::runtime::{Handle, RuntimeFlavor};

/// Source of yes/no and free-text answers.
pub trait Prompter {
    /// Ask a yes/no question. Anything but an explicit yes is a no.
    fn confirm(&self, question: &str) -> io::Result<bool>;

    /// Ask for a line of free text, returned without surrounding whitespace.
    fn ask(&self, question: &str) -> io::Result<String>;
}

/// Whether an answer counts as "yes".
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Prompts on stdout and reads answers from stdin.
///
/// Reads block the calling thread. On a multi-threaded tokio runtime the
/// worker is handed off with [`tokio::task::block_in_place`] for the
/// duration of the read.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn read_answer(prompt: &str) -> io::Result<String> {
        off_worker(|| read_answer_from(io::stdin().lock(), io::stdout().lock(), prompt))
    }
}

/// Write `prompt`, then read one trimmed line. End of input is
/// `UnexpectedEof`.
fn read_answer_from<I: BufRead, O: Write>(
    mut input: I,
    mut output: O,
    prompt: &str,
) -> io::Result<String> {
    write!(output, "{prompt}")?;
    output.flush()?;
    drop(output);

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
    }
    Ok(line.trim().to_string())
}

/// Run blocking `f` without stalling other tasks on a multi-threaded runtime.
fn off_worker<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str) -> io::Result<bool> {
        Self::read_answer(&format!("{question} [y/N] ")).map(|answer| is_yes(&answer))
    }

    fn ask(&self, question: &str) -> io::Result<String> {
        Self::read_answer(&format!("{question} "))
    }
}

/// Replays a fixed list of answers, for non-interactive runs and tests.
///
/// Running out of answers is reported as `UnexpectedEof`, like a closed
/// stdin.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<String>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: RefCell::new(answers.into_iter().map(Into::into).collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Questions asked so far, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    fn next(&self, question: &str) -> io::Result<String> {
        self.asked.borrow_mut().push(question.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer left"))
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, question: &str) -> io::Result<bool> {
        self.next(question).map(|answer| is_yes(&answer))
    }

    fn ask(&self, question: &str) -> io::Result<String> {
        self.next(question).map(|answer| answer.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn scripted_answers_replay_in_order() {
        let prompter = ScriptedPrompter::new(["y", "  ops@example.com "]);
        assert!(prompter.confirm("Generate a key?").unwrap());
        assert_eq!(prompter.ask("Email:").unwrap(), "ops@example.com");
        assert_eq!(prompter.asked(), vec!["Generate a key?", "Email:"]);
    }

    #[test]
    fn exhausted_script_is_eof() {
        let prompter = ScriptedPrompter::default();
        let err = prompter.confirm("Edit now?").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn answer_is_read_after_prompt_is_written() {
        let mut shown = Vec::new();
        let answer = read_answer_from(&b"  yes \nignored\n"[..], &mut shown, "Edit now? ").unwrap();
        assert_eq!(answer, "yes");
        assert_eq!(shown, b"Edit now? ");
    }

    #[test]
    fn closed_input_is_eof() {
        let err = read_answer_from(&b""[..], io::sink(), "Email: ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn blocking_reads_run_without_a_runtime() {
        assert_eq!(off_worker(|| 7), 7);
    }

    #[tokio::test]
    async fn blocking_reads_run_on_current_thread_runtime() {
        assert_eq!(off_worker(|| 7), 7);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn blocking_reads_leave_other_tasks_running() {
        let ticker = tokio::spawn(async { 1 });
        let answer = off_worker(|| {
            read_answer_from(&b"n\n"[..], io::sink(), "Generate a key? ").unwrap()
        });
        assert_eq!(answer, "n");
        assert_eq!(ticker.await.unwrap(), 1);
    }
}
