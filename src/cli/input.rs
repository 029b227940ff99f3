// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Line editor for the admin shell.
//!
//! Wraps rustyline with the shell completer, a persistent history file
//! and a prompt that shows the session time left.

use anyhow::{Context, Result};
use rustyline::history::DefaultHistory;
use rustyline::{ColorMode, CompletionType, Config, EditMode, Editor};
use std::path::{Path, PathBuf};

use super::completer::ShellCompleter;

/// History file name in the data directory.
const HISTORY_FILE: &str = "history.txt";

const MAX_HISTORY_ENTRIES: usize = 500;

/// Remaining session time at or below which the prompt turns yellow.
const LOW_TIME_SECS: i64 = 5 * 60;

pub struct InteractiveInput {
    editor: Editor<ShellCompleter, DefaultHistory>,
    history_path: PathBuf,
}

impl InteractiveInput {
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .history_ignore_dups(true)?
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .color_mode(ColorMode::Enabled)
            .auto_add_history(true)
            .max_history_size(MAX_HISTORY_ENTRIES)?
            .build();

        let mut editor = Editor::with_config(config).context("Failed to create input editor")?;
        editor.set_helper(Some(ShellCompleter::new()));
        editor.bind_sequence(
            rustyline::KeyEvent::new('\t', rustyline::Modifiers::NONE),
            rustyline::Cmd::Complete,
        );

        let history_path = data_dir.join(HISTORY_FILE);
        if history_path.exists() {
            let _ = editor.load_history(&history_path);
        }

        Ok(Self {
            editor,
            history_path,
        })
    }

    pub fn set_pages(&mut self, pages: Vec<String>) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.set_pages(pages);
        }
    }

    pub fn set_media_ids(&mut self, ids: Vec<String>) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.set_media_ids(ids);
        }
    }

    /// Read a line of input.
    ///
    /// Returns `Ok(Some(line))` on input, `Ok(Some(""))` on Ctrl+C and
    /// `Ok(None)` on EOF (Ctrl+D).
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                self.save_history();
                Ok(Some(line))
            }
            Err(rustyline::error::ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(rustyline::error::ReadlineError::Eof) => Ok(None),
            Err(e) => Err(anyhow::anyhow!("Input error: {}", e)),
        }
    }

    /// Read a line with the session time left appended to the prompt.
    pub fn read_line_with_time(
        &mut self,
        base_prompt: &str,
        remaining_secs: i64,
    ) -> Result<Option<String>> {
        self.read_line(&format!("{} {} ", base_prompt, time_indicator(remaining_secs)))
    }

    fn save_history(&mut self) {
        if let Some(parent) = self.history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = self.editor.save_history(&self.history_path);
    }
}

/// `[h:mm:ss]`, yellow when little time is left.
fn time_indicator(remaining_secs: i64) -> String {
    let secs = remaining_secs.max(0);
    let text = format!("[{}:{:02}:{:02}]", secs / 3600, (secs % 3600) / 60, secs % 60);
    if secs <= LOW_TIME_SECS {
        format!("\x1b[33m{}\x1b[0m", text)
    } else {
        format!("\x1b[90m{}\x1b[0m", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_indicator() {
        assert_eq!(time_indicator(7200), "\x1b[90m[2:00:00]\x1b[0m");
        assert_eq!(time_indicator(125), "\x1b[33m[0:02:05]\x1b[0m");
        assert_eq!(time_indicator(-3), "\x1b[33m[0:00:00]\x1b[0m");
    }
}
