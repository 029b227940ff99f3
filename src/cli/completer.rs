// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Tab completion and hints for the admin shell.
//!
//! ## Example UX
//!
//! ```text
//! admin> me
//!   media [search]       - List media, optionally filtered
//!   media-add <file>     - Upload a file to the media library
//!   media-rm <id>        - Delete a media item
//!   media-edit <id>      - Edit title, description, alt text and tags of a media item
//!
//! admin> show pages/ab<Tab>
//!   pages/about/mission.html
//!   pages/about/vision.html
//!   ...
//! ```

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hint, Hinter};
use rustyline::validate::Validator;
use rustyline::{Context, Helper, Result};
use std::borrow::Cow;

/// Information about a shell command.
#[derive(Debug, Clone)]
pub struct CommandInfo {
    /// Primary command name (e.g., "help")
    pub name: &'static str,
    /// Alternative aliases (e.g., ["?"])
    pub aliases: &'static [&'static str],
    /// Short description shown in completion
    pub description: &'static str,
    /// Arguments this command accepts (for display)
    pub args: Option<&'static str>,
    /// Values offered for the first argument
    pub arg_values: ArgValues,
}

#[derive(Debug, Clone)]
pub enum ArgValues {
    None,
    Static(&'static [&'static str]),
    Dynamic(DynamicArgType),
}

/// Argument values known only at runtime.
#[derive(Debug, Clone, Copy)]
pub enum DynamicArgType {
    /// Page paths from the site catalogue
    Pages,
    /// Media item ids
    MediaIds,
}

impl CommandInfo {
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            aliases: &[],
            description,
            args: None,
            arg_values: ArgValues::None,
        }
    }

    pub const fn with_aliases(
        name: &'static str,
        aliases: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self {
            name,
            aliases,
            description,
            args: None,
            arg_values: ArgValues::None,
        }
    }

    pub const fn with_static_args(
        mut self,
        args: &'static str,
        values: &'static [&'static str],
    ) -> Self {
        self.args = Some(args);
        self.arg_values = ArgValues::Static(values);
        self
    }

    pub const fn with_dynamic_args(mut self, args: &'static str, arg_type: DynamicArgType) -> Self {
        self.args = Some(args);
        self.arg_values = ArgValues::Dynamic(arg_type);
        self
    }

    /// Prefix match on the name or any alias.
    pub fn matches(&self, input: &str) -> bool {
        let input_lower = input.to_lowercase();
        self.name.starts_with(&input_lower)
            || self.aliases.iter().any(|a| a.starts_with(&input_lower))
    }

    pub fn exact_match(&self, input: &str) -> bool {
        let input_lower = input.to_lowercase();
        self.name == input_lower || self.aliases.iter().any(|a| *a == input_lower)
    }

    /// Get display string for completion menu.
    pub fn display_string(&self) -> String {
        if let Some(args) = self.args {
            format!("{} {} - {}", self.name, args, self.description)
        } else {
            format!("{} - {}", self.name, self.description)
        }
    }
}

const COLLECTIONS: &[&str] = &["projects", "pages", "focus-areas"];

/// All shell commands.
pub static COMMANDS: &[CommandInfo] = &[
    CommandInfo::with_aliases("help", &["?"], "Show all commands"),
    CommandInfo::new("status", "Show session and dashboard status"),
    CommandInfo::new("extend", "Extend the session by its full lifetime"),
    CommandInfo::new("pages", "List editable pages"),
    CommandInfo::new("show", "Show the stored content of a page")
        .with_dynamic_args("<page>", DynamicArgType::Pages),
    CommandInfo::new("set", "Set a content field")
        .with_dynamic_args("<page> <field> <value>", DynamicArgType::Pages),
    CommandInfo::new("unset", "Remove a content field")
        .with_dynamic_args("<page> <field>", DynamicArgType::Pages),
    CommandInfo::new("media", "List media, optionally filtered").with_static_args(
        "[images|videos|documents] [search]",
        &["images", "videos", "documents"],
    ),
    CommandInfo::new("media-add", "Upload a file to the media library")
        .with_static_args("<file>", &[]),
    CommandInfo::new("media-rm", "Delete a media item")
        .with_dynamic_args("<id>", DynamicArgType::MediaIds),
    CommandInfo::new("media-edit", "Edit title, description, alt text and tags of a media item")
        .with_dynamic_args("<id>", DynamicArgType::MediaIds),
    CommandInfo::new("items", "List the items of a collection")
        .with_static_args("<collection>", COLLECTIONS),
    CommandInfo::new("item", "Show one collection item")
        .with_static_args("<collection> <id>", COLLECTIONS),
    CommandInfo::new("item-add", "Create a collection item field by field")
        .with_static_args("<collection>", COLLECTIONS),
    CommandInfo::new("item-set", "Set one field of a collection item")
        .with_static_args("<collection> <id> <field> <value>", COLLECTIONS),
    CommandInfo::new("item-rm", "Delete a collection item")
        .with_static_args("<collection> <id>", COLLECTIONS),
    CommandInfo::new("items-export", "Export all collections to a file")
        .with_static_args("[file]", &[]),
    CommandInfo::new("items-import", "Replace collections from an export file")
        .with_static_args("<file>", &[]),
    CommandInfo::new("activity", "Show recent activity"),
    CommandInfo::new("export", "Export content to a file")
        .with_static_args("[file]", &[]),
    CommandInfo::new("import", "Merge content from an export file")
        .with_static_args("<file>", &[]),
    CommandInfo::new("backup", "Write a full backup to a file")
        .with_static_args("[file]", &[]),
    CommandInfo::new("restore", "Replace content and media from a backup")
        .with_static_args("<file>", &[]),
    CommandInfo::new("clear-cache", "Delete all content, media and activity"),
    CommandInfo::new("logout", "End the session"),
    CommandInfo::with_aliases("quit", &["exit", "q"], "Log out and leave the shell"),
];

/// Completer, hinter and highlighter for the shell prompt.
pub struct ShellCompleter {
    pages: Vec<String>,
    media_ids: Vec<String>,
}

impl ShellCompleter {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            media_ids: Vec::new(),
        }
    }

    pub fn set_pages(&mut self, pages: Vec<String>) {
        self.pages = pages;
    }

    pub fn set_media_ids(&mut self, ids: Vec<String>) {
        self.media_ids = ids;
    }

    fn values_for(&self, info: &CommandInfo) -> Vec<String> {
        match &info.arg_values {
            ArgValues::None => Vec::new(),
            ArgValues::Static(vals) => vals.iter().map(|s| s.to_string()).collect(),
            ArgValues::Dynamic(DynamicArgType::Pages) => self.pages.clone(),
            ArgValues::Dynamic(DynamicArgType::MediaIds) => self.media_ids.clone(),
        }
    }

    fn get_completions(&self, line: &str, pos: usize) -> Vec<Pair> {
        let input = &line[..pos];
        let parts: Vec<&str> = input.split_whitespace().collect();

        if parts.len() <= 1 && !input.ends_with(' ') {
            return self.complete_command(input.trim_start());
        }

        // Only the first argument is completed
        let completing_first_arg = (parts.len() == 1 && input.ends_with(' '))
            || (parts.len() == 2 && !input.ends_with(' '));
        if !completing_first_arg {
            return Vec::new();
        }
        let arg_prefix = if input.ends_with(' ') { "" } else { parts[1] };
        self.complete_arguments(parts[0], arg_prefix, input)
    }

    fn complete_command(&self, input: &str) -> Vec<Pair> {
        COMMANDS
            .iter()
            .filter(|cmd| cmd.matches(input))
            .map(|cmd| Pair {
                display: cmd.display_string(),
                replacement: format!("{} ", cmd.name),
            })
            .collect()
    }

    fn complete_arguments(&self, command: &str, prefix: &str, full_input: &str) -> Vec<Pair> {
        let Some(info) = COMMANDS.iter().find(|c| c.exact_match(command)) else {
            return Vec::new();
        };
        let base = &full_input[..full_input.len() - prefix.len()];
        let prefix_lower = prefix.to_lowercase();

        self.values_for(info)
            .into_iter()
            .filter(|v| v.to_lowercase().starts_with(&prefix_lower))
            .map(|v| Pair {
                display: v.clone(),
                replacement: format!("{}{} ", base, v),
            })
            .collect()
    }

    fn get_hint(&self, line: &str) -> Option<CommandHint> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.len() == 1 && !line.ends_with(' ') {
            let matches: Vec<_> = COMMANDS.iter().filter(|cmd| cmd.matches(line)).collect();
            if matches.len() == 1 && matches[0].name.starts_with(line) {
                let cmd = matches[0];
                let remaining = &cmd.name[line.len()..];
                let hint = match cmd.args {
                    Some(args) => format!("{} {} - {}", remaining, args, cmd.description),
                    None => format!("{} - {}", remaining, cmd.description),
                };
                return Some(CommandHint(hint));
            }
        } else if parts.len() == 2 && !line.ends_with(' ') {
            let info = COMMANDS.iter().find(|c| c.exact_match(parts[0]))?;
            let arg_prefix = parts[1];
            let matches: Vec<String> = self
                .values_for(info)
                .into_iter()
                .filter(|v| v.starts_with(arg_prefix))
                .collect();
            if matches.len() == 1 {
                return Some(CommandHint(matches[0][arg_prefix.len()..].to_string()));
            }
        }

        None
    }
}

impl Default for ShellCompleter {
    fn default() -> Self {
        Self::new()
    }
}

/// A hint displayed after the cursor in dim text.
#[derive(Debug, Clone)]
pub struct CommandHint(String);

impl Hint for CommandHint {
    fn display(&self) -> &str {
        &self.0
    }

    fn completion(&self) -> Option<&str> {
        // Descriptions are display-only
        match self.0.find(' ') {
            Some(idx) => Some(&self.0[..idx]),
            None => Some(&self.0),
        }
    }
}

impl Completer for ShellCompleter {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Result<(usize, Vec<Pair>)> {
        Ok((0, self.get_completions(line, pos)))
    }
}

impl Hinter for ShellCompleter {
    type Hint = CommandHint;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<Self::Hint> {
        if pos < line.len() {
            return None;
        }
        self.get_hint(line)
    }
}

impl Highlighter for ShellCompleter {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[90m{}\x1b[0m", hint))
    }

    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let Some(command) = line.split_whitespace().next() else {
            return Cow::Borrowed(line);
        };
        let rest = &line[line.find(command).map_or(0, |i| i + command.len())..];

        if COMMANDS.iter().any(|c| c.exact_match(command)) {
            Cow::Owned(format!("\x1b[36m{}\x1b[0m{}", command, rest))
        } else if COMMANDS.iter().any(|c| c.matches(command)) {
            Cow::Owned(format!("\x1b[33m{}\x1b[0m", line))
        } else {
            Cow::Owned(format!("\x1b[31m{}\x1b[0m", line))
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Validator for ShellCompleter {}

impl Helper for ShellCompleter {}

/// Print every shell command.
pub fn show_help() {
    println!("\nAvailable commands:\n");
    for cmd in COMMANDS {
        let aliases = if cmd.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", cmd.aliases.join(", "))
        };
        let args = cmd.args.map_or(String::new(), |a| format!(" {}", a));
        println!("  \x1b[36m{}{}\x1b[0m{} - {}", cmd.name, args, aliases, cmd.description);
    }
    println!();
}

/// Canonical command name for a command or alias.
pub fn get_canonical_command(input: &str) -> Option<&'static str> {
    COMMANDS.iter().find(|c| c.exact_match(input)).map(|c| c.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completer() -> ShellCompleter {
        let mut completer = ShellCompleter::new();
        completer.set_pages(vec![
            "index.html".to_string(),
            "pages/about/mission.html".to_string(),
            "pages/about/vision.html".to_string(),
        ]);
        completer.set_media_ids(vec!["media_1_ab".to_string()]);
        completer
    }

    #[test]
    fn test_command_matching() {
        let help = &COMMANDS[0];
        assert!(help.matches("hel"));
        assert!(help.matches("?"));
        assert!(help.exact_match("HELP"));
        assert!(!help.matches("status"));
    }

    #[test]
    fn test_canonical_command() {
        assert_eq!(get_canonical_command("?"), Some("help"));
        assert_eq!(get_canonical_command("exit"), Some("quit"));
        assert_eq!(get_canonical_command("q"), Some("quit"));
        assert_eq!(get_canonical_command("frobnicate"), None);
    }

    #[test]
    fn test_complete_command_names() {
        let names: Vec<String> = completer()
            .get_completions("media", 5)
            .into_iter()
            .map(|p| p.replacement)
            .collect();
        assert_eq!(names, vec!["media ", "media-add ", "media-rm ", "media-edit "]);
    }

    #[test]
    fn test_complete_page_argument() {
        let line = "show pages/about/v";
        let pairs = completer().get_completions(line, line.len());
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].replacement, "show pages/about/vision.html ");

        let line = "media-rm ";
        let pairs = completer().get_completions(line, line.len());
        assert_eq!(pairs[0].replacement, "media-rm media_1_ab ");
    }

    #[test]
    fn test_complete_collection_argument() {
        let line = "item-add f";
        let pairs = completer().get_completions(line, line.len());
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].replacement, "item-add focus-areas ");

        let line = "items ";
        assert_eq!(completer().get_completions(line, line.len()).len(), 3);
    }

    #[test]
    fn test_only_first_argument_completes() {
        let line = "set index.html title";
        assert!(completer().get_completions(line, line.len()).is_empty());
    }

    #[test]
    fn test_hints() {
        let hint = completer().get_hint("exte").unwrap();
        assert!(hint.0.starts_with("nd - "));
        assert_eq!(hint.completion(), Some("nd"));

        let hint = completer().get_hint("show pages/about/m").unwrap();
        assert_eq!(hint.0, "ission.html");
    }
}
