// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Parsing of shell input lines into commands.

use std::path::PathBuf;

use super::completer::get_canonical_command;
use crate::content::{CollectionKind, MediaFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Status,
    Extend,
    Pages,
    Show { page: String },
    Set { page: String, field: String, value: String },
    Unset { page: String, field: String },
    Media { filter: MediaFilter, search: String },
    MediaAdd { file: PathBuf },
    MediaRemove { id: String },
    MediaEdit { id: String },
    Items { collection: CollectionKind },
    Item { collection: CollectionKind, id: String },
    ItemAdd { collection: CollectionKind },
    ItemSet {
        collection: CollectionKind,
        id: String,
        field: String,
        value: String,
    },
    ItemRemove { collection: CollectionKind, id: String },
    ItemsExport { file: Option<PathBuf> },
    ItemsImport { file: PathBuf },
    Activity,
    Export { file: Option<PathBuf> },
    Import { file: PathBuf },
    Backup { file: Option<PathBuf> },
    Restore { file: PathBuf },
    ClearCache,
    Logout,
    Quit,
}

/// Parse one line. `Ok(None)` for a blank line; `Err` carries a usage message.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let (word, rest) = split_first_word(line.trim());
    if word.is_empty() {
        return Ok(None);
    }
    let Some(name) = get_canonical_command(word) else {
        return Err(format!("Unknown command '{}'. Type 'help' for a list.", word));
    };

    let command = match name {
        "help" => ShellCommand::Help,
        "status" => ShellCommand::Status,
        "extend" => ShellCommand::Extend,
        "pages" => ShellCommand::Pages,
        "show" => ShellCommand::Show {
            page: required(rest, "show <page>")?,
        },
        "set" => {
            let (page, rest) = split_first_word(rest);
            let (field, value) = split_first_word(rest);
            if page.is_empty() || field.is_empty() || value.is_empty() {
                return Err(usage("set <page> <field> <value>"));
            }
            ShellCommand::Set {
                page: page.to_string(),
                field: field.to_string(),
                value: value.to_string(),
            }
        }
        "unset" => {
            let (page, field) = split_first_word(rest);
            if page.is_empty() || field.is_empty() {
                return Err(usage("unset <page> <field>"));
            }
            ShellCommand::Unset {
                page: page.to_string(),
                field: field.to_string(),
            }
        }
        "media" => {
            let (first, remainder) = split_first_word(rest);
            match first.parse::<MediaFilter>() {
                Ok(filter) => ShellCommand::Media {
                    filter,
                    search: remainder.to_string(),
                },
                Err(_) => ShellCommand::Media {
                    filter: MediaFilter::All,
                    search: rest.to_string(),
                },
            }
        }
        "media-add" => ShellCommand::MediaAdd {
            file: PathBuf::from(required(rest, "media-add <file>")?),
        },
        "media-rm" => ShellCommand::MediaRemove {
            id: required(rest, "media-rm <id>")?,
        },
        "media-edit" => ShellCommand::MediaEdit {
            id: required(rest, "media-edit <id>")?,
        },
        "items" => ShellCommand::Items {
            collection: split_collection(rest, "items <collection>")?.0,
        },
        "item" => {
            let (collection, id) = split_collection(rest, "item <collection> <id>")?;
            ShellCommand::Item {
                collection,
                id: required(id, "item <collection> <id>")?,
            }
        }
        "item-add" => ShellCommand::ItemAdd {
            collection: split_collection(rest, "item-add <collection>")?.0,
        },
        "item-set" => {
            let usage_text = "item-set <collection> <id> <field> <value>";
            let (collection, rest) = split_collection(rest, usage_text)?;
            let (id, rest) = split_first_word(rest);
            let (field, value) = split_first_word(rest);
            if id.is_empty() || field.is_empty() {
                return Err(usage(usage_text));
            }
            // An empty value clears an optional field
            ShellCommand::ItemSet {
                collection,
                id: id.to_string(),
                field: field.to_string(),
                value: value.to_string(),
            }
        }
        "item-rm" => {
            let (collection, id) = split_collection(rest, "item-rm <collection> <id>")?;
            ShellCommand::ItemRemove {
                collection,
                id: required(id, "item-rm <collection> <id>")?,
            }
        }
        "items-export" => ShellCommand::ItemsExport {
            file: optional_path(rest),
        },
        "items-import" => ShellCommand::ItemsImport {
            file: PathBuf::from(required(rest, "items-import <file>")?),
        },
        "activity" => ShellCommand::Activity,
        "export" => ShellCommand::Export {
            file: optional_path(rest),
        },
        "import" => ShellCommand::Import {
            file: PathBuf::from(required(rest, "import <file>")?),
        },
        "backup" => ShellCommand::Backup {
            file: optional_path(rest),
        },
        "restore" => ShellCommand::Restore {
            file: PathBuf::from(required(rest, "restore <file>")?),
        },
        "clear-cache" => ShellCommand::ClearCache,
        "logout" => ShellCommand::Logout,
        "quit" => ShellCommand::Quit,
        other => return Err(format!("Unhandled command '{}'", other)),
    };
    Ok(Some(command))
}

fn split_first_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(idx) => (&input[..idx], input[idx..].trim()),
        None => (input, ""),
    }
}

fn required(rest: &str, usage_text: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(usage(usage_text))
    } else {
        Ok(rest.to_string())
    }
}

/// Leading collection name and the rest of the line.
fn split_collection<'a>(
    rest: &'a str,
    usage_text: &str,
) -> Result<(CollectionKind, &'a str), String> {
    let (name, rest) = split_first_word(rest);
    if name.is_empty() {
        return Err(usage(usage_text));
    }
    Ok((name.parse()?, rest))
}

fn optional_path(rest: &str) -> Option<PathBuf> {
    (!rest.is_empty()).then(|| PathBuf::from(rest))
}

fn usage(text: &str) -> String {
    format!("Usage: {}", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn test_set_keeps_spaces_in_value() {
        assert_eq!(
            parse_command("set index.html hero-title  Clean water for all "),
            Ok(Some(ShellCommand::Set {
                page: "index.html".to_string(),
                field: "hero-title".to_string(),
                value: "Clean water for all".to_string(),
            }))
        );
        assert_eq!(
            parse_command("set index.html"),
            Err("Usage: set <page> <field> <value>".to_string())
        );
    }

    #[test]
    fn test_media_filter_and_search() {
        assert_eq!(
            parse_command("media images harvest 2024"),
            Ok(Some(ShellCommand::Media {
                filter: MediaFilter::Images,
                search: "harvest 2024".to_string(),
            }))
        );
        assert_eq!(
            parse_command("media harvest"),
            Ok(Some(ShellCommand::Media {
                filter: MediaFilter::All,
                search: "harvest".to_string(),
            }))
        );
    }

    #[test]
    fn test_aliases_and_unknown() {
        assert_eq!(parse_command("exit"), Ok(Some(ShellCommand::Quit)));
        assert_eq!(parse_command("?"), Ok(Some(ShellCommand::Help)));
        assert!(parse_command("sudo").is_err());
    }

    #[test]
    fn test_media_edit_needs_id() {
        assert_eq!(
            parse_command("media-edit media_1700000000000_ab12cd34"),
            Ok(Some(ShellCommand::MediaEdit {
                id: "media_1700000000000_ab12cd34".to_string()
            }))
        );
        assert_eq!(
            parse_command("media-edit"),
            Err("Usage: media-edit <id>".to_string())
        );
    }

    #[test]
    fn test_collection_commands() {
        assert_eq!(
            parse_command("items focus-areas"),
            Ok(Some(ShellCommand::Items {
                collection: CollectionKind::FocusAreas
            }))
        );
        assert_eq!(
            parse_command("item-set projects lx2k9a summary Wells for 12 villages"),
            Ok(Some(ShellCommand::ItemSet {
                collection: CollectionKind::Projects,
                id: "lx2k9a".to_string(),
                field: "summary".to_string(),
                value: "Wells for 12 villages".to_string(),
            }))
        );
        assert_eq!(
            parse_command("item-set pages p1 sidebar"),
            Ok(Some(ShellCommand::ItemSet {
                collection: CollectionKind::Pages,
                id: "p1".to_string(),
                field: "sidebar".to_string(),
                value: String::new(),
            }))
        );
        assert_eq!(
            parse_command("item-rm pages"),
            Err("Usage: item-rm <collection> <id>".to_string())
        );
        assert!(parse_command("items news").unwrap_err().contains("Unknown collection"));
    }

    #[test]
    fn test_optional_paths() {
        assert_eq!(
            parse_command("backup"),
            Ok(Some(ShellCommand::Backup { file: None }))
        );
        assert_eq!(
            parse_command("export out/content.json"),
            Ok(Some(ShellCommand::Export {
                file: Some(PathBuf::from("out/content.json"))
            }))
        );
        assert!(parse_command("restore").is_err());
    }
}
