// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Interactive admin shell support.
//!
//! - **Tab Completion**: command names, page paths and media ids
//! - **Hints**: command descriptions as you type
//! - **History**: persisted in the data directory
//! - **Session time**: shown in the prompt
//!
//! ## Example
//!
//! ```no_run
//! use siteguard::cli::{parse_command, InteractiveInput, ShellCommand};
//!
//! let mut input = InteractiveInput::new(std::path::Path::new("/tmp/siteguard"))?;
//! while let Some(line) = input.read_line("admin> ")? {
//!     match parse_command(&line) {
//!         Ok(Some(ShellCommand::Quit)) => break,
//!         Ok(Some(command)) => println!("{:?}", command),
//!         Ok(None) => continue,
//!         Err(usage) => println!("{}", usage),
//!     }
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod command;
pub mod completer;
pub mod input;

pub use command::{parse_command, ShellCommand};
pub use completer::{get_canonical_command, show_help, CommandInfo, ShellCompleter, COMMANDS};
pub use input::InteractiveInput;
