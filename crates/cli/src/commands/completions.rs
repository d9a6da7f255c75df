// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pj completions <shell>` - Shell completion scripts
//!
//! ```bash
//! pj completions bash > ~/.local/share/bash-completion/completions/pj
//! pj completions zsh > ~/.zfunc/_pj
//! pj completions fish > ~/.config/fish/completions/pj.fish
//! ```

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io;

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write completions for the `pj` command tree to stdout
pub fn handle<C: CommandFactory>(args: CompletionsArgs) {
    let mut cmd = C::command();
    generate(args.shell, &mut cmd, "pj", &mut io::stdout());
}
