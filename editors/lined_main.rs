//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! lined - edit text, one line at a time

use clap::Parser;
use gettextrs::{bind_textdomain_codeset, gettext, setlocale, textdomain, LocaleCategory};
use lined::{Editor, Options, PROJECT_NAME};
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

/// lined - edit text
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Use string as the prompt when in command mode
    #[arg(short, long)]
    prompt: Option<String>,

    /// Suppress line-count reports from e, r, w and a
    #[arg(short, long)]
    silent: bool,

    /// File to edit
    file: Option<PathBuf>,
}

fn setup_signals() {
    unsafe {
        libc::signal(libc::SIGQUIT, libc::SIG_IGN);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    setlocale(LocaleCategory::LcAll, "");
    textdomain(PROJECT_NAME)?;
    bind_textdomain_codeset(PROJECT_NAME, "UTF-8")?;

    setup_signals();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let reader = BufReader::new(stdin.lock());
    let writer = BufWriter::new(stdout.lock());

    let options = Options::new(args.prompt, args.silent);
    let mut editor = Editor::new(reader, writer, io::stderr(), options);

    if let Some(path) = &args.file {
        let path = path.to_string_lossy();
        if let Err(e) = editor.load_file(&path) {
            eprintln!("{} {}: {}", gettext("lined: cannot load"), path, e);
            std::process::exit(1);
        }
    }

    if let Err(e) = editor.run() {
        eprintln!("{}: {}", gettext("lined: fatal error"), e);
        std::process::exit(1);
    }

    Ok(())
}
