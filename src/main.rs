use clap::Parser;
use emark::commands::{Command, MarkCommands};
use emark::config::{self, Keymap};
use emark::surface::EditorSurface;
use emark::text_surface::TextSurface;
use emark::workbench::Workbench;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const SAMPLE_TEXT: &str = "The quick brown fox\njumps over the lazy dog.\nPack my box with five dozen liquor jugs.\n";

#[derive(Parser, Debug)]
#[command(name = "emark-demo")]
#[command(about = "Interactive demo of Emacs-style mark and region", long_about = None)]
struct Args {
    /// Text file to load into the demo document
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Print the active key bindings and exit
    #[arg(long)]
    bindings: bool,
}

fn load_keymap() -> Keymap {
    config::keymap_file_path()
        .and_then(|path| config::load_keymap(&path))
        .unwrap_or_default()
}

fn print_bindings(keymap: &Keymap) {
    for binding in &keymap.bindings {
        println!("{:10} {}", binding.key, binding.command.name());
    }
}

/// Render the buffer with the caret shown as `|` and the selected
/// region wrapped in `[` `]`.
fn render(surface: &TextSurface) -> String {
    let text = surface.text();
    let caret = surface.caret_offset();
    let selection = surface.selection();

    let mut out = String::with_capacity(text.len() + 4);
    for (i, ch) in text.char_indices() {
        if let Some((start, end)) = selection {
            if i == start {
                out.push('[');
            }
            if i == end {
                out.push(']');
            }
        }
        if i == caret {
            out.push('|');
        }
        out.push(ch);
    }
    if let Some((_, end)) = selection {
        if end == text.len() {
            out.push(']');
        }
    }
    if caret == text.len() {
        out.push('|');
    }
    out
}

fn print_help() {
    println!("Commands:");
    println!("  show           render the buffer (| caret, [..] region)");
    println!("  type TEXT      insert TEXT at the caret (third-party edit)");
    println!("  click POS      place the caret at byte POS (third-party)");
    println!("  clipboard      print the clipboard contents");
    println!("  bindings       print the key bindings");
    println!("  quit           exit");
    println!("Anything else is looked up as a key chord, e.g. C-space, M-f.");
}

fn main() {
    let args = Args::parse();
    let keymap = load_keymap();

    if args.bindings {
        print_bindings(&keymap);
        return;
    }

    let (title, text) = match &args.file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(contents) => (path.display().to_string(), contents),
            Err(err) => {
                eprintln!("Cannot read {}: {err}", path.display());
                std::process::exit(1);
            }
        },
        None => ("sample".to_string(), SAMPLE_TEXT.to_string()),
    };

    let workbench = Workbench::new();
    let commands = MarkCommands::install(&workbench);
    let id = workbench.open(&title, &text);
    let mut surface = workbench
        .surface(id)
        .expect("document was just opened");

    println!("emark demo — {title}");
    print_help();

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                eprintln!("stdin error: {err}");
                break;
            }
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (verb, rest) = match line.split_once(' ') {
            Some((verb, rest)) => (verb, rest),
            None => (line, ""),
        };

        match verb {
            "quit" | "q" => break,
            "help" => print_help(),
            "show" => println!("{}", render(&surface)),
            "clipboard" => println!("{:?}", surface.clipboard()),
            "bindings" => print_bindings(&keymap),
            "type" => {
                let caret = surface.caret_offset();
                surface.insert_text(caret, rest);
                println!("{}", render(&surface));
            }
            "click" => match rest.parse::<usize>() {
                Ok(pos) => {
                    surface.click_at(pos);
                    println!("{}", render(&surface));
                }
                Err(_) => println!("usage: click POS"),
            },
            chord => match keymap.lookup(chord) {
                Some(command) => {
                    commands.run(command);
                    if command == Command::Copy {
                        println!("copied {:?}", surface.clipboard());
                    }
                    println!("{}", render(&surface));
                }
                None => {
                    println!("Unknown command or key chord: {chord}");
                }
            },
        }
    }
}
