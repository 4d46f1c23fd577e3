use crate::commands::Command;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

const QUALIFIER: &str = "net.roblillack";
const ORGANIZATION: &str = "Emark";
const APPLICATION: &str = "emark-demo";
const KEYMAP_FILE_NAME: &str = "keymap.toml";

/// One key-to-command binding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Binding {
    pub key: String,
    pub command: Command,
}

/// Keymap for the demo: maps key chords to mark commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keymap {
    pub bindings: Vec<Binding>,
}

impl Keymap {
    /// The built-in Emacs-flavored bindings
    pub fn defaults() -> Self {
        let bind = |key: &str, command: Command| Binding {
            key: key.to_string(),
            command,
        };
        Keymap {
            bindings: vec![
                bind("C-space", Command::ToggleMark),
                bind("C-f", Command::NextChar),
                bind("C-b", Command::PrevChar),
                bind("M-f", Command::NextWord),
                bind("M-b", Command::PrevWord),
                bind("M-right", Command::NextSubword),
                bind("M-left", Command::PrevSubword),
                bind("C-n", Command::NextLine),
                bind("C-p", Command::PrevLine),
                bind("C-a", Command::LineStart),
                bind("C-e", Command::LineEnd),
                bind("M-<", Command::DocumentStart),
                bind("M->", Command::DocumentEnd),
                bind("M-w", Command::Copy),
            ],
        }
    }

    /// Look up the command bound to a key chord
    pub fn lookup(&self, key: &str) -> Option<Command> {
        self.bindings
            .iter()
            .find(|binding| binding.key == key)
            .map(|binding| binding.command)
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::defaults()
    }
}

pub fn keymap_file_path() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.config_dir().join(KEYMAP_FILE_NAME))
}

pub fn load_keymap(path: &Path) -> Option<Keymap> {
    let contents = fs::read_to_string(path).ok()?;
    match toml::from_str::<Keymap>(&contents) {
        Ok(keymap) => Some(keymap),
        Err(err) => {
            eprintln!("Failed to parse keymap file {}: {err}", path.display());
            None
        }
    }
}

pub fn save_keymap(path: &Path, keymap: &Keymap) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let toml = toml::to_string_pretty(keymap).map_err(|err| {
        io::Error::new(ErrorKind::Other, format!("toml serialization error: {err}"))
    })?;

    fs::write(path, toml)
}
