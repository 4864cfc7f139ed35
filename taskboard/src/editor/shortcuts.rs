//! Keyboard shortcuts for the task editor.
//!
//! A chord matches a binding only when the key and all four modifiers match
//! exactly. Shortcuts never fire while focus is in a text input.

use std::fmt;

/// A key press with its modifier state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyChord {
    /// Key value as reported by the input layer (`s`, `Escape`, `?`).
    pub key: String,
    /// Control held.
    pub ctrl: bool,
    /// Shift held.
    pub shift: bool,
    /// Alt held.
    pub alt: bool,
    /// Meta / Command held.
    pub meta: bool,
}

impl KeyChord {
    /// A chord with no modifiers.
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// `key` with Control held.
    #[must_use]
    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            ctrl: true,
            ..Self::key(key)
        }
    }

    /// `key` with Shift held.
    #[must_use]
    pub fn shift(key: impl Into<String>) -> Self {
        Self {
            shift: true,
            ..Self::key(key)
        }
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = [
            (self.ctrl, "Ctrl"),
            (self.shift, "Shift"),
            (self.alt, "Alt"),
            (self.meta, "Cmd"),
        ];
        for (_, name) in modifiers.iter().filter(|(held, _)| *held) {
            write!(f, "{name} + ")?;
        }
        f.write_str(&self.key)
    }
}

/// Editor actions reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorCommand {
    /// Save now, skipping the debounce.
    Save,
    /// Discard the draft and close the editor.
    Cancel,
    /// Open the change history.
    ShowHistory,
    /// Show or hide the shortcut help.
    ToggleHelp,
}

impl EditorCommand {
    /// Help text for the command.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Save => "Save task",
            Self::Cancel => "Cancel editing",
            Self::ShowHistory => "Show change history",
            Self::ToggleHelp => "Show or hide shortcut help",
        }
    }
}

/// Ordered chord-to-command bindings. The first match wins.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: Vec<(KeyChord, EditorCommand)>,
}

impl Keymap {
    /// The editor's bindings: `Ctrl+s`, `Escape`, `Ctrl+h`, `Shift+?`.
    #[must_use]
    pub fn editor_default() -> Self {
        Self {
            bindings: vec![
                (KeyChord::ctrl("s"), EditorCommand::Save),
                (KeyChord::key("Escape"), EditorCommand::Cancel),
                (KeyChord::ctrl("h"), EditorCommand::ShowHistory),
                (KeyChord::shift("?"), EditorCommand::ToggleHelp),
            ],
        }
    }

    /// The command bound to `chord`, unless focus is in a text input.
    #[must_use]
    pub fn resolve(&self, chord: &KeyChord, in_text_input: bool) -> Option<EditorCommand> {
        if in_text_input {
            return None;
        }
        self.bindings
            .iter()
            .find(|(bound, _)| bound == chord)
            .map(|(_, command)| *command)
    }

    /// `(chord, description)` pairs for the help overlay, in binding order.
    #[must_use]
    pub fn help_lines(&self) -> Vec<(String, &'static str)> {
        self.bindings
            .iter()
            .map(|(chord, command)| (chord.to_string(), command.description()))
            .collect()
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::editor_default()
    }
}
