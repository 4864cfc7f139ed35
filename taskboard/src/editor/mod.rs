//! Task editor: auto-save, debounce and keyboard shortcuts.

pub mod autosave;
pub mod session;
pub mod shortcuts;
pub mod timer;

pub use autosave::{
    AutoSaveConfig, AutoSaveController, BeginSave, Completion, DEFAULT_AUTOSAVE_DELAY,
    IgnoreReason, SaveRequest, SaveState, SaveTicket,
};
pub use session::{CommandOutcome, EditorSession};
pub use shortcuts::{EditorCommand, KeyChord, Keymap};
pub use timer::DebounceTimer;
