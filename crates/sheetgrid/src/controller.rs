//! Selection and editing state machine
//!
//! The controller knows nothing about cell contents. It tracks which cell is
//! selected or being edited and translates keys into [`KeyOutcome`]s that
//! the editor acts on.

use log::debug;

/// Position of a cell in the grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CellPosition {
    pub row: u32,
    pub col: u16,
}

impl CellPosition {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }
}

/// Selection / editing state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditorState {
    /// Nothing selected
    #[default]
    Idle,
    /// A cell is selected
    Selected(CellPosition),
    /// The selected cell is being edited
    Editing { position: CellPosition, draft: String },
}

impl EditorState {
    /// The selected cell, editing or not
    pub fn selection(&self) -> Option<CellPosition> {
        match self {
            EditorState::Idle => None,
            EditorState::Selected(pos) => Some(*pos),
            EditorState::Editing { position, .. } => Some(*position),
        }
    }

    /// The draft of the cell being edited
    pub fn draft(&self) -> Option<&str> {
        match self {
            EditorState::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditorState::Editing { .. })
    }
}

/// Keys the editor responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Tab,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Backspace,
    Char(char),
}

/// Modifier keys held during a key press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    /// Ctrl on Windows/Linux or Cmd on macOS
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Key press without modifiers
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    /// Key press with Shift held
    pub fn shift(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                shift: true,
                ..Default::default()
            },
        }
    }

    /// Key press with Ctrl held
    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                ctrl: true,
                ..Default::default()
            },
        }
    }

    /// Key press with Cmd held
    pub fn meta(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                meta: true,
                ..Default::default()
            },
        }
    }

    /// Character typed by this key press, if it is printable text
    fn printable(&self) -> Option<char> {
        match self.key {
            Key::Char(c) if !c.is_control() && !self.modifiers.command() && !self.modifiers.alt => {
                Some(c)
            }
            _ => None,
        }
    }

    /// Ctrl/Cmd + the given letter, either case
    fn is_command(&self, letter: char) -> bool {
        self.modifiers.command()
            && matches!(self.key, Key::Char(c) if c.eq_ignore_ascii_case(&letter))
    }
}

/// What a key press asks the editor to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Key was ignored
    None,
    /// Selection moved
    Moved(CellPosition),
    /// Open an edit on the selected cell, seeded from its formula or value
    OpenEdit(CellPosition),
    /// Start an edit whose draft is this one character
    Overwrite(CellPosition, char),
    /// Draft text changed
    DraftChanged,
    /// Commit this draft
    Commit { position: CellPosition, draft: String },
    /// Edit discarded
    Cancelled(CellPosition),
    /// Copy the selected cell
    Copy(CellPosition),
    /// Paste at the selected cell
    Paste(CellPosition),
}

/// Selection/editing controller for a grid of fixed size
#[derive(Debug, Clone)]
pub struct Controller {
    state: EditorState,
    rows: u32,
    cols: u16,
}

impl Controller {
    /// Create an idle controller for a `rows` x `cols` grid
    pub fn new(rows: u32, cols: u16) -> Self {
        Self {
            state: EditorState::Idle,
            rows,
            cols,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Change the grid size, clamping the selection into it
    pub fn resize(&mut self, rows: u32, cols: u16) {
        self.rows = rows;
        self.cols = cols;
        if let Some(pos) = self.state.selection() {
            if pos.row >= rows || pos.col >= cols {
                self.state = match self.clamp(pos) {
                    Some(pos) => EditorState::Selected(pos),
                    None => EditorState::Idle,
                };
            }
        }
    }

    fn clamp(&self, pos: CellPosition) -> Option<CellPosition> {
        if self.rows == 0 || self.cols == 0 {
            return None;
        }
        Some(CellPosition::new(
            pos.row.min(self.rows - 1),
            pos.col.min(self.cols - 1),
        ))
    }

    /// Whether a position lies inside the grid
    pub fn in_bounds(&self, pos: CellPosition) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Select a cell, discarding any edit in progress
    pub fn select(&mut self, pos: CellPosition) {
        if self.in_bounds(pos) {
            debug!("select {:?}", pos);
            self.state = EditorState::Selected(pos);
        }
    }

    /// Enter editing on `pos` with the given draft
    pub fn begin_edit(&mut self, pos: CellPosition, draft: impl Into<String>) {
        if self.in_bounds(pos) {
            debug!("edit {:?}", pos);
            self.state = EditorState::Editing {
                position: pos,
                draft: draft.into(),
            };
        }
    }

    /// Leave editing and hand back the draft; the cell stays selected
    pub fn finish_edit(&mut self) -> Option<(CellPosition, String)> {
        match std::mem::take(&mut self.state) {
            EditorState::Editing { position, draft } => {
                self.state = EditorState::Selected(position);
                Some((position, draft))
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Drop the selection entirely
    pub fn clear(&mut self) {
        self.state = EditorState::Idle;
    }

    /// Translate a key press
    ///
    /// `editable` says whether the selected cell may be edited; it gates
    /// opening an edit.
    pub fn handle_key(&mut self, event: KeyEvent, editable: bool) -> KeyOutcome {
        match &mut self.state {
            EditorState::Idle => KeyOutcome::None,

            EditorState::Editing { position, draft } => {
                let position = *position;
                match event.key {
                    Key::Enter => match self.finish_edit() {
                        Some((position, draft)) => KeyOutcome::Commit { position, draft },
                        None => KeyOutcome::None,
                    },
                    Key::Escape => {
                        self.state = EditorState::Selected(position);
                        KeyOutcome::Cancelled(position)
                    }
                    Key::Backspace => {
                        draft.pop();
                        KeyOutcome::DraftChanged
                    }
                    _ => match event.printable() {
                        Some(c) => {
                            draft.push(c);
                            KeyOutcome::DraftChanged
                        }
                        // Navigation is suppressed while editing
                        None => KeyOutcome::None,
                    },
                }
            }

            EditorState::Selected(pos) => {
                let pos = *pos;

                if event.is_command('c') {
                    return KeyOutcome::Copy(pos);
                }
                if event.is_command('v') {
                    return KeyOutcome::Paste(pos);
                }

                match event.key {
                    Key::Enter if editable => KeyOutcome::OpenEdit(pos),
                    Key::ArrowUp => self.move_by(pos, -1, 0),
                    Key::ArrowDown => self.move_by(pos, 1, 0),
                    Key::ArrowLeft => self.move_by(pos, 0, -1),
                    Key::ArrowRight => self.move_by(pos, 0, 1),
                    Key::Tab if event.modifiers.shift => self.move_by(pos, 0, -1),
                    Key::Tab => self.move_by(pos, 0, 1),
                    _ => match event.printable() {
                        Some(c) if editable => {
                            self.begin_edit(pos, c.to_string());
                            KeyOutcome::Overwrite(pos, c)
                        }
                        _ => KeyOutcome::None,
                    },
                }
            }
        }
    }

    /// Move the selection, clamped to the grid with no wraparound
    fn move_by(&mut self, pos: CellPosition, d_row: i64, d_col: i64) -> KeyOutcome {
        let row = (pos.row as i64 + d_row).clamp(0, self.rows.saturating_sub(1) as i64) as u32;
        let col = (pos.col as i64 + d_col).clamp(0, self.cols.saturating_sub(1) as i64) as u16;
        let next = CellPosition::new(row, col);
        self.state = EditorState::Selected(next);
        KeyOutcome::Moved(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(row: u32, col: u16) -> Controller {
        let mut c = Controller::new(10, 5);
        c.select(CellPosition::new(row, col));
        c
    }

    #[test]
    fn test_idle_ignores_keys() {
        let mut c = Controller::new(10, 5);
        assert_eq!(c.handle_key(KeyEvent::plain(Key::Enter), true), KeyOutcome::None);
        assert_eq!(c.state(), &EditorState::Idle);
    }

    #[test]
    fn test_arrows_clamp_without_wrapping() {
        let mut c = selected(0, 0);
        assert_eq!(
            c.handle_key(KeyEvent::plain(Key::ArrowUp), true),
            KeyOutcome::Moved(CellPosition::new(0, 0))
        );
        c.handle_key(KeyEvent::plain(Key::ArrowLeft), true);
        assert_eq!(c.state().selection(), Some(CellPosition::new(0, 0)));

        let mut c = selected(9, 4);
        c.handle_key(KeyEvent::plain(Key::ArrowDown), true);
        c.handle_key(KeyEvent::plain(Key::ArrowRight), true);
        assert_eq!(c.state().selection(), Some(CellPosition::new(9, 4)));
    }

    #[test]
    fn test_tab_and_shift_tab() {
        let mut c = selected(2, 2);
        c.handle_key(KeyEvent::plain(Key::Tab), true);
        assert_eq!(c.state().selection(), Some(CellPosition::new(2, 3)));
        c.handle_key(KeyEvent::shift(Key::Tab), true);
        c.handle_key(KeyEvent::shift(Key::Tab), true);
        assert_eq!(c.state().selection(), Some(CellPosition::new(2, 1)));
    }

    #[test]
    fn test_typing_overwrites_then_edits_draft() {
        let mut c = selected(1, 1);
        assert_eq!(
            c.handle_key(KeyEvent::plain(Key::Char('4')), true),
            KeyOutcome::Overwrite(CellPosition::new(1, 1), '4')
        );
        c.handle_key(KeyEvent::plain(Key::Char('2')), true);
        c.handle_key(KeyEvent::plain(Key::Char('x')), true);
        c.handle_key(KeyEvent::plain(Key::Backspace), true);
        assert_eq!(c.state().draft(), Some("42"));

        assert_eq!(
            c.handle_key(KeyEvent::plain(Key::Enter), true),
            KeyOutcome::Commit {
                position: CellPosition::new(1, 1),
                draft: "42".into()
            }
        );
        assert_eq!(c.state(), &EditorState::Selected(CellPosition::new(1, 1)));
    }

    #[test]
    fn test_navigation_suppressed_while_editing() {
        let mut c = selected(1, 1);
        c.begin_edit(CellPosition::new(1, 1), "abc");
        assert_eq!(c.handle_key(KeyEvent::plain(Key::ArrowDown), true), KeyOutcome::None);
        assert_eq!(c.handle_key(KeyEvent::plain(Key::Tab), true), KeyOutcome::None);
        assert_eq!(c.state().draft(), Some("abc"));
    }

    #[test]
    fn test_escape_discards() {
        let mut c = selected(3, 0);
        c.begin_edit(CellPosition::new(3, 0), "draft");
        assert_eq!(
            c.handle_key(KeyEvent::plain(Key::Escape), true),
            KeyOutcome::Cancelled(CellPosition::new(3, 0))
        );
        assert_eq!(c.state(), &EditorState::Selected(CellPosition::new(3, 0)));
    }

    #[test]
    fn test_locked_cells_do_not_open() {
        let mut c = selected(0, 0);
        assert_eq!(c.handle_key(KeyEvent::plain(Key::Enter), false), KeyOutcome::None);
        assert_eq!(c.handle_key(KeyEvent::plain(Key::Char('a')), false), KeyOutcome::None);
        assert!(!c.state().is_editing());
    }

    #[test]
    fn test_clipboard_shortcuts() {
        let mut c = selected(0, 0);
        let pos = CellPosition::new(0, 0);
        assert_eq!(c.handle_key(KeyEvent::ctrl(Key::Char('c')), true), KeyOutcome::Copy(pos));
        assert_eq!(c.handle_key(KeyEvent::meta(Key::Char('V')), true), KeyOutcome::Paste(pos));
        // Command chords never start an edit
        assert_eq!(c.handle_key(KeyEvent::ctrl(Key::Char('z')), true), KeyOutcome::None);
    }

    #[test]
    fn test_resize_clamps_selection() {
        let mut c = selected(9, 4);
        c.resize(5, 2);
        assert_eq!(c.state().selection(), Some(CellPosition::new(4, 1)));
        c.resize(0, 0);
        assert_eq!(c.state(), &EditorState::Idle);
    }
}
