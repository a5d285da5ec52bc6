//! Directory browser: current directory, selection and the listing.
//!
//! Entries are numbered in the order the volume reports them, starting at
//! 1. Outside the root, position 0 is the `..` entry and is drawn first.
//! Every listing line shows the full path of the entry.
//!
//! The browser does not cache the listing: [`Browser::refresh`] re-reads the
//! directory, redraws it and records which entry sits at the selection.

use heapless::String;
use platform::config::{MAX_PATH_LEN, PARENT_DIRECTORY, PATH_SEPARATOR, ROOT_PATH};
use platform::{DirEntry, Storage, TextDisplay, TextStyle};

use crate::UiError;

/// Full path on the volume.
pub type Path = String<MAX_PATH_LEN>;

/// A path would not fit in [`MAX_PATH_LEN`] bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PathTooLong;

/// `dir` joined with `name`, without doubling the separator at the root.
pub fn join(dir: &str, name: &str) -> Result<Path, PathTooLong> {
    let mut path = Path::new();
    path.push_str(dir).map_err(|_| PathTooLong)?;
    if !dir.ends_with(PATH_SEPARATOR) {
        path.push(PATH_SEPARATOR).map_err(|_| PathTooLong)?;
    }
    path.push_str(name).map_err(|_| PathTooLong)?;
    Ok(path)
}

/// Menu state: where we are and what is selected.
#[derive(Debug, Clone)]
pub struct Browser {
    dir: Path,
    position: usize,
    selected: Option<DirEntry>,
    entry_count: usize,
}

impl Browser {
    /// Start at the root with the first entry selected.
    pub fn new() -> Self {
        let mut dir = Path::new();
        // ROOT_PATH is a single separator
        let _ = dir.push_str(ROOT_PATH);
        Self {
            dir,
            position: 1,
            selected: None,
            entry_count: 0,
        }
    }

    /// Directory being listed.
    pub fn current_dir(&self) -> &str {
        &self.dir
    }

    /// `true` at the volume root, where there is no `..` entry.
    pub fn is_at_root(&self) -> bool {
        self.dir == ROOT_PATH
    }

    /// Selection index (0 is `..`).
    pub fn position(&self) -> usize {
        self.position
    }

    /// Entry at the selection as of the last refresh. `None` on `..` or
    /// past the end of the listing.
    pub fn selected(&self) -> Option<&DirEntry> {
        self.selected.as_ref()
    }

    /// Entries in the directory as of the last refresh (`..` excluded).
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// `true` when the middle button would change directory.
    pub fn selected_is_directory(&self) -> bool {
        self.position == 0 || self.selected.as_ref().is_some_and(|e| e.is_dir)
    }

    fn first_position(&self) -> usize {
        usize::from(self.is_at_root())
    }

    /// Move the selection to the next entry, stopping at the last one.
    pub fn select_next(&mut self) {
        let last = self.entry_count.max(self.first_position());
        self.position = self.position.saturating_add(1).min(last);
    }

    /// Move the selection to the previous entry, stopping at the first one.
    pub fn select_previous(&mut self) {
        self.position = self.position.saturating_sub(1).max(self.first_position());
    }

    /// Descend into the selected directory, or go up on `..`. The new
    /// directory starts with its first entry selected.
    pub fn enter_selected(&mut self) -> Result<(), PathTooLong> {
        if self.position == 0 {
            self.leave_directory();
        } else if let Some(entry) = self.selected.as_ref().filter(|e| e.is_dir) {
            self.dir = join(&self.dir, &entry.name)?;
        } else {
            return Ok(());
        }
        self.position = 1;
        self.selected = None;
        Ok(())
    }

    fn leave_directory(&mut self) {
        let parent_len = self.dir.rfind(PATH_SEPARATOR).unwrap_or(0);
        self.dir.truncate(parent_len);
        if self.dir.is_empty() {
            let _ = self.dir.push_str(ROOT_PATH);
        }
    }

    /// Full path of the selected entry.
    pub fn selected_path(&self) -> Result<Path, PathTooLong> {
        let name = self.selected.as_ref().map_or("", |e| e.name.as_str());
        join(&self.dir, name)
    }

    /// Re-read the directory, redraw the listing and record the selected
    /// entry.
    pub fn refresh<S, D>(&mut self, storage: &mut S, display: &mut D) -> Result<(), UiError<S::Error, D::Error>>
    where
        S: Storage,
        D: TextDisplay,
    {
        display.clear().map_err(UiError::Display)?;
        if !self.is_at_root() {
            let style = if self.position == 0 {
                TextStyle::Selected
            } else {
                TextStyle::Normal
            };
            display.write_line(PARENT_DIRECTORY, style).map_err(UiError::Display)?;
        }

        let dir = &self.dir;
        let position = self.position;
        let mut index = 0usize;
        let mut selected = None;
        let mut draw_error = None;
        storage
            .read_dir(dir, |entry| {
                index = index.saturating_add(1);
                let style = if index == position {
                    selected = Some(entry.clone());
                    if entry.is_dir {
                        TextStyle::SelectedDirectory
                    } else {
                        TextStyle::Selected
                    }
                } else {
                    TextStyle::Normal
                };
                if draw_error.is_none() {
                    draw_error = draw_entry(display, dir, entry, style).err();
                }
            })
            .map_err(UiError::Storage)?;

        self.entry_count = index;
        self.selected = selected;
        debug!("listed {} entries, selection at {}", index, position);
        draw_error.map_or(Ok(()), |err| Err(UiError::Display(err)))
    }
}

impl Default for Browser {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_entry<D: TextDisplay>(display: &mut D, dir: &str, entry: &DirEntry, style: TextStyle) -> Result<(), D::Error> {
    display.write_str(dir, style)?;
    if !dir.ends_with(PATH_SEPARATOR) {
        display.write_str(ROOT_PATH, style)?;
    }
    display.write_str(&entry.name, style)?;
    display.newline()
}
