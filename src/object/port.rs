//! A value wrapping an OS file handle with open/closed status. A port
//! acquires its handle at construction; release happens on reclamation
//! or on explicit close, whichever comes first.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};

use crate::error::PortError;

pub struct Port {
  file: Option<BufReader<File>>,
}

impl Port {
  pub fn open(path: &str) -> Result<Self, PortError> {
    let file = File::open(path).map_err(|e| PortError::Open(path.to_owned(), e))?;
    Ok(Self {
      file: Some(BufReader::new(file)),
    })
  }

  pub fn from_file(file: File) -> Self {
    Self {
      file: Some(BufReader::new(file)),
    }
  }

  pub fn is_open(&self) -> bool {
    self.file.is_some()
  }

  /// Closes the underlying OS handle. Idempotent — closing an already
  /// closed port is a no-op.
  pub fn close(&mut self) {
    self.file = None;
  }

  /// Reads one line (without the trailing newline). `None` at EOF —
  /// callers turn that into `err_eof()`.
  pub fn read_line(&mut self) -> Result<Option<String>, PortError> {
    let Some(reader) = self.file.as_mut() else {
      return Err(PortError::Closed);
    };
    let mut line = String::new();
    let n = reader.read_line(&mut line).map_err(PortError::Io)?;
    if n == 0 {
      return Ok(None);
    }
    if line.ends_with('\n') {
      line.pop();
      if line.ends_with('\r') {
        line.pop();
      }
    }
    Ok(Some(line))
  }

  pub fn write(&mut self, bytes: &[u8]) -> Result<(), PortError> {
    let Some(reader) = self.file.as_mut() else {
      return Err(PortError::Closed);
    };
    reader.get_mut().write_all(bytes).map_err(PortError::Io)
  }

  /// Duplicates the OS file descriptor so the copy is independently
  /// readable/writable and independently closable. Falls back to a closed
  /// port if duplication fails (see DESIGN.md, "copy on Port").
  pub fn try_clone(&self) -> Self {
    match self.file.as_ref().map(|r| r.get_ref().try_clone()) {
      Some(Ok(file)) => Self::from_file(file),
      _ => Self { file: None },
    }
  }
}
