//! In-memory resource hosts for unit tests

use crate::error::{InlineError, Result};
use crate::host::ResourceHost;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

fn not_found(path: &Path) -> InlineError {
    InlineError::file_not_found(path, io::Error::from(io::ErrorKind::NotFound))
}

/// Serves files from a map
#[derive(Debug, Default)]
pub struct MemoryHost {
    files: HashMap<PathBuf, String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(PathBuf::from(path), content.to_string());
        self
    }
}

impl ResourceHost for MemoryHost {
    async fn read_file(&self, path: &Path) -> Result<String> {
        self.files.get(path).cloned().ok_or_else(|| not_found(path))
    }
}

/// Serves files after yielding to the executor a configurable number of times, and records
/// the order in which reads complete.
#[derive(Debug, Default)]
pub struct SlowHost {
    files: HashMap<PathBuf, (String, usize)>,
    completed: RefCell<Vec<String>>,
}

impl SlowHost {
    pub fn new(files: Vec<(&str, &str, usize)>) -> Self {
        Self {
            files: files
                .into_iter()
                .map(|(path, content, yields)| (PathBuf::from(path), (content.to_string(), yields)))
                .collect(),
            completed: RefCell::new(Vec::new()),
        }
    }

    pub fn completion_order(&self) -> Vec<String> {
        self.completed.borrow().clone()
    }
}

impl ResourceHost for SlowHost {
    async fn read_file(&self, path: &Path) -> Result<String> {
        let (content, yields) = self.files.get(path).cloned().ok_or_else(|| not_found(path))?;
        YieldNow(yields).await;
        self.completed.borrow_mut().push(path.display().to_string());
        Ok(content)
    }
}

/// Returns `Pending` the given number of times, waking itself each time
struct YieldNow(usize);

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 == 0 {
            return Poll::Ready(());
        }
        self.0 -= 1;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}
