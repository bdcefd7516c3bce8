#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use compress::{CompressError, Compressor, PreparedInput, Resizer, Result};
use tempfile::TempDir;
use tinybatch_core::FailureKind;
use tinybatch_ledger::{Ledger, LedgerPaths};

pub struct Workspace {
    pub dir: TempDir,
    pub source: PathBuf,
    pub output: PathBuf,
    pub state: LedgerPaths,
}

pub fn setup_workspace() -> Workspace {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path().join("images");
    let output = dir.path().join("compressed");
    fs::create_dir_all(&source).expect("create source");
    let state = LedgerPaths::in_dir(&dir.path().join("state"));
    Workspace {
        dir,
        source,
        output,
        state,
    }
}

impl Workspace {
    pub fn write_image(&self, relative: &str, size: usize, seed: u8) -> PathBuf {
        let path = self.source.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create image dir");
        }
        let data: Vec<u8> = (0..size).map(|i| (i as u8).wrapping_add(seed)).collect();
        fs::write(&path, data).expect("write image");
        path
    }

    pub fn open_ledger(&self, keys: &[&str], limit: u64) -> Ledger {
        let credentials = keys.iter().map(|key| key.to_string()).collect();
        let (ledger, _) =
            Ledger::open_reconciled(&self.state, credentials, limit).expect("open ledger");
        ledger
    }

    pub fn roots(&self) -> compress::BatchRoots {
        compress::BatchRoots {
            source: self.source.clone(),
            output: self.output.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Call {
    pub credential: String,
    pub input: PathBuf,
}

/// Writes the first three quarters of the input, or fails as scripted.
#[derive(Default)]
pub struct FakeCompressor {
    pub calls: RefCell<Vec<Call>>,
    failures: RefCell<VecDeque<FailureKind>>,
}

impl FakeCompressor {
    pub fn failing(kinds: &[FailureKind]) -> Self {
        Self {
            calls: RefCell::default(),
            failures: RefCell::new(kinds.iter().copied().collect()),
        }
    }

    pub fn credentials_used(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|call| call.credential.clone())
            .collect()
    }
}

impl Compressor for FakeCompressor {
    fn compress(&self, credential: &str, input: &Path, output: &Path) -> Result<u64> {
        let data = fs::read(input)?;
        self.calls.borrow_mut().push(Call {
            credential: credential.to_string(),
            input: input.to_path_buf(),
        });
        if let Some(kind) = self.failures.borrow_mut().pop_front() {
            return Err(error_for(kind));
        }
        let shrunk = &data[..data.len() * 3 / 4];
        fs::write(output, shrunk)?;
        Ok(shrunk.len() as u64)
    }
}

fn error_for(kind: FailureKind) -> CompressError {
    match kind {
        FailureKind::Account => CompressError::Account("Credentials are invalid.".to_string()),
        FailureKind::Request => CompressError::Request("Bad request".to_string()),
        FailureKind::Server => CompressError::Server("HTTP 503".to_string()),
        FailureKind::Connection => CompressError::Connection("connection refused".to_string()),
        FailureKind::Io | FailureKind::Exhausted => {
            CompressError::Io(io::Error::other("disk full"))
        }
    }
}

/// Copies the source into a temp file and remembers where it put it.
#[derive(Default)]
pub struct CopyResizer {
    pub created: RefCell<Vec<PathBuf>>,
}

impl Resizer for CopyResizer {
    fn prepare(&self, source: &Path, _max_width: u32) -> PreparedInput {
        let data = fs::read(source).expect("read source");
        let mut temp = tempfile::NamedTempFile::new().expect("temp file");
        temp.write_all(&data[..data.len() / 2]).expect("write temp");
        let temp = temp.into_temp_path();
        self.created.borrow_mut().push(temp.to_path_buf());
        PreparedInput::Resized(temp)
    }
}
