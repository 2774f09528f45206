use crate::detection::DetectionBatch;
use serde_json::de::IoRead;
use serde_json::{Deserializer, StreamDeserializer};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("batch {index}: {source}")]
    Parse {
        /// 1-based position of the failing batch in the stream
        index: usize,
        source: serde_json::Error,
    },
}

/// Iterates over detection batches stored as JSON lines (or any sequence of
/// whitespace separated JSON objects). Stops after the first error.
pub struct BatchReader<R: Read> {
    stream: StreamDeserializer<'static, IoRead<R>, DetectionBatch>,
    index: usize,
    failed: bool,
}

impl<R: Read> BatchReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            stream: Deserializer::from_reader(reader).into_iter(),
            index: 0,
            failed: false,
        }
    }
}

impl<R: Read> Iterator for BatchReader<R> {
    type Item = Result<DetectionBatch, ReplayError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.stream.next()?;
        self.index += 1;
        Some(item.map_err(|source| {
            self.failed = true;
            ReplayError::Parse {
                index: self.index,
                source,
            }
        }))
    }
}

/// Open a batch file, `-` meaning stdin.
pub fn open(path: &Path) -> Result<BatchReader<Box<dyn Read>>, ReplayError> {
    let reader: Box<dyn Read> = if path.as_os_str() == "-" {
        Box::new(std::io::stdin().lock())
    } else {
        let file = File::open(path).map_err(|source| ReplayError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Box::new(BufReader::new(file))
    };
    Ok(BatchReader::new(reader))
}
