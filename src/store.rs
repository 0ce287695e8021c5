//! Flat-file persistence for [`RingQueue`].
//!
//! A queue file is nothing but its logical sequence written as consecutive
//! native-endian 32-bit values, front to back. Loading therefore always
//! produces an unwrapped queue (`begin = 0`).

use std::io::{self, ErrorKind, Read, Write};
use std::path::Path;

use byteorder::{ByteOrder, NativeEndian, WriteBytesExt};
use thiserror::Error;
use tracing::debug;

use crate::ring::RingQueue;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("file holds more than {capacity} values")]
    TooLong { capacity: usize },
    #[error("file ends mid-value")]
    TrailingBytes,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Reads values until EOF and installs them as the queue contents, first
/// value at offset 0. Rejects streams holding more than `N` values or a
/// trailing partial value.
pub fn load<const N: usize, R: Read>(mut reader: R) -> Result<RingQueue<N>, StoreError> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;
    if raw.len() % size_of::<u32>() != 0 {
        return Err(StoreError::TrailingBytes);
    }
    if raw.len() / size_of::<u32>() > N {
        return Err(StoreError::TooLong { capacity: N });
    }
    // push_back prepends, so feed the values back to front to leave the
    // first file value at offset 0.
    let mut queue = RingQueue::new();
    for chunk in raw.chunks_exact(size_of::<u32>()).rev() {
        queue
            .push_back(NativeEndian::read_u32(chunk))
            .expect("value count checked against capacity");
    }
    Ok(queue)
}

/// Writes the logical sequence, offsets `0..len`, as native-endian values.
/// Flushes before returning, so a buffered writer can't defer a failing OS
/// write to its drop, where the error would be lost.
pub fn save<const N: usize, W: Write>(queue: &RingQueue<N>, mut writer: W) -> io::Result<()> {
    for value in queue.iter() {
        writer.write_u32::<NativeEndian>(value)?;
    }
    writer.flush()
}

/// Loads a queue from `path`; a missing file is an empty queue.
pub fn load_path<const N: usize>(path: &Path) -> Result<RingQueue<N>, StoreError> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "queue file missing, starting empty");
            return Ok(RingQueue::new());
        }
        Err(e) => return Err(e.into()),
    };
    let queue = load(io::BufReader::new(file))?;
    debug!(path = %path.display(), len = queue.len(), "loaded queue");
    Ok(queue)
}

/// Saves a queue to `path`, truncating any previous contents.
pub fn save_path<const N: usize>(queue: &RingQueue<N>, path: &Path) -> Result<(), StoreError> {
    let file = std::fs::File::create(path)?;
    save(queue, io::BufWriter::new(file)).map_err(StoreError::from)?;
    debug!(path = %path.display(), len = queue.len(), "saved queue");
    Ok(())
}
