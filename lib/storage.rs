//! Byte-stream acquisition and the fixed binary field codecs used by every
//! checkpoint layout in the crate.
//!
//! All persisted numbers are little-endian: counts as `u64`, payloads as
//! `f64`. Layouts are fixed by field order alone; there is no versioning.

use std::{
    fs::File,
    io::{ BufReader, BufWriter, Read, Write },
    path::PathBuf,
};
use crate::error::{ EdError, EdResult };

/* Field codecs ***************************************************************/

pub fn write_u64(out: &mut dyn Write, x: u64) -> EdResult<()> {
    out.write_all(&x.to_le_bytes())?;
    Ok(())
}

pub fn read_u64(input: &mut dyn Read) -> EdResult<u64> {
    let mut buf = [0; 8];
    input.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

pub fn write_f64(out: &mut dyn Write, x: f64) -> EdResult<()> {
    out.write_all(&x.to_le_bytes())?;
    Ok(())
}

pub fn read_f64(input: &mut dyn Read) -> EdResult<f64> {
    let mut buf = [0; 8];
    input.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// A `u64` count followed by that many raw `f64` values.
pub fn write_samples(out: &mut dyn Write, samples: &[f64]) -> EdResult<()> {
    write_u64(out, samples.len() as u64)?;
    for &x in samples.iter() { write_f64(out, x)?; }
    Ok(())
}

/// Inverse of [`write_samples`].
pub fn read_samples(input: &mut dyn Read) -> EdResult<Vec<f64>> {
    let count = read_u64(input)? as usize;
    (0..count).map(|_| read_f64(input)).collect()
}

/// A NUL-terminated byte string.
pub fn write_label(out: &mut dyn Write, label: &str) -> EdResult<()> {
    out.write_all(label.as_bytes())?;
    out.write_all(&[0])?;
    Ok(())
}

/// Inverse of [`write_label`]. Errs on EOF before the terminator or on
/// non-UTF-8 contents.
pub fn read_label(input: &mut dyn Read) -> EdResult<String> {
    let mut bytes: Vec<u8> = Vec::new();
    let mut buf = [0; 1];
    loop {
        input.read_exact(&mut buf)?;
        if buf[0] == 0 { break; }
        bytes.push(buf[0]);
    }
    String::from_utf8(bytes)
        .map_err(|_| EdError::CheckpointMismatch(
            "label is not valid UTF-8".to_string()))
}

/* Stream provision ***********************************************************/

/// Scoped acquisition of byte streams by logical name. The description is
/// caller-supplied context carried into any open failure.
pub trait FileStreamProvider {
    fn open_output(&self, name: &str, description: &str)
        -> EdResult<Box<dyn Write>>;

    fn open_input(&self, name: &str, description: &str)
        -> EdResult<Box<dyn Read>>;
}

/// [`FileStreamProvider`] over the local filesystem, resolving names against
/// a root directory.
#[derive(Clone, Debug)]
pub struct FsStreamProvider {
    root: PathBuf,
}

impl FsStreamProvider {
    pub fn new<P>(root: P) -> Self
    where P: Into<PathBuf>
    {
        Self { root: root.into() }
    }
}

impl FileStreamProvider for FsStreamProvider {
    fn open_output(&self, name: &str, description: &str)
        -> EdResult<Box<dyn Write>>
    {
        File::create(self.root.join(name))
            .map(|f| Box::new(BufWriter::new(f)) as Box<dyn Write>)
            .map_err(|source| EdError::Stream {
                name: name.to_string(),
                description: description.to_string(),
                source,
            })
    }

    fn open_input(&self, name: &str, description: &str)
        -> EdResult<Box<dyn Read>>
    {
        File::open(self.root.join(name))
            .map(|f| Box::new(BufReader::new(f)) as Box<dyn Read>)
            .map_err(|source| EdError::Stream {
                name: name.to_string(),
                description: description.to_string(),
                source,
            })
    }
}
