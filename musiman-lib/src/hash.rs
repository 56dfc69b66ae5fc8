use std::{fs::File, io, path::Path};

use crate::record::HASH_SIZE;

/// Fingerprints the content of the file at `path`.
///
/// The file is streamed through BLAKE3 and [`HASH_SIZE`] bytes of extended
/// output are taken, so arbitrarily large files are never held in memory.
pub fn hash_file(path: &Path) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    hasher.update_reader(file)?;
    let mut hash = vec![0; HASH_SIZE];
    hasher.finalize_xof().fill(&mut hash);
    Ok(hash)
}
