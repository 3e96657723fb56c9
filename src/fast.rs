use crate::error::CsvResult;
use memchr::memchr_iter;
use memmap2::MmapOptions;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Count physical lines of a local UTF-8 file using mmap and parallel chunking.
/// Agrees with the line codec: a trailing terminator does not start a new line.
pub(crate) fn count_lines(path: &Path) -> CsvResult<usize> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(0);
    }
    // SAFETY: the map is read-only and dropped before returning.
    let mmap = unsafe { MmapOptions::new().map(&file)? };
    let data: &[u8] = mmap.strip_prefix(UTF8_BOM).unwrap_or(&mmap[..]);
    if data.is_empty() {
        return Ok(0);
    }

    let cores = num_cpus::get().max(1);
    let chunk = data.len().div_ceil(cores).max(1);
    let total = AtomicUsize::new(0);
    thread::scope(|s| {
        let total_ref = &total;
        for part in data.chunks(chunk) {
            s.spawn(move || {
                let count = memchr_iter(b'\n', part).count();
                total_ref.fetch_add(count, Ordering::Relaxed);
            });
        }
    });

    let mut lines = total.load(Ordering::Relaxed);
    // If file doesn't end with newline, count the last line too
    if data.last() != Some(&b'\n') {
        lines += 1;
    }
    Ok(lines)
}
