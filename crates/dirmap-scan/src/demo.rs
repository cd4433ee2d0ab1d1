//! Built-in demonstration dataset.
//!
//! A small home folder with two duplicate sets, shown when no real folder
//! can be scanned.

use std::sync::Arc;

use crate::source::FlatFile;
use crate::source::memory::{MemoryDirectory, MemoryFile};

/// Name of the demonstration root folder.
pub const DEMO_ROOT: &str = "root";

const BEACH_PHOTO: &[u8] = b"\xff\xd8\xff\xe0 beach at sunset";
const PROPOSAL: &[u8] = b"PK\x03\x04 project proposal draft";

fn demo_entries() -> Vec<MemoryFile> {
    let unique = |path: &str, size: u64| MemoryFile::new(path, path.as_bytes().to_vec()).with_size(size);
    let shared = |path: &str, contents: &[u8], size: u64| {
        MemoryFile::new(path, contents.to_vec()).with_size(size)
    };

    vec![
        shared("Documents/Work/Project A/proposal.docx", PROPOSAL, 2_500_000),
        unique("Documents/Work/Project A/budget.xlsx", 1_800_000),
        shared("Documents/Work/Project A/old/proposal_v1.docx", PROPOSAL, 2_500_000),
        unique("Documents/Work/Project B/report.pdf", 3_500_000),
        unique("Documents/Work/Project B/presentation.pptx", 4_200_000),
        unique("Documents/Personal/resume.docx", 350_000),
        unique("Documents/Personal/tax_return_2024.pdf", 1_200_000),
        shared("Pictures/Vacation/beach.jpg", BEACH_PHOTO, 5_500_000),
        unique("Pictures/Vacation/mountains.jpg", 6_200_000),
        shared("Pictures/Vacation/beach_copy.jpg", BEACH_PHOTO, 5_500_000),
        unique("Pictures/Family/christmas.png", 8_100_000),
        unique("Pictures/Family/birthday.jpg", 4_800_000),
        unique("Downloads/software.dmg", 350_000_000),
        unique("Downloads/movie.mp4", 1_500_000_000),
        shared("Downloads/backup/old_photos/beach.jpg", BEACH_PHOTO, 5_500_000),
    ]
}

/// The dataset as a flat file list.
pub fn demo_files() -> Vec<Arc<dyn FlatFile>> {
    demo_entries()
        .into_iter()
        .map(|file| Arc::new(file) as Arc<dyn FlatFile>)
        .collect()
}

/// The dataset as a directory handle named [`DEMO_ROOT`].
pub fn demo_directory() -> MemoryDirectory {
    MemoryDirectory::from_files(DEMO_ROOT, demo_entries())
}
