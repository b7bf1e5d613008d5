// tests/integration/fixtures.rs

//! Common test fixtures and data generators

/// A small text file present in most test directories.
pub const TEXT_FILE: &str = "notes.txt";
pub const TEXT_CONTENTS: &[u8] = b"first line\nsecond line\n";

/// A second file whose name extends `TEXT_FILE`'s stem.
pub const SIMILAR_FILE: &str = "notes.txt.bak";
pub const SIMILAR_CONTENTS: &[u8] = b"backup";

pub const EMPTY_FILE: &str = "empty.dat";

/// Binary content larger than the transport's read chunk, covering every byte value.
pub fn binary_contents(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// The default directory used by the get and list tests.
pub fn standard_files() -> Vec<(&'static str, &'static [u8])> {
    vec![
        (TEXT_FILE, TEXT_CONTENTS),
        (SIMILAR_FILE, SIMILAR_CONTENTS),
        (EMPTY_FILE, &b""[..]),
    ]
}
