use std::collections::HashMap;

use crate::varint::write_uvarint;

/// Deduplicating string arena for a single encoding session.
///
/// Each distinct string is appended once to the string data as `uvarint(len) || bytes`, in the
/// order it was first seen. Its offset within the string data is what gets written into the index
/// stream. A table must never be shared between records.
#[derive(Clone, Debug, Default)]
pub struct StringTable {
    data: Vec<u8>,
    offsets: HashMap<String, u64>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the offset of `s`, appending it to the string data if it hasn't been seen yet.
    pub fn intern(&mut self, s: &str) -> u64 {
        if let Some(&off) = self.offsets.get(s) {
            return off;
        }
        let off = self.data.len() as u64;
        write_uvarint(&mut self.data, s.len() as u64);
        self.data.extend_from_slice(s.as_bytes());
        self.offsets.insert(s.to_owned(), off);
        off
    }

    /// Intern `s` and write its offset into `index`.
    pub fn encode(&mut self, index: &mut Vec<u8>, s: &str) {
        let off = self.intern(s);
        write_uvarint(index, off);
    }

    /// Number of distinct strings held.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the table, keeping only the string data.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn dedup() {
        let mut table = StringTable::new();
        let mut index = Vec::new();
        table.encode(&mut index, "hello");
        let data_len = table.data().len();
        table.encode(&mut index, "hello");
        assert_eq!(index, &[0x00, 0x00]);
        assert_eq!(table.data().len(), data_len, "string data should only grow once");
        assert_eq!(table.data(), b"\x05hello");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn offsets_follow_first_seen_order() {
        let mut table = StringTable::new();
        assert_eq!(table.intern("ab"), 0);
        assert_eq!(table.intern("cde"), 3);
        assert_eq!(table.intern("ab"), 0);
        assert_eq!(table.intern("f"), 7);
        assert_eq!(table.into_data(), b"\x02ab\x03cde\x01f");
    }

    #[test]
    fn empty_string() {
        let mut table = StringTable::new();
        assert!(table.is_empty());
        let mut index = Vec::new();
        table.encode(&mut index, "");
        table.encode(&mut index, "");
        assert_eq!(index, &[0x00, 0x00]);
        assert_eq!(table.data(), &[0x00]);
        assert_eq!(table.len(), 1);
        assert!(!table.is_empty());
    }

    #[test]
    fn long_string_length_prefix() {
        let mut table = StringTable::new();
        let long = "x".repeat(200);
        table.intern(&long);
        assert_eq!(&table.data()[..2], &[0xc8, 0x01]);
        assert_eq!(table.intern("y"), 202);
    }
}
