#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use dog_attach::FilenameStrategy;

/// Hands out a fixed list of ids, then falls back to numbered ones
pub struct FixedNames {
    names: Mutex<VecDeque<String>>,
    counter: Mutex<u32>,
}

impl FixedNames {
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: Mutex::new(names.iter().map(|n| n.to_string()).collect()),
            counter: Mutex::new(0),
        }
    }
}

impl FilenameStrategy for FixedNames {
    fn unique_id(&self) -> String {
        if let Some(name) = self.names.lock().unwrap().pop_front() {
            return name;
        }
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        format!("zz{:06}", counter)
    }
}

/// Smallest header the image probe accepts as PNG, followed by `tail`
pub fn png(tail: &[u8]) -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(&[0, 0, 0, 13]);
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&[0, 0, 0, 2, 0, 0, 0, 2]);
    bytes.extend_from_slice(tail);
    bytes
}

/// JPEG start-of-image marker followed by `tail`
pub fn jpeg(tail: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.extend_from_slice(tail);
    bytes
}
