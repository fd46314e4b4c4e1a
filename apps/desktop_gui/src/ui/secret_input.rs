//! Text buffer for the API key field.

use std::ops::Range;

use eframe::egui::TextBuffer;
use zeroize::Zeroize;

const MIN_CAPACITY: usize = 64;

/// Editing buffer that never leaves a stale copy of the key behind: every
/// edit builds the next contents in a fresh allocation and wipes the old one.
#[derive(Default)]
pub struct SecretInput(String);

impl SecretInput {
    fn replace_buffer(&mut self, next: String) {
        let mut old = std::mem::replace(&mut self.0, next);
        old.zeroize();
    }

    fn with_capacity_for(len: usize) -> String {
        String::with_capacity(len.max(MIN_CAPACITY))
    }
}

impl TextBuffer for SecretInput {
    fn is_mutable(&self) -> bool {
        true
    }

    fn as_str(&self) -> &str {
        &self.0
    }

    fn insert_text(&mut self, text: &str, char_index: usize) -> usize {
        let at = self.byte_index_from_char_index(char_index);
        let mut next = Self::with_capacity_for(self.0.len() + text.len());
        next.push_str(&self.0[..at]);
        next.push_str(text);
        next.push_str(&self.0[at..]);
        self.replace_buffer(next);
        text.chars().count()
    }

    fn delete_char_range(&mut self, char_range: Range<usize>) {
        let start = self.byte_index_from_char_index(char_range.start);
        let end = self.byte_index_from_char_index(char_range.end.max(char_range.start));
        let mut next = Self::with_capacity_for(self.0.len());
        next.push_str(&self.0[..start]);
        next.push_str(&self.0[end..]);
        self.replace_buffer(next);
    }

    fn type_id(&self) -> std::any::TypeId {
        std::any::TypeId::of::<Self>()
    }
}

impl Drop for SecretInput {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
