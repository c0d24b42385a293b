//! Nerd-font icons for file browser entries.

use crate::fs::FileCategory;

pub fn icon_for(category: FileCategory) -> &'static str {
    match category {
        FileCategory::Directory => "\u{f07b}",
        FileCategory::Audio => "\u{f1c7}",
        FileCategory::Image => "\u{f1c5}",
        FileCategory::Video => "\u{f1c8}",
        FileCategory::Other => "\u{f15b}",
    }
}
