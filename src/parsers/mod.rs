pub mod date;
pub mod document;
pub mod sentinel;
pub mod table;

pub use date::*;
pub use document::*;
pub use sentinel::*;
pub use table::*;

use scraper::ElementRef;

/// Text content of an element with surrounding whitespace removed.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
