//! Page-index control strip for article listings.
//!
//! Every page from 1 to `total_pages` gets its own control; there is no
//! windowing, so very long listings produce very long strips.

use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    Previous { target: u32 },
    Page { number: u32 },
    /// The page being shown; not clickable.
    Current { number: u32 },
    Next { target: u32 },
}

impl PageControl {
    /// Page to load when the control is activated.
    pub fn target(self) -> Option<u32> {
        match self {
            PageControl::Previous { target } | PageControl::Next { target } => Some(target),
            PageControl::Page { number } => Some(number),
            PageControl::Current { .. } => None,
        }
    }
}

pub fn pagination_controls(current_page: u32, total_pages: u32) -> Vec<PageControl> {
    let mut controls = Vec::new();

    if current_page > 1 {
        controls.push(PageControl::Previous {
            target: current_page - 1,
        });
    }

    for number in 1..=total_pages {
        if number == current_page {
            controls.push(PageControl::Current { number });
        } else {
            controls.push(PageControl::Page { number });
        }
    }

    if current_page < total_pages {
        controls.push(PageControl::Next {
            target: current_page + 1,
        });
    }

    controls
}

pub fn pagination_markup(controls: &[PageControl]) -> String {
    let mut html = String::new();
    for control in controls {
        // Writing into a String cannot fail.
        let _ = match *control {
            PageControl::Previous { target } => {
                write!(html, "<a href=\"#\" data-page=\"{target}\">&laquo;</a>")
            }
            PageControl::Page { number } => {
                write!(html, "<a href=\"#\" data-page=\"{number}\">{number}</a>")
            }
            PageControl::Current { number } => {
                write!(html, "<span class=\"active\">{number}</span>")
            }
            PageControl::Next { target } => {
                write!(html, "<a href=\"#\" data-page=\"{target}\">&raquo;</a>")
            }
        };
    }
    html
}

#[cfg(test)]
#[path = "tests/pagination_tests.rs"]
mod tests;
