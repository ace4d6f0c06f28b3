//! The six fixed page templates that make up one school's profile.
//!
//! CollegeData renders each school across six numbered pages, and the anomaly
//! fixers are selected by this enum rather than by a raw page number.

use std::fmt;

/// One of the six page templates, in fetch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Overview,
    Admissions,
    FinancialAid,
    Academics,
    CampusLife,
    Students,
}

impl Page {
    /// All pages in their mandatory processing order (1 through 6).
    ///
    /// Later pages assume labels canonicalized on earlier ones, so this
    /// order is part of the pipeline contract.
    pub const ALL: [Page; 6] = [
        Page::Overview,
        Page::Admissions,
        Page::FinancialAid,
        Page::Academics,
        Page::CampusLife,
        Page::Students,
    ];

    /// The numeric template id used in the site's URL scheme.
    #[must_use]
    pub fn id(self) -> u8 {
        match self {
            Page::Overview => 1,
            Page::Admissions => 2,
            Page::FinancialAid => 3,
            Page::Academics => 4,
            Page::CampusLife => 5,
            Page::Students => 6,
        }
    }

    #[must_use]
    pub fn from_id(id: u8) -> Option<Page> {
        match id {
            1 => Some(Page::Overview),
            2 => Some(Page::Admissions),
            3 => Some(Page::FinancialAid),
            4 => Some(Page::Academics),
            5 => Some(Page::CampusLife),
            6 => Some(Page::Students),
            _ => None,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Page::Overview => "overview",
            Page::Admissions => "admissions",
            Page::FinancialAid => "financial aid",
            Page::Academics => "academics",
            Page::CampusLife => "campus life",
            Page::Students => "students",
        };
        write!(f, "{} ({})", name, self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for page in Page::ALL {
            assert_eq!(Page::from_id(page.id()), Some(page));
        }
        assert_eq!(Page::from_id(0), None);
        assert_eq!(Page::from_id(7), None);
    }

    #[test]
    fn all_is_in_fetch_order() {
        let ids: Vec<u8> = Page::ALL.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }
}
