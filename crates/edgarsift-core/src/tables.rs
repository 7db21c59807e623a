//! Default 8-K item and keyword tables.

use crate::config::{ItemSpec, KeywordCategory};

/// Keywords that mark an HTML table as worth excerpting.
pub const DEFAULT_TABLE_KEYWORDS: &[&str] = &[
    "merger",
    "agreement",
    "officer",
    "director",
    "shares",
    "vote",
    "financial",
    "revenue",
    "earnings",
    "dividend",
    "debt",
];

/// (code, major, minor, weight, label)
const ITEMS: &[(&str, u32, u32, u32, &str)] = &[
    ("ITEM_1_01", 1, 1, 8, "Entry into a Material Definitive Agreement"),
    ("ITEM_1_02", 1, 2, 7, "Termination of a Material Definitive Agreement"),
    ("ITEM_2_01", 2, 1, 9, "Completion of Acquisition or Disposition of Assets"),
    ("ITEM_2_02", 2, 2, 8, "Results of Operations and Financial Condition"),
    ("ITEM_3_02", 3, 2, 6, "Unregistered Sales of Equity Securities"),
    ("ITEM_4_01", 4, 1, 6, "Changes in Registrant's Certifying Accountant"),
    ("ITEM_5_02", 5, 2, 9, "Departure or Appointment of Directors and Officers"),
    ("ITEM_7_01", 7, 1, 7, "Regulation FD Disclosure"),
    ("ITEM_8_01", 8, 1, 5, "Other Events"),
    ("ITEM_9_01", 9, 1, 4, "Financial Statements and Exhibits"),
];

const KEYWORDS: &[(&str, f64, &[&str])] = &[
    ("deal", 3.0, &[
        "merger", "acquisition", "definitive agreement", "business combination",
        "tender offer", "asset purchase", "divestiture", "joint venture",
    ]),
    ("leadership", 2.5, &[
        "chief executive officer", "chief financial officer", "chief operating officer",
        "president", "resigned", "resignation", "appointed", "appointment",
        "board of directors", "director",
    ]),
    ("earnings", 2.0, &[
        "net income", "net loss", "revenue", "earnings per share", "earnings",
        "guidance", "financial results", "operating income",
    ]),
    ("legal", 2.0, &[
        "litigation", "lawsuit", "settlement", "investigation", "subpoena",
        "bankruptcy", "chapter 11", "material weakness",
    ]),
    ("capital", 1.5, &[
        "dividend", "share repurchase", "stock repurchase", "offering", "notes due",
        "credit agreement", "indebtedness", "loan",
    ]),
    ("governance", 1.0, &[
        "shareholder", "stockholder", "annual meeting", "vote", "bylaws",
        "amendment", "auditor", "independent registered public accounting firm",
    ]),
];

/// The ten 8-K items worth segmenting, with their importance weights.
pub fn default_items() -> Vec<ItemSpec> {
    ITEMS
        .iter()
        .map(|&(code, major, minor, weight, label)| ItemSpec {
            code: code.to_string(),
            major,
            minor,
            weight,
            label: label.to_string(),
        })
        .collect()
}

/// Categorized keyword weights used by the relevance scorer.
pub fn default_keywords() -> Vec<KeywordCategory> {
    KEYWORDS
        .iter()
        .map(|&(name, weight, keywords)| KeywordCategory {
            name: name.to_string(),
            weight,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        })
        .collect()
}
