use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Row-template rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Declarations that went through physical control: bills the inspection.
    CuFizic,
    /// No physical control; adds the `gestiune` column.
    FaraFizic,
}

/// What the user asked for; `Auto` is resolved from the folder content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum VariantChoice {
    Auto,
    CuFizic,
    FaraFizic,
}

const BASE_HEADER: [&str; 12] = [
    "nr.crt",
    "CIF/CNP",
    "deviz",
    "Produs",
    "Serie produs",
    "Cant",
    "UM",
    "Pret FTVA",
    "cota TVA",
    "nota produs",
    "scutit TVA (0/1)",
    "motiv scutire TVA",
];

/// Position of the extra `gestiune` column in the 13-column layout.
const GESTIUNE_INDEX: usize = 2;

impl Variant {
    pub fn header(self) -> Vec<&'static str> {
        let mut header = BASE_HEADER.to_vec();
        if self == Variant::FaraFizic {
            header.insert(GESTIUNE_INDEX, "gestiune");
        }
        header
    }

    pub fn column_count(self) -> usize {
        match self {
            Variant::CuFizic => 12,
            Variant::FaraFizic => 13,
        }
    }

    pub fn includes_physical_control(self) -> bool {
        self == Variant::CuFizic
    }

    /// Places a base 12-column row into this variant's layout.
    pub fn layout(self, mut row: Vec<String>) -> Vec<String> {
        if self == Variant::FaraFizic {
            row.insert(GESTIUNE_INDEX, String::new());
        }
        row
    }

    pub fn label(self) -> &'static str {
        match self {
            Variant::CuFizic => "CU FIZIC",
            Variant::FaraFizic => "FARA FIZIC",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl VariantChoice {
    pub fn fixed(self) -> Option<Variant> {
        match self {
            VariantChoice::Auto => None,
            VariantChoice::CuFizic => Some(Variant::CuFizic),
            VariantChoice::FaraFizic => Some(Variant::FaraFizic),
        }
    }
}
