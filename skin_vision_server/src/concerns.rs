//! Maps analysis labels onto the concern vocabulary of the product recommender.

use serde::{Deserialize, Serialize};
use skin_vision::SkinReport;
use skin_vision::classifiers::{BlemishSeverity, Oiliness, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Concern {
    #[serde(rename = "dry")]
    Dry,
    #[serde(rename = "oily")]
    Oily,
    #[serde(rename = "redness")]
    Redness,
    #[serde(rename = "pimples")]
    Pimples,
    #[serde(rename = "openPores")]
    OpenPores,
}

/// Skin tone never raises a concern. Oiliness always raises exactly one
/// (`oily` or `dry`); the other attributes raise theirs from the first band
/// above their lowest label.
pub fn concerns_for(report: &SkinReport) -> Vec<Concern> {
    let mut concerns = vec![match report.oiliness {
        Oiliness::Oily => Concern::Oily,
        Oiliness::Dry => Concern::Dry,
    }];
    if report.redness != Severity::Low {
        concerns.push(Concern::Redness);
    }
    if report.pimples != BlemishSeverity::None {
        concerns.push(Concern::Pimples);
    }
    if report.open_pores != Severity::Low {
        concerns.push(Concern::OpenPores);
    }
    concerns
}
