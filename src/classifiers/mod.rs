// THEORY:
// The classifiers are the Attribute Layer of the analysis engine. Each one reduces
// a `PixelBuffer` to a single summary statistic and maps that statistic onto a
// small, fixed label vocabulary through an ordered rule table.
//
// Key architectural principles:
// 1.  **One Abstraction**: Every attribute is an implementation of `Classifier`.
//     The orchestrator holds them as `Arc<dyn Classifier>` in a list and runs them
//     uniformly, so adding an attribute never touches the orchestration code.
// 2.  **Independent & Read-Only**: A classifier only reads the shared buffer and
//     derives its own transformed copy. No classifier depends on another, so they
//     can run in any order or in parallel.
// 3.  **Total**: Rule tables always end in a fallback label. Any non-empty image
//     gets a label for every attribute.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core_modules::pixel_buffer::PixelBuffer;

pub mod blemish;
pub mod oiliness;
pub mod pores;
pub mod redness;
pub mod rules;
pub mod skin_tone;

pub use blemish::BlemishClassifier;
pub use oiliness::OilinessClassifier;
pub use pores::PoreClassifier;
pub use redness::RednessClassifier;
pub use skin_tone::SkinToneClassifier;

/// The five attributes a report is made of, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    SkinTone,
    Oiliness,
    Redness,
    Pimples,
    OpenPores,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::SkinTone,
        Attribute::Oiliness,
        Attribute::Redness,
        Attribute::Pimples,
        Attribute::OpenPores,
    ];

    /// The key this attribute is reported under.
    pub fn key(self) -> &'static str {
        match self {
            Attribute::SkinTone => "skinTone",
            Attribute::Oiliness => "oiliness",
            Attribute::Redness => "redness",
            Attribute::Pimples => "pimples",
            Attribute::OpenPores => "openPores",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Defines a label enum whose serialized form is the variant name.
macro_rules! label_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

label_enum!(
    /// Overall lightness band of the face.
    SkinTone { Fair, Medium, Dark }
);
label_enum!(Oiliness { Oily, Dry });
label_enum!(
    /// Three-step scale shared by redness and pore visibility.
    Severity { Low, Moderate, Severe }
);
label_enum!(
    /// Blemish scale. `None` means no dark spot was found at all.
    BlemishSeverity { None, Mild, Moderate, Severe }
);

/// A label tagged with the attribute it answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    SkinTone(SkinTone),
    Oiliness(Oiliness),
    Redness(Severity),
    Pimples(BlemishSeverity),
    OpenPores(Severity),
}

impl Label {
    pub fn attribute(self) -> Attribute {
        match self {
            Label::SkinTone(_) => Attribute::SkinTone,
            Label::Oiliness(_) => Attribute::Oiliness,
            Label::Redness(_) => Attribute::Redness,
            Label::Pimples(_) => Attribute::Pimples,
            Label::OpenPores(_) => Attribute::OpenPores,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::SkinTone(label) => label.as_str(),
            Label::Oiliness(label) => label.as_str(),
            Label::Redness(label) | Label::OpenPores(label) => label.as_str(),
            Label::Pimples(label) => label.as_str(),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute().key(), self.as_str())
    }
}

/// The outcome of one classifier over one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub label: Label,
    /// The summary statistic the label was chosen from (mean lightness, ratio,
    /// percentage or count depending on the attribute).
    pub statistic: f64,
}

pub trait Classifier: Send + Sync {
    fn attribute(&self) -> Attribute;

    /// Label one image. Assumes a non-empty buffer.
    fn classify(&self, buffer: &PixelBuffer) -> Classification;
}

/// One classifier per attribute, in report order.
pub fn standard_classifiers() -> Vec<Arc<dyn Classifier>> {
    vec![
        Arc::new(SkinToneClassifier::default()),
        Arc::new(OilinessClassifier::default()),
        Arc::new(RednessClassifier::default()),
        Arc::new(BlemishClassifier::default()),
        Arc::new(PoreClassifier::default()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_classifiers_cover_every_attribute_once_in_order() {
        let attributes: Vec<Attribute> = standard_classifiers().iter().map(|c| c.attribute()).collect();
        assert_eq!(attributes, Attribute::ALL.to_vec());
    }

    #[test]
    fn labels_serialize_as_their_names() {
        assert_eq!(serde_json::to_string(&BlemishSeverity::None).unwrap(), "\"None\"");
        assert_eq!(serde_json::to_string(&SkinTone::Fair).unwrap(), "\"Fair\"");
        let parsed: Severity = serde_json::from_str("\"Moderate\"").unwrap();
        assert_eq!(parsed, Severity::Moderate);
    }

    #[test]
    fn label_knows_its_attribute() {
        let label = Label::OpenPores(Severity::Low);
        assert_eq!(label.attribute(), Attribute::OpenPores);
        assert_eq!(label.as_str(), "Low");
        assert_eq!(label.to_string(), "openPores=Low");
    }

    #[test]
    fn label_sets_are_fixed() {
        assert_eq!(SkinTone::ALL.len(), 3);
        assert_eq!(Oiliness::ALL.len(), 2);
        assert_eq!(Severity::ALL.len(), 3);
        assert_eq!(BlemishSeverity::ALL.len(), 4);
    }
}
