//! Column schema of the company dataset.
//!
//! The one place that names which columns are categorical, which are
//! administrative, and which outcome codes the classifiers target. Training,
//! inference and search all read these lists from here.

use serde::{Deserialize, Serialize};

/// Column holding the company name, used by search
pub const NAME_COLUMN: &str = "name_org";

/// Column holding the outcome code
pub const OUTCOME_COLUMN: &str = "outcome";

/// Placeholder a null categorical cell is encoded as
pub const MISSING_CATEGORY: &str = "nan";

/// Categorical feature columns, label-encoded before training
pub const CATEGORICAL_COLUMNS: &[&str] = &[
    "country_code",
    "region",
    "city",
    "category_list",
    "last_round_investment_type",
];

/// Columns dropped before training. Whatever remains, in file order, is the
/// column order contract.
pub const EXCLUDED_FEATURES: &[&str] = &[
    "uuid_org",
    "name_org",
    "permalink_org",
    "domain",
    "homepage_url",
    "address",
    "postal_code",
    "short_description",
    "facebook_url",
    "linkedin_url",
    "twitter_url",
    "founded_on",
    "last_funding_on",
    "closed_on",
    "total_funding_currency_code",
    "outcome",
    "state_code",
    "status",
    "total_funding",
    "category_groups_list",
    "founders_degree_count_mean",
];

/// Columns stripped from search results. The name stays visible.
pub const SEARCH_EXCLUDED: &[&str] = &[
    "uuid_org",
    "permalink_org",
    "domain",
    "homepage_url",
    "address",
    "postal_code",
    "short_description",
    "facebook_url",
    "linkedin_url",
    "twitter_url",
    "founded_on",
    "last_funding_on",
    "closed_on",
    "total_funding_currency_code",
    "outcome",
    "state_code",
    "status",
    "total_funding",
    "category_groups_list",
    "founders_degree_count_mean",
];

/// Returns true when `column` is label-encoded
pub fn is_categorical(column: &str) -> bool {
    CATEGORICAL_COLUMNS.contains(&column)
}

/// Returns true when `column` is excluded from the feature set
pub fn is_excluded(column: &str) -> bool {
    EXCLUDED_FEATURES.contains(&column)
}

/// Kind of ensemble trained for a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassifierKind {
    RandomForest,
    GradientBoosting,
}

impl ClassifierKind {
    /// Short suffix used in artifact and report keys
    pub fn suffix(&self) -> &'static str {
        match self {
            ClassifierKind::RandomForest => "RF",
            ClassifierKind::GradientBoosting => "GB",
        }
    }
}

/// One of the five per-outcome binary targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OutcomeTarget {
    Ipo,
    FundingRound,
    NoEvent,
    Acquisition,
    Closed,
}

impl OutcomeTarget {
    /// All targets in training order
    pub const ALL: [OutcomeTarget; 5] = [
        OutcomeTarget::Ipo,
        OutcomeTarget::FundingRound,
        OutcomeTarget::NoEvent,
        OutcomeTarget::Acquisition,
        OutcomeTarget::Closed,
    ];

    /// Outcome codes accepted for this target, in preference order
    pub fn codes(&self) -> &'static [&'static str] {
        match self {
            OutcomeTarget::Ipo => &["IP", "IPO"],
            OutcomeTarget::FundingRound => &["FR"],
            OutcomeTarget::NoEvent => &["NE"],
            OutcomeTarget::Acquisition => &["AC"],
            OutcomeTarget::Closed => &["CL"],
        }
    }

    /// Short display name, e.g. `IPO`
    pub fn short_name(&self) -> &'static str {
        match self {
            OutcomeTarget::Ipo => "IPO",
            OutcomeTarget::FundingRound => "FR",
            OutcomeTarget::NoEvent => "NE",
            OutcomeTarget::Acquisition => "AC",
            OutcomeTarget::Closed => "CL",
        }
    }

    /// Name of the derived binary label column
    pub fn label_name(&self) -> &'static str {
        match self {
            OutcomeTarget::Ipo => "IPO_vs_Other",
            OutcomeTarget::FundingRound => "FR_vs_Other",
            OutcomeTarget::NoEvent => "NE_vs_Other",
            OutcomeTarget::Acquisition => "AC_vs_Other",
            OutcomeTarget::Closed => "CL_vs_Other",
        }
    }

    /// Ensemble used for this target
    pub fn classifier_kind(&self) -> ClassifierKind {
        match self {
            OutcomeTarget::Acquisition => ClassifierKind::GradientBoosting,
            _ => ClassifierKind::RandomForest,
        }
    }

    /// Key under which results and models are stored, e.g. `AC_vs_Other_GB`
    pub fn key(&self) -> String {
        format!("{}_{}", self.label_name(), self.classifier_kind().suffix())
    }

    /// Whether this outcome counts as a success for the deployment classifier
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            OutcomeTarget::Ipo | OutcomeTarget::FundingRound | OutcomeTarget::Acquisition
        )
    }

    /// Resolve a raw outcome code to its target
    pub fn from_code(code: &str) -> Option<OutcomeTarget> {
        Self::ALL
            .into_iter()
            .find(|target| target.codes().contains(&code))
    }
}

/// Key of the deployment classifier in reports
pub const SUCCESS_KEY: &str = "Success_vs_Other_RF";

/// Label reported for a positive deployment prediction
pub const SUCCESS_LABEL: &str = "Funding Round/Acquisition/IPO";

/// Label reported for a negative deployment prediction
pub const FAILURE_LABEL: &str = "Closed/No Event";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorical_columns_are_not_excluded() {
        for col in CATEGORICAL_COLUMNS {
            assert!(!is_excluded(col), "{} must stay a feature", col);
        }
    }

    #[test]
    fn test_name_is_searchable_but_not_a_feature() {
        assert!(is_excluded(NAME_COLUMN));
        assert!(!SEARCH_EXCLUDED.contains(&NAME_COLUMN));
    }

    #[test]
    fn test_target_keys() {
        assert_eq!(OutcomeTarget::Ipo.key(), "IPO_vs_Other_RF");
        assert_eq!(OutcomeTarget::Acquisition.key(), "AC_vs_Other_GB");
    }

    #[test]
    fn test_from_code_accepts_both_ipo_spellings() {
        assert_eq!(OutcomeTarget::from_code("IP"), Some(OutcomeTarget::Ipo));
        assert_eq!(OutcomeTarget::from_code("IPO"), Some(OutcomeTarget::Ipo));
        assert_eq!(OutcomeTarget::from_code("XX"), None);
    }
}
