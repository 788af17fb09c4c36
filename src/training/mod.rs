//! Model training module
//!
//! Tree ensembles for the per-outcome binary classifiers:
//! - CART decision trees (Gini for classification, MSE for boosting residuals)
//! - Random forest with bootstrap and per-split feature sampling
//! - Log-loss gradient boosting
//! - Stratified K-fold cross-validation with precision/recall scoring
//! - The classifier bank that trains and scores every target

pub mod bank;
pub mod classifier;
pub mod config;
pub mod cross_validation;
pub mod decision_tree;
pub mod gradient_boosting;
pub mod metrics;
pub mod random_forest;

pub use bank::{ClassifierBank, TargetModels, TargetResult, TrainedBank, TrainingReport};
pub use classifier::BinaryClassifier;
pub use config::{ForestConfig, TrainingConfig};
pub use cross_validation::{CVResults, CVSplit, CVStrategy, CrossValidator};
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use gradient_boosting::{GradientBoostingClassifier, GradientBoostingConfig};
pub use metrics::{precision_score, recall_score, ConfusionCounts};
pub use random_forest::{MaxFeatures, RandomForest};
