pub mod classifier;
pub mod config;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod testing;
pub mod types;

pub use classifier::{Classifier, HostedClassifier, LabelPolicy, LocalProcessClassifier};
pub use config::{AppConfig, ClassifierBackend};
pub use error::{ErrorKind, PipelineError};
pub use extract::{extract, ExtractError};
pub use pipeline::{CommentSource, Pipeline, PostSearch, Stage};
pub use types::*;
