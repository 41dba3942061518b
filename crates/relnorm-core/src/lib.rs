//! Normal form decomposition stages and the pipeline that chains them.

pub mod dedupe;
pub mod error;
pub mod fifth;
pub mod first;
pub mod fourth;
mod join;
pub mod normalize;
pub mod pipeline;
pub mod second;
pub mod source;
mod split;
pub mod third;

pub use dedupe::dedupe_relations;
pub use error::{NormalizeError, Result};
pub use fifth::{DEFAULT_JOIN_SEARCH_LIMIT, to_5nf, to_5nf_with_limit};
pub use first::to_1nf;
pub use fourth::to_4nf;
pub use normalize::Normalize;
pub use pipeline::{
    BoyceCoddStep, FifthNormalFormStep, FirstNormalFormStep, FourthNormalFormStep,
    NormalizationOutcome, NormalizationPipeline, NormalizationStep, PipelineOptions,
    SecondNormalFormStep, StageReport, ThirdNormalFormStep, build_pipeline, step_for,
};
pub use second::to_2nf;
pub use source::{DependencySource, NoAdditionalInput};
pub use third::{to_3nf, to_bcnf};
