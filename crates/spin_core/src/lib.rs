pub mod error;
pub mod logging;
pub mod models;
pub mod speech;
pub mod types;

pub use error::{Error, ErrorKind};
pub use models::{CompletionModel, CompletionRequest, RequestPurpose};
pub use speech::{DeviceEvent, SpeechDevice, Utterance, UtteranceToken, Voice};
pub use types::*;

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::{AnalysisInput, AnalysisResult, Error, Headline, HeadlineSet, Result};
    pub use crate::{CompletionModel, SpeechDevice};
}
