// Application layer - Use case interactors

pub mod container;
pub mod convert_interactor;
pub mod preview_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use convert_interactor::{ConvertInteractor, ConvertRequest, ConvertResponse};
pub use preview_interactor::{PreviewInteractor, PreviewRequest};
