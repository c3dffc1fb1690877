#![forbid(unsafe_code)]

pub mod component;
pub mod confirmation_service;
pub mod dispatcher;
pub mod error;
pub mod view;

pub use confirm_core::Clock;

pub use component::{CompletionConfirmation, ContentData, ContentMetadata};
pub use confirmation_service::ConfirmationService;
pub use dispatcher::EventDispatcher;
pub use error::ConfirmationServiceError;
pub use view::{Container, ContainerView, HtmlContainer, PlainTitle, TitleFormatter};
