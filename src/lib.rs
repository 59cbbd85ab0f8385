pub mod app;
pub mod config;
pub mod contacts;
pub mod error;
pub mod forms;
pub mod request;
pub mod response;
pub mod views;

pub use error::ViewError;
pub use forms::{ErrorList, FieldErrors, Form};
pub use request::{AjaxRequest, QueryDict};
pub use response::AjaxResponse;
pub use views::{AjaxDeleteView, AjaxFormView, DeleteHost, DeleteOutcome, FormHost, ObjectLookup};

#[cfg(test)]
pub mod testing;
