// Demo host application: a contact book served through the AJAX views.

pub mod form;
pub mod model;
pub mod routes;
pub mod store;
pub mod views;

pub use form::ContactForm;
pub use model::{Contact, ContactInput};
pub use routes::routes;
pub use store::ContactStore;
pub use views::{ContactCreateView, ContactDeleteView, ContactUpdateView};
