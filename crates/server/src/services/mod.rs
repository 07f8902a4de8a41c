//! Business logic that spans more than one repository.

pub mod checkout;
pub mod wizard;

pub use checkout::{CheckoutError, CheckoutService};
pub use wizard::{WizardRegistry, WizardService};
