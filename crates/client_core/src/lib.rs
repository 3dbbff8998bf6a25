//! Client side of the shared-rent allocation tool: keeps the three room
//! valuations consistent with the total rent and drives the submit / progress /
//! results / reset sequence against the allocation server.

pub mod api;
pub mod controller;
pub mod error;
pub mod form;
pub mod reconcile;
pub mod view;

pub use api::{HttpRentApi, RentApi, DEFAULT_REQUEST_TIMEOUT};
pub use controller::{Alerts, FormController, FormOptions, PollOutcome};
pub use error::ClientError;
pub use form::{TextSelection, ValuationForm};
pub use reconcile::{BalanceState, ReconcilePolicy, Remaining};
pub use view::{AssignmentCard, ProgressView, ResultsView};

