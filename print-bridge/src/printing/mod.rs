//! Kitchen print engine
//!
//! Order in, tickets out:
//! 1. [`zone`] resolves the table to a floor zone (drink routing, packet number)
//! 2. [`router`] groups order items into station buckets
//! 3. [`resolver`] finds a reachable address for each station printer
//! 4. [`composer`] lays out and encodes the ticket
//! 5. [`dispatcher`] transmits per station, FIFO within a station and
//!    concurrently across stations

pub mod composer;
pub mod dispatcher;
pub mod error;
pub mod link;
pub mod queue;
pub mod resolver;
pub mod router;
pub mod types;
pub mod zone;

pub use composer::{TicketComposer, code_page_for, encode_escpos, encode_image};
pub use dispatcher::{DispatchState, JobPlan, PrintDispatcher, RetryPolicy, plan_job};
pub use error::{DispatchError, InvalidTransition};
pub use link::{LocalLink, PrinterLink};
pub use queue::StationQueues;
pub use resolver::{PrinterAddressResolver, ResolvedAddress};
pub use router::{StationRouting, route};
pub use types::*;
pub use zone::{ZoneAssignment, ZoneContext};
