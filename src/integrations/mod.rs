//! External service integrations.

pub mod transunion_client {
    pub use crate::transunion_client::*;
}
