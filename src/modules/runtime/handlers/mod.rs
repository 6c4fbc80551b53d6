//! HTTP request handlers for the Trellis middleware
//!
//! This module contains the GraphQL request handler, the final dispatch
//! between it and the explorer page, and the health probe.

mod dispatch;
mod graphql;
mod health;
mod playground;

pub use dispatch::{dispatch, DispatchState};
pub use graphql::{GraphQLHandler, OptionsFuture, OptionsSource};
pub use health::{health_check, health_check_fn, HealthCheckFn, HealthState};
pub use playground::{render_playground_page, PlaygroundRenderOptions};
