//! # Paykun Checkout
//!
//! Builds encrypted checkout requests for the Paykun hosted payment gateway.
//!
//! The crate does not talk to the gateway. It validates a merchant's order, customer,
//! shipping and billing details, turns them into the gateway's canonical
//! `key::value;...` string, encrypts it with the merchant key, and hands back the
//! fields of an auto-submitting HTML form. Posting that form is up to the browser.
//!
//! ## Modules
//!
//! - [`builder`]: [`OrderBuilder`](builder::OrderBuilder), the staged request builder.
//! - [`canonical`]: Filtering, ordering and joining of request fields.
//! - [`crypto`]: The AES-256-CBC envelope the gateway decrypts.
//! - [`form`]: [`FormPayload`](form::FormPayload) and the renderer seam.
//! - [`validation`]: Input format checks and the [`Validator`](validation::Validator) trait.
//! - [`types`]: Credentials, order, customer and address types.
//! - [`errors`]: Error types and the numeric [`ErrorCode`](errors::ErrorCode) registry.
//!
//! ## Flow
//!
//! 1. **Construct**: validate merchant credentials.
//! 2. **Stage**: set the order, customer, shipping and billing details, in any order.
//! 3. **Submit**: canonicalize, encrypt and wrap the request in a
//!    [`FormPayload`](form::FormPayload).
//! 4. **Render**: post the payload's fields to its `gateway_url`, with your own
//!    template or a [`FormRenderer`](form::FormRenderer).
//!
//! ## Logging
//!
//! With the default `tracing` feature, stage completion, rejected inputs and
//! submissions are emitted as `tracing` events. Credentials and payload contents
//! are never logged.

pub mod builder;
pub mod canonical;
pub mod crypto;
pub mod errors;
pub mod form;
pub mod types;
pub mod validation;
