#![forbid(unsafe_code)]

//! HTTP fetch seam for cachalot.
//!
//! The [`Net`] trait is the only surface the worker crates depend on. The
//! concrete [`HttpClient`] is a thin `reqwest` wrapper.
//!
//! One contract worth spelling out: a non-2xx response is **not** an error
//! here. `Net::get` materializes whatever HTTP response the server produced;
//! [`NetError`] is reserved for transport failures and timeouts. Callers that
//! need "successful or bust" semantics check [`HttpResponse::is_success`].

mod client;
mod error;
mod traits;
mod types;

pub use crate::{
    client::HttpClient,
    error::{NetError, NetResult},
    traits::Net,
    types::{Freshness, HttpResponse, NetOptions},
};
