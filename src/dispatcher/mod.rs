//! # Dispatcher Module
//!
//! Hands matched requests to handler coroutines and collects their responses.
//!
//! Every handler registered with [`Dispatcher::register_handler`] lives in its
//! own `may` coroutine and receives [`HandlerRequest`]s over an mpsc channel.
//! The dispatcher sends the request, runs the middleware chain around it and
//! blocks (cooperatively) on the reply channel.
//!
//! A panicking handler does not take the process down: the panic is caught in
//! the handler coroutine and answered with a 500.

mod core;

pub use core::{
    Dispatcher, HandlerRequest, HandlerResponse, HandlerSender, HeaderVec, MAX_INLINE_HEADERS,
};
