//! Callback dispatch: routes opaque button payloads to registered handlers.

pub mod builtin;
pub mod handler;
pub mod registry;

pub use builtin::{
    BACK_PREFIX, MENU_PREFIX, RESET_PREFIX, menu_payload, register_default_handlers,
};
pub use handler::{BoxCallbackHandler, CallbackContext, CallbackHandler, handler_fn};
pub use registry::{
    CallbackRegistry, CallbackRegistryBuilder, DispatchOutcome, GENERIC_ERROR_NOTICE,
    NOT_IMPLEMENTED_NOTICE,
};
