//! The `{ ok, error, ... }` result shape shared by every operation.
//!
//! Business failures travel inside the envelope. Only transport problems (missing
//! app state, guard rejections) become GraphQL errors.

use crate::http_server::graphql::query_builder::Page;
use crate::http_server::graphql_error::INTERNAL_ERROR_MESSAGE;
use crate::services::{ServiceError, ServiceResult};

pub trait Envelope: Default {
    fn failure(error: String) -> Self;
}

/// Message to put in the envelope for a failed service call.
/// Store failures are logged and replaced by a generic message.
pub fn error_message(err: ServiceError) -> String {
    if err.is_internal() {
        log::error!("Service call failed: {:?}", err);
        INTERNAL_ERROR_MESSAGE.to_string()
    } else {
        log::debug!("Request rejected: {}", err);
        err.to_string()
    }
}

pub fn respond<T, E: Envelope>(result: ServiceResult<T>, on_ok: impl FnOnce(T) -> E) -> E {
    match result {
        Ok(value) => on_ok(value),
        Err(err) => E::failure(error_message(err)),
    }
}

/// Clamp a page counter into a GraphQL `Int`.
pub(crate) fn to_int(value: u64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

pub(crate) struct PageMeta {
    pub total_count: i32,
    pub total_page: i32,
    pub current_page: i32,
    pub current_count: i32,
    pub page_size: i32,
}

impl<T> From<&Page<T>> for PageMeta {
    fn from(page: &Page<T>) -> Self {
        Self {
            total_count: to_int(page.total_count),
            total_page: to_int(page.total_page),
            current_page: to_int(page.current_page),
            current_count: to_int(page.current_count),
            page_size: to_int(page.page_size),
        }
    }
}

/// Declare an envelope with `ok`, `error` and the given optional payload fields.
macro_rules! output {
    ($(#[$meta:meta])* $name:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, async_graphql::SimpleObject)]
        pub struct $name {
            pub ok: bool,
            pub error: Option<String>,
            $(pub $field: Option<$ty>,)*
        }

        impl $crate::http_server::graphql::envelope::Envelope for $name {
            fn failure(error: String) -> Self {
                Self {
                    ok: false,
                    error: Some(error),
                    ..Default::default()
                }
            }
        }
    };
}

/// Declare a paginated envelope: `ok`, `error`, page metadata and a list payload.
macro_rules! paginated_output {
    ($(#[$meta:meta])* $name:ident { $field:ident : $ty:ty }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, async_graphql::SimpleObject)]
        pub struct $name {
            pub ok: bool,
            pub error: Option<String>,
            pub total_count: Option<i32>,
            pub total_page: Option<i32>,
            pub current_page: Option<i32>,
            pub current_count: Option<i32>,
            pub page_size: Option<i32>,
            pub $field: Option<Vec<$ty>>,
        }

        impl $crate::http_server::graphql::envelope::Envelope for $name {
            fn failure(error: String) -> Self {
                Self {
                    ok: false,
                    error: Some(error),
                    ..Default::default()
                }
            }
        }

        impl From<$crate::http_server::graphql::query_builder::Page<$ty>> for $name {
            fn from(page: $crate::http_server::graphql::query_builder::Page<$ty>) -> Self {
                let meta = $crate::http_server::graphql::envelope::PageMeta::from(&page);
                Self {
                    ok: true,
                    error: None,
                    total_count: Some(meta.total_count),
                    total_page: Some(meta.total_page),
                    current_page: Some(meta.current_page),
                    current_count: Some(meta.current_count),
                    page_size: Some(meta.page_size),
                    $field: Some(page.items),
                }
            }
        }
    };
}

pub(crate) use output;
pub(crate) use paginated_output;

output!(
    /// Envelope for operations without a payload.
    CoreOutput {}
);

impl CoreOutput {
    pub fn success() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }
}
