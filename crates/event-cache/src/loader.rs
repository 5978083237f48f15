//! Loader seam
//!
//! The loader performs remote requests and pushes each parsed payload back
//! into the receiver, instead of returning it. That lets one response fan out
//! to several items (a schedule listing carries many matches) under whatever
//! concurrency model the loader uses.

use crate::dto::Payload;
use crate::error::CacheResult;
use crate::locale::Locale;
use crate::tracker::RequestClass;
use crate::urn::Urn;

/// Accepts payloads produced by a [`Loader`]
pub trait DataReceiver: Send + Sync {
    /// Merge `payload` fetched for `locale`
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Malformed`](crate::CacheError::Malformed) when the
    /// payload fails validation; the receiver's state is left untouched.
    fn merge(&self, payload: Payload, locale: &Locale) -> CacheResult<()>;
}

/// Performs remote requests on behalf of cache items
///
/// Calls are synchronous and may block on I/O. Timeouts and cancellation are
/// the loader's business.
pub trait Loader: Send + Sync {
    /// Request `class` data for `id` in `locale` and push the result into
    /// `receiver`
    ///
    /// `force_refresh` asks the loader to bypass any caching it does itself.
    /// An implementation must not call back into accessors of the item that
    /// issued the request: the item holds the request class lock for the
    /// duration of the call.
    ///
    /// Returning `Ok` without a payload for `locale` having been merged into
    /// `receiver` is treated as [`CacheError::NotFound`](crate::CacheError::NotFound);
    /// the locale stays unloaded.
    ///
    /// # Errors
    ///
    /// [`CacheError::CommunicationFailure`](crate::CacheError::CommunicationFailure)
    /// or [`CacheError::NotFound`](crate::CacheError::NotFound) when nothing
    /// could be delivered for the locale.
    fn request(
        &self,
        class: RequestClass,
        locale: &Locale,
        id: &Urn,
        force_refresh: bool,
        receiver: &dyn DataReceiver,
    ) -> CacheResult<()>;
}
