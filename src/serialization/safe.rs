//! Safe serializer.
//!
//! Turns any serializable value into a string for a log line. Errors become
//! the [`SERIALIZATION_ERROR`] sentinel: strings come back unchanged, `Pii`
//! comes back as its raw value, everything else is serialized to JSON with a
//! depth limit of 2 and self-references omitted. Exception records are pruned
//! of their method-site module first.

use std::error::Error;

use serde::Serialize;
use serde_json::Value;

use crate::error::SerializeError;
use crate::serialization::engine::{deserialize, serialize_with, to_tree};
use crate::serialization::exception::{ExceptionRecord, METHOD_SITE_TYPE_NAME, MODULE_FIELD};
use crate::serialization::probe::{classify, RootKind};
use crate::serialization::settings::SerializerSettings;

/// Returned when serialization fails.
pub const SERIALIZATION_ERROR: &str = "Serialization Error";

/// Serialize `value` for logging. `Pii` values are output unscrambled.
///
/// Self-references are omitted for these shapes:
/// - a `RefCell<Option<Rc<T>>>` or `Mutex<Option<Arc<T>>>` field pointing back
///   at its own node
/// - `Rc<RefCell<T>>` nodes linked through `Option<Rc<RefCell<T>>>` fields
///
/// `Arc<Mutex<T>>` nodes linked through `Option<Arc<Mutex<T>>>` fields are
/// not supported: `Mutex`'s own `Serialize` impl takes the lock a second time
/// before the repeated member is reached, and the call deadlocks.
pub fn serialize<T: ?Sized + Serialize>(value: &T) -> String {
    let is_exception = match classify(value) {
        RootKind::Text(text) | RootKind::Pii(text) => return text,
        RootKind::Exception => true,
        RootKind::Null | RootKind::Other => false,
    };

    let mut settings = SerializerSettings::default();

    let result = if is_exception {
        match remove_unwanted_exception_fields(value, &mut settings) {
            Ok(pruned) => serialize_with(&pruned, &settings),
            Err(e) => {
                log::debug!("EXCEPTION_PRUNE_FAILED error={}", e);
                serialize_with(value, &settings)
            }
        }
    } else {
        serialize_with(value, &settings)
    };

    result.unwrap_or_else(|e| {
        log::debug!("SERIALIZE_FAILED error={}", e);
        SERIALIZATION_ERROR.to_string()
    })
}

/// Capture `err` as an [`ExceptionRecord`] and serialize it.
#[track_caller]
pub fn serialize_error<E: Error + ?Sized>(err: &E) -> String {
    serialize(&ExceptionRecord::capture(err))
}

/// Serialize an exception with the method-site module ignored, then parse the
/// text back into a generic tree. The ignore rule stays in `settings` for the
/// final pass and applies wherever a method site appears, including nested
/// and aggregated causes.
fn remove_unwanted_exception_fields<T: ?Sized + Serialize>(
    value: &T,
    settings: &mut SerializerSettings,
) -> Result<Value, SerializeError> {
    settings.ignores.add(METHOD_SITE_TYPE_NAME, MODULE_FIELD);
    let text = serde_json::to_string(&to_tree(value, settings)?)?;
    deserialize(&text)
}
