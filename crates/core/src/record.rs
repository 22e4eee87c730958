//! Record capability for prism.
//!
//! A record is an opaque entity owned by a base collection. Views only need to
//! ask it three things: its transient instance id, the value of a named
//! property, and (through `Rc::ptr_eq`) whether two handles are the same record.

use crate::value::Value;
use core::sync::atomic::{AtomicU64, Ordering};

/// Transient, process-unique instance id of a record.
pub type Cid = u64;

/// Global cid counter.
static NEXT_CID: AtomicU64 = AtomicU64::new(1);

/// Allocates the next unique cid.
pub fn next_cid() -> Cid {
    NEXT_CID.fetch_add(1, Ordering::SeqCst)
}

/// The capability every record type must provide.
///
/// `field` is direct field access. `get` is the accessor; records with
/// derived or computed properties override it, everything else inherits the
/// plain field read.
pub trait Record {
    /// Returns the record's transient instance id.
    fn cid(&self) -> Cid;

    /// Reads a stored field.
    fn field(&self, name: &str) -> Option<Value>;

    /// Reads a property through the record's accessor.
    fn get(&self, name: &str) -> Option<Value> {
        self.field(name)
    }
}

/// Reads a property from any record, preferring the accessor.
#[inline]
pub fn read_property<M: Record + ?Sized>(record: &M, name: &str) -> Option<Value> {
    record.get(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain {
        cid: Cid,
        id: i64,
    }

    impl Record for Plain {
        fn cid(&self) -> Cid {
            self.cid
        }

        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "id" => Some(Value::Int64(self.id)),
                _ => None,
            }
        }
    }

    struct Computed(Plain);

    impl Record for Computed {
        fn cid(&self) -> Cid {
            self.0.cid
        }

        fn field(&self, name: &str) -> Option<Value> {
            self.0.field(name)
        }

        fn get(&self, name: &str) -> Option<Value> {
            match name {
                "double" => Some(Value::Int64(self.0.id * 2)),
                other => self.field(other),
            }
        }
    }

    #[test]
    fn test_next_cid_unique() {
        let a = next_cid();
        let b = next_cid();
        assert!(b > a);
    }

    #[test]
    fn test_read_property_falls_back_to_field() {
        let plain = Plain { cid: next_cid(), id: 4 };
        assert_eq!(read_property(&plain, "id"), Some(Value::Int64(4)));
        assert_eq!(read_property(&plain, "double"), None);
    }

    #[test]
    fn test_read_property_prefers_accessor() {
        let computed = Computed(Plain { cid: next_cid(), id: 4 });
        assert_eq!(read_property(&computed, "double"), Some(Value::Int64(8)));
        assert_eq!(read_property(&computed, "id"), Some(Value::Int64(4)));
        assert_eq!(computed.field("double"), None);
    }
}
