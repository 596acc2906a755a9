//! Opaque id newtypes for board entities.
//!
//! [`UnitId`] is a thin `u32` wrapper used as an index into a board's unit
//! list. [`NetCode`] is a signed net identifier where codes `<= 0` mean
//! "not connected". Both are `Copy`, `Hash`, and `Serialize`/`Deserialize`.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident($raw:ty)) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name($raw);

        impl $name {
            /// Creates an ID from its raw value.
            pub const fn from_raw(raw: $raw) -> Self {
                Self(raw)
            }

            /// Returns the raw value.
            pub fn as_raw(self) -> $raw {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a placeable unit on a board.
    UnitId(u32)
);

define_id!(
    /// Net identifier carried by each terminal.
    NetCode(i32)
);

impl UnitId {
    /// Returns the ID as a `usize` index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl NetCode {
    /// The "no net" code.
    pub const UNCONNECTED: NetCode = NetCode(0);

    /// Returns whether this code names a real net (strictly positive).
    pub fn is_connected(self) -> bool {
        self.0 > 0
    }
}

impl Default for NetCode {
    fn default() -> Self {
        Self::UNCONNECTED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn unit_id_roundtrip() {
        let id = UnitId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
        assert_eq!(id.index(), 42);
    }

    #[test]
    fn net_code_connectivity() {
        assert!(NetCode::from_raw(3).is_connected());
        assert!(!NetCode::from_raw(0).is_connected());
        assert!(!NetCode::from_raw(-1).is_connected());
        assert_eq!(NetCode::default(), NetCode::UNCONNECTED);
    }

    #[test]
    fn id_hash_in_set() {
        let mut set = HashSet::new();
        set.insert(UnitId::from_raw(1));
        set.insert(UnitId::from_raw(2));
        set.insert(UnitId::from_raw(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn id_serde_is_transparent() {
        let json = serde_json::to_string(&NetCode::from_raw(-4)).unwrap();
        assert_eq!(json, "-4");
        let restored: UnitId = serde_json::from_str("55").unwrap();
        assert_eq!(restored, UnitId::from_raw(55));
    }

    #[test]
    fn id_display() {
        assert_eq!(format!("{}", UnitId::from_raw(7)), "7");
        assert_eq!(format!("{}", NetCode::from_raw(-2)), "-2");
    }
}
