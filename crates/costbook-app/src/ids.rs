// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

macro_rules! sequence_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

sequence_id!(RequestId);
sequence_id!(SubscriptionId);

/// Hands out strictly increasing request ids and remembers the newest one
/// that is still allowed to land.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSequence {
    issued: u64,
    latest: Option<RequestId>,
}

impl RequestSequence {
    pub fn issue(&mut self) -> RequestId {
        self.issued = self.issued.saturating_add(1);
        let id = RequestId::new(self.issued);
        self.latest = Some(id);
        id
    }

    pub fn latest(&self) -> Option<RequestId> {
        self.latest
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        self.latest == Some(id)
    }

    /// Drops the outstanding request so any answer to it is treated as stale.
    pub fn invalidate(&mut self) {
        self.latest = None;
    }
}
