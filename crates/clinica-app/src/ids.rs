// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

/// Typed wrapper over the raw i64 key a repository hands out.
pub trait RecordId: Copy + Eq + Ord {
    fn from_i64(value: i64) -> Self;
    fn as_i64(self) -> i64;
}

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl crate::ids::RecordId for $name {
            fn from_i64(value: i64) -> Self {
                Self(value)
            }

            fn as_i64(self) -> i64 {
                self.0
            }
        }
    };
}

entity_id!(DoctorId);
entity_id!(StaffId);
entity_id!(ChildId);
entity_id!(MotherId);
entity_id!(VaccineId);
entity_id!(MedicineId);
entity_id!(VaccinationRecordId);
