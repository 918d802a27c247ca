// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use clinica_app::{
    Child, ChildId, Doctor, DoctorId, Medicine, MedicineId, Mother, MotherId, RecordId, Staff,
    StaffId, VaccinationRecord, VaccinationRecordId, Vaccine, VaccineId,
};

/// A flat record addressable by its typed id. Repositories own id assignment;
/// a draft's incoming id is ignored on `add` and preserved on `update`.
pub trait Record: Clone {
    type Id: RecordId;

    fn id(&self) -> Self::Id;
    fn set_id(&mut self, id: Self::Id);
}

macro_rules! record_impl {
    ($entity:ident, $id:ident) => {
        impl Record for $entity {
            type Id = $id;

            fn id(&self) -> Self::Id {
                self.id
            }

            fn set_id(&mut self, id: Self::Id) {
                self.id = id;
            }
        }
    };
}

record_impl!(Doctor, DoctorId);
record_impl!(Staff, StaffId);
record_impl!(Child, ChildId);
record_impl!(Mother, MotherId);
record_impl!(Vaccine, VaccineId);
record_impl!(Medicine, MedicineId);
record_impl!(VaccinationRecord, VaccinationRecordId);

/// The capability every managed screen is written against: list/add/update/
/// remove over one entity collection. Two implementations exist -- the
/// in-memory [`MemoryStore`] here and the HTTP-backed store in
/// `clinica-gateway` -- and the composition root picks one per entity.
pub trait EntityRepository<T: Record> {
    /// Full collection in insertion order. After any write this is the single
    /// source of truth; callers re-fetch rather than merging locally.
    fn list(&mut self) -> Result<Vec<T>>;

    /// Persist a draft and return the stored record with its assigned id.
    fn add(&mut self, draft: T) -> Result<T>;

    /// Replace the record whose id matches, keeping the original id even when
    /// the draft carries a different one. A missing id is a silent no-op.
    fn update(&mut self, id: T::Id, draft: T) -> Result<()>;

    /// Drop the record whose id matches. A missing id is a no-op; any
    /// confirmation prompt is the caller's concern.
    fn remove(&mut self, id: T::Id) -> Result<()>;
}

/// Per-screen in-memory collection. Lives exactly as long as the process; ids
/// come from a counter held apart from the collection so deletions never make
/// a later `add` reuse a surviving id.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryStore<T> {
    records: Vec<T>,
    next_id: i64,
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }

    /// Seed from existing records, continuing id assignment above the highest
    /// id present.
    pub fn with_records(records: Vec<T>) -> Self {
        let next_id = records
            .iter()
            .map(|record| record.id().as_i64())
            .max()
            .unwrap_or(0)
            + 1;
        Self { records, next_id }
    }

    /// Whole-collection replacement; the only bulk mutation the store offers.
    pub fn replace_all(&mut self, records: Vec<T>) {
        let highest = records
            .iter()
            .map(|record| record.id().as_i64())
            .max()
            .unwrap_or(0);
        self.next_id = self.next_id.max(highest + 1);
        self.records = records;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.records.iter().find(|record| record.id() == id)
    }
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> EntityRepository<T> for MemoryStore<T> {
    fn list(&mut self) -> Result<Vec<T>> {
        Ok(self.records.clone())
    }

    fn add(&mut self, mut draft: T) -> Result<T> {
        draft.set_id(T::Id::from_i64(self.next_id));
        self.next_id += 1;
        self.records.push(draft.clone());
        Ok(draft)
    }

    fn update(&mut self, id: T::Id, mut draft: T) -> Result<()> {
        if let Some(existing) = self.records.iter_mut().find(|record| record.id() == id) {
            draft.set_id(id);
            *existing = draft;
        }
        Ok(())
    }

    fn remove(&mut self, id: T::Id) -> Result<()> {
        self.records.retain(|record| record.id() != id);
        Ok(())
    }
}

/// Name-only projection used by foreign-key pickers and table rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupValue<Id> {
    pub id: Id,
    pub name: String,
}

pub fn doctor_lookup(doctors: &[Doctor]) -> Vec<LookupValue<DoctorId>> {
    doctors
        .iter()
        .map(|doctor| LookupValue {
            id: doctor.id,
            name: doctor.name.clone(),
        })
        .collect()
}

pub fn staff_lookup(staff: &[Staff]) -> Vec<LookupValue<StaffId>> {
    staff
        .iter()
        .map(|member| LookupValue {
            id: member.id,
            name: member.name.clone(),
        })
        .collect()
}

/// Label for a foreign id rendered in a table; a dangling reference degrades
/// to "N/A" rather than erroring.
pub fn lookup_name<Id: PartialEq + Copy>(lookup: &[LookupValue<Id>], id: Id) -> String {
    lookup
        .iter()
        .find(|value| value.id == id)
        .map(|value| value.name.clone())
        .unwrap_or_else(|| "N/A".to_owned())
}
