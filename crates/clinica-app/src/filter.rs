// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Child, Doctor, Medicine, Mother, Staff, Vaccine};

/// The designated free-text match fields for a screen's record type. Fixed per
/// entity, never configurable at the call site.
pub trait Searchable {
    fn search_fields(&self) -> [&str; 2];
}

impl Searchable for Doctor {
    fn search_fields(&self) -> [&str; 2] {
        [&self.name, &self.contact]
    }
}

impl Searchable for Staff {
    fn search_fields(&self) -> [&str; 2] {
        [&self.name, self.role.label()]
    }
}

impl Searchable for Child {
    fn search_fields(&self) -> [&str; 2] {
        [&self.name, &self.mother_name]
    }
}

impl Searchable for Mother {
    fn search_fields(&self) -> [&str; 2] {
        [&self.name, &self.contact]
    }
}

impl Searchable for Vaccine {
    fn search_fields(&self) -> [&str; 2] {
        [&self.name, &self.batch_number]
    }
}

impl Searchable for Medicine {
    fn search_fields(&self) -> [&str; 2] {
        [&self.name, &self.batch_number]
    }
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Order-preserving subsequence of `records` where at least one designated
/// field contains `query` case-insensitively. An empty query matches
/// everything. Pure; recomputed on every keystroke with no memoization.
pub fn filter_records<'a, T: Searchable>(records: &'a [T], query: &str) -> Vec<&'a T> {
    if query.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|record| {
            record
                .search_fields()
                .iter()
                .any(|field| contains_ignore_case(field, query))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Searchable, contains_ignore_case, filter_records};
    use crate::{Staff, StaffId, StaffRole};

    fn staff(id: i64, name: &str, role: StaffRole) -> Staff {
        Staff {
            id: StaffId::new(id),
            profile_image_ref: String::new(),
            name: name.to_owned(),
            contact: String::new(),
            address: String::new(),
            role,
        }
    }

    #[test]
    fn empty_query_is_the_identity() {
        let records = vec![
            staff(1, "Jane Cooper", StaffRole::Nurse),
            staff(2, "Robert Fox", StaffRole::Receptionist),
            staff(3, "Emily Wilson", StaffRole::LabTechnician),
        ];

        let filtered = filter_records(&records, "");
        let expected: Vec<&Staff> = records.iter().collect();
        assert_eq!(filtered, expected);
    }

    #[test]
    fn matches_are_case_insensitive_substrings() {
        let records = vec![
            staff(1, "Jane Smith", StaffRole::Nurse),
            staff(2, "Robert Fox", StaffRole::Receptionist),
        ];

        let filtered = filter_records(&records, "smith");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Jane Smith");
    }

    #[test]
    fn every_match_contains_the_query_and_every_miss_does_not() {
        let records = vec![
            staff(1, "Jane Cooper", StaffRole::Nurse),
            staff(2, "Robert Fox", StaffRole::Nurse),
            staff(3, "Nora Nair", StaffRole::Pharmacist),
        ];

        let query = "nurse";
        let filtered = filter_records(&records, query);
        for record in &filtered {
            assert!(
                record
                    .search_fields()
                    .iter()
                    .any(|field| contains_ignore_case(field, query))
            );
        }
        for record in &records {
            if !filtered.iter().any(|found| found.id == record.id) {
                assert!(
                    !record
                        .search_fields()
                        .iter()
                        .any(|field| contains_ignore_case(field, query))
                );
            }
        }
    }

    #[test]
    fn filtering_preserves_insertion_order() {
        let records = vec![
            staff(3, "Ann Reed", StaffRole::Nurse),
            staff(1, "Ann Price", StaffRole::Nurse),
            staff(2, "Bea Ward", StaffRole::Nurse),
        ];

        let filtered = filter_records(&records, "ann");
        let names: Vec<&str> = filtered.iter().map(|record| record.name.as_str()).collect();
        assert_eq!(names, vec!["Ann Reed", "Ann Price"]);
    }

    #[test]
    fn repeated_calls_are_idempotent() {
        let records = vec![staff(1, "Jane Cooper", StaffRole::Nurse)];
        assert_eq!(
            filter_records(&records, "coop"),
            filter_records(&records, "coop")
        );
    }
}
