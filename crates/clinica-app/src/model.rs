// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::Date;

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoctorPosition {
    GeneralPhysician,
    Pediatrician,
    Cardiologist,
    Dermatologist,
    Neurologist,
}

impl DoctorPosition {
    pub const ALL: [Self; 5] = [
        Self::GeneralPhysician,
        Self::Pediatrician,
        Self::Cardiologist,
        Self::Dermatologist,
        Self::Neurologist,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GeneralPhysician => "general_physician",
            Self::Pediatrician => "pediatrician",
            Self::Cardiologist => "cardiologist",
            Self::Dermatologist => "dermatologist",
            Self::Neurologist => "neurologist",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "general_physician" => Some(Self::GeneralPhysician),
            "pediatrician" => Some(Self::Pediatrician),
            "cardiologist" => Some(Self::Cardiologist),
            "dermatologist" => Some(Self::Dermatologist),
            "neurologist" => Some(Self::Neurologist),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::GeneralPhysician => "General Physician",
            Self::Pediatrician => "Pediatrician",
            Self::Cardiologist => "Cardiologist",
            Self::Dermatologist => "Dermatologist",
            Self::Neurologist => "Neurologist",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaffRole {
    Nurse,
    Receptionist,
    LabTechnician,
    Pharmacist,
}

impl StaffRole {
    pub const ALL: [Self; 4] = [
        Self::Nurse,
        Self::Receptionist,
        Self::LabTechnician,
        Self::Pharmacist,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nurse => "nurse",
            Self::Receptionist => "receptionist",
            Self::LabTechnician => "lab_technician",
            Self::Pharmacist => "pharmacist",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "nurse" => Some(Self::Nurse),
            "receptionist" => Some(Self::Receptionist),
            "lab_technician" => Some(Self::LabTechnician),
            "pharmacist" => Some(Self::Pharmacist),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Nurse => "Nurse",
            Self::Receptionist => "Receptionist",
            Self::LabTechnician => "Lab Technician",
            Self::Pharmacist => "Pharmacist",
        }
    }
}

/// Whether a vaccine is administered to registered children or to pregnant
/// mothers. The vaccination overlay filters its vaccine picker on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaccineCategory {
    Child,
    Mother,
}

impl VaccineCategory {
    pub const ALL: [Self; 2] = [Self::Child, Self::Mother];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Child => "child",
            Self::Mother => "mother",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "child" => Some(Self::Child),
            "mother" => Some(Self::Mother),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Child => "Child",
            Self::Mother => "Mother",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabKind {
    Dashboard,
    Doctors,
    Staff,
    Children,
    Mothers,
    Vaccines,
    Medicine,
}

impl TabKind {
    pub const ALL: [Self; 7] = [
        Self::Dashboard,
        Self::Doctors,
        Self::Staff,
        Self::Children,
        Self::Mothers,
        Self::Vaccines,
        Self::Medicine,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Doctors => "doctors",
            Self::Staff => "staff",
            Self::Children => "children",
            Self::Mothers => "mothers",
            Self::Vaccines => "vaccines",
            Self::Medicine => "medicine",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub name: String,
    pub registration_number: String,
    pub position: DoctorPosition,
    pub contact: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub profile_image_ref: String,
    pub name: String,
    pub contact: String,
    pub address: String,
    pub role: StaffRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub id: ChildId,
    pub name: String,
    pub mother_name: String,
    pub contact: String,
    pub address: String,
    pub age_months: i32,
    pub vaccine_status: String,
    pub doctor_id: DoctorId,
    pub staff_id: StaffId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mother {
    pub id: MotherId,
    pub name: String,
    pub age: i32,
    pub address: String,
    pub contact: String,
    pub gravidity: i32,
    pub register_date: Date,
    pub delivery_date: Option<Date>,
    pub clinic_date: Option<Date>,
    pub doctor_id: DoctorId,
    pub staff_id: StaffId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vaccine {
    pub id: VaccineId,
    pub name: String,
    pub batch_number: String,
    pub brand: String,
    pub category: VaccineCategory,
    pub quantity: i64,
    pub date: Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medicine {
    pub id: MedicineId,
    pub name: String,
    pub batch_number: String,
    pub brand: String,
    pub quantity: i64,
    pub date: Date,
}

/// Who received a dose. Children and mothers live in separate collections, so
/// the record keeps the discriminant rather than a bare foreign id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaccinationTarget {
    Child(ChildId),
    Mother(MotherId),
}

impl VaccinationTarget {
    pub const fn category(self) -> VaccineCategory {
        match self {
            Self::Child(_) => VaccineCategory::Child,
            Self::Mother(_) => VaccineCategory::Mother,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccinationRecord {
    pub id: VaccinationRecordId,
    pub target: VaccinationTarget,
    pub vaccine_id: VaccineId,
    pub date: Date,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DashboardCounts {
    pub doctors: usize,
    pub staff: usize,
    pub children: usize,
    pub mothers: usize,
    pub vaccines_available: usize,
    pub medicine_units: i64,
}

#[cfg(test)]
mod tests {
    use super::{DoctorPosition, StaffRole, VaccineCategory};

    #[test]
    fn doctor_position_round_trips_through_storage_form() {
        for position in DoctorPosition::ALL {
            assert_eq!(DoctorPosition::parse(position.as_str()), Some(position));
        }
        assert_eq!(DoctorPosition::parse("surgeon"), None);
    }

    #[test]
    fn staff_role_round_trips_through_storage_form() {
        for role in StaffRole::ALL {
            assert_eq!(StaffRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(StaffRole::parse("janitor"), None);
    }

    #[test]
    fn vaccine_category_parse_rejects_unknown() {
        assert_eq!(VaccineCategory::parse("child"), Some(VaccineCategory::Child));
        assert_eq!(
            VaccineCategory::parse("mother"),
            Some(VaccineCategory::Mother)
        );
        assert_eq!(VaccineCategory::parse("adult"), None);
    }
}
