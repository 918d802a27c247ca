// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use time::Date;

use crate::{
    ChildId, DoctorId, DoctorPosition, MotherId, StaffId, StaffRole, VaccineCategory, VaccineId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Doctor,
    Staff,
    Child,
    Mother,
    Vaccine,
    Medicine,
    Vaccination,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorFormInput {
    pub name: String,
    pub registration_number: String,
    pub position: DoctorPosition,
    pub contact: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffFormInput {
    pub profile_image_ref: String,
    pub name: String,
    pub contact: String,
    pub address: String,
    pub role: StaffRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildFormInput {
    pub name: String,
    pub mother_name: String,
    pub contact: String,
    pub address: String,
    pub age_months: i32,
    pub vaccine_status: String,
    pub doctor_id: DoctorId,
    pub staff_id: StaffId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotherFormInput {
    pub name: String,
    pub age: i32,
    pub address: String,
    pub contact: String,
    pub gravidity: i32,
    pub register_date: Option<Date>,
    pub delivery_date: Option<Date>,
    pub clinic_date: Option<Date>,
    pub doctor_id: DoctorId,
    pub staff_id: StaffId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaccineFormInput {
    pub name: String,
    pub batch_number: String,
    pub brand: String,
    pub category: VaccineCategory,
    pub quantity: i64,
    pub date: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicineFormInput {
    pub name: String,
    pub batch_number: String,
    pub brand: String,
    pub quantity: i64,
    pub date: Option<Date>,
}

/// Draft for the vaccination overlay. The mode flag decides which target
/// picker applies; flipping it is unguarded, so both target ids are kept and
/// only the one matching the mode is consulted on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaccinationFormInput {
    pub mode: VaccineCategory,
    pub child_id: Option<ChildId>,
    pub mother_id: Option<MotherId>,
    pub vaccine_id: Option<VaccineId>,
    pub date: Option<Date>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPayload {
    Doctor(DoctorFormInput),
    Staff(StaffFormInput),
    Child(ChildFormInput),
    Mother(MotherFormInput),
    Vaccine(VaccineFormInput),
    Medicine(MedicineFormInput),
    Vaccination(VaccinationFormInput),
}

impl FormPayload {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::Doctor(_) => FormKind::Doctor,
            Self::Staff(_) => FormKind::Staff,
            Self::Child(_) => FormKind::Child,
            Self::Mother(_) => FormKind::Mother,
            Self::Vaccine(_) => FormKind::Vaccine,
            Self::Medicine(_) => FormKind::Medicine,
            Self::Vaccination(_) => FormKind::Vaccination,
        }
    }

    pub fn blank_for(kind: FormKind) -> Self {
        match kind {
            FormKind::Doctor => Self::Doctor(DoctorFormInput {
                name: String::new(),
                registration_number: String::new(),
                position: DoctorPosition::GeneralPhysician,
                contact: String::new(),
                email: String::new(),
            }),
            FormKind::Staff => Self::Staff(StaffFormInput {
                profile_image_ref: String::new(),
                name: String::new(),
                contact: String::new(),
                address: String::new(),
                role: StaffRole::Nurse,
            }),
            FormKind::Child => Self::Child(ChildFormInput {
                name: String::new(),
                mother_name: String::new(),
                contact: String::new(),
                address: String::new(),
                age_months: 0,
                vaccine_status: String::new(),
                doctor_id: DoctorId::new(0),
                staff_id: StaffId::new(0),
            }),
            FormKind::Mother => Self::Mother(MotherFormInput {
                name: String::new(),
                age: 0,
                address: String::new(),
                contact: String::new(),
                gravidity: 1,
                register_date: None,
                delivery_date: None,
                clinic_date: None,
                doctor_id: DoctorId::new(0),
                staff_id: StaffId::new(0),
            }),
            FormKind::Vaccine => Self::Vaccine(VaccineFormInput {
                name: String::new(),
                batch_number: String::new(),
                brand: String::new(),
                category: VaccineCategory::Child,
                quantity: 0,
                date: None,
            }),
            FormKind::Medicine => Self::Medicine(MedicineFormInput {
                name: String::new(),
                batch_number: String::new(),
                brand: String::new(),
                quantity: 0,
                date: None,
            }),
            FormKind::Vaccination => Self::Vaccination(VaccinationFormInput {
                mode: VaccineCategory::Child,
                child_id: None,
                mother_id: None,
                vaccine_id: None,
                date: None,
                notes: String::new(),
            }),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Doctor(doctor) => doctor.validate(),
            Self::Staff(staff) => staff.validate(),
            Self::Child(child) => child.validate(),
            Self::Mother(mother) => mother.validate(),
            Self::Vaccine(vaccine) => vaccine.validate(),
            Self::Medicine(medicine) => medicine.validate(),
            Self::Vaccination(vaccination) => vaccination.validate(),
        }
    }
}

impl DoctorFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("doctor name is required -- enter a name and retry");
        }
        if self.registration_number.trim().is_empty() {
            bail!("doctor registration number is required -- enter it and retry");
        }
        if self.contact.trim().is_empty() {
            bail!("doctor contact is required -- enter a contact number and retry");
        }
        if self.email.trim().is_empty() {
            bail!("doctor email is required -- enter an email and retry");
        }
        Ok(())
    }
}

impl StaffFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("staff name is required -- enter a name and retry");
        }
        if self.contact.trim().is_empty() {
            bail!("staff contact is required -- enter a contact number and retry");
        }
        Ok(())
    }
}

impl ChildFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("child name is required -- enter a name and retry");
        }
        if self.mother_name.trim().is_empty() {
            bail!("guardian name is required -- enter a name and retry");
        }
        if self.age_months < 0 {
            bail!("child age cannot be negative");
        }
        if self.doctor_id.get() <= 0 {
            bail!("assigned doctor is required -- choose a doctor and retry");
        }
        if self.staff_id.get() <= 0 {
            bail!("assigned staff member is required -- choose one and retry");
        }
        Ok(())
    }
}

impl MotherFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("mother name is required -- enter a name and retry");
        }
        if self.age <= 0 {
            bail!("mother age must be positive");
        }
        if self.gravidity <= 0 {
            bail!("gravidity must be at least 1");
        }
        if self.register_date.is_none() {
            bail!("register date is required -- enter a date and retry");
        }
        if self.doctor_id.get() <= 0 {
            bail!("assigned doctor is required -- choose a doctor and retry");
        }
        if self.staff_id.get() <= 0 {
            bail!("assigned staff member is required -- choose one and retry");
        }
        Ok(())
    }
}

impl VaccineFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("vaccine name is required -- enter a name and retry");
        }
        if self.batch_number.trim().is_empty() {
            bail!("vaccine batch number is required -- enter it and retry");
        }
        if self.quantity < 0 {
            bail!("vaccine quantity cannot be negative");
        }
        if self.date.is_none() {
            bail!("vaccine expiry date is required -- enter a date and retry");
        }
        Ok(())
    }
}

impl MedicineFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("medicine name is required -- enter a name and retry");
        }
        if self.batch_number.trim().is_empty() {
            bail!("medicine batch number is required -- enter it and retry");
        }
        if self.quantity < 0 {
            bail!("medicine quantity cannot be negative");
        }
        if self.date.is_none() {
            bail!("medicine expiry date is required -- enter a date and retry");
        }
        Ok(())
    }
}

impl VaccinationFormInput {
    pub fn validate(&self) -> Result<()> {
        match self.mode {
            VaccineCategory::Child if self.child_id.is_none() => {
                bail!("select a child before recording the vaccination");
            }
            VaccineCategory::Mother if self.mother_id.is_none() => {
                bail!("select a mother before recording the vaccination");
            }
            _ => {}
        }
        if self.vaccine_id.is_none() {
            bail!("select a vaccine before recording the vaccination");
        }
        if self.date.is_none() {
            bail!("vaccination date is required -- enter a date and retry");
        }
        if self.notes.trim().is_empty() {
            bail!("vaccination notes are required -- enter a reason and retry");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ChildFormInput, DoctorFormInput, FormKind, FormPayload, VaccinationFormInput,
        VaccineFormInput,
    };
    use crate::{ChildId, DoctorId, MotherId, StaffId, VaccineCategory, VaccineId};
    use time::{Date, Month};

    #[test]
    fn blank_payload_matches_requested_kind() {
        for kind in [
            FormKind::Doctor,
            FormKind::Staff,
            FormKind::Child,
            FormKind::Mother,
            FormKind::Vaccine,
            FormKind::Medicine,
            FormKind::Vaccination,
        ] {
            assert_eq!(FormPayload::blank_for(kind).kind(), kind);
        }
    }

    #[test]
    fn doctor_validation_rejects_empty_name() {
        let payload = FormPayload::Doctor(DoctorFormInput {
            name: String::new(),
            registration_number: "SLMC-100".to_owned(),
            position: crate::DoctorPosition::Pediatrician,
            contact: "071 234 5678".to_owned(),
            email: "doc@clinic.test".to_owned(),
        });
        assert!(payload.validate().is_err());
    }

    #[test]
    fn child_validation_requires_assigned_doctor() {
        let payload = FormPayload::Child(ChildFormInput {
            name: "Alex Smith".to_owned(),
            mother_name: "John Smith".to_owned(),
            contact: "071 000 1111".to_owned(),
            address: "12 Lake Rd".to_owned(),
            age_months: 24,
            vaccine_status: "pending".to_owned(),
            doctor_id: DoctorId::new(0),
            staff_id: StaffId::new(1),
        });
        assert!(payload.validate().is_err());
    }

    #[test]
    fn vaccine_validation_rejects_negative_quantity() {
        let payload = FormPayload::Vaccine(VaccineFormInput {
            name: "BCG".to_owned(),
            batch_number: "B-77".to_owned(),
            brand: "SII".to_owned(),
            category: VaccineCategory::Child,
            quantity: -1,
            date: Some(Date::from_calendar_date(2026, Month::December, 31).expect("valid date")),
        });
        assert!(payload.validate().is_err());
    }

    #[test]
    fn vaccination_validation_checks_target_for_active_mode_only() {
        let date = Date::from_calendar_date(2026, Month::March, 20).expect("valid date");
        let mut form = VaccinationFormInput {
            mode: VaccineCategory::Child,
            child_id: None,
            mother_id: Some(MotherId::new(4)),
            vaccine_id: Some(VaccineId::new(2)),
            date: Some(date),
            notes: "routine".to_owned(),
        };
        assert!(form.validate().is_err());

        form.child_id = Some(ChildId::new(1));
        assert!(form.validate().is_ok());

        // The mother picker satisfies mother mode even with no child picked.
        form.child_id = None;
        form.mode = VaccineCategory::Mother;
        assert!(form.validate().is_ok());
    }

    #[test]
    fn vaccination_validation_requires_notes() {
        let date = Date::from_calendar_date(2026, Month::March, 20).expect("valid date");
        let form = VaccinationFormInput {
            mode: VaccineCategory::Child,
            child_id: Some(ChildId::new(1)),
            mother_id: None,
            vaccine_id: Some(VaccineId::new(2)),
            date: Some(date),
            notes: "  ".to_owned(),
        };
        assert!(form.validate().is_err());
    }
}
