// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Deterministic sample data for demo mode and tests. Generators are pure
//! functions of the index, so repeated runs seed identical collections.

use clinica_app::{
    Child, ChildId, Doctor, DoctorId, DoctorPosition, Medicine, MedicineId, Mother, MotherId,
    Staff, StaffId, StaffRole, Vaccine, VaccineCategory, VaccineId,
};
use time::{Date, Month};

const FIRST_NAMES: [&str; 12] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Robin", "Rowan",
];
const LAST_NAMES: [&str; 12] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Bennett", "Price",
];
const STREET_NAMES: [&str; 8] = [
    "Cedar", "Maple", "Oak", "Pine", "Willow", "Elm", "Lakeview", "Hillcrest",
];
const VACCINE_NAMES: [&str; 6] = ["BCG", "Polio", "Pentavalent", "MMR", "Tetanus", "Rubella"];
const VACCINE_BRANDS: [&str; 4] = ["SII", "BioFarma", "GSK", "Sanofi"];
const MEDICINE_NAMES: [&str; 6] = [
    "Paracetamol",
    "Amoxicillin",
    "Folic Acid",
    "Ibuprofen",
    "Cetirizine",
    "Iron Syrup",
];

fn full_name(index: usize) -> String {
    format!(
        "{} {}",
        FIRST_NAMES[index % FIRST_NAMES.len()],
        LAST_NAMES[(index * 5 + 3) % LAST_NAMES.len()]
    )
}

fn phone(index: usize) -> String {
    format!("071 {:03} {:04}", 200 + index % 700, 1000 + index * 37 % 9000)
}

fn address(index: usize) -> String {
    format!(
        "{} {} Street",
        10 + index * 3 % 90,
        STREET_NAMES[index % STREET_NAMES.len()]
    )
}

fn expiry(index: usize) -> Date {
    let month = Month::try_from(1 + (index % 12) as u8).expect("month in 1..=12");
    Date::from_calendar_date(2027, month, 1 + (index % 28) as u8).expect("valid expiry date")
}

pub fn sample_doctor(index: usize) -> Doctor {
    Doctor {
        id: DoctorId::new(index as i64 + 1),
        name: format!("Dr. {}", full_name(index)),
        registration_number: format!("SLMC-{:05}", 10_000 + index * 7),
        position: DoctorPosition::ALL[index % DoctorPosition::ALL.len()],
        contact: phone(index),
        email: format!("doctor{}@clinic.test", index + 1),
    }
}

pub fn sample_staff(index: usize) -> Staff {
    Staff {
        id: StaffId::new(index as i64 + 1),
        profile_image_ref: format!("profiles/staff-{}.png", index + 1),
        name: full_name(index + 4),
        contact: phone(index + 11),
        address: address(index),
        role: StaffRole::ALL[index % StaffRole::ALL.len()],
    }
}

pub fn sample_child(index: usize, doctor_count: usize, staff_count: usize) -> Child {
    Child {
        id: ChildId::new(index as i64 + 1),
        name: full_name(index + 7),
        mother_name: full_name(index + 2),
        contact: phone(index + 23),
        address: address(index + 5),
        age_months: 3 + (index * 7 % 57) as i32,
        vaccine_status: if index % 3 == 0 { "pending" } else { "up to date" }.to_owned(),
        doctor_id: DoctorId::new((index % doctor_count.max(1)) as i64 + 1),
        staff_id: StaffId::new((index % staff_count.max(1)) as i64 + 1),
    }
}

pub fn sample_mother(index: usize, doctor_count: usize, staff_count: usize) -> Mother {
    let register_date = Date::from_calendar_date(
        2026,
        Month::try_from(1 + (index % 12) as u8).expect("month in 1..=12"),
        1 + (index % 27) as u8,
    )
    .expect("valid register date");
    Mother {
        id: MotherId::new(index as i64 + 1),
        name: full_name(index + 9),
        age: 21 + (index * 3 % 19) as i32,
        address: address(index + 2),
        contact: phone(index + 31),
        gravidity: 1 + (index % 4) as i32,
        register_date,
        delivery_date: None,
        clinic_date: register_date.next_day(),
        doctor_id: DoctorId::new((index % doctor_count.max(1)) as i64 + 1),
        staff_id: StaffId::new((index % staff_count.max(1)) as i64 + 1),
    }
}

pub fn sample_vaccine(index: usize) -> Vaccine {
    Vaccine {
        id: VaccineId::new(index as i64 + 1),
        name: VACCINE_NAMES[index % VACCINE_NAMES.len()].to_owned(),
        batch_number: format!("VB-{:04}", 1200 + index * 13),
        brand: VACCINE_BRANDS[index % VACCINE_BRANDS.len()].to_owned(),
        category: if index % 3 == 2 {
            VaccineCategory::Mother
        } else {
            VaccineCategory::Child
        },
        quantity: if index % 5 == 4 { 0 } else { 40 + index as i64 * 15 },
        date: expiry(index),
    }
}

pub fn sample_medicine(index: usize) -> Medicine {
    Medicine {
        id: MedicineId::new(index as i64 + 1),
        name: MEDICINE_NAMES[index % MEDICINE_NAMES.len()].to_owned(),
        batch_number: format!("MB-{:04}", 3400 + index * 11),
        brand: VACCINE_BRANDS[(index + 1) % VACCINE_BRANDS.len()].to_owned(),
        quantity: 50 + index as i64 * 40,
        date: expiry(index + 3),
    }
}

pub fn sample_doctors(count: usize) -> Vec<Doctor> {
    (0..count).map(sample_doctor).collect()
}

pub fn sample_staff_members(count: usize) -> Vec<Staff> {
    (0..count).map(sample_staff).collect()
}

pub fn sample_children(count: usize, doctor_count: usize, staff_count: usize) -> Vec<Child> {
    (0..count)
        .map(|index| sample_child(index, doctor_count, staff_count))
        .collect()
}

pub fn sample_mothers(count: usize, doctor_count: usize, staff_count: usize) -> Vec<Mother> {
    (0..count)
        .map(|index| sample_mother(index, doctor_count, staff_count))
        .collect()
}

pub fn sample_vaccines(count: usize) -> Vec<Vaccine> {
    (0..count).map(sample_vaccine).collect()
}

pub fn sample_medicines(count: usize) -> Vec<Medicine> {
    (0..count).map(sample_medicine).collect()
}
