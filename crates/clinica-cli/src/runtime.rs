// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use clinica_app::{
    Child, ChildFormInput, Doctor, DoctorFormInput, FormPayload, Medicine, MedicineFormInput,
    Mother, MotherFormInput, Staff, StaffFormInput, TabKind, VaccinationFormInput,
    VaccinationRecord, VaccinationRecordId, VaccinationTarget, Vaccine, VaccineCategory,
    VaccineFormInput,
};
use clinica_gateway::{Gateway, RemoteResource, RemoteStore};
use clinica_store::{EntityRepository, LookupValue, MemoryStore, doctor_lookup, staff_lookup};
use clinica_tui::{PickerData, TabSnapshot};

/// Repository picked at composition time: in-memory or clinic-server backed.
/// The rest of the app only sees [`EntityRepository`].
pub enum Repo<T: RemoteResource> {
    Memory(MemoryStore<T>),
    Remote(RemoteStore<T>),
}

impl<T: RemoteResource> EntityRepository<T> for Repo<T> {
    fn list(&mut self) -> Result<Vec<T>> {
        match self {
            Self::Memory(store) => store.list(),
            Self::Remote(store) => store.list(),
        }
    }

    fn add(&mut self, draft: T) -> Result<T> {
        match self {
            Self::Memory(store) => store.add(draft),
            Self::Remote(store) => store.add(draft),
        }
    }

    fn update(&mut self, id: T::Id, draft: T) -> Result<()> {
        match self {
            Self::Memory(store) => store.update(id, draft),
            Self::Remote(store) => store.update(id, draft),
        }
    }

    fn remove(&mut self, id: T::Id) -> Result<()> {
        match self {
            Self::Memory(store) => store.remove(id),
            Self::Remote(store) => store.remove(id),
        }
    }
}

pub struct ClinicRuntime {
    doctors: Repo<Doctor>,
    staff: Repo<Staff>,
    children: Repo<Child>,
    mothers: Repo<Mother>,
    vaccines: Repo<Vaccine>,
    medicine: Repo<Medicine>,
    // Vaccination history never leaves the process, whatever backs the rest.
    vaccinations: MemoryStore<VaccinationRecord>,
}

impl ClinicRuntime {
    pub fn in_memory() -> Self {
        Self {
            doctors: Repo::Memory(MemoryStore::new()),
            staff: Repo::Memory(MemoryStore::new()),
            children: Repo::Memory(MemoryStore::new()),
            mothers: Repo::Memory(MemoryStore::new()),
            vaccines: Repo::Memory(MemoryStore::new()),
            medicine: Repo::Memory(MemoryStore::new()),
            vaccinations: MemoryStore::new(),
        }
    }

    pub fn with_gateway(gateway: &Gateway) -> Self {
        Self {
            doctors: Repo::Remote(gateway.store()),
            staff: Repo::Remote(gateway.store()),
            children: Repo::Remote(gateway.store()),
            mothers: Repo::Remote(gateway.store()),
            vaccines: Repo::Remote(gateway.store()),
            medicine: Repo::Remote(gateway.store()),
            vaccinations: MemoryStore::new(),
        }
    }

    pub fn seeded_demo() -> Self {
        let doctors = clinica_testkit::sample_doctors(5);
        let staff = clinica_testkit::sample_staff_members(6);
        let children = clinica_testkit::sample_children(8, doctors.len(), staff.len());
        let mothers = clinica_testkit::sample_mothers(6, doctors.len(), staff.len());
        Self {
            doctors: Repo::Memory(MemoryStore::with_records(doctors)),
            staff: Repo::Memory(MemoryStore::with_records(staff)),
            children: Repo::Memory(MemoryStore::with_records(children)),
            mothers: Repo::Memory(MemoryStore::with_records(mothers)),
            vaccines: Repo::Memory(MemoryStore::with_records(
                clinica_testkit::sample_vaccines(10),
            )),
            medicine: Repo::Memory(MemoryStore::with_records(
                clinica_testkit::sample_medicines(7),
            )),
            vaccinations: MemoryStore::new(),
        }
    }

    pub fn vaccination_log(&mut self) -> Result<Vec<VaccinationRecord>> {
        self.vaccinations.list()
    }
}

fn doctor_from(form: &DoctorFormInput) -> Doctor {
    Doctor {
        id: clinica_app::DoctorId::new(0),
        name: form.name.clone(),
        registration_number: form.registration_number.clone(),
        position: form.position,
        contact: form.contact.clone(),
        email: form.email.clone(),
    }
}

fn staff_from(form: &StaffFormInput) -> Staff {
    Staff {
        id: clinica_app::StaffId::new(0),
        profile_image_ref: form.profile_image_ref.clone(),
        name: form.name.clone(),
        contact: form.contact.clone(),
        address: form.address.clone(),
        role: form.role,
    }
}

fn child_from(form: &ChildFormInput) -> Child {
    Child {
        id: clinica_app::ChildId::new(0),
        name: form.name.clone(),
        mother_name: form.mother_name.clone(),
        contact: form.contact.clone(),
        address: form.address.clone(),
        age_months: form.age_months,
        vaccine_status: form.vaccine_status.clone(),
        doctor_id: form.doctor_id,
        staff_id: form.staff_id,
    }
}

fn mother_from(form: &MotherFormInput) -> Result<Mother> {
    Ok(Mother {
        id: clinica_app::MotherId::new(0),
        name: form.name.clone(),
        age: form.age,
        address: form.address.clone(),
        contact: form.contact.clone(),
        gravidity: form.gravidity,
        register_date: form
            .register_date
            .ok_or_else(|| anyhow!("register date is required"))?,
        delivery_date: form.delivery_date,
        clinic_date: form.clinic_date,
        doctor_id: form.doctor_id,
        staff_id: form.staff_id,
    })
}

fn vaccine_from(form: &VaccineFormInput) -> Result<Vaccine> {
    Ok(Vaccine {
        id: clinica_app::VaccineId::new(0),
        name: form.name.clone(),
        batch_number: form.batch_number.clone(),
        brand: form.brand.clone(),
        category: form.category,
        quantity: form.quantity,
        date: form
            .date
            .ok_or_else(|| anyhow!("vaccine expiry date is required"))?,
    })
}

fn medicine_from(form: &MedicineFormInput) -> Result<Medicine> {
    Ok(Medicine {
        id: clinica_app::MedicineId::new(0),
        name: form.name.clone(),
        batch_number: form.batch_number.clone(),
        brand: form.brand.clone(),
        quantity: form.quantity,
        date: form
            .date
            .ok_or_else(|| anyhow!("medicine expiry date is required"))?,
    })
}

impl clinica_tui::AppRuntime for ClinicRuntime {
    fn load_dashboard_counts(&mut self) -> Result<clinica_app::DashboardCounts> {
        let vaccines = self.vaccines.list()?;
        let medicine = self.medicine.list()?;
        Ok(clinica_app::DashboardCounts {
            doctors: self.doctors.list()?.len(),
            staff: self.staff.list()?.len(),
            children: self.children.list()?.len(),
            mothers: self.mothers.list()?.len(),
            vaccines_available: vaccines
                .iter()
                .filter(|vaccine| vaccine.quantity > 0)
                .count(),
            medicine_units: medicine.iter().map(|item| item.quantity).sum(),
        })
    }

    fn load_tab_snapshot(&mut self, tab: TabKind) -> Result<Option<TabSnapshot>> {
        let snapshot = match tab {
            TabKind::Dashboard => None,
            TabKind::Doctors => Some(TabSnapshot::Doctors(self.doctors.list()?)),
            TabKind::Staff => Some(TabSnapshot::Staff(self.staff.list()?)),
            TabKind::Children => Some(TabSnapshot::Children(self.children.list()?)),
            TabKind::Mothers => Some(TabSnapshot::Mothers(self.mothers.list()?)),
            TabKind::Vaccines => Some(TabSnapshot::Vaccines(self.vaccines.list()?)),
            TabKind::Medicine => Some(TabSnapshot::Medicine(self.medicine.list()?)),
        };
        Ok(snapshot)
    }

    fn load_pickers(&mut self) -> Result<PickerData> {
        let children = self.children.list()?;
        let mothers = self.mothers.list()?;
        Ok(PickerData {
            doctors: doctor_lookup(&self.doctors.list()?),
            staff: staff_lookup(&self.staff.list()?),
            children: children
                .iter()
                .map(|child| LookupValue {
                    id: child.id,
                    name: child.name.clone(),
                })
                .collect(),
            mothers: mothers
                .iter()
                .map(|mother| LookupValue {
                    id: mother.id,
                    name: mother.name.clone(),
                })
                .collect(),
            vaccines: self.vaccines.list()?,
        })
    }

    fn create_record(&mut self, payload: &FormPayload) -> Result<()> {
        payload.validate()?;
        match payload {
            FormPayload::Doctor(form) => {
                self.doctors.add(doctor_from(form))?;
            }
            FormPayload::Staff(form) => {
                self.staff.add(staff_from(form))?;
            }
            FormPayload::Child(form) => {
                self.children.add(child_from(form))?;
            }
            FormPayload::Mother(form) => {
                self.mothers.add(mother_from(form)?)?;
            }
            FormPayload::Vaccine(form) => {
                self.vaccines.add(vaccine_from(form)?)?;
            }
            FormPayload::Medicine(form) => {
                self.medicine.add(medicine_from(form)?)?;
            }
            FormPayload::Vaccination(_) => {
                bail!("vaccinations are recorded through record_vaccination");
            }
        }
        Ok(())
    }

    fn update_record(&mut self, row_id: i64, payload: &FormPayload) -> Result<()> {
        payload.validate()?;
        match payload {
            FormPayload::Doctor(form) => self
                .doctors
                .update(clinica_app::DoctorId::new(row_id), doctor_from(form)),
            FormPayload::Staff(form) => self
                .staff
                .update(clinica_app::StaffId::new(row_id), staff_from(form)),
            FormPayload::Child(form) => self
                .children
                .update(clinica_app::ChildId::new(row_id), child_from(form)),
            FormPayload::Mother(form) => self
                .mothers
                .update(clinica_app::MotherId::new(row_id), mother_from(form)?),
            FormPayload::Vaccine(form) => self
                .vaccines
                .update(clinica_app::VaccineId::new(row_id), vaccine_from(form)?),
            FormPayload::Medicine(form) => self
                .medicine
                .update(clinica_app::MedicineId::new(row_id), medicine_from(form)?),
            FormPayload::Vaccination(_) => {
                bail!("vaccination records cannot be edited");
            }
        }
    }

    fn delete_record(&mut self, tab: TabKind, row_id: i64) -> Result<()> {
        match tab {
            TabKind::Dashboard => bail!("the dashboard has no records to delete"),
            TabKind::Doctors => self.doctors.remove(clinica_app::DoctorId::new(row_id)),
            TabKind::Staff => self.staff.remove(clinica_app::StaffId::new(row_id)),
            TabKind::Children => self.children.remove(clinica_app::ChildId::new(row_id)),
            TabKind::Mothers => self.mothers.remove(clinica_app::MotherId::new(row_id)),
            TabKind::Vaccines => self.vaccines.remove(clinica_app::VaccineId::new(row_id)),
            TabKind::Medicine => self.medicine.remove(clinica_app::MedicineId::new(row_id)),
        }
    }

    fn record_vaccination(&mut self, input: &VaccinationFormInput) -> Result<()> {
        input.validate()?;
        let target = match input.mode {
            VaccineCategory::Child => VaccinationTarget::Child(
                input
                    .child_id
                    .ok_or_else(|| anyhow!("select a child before recording the vaccination"))?,
            ),
            VaccineCategory::Mother => VaccinationTarget::Mother(
                input
                    .mother_id
                    .ok_or_else(|| anyhow!("select a mother before recording the vaccination"))?,
            ),
        };
        let vaccine_id = input
            .vaccine_id
            .ok_or_else(|| anyhow!("select a vaccine before recording the vaccination"))?;
        let date = input
            .date
            .ok_or_else(|| anyhow!("vaccination date is required"))?;

        // Recording does not touch vaccine stock; quantities only change
        // through vaccine edits.
        self.vaccinations.add(VaccinationRecord {
            id: VaccinationRecordId::new(0),
            target,
            vaccine_id,
            date,
            notes: input.notes.clone(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ClinicRuntime;
    use anyhow::{Result, anyhow};
    use clinica_app::{
        ChildId, DoctorFormInput, DoctorPosition, FormPayload, TabKind, VaccinationFormInput,
        VaccinationTarget, VaccineCategory, VaccineId,
    };
    use clinica_tui::{AppRuntime, TabSnapshot};
    use std::io::Read;
    use std::thread;
    use time::{Date, Month};

    fn doctor_payload(name: &str) -> FormPayload {
        FormPayload::Doctor(DoctorFormInput {
            name: name.to_owned(),
            registration_number: format!("SLMC-{name}"),
            position: DoctorPosition::Pediatrician,
            contact: "071 555 0100".to_owned(),
            email: format!("{}@clinic.test", name.to_lowercase()),
        })
    }

    #[test]
    fn create_record_assigns_ids_starting_at_one() -> Result<()> {
        let mut runtime = ClinicRuntime::in_memory();
        runtime.create_record(&doctor_payload("Ada"))?;
        runtime.create_record(&doctor_payload("Ben"))?;

        let Some(TabSnapshot::Doctors(doctors)) = runtime.load_tab_snapshot(TabKind::Doctors)?
        else {
            panic!("expected a doctors snapshot");
        };
        assert_eq!(doctors.len(), 2);
        assert_eq!(doctors[0].id.get(), 1);
        assert_eq!(doctors[1].id.get(), 2);
        Ok(())
    }

    #[test]
    fn update_record_keeps_the_row_id() -> Result<()> {
        let mut runtime = ClinicRuntime::in_memory();
        runtime.create_record(&doctor_payload("Ada"))?;
        runtime.create_record(&doctor_payload("Ben"))?;

        runtime.update_record(2, &doctor_payload("Renamed"))?;
        let Some(TabSnapshot::Doctors(doctors)) = runtime.load_tab_snapshot(TabKind::Doctors)?
        else {
            panic!("expected a doctors snapshot");
        };
        assert_eq!(doctors[0].name, "Ada");
        assert_eq!(doctors[1].id.get(), 2);
        assert_eq!(doctors[1].name, "Renamed");
        Ok(())
    }

    #[test]
    fn delete_record_targets_the_named_tab_only() -> Result<()> {
        let mut runtime = ClinicRuntime::seeded_demo();
        let counts_before = runtime.load_dashboard_counts()?;

        runtime.delete_record(TabKind::Doctors, 1)?;
        let counts_after = runtime.load_dashboard_counts()?;
        assert_eq!(counts_after.doctors, counts_before.doctors - 1);
        assert_eq!(counts_after.staff, counts_before.staff);
        assert_eq!(counts_after.children, counts_before.children);
        Ok(())
    }

    #[test]
    fn dashboard_counts_summarize_stock() -> Result<()> {
        let mut runtime = ClinicRuntime::seeded_demo();
        let counts = runtime.load_dashboard_counts()?;

        let Some(TabSnapshot::Vaccines(vaccines)) = runtime.load_tab_snapshot(TabKind::Vaccines)?
        else {
            panic!("expected a vaccines snapshot");
        };
        let in_stock = vaccines.iter().filter(|vaccine| vaccine.quantity > 0).count();
        assert_eq!(counts.vaccines_available, in_stock);
        assert!(in_stock < vaccines.len());

        let Some(TabSnapshot::Medicine(medicine)) = runtime.load_tab_snapshot(TabKind::Medicine)?
        else {
            panic!("expected a medicine snapshot");
        };
        let units: i64 = medicine.iter().map(|item| item.quantity).sum();
        assert_eq!(counts.medicine_units, units);
        Ok(())
    }

    #[test]
    fn recording_a_vaccination_appends_to_the_log_and_keeps_stock() -> Result<()> {
        let mut runtime = ClinicRuntime::seeded_demo();
        let Some(TabSnapshot::Vaccines(before)) = runtime.load_tab_snapshot(TabKind::Vaccines)?
        else {
            panic!("expected a vaccines snapshot");
        };

        runtime.record_vaccination(&VaccinationFormInput {
            mode: VaccineCategory::Child,
            child_id: Some(ChildId::new(1)),
            mother_id: None,
            vaccine_id: Some(VaccineId::new(1)),
            date: Some(Date::from_calendar_date(2026, Month::June, 2)?),
            notes: "first dose".to_owned(),
        })?;

        let log = runtime.vaccination_log()?;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].target, VaccinationTarget::Child(ChildId::new(1)));
        assert_eq!(log[0].target.category(), VaccineCategory::Child);

        let Some(TabSnapshot::Vaccines(after)) = runtime.load_tab_snapshot(TabKind::Vaccines)?
        else {
            panic!("expected a vaccines snapshot");
        };
        assert_eq!(before, after);
        Ok(())
    }

    #[test]
    fn vaccination_without_a_target_for_the_active_mode_fails() {
        let mut runtime = ClinicRuntime::seeded_demo();
        let error = runtime
            .record_vaccination(&VaccinationFormInput {
                mode: VaccineCategory::Mother,
                child_id: Some(ChildId::new(1)),
                mother_id: None,
                vaccine_id: Some(VaccineId::new(3)),
                date: Some(Date::from_calendar_date(2026, Month::June, 2).expect("valid date")),
                notes: "booster".to_owned(),
            })
            .expect_err("mother mode without a mother pick should fail");
        assert!(error.to_string().contains("mother"));
    }

    #[test]
    fn remote_runtime_posts_drafts_and_refetches_collections() -> Result<()> {
        let server = tiny_http::Server::http("127.0.0.1:0")
            .map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}", server.server_addr());

        let handle = thread::spawn(move || {
            let mut request = server.recv().expect("create request expected");
            assert_eq!(request.url(), "/doctor/add");
            let mut body = String::new();
            request
                .as_reader()
                .read_to_string(&mut body)
                .expect("body should read");
            let mut created: clinica_app::Doctor =
                serde_json::from_str(&body).expect("draft should decode");
            created.id = clinica_app::DoctorId::new(7);
            let reply = serde_json::to_string(&created).expect("record should encode");
            request
                .respond(
                    tiny_http::Response::from_string(reply).with_header(
                        tiny_http::Header::from_bytes("Content-Type", "application/json")
                            .expect("valid content type header"),
                    ),
                )
                .expect("response should succeed");

            let request = server.recv().expect("list request expected");
            assert_eq!(request.url(), "/doctor/all");
            let reply = serde_json::to_string(&vec![created]).expect("collection should encode");
            request
                .respond(
                    tiny_http::Response::from_string(reply).with_header(
                        tiny_http::Header::from_bytes("Content-Type", "application/json")
                            .expect("valid content type header"),
                    ),
                )
                .expect("response should succeed");
        });

        let gateway =
            clinica_gateway::Gateway::new(&addr, std::time::Duration::from_secs(1))?;
        let mut runtime = ClinicRuntime::with_gateway(&gateway);

        runtime.create_record(&doctor_payload("Remote"))?;
        let Some(TabSnapshot::Doctors(doctors)) = runtime.load_tab_snapshot(TabKind::Doctors)?
        else {
            panic!("expected a doctors snapshot");
        };
        assert_eq!(doctors.len(), 1);
        assert_eq!(doctors[0].id.get(), 7);

        handle.join().expect("server thread should join");
        Ok(())
    }
}
