// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! HTTP-backed [`EntityRepository`] for screens whose collection lives on the
//! clinic server. The wire contract per resource is
//! `GET /{resource}/all`, `POST /{resource}/add`, `PUT /{resource}/update/{id}`
//! and `DELETE /{resource}/delete/{id}`. Any transport error or non-2xx
//! response is one uniform failure: the write is abandoned, nothing is merged
//! locally, and the caller's previously fetched collection stays as it was.

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::time::Duration;
use url::Url;

use clinica_app::RecordId;
use clinica_store::{EntityRepository, Record};

/// Resource path segment for a remote-backed entity, e.g. `"doctor"`.
pub trait RemoteResource: Record + Serialize + DeserializeOwned {
    const RESOURCE: &'static str;
}

impl RemoteResource for clinica_app::Doctor {
    const RESOURCE: &'static str = "doctor";
}

impl RemoteResource for clinica_app::Staff {
    const RESOURCE: &'static str = "staff";
}

impl RemoteResource for clinica_app::Child {
    const RESOURCE: &'static str = "child";
}

impl RemoteResource for clinica_app::Mother {
    const RESOURCE: &'static str = "mother";
}

impl RemoteResource for clinica_app::Vaccine {
    const RESOURCE: &'static str = "vaccine";
}

impl RemoteResource for clinica_app::Medicine {
    const RESOURCE: &'static str = "medicine";
}

#[derive(Debug, Clone)]
pub struct Gateway {
    base_url: String,
    http: HttpClient,
}

impl Gateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("remote.base_url must not be empty");
        }
        let parsed = Url::parse(&base_url)
            .with_context(|| format!("remote.base_url {base_url:?} is not a valid URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "remote.base_url {base_url:?} must use http or https, got {:?}",
                parsed.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Repository handle for one resource. Cheap; the underlying client is
    /// shared.
    pub fn store<T: RemoteResource>(&self) -> RemoteStore<T> {
        RemoteStore {
            base_url: self.base_url.clone(),
            http: self.http.clone(),
            _record: PhantomData,
        }
    }

    /// Connectivity probe used by `clinica --check`.
    pub fn ping(&self) -> Result<()> {
        let url = format!("{}/doctor/all", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(())
    }
}

pub struct RemoteStore<T> {
    base_url: String,
    http: HttpClient,
    _record: PhantomData<T>,
}

impl<T: RemoteResource> RemoteStore<T> {
    fn resource_url(&self, suffix: &str) -> String {
        format!("{}/{}/{}", self.base_url, T::RESOURCE, suffix)
    }

    fn check_status(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }
}

impl<T: RemoteResource> EntityRepository<T> for RemoteStore<T> {
    fn list(&mut self) -> Result<Vec<T>> {
        let response = self
            .http
            .get(self.resource_url("all"))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        let response = Self::check_status(response)?;
        response
            .json()
            .with_context(|| format!("decode {} collection", T::RESOURCE))
    }

    fn add(&mut self, draft: T) -> Result<T> {
        // The server assigns the id; whatever the draft carries is ignored on
        // that side and overwritten by the record echoed back.
        let response = self
            .http
            .post(self.resource_url("add"))
            .json(&draft)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        let response = Self::check_status(response)?;
        response
            .json()
            .with_context(|| format!("decode created {}", T::RESOURCE))
    }

    fn update(&mut self, id: T::Id, mut draft: T) -> Result<()> {
        draft.set_id(id);
        let response = self
            .http
            .put(self.resource_url(&format!("update/{}", id.as_i64())))
            .json(&draft)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        // No response body is part of the contract for updates.
        Self::check_status(response)?;
        Ok(())
    }

    fn remove(&mut self, id: T::Id) -> Result<()> {
        let response = self
            .http
            .delete(self.resource_url(&format!("delete/{}", id.as_i64())))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        Self::check_status(response)?;
        Ok(())
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach clinic server at {} -- check [remote].base_url and that the server is running ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if body.len() < 100 && !body.trim().is_empty() && !body.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), body.trim());
    }
    anyhow!("server returned {}", status.as_u16())
}

#[cfg(test)]
mod tests {
    use super::Gateway;
    use std::time::Duration;

    #[test]
    fn gateway_rejects_empty_base_url() {
        assert!(Gateway::new("", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn gateway_rejects_non_http_schemes() {
        assert!(Gateway::new("ftp://clinic.test", Duration::from_secs(1)).is_err());
        assert!(Gateway::new("file:///tmp/db", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn gateway_trims_trailing_slash() {
        let gateway =
            Gateway::new("http://clinic.test/api/", Duration::from_secs(1)).expect("valid URL");
        assert_eq!(gateway.base_url(), "http://clinic.test/api");
    }
}
