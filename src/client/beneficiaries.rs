//! Beneficiary operations: validate, create, retrieve, search, update, delete.

use super::query::to_query_pairs;
use super::{path_segment, CurrencyCloudClient};
use crate::error::{Error, Result};
use currencycloud_types::{
    Beneficiaries, Beneficiary, BeneficiaryDetails, BeneficiaryFilter, BeneficiaryUpdate,
    NewBeneficiary, PageRequest,
};
use tracing::{debug, info};

impl CurrencyCloudClient {
    /// Check bank details without storing anything.
    ///
    /// The server fills in what it can derive, e.g. the bank name and address
    /// behind a sort code.
    pub async fn validate_beneficiary(&self, details: &BeneficiaryDetails) -> Result<Beneficiary> {
        debug!(
            bank_country = %details.bank_country,
            currency = %details.currency,
            "Validating beneficiary details"
        );
        self.post("beneficiaries/validate", details).await
    }

    pub async fn create_beneficiary(&self, beneficiary: &NewBeneficiary) -> Result<Beneficiary> {
        info!(
            bank_country = %beneficiary.details.bank_country,
            currency = %beneficiary.details.currency,
            "Creating beneficiary"
        );
        let created: Beneficiary = self.post("beneficiaries/create", beneficiary).await?;
        info!(id = ?created.id, "Created beneficiary");
        Ok(created)
    }

    pub async fn retrieve_beneficiary(&self, id: &str) -> Result<Beneficiary> {
        let id = path_segment("id", id)?;
        self.get(&format!("beneficiaries/{}", id), &[]).await
    }

    /// First beneficiary matching `filter`, or `NotFound` if there is none
    pub async fn first_beneficiary(&self, filter: &BeneficiaryFilter) -> Result<Beneficiary> {
        let page = PageRequest::page(1).with_per_page(1);
        let found = self.find_beneficiaries(filter, &page).await?;
        found
            .beneficiaries
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound("no beneficiary matches the given filter".to_string()))
    }

    /// One page of beneficiaries matching `filter`
    pub async fn find_beneficiaries(
        &self,
        filter: &BeneficiaryFilter,
        page: &PageRequest,
    ) -> Result<Beneficiaries> {
        let mut query = to_query_pairs(filter)?;
        query.extend(to_query_pairs(page)?);
        self.get_page("beneficiaries/find", &query).await
    }

    /// Apply a partial update and return the full, updated beneficiary
    pub async fn update_beneficiary(
        &self,
        id: &str,
        update: &BeneficiaryUpdate,
    ) -> Result<Beneficiary> {
        let id = path_segment("id", id)?;
        info!(id = %id, "Updating beneficiary");
        self.post(&format!("beneficiaries/{}", id), update).await
    }

    /// Delete a beneficiary. The response is its state just before deletion.
    pub async fn delete_beneficiary(&self, id: &str) -> Result<Beneficiary> {
        let id = path_segment("id", id)?;
        info!(id = %id, "Deleting beneficiary");
        self.post_empty(&format!("beneficiaries/{}/delete", id)).await
    }
}
