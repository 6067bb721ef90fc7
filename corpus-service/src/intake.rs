//! Registration intake: validate, stamp, append.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};

use corpus_core::{BookingPolicy, Identified, Record, Registration, RegistrationForm};
use corpus_store::DocumentStore;

use crate::codec::{decode, record_query, to_fields};
use crate::error::ServiceError;

pub struct RegistrationIntake {
    store: Arc<dyn DocumentStore>,
    policy: BookingPolicy,
}

impl RegistrationIntake {
    pub fn new(store: Arc<dyn DocumentStore>, policy: BookingPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    /// Validate `form` against today's calendar and append it.
    pub async fn submit(
        &self,
        form: RegistrationForm,
    ) -> Result<Identified<Registration>, ServiceError> {
        self.submit_at(form, Local::now().date_naive(), Utc::now())
            .await
    }

    /// [`submit`](Self::submit) with an explicit clock.
    ///
    /// Validation runs before the store is touched; a rejected form leaves
    /// no trace.
    pub async fn submit_at(
        &self,
        form: RegistrationForm,
        today: NaiveDate,
        stamped_at: DateTime<Utc>,
    ) -> Result<Identified<Registration>, ServiceError> {
        let form = self.policy.prepare(form, today)?;
        let registration = Registration::stamp(form, stamped_at);
        let id = self
            .store
            .add(Registration::COLLECTION, to_fields(&registration)?)
            .await?;
        tracing::info!(
            %id,
            plan = %registration.plan,
            trial = registration.preferred_date.is_some(),
            "registration received"
        );
        Ok(Identified {
            id,
            record: registration,
        })
    }

    /// All registrations, newest first.
    pub async fn recent(&self) -> Result<Vec<Identified<Registration>>, ServiceError> {
        self.store
            .query(&record_query::<Registration>())
            .await?
            .into_iter()
            .map(decode::<Registration>)
            .collect()
    }
}
