use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
    value_objects::subscriptions::{ReconcileOutcome, SubscribeOutcome},
};

#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    /// Serialized per user: the active-subscription check, the insert and the
    /// role promotion commit together or not at all.
    async fn subscribe(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> Result<SubscribeOutcome>;

    /// Expires lapsed subscriptions and settles the user's role as of `now`.
    /// `None` when the user does not exist.
    async fn reconcile(&self, user_id: Uuid, now: DateTime<Utc>)
    -> Result<Option<ReconcileOutcome>>;

    /// Newest first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<SubscriptionEntity>>;
}
