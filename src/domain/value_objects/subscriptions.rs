//! Subscription lifecycle and the role transitions it drives.
//!
//! Everything here is a pure function of stored rows and an explicit `now`;
//! repositories apply the resulting plans inside a transaction.
//!
//! Boundary: a subscription whose `end_date == now` is no longer "current"
//! (`end_date > now` is required) but is not yet expired either
//! (`end_date < now` is required). Reconciliation at that exact instant
//! downgrades a premium role while leaving the row flagged active.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::{subscriptions::SubscriptionEntity, users::UserEntity},
    value_objects::enums::roles::Role,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    NoSubscription,
    Active,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub package_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<SubscriptionEntity> for SubscriptionModel {
    fn from(entity: SubscriptionEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            package_id: entity.package_id,
            start_date: entity.start_date,
            end_date: entity.end_date,
            is_active: entity.is_active,
            created_at: entity.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeModel {
    pub package_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionMessageEnvelope {
    pub message: String,
    pub subscription: SubscriptionModel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckSubscriptionModel {
    pub has_active_subscription: bool,
    pub subscription: Option<SubscriptionModel>,
    pub state: SubscriptionState,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubscribeOutcome {
    Subscribed {
        subscription: SubscriptionEntity,
        role: Role,
    },
    AlreadyActive,
}

/// Result of applying a [`ReconcilePlan`]: the user as stored afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    pub user: UserEntity,
    pub active_subscription: Option<SubscriptionEntity>,
    pub expired: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilePlan {
    pub expire_ids: Vec<Uuid>,
    pub active_subscription: Option<SubscriptionEntity>,
    pub role: Role,
    pub role_changed: bool,
}

/// `None` when the end falls outside the representable date range.
pub fn subscription_end(start: DateTime<Utc>, duration_days: i32) -> Option<DateTime<Utc>> {
    start.checked_add_signed(Duration::try_days(i64::from(duration_days))?)
}

/// Admin is sticky; everyone else becomes premium.
pub fn role_after_subscribe(current: Role) -> Role {
    match current {
        Role::Admin => Role::Admin,
        Role::User | Role::Premium => Role::Premium,
    }
}

pub fn is_expired_at(subscription: &SubscriptionEntity, now: DateTime<Utc>) -> bool {
    subscription.is_active && subscription.end_date < now
}

pub fn is_current_at(subscription: &SubscriptionEntity, now: DateTime<Utc>) -> bool {
    subscription.is_active && subscription.end_date > now
}

pub fn plan_reconciliation(
    current_role: Role,
    subscriptions: &[SubscriptionEntity],
    now: DateTime<Utc>,
) -> ReconcilePlan {
    let expire_ids: Vec<Uuid> = subscriptions
        .iter()
        .filter(|subscription| is_expired_at(subscription, now))
        .map(|subscription| subscription.id)
        .collect();

    let active_subscription = subscriptions
        .iter()
        .filter(|subscription| is_current_at(subscription, now))
        .max_by_key(|subscription| subscription.end_date)
        .cloned();

    let role = match (current_role, &active_subscription) {
        (Role::Premium, None) => Role::User,
        (role, _) => role,
    };

    ReconcilePlan {
        expire_ids,
        active_subscription,
        role,
        role_changed: role != current_role,
    }
}

/// Evaluated over a user's full history after reconciliation.
pub fn subscription_state(
    subscriptions: &[SubscriptionEntity],
    now: DateTime<Utc>,
) -> SubscriptionState {
    if subscriptions
        .iter()
        .any(|subscription| is_current_at(subscription, now))
    {
        SubscriptionState::Active
    } else if subscriptions.is_empty() {
        SubscriptionState::NoSubscription
    } else {
        SubscriptionState::Expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::domain::value_objects::packages::MAX_PACKAGE_DURATION_DAYS;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap() + Duration::days(n)
    }

    fn subscription(start: DateTime<Utc>, end: DateTime<Utc>, is_active: bool) -> SubscriptionEntity {
        SubscriptionEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            package_id: Uuid::new_v4(),
            start_date: start,
            end_date: end,
            is_active,
            created_at: start,
        }
    }

    /// Mirrors what the repository does with a plan.
    fn apply(plan: &ReconcilePlan, subscriptions: &mut [SubscriptionEntity]) -> Role {
        for subscription in subscriptions.iter_mut() {
            if plan.expire_ids.contains(&subscription.id) {
                subscription.is_active = false;
            }
        }
        plan.role
    }

    #[test]
    fn subscribe_never_downgrades_admin() {
        assert_eq!(role_after_subscribe(Role::Admin), Role::Admin);
        assert_eq!(role_after_subscribe(Role::User), Role::Premium);
        assert_eq!(role_after_subscribe(Role::Premium), Role::Premium);
    }

    #[test]
    fn reconcile_never_touches_admin() {
        let subs = vec![subscription(day(-40), day(-10), true)];
        let plan = plan_reconciliation(Role::Admin, &subs, day(0));

        assert_eq!(plan.expire_ids, vec![subs[0].id]);
        assert_eq!(plan.role, Role::Admin);
        assert!(!plan.role_changed);

        let plan = plan_reconciliation(Role::Admin, &[], day(0));
        assert_eq!(plan.role, Role::Admin);
    }

    #[test]
    fn end_past_the_calendar_range_is_none() {
        assert!(subscription_end(day(0), i32::MAX).is_none());
        assert!(subscription_end(day(0), MAX_PACKAGE_DURATION_DAYS).is_some());
    }

    #[test]
    fn thirty_day_package_expires_on_day_thirty_one() {
        let start = day(0);
        let end = subscription_end(start, 30).unwrap();
        assert_eq!(end, day(30));

        let role = role_after_subscribe(Role::User);
        assert_eq!(role, Role::Premium);
        let mut subs = vec![subscription(start, end, true)];

        let plan = plan_reconciliation(role, &subs, day(15));
        assert!(plan.expire_ids.is_empty());
        assert_eq!(plan.role, Role::Premium);
        assert_eq!(plan.active_subscription.as_ref().map(|s| s.id), Some(subs[0].id));

        let plan = plan_reconciliation(role, &subs, day(31));
        let role = apply(&plan, &mut subs);
        assert_eq!(plan.expire_ids, vec![subs[0].id]);
        assert!(!subs[0].is_active);
        assert_eq!(role, Role::User);
        assert!(plan.role_changed);
        assert!(plan.active_subscription.is_none());
        assert_eq!(subscription_state(&subs, day(31)), SubscriptionState::Expired);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let now = day(31);
        let mut subs = vec![
            subscription(day(0), day(30), true),
            subscription(day(-90), day(-60), false),
        ];

        let first = plan_reconciliation(Role::Premium, &subs, now);
        let role = apply(&first, &mut subs);
        let snapshot = subs.clone();

        let second = plan_reconciliation(role, &subs, now);
        let role_again = apply(&second, &mut subs);

        assert!(second.expire_ids.is_empty());
        assert!(!second.role_changed);
        assert_eq!(role, role_again);
        assert_eq!(first.active_subscription, second.active_subscription);
        assert_eq!(subs, snapshot);
    }

    #[test]
    fn end_date_equal_to_now_is_neither_current_nor_expired() {
        let now = day(30);
        let subs = vec![subscription(day(0), now, true)];

        assert!(!is_current_at(&subs[0], now));
        assert!(!is_expired_at(&subs[0], now));

        let plan = plan_reconciliation(Role::Premium, &subs, now);
        assert!(plan.expire_ids.is_empty(), "row stays flagged active");
        assert!(plan.active_subscription.is_none());
        assert_eq!(plan.role, Role::User);

        let later = plan_reconciliation(Role::User, &subs, now + Duration::seconds(1));
        assert_eq!(later.expire_ids, vec![subs[0].id]);
    }

    #[test]
    fn premium_without_any_subscription_is_downgraded() {
        let plan = plan_reconciliation(Role::Premium, &[], day(0));
        assert_eq!(plan.role, Role::User);
        assert!(plan.role_changed);
    }

    #[test]
    fn plain_user_with_current_subscription_keeps_role() {
        let subs = vec![subscription(day(0), day(30), true)];
        let plan = plan_reconciliation(Role::User, &subs, day(1));
        assert_eq!(plan.role, Role::User);
        assert!(plan.active_subscription.is_some());
    }

    #[test]
    fn state_reports_history() {
        assert_eq!(subscription_state(&[], day(0)), SubscriptionState::NoSubscription);

        let subs = vec![subscription(day(0), day(30), true)];
        assert_eq!(subscription_state(&subs, day(1)), SubscriptionState::Active);
        assert_eq!(subscription_state(&subs, day(30)), SubscriptionState::Expired);
    }
}
