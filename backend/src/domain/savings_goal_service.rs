//! # Savings Goal Service
//!
//! Adds contribution tracking to the savings goal repository. Goals are
//! listed by deadline, earliest first.

use serde_json::Value;
use shared::{AsRecordId, SavingsGoal};
use tracing::info;

use super::outcome::Outcome;
use super::record_repository::RecordRepository;
use crate::storage::RecordClient;

pub type SavingsGoalRepository<C> = RecordRepository<SavingsGoal, C>;

const CURRENT_AMOUNT: &str = "current_amount_c";

impl<C: RecordClient> RecordRepository<SavingsGoal, C> {
    /// Add `delta` (negative to withdraw) to a goal's saved amount, never
    /// going below zero. The goal is read, adjusted and written back in full;
    /// concurrent adjustments of the same goal can overwrite each other.
    pub async fn update_amount_outcome(&self, id: impl AsRecordId, delta: f64) -> Outcome<SavingsGoal> {
        let id = match id.as_record_id() {
            Ok(id) => id,
            Err(e) => return self.report("update amount", Outcome::Failure(e.into())),
        };

        let mut goal = match self.get_raw(id).await {
            Ok(Some(goal)) => goal,
            Ok(None) => return self.report("update amount", Outcome::NotFound),
            Err(e) => return self.report("update amount", Outcome::Failure(e)),
        };

        let current = goal.get(CURRENT_AMOUNT).and_then(Value::as_f64).unwrap_or(0.0);
        let amount = (current + delta).max(0.0);
        info!("Adjusting savings goal {} from {} to {}", id, current, amount);

        goal.insert(CURRENT_AMOUNT.to_string(), Value::from(amount));
        self.update_from_outcome(id, &goal).await
    }

    pub async fn update_amount(&self, id: impl AsRecordId, delta: f64) -> Option<SavingsGoal> {
        self.update_amount_outcome(id, delta).await.ok()
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::InjectedFailure;
    use crate::test_utils::{savings_goal_draft, TestEnvironment};

    #[tokio::test]
    async fn test_create_defaults_amount_and_sets_created_at() {
        let env = TestEnvironment::new();
        let goal = env
            .services
            .savings_goals
            .create(&savings_goal_draft("Bike", 800.0, "2024-12-01"))
            .await
            .unwrap();

        assert_eq!(goal.name, "Bike");
        assert_eq!(goal.current_amount, 0.0);
        assert!(goal.created_at.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let env = TestEnvironment::new();
        let goals = &env.services.savings_goals;
        let created = goals.create(&savings_goal_draft("Bike", 800.0, "2024-12-01")).await.unwrap();

        let mut draft = savings_goal_draft("Road bike", 1200.0, "2025-03-01");
        draft.current_amount = Some(100.0);
        let updated = goals.update(created.id, &draft).await.unwrap();

        assert_eq!(updated.title, "Road bike");
        assert_eq!(updated.current_amount, 100.0);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_amount_adds_and_floors_at_zero() {
        let env = TestEnvironment::new();
        let goals = &env.services.savings_goals;
        let mut draft = savings_goal_draft("Camera", 600.0, "2024-09-01");
        draft.current_amount = Some(30.0);
        let goal = goals.create(&draft).await.unwrap();

        let topped_up = goals.update_amount(goal.id, 45.5).await.unwrap();
        assert_eq!(topped_up.current_amount, 75.5);

        let drained = goals.update_amount(goal.id, -500.0).await.unwrap();
        assert_eq!(drained.current_amount, 0.0);
        assert_eq!(drained.title, "Camera");
        assert_eq!(drained.target_amount, 600.0);
    }

    #[tokio::test]
    async fn test_withdrawal_below_zero_stores_zero() {
        let env = TestEnvironment::new();
        let goals = &env.services.savings_goals;
        let mut draft = savings_goal_draft("Trip", 2000.0, "2024-07-01");
        draft.current_amount = Some(30.0);
        let goal = goals.create(&draft).await.unwrap();

        goals.update_amount(goal.id, -50.0).await.unwrap();
        assert_eq!(goals.get_by_id(goal.id).await.unwrap().current_amount, 0.0);
    }

    #[tokio::test]
    async fn test_update_amount_of_missing_goal() {
        let env = TestEnvironment::new();
        let goals = &env.services.savings_goals;

        assert!(goals.update_amount_outcome(41, 10.0).await.is_not_found());
        assert_eq!(goals.update_amount("nope", 10.0).await, None);

        env.client.inject_failure(InjectedFailure::Fault("timeout".to_string())).await;
        assert_eq!(goals.update_amount(1, 10.0).await, None);
    }

    #[tokio::test]
    async fn test_list_orders_by_deadline() {
        let env = TestEnvironment::new();
        let goals = &env.services.savings_goals;
        for (title, deadline) in [("Later", "2025-06-01"), ("Soon", "2024-02-01"), ("Middle", "2024-10-15")] {
            goals.create(&savings_goal_draft(title, 100.0, deadline)).await.unwrap();
        }

        let titles: Vec<String> = goals.list().await.into_iter().map(|g| g.title).collect();
        assert_eq!(titles, vec!["Soon", "Middle", "Later"]);
    }
}
