//! Trigger - qualifying transition の判定
//!
//! 純粋関数（before, after, rules → bool）。副作用なし。
//!
//! # Edge-triggered
//! 「いまトリガー状態にある」ではなく「トリガー状態に入った」ときだけ通知します。
//! 同じ状態のまま別フィールドを編集しても再通知しません。
//! 重複送信を防ぐ仕組みはこの判定だけです（通知済みフラグは持たない）。

use crate::config::TriggerConfig;
use crate::domain::{Category, ChangeEvent, WorkItemSnapshot};

/// qualifying transition なら `after` snapshot を返す
///
/// 削除（`after` なし）は常に対象外
pub fn evaluate<'a>(event: &'a ChangeEvent, rules: &TriggerConfig) -> Option<&'a WorkItemSnapshot> {
    let after = event.after()?;
    qualifies(event.category(), event.before(), after, rules).then_some(after)
}

pub fn qualifies(
    category: Category,
    before: Option<&WorkItemSnapshot>,
    after: &WorkItemSnapshot,
    rules: &TriggerConfig,
) -> bool {
    match category {
        Category::Alignment => alignment_qualifies(before, after, &rules.alignment_status),
        Category::Service => service_qualifies(before, after, &rules.service_status),
    }
}

/// 作成時、または別の status からトリガー status に入った
fn alignment_qualifies(
    before: Option<&WorkItemSnapshot>,
    after: &WorkItemSnapshot,
    trigger_status: &str,
) -> bool {
    if after.status != trigger_status {
        return false;
    }
    match before {
        None => true,
        Some(before) => before.status != trigger_status,
    }
}

/// Pending かつ担当者あり、その担当者が新しい（作成または再割り当て）
fn service_qualifies(
    before: Option<&WorkItemSnapshot>,
    after: &WorkItemSnapshot,
    trigger_status: &str,
) -> bool {
    if after.status != trigger_status {
        return false;
    }
    let Some(assignee) = after.assignee() else {
        return false;
    };
    match before {
        None => true,
        Some(before) => before.assignee() != Some(assignee),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn rules() -> TriggerConfig {
        TriggerConfig::default()
    }

    fn alignment(status: &str) -> WorkItemSnapshot {
        WorkItemSnapshot::alignment(status).with_vehicle("Civic", "ABC123")
    }

    fn service(status: &str, assignee: Option<&str>) -> WorkItemSnapshot {
        let snapshot = WorkItemSnapshot::service(status).with_vehicle("Onix", "XYZ9A87");
        match assignee {
            Some(name) => snapshot.with_assignee(name),
            None => snapshot,
        }
    }

    #[rstest]
    #[case(None, "Awaiting", true)]
    #[case(None, "Aligning", false)]
    #[case(Some("Draft"), "Awaiting", true)]
    #[case(Some("Done"), "Awaiting", true)]
    #[case(Some("Awaiting"), "Awaiting", false)]
    #[case(Some("Awaiting"), "Aligning", false)]
    fn alignment_is_edge_triggered(
        #[case] before: Option<&str>,
        #[case] after: &str,
        #[case] expected: bool,
    ) {
        let before = before.map(alignment);
        let after = alignment(after);
        assert_eq!(
            qualifies(Category::Alignment, before.as_ref(), &after, &rules()),
            expected
        );
    }

    #[rstest]
    #[case(None, ("Pending", Some("joao")), true)]
    #[case(None, ("Pending", None), false)]
    #[case(None, ("Pending", Some("")), false)]
    #[case(None, ("Done", Some("joao")), false)]
    #[case(Some(("Pending", Some("joao"))), ("Pending", Some("joao")), false)]
    #[case(Some(("Pending", Some("joao"))), ("Pending", Some("maria")), true)]
    #[case(Some(("Pending", None)), ("Pending", Some("maria")), true)]
    #[case(Some(("Pending", Some("maria "))), ("Pending", Some("maria")), true)]
    #[case(Some(("Pending", Some("maria "))), ("Pending", Some("maria ")), false)]
    #[case(None, ("Pending", Some("  ")), false)]
    #[case(Some(("Pending", Some("joao"))), ("Done", Some("maria")), false)]
    #[case(Some(("Done", Some("joao"))), ("Pending", Some("joao")), false)]
    fn service_triggers_on_new_assignee(
        #[case] before: Option<(&str, Option<&str>)>,
        #[case] after: (&str, Option<&str>),
        #[case] expected: bool,
    ) {
        let before = before.map(|(status, assignee)| service(status, assignee));
        let after = service(after.0, after.1);
        assert_eq!(
            qualifies(Category::Service, before.as_ref(), &after, &rules()),
            expected
        );
    }

    #[test]
    fn deletion_never_qualifies() {
        let event = ChangeEvent::deleted(alignment("Awaiting"));
        assert!(evaluate(&event, &rules()).is_none());
    }

    #[test]
    fn evaluate_carries_after_snapshot_forward() {
        let event = ChangeEvent::updated(alignment("Draft"), alignment("Awaiting")).unwrap();
        let snapshot = evaluate(&event, &rules()).unwrap();
        assert_eq!(snapshot.status, "Awaiting");
    }

    #[test]
    fn trigger_status_is_configurable() {
        let rules = TriggerConfig {
            alignment_status: "Aguardando".to_string(),
            service_status: "Pendente".to_string(),
        };
        let event = ChangeEvent::created(alignment("Aguardando"));
        assert!(evaluate(&event, &rules).is_some());

        let event = ChangeEvent::created(alignment("Awaiting"));
        assert!(evaluate(&event, &rules).is_none());
    }
}
