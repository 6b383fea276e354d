//! Composer - snapshot から通知メッセージを組み立てる
//!
//! 純粋関数。欠けている任意フィールドはデフォルト値で埋めるだけで、失敗しません。

use crate::config::NotifierConfig;
use crate::domain::{Category, NotificationMessage, WorkItemSnapshot};

const UNKNOWN: &str = "?";

pub fn compose(
    category: Category,
    snapshot: &WorkItemSnapshot,
    config: &NotifierConfig,
) -> NotificationMessage {
    let model = field_or_unknown(snapshot.car_model.as_deref());
    let plate = field_or_unknown(snapshot.license_plate.as_deref());

    match category {
        Category::Alignment => {
            let template = &config.alignment;
            with_web_options(
                NotificationMessage::new(&template.title, format!("{model} ({plate}) arrived.")),
                template.icon.as_deref(),
                template.link.as_deref(),
            )
        }
        Category::Service => {
            let template = &config.service;
            let description = snapshot
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .unwrap_or(template.fallback_description.as_str());
            with_web_options(
                NotificationMessage::new(
                    &template.title,
                    format!("Vehicle: {model} ({plate})\nService: {description}"),
                ),
                template.icon.as_deref(),
                template.link.as_deref(),
            )
        }
    }
}

fn field_or_unknown(value: Option<&str>) -> &str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(UNKNOWN)
}

fn with_web_options(
    mut message: NotificationMessage,
    icon: Option<&str>,
    link: Option<&str>,
) -> NotificationMessage {
    if let Some(icon) = icon {
        message = message.with_icon(icon);
    }
    if let Some(link) = link {
        message = message.with_link(link);
    }
    message
}
