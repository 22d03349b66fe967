// src/notify/templates.rs
//
// Mail bodies are rendered here and nowhere else; workflow code hands over
// data and gets a document back.
use tera::{Context, Tera};

use crate::errors::GatePassResult;
use crate::models::{Item, Stage};

static APPROVAL_TEMPLATE: &str = include_str!("templates/approval.html");
static REJECTION_TEMPLATE: &str = include_str!("templates/rejection.html");
static RETURNS_TEMPLATE: &str = include_str!("templates/returns.html");

pub fn render_approval(
    reference_no: &str,
    stage: Stage,
    recipient_name: &str,
    comment: Option<&str>,
) -> GatePassResult<String> {
    let mut context = Context::new();
    context.insert("reference_no", reference_no);
    context.insert("stage", stage.label());
    context.insert("recipient_name", recipient_name);
    context.insert("comment", &comment);
    Ok(Tera::one_off(APPROVAL_TEMPLATE, &context, true)?)
}

pub fn render_rejection(
    reference_no: &str,
    stage: Stage,
    recipient_name: &str,
    comment: &str,
) -> GatePassResult<String> {
    let mut context = Context::new();
    context.insert("reference_no", reference_no);
    context.insert("stage", stage.label());
    context.insert("recipient_name", recipient_name);
    context.insert("comment", comment);
    Ok(Tera::one_off(REJECTION_TEMPLATE, &context, true)?)
}

pub fn render_returns(
    reference_no: &str,
    recipient_name: &str,
    items: &[&Item],
) -> GatePassResult<String> {
    #[derive(serde::Serialize)]
    struct Row<'a> {
        name: &'a str,
        serial_no: &'a str,
        quantity: u32,
    }

    let rows: Vec<Row> = items
        .iter()
        .map(|item| Row {
            name: &item.name,
            serial_no: &item.serial_no,
            quantity: item.quantity,
        })
        .collect();

    let mut context = Context::new();
    context.insert("reference_no", reference_no);
    context.insert("recipient_name", recipient_name);
    context.insert("items", &rows);
    Ok(Tera::one_off(RETURNS_TEMPLATE, &context, true)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemStatus;

    #[test]
    fn approval_body_names_reference_and_stage() {
        let body = render_approval("REQ-0007", Stage::Dispatch, "K. Perera", Some("cleared"))
            .unwrap();
        assert!(body.contains("REQ-0007"));
        assert!(body.contains("Petrol Leader"));
        assert!(body.contains("cleared"));
    }

    #[test]
    fn approval_body_tolerates_missing_comment() {
        let body = render_approval("REQ-0007", Stage::Executive, "K. Perera", None).unwrap();
        assert!(body.contains("REQ-0007"));
        assert!(!body.contains("Comment:"));
    }

    #[test]
    fn returns_body_embeds_item_table() {
        let item = Item {
            name: "Fluke 87V".to_string(),
            serial_no: "SN-100".to_string(),
            category: "Test equipment".to_string(),
            quantity: 1,
            model: "87V".to_string(),
            returnable: true,
            photos: vec![],
            status: ItemStatus::Returned,
            return_date: None,
        };
        let body = render_returns("REQ-0001", "Verify Officer", &[&item]).unwrap();
        assert!(body.contains("SN-100"));
        assert!(body.contains("Fluke 87V"));
    }
}
