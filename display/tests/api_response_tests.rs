use display::telegram::{ApiResponse, Message, Update};

#[test]
fn successful_send_reply_parses() -> anyhow::Result<()> {
    let body = r#"{
        "ok": true,
        "result": {
            "message_id": 4242,
            "chat": { "id": 12345, "type": "private" },
            "date": 1700000000,
            "text": "Azuki"
        }
    }"#;

    let resp: ApiResponse<Message> = serde_json::from_str(body)?;

    assert!(resp.ok);
    let msg = resp.result.unwrap();
    assert_eq!(msg.message_id, 4242);
    assert_eq!(msg.chat.id, 12345);
    Ok(())
}

#[test]
fn error_reply_keeps_code_and_description() -> anyhow::Result<()> {
    let body = r#"{
        "ok": false,
        "error_code": 400,
        "description": "Bad Request: message to edit not found"
    }"#;

    let resp: ApiResponse<serde_json::Value> = serde_json::from_str(body)?;

    assert!(!resp.ok);
    assert!(resp.result.is_none());
    assert_eq!(resp.error_code, Some(400));
    assert_eq!(
        resp.description.as_deref(),
        Some("Bad Request: message to edit not found")
    );
    Ok(())
}

#[test]
fn delete_reply_is_a_bare_bool() -> anyhow::Result<()> {
    let resp: ApiResponse<bool> = serde_json::from_str(r#"{"ok":true,"result":true}"#)?;
    assert_eq!(resp.result, Some(true));
    Ok(())
}

#[test]
fn update_batches_parse_with_unknown_fields() -> anyhow::Result<()> {
    let body = r#"{
        "ok": true,
        "result": [
            { "update_id": 1, "message": { "message_id": 1, "chat": { "id": 7, "type": "private" }, "text": "/start", "from": { "id": 7 } } },
            { "update_id": 2, "edited_message": { "message_id": 1, "chat": { "id": 7 } } }
        ]
    }"#;

    let resp: ApiResponse<Vec<Update>> = serde_json::from_str(body)?;
    let updates = resp.result.unwrap();

    assert_eq!(updates.len(), 2);
    assert_eq!(
        display::parse_update(&updates[0]),
        Some(display::ChatCommand::Start { chat_id: 7 })
    );
    assert_eq!(display::parse_update(&updates[1]), None);
    Ok(())
}
