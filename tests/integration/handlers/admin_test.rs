//! Admin console: gating, one-shot commands, panel edits, admin set, listing

use serial_test::serial;
use teloxide::types::ChatId;
use vipgate::handlers::{commands::admin, replies};
use vipgate::models::{EditableField, VipSendMode};

use crate::helpers::*;

fn root() -> vipgate::models::UserProfile {
    profile(ADMIN_ID, "Root")
}

#[tokio::test]
#[serial]
async fn test_non_admin_is_denied_everything() {
    let ctx = TestContext::new().await.unwrap();
    let intruder = profile(700, "Mallory");
    let before = ctx.services.config_service.snapshot().await;

    let commands = [
        "/admin",
        "/setwelcome HACKED",
        "/setagreement HACKED",
        "/setbutton HACKED",
        "/setviplink https://evil.example.com",
        "/setvipchannel @evil",
        "/addadmin 700",
        "/removeadmin 1",
        "/admins",
        "/listusers",
        "/vipmode manual",
        "/cancel",
    ];
    for command in commands {
        ctx.command(&intruder, command).await.unwrap();
        assert_eq!(
            ctx.telegram_mock.last_text().await.as_deref(),
            Some(replies::NOT_ADMIN),
            "{} was not denied",
            command
        );
    }

    for action in ["admin:toggle_mode", "admin:edit_welcome", "admin:list_users"] {
        ctx.press(700, action).await.unwrap();
        assert_eq!(ctx.telegram_mock.last_text().await.as_deref(), Some(replies::NOT_ADMIN));
    }

    assert_eq!(ctx.services.config_service.snapshot().await, before);
    assert!(!ctx.services.auth_service.is_admin(700).await);
}

#[tokio::test]
#[serial]
async fn test_panel_lists_current_values() {
    let ctx = TestContext::new().await.unwrap();

    ctx.command(&root(), "/admin").await.unwrap();

    let sent = ctx.telegram_mock.sent_messages().await;
    let panel = sent.last().unwrap();
    let text = panel["text"].as_str().unwrap();
    assert!(text.contains("Admin panel"));
    assert!(text.contains("VIP mode: auto"));
    let buttons = panel["reply_markup"]["inline_keyboard"].as_array().unwrap();
    assert!(buttons
        .iter()
        .flat_map(|row| row.as_array().unwrap())
        .all(|b| b["callback_data"].as_str().unwrap().starts_with(replies::ADMIN_CALLBACK_PREFIX)));
}

#[tokio::test]
#[serial]
async fn test_one_shot_edits() {
    let ctx = TestContext::new().await.unwrap();
    let root = root();

    ctx.command(&root, "/setagreement Be nice.").await.unwrap();
    ctx.command(&root, "/setbutton Deal").await.unwrap();
    ctx.command(&root, "/setviplink t.me/+abc").await.unwrap();
    ctx.command(&root, "/setvipchannel https://t.me/vip_lounge").await.unwrap();

    let config = ctx.services.config_service.snapshot().await;
    assert_eq!(config.agreement_text, "Be nice.");
    assert_eq!(config.agreement_button_label, "Deal");
    assert_eq!(config.vip_channel_link, "https://t.me/+abc");
    assert_eq!(config.vip_channel_id.as_deref(), Some("@vip_lounge"));
}

#[tokio::test]
#[serial]
async fn test_invalid_input_is_corrected_without_change() {
    let ctx = TestContext::new().await.unwrap();
    let root = root();
    let before = ctx.services.config_service.snapshot().await;

    admin::handle_set_field(
        ctx.bot.clone(),
        ChatId(ADMIN_ID),
        ADMIN_ID,
        EditableField::WelcomeMessage,
        "   ".to_string(),
        ctx.services.clone(),
    )
    .await
    .unwrap();
    assert!(ctx.telegram_mock.last_text().await.unwrap().starts_with("Usage: /setwelcome"));

    ctx.command(&root, "/setviplink ftp://files.example.com").await.unwrap();
    assert!(ctx.telegram_mock.last_text().await.unwrap().starts_with("⚠️"));

    ctx.command(&root, "/setvipchannel https://t.me/+private").await.unwrap();
    assert!(ctx.telegram_mock.last_text().await.unwrap().starts_with("⚠️"));

    ctx.command(&root, "/addadmin not a ref").await.unwrap();
    assert!(ctx.telegram_mock.last_text().await.unwrap().starts_with("⚠️"));

    ctx.command(&root, "/vipmode sometimes").await.unwrap();
    assert!(ctx.telegram_mock.last_text().await.unwrap().starts_with("Usage: /vipmode"));

    assert_eq!(ctx.services.config_service.snapshot().await, before);
}

#[tokio::test]
#[serial]
async fn test_panel_edit_consumes_next_text() {
    let ctx = TestContext::new().await.unwrap();
    let root = root();

    ctx.press(ADMIN_ID, "admin:edit_welcome").await.unwrap();
    assert!(ctx.telegram_mock.last_text().await.unwrap().contains("welcome message"));

    ctx.command(&root, "/admin").await.unwrap();
    assert!(ctx
        .telegram_mock
        .last_text()
        .await
        .unwrap()
        .contains("Waiting for the new welcome message"));

    ctx.send_text(&root, "Hello from the panel").await.unwrap();
    assert_eq!(
        ctx.services.config_service.snapshot().await.welcome_message,
        "Hello from the panel"
    );
    assert!(ctx.services.config_service.pending_for(ADMIN_ID).await.is_none());

    ctx.command(&root, "/admin").await.unwrap();
    assert!(!ctx.telegram_mock.last_text().await.unwrap().contains("Waiting for"));
}

#[tokio::test]
#[serial]
async fn test_panel_edit_stays_armed_after_bad_value() {
    let ctx = TestContext::new().await.unwrap();
    let root = root();

    ctx.press(ADMIN_ID, "admin:edit_channel").await.unwrap();
    ctx.send_text(&root, "https://t.me/+private").await.unwrap();
    assert!(ctx.telegram_mock.last_text().await.unwrap().starts_with("⚠️"));
    assert!(ctx.services.config_service.pending_for(ADMIN_ID).await.is_some());

    ctx.send_text(&root, "@vip_lounge").await.unwrap();
    assert_eq!(
        ctx.services.config_service.snapshot().await.vip_channel_id.as_deref(),
        Some("@vip_lounge")
    );
}

#[tokio::test]
#[serial]
async fn test_cancel_disarms_pending_edit() {
    let ctx = TestContext::new().await.unwrap();
    let root = root();
    ctx.onboard(&root).await.unwrap();

    ctx.press(ADMIN_ID, "admin:edit_agreement").await.unwrap();
    ctx.command(&root, "/cancel").await.unwrap();
    assert_eq!(ctx.telegram_mock.last_text().await.as_deref(), Some(replies::EDIT_CANCELLED));

    let before = ctx.services.config_service.snapshot().await;
    ctx.send_text(&root, "not an agreement").await.unwrap();
    assert_eq!(ctx.services.config_service.snapshot().await, before);

    ctx.press(ADMIN_ID, "admin:cancel").await.unwrap();
    assert_eq!(ctx.telegram_mock.last_text().await.as_deref(), Some(replies::NOTHING_TO_CANCEL));
}

#[tokio::test]
#[serial]
async fn test_admin_set_management() {
    let ctx = TestContext::new().await.unwrap();
    let root = root();
    ctx.start(&profile(701, "Quinn")).await.unwrap();

    ctx.command(&root, "/addadmin 702").await.unwrap();
    ctx.command(&root, "/addadmin @user701").await.unwrap();
    assert!(ctx.services.auth_service.is_admin(701).await);
    assert!(ctx.services.auth_service.is_admin(702).await);

    ctx.command(&root, "/admins").await.unwrap();
    let listing = ctx.telegram_mock.last_text().await.unwrap();
    assert!(listing.contains("701") && listing.contains("702"));

    ctx.command(&root, "/removeadmin 702").await.unwrap();
    assert!(!ctx.services.auth_service.is_admin(702).await);

    // Newly added admins can use the panel
    ctx.press(701, "admin:toggle_mode").await.unwrap();
    assert_eq!(ctx.services.config_service.snapshot().await.vip_send_mode, VipSendMode::Manual);
}

#[tokio::test]
#[serial]
async fn test_last_admin_cannot_be_removed() {
    let ctx = TestContext::new().await.unwrap();

    ctx.command(&root(), "/removeadmin 1").await.unwrap();

    assert!(ctx.telegram_mock.last_text().await.unwrap().starts_with("⚠️"));
    assert!(ctx.services.auth_service.is_admin(ADMIN_ID).await);
}

#[tokio::test]
#[serial]
async fn test_vip_mode_toggle_and_explicit() {
    let ctx = TestContext::new().await.unwrap();
    let root = root();

    admin::handle_vip_mode(ctx.bot.clone(), ChatId(ADMIN_ID), ADMIN_ID, String::new(), ctx.services.clone())
        .await
        .unwrap();
    assert_eq!(ctx.services.config_service.snapshot().await.vip_send_mode, VipSendMode::Manual);

    ctx.command(&root, "/vipmode manual").await.unwrap();
    assert_eq!(ctx.services.config_service.snapshot().await.vip_send_mode, VipSendMode::Manual);

    ctx.command(&root, "/vipmode AUTO").await.unwrap();
    assert_eq!(ctx.services.config_service.snapshot().await.vip_send_mode, VipSendMode::Auto);
    assert_eq!(ctx.telegram_mock.last_text().await, Some(replies::mode_changed(VipSendMode::Auto)));
}

#[tokio::test]
#[serial]
async fn test_user_list_is_chunked() {
    let ctx = TestContext::with_settings(|settings| settings.admin.list_chunk_chars = 120)
        .await
        .unwrap();
    for id in 800..806 {
        ctx.onboard(&profile(id, "Member")).await.unwrap();
    }
    ctx.telegram_mock.reset().await;
    ctx.telegram_mock.setup_default_mocks().await;

    ctx.command(&root(), "/listusers").await.unwrap();

    let chunks = ctx.telegram_mock.sent_texts().await;
    assert!(chunks.len() > 1);
    assert!(chunks.iter().all(|c| c.chars().count() <= 120));

    let lines: Vec<&str> = chunks.iter().flat_map(|c| c.lines()).collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("800 | Member | @user800 | +15550000800 | "));
    assert!(lines.iter().all(|l| l.ends_with("vip:❌")));
}

#[tokio::test]
#[serial]
async fn test_empty_user_list() {
    let ctx = TestContext::new().await.unwrap();

    ctx.press(ADMIN_ID, "admin:list_users").await.unwrap();

    assert_eq!(ctx.telegram_mock.last_text().await.as_deref(), Some(replies::NO_USERS));
}
