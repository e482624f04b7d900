//! Agreement confirm button: claim, issuance fallbacks and admin reentrancy

use serial_test::serial;
use vipgate::handlers::replies;
use vipgate::models::VipSendMode;

use crate::helpers::*;

const CHANNEL: &str = "-1001234567890";
const STATIC_LINK: &str = "https://t.me/+static_vip";

/// Replace the default mocks with a channel where the bot has no rights
async fn without_invite_rights(ctx: &TestContext) {
    ctx.telegram_mock.reset().await;
    ctx.telegram_mock.mock_send_message(MockResponseConfig::default()).await;
    ctx.telegram_mock.mock_answer_callback_query(MockResponseConfig::default()).await;
    ctx.telegram_mock
        .mock_create_chat_invite_link(MockResponseConfig { success: false, delay_ms: None })
        .await;
}

#[tokio::test]
#[serial]
async fn test_unknown_user_is_told_to_restart() {
    let ctx = TestContext::new().await.unwrap();

    ctx.press(500, replies::AGREE_CALLBACK).await.unwrap();

    ctx.telegram_mock.verify_endpoint_called("answerCallbackQuery", 1).await;
    assert_eq!(ctx.telegram_mock.last_text().await.as_deref(), Some(replies::RESTART));
}

#[tokio::test]
#[serial]
async fn test_press_before_phone_reprompts_contact() {
    let ctx = TestContext::new().await.unwrap();
    let user = profile(501, "Fay");
    ctx.start(&user).await.unwrap();

    ctx.press(501, replies::AGREE_CALLBACK).await.unwrap();

    let sent = ctx.telegram_mock.sent_messages().await;
    let last = sent.last().unwrap();
    assert_eq!(last["text"], replies::SHARE_PHONE);
    assert_eq!(last["reply_markup"]["keyboard"][0][0]["request_contact"], true);
    assert!(!ctx.services.user_service.get_user(501).await.unwrap().vip_sent);
}

#[tokio::test]
#[serial]
async fn test_auto_mode_without_rights_falls_back() {
    let ctx = TestContext::new().await.unwrap();
    ctx.configure_vip(VipSendMode::Auto, Some(STATIC_LINK), Some(CHANNEL)).await.unwrap();
    let user = profile(502, "Gus");
    ctx.onboard(&user).await.unwrap();
    without_invite_rights(&ctx).await;

    ctx.press(502, replies::AGREE_CALLBACK).await.unwrap();

    ctx.telegram_mock.verify_endpoint_called("createChatInviteLink", 1).await;
    let text = ctx.telegram_mock.last_text().await.unwrap();
    assert!(text.contains(STATIC_LINK));
    assert!(ctx.services.user_service.get_user(502).await.unwrap().vip_sent);
}

#[tokio::test]
#[serial]
async fn test_nothing_deliverable_releases_claim() {
    let ctx = TestContext::new().await.unwrap();
    ctx.configure_vip(VipSendMode::Auto, None, Some(CHANNEL)).await.unwrap();
    let user = profile(503, "Hale");
    ctx.onboard(&user).await.unwrap();
    without_invite_rights(&ctx).await;

    ctx.press(503, replies::AGREE_CALLBACK).await.unwrap();
    assert_eq!(ctx.telegram_mock.last_text().await.as_deref(), Some(replies::CONTACT_ADMIN));
    assert!(!ctx.services.user_service.get_user(503).await.unwrap().vip_sent);

    // Once an admin configures a static link the user can try again
    ctx.configure_vip(VipSendMode::Manual, Some(STATIC_LINK), None).await.unwrap();
    ctx.press(503, replies::AGREE_CALLBACK).await.unwrap();
    assert!(ctx.telegram_mock.last_text().await.unwrap().contains(STATIC_LINK));
    assert!(ctx.services.user_service.get_user(503).await.unwrap().vip_sent);
}

#[tokio::test]
#[serial]
async fn test_failed_delivery_releases_claim() {
    let ctx = TestContext::new().await.unwrap();
    ctx.configure_vip(VipSendMode::Manual, Some(STATIC_LINK), None).await.unwrap();
    let user = profile(504, "Ines");
    ctx.onboard(&user).await.unwrap();

    ctx.telegram_mock.reset().await;
    ctx.telegram_mock.mock_answer_callback_query(MockResponseConfig::default()).await;
    ctx.telegram_mock
        .mock_send_message(MockResponseConfig { success: false, delay_ms: None })
        .await;

    assert!(ctx.press(504, replies::AGREE_CALLBACK).await.is_err());
    assert!(!ctx.services.user_service.get_user(504).await.unwrap().vip_sent);
}

#[tokio::test]
#[serial]
async fn test_failed_answer_is_only_logged() {
    let ctx = TestContext::new().await.unwrap();
    ctx.telegram_mock.reset().await;
    ctx.telegram_mock.mock_send_message(MockResponseConfig::default()).await;
    ctx.telegram_mock
        .mock_answer_callback_query(MockResponseConfig { success: false, delay_ms: None })
        .await;

    ctx.press(505, replies::AGREE_CALLBACK).await.unwrap();
    assert_eq!(ctx.telegram_mock.last_text().await.as_deref(), Some(replies::RESTART));
}

#[tokio::test]
#[serial]
async fn test_concurrent_taps_deliver_once() {
    let ctx = TestContext::new().await.unwrap();
    ctx.configure_vip(VipSendMode::Auto, None, Some(CHANNEL)).await.unwrap();
    let user = profile(506, "Jun");
    ctx.onboard(&user).await.unwrap();

    let (a, b) = tokio::join!(
        ctx.press(506, replies::AGREE_CALLBACK),
        ctx.press(506, replies::AGREE_CALLBACK)
    );
    a.unwrap();
    b.unwrap();

    ctx.telegram_mock.verify_endpoint_called("createChatInviteLink", 1).await;
    let texts = ctx.telegram_mock.sent_texts().await;
    assert_eq!(texts.iter().filter(|t| t.contains("https://t.me/+")).count(), 1);
    assert_eq!(texts.iter().filter(|t| t.as_str() == replies::ALREADY_RECEIVED).count(), 1);
}

#[tokio::test]
#[serial]
async fn test_admin_confirms_are_reentrant() {
    let ctx = TestContext::new().await.unwrap();
    ctx.configure_vip(VipSendMode::Auto, None, Some(CHANNEL)).await.unwrap();
    let admin = profile(ADMIN_ID, "Root");
    ctx.onboard(&admin).await.unwrap();

    for _ in 0..3 {
        ctx.press(ADMIN_ID, replies::AGREE_CALLBACK).await.unwrap();
    }

    ctx.telegram_mock.verify_endpoint_called("createChatInviteLink", 3).await;
    let links: Vec<String> = ctx
        .telegram_mock
        .sent_texts()
        .await
        .into_iter()
        .filter(|t| t.contains("https://t.me/+"))
        .collect();
    assert_eq!(links.len(), 3);
    assert_ne!(links[0], links[1]);
    assert!(!links.iter().any(|t| t == replies::ALREADY_RECEIVED));
}

#[tokio::test]
#[serial]
async fn test_admin_manual_mode_resends_static_link() {
    let ctx = TestContext::new().await.unwrap();
    ctx.configure_vip(VipSendMode::Manual, Some(STATIC_LINK), None).await.unwrap();
    let admin = profile(ADMIN_ID, "Root");
    ctx.onboard(&admin).await.unwrap();

    ctx.press(ADMIN_ID, replies::AGREE_CALLBACK).await.unwrap();
    ctx.press(ADMIN_ID, replies::AGREE_CALLBACK).await.unwrap();

    let sent = ctx
        .telegram_mock
        .sent_texts()
        .await
        .iter()
        .filter(|t| t.contains(STATIC_LINK))
        .count();
    assert_eq!(sent, 2);
    ctx.telegram_mock.verify_endpoint_called("createChatInviteLink", 0).await;
}

#[tokio::test]
#[serial]
async fn test_channel_username_is_resolved_before_issuing() {
    let ctx = TestContext::new().await.unwrap();
    ctx.telegram_mock.mock_get_channel("vip_lounge", -1009876543210).await;
    ctx.configure_vip(VipSendMode::Auto, None, Some("@vip_lounge")).await.unwrap();
    let user = profile(508, "Kai");
    ctx.onboard(&user).await.unwrap();

    ctx.press(508, replies::AGREE_CALLBACK).await.unwrap();

    let lookups = ctx.telegram_mock.request_bodies("getChat").await;
    assert_eq!(lookups.len(), 1);
    assert_eq!(lookups[0]["chat_id"], "@vip_lounge");

    let invites = ctx.telegram_mock.invite_requests().await;
    assert_eq!(invites.len(), 1);
    assert_eq!(invites[0]["chat_id"], -1009876543210_i64);
    assert!(ctx.telegram_mock.last_text().await.unwrap().contains("https://t.me/+vip-508"));
}

#[tokio::test]
#[serial]
async fn test_rate_limited_invite_is_retried() {
    let ctx = TestContext::with_settings(|settings| settings.invite.max_retries = 2)
        .await
        .unwrap();
    ctx.configure_vip(VipSendMode::Auto, Some(STATIC_LINK), Some(CHANNEL)).await.unwrap();
    let user = profile(509, "Lin");
    ctx.onboard(&user).await.unwrap();
    ctx.telegram_mock.mock_invite_rate_limited(1).await;

    ctx.press(509, replies::AGREE_CALLBACK).await.unwrap();

    ctx.telegram_mock.verify_endpoint_called("createChatInviteLink", 2).await;
    let text = ctx.telegram_mock.last_text().await.unwrap();
    assert!(text.contains("https://t.me/+vip-509"), "unexpected reply: {}", text);
    assert!(!text.contains(STATIC_LINK));
}

#[tokio::test]
#[serial]
async fn test_retries_exhausted_fall_back() {
    let ctx = TestContext::with_settings(|settings| settings.invite.max_retries = 1)
        .await
        .unwrap();
    ctx.configure_vip(VipSendMode::Auto, Some(STATIC_LINK), Some(CHANNEL)).await.unwrap();
    let user = profile(510, "Mio");
    ctx.onboard(&user).await.unwrap();
    ctx.telegram_mock.mock_invite_rate_limited(5).await;

    ctx.press(510, replies::AGREE_CALLBACK).await.unwrap();

    ctx.telegram_mock.verify_endpoint_called("createChatInviteLink", 2).await;
    assert!(ctx.telegram_mock.last_text().await.unwrap().contains(STATIC_LINK));
}

#[tokio::test]
#[serial]
async fn test_unknown_callback_data_is_ignored() {
    let ctx = TestContext::new().await.unwrap();

    ctx.press(507, "something_else").await.unwrap();
    ctx.press(ADMIN_ID, "admin:drop_everything").await.unwrap();

    ctx.telegram_mock.verify_endpoint_called("answerCallbackQuery", 2).await;
    ctx.telegram_mock.verify_endpoint_called("sendMessage", 0).await;
}
